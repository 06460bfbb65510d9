use greyris_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

/// Validates:
/// 1) Unused keys are detected in WARN mode but do not error.
/// 2) Unused keys cause failure in FAIL mode.
/// 3) Keys under consumed prefixes (including list items) are not flagged.

#[test]
fn warn_mode_reports_misspelled_keys_without_error() {
    let yaml = r#"
spotify:
  page_limt: 10
sort:
  strip_prefixes: ["the ", "les "]
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.unused_leaf_pointers, vec!["/spotify/page_limt".to_string()]);
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = "extra:\n  foo: 1\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
    assert!(err.to_string().contains("/extra/foo"));
}

#[test]
fn empty_config_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
