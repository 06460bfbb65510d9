use greyris_config::{load_layered_yaml, load_layered_yaml_from_strings, AppConfig};

/// Validates:
/// 1) No documents -> pure defaults.
/// 2) Later documents override earlier ones, key by key.
/// 3) Invalid values are rejected at load time.
/// 4) Files are read in the order given.

#[test]
fn no_documents_yields_defaults() {
    let loaded = load_layered_yaml_from_strings(&[]).expect("empty load must succeed");
    assert_eq!(loaded.settings, AppConfig::default());
    assert_eq!(loaded.settings.spotify.page_limit, 100);
    assert_eq!(loaded.settings.auth.redirect_url, "http://localhost:8080/callback");
    assert_eq!(loaded.settings.sort.strip_prefixes, vec!["the ".to_string()]);
    assert_eq!(loaded.settings.auth.keys_env.client_id, "GREYRIS_CLIENT_ID");
}

#[test]
fn later_documents_override_earlier_keys_only() {
    let base = r#"
spotify:
  page_limit: 50
  max_retries: 5
sort:
  strip_prefixes: ["the ", "a "]
"#;
    let overlay = r#"
spotify:
  page_limit: 20
auth:
  timeout_secs: 60
"#;

    let loaded = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
    let s = &loaded.settings;

    assert_eq!(s.spotify.page_limit, 20, "overlay wins");
    assert_eq!(s.spotify.max_retries, 5, "base survives where overlay is silent");
    assert_eq!(s.auth.timeout_secs, 60);
    assert_eq!(s.sort.strip_prefixes, vec!["the ".to_string(), "a ".to_string()]);
    assert_eq!(s.spotify.api_base_url, "https://api.spotify.com/v1");
}

#[test]
fn empty_document_contributes_nothing() {
    let loaded = load_layered_yaml_from_strings(&["", "spotify:\n  max_retries: 1\n"]).unwrap();
    assert_eq!(loaded.settings.spotify.max_retries, 1);
}

#[test]
fn out_of_range_page_limit_is_rejected() {
    let err = load_layered_yaml_from_strings(&["spotify:\n  page_limit: 500\n"]).unwrap_err();
    assert!(err.to_string().contains("spotify.page_limit"), "{err}");
}

#[test]
fn wrong_type_is_rejected() {
    let err = load_layered_yaml_from_strings(&["auth:\n  timeout_secs: soon\n"]).unwrap_err();
    assert!(err.to_string().contains("schema"), "{err}");
}

#[test]
fn files_are_merged_in_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.yaml");
    let b = dir.path().join("b.yaml");
    std::fs::write(&a, "storage:\n  data_dir: /tmp/first\n").unwrap();
    std::fs::write(&b, "storage:\n  data_dir: /tmp/second\n").unwrap();

    let loaded = load_layered_yaml(&[a.to_str().unwrap(), b.to_str().unwrap()]).unwrap();
    assert_eq!(
        loaded.settings.data_dir(),
        std::path::PathBuf::from("/tmp/second")
    );

    let canonical = loaded.canonical_json().unwrap();
    assert!(canonical.contains("/tmp/second"));
}

#[test]
fn missing_file_is_an_error() {
    let err = load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
    assert!(err.to_string().contains("failed to read yaml path"));
}
