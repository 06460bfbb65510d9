//! greyris-config
//!
//! Layered YAML configuration.
//!
//! # Contract
//! - YAML documents are merged in order: earlier docs are base, later docs override.
//! - The merged document is converted to JSON and deserialized into [`AppConfig`];
//!   every key has a default, so zero documents is a valid configuration.
//! - Config files never hold credentials. `auth.keys_env.*` stores env var
//!   NAMES; secret-looking literals anywhere abort the load.
//! - The loaded config is a plain value passed to whoever needs it. There is no
//!   process-wide config singleton.

mod secrets;
mod settings;

pub use secrets::{resolve_secrets, ResolvedSecrets};
pub use settings::{
    default_data_dir, AppConfig, AuthSection, KeysEnv, SortSection, SpotifySection,
    StorageSection,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;

/// Known secret-like prefixes. If any leaf string value in the effective
/// config starts with one of these, we abort with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // OpenAI style
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "gho_",       // GitHub OAuth
    "BQ",         // Spotify access tokens
    "AQ",         // Spotify refresh tokens
];

/// JSON-pointer prefixes read by the code today. Any leaf outside these is
/// reported by [`report_unused_keys`].
///
/// This must reflect what the code ACTUALLY reads; do not "wish-consume" whole
/// sections.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/storage/data_dir",
    "/auth/redirect_url",
    "/auth/timeout_secs",
    "/auth/keys_env/client_id",
    "/auth/keys_env/client_secret",
    "/spotify/api_base_url",
    "/spotify/accounts_base_url",
    "/spotify/page_limit",
    "/spotify/request_timeout_secs",
    "/spotify/max_retries",
    "/sort/strip_prefixes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Minimal set of unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Produce an unused-key report.
/// If `policy == Fail`, returns an error when unused keys exist.
/// If `policy == Warn`, always returns Ok(report).
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        // An empty root document has a single "/" leaf (null); that is not a key.
        .filter(|lp| lp != "/")
        .collect();

    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or fix the spelling. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Normalize JSON pointer:
/// - must begin with "/"
/// - no trailing "/" unless it's just "/"
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// Return true if `prefix` is a JSON-pointer prefix of `leaf`.
///
/// - "/a/b" consumes "/a/b/c" and "/a/b/0" but NOT "/a/bc"
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.starts_with(prefix)
        && leaf
            .get(prefix.len()..prefix.len() + 1)
            .map(|c| c == "/")
            .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Effective typed settings (defaults filled in).
    pub settings: AppConfig,
    /// Merged raw document, exactly as written by the user.
    pub config_json: Value,
}

impl LoadedConfig {
    /// Compact JSON of the effective settings, defaults included.
    pub fn canonical_json(&self) -> Result<String> {
        serde_json::to_string(&self.settings).context("canonical json serialize failed")
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty document parses as null; it contributes nothing.
        if v_json.is_null() {
            continue;
        }
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;
    enforce_env_names(&merged)?;

    let settings: AppConfig =
        serde_json::from_value(merged.clone()).context("config does not match schema")?;
    settings.validate()?;

    Ok(LoadedConfig {
        settings,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(|val| val.as_str()) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

/// Everything under `/auth/keys_env` must be an env var NAME.
fn enforce_env_names(v: &Value) -> Result<()> {
    let Some(Value::Object(map)) = v.pointer("/auth/keys_env") else {
        return Ok(());
    };
    for (k, val) in map {
        let ok = val.as_str().map(is_env_var_name).unwrap_or(false);
        if !ok {
            bail!(
                "CONFIG_INVALID_ENV_NAME leaf=/auth/keys_env/{}: expected an env var name like GREYRIS_CLIENT_ID",
                k
            );
        }
    }
    Ok(())
}

fn is_env_var_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    // Spotify client ids/secrets are 32 lowercase hex characters.
    if t.len() == 32 && t.chars().all(|c| c.is_ascii_hexdigit()) {
        return true;
    }
    // Token prefixes only count on long opaque strings, not on words like "BQ-sorted".
    SECRET_PREFIXES
        .iter()
        .any(|p| t.starts_with(p) && (p.len() > 2 || (t.len() >= 40 && !t.contains(' '))))
}
