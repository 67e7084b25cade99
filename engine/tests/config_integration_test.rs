//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded,
//! validated, and processed with path resolution and canonicalization.

use intellicode_engine::config::{parse_duration, Config, LlmPreference};
use sdk::errors::EngineError;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_config_toml_parsing() {
    let dir = TempDir::new().unwrap();
    let toml_content = format!(
        r#"
[core]
workspace = "{}"
memory_root = "notes/memory"
log_level = "debug"

[priorities]
p0 = ["CODE"]
p1 = ["Memory Bank Updates"]
default_compression_rate = 0.5

[integrations.serpapi]
cache_duration = "10m"

[integrations.eslint]
command = ["node_modules/.bin/eslint"]
severity_threshold = "error"

[llm]
preferred = "none"

[server]
max_call_depth = 8
summarize_after_messages = 0

[watcher]
enabled = false
extensions = ["ts"]
"#,
        dir.path().display().to_string().replace('\\', "\\\\")
    );
    let path = write_config(&dir, &toml_content);

    let config = Config::load_from_path(&path).unwrap();
    let workspace = dir.path().canonicalize().unwrap();

    assert_eq!(config.core.workspace, workspace);
    assert_eq!(config.core.memory_root, workspace.join("notes/memory"));
    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.priorities.default_compression_rate, 0.5);
    assert_eq!(config.integrations.eslint.severity_threshold, "error");
    assert_eq!(config.llm.preferred, LlmPreference::None);
    assert_eq!(config.server.max_call_depth, 8);
    assert!(!config.watcher.enabled);
    assert_eq!(config.watcher.extensions, vec!["ts"]);
}

#[test]
fn test_minimal_config_with_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::for_workspace(dir.path()).unwrap();

    assert_eq!(config.core.log_level, "info");
    assert_eq!(config.server.max_call_depth, 16);
    assert_eq!(config.memory.audit_report, "memory-audit.md");
    assert_eq!(
        config.core.memory_root,
        dir.path().canonicalize().unwrap().join(".intellicode/memory")
    );
    assert_eq!(
        config.serpapi_cache_dir(),
        dir.path().canonicalize().unwrap().join(".intellicode/cache/serpapi")
    );
}

#[test]
fn test_invalid_log_level_detection() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            "[core]\nworkspace = \"{}\"\nlog_level = \"loud\"\n",
            dir.path().display().to_string().replace('\\', "\\\\")
        ),
    );

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(matches!(err, EngineError::Config(ref m) if m.contains("loud")));
}

#[test]
fn test_compression_rate_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            "[core]\nworkspace = \"{}\"\n\n[priorities]\ndefault_compression_rate = 1.5\n",
            dir.path().display().to_string().replace('\\', "\\\\")
        ),
    );

    assert!(matches!(
        Config::load_from_path(&path),
        Err(EngineError::Config(_))
    ));
}

#[test]
fn test_missing_workspace_rejected() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert!(matches!(
        Config::for_workspace(&missing),
        Err(EngineError::Config(_))
    ));
}

#[test]
fn test_env_overrides_use_injected_lookup() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::for_workspace(dir.path()).unwrap();

    config.apply_env_overrides(|key| match key {
        "SERP_API_KEY" => Some("serp-key".to_string()),
        "ANTHROPIC_API_KEY" => Some("   ".to_string()),
        _ => None,
    });

    assert_eq!(
        config.integrations.serpapi.api_key.as_deref(),
        Some("serp-key")
    );
    assert!(config.llm.anthropic.api_key.is_none());
}

#[test]
fn test_cache_durations() {
    assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
    assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
    assert!(parse_duration("forever").is_err());
}
