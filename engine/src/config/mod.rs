//! Configuration management
//!
//! This module handles loading, validation, and management of the IntelliCode
//! configuration. Configuration is stored in TOML format at
//! ~/.intellicode/config.toml unless another path is given on the command line.
//!
//! # Configuration Sections
//!
//! - **core**: Workspace path, memory bank root, log level
//! - **memory**: Memory bank housekeeping (audit report name)
//! - **priorities**: P0/P1/P2 keyword lists and the default compression rate
//! - **integrations**: SerpAPI, ESLint, TypeScript, sequential thinking
//! - **analysis**: Conflict check limits
//! - **llm**: Summary enhancement provider and credentials
//! - **server**: Call depth limit and background summarization threshold
//! - **schedule** / **watcher**: Background jobs
//!
//! # Environment Overrides
//!
//! API keys are never required in the file. `SERP_API_KEY`, `OPENAI_API_KEY`,
//! `GOOGLE_API_KEY`, `DEEPSEEK_API_KEY` and `ANTHROPIC_API_KEY` override the
//! corresponding values after the file is parsed.
//!
//! # Examples
//!
//! ```no_run
//! use intellicode_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Memory bank: {:?}", config.core.memory_root);
//! println!("Compression: {}", config.priorities.default_compression_rate);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Constructed once at startup and shared as `Arc<Config>`; nothing mutates
/// it afterwards. Every section has defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Memory bank housekeeping
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Summarization priorities
    #[serde(default)]
    pub priorities: PrioritiesConfig,

    /// External capability settings
    #[serde(default)]
    pub integrations: IntegrationsConfig,

    /// Analysis pipeline limits
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// LLM enhancement settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Stdio server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Scheduled jobs
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// File watcher
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Project directory analyzed by the tools (supports ~ expansion)
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Memory bank root; relative paths resolve against the workspace
    #[serde(default = "default_memory_root")]
    pub memory_root: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Memory bank housekeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// File name of the daily audit report under auto_generated/
    #[serde(default = "default_audit_report")]
    pub audit_report: String,
}

/// Keyword lists used to bucket transcript lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritiesConfig {
    #[serde(default = "default_p0_keywords")]
    pub p0: Vec<String>,

    #[serde(default = "default_p1_keywords")]
    pub p1: Vec<String>,

    /// Informational only; unmatched lines are P2 anyway
    #[serde(default)]
    pub p2: Vec<String>,

    /// Fraction of content dropped at full compression (0.0-1.0)
    #[serde(default = "default_compression_rate")]
    pub default_compression_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub serpapi: SerpApiConfig,

    #[serde(default)]
    pub eslint: EslintConfig,

    #[serde(default)]
    pub typescript: TypeScriptConfig,

    #[serde(default)]
    pub sequential_thinking: SequentialThinkingConfig,
}

/// SerpAPI client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpApiConfig {
    /// API key (prefer the SERP_API_KEY environment variable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_serpapi_base_url")]
    pub base_url: String,

    /// Cache lifetime: `30s`, `10m`, `1h`, `1d`
    #[serde(default = "default_cache_duration")]
    pub cache_duration: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// ESLint subprocess configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EslintConfig {
    /// Program and leading arguments, e.g. `["npx", "eslint"]`
    #[serde(default = "default_eslint_command")]
    pub command: Vec<String>,

    /// Explicit config file passed with `--config`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    /// Lowest severity reported: `warning` or `error`
    #[serde(default = "default_severity_threshold")]
    pub severity_threshold: String,

    #[serde(default = "default_process_timeout")]
    pub timeout_secs: u64,
}

/// TypeScript compiler subprocess configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeScriptConfig {
    /// Program and leading arguments, e.g. `["npx", "tsc"]`
    #[serde(default = "default_tsc_command")]
    pub command: Vec<String>,

    /// Project file passed with `--project` instead of the single file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsconfig_path: Option<PathBuf>,

    #[serde(default = "default_process_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialThinkingConfig {
    /// Artificial "thinking" pause; zero disables it
    #[serde(default = "default_thinking_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Changesets longer than this are flagged by the conflict check
    #[serde(default = "default_max_change_lines")]
    pub max_change_lines: usize,
}

/// Provider used to polish generated summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmPreference {
    #[default]
    None,
    Openai,
    Anthropic,
    Google,
    Deepseek,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub preferred: LlmPreference,

    #[serde(default = "default_openai_provider")]
    pub openai: ProviderConfig,

    #[serde(default = "default_anthropic_provider")]
    pub anthropic: ProviderConfig,

    #[serde(default = "default_google_provider")]
    pub google: ProviderConfig,

    #[serde(default = "default_deepseek_provider")]
    pub deepseek: ProviderConfig,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// One provider's endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (prefer the provider's environment variable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,

    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Nested tool calls deeper than this fail with CallDepthExceeded
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    /// Session log size that triggers a background summary; 0 disables
    #[serde(default = "default_summarize_after")]
    pub summarize_after_messages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry file for the weekly memory map, relative to the workspace
    #[serde(default = "default_memory_map_entry")]
    pub memory_map_entry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// File extensions (without dot) that trigger a quick check
    #[serde(default = "default_watch_extensions")]
    pub extensions: Vec<String>,
}

// Default value functions
fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

fn default_memory_root() -> PathBuf {
    PathBuf::from(".intellicode/memory")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_audit_report() -> String {
    "memory-audit.md".to_string()
}

fn default_p0_keywords() -> Vec<String> {
    vec![
        "CODE".to_string(),
        "Handover Decisions".to_string(),
        "Project Plan Changes".to_string(),
    ]
}

fn default_p1_keywords() -> Vec<String> {
    vec![
        "Memory Bank Updates".to_string(),
        "Critical Conflicts".to_string(),
    ]
}

fn default_compression_rate() -> f64 {
    0.5
}

fn default_serpapi_base_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_cache_duration() -> String {
    "1h".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_process_timeout() -> u64 {
    120
}

fn default_eslint_command() -> Vec<String> {
    vec!["npx".to_string(), "eslint".to_string()]
}

fn default_tsc_command() -> Vec<String> {
    vec!["npx".to_string(), "tsc".to_string()]
}

fn default_severity_threshold() -> String {
    "warning".to_string()
}

fn default_thinking_delay_ms() -> u64 {
    30_000
}

fn default_max_depth() -> u32 {
    5
}

fn default_max_change_lines() -> usize {
    200
}

fn default_openai_provider() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://api.openai.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
    }
}

fn default_anthropic_provider() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://api.anthropic.com/v1".to_string(),
        model: "claude-3-5-sonnet-20241022".to_string(),
    }
}

fn default_google_provider() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        model: "gemini-1.5-pro".to_string(),
    }
}

fn default_deepseek_provider() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://api.deepseek.com/v1".to_string(),
        model: "deepseek-chat".to_string(),
    }
}

fn default_max_call_depth() -> usize {
    16
}

fn default_summarize_after() -> usize {
    100
}

fn default_memory_map_entry() -> String {
    "src/index.ts".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_watch_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "md"].iter().map(|s| s.to_string()).collect()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            memory_root: default_memory_root(),
            log_level: default_log_level(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            audit_report: default_audit_report(),
        }
    }
}

impl Default for PrioritiesConfig {
    fn default() -> Self {
        Self {
            p0: default_p0_keywords(),
            p1: default_p1_keywords(),
            p2: Vec::new(),
            default_compression_rate: default_compression_rate(),
        }
    }
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_serpapi_base_url(),
            cache_duration: default_cache_duration(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for EslintConfig {
    fn default() -> Self {
        Self {
            command: default_eslint_command(),
            config_path: None,
            severity_threshold: default_severity_threshold(),
            timeout_secs: default_process_timeout(),
        }
    }
}

impl Default for TypeScriptConfig {
    fn default() -> Self {
        Self {
            command: default_tsc_command(),
            tsconfig_path: None,
            timeout_secs: default_process_timeout(),
        }
    }
}

impl Default for SequentialThinkingConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_thinking_delay_ms(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_change_lines: default_max_change_lines(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            preferred: LlmPreference::None,
            openai: default_openai_provider(),
            anthropic: default_anthropic_provider(),
            google: default_google_provider(),
            deepseek: default_deepseek_provider(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            summarize_after_messages: default_summarize_after(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            memory_map_entry: default_memory_map_entry(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
            extensions: default_watch_extensions(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.intellicode/config.toml)
    ///
    /// If the configuration file doesn't exist, writes a default one first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails (bad log level, rates out of range, missing workspace)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse, apply environment overrides and validate
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate_and_process()?;

        Ok(config)
    }

    /// Configuration rooted at an existing directory, used by tests and
    /// `--workspace` style invocations. Skips the environment.
    pub fn for_workspace(workspace: &Path) -> Result<Self, EngineError> {
        let mut config = Config::default();
        config.core.workspace = workspace.to_path_buf();
        config.validate_and_process()?;
        Ok(config)
    }

    /// Write the default configuration to `path` and return it
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let defaults = Config::default();
        let toml_string = toml::to_string_pretty(&defaults)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {:?}", path);

        let mut config = defaults;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate_and_process()?;
        Ok(config)
    }

    /// Get the default configuration file path (~/.intellicode/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".intellicode").join("config.toml"))
    }

    /// Override API keys from the environment
    ///
    /// The lookup is injected so tests never touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = present("SERP_API_KEY") {
            self.integrations.serpapi.api_key = Some(key);
            tracing::debug!("SERP_API_KEY loaded from environment");
        }

        let providers: [(&str, &mut ProviderConfig); 4] = [
            ("OPENAI_API_KEY", &mut self.llm.openai),
            ("GOOGLE_API_KEY", &mut self.llm.google),
            ("DEEPSEEK_API_KEY", &mut self.llm.deepseek),
            ("ANTHROPIC_API_KEY", &mut self.llm.anthropic),
        ];
        for (var, provider) in providers {
            if let Some(key) = present(var) {
                provider.api_key = Some(key);
                tracing::debug!("{} loaded from environment", var);
            }
        }
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level and numeric ranges
    /// - Expands ~ in paths
    /// - Canonicalizes the workspace, which must exist
    /// - Resolves a relative memory root against the workspace
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        let rate = self.priorities.default_compression_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(EngineError::Config(
                "default_compression_rate must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.server.max_call_depth == 0 {
            return Err(EngineError::Config(
                "max_call_depth must be at least 1".to_string(),
            ));
        }

        let valid_thresholds = ["warning", "error"];
        if !valid_thresholds.contains(&self.integrations.eslint.severity_threshold.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid eslint severity_threshold '{}'. Must be one of: {}",
                self.integrations.eslint.severity_threshold,
                valid_thresholds.join(", ")
            )));
        }

        if self.integrations.eslint.command.is_empty() || self.integrations.typescript.command.is_empty() {
            return Err(EngineError::Config(
                "integration commands must name a program".to_string(),
            ));
        }

        parse_duration(&self.integrations.serpapi.cache_duration)?;

        self.core.workspace = expand_path(&self.core.workspace)?;
        if !self.core.workspace.is_dir() {
            return Err(EngineError::Config(format!(
                "Workspace path is not a directory: {:?}",
                self.core.workspace
            )));
        }
        self.core.workspace = self.core.workspace.canonicalize().map_err(|e| {
            EngineError::Config(format!(
                "Failed to canonicalize workspace {:?}: {}",
                self.core.workspace, e
            ))
        })?;

        let memory_root = expand_path(&self.core.memory_root)?;
        self.core.memory_root = if memory_root.is_absolute() {
            memory_root
        } else {
            self.core.workspace.join(memory_root)
        };

        if self.llm.preferred != LlmPreference::None && self.preferred_provider().is_none() {
            tracing::warn!(
                "LLM preference {:?} has no API key; summaries will not be enhanced",
                self.llm.preferred
            );
        }

        Ok(())
    }

    /// Provider selected for summary enhancement, if it has credentials
    pub fn preferred_provider(&self) -> Option<&ProviderConfig> {
        let provider = match self.llm.preferred {
            LlmPreference::None => return None,
            LlmPreference::Openai => &self.llm.openai,
            LlmPreference::Anthropic => &self.llm.anthropic,
            LlmPreference::Google => &self.llm.google,
            LlmPreference::Deepseek => &self.llm.deepseek,
        };
        provider.api_key.as_ref().map(|_| provider)
    }

    /// Directory of the SerpAPI response cache (a sibling of the memory root)
    pub fn serpapi_cache_dir(&self) -> PathBuf {
        self.core
            .memory_root
            .parent()
            .unwrap_or(&self.core.memory_root)
            .join("cache")
            .join("serpapi")
    }
}

/// Parse a `<number><unit>` duration where unit is s, m, h or d
pub fn parse_duration(value: &str) -> Result<Duration, EngineError> {
    let value = value.trim();
    let invalid = || EngineError::Config(format!("Invalid duration '{}'. Use e.g. 30s, 10m, 1h, 1d", value));

    let split = value.len().checked_sub(1).ok_or_else(invalid)?;
    if !value.is_char_boundary(split) {
        return Err(invalid());
    }
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;

    let seconds = match unit {
        "s" => amount,
        "m" => amount * 60,
        "h" => amount * 60 * 60,
        "d" => amount * 60 * 60 * 24,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(seconds))
}

/// Expand ~ in path to user's home directory
pub(crate) fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.priorities.default_compression_rate, 0.5);
        assert_eq!(config.server.max_call_depth, 16);
        assert_eq!(config.server.summarize_after_messages, 100);
        assert_eq!(config.llm.preferred, LlmPreference::None);
        assert!(config.priorities.p0.contains(&"CODE".to_string()));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(172_800));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("5w").is_err());
        assert!(parse_duration("tenm").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SERP_API_KEY", "serp-key"),
            ("ANTHROPIC_API_KEY", "ant-key"),
            ("OPENAI_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.integrations.serpapi.api_key.as_deref(), Some("serp-key"));
        assert_eq!(config.llm.anthropic.api_key.as_deref(), Some("ant-key"));
        assert!(config.llm.openai.api_key.is_none());
    }

    #[test]
    fn test_preferred_provider_requires_key() {
        let mut config = Config::default();
        config.llm.preferred = LlmPreference::Deepseek;
        assert!(config.preferred_provider().is_none());

        config.llm.deepseek.api_key = Some("k".to_string());
        assert_eq!(
            config.preferred_provider().map(|p| p.model.as_str()),
            Some("deepseek-chat")
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.priorities.p1, deserialized.priorities.p1);
    }
}
