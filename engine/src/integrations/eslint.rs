//! ESLint adapter

use sdk::errors::EngineError;
use sdk::types::{LintArgs, LintFileResult, LintMessage, LintReport, LintSummary};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::run_command;
use crate::config::EslintConfig;

const CAPABILITY: &str = "eslint";

/// One entry of `eslint --format json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileResult {
    file_path: String,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    rule_id: Option<String>,
    severity: u8,
    message: String,
    #[serde(default)]
    line: usize,
    #[serde(default)]
    column: usize,
    #[serde(default)]
    fix: Option<serde_json::Value>,
}

pub struct EslintRunner {
    config: EslintConfig,
    workspace: PathBuf,
}

impl EslintRunner {
    pub fn new(config: EslintConfig, workspace: PathBuf) -> Self {
        Self { config, workspace }
    }

    fn arguments(&self, args: &LintArgs) -> Vec<String> {
        let mut argv = vec!["--format".to_string(), "json".to_string()];
        if let Some(config_path) = &self.config.config_path {
            argv.push("--config".to_string());
            argv.push(config_path.to_string_lossy().into_owned());
        }
        if args.auto_fix {
            argv.push("--fix".to_string());
        }
        argv.push(args.file_path.clone());
        argv
    }

    pub async fn lint(&self, args: &LintArgs) -> Result<LintReport, EngineError> {
        let output = run_command(
            CAPABILITY,
            &self.config.command,
            &self.arguments(args),
            &self.workspace,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        // Exit 1 means lint problems were found; anything else non-zero is a crash
        if !matches!(output.exit_code, Some(0) | Some(1)) {
            return Err(EngineError::capability(CAPABILITY, output.failure_text()));
        }

        let report = parse_report(&output.stdout, &self.config.severity_threshold)?;
        info!(
            "ESLint on {}: {} error(s), {} warning(s)",
            args.file_path, report.summary.total_errors, report.summary.total_warnings
        );
        Ok(report)
    }
}

/// Parse ESLint's JSON output, dropping messages below `threshold`
pub fn parse_report(stdout: &str, threshold: &str) -> Result<LintReport, EngineError> {
    let raw: Vec<RawFileResult> = serde_json::from_str(stdout.trim()).map_err(|e| {
        EngineError::capability(CAPABILITY, format!("unreadable ESLint output: {}", e))
    })?;
    let min_severity = if threshold == "error" { 2 } else { 1 };

    let mut summary = LintSummary {
        files_analyzed: raw.len(),
        ..LintSummary::default()
    };
    let results = raw
        .into_iter()
        .map(|file| {
            let messages: Vec<LintMessage> = file
                .messages
                .into_iter()
                .filter(|m| m.severity >= min_severity)
                .map(|m| LintMessage {
                    rule_id: m.rule_id,
                    severity: m.severity,
                    message: m.message,
                    line: m.line,
                    column: m.column,
                    fixable: m.fix.is_some(),
                })
                .collect();
            let error_count = messages.iter().filter(|m| m.severity >= 2).count();
            let warning_count = messages.len() - error_count;
            summary.total_errors += error_count;
            summary.total_warnings += warning_count;

            LintFileResult {
                file_path: file.file_path,
                error_count,
                warning_count,
                messages,
            }
        })
        .collect();

    Ok(LintReport { results, summary })
}
