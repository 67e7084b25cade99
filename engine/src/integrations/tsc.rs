//! TypeScript compiler adapter
//!
//! Runs `tsc --noEmit --pretty false` and parses its plain diagnostic
//! lines:
//!
//! ```text
//! src/a.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'.
//! error TS6053: File 'missing.ts' not found.
//! ```

use regex::Regex;
use sdk::errors::EngineError;
use sdk::types::{
    CheckType, Diagnostic, Severity, TypeCheckArgs, TypeCheckReport, TypeCheckSummary,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::run_command;
use crate::analysis::rules::compile;
use crate::config::TypeScriptConfig;

const CAPABILITY: &str = "typescript";

pub struct TscRunner {
    config: TypeScriptConfig,
    workspace: PathBuf,
    located: Regex,
    global: Regex,
}

impl TscRunner {
    pub fn new(config: TypeScriptConfig, workspace: PathBuf) -> Result<Self, EngineError> {
        Ok(Self {
            config,
            workspace,
            located: compile(
                r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<cat>error|warning|suggestion|message) TS(?P<code>\d+): (?P<msg>.*)$",
            )?,
            global: compile(r"^(?P<cat>error|warning|suggestion|message) TS(?P<code>\d+): (?P<msg>.*)$")?,
        })
    }

    fn arguments(&self, args: &TypeCheckArgs) -> Vec<String> {
        let mut argv = vec![
            "--noEmit".to_string(),
            "--pretty".to_string(),
            "false".to_string(),
        ];
        match &self.config.tsconfig_path {
            Some(project) => {
                argv.push("--project".to_string());
                argv.push(project.to_string_lossy().into_owned());
            }
            None => argv.push(args.file_path.clone()),
        }
        argv
    }

    pub async fn check(&self, args: &TypeCheckArgs) -> Result<TypeCheckReport, EngineError> {
        let output = run_command(
            CAPABILITY,
            &self.config.command,
            &self.arguments(args),
            &self.workspace,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        let diagnostics = self.parse(&format!("{}\n{}", output.stdout, output.stderr));
        if !output.success() && diagnostics.is_empty() {
            return Err(EngineError::capability(CAPABILITY, output.failure_text()));
        }

        // A project run reports every file; keep the requested one
        let target = self.config.tsconfig_path.as_ref().map(|_| args.file_path.as_str());
        let diagnostics = diagnostics
            .into_iter()
            .filter(|d| match (target, &d.file) {
                (Some(target), Some(file)) => same_file(file, target),
                _ => true,
            })
            .collect();

        let report = build_report(diagnostics, args.check_type, args.include_suggestions);
        info!(
            "tsc on {}: {} error(s), {} warning(s)",
            args.file_path, report.summary.error_count, report.summary.warning_count
        );
        Ok(report)
    }

    /// Every diagnostic line in `output`
    pub fn parse(&self, output: &str) -> Vec<Diagnostic> {
        output
            .lines()
            .filter_map(|line| {
                let line = line.trim_end();
                if let Some(caps) = self.located.captures(line) {
                    Some(Diagnostic {
                        message: caps["msg"].to_string(),
                        category: category(&caps["cat"]),
                        code: caps["code"].parse().unwrap_or(0),
                        line: caps["line"].parse().unwrap_or(0),
                        column: caps["col"].parse().unwrap_or(0),
                        file: Some(caps["file"].to_string()),
                    })
                } else if let Some(caps) = self.global.captures(line) {
                    Some(Diagnostic {
                        message: caps["msg"].to_string(),
                        category: category(&caps["cat"]),
                        code: caps["code"].parse().unwrap_or(0),
                        line: 0,
                        column: 0,
                        file: None,
                    })
                } else {
                    debug!("Skipping tsc output line: {}", line);
                    None
                }
            })
            .collect()
    }
}

fn category(raw: &str) -> Severity {
    match raw {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => Severity::Suggestion,
    }
}

fn same_file(reported: &str, target: &str) -> bool {
    let reported = Path::new(reported);
    let target = Path::new(target);
    reported.ends_with(target) || target.ends_with(reported)
}

/// Bucket diagnostics; `syntax` keeps errors only
pub fn build_report(
    diagnostics: Vec<Diagnostic>,
    check_type: CheckType,
    include_suggestions: bool,
) -> TypeCheckReport {
    let mut report = TypeCheckReport::default();
    for diagnostic in diagnostics {
        match diagnostic.category {
            Severity::Error => report.errors.push(diagnostic),
            Severity::Warning if check_type != CheckType::Syntax => report.warnings.push(diagnostic),
            Severity::Suggestion if check_type != CheckType::Syntax && include_suggestions => {
                report.suggestions.push(diagnostic)
            }
            _ => {}
        }
    }

    report.summary = TypeCheckSummary {
        error_count: report.errors.len(),
        warning_count: report.warnings.len(),
        suggestion_count: report.suggestions.len(),
    };
    report
}
