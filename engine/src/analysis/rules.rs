//! Local diagnosis rules
//!
//! Each rule looks at one source line at a time and reports at most one
//! finding for it. Rules are independent; the pipeline runs every rule over
//! every line and keeps all findings.

use regex::Regex;
use sdk::errors::EngineError;
use sdk::types::{Finding, Severity};

/// A line-level check run during diagnosis
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inspect one line. `line_no` is 1-indexed.
    fn check(&self, line_no: usize, line: &str) -> Option<Finding>;
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, EngineError> {
    Regex::new(pattern)
        .map_err(|e| EngineError::Config(format!("invalid rule pattern '{}': {}", pattern, e)))
}

/// Leftover TODO / FIXME markers
pub struct MarkerRule;

impl Rule for MarkerRule {
    fn name(&self) -> &'static str {
        "todo-marker"
    }

    fn check(&self, line_no: usize, line: &str) -> Option<Finding> {
        let marker = ["TODO", "FIXME"].into_iter().find(|m| line.contains(m))?;
        Some(Finding::new(
            format!("Unresolved {} marker", marker),
            line_no,
            Severity::Warning,
        ))
    }
}

/// Debug output left in the code
pub struct DebugPrintRule {
    pattern: Regex,
}

impl DebugPrintRule {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            pattern: compile(r"\bconsole\.(log|debug|trace)\s*\(")?,
        })
    }
}

impl Rule for DebugPrintRule {
    fn name(&self) -> &'static str {
        "debug-print"
    }

    fn check(&self, line_no: usize, line: &str) -> Option<Finding> {
        self.pattern.is_match(line).then(|| {
            Finding::new(
                "Debug print statement; use the project logger instead",
                line_no,
                Severity::Warning,
            )
        })
    }
}

/// `var` declarations, forbidden by the API contracts
pub struct LegacyVarRule {
    pattern: Regex,
}

impl LegacyVarRule {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            pattern: compile(r"(^|[^\w$.])var\s+[A-Za-z_$\[{]")?,
        })
    }
}

impl Rule for LegacyVarRule {
    fn name(&self) -> &'static str {
        "no-var"
    }

    fn check(&self, line_no: usize, line: &str) -> Option<Finding> {
        let code = line.split("//").next().unwrap_or(line);
        self.pattern.is_match(code).then(|| {
            Finding::new(
                "'var' declaration violates technical/api-contracts.md: use 'let' or 'const'",
                line_no,
                Severity::Error,
            )
        })
    }
}

/// The rules every diagnosis runs
pub fn default_rules() -> Result<Vec<Box<dyn Rule>>, EngineError> {
    Ok(vec![
        Box::new(MarkerRule),
        Box::new(DebugPrintRule::new()?),
        Box::new(LegacyVarRule::new()?),
    ])
}

/// Run every rule over every line of `content`
pub fn apply_rules(rules: &[Box<dyn Rule>], content: &str) -> Vec<Finding> {
    content
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| rules.iter().filter_map(move |rule| rule.check(idx + 1, line)))
        .collect()
}
