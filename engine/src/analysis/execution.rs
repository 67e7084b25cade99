//! Execution phase: turn findings into proposed solutions

use sdk::types::{DiagnosisReport, ExecutionReport, Finding, Priority, Solution};

fn offending_line(content: Option<&str>, finding: &Finding) -> Option<String> {
    let line = finding.line.checked_sub(1)?;
    content?
        .lines()
        .nth(line)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// One solution per finding plus a closing recommendation
///
/// Errors become `fix` entries quoting the offending line when the file
/// content is available, warnings become `review` entries and suggestions
/// become `improvement` entries.
pub fn plan(diagnosis: &DiagnosisReport, content: Option<&str>, priority: Priority) -> ExecutionReport {
    let mut solutions = Vec::with_capacity(diagnosis.total() + 1);

    for finding in &diagnosis.errors {
        solutions.push(Solution {
            kind: "fix".to_string(),
            description: format!("Fix line {}: {}", finding.line, finding.message),
            code: offending_line(content, finding),
        });
    }
    for finding in &diagnosis.warnings {
        solutions.push(Solution {
            kind: "review".to_string(),
            description: format!("Review line {}: {}", finding.line, finding.message),
            code: None,
        });
    }
    for finding in &diagnosis.suggestions {
        solutions.push(Solution {
            kind: "improvement".to_string(),
            description: format!("Consider line {}: {}", finding.line, finding.message),
            code: None,
        });
    }

    let description = if diagnosis.total() == 0 {
        "No issues found; no changes required".to_string()
    } else {
        format!(
            "Address {} error(s) before {} warning(s) and {} suggestion(s), then re-run diagnosis",
            diagnosis.errors.len(),
            diagnosis.warnings.len(),
            diagnosis.suggestions.len()
        )
    };
    solutions.push(Solution {
        kind: "recommendation".to_string(),
        description,
        code: None,
    });

    ExecutionReport { solutions, priority }
}
