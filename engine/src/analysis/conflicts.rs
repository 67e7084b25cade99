//! Conflict check
//!
//! Scans a proposed change against the project's contract documents. Every
//! rule runs independently, so one change can raise several conflicts.

use regex::Regex;
use sdk::errors::EngineError;
use sdk::types::{Conflict, ConflictReport, ConflictType, Priority, Solution};

use super::rules::compile;

/// Contract documents loaded from the memory bank; `None` when unreadable
#[derive(Debug, Clone, Default)]
pub struct ContractDocs {
    pub api_contracts: Option<String>,
    pub system_patterns: Option<String>,
}

impl ContractDocs {
    fn mandates_camel_case(&self) -> bool {
        self.system_patterns
            .as_deref()
            .is_some_and(|doc| doc.to_lowercase().contains("camelcase"))
    }
}

pub trait ConflictRule: Send + Sync {
    fn check(&self, change: &str, docs: &ContractDocs) -> Option<Conflict>;
}

fn conflict(message: impl Into<String>, kind: ConflictType, priority: Priority) -> Conflict {
    Conflict {
        message: message.into(),
        kind,
        priority,
    }
}

struct AnyTypeRule(Regex);

impl ConflictRule for AnyTypeRule {
    fn check(&self, change: &str, _docs: &ContractDocs) -> Option<Conflict> {
        self.0.is_match(change).then(|| {
            conflict(
                "Change introduces unsafe 'any' typing",
                ConflictType::UnsafeType,
                Priority::P1,
            )
        })
    }
}

struct SnakeCaseRule(Regex);

impl ConflictRule for SnakeCaseRule {
    fn check(&self, change: &str, docs: &ContractDocs) -> Option<Conflict> {
        if !docs.mandates_camel_case() {
            return None;
        }
        let name = self.0.captures(change)?.get(1)?.as_str().to_string();
        Some(conflict(
            format!("Identifier '{}' is snake_case but system patterns mandate camelCase", name),
            ConflictType::PlanViolation,
            Priority::P2,
        ))
    }
}

struct UnguardedAwaitRule(Regex);

impl ConflictRule for UnguardedAwaitRule {
    fn check(&self, change: &str, _docs: &ContractDocs) -> Option<Conflict> {
        let guarded = change.contains("try") && change.contains("catch");
        (self.0.is_match(change) && !guarded).then(|| {
            conflict(
                "Asynchronous call without try/catch error handling",
                ConflictType::PlanViolation,
                Priority::P1,
            )
        })
    }
}

struct HardcodedSecretRule(Regex);

impl ConflictRule for HardcodedSecretRule {
    fn check(&self, change: &str, _docs: &ContractDocs) -> Option<Conflict> {
        self.0.is_match(change).then(|| {
            conflict(
                "Hardcoded secret in source; load it from configuration instead",
                ConflictType::SchemaBreak,
                Priority::P0,
            )
        })
    }
}

struct OversizedChangeRule {
    max_lines: usize,
}

impl ConflictRule for OversizedChangeRule {
    fn check(&self, change: &str, _docs: &ContractDocs) -> Option<Conflict> {
        let lines = change.lines().count();
        (lines > self.max_lines).then(|| {
            conflict(
                format!(
                    "Changeset spans {} lines (limit {}); split it into smaller steps",
                    lines, self.max_lines
                ),
                ConflictType::PlanViolation,
                Priority::P2,
            )
        })
    }
}

struct DirectFsRule(Regex);

impl ConflictRule for DirectFsRule {
    fn check(&self, change: &str, _docs: &ContractDocs) -> Option<Conflict> {
        self.0.is_match(change).then(|| {
            conflict(
                "Direct file system access bypasses the memory bank",
                ConflictType::PlanViolation,
                Priority::P1,
            )
        })
    }
}

/// Plain text of the execution solutions as the change to check
///
/// Descriptions and code go through unescaped so rules see the source as written.
pub fn change_text(solutions: &[Solution]) -> String {
    let mut lines = Vec::new();
    for solution in solutions {
        lines.push(format!("{}: {}", solution.kind, solution.description));
        if let Some(code) = &solution.code {
            lines.push(code.clone());
        }
    }
    lines.join("\n")
}

/// Runs the conflict rule list over a change
pub struct ConflictChecker {
    rules: Vec<Box<dyn ConflictRule>>,
}

impl ConflictChecker {
    pub fn new(max_change_lines: usize) -> Result<Self, EngineError> {
        let rules: Vec<Box<dyn ConflictRule>> = vec![
            Box::new(AnyTypeRule(compile(r":\s*any\b|<any>|\bas\s+any\b")?)),
            Box::new(SnakeCaseRule(compile(
                r"\b(?:const|let|var|function)\s+([a-z][a-z0-9]*_[a-z0-9_]+)",
            )?)),
            Box::new(UnguardedAwaitRule(compile(r"\bawait\b")?)),
            Box::new(HardcodedSecretRule(compile(
                r#"(?i)\w*(api[_-]?key|secret|password|token)\w*["']?\s*[:=]\s*["'][^"']+["']"#,
            )?)),
            Box::new(OversizedChangeRule {
                max_lines: max_change_lines,
            }),
            Box::new(DirectFsRule(compile(
                r#"\bfs\.\w+\s*\(|require\(\s*["'](node:)?fs(/promises)?["']\s*\)|from\s+["'](node:)?fs(/promises)?["']"#,
            )?)),
        ];
        Ok(Self { rules })
    }

    pub fn check(&self, change: &str, docs: &ContractDocs) -> ConflictReport {
        ConflictReport {
            conflicts: self
                .rules
                .iter()
                .filter_map(|rule| rule.check(change, docs))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ConflictChecker {
        ConflictChecker::new(200).unwrap()
    }

    #[test]
    fn test_hardcoded_secret_is_p0_schema_break() {
        let report = checker().check(r#"API_KEY = "abc123""#, &ContractDocs::default());

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictType::SchemaBreak);
        assert_eq!(report.conflicts[0].priority, Priority::P0);
    }

    #[test]
    fn test_change_text_keeps_double_quoted_secret_detectable() {
        let solutions = vec![
            Solution {
                kind: "fix".to_string(),
                description: "Replace var with let or const".to_string(),
                code: Some(r#"var API_KEY = "abc123";"#.to_string()),
            },
            Solution {
                kind: "review".to_string(),
                description: "Check the import path".to_string(),
                code: None,
            },
        ];

        let text = change_text(&solutions);
        assert_eq!(
            text,
            "fix: Replace var with let or const\nvar API_KEY = \"abc123\";\nreview: Check the import path"
        );

        let report = checker().check(&text, &ContractDocs::default());
        assert!(report
            .conflicts
            .iter()
            .any(|c| c.kind == ConflictType::SchemaBreak && c.priority == Priority::P0));
    }

    #[test]
    fn test_any_typing_is_unsafe_type() {
        let report = checker().check("function f(x: any) {}", &ContractDocs::default());
        assert_eq!(report.conflicts[0].kind, ConflictType::UnsafeType);
        assert_eq!(report.conflicts[0].priority, Priority::P1);
    }

    #[test]
    fn test_snake_case_only_when_camel_case_mandated() {
        let change = "const user_name = 'a';";
        assert!(checker().check(change, &ContractDocs::default()).conflicts.is_empty());

        let docs = ContractDocs {
            api_contracts: None,
            system_patterns: Some("Naming: camelCase for variables".to_string()),
        };
        let report = checker().check(change, &docs);
        assert_eq!(report.conflicts.len(), 1);
        assert!(report.conflicts[0].message.contains("user_name"));
        assert_eq!(report.conflicts[0].priority, Priority::P2);
    }

    #[test]
    fn test_await_needs_try_catch() {
        let docs = ContractDocs::default();
        let bare = checker().check("const r = await load();", &docs);
        assert_eq!(bare.conflicts[0].priority, Priority::P1);

        let guarded = checker().check("try { await load(); } catch (e) {}", &docs);
        assert!(guarded.conflicts.is_empty());
    }

    #[test]
    fn test_oversized_change() {
        let change = "let a = 1;\n".repeat(5);
        let report = ConflictChecker::new(3)
            .unwrap()
            .check(&change, &ContractDocs::default());
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kind, ConflictType::PlanViolation);
    }

    #[test]
    fn test_direct_fs_access() {
        let docs = ContractDocs::default();
        assert_eq!(checker().check("fs.writeFileSync(p, d);", &docs).conflicts.len(), 1);
        assert_eq!(
            checker().check("import { readFile } from 'fs/promises';", &docs).conflicts.len(),
            1
        );
        assert!(checker().check("bank.write(p, d);", &docs).conflicts.is_empty());
    }

    #[test]
    fn test_rules_are_independent() {
        let change = r#"const token = "s3cr3t"; const v: any = await fs.readFile(p);"#;
        let report = checker().check(change, &ContractDocs::default());
        // secret, any, await, fs
        assert_eq!(report.conflicts.len(), 4);
    }
}
