//! Inspection phase
//!
//! Reads the target file and extracts its module dependencies from the
//! syntax tree. Failures never abort: an unreadable file yields a report with
//! no content, and an unparsable one yields no dependencies.

use sdk::types::InspectionReport;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Tree};

/// Grammar matching the file extension; TypeScript for anything unknown
fn language_for(path: &Path) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => {
            tree_sitter_javascript::LANGUAGE.into()
        }
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

/// Inspect one file
///
/// `display_path` is echoed back in the report as given by the caller.
pub async fn inspect(path: &Path, display_path: &str) -> InspectionReport {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Inspection could not read {}: {}", path.display(), e);
            return InspectionReport {
                file_path: display_path.to_string(),
                file_content: None,
                dependencies: Vec::new(),
                complexity_score: 0,
            };
        }
    };

    let dependencies = extract_dependencies(&content, language_for(path));
    debug!(
        "Inspected {}: {} line(s), {} dependencies",
        display_path,
        content.lines().count(),
        dependencies.len()
    );

    InspectionReport {
        file_path: display_path.to_string(),
        complexity_score: content.lines().count(),
        dependencies,
        file_content: Some(content),
    }
}

/// Module specifiers referenced by `import`, `export ... from`, `require()`
/// and dynamic `import()`, in source order without duplicates
pub fn extract_dependencies(source: &str, language: Language) -> Vec<String> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        warn!("Failed to load grammar: {}", e);
        return Vec::new();
    }

    let Some(tree) = parser.parse(source, None) else {
        warn!("Parser produced no syntax tree");
        return Vec::new();
    };

    let found = collect_specifiers(&tree, source.as_bytes());

    let mut unique = Vec::with_capacity(found.len());
    for dep in found {
        if !unique.contains(&dep) {
            unique.push(dep);
        }
    }
    unique
}

/// Pre-order walk with a cursor; nesting depth never touches the call stack
fn collect_specifiers(tree: &Tree, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = tree.walk();

    loop {
        if let Some(spec) = specifier(cursor.node(), source) {
            out.push(spec);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

fn specifier(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "import_statement" | "export_statement" => node
            .child_by_field_name("source")
            .and_then(|s| string_literal(s, source)),
        "call_expression" => call_specifier(node, source),
        _ => None,
    }
}

/// `require("x")` or `import("x")` with a literal argument
fn call_specifier(node: Node, source: &[u8]) -> Option<String> {
    let function = node.child_by_field_name("function")?;
    let is_loader = match function.kind() {
        "import" => true,
        "identifier" => node_text(function, source) == "require",
        _ => false,
    };
    if !is_loader {
        return None;
    }

    let arguments = node.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    string_literal(first, source)
}

/// Text of a string literal without quotes; template strings only when
/// they contain no substitutions
fn string_literal(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let has_substitution = node
                .children(&mut node.walk())
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                return None;
            }
        }
        _ => return None,
    }

    let text = node_text(node, source);
    let trimmed = text.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn node_text(node: Node, source: &[u8]) -> String {
    std::str::from_utf8(&source[node.byte_range()])
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts() -> Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    #[test]
    fn test_extracts_static_imports_and_reexports() {
        let source = r#"
import fs from "fs";
import { join } from 'path';
import type { Config } from "./config";
export { helper } from "./helpers";
export * from "./types";
const x = 1;
"#;
        assert_eq!(
            extract_dependencies(source, ts()),
            vec!["fs", "path", "./config", "./helpers", "./types"]
        );
    }

    #[test]
    fn test_extracts_require_and_dynamic_import() {
        let source = r#"
const express = require("express");
async function load() {
    const mod = await import("./lazy");
    const other = await import(`./plugins/${name}`);
    return mod;
}
"#;
        assert_eq!(
            extract_dependencies(source, tree_sitter_javascript::LANGUAGE.into()),
            vec!["express", "./lazy"]
        );
    }

    #[test]
    fn test_deduplicates_in_source_order() {
        let source = "import a from 'b';\nconst c = require('b');\nimport d from 'e';\n";
        assert_eq!(extract_dependencies(source, ts()), vec!["b", "e"]);
    }

    #[test]
    fn test_deeply_nested_expression_does_not_overflow() {
        let depth = 5000;
        let source = format!(
            "import a from './a';\nconst x = {}1{};\nconst b = require('./b');\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );

        assert_eq!(extract_dependencies(&source, ts()), vec!["./a", "./b"]);
    }

    #[test]
    fn test_language_by_extension() {
        let tsx: Language = tree_sitter_typescript::LANGUAGE_TSX.into();
        let js: Language = tree_sitter_javascript::LANGUAGE.into();
        assert_eq!(language_for(Path::new("a.tsx")), tsx);
        assert_eq!(language_for(Path::new("a.mjs")), js);
        assert_eq!(language_for(Path::new("a.ts")), ts());
    }

    #[tokio::test]
    async fn test_inspect_counts_lines() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.ts");
        std::fs::write(&file, "import x from './x';\nconsole.log(x);\n").unwrap();

        let report = inspect(&file, "index.ts").await;
        assert_eq!(report.file_path, "index.ts");
        assert_eq!(report.complexity_score, 2);
        assert_eq!(report.dependencies, vec!["./x"]);
        assert!(report.file_content.is_some());
    }

    #[tokio::test]
    async fn test_inspect_missing_file_is_soft() {
        let temp = TempDir::new().unwrap();
        let report = inspect(&temp.path().join("missing.ts"), "missing.ts").await;

        assert!(report.file_content.is_none());
        assert!(report.dependencies.is_empty());
        assert_eq!(report.complexity_score, 0);
    }
}
