//! Context condensing
//!
//! Compresses memory documents by priority. Every target is backed up into
//! one archive file before anything else is written; the result goes to a
//! review draft and a final session document.

use chrono::Local;
use sdk::core_tool::RouterHandle;
use sdk::errors::EngineError;
use sdk::types::{CondensedFile, CondensingResult, ContextCondensingArgs, MemoryCategory, Priority};
use tracing::{info, warn};

use super::digest::{read_optional, write_document};
use crate::memory_bank::fs_safe_stamp;
use crate::summarizer::Summarizer;

/// Category a target lives in, from an explicit `category/` prefix or the
/// well-known document names
pub fn category_for(target: &str) -> MemoryCategory {
    if let Some((prefix, _)) = target.split_once('/') {
        if let Ok(category) = prefix.parse::<MemoryCategory>() {
            return category;
        }
    }

    let has = |names: &[&str]| names.iter().any(|n| target.contains(n));
    if has(&[
        "project-brief",
        "productContext",
        "activeContext",
        "techContext",
        "tech-context",
        "system-patterns",
    ]) {
        MemoryCategory::Core
    } else if has(&["project-plan", "roadmap"]) {
        MemoryCategory::Planning
    } else if has(&["error-log", "dependency-map", "api-contracts"]) {
        MemoryCategory::Technical
    } else if has(&["session-", "daily-digest"]) {
        MemoryCategory::AutoGenerated
    } else {
        MemoryCategory::Dynamic
    }
}

/// Retention priority of a target by name
pub fn priority_for(target: &str) -> Priority {
    let has = |names: &[&str]| names.iter().any(|n| target.contains(n));
    if has(&[
        "project-plan",
        "roadmap",
        "handover",
        "code_modifications",
        "code-changes",
    ]) {
        Priority::P0
    } else if has(&[
        "memory_bank_updates",
        "memory-bank-updates",
        "conflict-resolution",
    ]) {
        Priority::P1
    } else {
        Priority::P2
    }
}

/// Record name inside its category: only a leading category prefix is dropped
fn record_name(target: &str) -> &str {
    match target.split_once('/') {
        Some((prefix, rest)) if prefix.parse::<MemoryCategory>().is_ok() => rest,
        _ => target,
    }
}

pub struct Condenser {
    summarizer: Summarizer,
}

impl Condenser {
    pub fn new(summarizer: Summarizer) -> Self {
        Self { summarizer }
    }

    pub async fn run(
        &self,
        args: &ContextCondensingArgs,
        router: &RouterHandle,
    ) -> Result<CondensingResult, EngineError> {
        if args.target_files.is_empty() {
            return Err(EngineError::MissingParameter("target_files".to_string()));
        }
        let rate = self.summarizer.effective_rate(args.compression_rate)?;
        info!(
            "Condensing {} file(s) at rate {}",
            args.target_files.len(),
            rate
        );

        let mut sources = Vec::with_capacity(args.target_files.len());
        for target in &args.target_files {
            let read = read_optional(router, category_for(target), record_name(target)).await;
            let source = match read {
                Ok(Some(content)) => Ok(content),
                Ok(None) => Err(format!("{} not found in the memory bank", target)),
                Err(e) => Err(e.to_string()),
            };
            if let Err(e) = &source {
                warn!("Could not read {} for condensing: {}", target, e);
            }
            sources.push((target, source));
        }

        let backup = sources
            .iter()
            .map(|(target, source)| match source {
                Ok(content) => format!("--- FILE: {} ---\n{}\n", target, content),
                Err(_) => format!("--- FILE: {} (Read Failed) ---\n", target),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let backup_path = write_document(
            router,
            MemoryCategory::Archive,
            &format!("context-backup-{}.md", fs_safe_stamp()),
            backup,
        )
        .await?;

        let results: Vec<CondensedFile> = sources
            .into_iter()
            .map(|(target, source)| {
                let priority = priority_for(target);
                match source {
                    Ok(content) => {
                        let condensed = self.summarizer.condense(&content, priority, rate);
                        CondensedFile {
                            file: target.clone(),
                            original_size: content.len(),
                            condensed_size: condensed.len(),
                            condensed_content: condensed,
                            priority,
                            error: None,
                        }
                    }
                    Err(error) => CondensedFile {
                        file: target.clone(),
                        original_size: 0,
                        condensed_size: 0,
                        condensed_content: String::new(),
                        priority,
                        error: Some(error),
                    },
                }
            })
            .collect();

        let date = Local::now().format("%Y-%m-%d").to_string();
        let body = render_results(&results);
        let draft_path = write_document(
            router,
            MemoryCategory::Drafts,
            &format!("session-{}.md", date),
            format!(
                "[SESSION SUMMARY DRAFT]\nReview the condensed context below before it is finalized.\n\n{}",
                body
            ),
        )
        .await?;
        let final_path = write_document(
            router,
            MemoryCategory::Docs,
            &format!("session-{}.md", date),
            format!("# Session Summary - {}\n\n{}", date, body),
        )
        .await?;

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        let (status, message) = if failed == 0 {
            (
                "success",
                "Context condensing completed and summary generated.".to_string(),
            )
        } else {
            (
                "partial",
                format!("Context condensing completed; {} file(s) could not be read.", failed),
            )
        };

        Ok(CondensingResult {
            status: status.to_string(),
            message,
            backup_path,
            draft_path,
            final_path,
            results,
        })
    }
}

fn render_results(results: &[CondensedFile]) -> String {
    let mut out = String::from(
        "### Condensing Results\n\n| File | Original Size | Condensed Size | Priority |\n|---|---|---|---|\n",
    );
    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            r.file, r.original_size, r.condensed_size, r.priority
        ));
    }

    out.push_str("\n### Condensed Content\n");
    for r in results {
        match &r.error {
            Some(error) => out.push_str(&format!("\n--- {} (unreadable: {}) ---\n", r.file, error)),
            None => out.push_str(&format!(
                "\n--- {} ({}) ---\n{}\n",
                r.file,
                r.priority,
                r.condensed_content.trim_end()
            )),
        }
    }
    out
}
