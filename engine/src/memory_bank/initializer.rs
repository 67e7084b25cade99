//! Memory bank seeding
//!
//! Creates the category layout and the default documents a fresh project
//! starts with. Existing files are never touched.

use sdk::errors::EngineError;
use sdk::types::MemoryCategory;
use tokio::fs;
use tracing::{debug, info};

use super::MemoryBank;

/// Categories mirrored under archive/ from the start
const ARCHIVED_CATEGORIES: [MemoryCategory; 3] = [
    MemoryCategory::Core,
    MemoryCategory::Dynamic,
    MemoryCategory::Technical,
];

/// Default documents as `(category, file name, body)`
pub const DEFAULT_DOCUMENTS: &[(MemoryCategory, &str, &str)] = &[
    (
        MemoryCategory::Core,
        "project-brief.md",
        "# Project Brief\n\nScope, core requirements and goals of the project.\n",
    ),
    (
        MemoryCategory::Core,
        "productContext.md",
        "# Product Context\n\nWhy the project exists, the problems it solves and the intended user experience.\n",
    ),
    (
        MemoryCategory::Core,
        "activeContext.md",
        "# Active Context\n\nCurrent focus, recent changes, next steps and open decisions.\n",
    ),
    (
        MemoryCategory::Core,
        "system-patterns.md",
        "# System Patterns\n\nArchitecture, key technical decisions, design patterns and component relationships.\n",
    ),
    (
        MemoryCategory::Core,
        "techContext.md",
        "# Technical Context\n\nTechnologies, development setup, constraints and dependencies.\n",
    ),
    (
        MemoryCategory::Dynamic,
        "progress.md",
        "# Progress Log\n\nWhat works, what is left, current status and known issues.\n",
    ),
    (
        MemoryCategory::Planning,
        "project-plan.md",
        "# Project Plan\n\nObjectives, timeline and milestones.\n",
    ),
    (
        MemoryCategory::Planning,
        "roadmap.md",
        "# Roadmap\n\nFuture milestones and long-term direction.\n",
    ),
    (
        MemoryCategory::Technical,
        "error-log.md",
        "# Error Log\n\nErrors met during development and how they were resolved.\n",
    ),
    (
        MemoryCategory::Technical,
        "dependency-map.md",
        "# Dependency Map\n\nDependencies between files and components.\n",
    ),
    (
        MemoryCategory::Technical,
        "api-contracts.md",
        "# API Contracts\n\nPublic interfaces and the design rules they follow.\n",
    ),
];

/// Create every category directory and seed missing default documents
///
/// Returns the `category/name` of each document that was created.
pub async fn initialize(bank: &MemoryBank) -> Result<Vec<String>, EngineError> {
    for category in MemoryCategory::ALL {
        fs::create_dir_all(bank.category_dir(category)).await?;
    }
    for category in ARCHIVED_CATEGORIES {
        fs::create_dir_all(
            bank.category_dir(MemoryCategory::Archive)
                .join(category.as_str()),
        )
        .await?;
    }

    let mut created = Vec::new();
    for (category, name, body) in DEFAULT_DOCUMENTS {
        let path = bank.record_path(*category, name)?;
        if fs::try_exists(&path).await? {
            debug!("Memory document {}/{} exists, skipping", category, name);
            continue;
        }

        bank.write(*category, name, body).await?;
        created.push(format!("{}/{}", category, name));
    }

    info!(
        "Memory bank ready at {} ({} document(s) created)",
        bank.root().display(),
        created.len()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_creates_layout_and_defaults() {
        let temp = TempDir::new().unwrap();
        let bank = MemoryBank::new(temp.path().join("memory"));

        let created = initialize(&bank).await.unwrap();
        assert_eq!(created.len(), DEFAULT_DOCUMENTS.len());

        for category in MemoryCategory::ALL {
            assert!(bank.category_dir(category).is_dir());
        }
        assert!(bank.root().join("archive/core").is_dir());

        let contracts = bank
            .read(MemoryCategory::Technical, "api-contracts.md")
            .await
            .unwrap();
        assert!(contracts.starts_with("# API Contracts"));
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_documents() {
        let temp = TempDir::new().unwrap();
        let bank = MemoryBank::new(temp.path().join("memory"));
        bank.write(MemoryCategory::Dynamic, "progress.md", "custom")
            .await
            .unwrap();

        let created = initialize(&bank).await.unwrap();
        assert!(!created.contains(&"dynamic/progress.md".to_string()));
        assert_eq!(
            bank.read(MemoryCategory::Dynamic, "progress.md").await.unwrap(),
            "custom"
        );

        // Second run creates nothing
        assert!(initialize(&bank).await.unwrap().is_empty());
    }
}
