//! Integration tests for `memory_bank_manager` driven through the router

use sdk::errors::EngineError;
use sdk::protocol::ToolRequest;
use sdk::types::{ArchiveStatus, MemoryBankArgs, MemoryBankResult, MemoryCategory};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use intellicode_engine::config::Config;
use intellicode_engine::delay::NoDelay;
use intellicode_engine::memory_bank::{initializer, MemoryBank};
use intellicode_engine::tools::{ToolRegistry, ToolRouter, ToolServices};

struct Bank {
    temp: TempDir,
    memory_root: PathBuf,
    router: ToolRouter,
}

fn bank() -> Bank {
    let temp = TempDir::new().unwrap();
    let config = Arc::new(Config::for_workspace(temp.path()).unwrap());
    let services = ToolServices::from_config(config.clone())
        .with_delay(Arc::new(NoDelay))
        .with_enhancer(None);

    let mut registry = ToolRegistry::new();
    registry.register_core(&services).unwrap();

    Bank {
        memory_root: config.core.memory_root.clone(),
        router: ToolRouter::new(registry, config.server.max_call_depth),
        temp,
    }
}

async fn call(bank: &Bank, args: MemoryBankArgs) -> Result<MemoryBankResult, EngineError> {
    bank.router
        .invoke(ToolRequest::MemoryBank(args))
        .await?
        .into_memory_bank()
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let bank = bank();
    let content = "# Notes\n\nUnicode survives: äöü ✓\n";

    let written = call(
        &bank,
        MemoryBankArgs::write(MemoryCategory::Dynamic, "notes.md", content),
    )
    .await
    .unwrap();
    let MemoryBankResult::Write { success, path } = written else {
        panic!("expected a write result");
    };
    assert!(success);
    assert_eq!(PathBuf::from(path), bank.memory_root.join("dynamic/notes.md"));

    let read = call(&bank, MemoryBankArgs::read(MemoryCategory::Dynamic, "notes.md"))
        .await
        .unwrap();
    assert_eq!(
        read,
        MemoryBankResult::Read {
            content: content.to_string()
        }
    );
}

#[tokio::test]
async fn test_update_appends_footer() {
    let bank = bank();
    let updated = call(
        &bank,
        MemoryBankArgs::update(MemoryCategory::Core, "activeContext.md", "Focus: parser"),
    )
    .await
    .unwrap();
    let MemoryBankResult::Update { timestamp, .. } = updated else {
        panic!("expected an update result");
    };

    let MemoryBankResult::Read { content } = call(
        &bank,
        MemoryBankArgs::read(MemoryCategory::Core, "activeContext.md"),
    )
    .await
    .unwrap() else {
        panic!("expected a read result");
    };
    assert_eq!(content, format!("Focus: parser\n\nLast updated: {}", timestamp));
}

#[tokio::test]
async fn test_read_missing_record_is_not_found() {
    let bank = bank();
    let err = call(&bank, MemoryBankArgs::read(MemoryCategory::Technical, "nope.md"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RecordNotFound { .. }));
}

#[tokio::test]
async fn test_write_requires_content_and_safe_name() {
    let bank = bank();

    let err = bank
        .router
        .invoke_raw(
            "memory_bank_manager",
            json!({ "action": "write", "file_category": "core", "file_name": "a.md" }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingParameter(ref p) if p == "content"));

    let err = call(
        &bank,
        MemoryBankArgs::write(MemoryCategory::Core, "../escape.md", "x"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPath(_)));
}

#[tokio::test]
async fn test_search_preview_is_bounded() {
    let bank = bank();
    let padding = "x".repeat(200);
    let content = format!("{} needle {}", padding, padding);
    call(
        &bank,
        MemoryBankArgs::write(MemoryCategory::Technical, "big.md", content),
    )
    .await
    .unwrap();

    let MemoryBankResult::Search { results } = call(
        &bank,
        MemoryBankArgs::search(MemoryCategory::Technical, "needle"),
    )
    .await
    .unwrap() else {
        panic!("expected search results");
    };

    assert_eq!(results.len(), 1);
    assert!(results[0].preview.contains("needle"));
    assert_eq!(results[0].preview.chars().count(), 50 + "needle".len() + 50);
}

#[tokio::test]
async fn test_search_missing_category_is_empty() {
    let bank = bank();
    let result = call(&bank, MemoryBankArgs::search(MemoryCategory::Drafts, "x"))
        .await
        .unwrap();
    assert_eq!(result, MemoryBankResult::Search { results: vec![] });
}

#[tokio::test]
async fn test_archive_moves_every_file() {
    let bank = bank();
    for name in ["a.md", "b.md", "c.md"] {
        call(
            &bank,
            MemoryBankArgs::write(MemoryCategory::Dynamic, name, name),
        )
        .await
        .unwrap();
    }

    let MemoryBankResult::Archive { archived } =
        call(&bank, MemoryBankArgs::archive(MemoryCategory::Dynamic))
            .await
            .unwrap()
    else {
        panic!("expected an archive result");
    };

    assert_eq!(archived.len(), 3);
    assert!(archived.iter().all(|e| e.status == ArchiveStatus::Success));
    for entry in &archived {
        let destination = PathBuf::from(entry.archived_path.as_ref().unwrap());
        assert!(destination.starts_with(bank.memory_root.join("archive/dynamic")));
        assert!(destination.is_file());
    }
    assert!(!bank.memory_root.join("dynamic/a.md").exists());
}

#[tokio::test]
async fn test_archive_of_archive_is_rejected() {
    let bank = bank();
    let err = call(&bank, MemoryBankArgs::archive(MemoryCategory::Archive))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_audit_after_init_covers_every_category() {
    let bank = bank();
    initializer::initialize(&MemoryBank::new(bank.memory_root.clone()))
        .await
        .unwrap();

    let MemoryBankResult::Audit(report) = call(&bank, MemoryBankArgs::audit_daily(None))
        .await
        .unwrap()
    else {
        panic!("expected an audit report");
    };

    assert!(report.success);
    assert_eq!(
        PathBuf::from(&report.audit_log_path),
        bank.memory_root.join("auto_generated/memory-audit.md")
    );
    assert!(report
        .entries
        .iter()
        .any(|e| e.file.as_deref() == Some("project-brief.md")));
    assert!(std::fs::read_to_string(&report.audit_log_path)
        .unwrap()
        .contains("project-brief.md"));
}

#[tokio::test]
async fn test_process_multimedia_imports_workspace_file() {
    let bank = bank();
    std::fs::write(bank.temp.path().join("diagram.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let result = bank
        .router
        .invoke_raw(
            "memory_bank_manager",
            json!({ "action": "process_multimedia", "source_path": "diagram.png" }),
        )
        .await
        .unwrap()
        .into_memory_bank()
        .unwrap();

    let MemoryBankResult::Write { path, .. } = result else {
        panic!("expected a write result");
    };
    assert!(PathBuf::from(&path).starts_with(bank.memory_root.join("auto_generated")));
    assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_external_search_without_search_tool() {
    let bank = bank();
    let err = call(&bank, MemoryBankArgs::external_search("rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ToolNotFound(ref name) if name == "web_search_enhanced"));
}
