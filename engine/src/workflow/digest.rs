//! Daily digest generation

use chrono::{Local, Utc};
use sdk::core_tool::RouterHandle;
use sdk::errors::EngineError;
use sdk::protocol::ToolRequest;
use sdk::types::{DigestResult, MemoryBankArgs, MemoryBankResult, MemoryCategory};
use tracing::{debug, info};

/// Sections of the digest as `(heading, category, file, placeholder)`
const SECTIONS: [(&str, MemoryCategory, &str, &str); 4] = [
    (
        "Completed Tasks",
        MemoryCategory::Dynamic,
        "progress.md",
        "No completed tasks recorded.",
    ),
    (
        "Key Decisions",
        MemoryCategory::Dynamic,
        "handover.md",
        "No key decisions recorded.",
    ),
    (
        "Errors",
        MemoryCategory::Technical,
        "error-log.md",
        "No errors recorded.",
    ),
    (
        "Deadlines",
        MemoryCategory::Planning,
        "project-plan.md",
        "No deadlines recorded.",
    ),
];

/// Read a memory document through the router; `None` when it does not exist
pub(crate) async fn read_optional(
    router: &RouterHandle,
    category: MemoryCategory,
    name: &str,
) -> Result<Option<String>, EngineError> {
    let response = router
        .call(ToolRequest::MemoryBank(MemoryBankArgs::read(category, name)))
        .await;

    match response {
        Ok(response) => match response.into_memory_bank()? {
            MemoryBankResult::Read { content } => Ok(Some(content)),
            _ => Err(EngineError::UnexpectedResponse {
                tool: "memory_bank_manager".to_string(),
                expected: "Read".to_string(),
            }),
        },
        Err(EngineError::RecordNotFound { .. }) => {
            debug!("{}/{} not found", category, name);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Write a memory document through the router and return its path
pub(crate) async fn write_document(
    router: &RouterHandle,
    category: MemoryCategory,
    name: &str,
    content: String,
) -> Result<String, EngineError> {
    let response = router
        .call(ToolRequest::MemoryBank(MemoryBankArgs::write(category, name, content)))
        .await?
        .into_memory_bank()?;

    match response {
        MemoryBankResult::Write { path, .. } => Ok(path),
        _ => Err(EngineError::UnexpectedResponse {
            tool: "memory_bank_manager".to_string(),
            expected: "Write".to_string(),
        }),
    }
}

/// Collect progress, decisions, errors and deadlines into today's digest
pub async fn generate(router: &RouterHandle) -> Result<DigestResult, EngineError> {
    info!("Generating daily digest");
    let today = Local::now();

    let mut document = format!("# Daily Digest - {}\n", today.format("%Y-%m-%d"));
    for (heading, category, name, placeholder) in SECTIONS {
        let body = read_optional(router, category, name)
            .await?
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| placeholder.to_string());
        document.push_str(&format!("\n## {}\n{}\n", heading, body.trim_end()));
    }

    let name = format!("daily-digest-{}.md", today.format("%Y-%m-%d"));
    let path = write_document(router, MemoryCategory::AutoGenerated, &name, document).await?;

    info!("Daily digest written to {}", path);
    Ok(DigestResult {
        generated: true,
        timestamp: Utc::now().to_rfc3339(),
        path,
        message: "Daily digest generated successfully.".to_string(),
    })
}
