//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: stdio tool server plus scheduler and watcher
//! - workflow: run one workflow and print its result
//! - call: invoke a single tool with JSON arguments
//! - tools: list the catalog
//! - init: seed the memory bank
//! - summarize: summarize a transcript file

use anyhow::{Context, Result};
use sdk::protocol::{ToolRequest, ToolResponse};
use sdk::types::{Priority, SummarizerArgs, SummaryType, WorkflowArgs, WorkflowType};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::memory_bank::{initializer, MemoryBank};
use crate::scheduler::Scheduler;
use crate::server::ToolServer;
use crate::tools::{ToolRegistry, ToolRouter, ToolServices};
use crate::watcher::FileWatcher;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Router with the standard catalog registered
pub fn build_router(config: Arc<Config>) -> Result<ToolRouter> {
    let max_depth = config.server.max_call_depth;
    let services = ToolServices::from_config(config);
    let registry =
        ToolRegistry::standard(&services).context("Failed to register the tool catalog")?;
    Ok(ToolRouter::new(registry, max_depth))
}

/// Serve the catalog over stdio until stdin closes
pub async fn handle_serve(config: Arc<Config>, no_schedule: bool, no_watch: bool) -> Result<()> {
    let bank = MemoryBank::new(config.core.memory_root.clone());
    initializer::initialize(&bank)
        .await
        .context("Failed to initialize the memory bank")?;

    let router = build_router(config.clone())?;

    let scheduler = if config.schedule.enabled && !no_schedule {
        Some(Scheduler::new(router.handle(), config.clone()).spawn())
    } else {
        tracing::info!("Scheduler disabled");
        None
    };

    let watcher = if config.watcher.enabled && !no_watch {
        Some(FileWatcher::new(router.handle(), &config).spawn())
    } else {
        tracing::info!("File watcher disabled");
        None
    };

    let server = ToolServer::new(router, config.server.summarize_after_messages);
    let outcome = server.serve_stdio().await;

    for task in [scheduler, watcher].into_iter().flatten() {
        task.abort();
    }

    outcome.context("Tool server failed")
}

/// Run a single workflow
pub async fn handle_workflow(
    config: Arc<Config>,
    workflow_type: WorkflowType,
    files: Vec<String>,
    priority: Option<Priority>,
    web_search: bool,
    rate: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let router = build_router(config)?;

    let mut args = WorkflowArgs::new(workflow_type, files);
    args.priority_override = priority;
    args.include_web_search = web_search;
    args.compression_rate = rate;

    let response = router
        .invoke(ToolRequest::Workflow(args))
        .await
        .with_context(|| format!("Workflow {} failed", workflow_type.as_str()))?;

    print_response(&response, format)
}

/// Invoke one tool by name
pub async fn handle_call(
    config: Arc<Config>,
    tool: &str,
    arguments: &str,
    format: OutputFormat,
) -> Result<()> {
    let arguments: Value =
        serde_json::from_str(arguments).context("Tool arguments must be a JSON object")?;
    let router = build_router(config)?;

    let response = router
        .invoke_raw(tool, arguments)
        .await
        .with_context(|| format!("Tool {} failed", tool))?;

    print_response(&response, format)
}

/// List registered tools
pub async fn handle_tools(config: Arc<Config>, format: OutputFormat) -> Result<()> {
    let router = build_router(config)?;
    let tools = router.descriptors();

    match format {
        OutputFormat::Text => {
            println!("Available tools ({}):", tools.len());
            println!();
            for tool in &tools {
                println!("  {}", tool.name);
                println!("    {}", tool.description);
            }
        }
        OutputFormat::Json => {
            let output = json!({ "tools": tools, "count": tools.len() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Create the memory bank layout
pub async fn handle_init(config: Arc<Config>, format: OutputFormat) -> Result<()> {
    let bank = MemoryBank::new(config.core.memory_root.clone());
    let created = initializer::initialize(&bank)
        .await
        .context("Failed to initialize the memory bank")?;

    match format {
        OutputFormat::Text => {
            println!("Memory bank ready at {}", bank.root().display());
            if created.is_empty() {
                println!("All default documents already exist.");
            } else {
                for name in &created {
                    println!("  created {}", name);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "memory_root": bank.root(),
                "created": created,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Summarize a transcript file
pub async fn handle_summarize(
    config: Arc<Config>,
    file: &Path,
    summary_type: SummaryType,
    output: Option<String>,
    rate: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let transcript = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read transcript {}", file.display()))?;
    let router = build_router(config)?;

    let response = router
        .invoke(ToolRequest::Summarize(SummarizerArgs {
            conversation_history: transcript,
            summary_type,
            output_file: output,
            override_compression_rate: rate,
        }))
        .await
        .context("Summarization failed")?;

    match (format, response) {
        (OutputFormat::Text, ToolResponse::Summary(result)) => {
            println!("{}", result.summary);
            Ok(())
        }
        (format, response) => print_response(&response, format),
    }
}

fn print_response(response: &ToolResponse, format: OutputFormat) -> Result<()> {
    let value = response.to_json()?;
    match format {
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string(&value)?),
    }
    Ok(())
}
