//! Memory bank tool
//!
//! Thin dispatch from `MemoryBankArgs` onto `MemoryBank`. The only action
//! that leaves the bank is `external_search`, which forwards to the web
//! search tool through the router.

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use sdk::types::{MemoryAction, MemoryBankArgs, MemoryBankResult, SearchType, WebSearchArgs};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{mismatched, object_schema, ToolServices};
use crate::config::Config;
use crate::memory_bank::MemoryBank;

/// `memory_bank_manager`
pub struct MemoryBankTool {
    bank: MemoryBank,
    config: Arc<Config>,
}

impl MemoryBankTool {
    pub fn new(services: &ToolServices) -> Self {
        Self {
            bank: services.bank.clone(),
            config: Arc::clone(&services.config),
        }
    }

    async fn dispatch(
        &self,
        args: MemoryBankArgs,
        ctx: &ToolContext,
    ) -> Result<MemoryBankResult, EngineError> {
        debug!("Memory bank action {:?}", args.action);

        let result = match args.action {
            MemoryAction::Read => MemoryBankResult::Read {
                content: self.bank.read(args.category()?, args.name()?).await?,
            },
            MemoryAction::Write => {
                let content = required(&args.content, "content")?;
                let path = self.bank.write(args.category()?, args.name()?, content).await?;
                MemoryBankResult::Write {
                    success: true,
                    path: path.to_string_lossy().into_owned(),
                }
            }
            MemoryAction::Update => {
                let content = required(&args.content, "content")?;
                let timestamp = self.bank.update(args.category()?, args.name()?, content).await?;
                MemoryBankResult::Update {
                    success: true,
                    timestamp,
                }
            }
            MemoryAction::Archive => MemoryBankResult::Archive {
                archived: self.bank.archive(args.category()?).await?,
            },
            MemoryAction::Search => {
                let query = required(&args.search_query, "search_query")?;
                MemoryBankResult::Search {
                    results: self.bank.search(args.category()?, query).await?,
                }
            }
            MemoryAction::ExternalSearch => {
                let query = required(&args.search_query, "search_query")?;
                if query.trim().is_empty() {
                    return Err(EngineError::MissingParameter("search_query".to_string()));
                }
                let external_results = ctx
                    .router
                    .call(ToolRequest::WebSearch(WebSearchArgs {
                        query: query.to_string(),
                        search_type: SearchType::General,
                        max_results: 10,
                    }))
                    .await?
                    .into_web_search()?;
                MemoryBankResult::ExternalSearch { external_results }
            }
            MemoryAction::ProcessMultimedia => {
                let source = required(&args.source_path, "source_path")?;
                let stored = self.bank.import_file(&self.resolve(source)).await?;
                MemoryBankResult::Write {
                    success: true,
                    path: stored.to_string_lossy().into_owned(),
                }
            }
            MemoryAction::AuditDaily => {
                let report_name = args
                    .file_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(&self.config.memory.audit_report);
                MemoryBankResult::Audit(self.bank.audit_daily(report_name).await?)
            }
        };
        Ok(result)
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.core.workspace.join(path)
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, EngineError> {
    value
        .as_deref()
        .ok_or_else(|| EngineError::MissingParameter(name.to_string()))
}

#[async_trait]
impl Tool for MemoryBankTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::MemoryBankManager,
            "Read, write, update, archive, search and audit memory bank documents",
            object_schema(
                json!({
                    "action": {
                        "type": "string",
                        "enum": [
                            "read", "write", "update", "archive", "search",
                            "external_search", "process_multimedia", "audit_daily"
                        ]
                    },
                    "file_category": {
                        "type": "string",
                        "enum": [
                            "core", "dynamic", "planning", "technical",
                            "auto_generated", "archive", "drafts", "docs"
                        ]
                    },
                    "file_name": { "type": "string" },
                    "content": { "type": "string" },
                    "search_query": { "type": "string" },
                    "source_path": { "type": "string" }
                }),
                &["action"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::MemoryBank(args) => {
                Ok(ToolResponse::MemoryBank(self.dispatch(args, ctx).await?))
            }
            other => Err(mismatched(ToolName::MemoryBankManager, &other)),
        }
    }
}
