//! Workflow, daily digest and context condensing tools

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use serde_json::json;

use super::{mismatched, object_schema, ToolServices};
use crate::summarizer::Summarizer;
use crate::workflow::condensing::Condenser;
use crate::workflow::{digest, WorkflowOrchestrator};

/// `roo_code_workflow`
pub struct WorkflowTool {
    orchestrator: WorkflowOrchestrator,
}

impl WorkflowTool {
    pub fn new(services: &ToolServices) -> Self {
        Self {
            orchestrator: WorkflowOrchestrator::new(
                services.config.priorities.default_compression_rate,
            ),
        }
    }
}

#[async_trait]
impl Tool for WorkflowTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::RooCodeWorkflow,
            "Execute a complete analysis workflow",
            object_schema(
                json!({
                    "workflow_type": {
                        "type": "string",
                        "enum": [
                            "full_analysis", "quick_check", "context_condensing",
                            "daily_digest", "generate_memory_map"
                        ]
                    },
                    "target_files": { "type": "array", "items": { "type": "string" } },
                    "priority_override": { "type": "string", "enum": ["P0", "P1", "P2"] },
                    "include_web_search": { "type": "boolean", "default": false },
                    "compression_rate": { "type": "number", "minimum": 0, "maximum": 1 }
                }),
                &["workflow_type"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::Workflow(args) => Ok(ToolResponse::Workflow(
                self.orchestrator.run(args, &ctx.router).await?,
            )),
            other => Err(mismatched(ToolName::RooCodeWorkflow, &other)),
        }
    }
}

/// `daily_digest_generator`
pub struct DailyDigestTool;

impl DailyDigestTool {
    pub fn new(_services: &ToolServices) -> Self {
        Self
    }
}

#[async_trait]
impl Tool for DailyDigestTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::DailyDigestGenerator,
            "Generate a daily summary of completed tasks, key decisions, errors and deadlines",
            object_schema(json!({}), &[]),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::DailyDigest(_) => {
                Ok(ToolResponse::DailyDigest(digest::generate(&ctx.router).await?))
            }
            other => Err(mismatched(ToolName::DailyDigestGenerator, &other)),
        }
    }
}

/// `context_condensing_process`
pub struct ContextCondensingTool {
    condenser: Condenser,
}

impl ContextCondensingTool {
    pub fn new(services: &ToolServices) -> Result<Self, EngineError> {
        let summarizer = Summarizer::new(&services.config, services.bank.clone(), None)?;
        Ok(Self {
            condenser: Condenser::new(summarizer),
        })
    }
}

#[async_trait]
impl Tool for ContextCondensingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::ContextCondensingProcess,
            "Condense memory documents by priority, with backup, draft and final summary",
            object_schema(
                json!({
                    "target_files": { "type": "array", "items": { "type": "string" } },
                    "compression_rate": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 1,
                        "default": 0.5
                    }
                }),
                &["target_files"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::ContextCondensing(args) => Ok(ToolResponse::ContextCondensing(
                self.condenser.run(&args, &ctx.router).await?,
            )),
            other => Err(mismatched(ToolName::ContextCondensingProcess, &other)),
        }
    }
}
