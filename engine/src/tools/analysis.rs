//! Code intelligence and memory map tools

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use serde_json::json;
use std::sync::Arc;

use super::{mismatched, object_schema, ToolServices};
use crate::analysis::AnalysisPipeline;

/// `code_intelligence_analyze`
pub struct CodeIntelligenceTool {
    pipeline: Arc<AnalysisPipeline>,
}

impl CodeIntelligenceTool {
    pub fn new(services: &ToolServices) -> Result<Self, EngineError> {
        Ok(Self {
            pipeline: Arc::new(AnalysisPipeline::new(&services.config, services.bank.clone())?),
        })
    }
}

#[async_trait]
impl Tool for CodeIntelligenceTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::CodeIntelligenceAnalyze,
            "Multi-phase code analysis: Inspection → Diagnosis → Execution → Conflict check",
            object_schema(
                json!({
                    "phase": {
                        "type": "string",
                        "enum": ["inspection", "diagnosis", "execution", "conflict_check", "all"]
                    },
                    "file_path": { "type": "string" },
                    "context_files": { "type": "array", "items": { "type": "string" } },
                    "priority_level": { "type": "string", "enum": ["P0", "P1", "P2"] },
                    "diagnosis_results": { "type": "object" },
                    "proposed_change": { "type": "string" }
                }),
                &["phase", "file_path"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::Analysis(args) => Ok(ToolResponse::Analysis(
                self.pipeline.run(args, &ctx.router).await?,
            )),
            other => Err(mismatched(ToolName::CodeIntelligenceAnalyze, &other)),
        }
    }
}

/// `generate_memory_map`
pub struct MemoryMapTool {
    pipeline: Arc<AnalysisPipeline>,
}

impl MemoryMapTool {
    pub fn new(services: &ToolServices) -> Result<Self, EngineError> {
        Ok(Self {
            pipeline: Arc::new(AnalysisPipeline::new(&services.config, services.bank.clone())?),
        })
    }
}

#[async_trait]
impl Tool for MemoryMapTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::GenerateMemoryMap,
            "Render a file's dependencies as a Mermaid diagram in technical/dependency-map.md",
            object_schema(json!({ "file_path": { "type": "string" } }), &["file_path"]),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::MemoryMap(args) => Ok(ToolResponse::MemoryMap(
                self.pipeline.memory_map(&args.file_path).await?,
            )),
            other => Err(mismatched(ToolName::GenerateMemoryMap, &other)),
        }
    }
}
