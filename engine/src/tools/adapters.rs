//! Tools backed by external capabilities: ESLint, tsc and SerpAPI

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use serde_json::json;

use super::{mismatched, object_schema, ToolServices};
use crate::integrations::eslint::EslintRunner;
use crate::integrations::serpapi::SerpApiClient;
use crate::integrations::tsc::TscRunner;

/// `eslint_analysis`
pub struct LintTool {
    runner: EslintRunner,
}

impl LintTool {
    pub fn new(services: &ToolServices) -> Self {
        Self {
            runner: EslintRunner::new(
                services.config.integrations.eslint.clone(),
                services.config.core.workspace.clone(),
            ),
        }
    }
}

#[async_trait]
impl Tool for LintTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::EslintAnalysis,
            "Run ESLint on a file and report errors and warnings",
            object_schema(
                json!({
                    "file_path": { "type": "string" },
                    "auto_fix": { "type": "boolean", "default": false }
                }),
                &["file_path"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::Lint(args) => Ok(ToolResponse::Lint(self.runner.lint(&args).await?)),
            other => Err(mismatched(ToolName::EslintAnalysis, &other)),
        }
    }
}

/// `typescript_diagnostics`
pub struct TypeCheckTool {
    runner: TscRunner,
}

impl TypeCheckTool {
    pub fn new(services: &ToolServices) -> Result<Self, EngineError> {
        Ok(Self {
            runner: TscRunner::new(
                services.config.integrations.typescript.clone(),
                services.config.core.workspace.clone(),
            )?,
        })
    }
}

#[async_trait]
impl Tool for TypeCheckTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::TypescriptDiagnostics,
            "Type-check a file with the TypeScript compiler",
            object_schema(
                json!({
                    "file_path": { "type": "string" },
                    "check_type": { "type": "string", "enum": ["syntax", "semantic", "all"] },
                    "include_suggestions": { "type": "boolean", "default": true }
                }),
                &["file_path", "check_type"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::TypeCheck(args) => {
                Ok(ToolResponse::TypeCheck(self.runner.check(&args).await?))
            }
            other => Err(mismatched(ToolName::TypescriptDiagnostics, &other)),
        }
    }
}

/// `web_search_enhanced`
pub struct WebSearchTool {
    client: SerpApiClient,
}

impl WebSearchTool {
    pub fn new(services: &ToolServices) -> Self {
        Self {
            client: SerpApiClient::new(
                services.config.integrations.serpapi.clone(),
                services.config.serpapi_cache_dir(),
            ),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::WebSearchEnhanced,
            "Web search through SerpAPI with result caching",
            object_schema(
                json!({
                    "query": { "type": "string" },
                    "search_type": {
                        "type": "string",
                        "enum": ["general", "code", "documentation", "error_solution"]
                    },
                    "max_results": { "type": "number", "default": 10 }
                }),
                &["query", "search_type"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::WebSearch(args) => {
                Ok(ToolResponse::WebSearch(self.client.search(&args).await?))
            }
            other => Err(mismatched(ToolName::WebSearchEnhanced, &other)),
        }
    }
}
