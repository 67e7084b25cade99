//! Conversation summarizer tool

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use serde_json::json;

use super::{mismatched, object_schema, ToolServices};
use crate::summarizer::Summarizer;

/// `conversation_summarizer`
pub struct SummarizerTool {
    summarizer: Summarizer,
}

impl SummarizerTool {
    pub fn new(services: &ToolServices) -> Result<Self, EngineError> {
        Ok(Self {
            summarizer: Summarizer::new(
                &services.config,
                services.bank.clone(),
                services.enhancer.clone(),
            )?,
        })
    }
}

#[async_trait]
impl Tool for SummarizerTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::ConversationSummarizer,
            "Summarize a conversation by priority level and save it to the memory bank",
            object_schema(
                json!({
                    "conversation_history": {
                        "type": "string",
                        "description": "The full conversation history to summarize."
                    },
                    "summary_type": { "type": "string", "enum": ["concise", "detailed"] },
                    "output_file": {
                        "type": "string",
                        "description": "Optional path of a Markdown file to save the summary to."
                    },
                    "override_compression_rate": { "type": "number", "minimum": 0, "maximum": 1 }
                }),
                &["conversation_history", "summary_type"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::Summarize(args) => {
                Ok(ToolResponse::Summary(self.summarizer.summarize(&args).await?))
            }
            other => Err(mismatched(ToolName::ConversationSummarizer, &other)),
        }
    }
}
