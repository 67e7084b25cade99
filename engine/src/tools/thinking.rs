//! Sequential thinking tool
//!
//! Produces a fixed problem-solving scaffold after the configured "thinking"
//! pause. The pause goes through `DelayHook` so tests run without it.

use async_trait::async_trait;
use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use sdk::types::{ThinkingArgs, ThinkingResult};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::{mismatched, object_schema, ToolServices};
use crate::delay::DelayHook;

const DEFAULT_DEPTH: u32 = 3;

/// `sequential_thinking_process`
pub struct SequentialThinkingTool {
    delay: Arc<dyn DelayHook>,
    max_depth: u32,
}

impl SequentialThinkingTool {
    pub fn new(services: &ToolServices) -> Self {
        Self {
            delay: Arc::clone(&services.delay),
            max_depth: services.config.integrations.sequential_thinking.max_depth,
        }
    }

    pub async fn think(&self, args: &ThinkingArgs) -> Result<ThinkingResult, EngineError> {
        if args.problem_statement.trim().is_empty() {
            return Err(EngineError::MissingParameter("problem_statement".to_string()));
        }
        info!("Sequential thinking on: {}", args.problem_statement);
        self.delay.pause("sequential thinking").await;

        let depth = args
            .thinking_depth
            .unwrap_or(DEFAULT_DEPTH)
            .clamp(1, self.max_depth.max(1));

        let scaffold = [
            format!("Understand the problem: {}", args.problem_statement),
            "Break the problem down into independent sub-problems".to_string(),
            "Generate candidate solutions for each sub-problem".to_string(),
            "Evaluate the candidates against the project constraints".to_string(),
            "Select a solution and define how to verify it".to_string(),
        ];
        let steps = scaffold
            .iter()
            .cycle()
            .take(depth as usize)
            .enumerate()
            .map(|(idx, step)| format!("Step {}: {}", idx + 1, step))
            .collect();

        let decisions = vec![
            "Decision 1: Prioritize based on current context.".to_string(),
            format!(
                "Decision 2: Choose the optimal path for '{}'.",
                args.problem_statement
            ),
        ];

        let alternatives = if args.include_alternatives.unwrap_or(true) {
            vec![
                "Alternative 1: Consider a different architectural pattern.".to_string(),
                "Alternative 2: Explore existing libraries for a quicker solution.".to_string(),
            ]
        } else {
            Vec::new()
        };

        Ok(ThinkingResult {
            status: "success".to_string(),
            message: format!(
                "Sequential thinking process completed for: \"{}\".",
                args.problem_statement
            ),
            problem_statement: args.problem_statement.clone(),
            thinking_depth: depth,
            steps,
            decisions,
            alternatives,
        })
    }
}

#[async_trait]
impl Tool for SequentialThinkingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolName::SequentialThinkingProcess,
            "Step-by-step problem solving with decision trees",
            object_schema(
                json!({
                    "problem_statement": { "type": "string" },
                    "thinking_depth": { "type": "number", "default": DEFAULT_DEPTH },
                    "include_alternatives": { "type": "boolean", "default": true }
                }),
                &["problem_statement"],
            ),
        )
    }

    async fn handle(
        &self,
        request: ToolRequest,
        _ctx: &ToolContext,
    ) -> Result<ToolResponse, EngineError> {
        match request {
            ToolRequest::SequentialThinking(args) => {
                Ok(ToolResponse::SequentialThinking(self.think(&args).await?))
            }
            other => Err(mismatched(ToolName::SequentialThinkingProcess, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::delay::NoDelay;
    use tempfile::TempDir;

    fn tool(temp: &TempDir) -> SequentialThinkingTool {
        let config = Arc::new(Config::for_workspace(temp.path()).unwrap());
        let services = ToolServices::from_config(config).with_delay(Arc::new(NoDelay));
        SequentialThinkingTool::new(&services)
    }

    fn args(depth: Option<u32>, alternatives: Option<bool>) -> ThinkingArgs {
        ThinkingArgs {
            problem_statement: "Speed up the indexer".to_string(),
            thinking_depth: depth,
            include_alternatives: alternatives,
        }
    }

    #[tokio::test]
    async fn test_depth_is_capped_by_config() {
        let temp = TempDir::new().unwrap();
        let result = tool(&temp).think(&args(Some(50), None)).await.unwrap();

        assert_eq!(result.thinking_depth, 5);
        assert_eq!(result.steps.len(), 5);
        assert!(result.steps[0].starts_with("Step 1: Understand the problem"));
        assert_eq!(result.alternatives.len(), 2);
    }

    #[tokio::test]
    async fn test_defaults_and_no_alternatives() {
        let temp = TempDir::new().unwrap();
        let result = tool(&temp).think(&args(None, Some(false))).await.unwrap();

        assert_eq!(result.thinking_depth, DEFAULT_DEPTH);
        assert!(result.alternatives.is_empty());
        assert_eq!(result.status, "success");
    }

    #[tokio::test]
    async fn test_empty_problem_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = tool(&temp)
            .think(&ThinkingArgs {
                problem_statement: " ".to_string(),
                thinking_depth: None,
                include_alternatives: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
