//! Typed tool protocol
//!
//! The catalog is closed: every tool has a `ToolName`, a `ToolRequest`
//! variant carrying its argument struct and a `ToolResponse` variant
//! carrying its result struct. The untyped `(name, JSON)` form only exists
//! at the wire boundary and is converted with [`ToolRequest::from_call`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;
use crate::types::*;

/// Name of a tool in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    CodeIntelligenceAnalyze,
    MemoryBankManager,
    GenerateMemoryMap,
    RooCodeWorkflow,
    ConversationSummarizer,
    EslintAnalysis,
    TypescriptDiagnostics,
    WebSearchEnhanced,
    DailyDigestGenerator,
    ContextCondensingProcess,
    SequentialThinkingProcess,
}

impl ToolName {
    pub const ALL: [ToolName; 11] = [
        ToolName::CodeIntelligenceAnalyze,
        ToolName::MemoryBankManager,
        ToolName::GenerateMemoryMap,
        ToolName::RooCodeWorkflow,
        ToolName::ConversationSummarizer,
        ToolName::EslintAnalysis,
        ToolName::TypescriptDiagnostics,
        ToolName::WebSearchEnhanced,
        ToolName::DailyDigestGenerator,
        ToolName::ContextCondensingProcess,
        ToolName::SequentialThinkingProcess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::CodeIntelligenceAnalyze => "code_intelligence_analyze",
            ToolName::MemoryBankManager => "memory_bank_manager",
            ToolName::GenerateMemoryMap => "generate_memory_map",
            ToolName::RooCodeWorkflow => "roo_code_workflow",
            ToolName::ConversationSummarizer => "conversation_summarizer",
            ToolName::EslintAnalysis => "eslint_analysis",
            ToolName::TypescriptDiagnostics => "typescript_diagnostics",
            ToolName::WebSearchEnhanced => "web_search_enhanced",
            ToolName::DailyDigestGenerator => "daily_digest_generator",
            ToolName::ContextCondensingProcess => "context_condensing_process",
            ToolName::SequentialThinkingProcess => "sequential_thinking_process",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| EngineError::ToolNotFound(s.to_string()))
    }
}

/// A request addressed to exactly one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolRequest {
    #[serde(rename = "code_intelligence_analyze")]
    Analysis(CodeIntelligenceArgs),
    #[serde(rename = "memory_bank_manager")]
    MemoryBank(MemoryBankArgs),
    #[serde(rename = "generate_memory_map")]
    MemoryMap(MemoryMapArgs),
    #[serde(rename = "roo_code_workflow")]
    Workflow(WorkflowArgs),
    #[serde(rename = "conversation_summarizer")]
    Summarize(SummarizerArgs),
    #[serde(rename = "eslint_analysis")]
    Lint(LintArgs),
    #[serde(rename = "typescript_diagnostics")]
    TypeCheck(TypeCheckArgs),
    #[serde(rename = "web_search_enhanced")]
    WebSearch(WebSearchArgs),
    #[serde(rename = "daily_digest_generator")]
    DailyDigest(DailyDigestArgs),
    #[serde(rename = "context_condensing_process")]
    ContextCondensing(ContextCondensingArgs),
    #[serde(rename = "sequential_thinking_process")]
    SequentialThinking(ThinkingArgs),
}

fn parse_args<T: serde::de::DeserializeOwned>(name: ToolName, args: Value) -> Result<T, EngineError> {
    // Tools without arguments accept `null` as well as `{}`
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| EngineError::InvalidParameter(format!("arguments for {}: {}", name, e)))
}

impl ToolRequest {
    /// Build a typed request from a wire-level `(name, arguments)` pair
    ///
    /// Unknown names fail with `ToolNotFound`; arguments of the wrong shape
    /// fail with `InvalidParameter`.
    pub fn from_call(name: &str, args: Value) -> Result<Self, EngineError> {
        let tool: ToolName = name.parse()?;
        let request = match tool {
            ToolName::CodeIntelligenceAnalyze => ToolRequest::Analysis(parse_args(tool, args)?),
            ToolName::MemoryBankManager => ToolRequest::MemoryBank(parse_args(tool, args)?),
            ToolName::GenerateMemoryMap => ToolRequest::MemoryMap(parse_args(tool, args)?),
            ToolName::RooCodeWorkflow => ToolRequest::Workflow(parse_args(tool, args)?),
            ToolName::ConversationSummarizer => ToolRequest::Summarize(parse_args(tool, args)?),
            ToolName::EslintAnalysis => ToolRequest::Lint(parse_args(tool, args)?),
            ToolName::TypescriptDiagnostics => ToolRequest::TypeCheck(parse_args(tool, args)?),
            ToolName::WebSearchEnhanced => ToolRequest::WebSearch(parse_args(tool, args)?),
            ToolName::DailyDigestGenerator => ToolRequest::DailyDigest(parse_args(tool, args)?),
            ToolName::ContextCondensingProcess => {
                ToolRequest::ContextCondensing(parse_args(tool, args)?)
            }
            ToolName::SequentialThinkingProcess => {
                ToolRequest::SequentialThinking(parse_args(tool, args)?)
            }
        };
        Ok(request)
    }

    /// The tool this request is addressed to
    pub fn tool_name(&self) -> ToolName {
        match self {
            ToolRequest::Analysis(_) => ToolName::CodeIntelligenceAnalyze,
            ToolRequest::MemoryBank(_) => ToolName::MemoryBankManager,
            ToolRequest::MemoryMap(_) => ToolName::GenerateMemoryMap,
            ToolRequest::Workflow(_) => ToolName::RooCodeWorkflow,
            ToolRequest::Summarize(_) => ToolName::ConversationSummarizer,
            ToolRequest::Lint(_) => ToolName::EslintAnalysis,
            ToolRequest::TypeCheck(_) => ToolName::TypescriptDiagnostics,
            ToolRequest::WebSearch(_) => ToolName::WebSearchEnhanced,
            ToolRequest::DailyDigest(_) => ToolName::DailyDigestGenerator,
            ToolRequest::ContextCondensing(_) => ToolName::ContextCondensingProcess,
            ToolRequest::SequentialThinking(_) => ToolName::SequentialThinkingProcess,
        }
    }
}

/// A tool's result. Serializes as the bare result struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Analysis(AnalysisReport),
    MemoryBank(MemoryBankResult),
    MemoryMap(MemoryMapResult),
    Workflow(WorkflowResult),
    Summary(SummaryResult),
    Lint(LintReport),
    TypeCheck(TypeCheckReport),
    WebSearch(SearchResults),
    DailyDigest(DigestResult),
    ContextCondensing(CondensingResult),
    SequentialThinking(ThinkingResult),
}

macro_rules! response_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty, $tool:expr) => {
        pub fn $fn_name(self) -> Result<$ty, EngineError> {
            match self {
                ToolResponse::$variant(inner) => Ok(inner),
                _ => Err(EngineError::UnexpectedResponse {
                    tool: $tool.to_string(),
                    expected: stringify!($variant).to_string(),
                }),
            }
        }
    };
}

impl ToolResponse {
    response_accessor!(into_analysis, Analysis, AnalysisReport, ToolName::CodeIntelligenceAnalyze);
    response_accessor!(into_memory_bank, MemoryBank, MemoryBankResult, ToolName::MemoryBankManager);
    response_accessor!(into_memory_map, MemoryMap, MemoryMapResult, ToolName::GenerateMemoryMap);
    response_accessor!(into_workflow, Workflow, WorkflowResult, ToolName::RooCodeWorkflow);
    response_accessor!(into_summary, Summary, SummaryResult, ToolName::ConversationSummarizer);
    response_accessor!(into_lint, Lint, LintReport, ToolName::EslintAnalysis);
    response_accessor!(into_type_check, TypeCheck, TypeCheckReport, ToolName::TypescriptDiagnostics);
    response_accessor!(into_web_search, WebSearch, SearchResults, ToolName::WebSearchEnhanced);
    response_accessor!(into_digest, DailyDigest, DigestResult, ToolName::DailyDigestGenerator);
    response_accessor!(
        into_condensing,
        ContextCondensing,
        CondensingResult,
        ToolName::ContextCondensingProcess
    );
    response_accessor!(
        into_thinking,
        SequentialThinking,
        ThinkingResult,
        ToolName::SequentialThinkingProcess
    );

    /// JSON form sent back to the client
    pub fn to_json(&self) -> Result<Value, EngineError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_name_round_trip() {
        for name in ToolName::ALL {
            assert_eq!(name.as_str().parse::<ToolName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_tool_name() {
        let err = "unknown_tool".parse::<ToolName>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tool 'unknown_tool' not found or does not have a handler"
        );
    }

    #[test]
    fn test_from_call_builds_typed_request() {
        let request = ToolRequest::from_call(
            "eslint_analysis",
            json!({ "file_path": "src/a.ts", "auto_fix": true }),
        )
        .unwrap();

        assert_eq!(request.tool_name(), ToolName::EslintAnalysis);
        match request {
            ToolRequest::Lint(args) => {
                assert_eq!(args.file_path, "src/a.ts");
                assert!(args.auto_fix);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_from_call_rejects_bad_arguments() {
        let err = ToolRequest::from_call("eslint_analysis", json!({ "auto_fix": true })).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_call_accepts_null_for_empty_args() {
        let request = ToolRequest::from_call("daily_digest_generator", Value::Null).unwrap();
        assert_eq!(request.tool_name(), ToolName::DailyDigestGenerator);
    }

    #[test]
    fn test_response_accessor_mismatch() {
        let response = ToolResponse::Summary(SummaryResult {
            summary: "x".into(),
        });
        let err = response.into_lint().unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_response_serializes_bare() {
        let response = ToolResponse::MemoryBank(MemoryBankResult::Read {
            content: "hello".into(),
        });
        assert_eq!(response.to_json().unwrap(), json!({ "content": "hello" }));
    }
}
