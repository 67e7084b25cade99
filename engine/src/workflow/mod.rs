//! Workflow orchestration
//!
//! Workflows compose the other tools through the router; nothing here
//! touches the file system directly.

pub mod condensing;
pub mod digest;

use chrono::Utc;
use sdk::core_tool::RouterHandle;
use sdk::errors::EngineError;
use sdk::protocol::ToolRequest;
use sdk::types::{
    AnalysisReport, CheckType, CodeIntelligenceArgs, ContextCondensingArgs, DailyDigestArgs,
    DiagnosisReport, FullAnalysisBundle, LintArgs, LintReport, MemoryCategory, MemoryMapArgs,
    Phase, Priority, QuickCheckResult, QuickSummary, SearchResults, SearchType, ToolResults,
    TypeCheckArgs, TypeCheckReport, WebSearchArgs, WorkflowArgs, WorkflowResult, WorkflowType,
};
use tracing::info;

use digest::write_document;

const FALLBACK_QUERY: &str = "code analysis best practices";

/// Web search query built from the first finding of each severity
pub fn search_query(diagnosis: &DiagnosisReport) -> String {
    let parts: Vec<String> = [
        ("error", diagnosis.errors.first()),
        ("warning", diagnosis.warnings.first()),
        ("suggestion", diagnosis.suggestions.first()),
    ]
    .into_iter()
    .filter_map(|(label, finding)| finding.map(|f| format!("{}: {}", label, f.message)))
    .collect();

    if parts.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        format!("typescript {}", parts.join(" "))
    }
}

/// `total_issues` counts lint errors plus type errors
pub fn quick_summary(lint: &LintReport, type_check: &TypeCheckReport) -> QuickSummary {
    let lint_errors = lint.summary.total_errors;
    let type_errors = type_check.summary.error_count;
    QuickSummary {
        total_issues: lint_errors + type_errors,
        needs_attention: lint_errors > 0 || type_errors > 0,
    }
}

pub struct WorkflowOrchestrator {
    default_rate: f64,
}

impl WorkflowOrchestrator {
    pub fn new(default_rate: f64) -> Self {
        Self { default_rate }
    }

    pub async fn run(
        &self,
        args: WorkflowArgs,
        router: &RouterHandle,
    ) -> Result<WorkflowResult, EngineError> {
        if args.workflow_type.requires_targets() && args.target_files.is_empty() {
            return Err(EngineError::MissingParameter("target_files".to_string()));
        }
        info!(
            "Starting workflow {} on {} file(s)",
            args.workflow_type.as_str(),
            args.target_files.len()
        );

        let result = match args.workflow_type {
            WorkflowType::FullAnalysis => {
                WorkflowResult::FullAnalysis(Box::new(self.full_analysis(&args, router).await?))
            }
            WorkflowType::QuickCheck => {
                WorkflowResult::QuickCheck(self.quick_check(&args.target_files[0], router).await?)
            }
            WorkflowType::ContextCondensing => {
                let request = ToolRequest::ContextCondensing(ContextCondensingArgs {
                    target_files: args.target_files.clone(),
                    compression_rate: Some(args.compression_rate.unwrap_or(self.default_rate)),
                });
                WorkflowResult::ContextCondensing(router.call(request).await?.into_condensing()?)
            }
            WorkflowType::DailyDigest => WorkflowResult::DailyDigest(
                router
                    .call(ToolRequest::DailyDigest(DailyDigestArgs::default()))
                    .await?
                    .into_digest()?,
            ),
            WorkflowType::GenerateMemoryMap => WorkflowResult::GenerateMemoryMap(
                router
                    .call(ToolRequest::MemoryMap(MemoryMapArgs {
                        file_path: args.target_files[0].clone(),
                    }))
                    .await?
                    .into_memory_map()?,
            ),
        };
        Ok(result)
    }

    async fn analyze(
        &self,
        args: CodeIntelligenceArgs,
        router: &RouterHandle,
    ) -> Result<AnalysisReport, EngineError> {
        router.call(ToolRequest::Analysis(args)).await?.into_analysis()
    }

    async fn full_analysis(
        &self,
        args: &WorkflowArgs,
        router: &RouterHandle,
    ) -> Result<FullAnalysisBundle, EngineError> {
        let target = &args.target_files[0];
        let priority = args.priority_override.unwrap_or(Priority::P1);

        let inspection = match self
            .analyze(CodeIntelligenceArgs::new(Phase::Inspection, target).with_priority(priority), router)
            .await?
        {
            AnalysisReport::Inspection(report) => report,
            _ => return Err(unexpected("Inspection")),
        };

        let diagnosis = match self
            .analyze(CodeIntelligenceArgs::new(Phase::Diagnosis, target).with_priority(priority), router)
            .await?
        {
            AnalysisReport::Diagnosis(report) => report,
            _ => return Err(unexpected("Diagnosis")),
        };

        let web_search = if args.include_web_search {
            Some(self.search(&diagnosis, router).await?)
        } else {
            None
        };

        let (lint, type_check) = tokio::try_join!(
            self.lint(target, router),
            self.type_check(target, CheckType::All, true, router)
        )?;

        let execution = match self
            .analyze(
                CodeIntelligenceArgs::new(Phase::Execution, target)
                    .with_priority(priority)
                    .with_diagnosis(diagnosis.clone()),
                router,
            )
            .await?
        {
            AnalysisReport::Execution(report) => report,
            _ => return Err(unexpected("Execution")),
        };

        let mut bundle = FullAnalysisBundle {
            inspection,
            diagnosis,
            execution,
            tool_results: ToolResults {
                lint,
                type_check,
                web_search,
            },
            artifact_path: String::new(),
        };

        let name = format!("analysis-{}.json", Utc::now().timestamp_millis());
        bundle.artifact_path = write_document(
            router,
            MemoryCategory::Technical,
            &name,
            serde_json::to_string_pretty(&bundle)?,
        )
        .await?;

        info!("Full analysis of {} stored at {}", target, bundle.artifact_path);
        Ok(bundle)
    }

    async fn quick_check(
        &self,
        target: &str,
        router: &RouterHandle,
    ) -> Result<QuickCheckResult, EngineError> {
        let (lint, type_check) = tokio::try_join!(
            self.lint(target, router),
            self.type_check(target, CheckType::Syntax, false, router)
        )?;

        let summary = quick_summary(&lint, &type_check);
        info!(
            "Quick check of {}: {} issue(s){}",
            target,
            summary.total_issues,
            if summary.needs_attention { ", needs attention" } else { "" }
        );
        Ok(QuickCheckResult {
            lint,
            type_check,
            summary,
        })
    }

    async fn search(
        &self,
        diagnosis: &DiagnosisReport,
        router: &RouterHandle,
    ) -> Result<SearchResults, EngineError> {
        router
            .call(ToolRequest::WebSearch(WebSearchArgs {
                query: search_query(diagnosis),
                search_type: SearchType::ErrorSolution,
                max_results: 10,
            }))
            .await?
            .into_web_search()
    }

    async fn lint(&self, target: &str, router: &RouterHandle) -> Result<LintReport, EngineError> {
        router
            .call(ToolRequest::Lint(LintArgs {
                file_path: target.to_string(),
                auto_fix: false,
            }))
            .await?
            .into_lint()
    }

    async fn type_check(
        &self,
        target: &str,
        check_type: CheckType,
        include_suggestions: bool,
        router: &RouterHandle,
    ) -> Result<TypeCheckReport, EngineError> {
        router
            .call(ToolRequest::TypeCheck(TypeCheckArgs {
                file_path: target.to_string(),
                check_type,
                include_suggestions,
            }))
            .await?
            .into_type_check()
    }
}

fn unexpected(phase: &str) -> EngineError {
    EngineError::UnexpectedResponse {
        tool: "code_intelligence_analyze".to_string(),
        expected: phase.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::{Finding, LintSummary, Severity, TypeCheckSummary};

    #[test]
    fn test_search_query_from_findings() {
        let mut diagnosis = DiagnosisReport::default();
        assert_eq!(search_query(&diagnosis), FALLBACK_QUERY);

        diagnosis.push(Finding::new("TS2322: bad assignment", 3, Severity::Error));
        diagnosis.push(Finding::new("unused", 4, Severity::Warning));
        assert_eq!(
            search_query(&diagnosis),
            "typescript error: TS2322: bad assignment warning: unused"
        );
    }

    #[test]
    fn test_quick_summary_totals() {
        let lint = LintReport {
            results: vec![],
            summary: LintSummary {
                total_errors: 2,
                total_warnings: 5,
                files_analyzed: 1,
            },
        };
        let clean = TypeCheckReport::default();
        assert_eq!(
            quick_summary(&lint, &clean),
            QuickSummary {
                total_issues: 2,
                needs_attention: true
            }
        );

        let type_errors = TypeCheckReport {
            summary: TypeCheckSummary {
                error_count: 1,
                warning_count: 0,
                suggestion_count: 0,
            },
            ..TypeCheckReport::default()
        };
        assert_eq!(quick_summary(&LintReport::default(), &type_errors).total_issues, 1);
        assert!(!quick_summary(&LintReport::default(), &clean).needs_attention);
    }
}
