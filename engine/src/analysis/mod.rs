//! Code analysis pipeline
//!
//! Inspection → Diagnosis → Execution → ConflictCheck. Inspection never
//! fails; diagnosis depends on the type checker reached through the router
//! and propagates its failures.

pub mod conflicts;
pub mod execution;
pub mod inspection;
pub mod memory_map;
pub mod rules;

use chrono::Utc;
use sdk::core_tool::RouterHandle;
use sdk::errors::EngineError;
use sdk::protocol::ToolRequest;
use sdk::types::{
    AnalysisReport, AnalysisSummary, CheckType, CodeIntelligenceArgs, ConflictReport,
    DiagnosisReport, Diagnostic, ExecutionReport, Finding, FullAnalysisReport, InspectionReport,
    MemoryBankArgs, MemoryBankResult, MemoryCategory, MemoryMapResult, Phase, Priority, Severity,
    TypeCheckArgs,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::memory_bank::{local_timestamp, MemoryBank};
use conflicts::{ConflictChecker, ContractDocs};
use rules::Rule;

const API_CONTRACTS: &str = "api-contracts.md";
const SYSTEM_PATTERNS: &str = "system-patterns.md";
const DEPENDENCY_MAP: &str = "dependency-map.md";

pub struct AnalysisPipeline {
    workspace: PathBuf,
    bank: MemoryBank,
    rules: Vec<Box<dyn Rule>>,
    conflicts: ConflictChecker,
}

impl AnalysisPipeline {
    pub fn new(config: &Config, bank: MemoryBank) -> Result<Self, EngineError> {
        Ok(Self {
            workspace: config.core.workspace.clone(),
            bank,
            rules: rules::default_rules()?,
            conflicts: ConflictChecker::new(config.analysis.max_change_lines)?,
        })
    }

    /// Absolute path of a target file; relative paths are workspace-relative
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        let path = Path::new(file_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    pub async fn inspect(&self, file_path: &str) -> InspectionReport {
        inspection::inspect(&self.resolve(file_path), file_path).await
    }

    /// Type checker diagnostics followed by the local rules
    ///
    /// `content` is the file body from a previous inspection; the file is
    /// inspected again when it is not given.
    pub async fn diagnose(
        &self,
        file_path: &str,
        content: Option<&str>,
        router: &RouterHandle,
    ) -> Result<DiagnosisReport, EngineError> {
        let type_check = router
            .call(ToolRequest::TypeCheck(TypeCheckArgs {
                file_path: self.resolve(file_path).to_string_lossy().into_owned(),
                check_type: CheckType::All,
                include_suggestions: true,
            }))
            .await?
            .into_type_check()?;

        let mut report = DiagnosisReport::default();
        let to_finding = |d: &Diagnostic, severity| {
            Finding::new(format!("TS{}: {}", d.code, d.message), d.line, severity)
        };
        report.extend(type_check.errors.iter().map(|d| to_finding(d, Severity::Error)));
        report.extend(type_check.warnings.iter().map(|d| to_finding(d, Severity::Warning)));
        report.extend(
            type_check
                .suggestions
                .iter()
                .map(|d| to_finding(d, Severity::Suggestion)),
        );

        let inspected;
        let content = match content {
            Some(content) => Some(content),
            None => {
                inspected = self.inspect(file_path).await;
                inspected.file_content.as_deref()
            }
        };
        if let Some(content) = content {
            report.extend(rules::apply_rules(&self.rules, content));
        }

        debug!(
            "Diagnosis of {}: {} error(s), {} warning(s), {} suggestion(s)",
            file_path,
            report.errors.len(),
            report.warnings.len(),
            report.suggestions.len()
        );
        Ok(report)
    }

    pub fn execute(
        &self,
        diagnosis: &DiagnosisReport,
        content: Option<&str>,
        priority: Priority,
    ) -> ExecutionReport {
        execution::plan(diagnosis, content, priority)
    }

    /// Check a change against the contract documents
    ///
    /// An unreadable document is logged and treated as absent.
    pub async fn check_conflicts(&self, change: &str, router: &RouterHandle) -> ConflictReport {
        let docs = ContractDocs {
            api_contracts: read_contract(router, MemoryCategory::Technical, API_CONTRACTS).await,
            system_patterns: read_contract(router, MemoryCategory::Core, SYSTEM_PATTERNS).await,
        };
        self.conflicts.check(change, &docs)
    }

    /// Run the requested phase
    pub async fn run(
        &self,
        args: CodeIntelligenceArgs,
        router: &RouterHandle,
    ) -> Result<AnalysisReport, EngineError> {
        info!("Code intelligence analysis: {:?} on {}", args.phase, args.file_path);
        let priority = args.priority_level.unwrap_or_default();

        let report = match args.phase {
            Phase::Inspection => AnalysisReport::Inspection(self.inspect(&args.file_path).await),
            Phase::Diagnosis => {
                AnalysisReport::Diagnosis(self.diagnose(&args.file_path, None, router).await?)
            }
            Phase::Execution => {
                let inspection = self.inspect(&args.file_path).await;
                let content = inspection.file_content.as_deref();
                let diagnosis = match args.diagnosis_results {
                    Some(diagnosis) => diagnosis,
                    None => self.diagnose(&args.file_path, content, router).await?,
                };
                AnalysisReport::Execution(self.execute(&diagnosis, content, priority))
            }
            Phase::ConflictCheck => {
                let change = match args.proposed_change {
                    Some(change) => change,
                    None => {
                        let inspection = self.inspect(&args.file_path).await;
                        let content = inspection.file_content.as_deref();
                        let diagnosis = match args.diagnosis_results {
                            Some(diagnosis) => diagnosis,
                            None => self.diagnose(&args.file_path, content, router).await?,
                        };
                        let execution = self.execute(&diagnosis, content, priority);
                        conflicts::change_text(&execution.solutions)
                    }
                };
                AnalysisReport::Conflicts(self.check_conflicts(&change, router).await)
            }
            Phase::All => AnalysisReport::All(Box::new(self.full(args, priority, router).await?)),
        };
        Ok(report)
    }

    async fn full(
        &self,
        args: CodeIntelligenceArgs,
        priority: Priority,
        router: &RouterHandle,
    ) -> Result<FullAnalysisReport, EngineError> {
        let inspection = self.inspect(&args.file_path).await;
        let content = inspection.file_content.as_deref();
        let diagnosis = self.diagnose(&args.file_path, content, router).await?;
        let execution = self.execute(&diagnosis, content, priority);

        let change = match args.proposed_change {
            Some(change) => change,
            None => conflicts::change_text(&execution.solutions),
        };
        let conflicts = self.check_conflicts(&change, router).await;
        if !conflicts.conflicts.is_empty() {
            warn!(
                "{} conflict(s) found for {}",
                conflicts.conflicts.len(),
                args.file_path
            );
        }

        Ok(FullAnalysisReport {
            summary: AnalysisSummary {
                timestamp: Utc::now().to_rfc3339(),
                file: args.file_path,
                priority,
            },
            inspection,
            diagnosis,
            execution,
            conflicts,
        })
    }

    /// Inspect a file and persist its dependency diagram
    pub async fn memory_map(&self, file_path: &str) -> Result<MemoryMapResult, EngineError> {
        let inspection = self.inspect(file_path).await;
        if inspection.file_content.is_none() {
            return Err(EngineError::FileNotFound(self.resolve(file_path)));
        }

        let diagram = memory_map::render_mermaid(file_path, &inspection.dependencies);
        let document = memory_map::render_document(file_path, &diagram, &local_timestamp());
        let path = self
            .bank
            .write(MemoryCategory::Technical, DEPENDENCY_MAP, &document)
            .await?;

        info!(
            "Memory map for {} written to {} ({} dependencies)",
            file_path,
            path.display(),
            inspection.dependencies.len()
        );
        Ok(MemoryMapResult {
            memory_map_path: path.to_string_lossy().into_owned(),
            dependencies: inspection.dependencies,
            diagram,
        })
    }
}

async fn read_contract(router: &RouterHandle, category: MemoryCategory, name: &str) -> Option<String> {
    let response = router
        .call(ToolRequest::MemoryBank(MemoryBankArgs::read(category, name)))
        .await
        .and_then(|r| r.into_memory_bank());

    match response {
        Ok(MemoryBankResult::Read { content }) => Some(content),
        Ok(_) => {
            warn!("Unexpected memory bank result reading {}/{}", category, name);
            None
        }
        Err(e) => {
            warn!("Could not read {}/{} for conflict check: {}", category, name, e);
            None
        }
    }
}
