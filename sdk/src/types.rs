//! Tool argument and result types
//!
//! Every tool in the catalog has its own argument struct and result struct.
//! Field names follow the wire format (snake_case JSON) so requests coming
//! from a client deserialize directly into these types.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;

// ---------------------------------------------------------------------------
// Shared primitives
// ---------------------------------------------------------------------------

/// Ordinal importance tag: P0 > P1 > P2
///
/// Used both to rank diagnosis severity and to pick how aggressively a piece
/// of conversation is compressed (P0 = full retention, P2 = most compressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
}

impl Priority {
    fn rank(self) -> u8 {
        match self {
            Priority::P0 => 2,
            Priority::P1 => 1,
            Priority::P2 => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity bucket of a diagnosis finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// One diagnosis finding. `line` is 1-indexed; 0 means "whole file".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub message: String,
    pub line: usize,
    pub severity: Severity,
}

impl Finding {
    pub fn new(message: impl Into<String>, line: usize, severity: Severity) -> Self {
        Self {
            message: message.into(),
            line,
            severity,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory bank
// ---------------------------------------------------------------------------

/// Directory segment of the memory bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Core,
    Dynamic,
    Planning,
    Technical,
    AutoGenerated,
    Archive,
    Drafts,
    Docs,
}

impl MemoryCategory {
    /// Every category, in audit order
    pub const ALL: [MemoryCategory; 8] = [
        MemoryCategory::Core,
        MemoryCategory::Dynamic,
        MemoryCategory::Planning,
        MemoryCategory::Technical,
        MemoryCategory::AutoGenerated,
        MemoryCategory::Archive,
        MemoryCategory::Drafts,
        MemoryCategory::Docs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Core => "core",
            MemoryCategory::Dynamic => "dynamic",
            MemoryCategory::Planning => "planning",
            MemoryCategory::Technical => "technical",
            MemoryCategory::AutoGenerated => "auto_generated",
            MemoryCategory::Archive => "archive",
            MemoryCategory::Drafts => "drafts",
            MemoryCategory::Docs => "docs",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| EngineError::InvalidParameter(format!("unknown file_category '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAction {
    Read,
    Write,
    Update,
    Archive,
    Search,
    ExternalSearch,
    ProcessMultimedia,
    AuditDaily,
}

/// Arguments of `memory_bank_manager`. Which optional fields are required
/// depends on the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryBankArgs {
    pub action: MemoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_category: Option<MemoryCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// External file to import for `process_multimedia`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl MemoryBankArgs {
    fn new(action: MemoryAction) -> Self {
        Self {
            action,
            file_category: None,
            file_name: None,
            content: None,
            search_query: None,
            source_path: None,
        }
    }

    pub fn read(category: MemoryCategory, name: impl Into<String>) -> Self {
        Self {
            file_category: Some(category),
            file_name: Some(name.into()),
            ..Self::new(MemoryAction::Read)
        }
    }

    pub fn write(category: MemoryCategory, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_category: Some(category),
            file_name: Some(name.into()),
            content: Some(content.into()),
            ..Self::new(MemoryAction::Write)
        }
    }

    pub fn update(category: MemoryCategory, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: MemoryAction::Update,
            ..Self::write(category, name, content)
        }
    }

    pub fn archive(category: MemoryCategory) -> Self {
        Self {
            file_category: Some(category),
            ..Self::new(MemoryAction::Archive)
        }
    }

    pub fn search(category: MemoryCategory, query: impl Into<String>) -> Self {
        Self {
            file_category: Some(category),
            search_query: Some(query.into()),
            ..Self::new(MemoryAction::Search)
        }
    }

    pub fn external_search(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::new(MemoryAction::ExternalSearch)
        }
    }

    pub fn process_multimedia(source_path: impl Into<String>) -> Self {
        Self {
            source_path: Some(source_path.into()),
            ..Self::new(MemoryAction::ProcessMultimedia)
        }
    }

    /// Audit every category; `report_name` overrides `memory-audit.md`
    pub fn audit_daily(report_name: Option<String>) -> Self {
        Self {
            file_name: report_name,
            ..Self::new(MemoryAction::AuditDaily)
        }
    }

    /// Required category
    pub fn category(&self) -> Result<MemoryCategory, EngineError> {
        self.file_category
            .ok_or_else(|| EngineError::MissingParameter("file_category".to_string()))
    }

    /// Required file name
    pub fn name(&self) -> Result<&str, EngineError> {
        self.file_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| EngineError::MissingParameter("file_name".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    Success,
    Failed,
}

/// Per-file outcome of an archive batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub file: String,
    pub archived_path: Option<String>,
    pub status: ArchiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file: String,
    pub category: MemoryCategory,
    pub preview: String,
}

/// One line of the daily audit. `file` is `None` for a category-level entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub category: MemoryCategory,
    pub file: Option<String>,
    pub size_bytes: Option<u64>,
    pub modified: Option<String>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub success: bool,
    pub audit_log_path: String,
    pub message: String,
    pub entries: Vec<AuditEntry>,
}

/// Result of `memory_bank_manager`, one shape per action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MemoryBankResult {
    Read { content: String },
    Write { success: bool, path: String },
    Update { success: bool, timestamp: String },
    Archive { archived: Vec<ArchiveEntry> },
    Search { results: Vec<SearchHit> },
    ExternalSearch { external_results: SearchResults },
    Audit(AuditReport),
}

// ---------------------------------------------------------------------------
// Code intelligence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Inspection,
    Diagnosis,
    Execution,
    ConflictCheck,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeIntelligenceArgs {
    pub phase: Phase,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<Priority>,
    /// Diagnosis computed by an earlier step; execution reuses it instead
    /// of diagnosing again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_results: Option<DiagnosisReport>,
    /// Change text for the conflict check. Defaults to the serialized
    /// execution solutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_change: Option<String>,
}

impl CodeIntelligenceArgs {
    pub fn new(phase: Phase, file_path: impl Into<String>) -> Self {
        Self {
            phase,
            file_path: file_path.into(),
            context_files: Vec::new(),
            priority_level: None,
            diagnosis_results: None,
            proposed_change: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority_level = Some(priority);
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: DiagnosisReport) -> Self {
        self.diagnosis_results = Some(diagnosis);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub file_path: String,
    pub file_content: Option<String>,
    pub dependencies: Vec<String>,
    pub complexity_score: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub suggestions: Vec<Finding>,
}

impl DiagnosisReport {
    /// Append a finding to the bucket matching its severity
    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
            Severity::Suggestion => self.suggestions.push(finding),
        }
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    pub fn total(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.suggestions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub solutions: Vec<Solution>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    SchemaBreak,
    PlanViolation,
    UnsafeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub timestamp: String,
    pub file: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysisReport {
    pub inspection: InspectionReport,
    pub diagnosis: DiagnosisReport,
    pub execution: ExecutionReport,
    pub conflicts: ConflictReport,
    pub summary: AnalysisSummary,
}

/// Result of `code_intelligence_analyze`, tagged by phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum AnalysisReport {
    Inspection(InspectionReport),
    Diagnosis(DiagnosisReport),
    Execution(ExecutionReport),
    Conflicts(ConflictReport),
    All(Box<FullAnalysisReport>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMapArgs {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMapResult {
    pub memory_map_path: String,
    pub dependencies: Vec<String>,
    pub diagram: String,
}

// ---------------------------------------------------------------------------
// Lint / type check / web search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintArgs {
    pub file_path: String,
    #[serde(default)]
    pub auto_fix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintMessage {
    pub rule_id: Option<String>,
    /// 1 = warning, 2 = error
    pub severity: u8,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub fixable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintFileResult {
    pub file_path: String,
    pub error_count: usize,
    pub warning_count: usize,
    pub messages: Vec<LintMessage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LintSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub files_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LintReport {
    pub results: Vec<LintFileResult>,
    pub summary: LintSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    Syntax,
    Semantic,
    All,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCheckArgs {
    pub file_path: String,
    pub check_type: CheckType,
    #[serde(default = "default_true")]
    pub include_suggestions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub category: Severity,
    pub code: u32,
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeCheckSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub suggestion_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeCheckReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub suggestions: Vec<Diagnostic>,
    pub summary: TypeCheckSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    General,
    Code,
    Documentation,
    ErrorSolution,
}

fn default_max_results() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub search_type: SearchType,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "type")]
    pub search_type: SearchType,
    pub results: Vec<SearchResultItem>,
    #[serde(default)]
    pub cached: bool,
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    FullAnalysis,
    QuickCheck,
    ContextCondensing,
    DailyDigest,
    GenerateMemoryMap,
}

impl WorkflowType {
    /// Every workflow except the digest operates on target files
    pub fn requires_targets(&self) -> bool {
        !matches!(self, WorkflowType::DailyDigest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::FullAnalysis => "full_analysis",
            WorkflowType::QuickCheck => "quick_check",
            WorkflowType::ContextCondensing => "context_condensing",
            WorkflowType::DailyDigest => "daily_digest",
            WorkflowType::GenerateMemoryMap => "generate_memory_map",
        }
    }
}

impl FromStr for WorkflowType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_analysis" => Ok(WorkflowType::FullAnalysis),
            "quick_check" => Ok(WorkflowType::QuickCheck),
            "context_condensing" => Ok(WorkflowType::ContextCondensing),
            "daily_digest" => Ok(WorkflowType::DailyDigest),
            "generate_memory_map" => Ok(WorkflowType::GenerateMemoryMap),
            other => Err(EngineError::InvalidParameter(format!(
                "unknown workflow_type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowArgs {
    pub workflow_type: WorkflowType,
    #[serde(default)]
    pub target_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_override: Option<Priority>,
    #[serde(default)]
    pub include_web_search: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_rate: Option<f64>,
}

impl WorkflowArgs {
    pub fn new(workflow_type: WorkflowType, target_files: Vec<String>) -> Self {
        Self {
            workflow_type,
            target_files,
            priority_override: None,
            include_web_search: false,
            compression_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResults {
    pub lint: LintReport,
    pub type_check: TypeCheckReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<SearchResults>,
}

/// Everything `full_analysis` produced; persisted verbatim as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysisBundle {
    pub inspection: InspectionReport,
    pub diagnosis: DiagnosisReport,
    pub execution: ExecutionReport,
    pub tool_results: ToolResults,
    #[serde(default)]
    pub artifact_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickSummary {
    pub total_issues: usize,
    pub needs_attention: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickCheckResult {
    pub lint: LintReport,
    pub type_check: TypeCheckReport,
    pub summary: QuickSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "workflow_type", rename_all = "snake_case")]
pub enum WorkflowResult {
    FullAnalysis(Box<FullAnalysisBundle>),
    QuickCheck(QuickCheckResult),
    ContextCondensing(CondensingResult),
    DailyDigest(DigestResult),
    GenerateMemoryMap(MemoryMapResult),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyDigestArgs {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestResult {
    pub generated: bool,
    pub timestamp: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextCondensingArgs {
    pub target_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondensedFile {
    pub file: String,
    pub original_size: usize,
    pub condensed_size: usize,
    pub condensed_content: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondensingResult {
    pub status: String,
    pub message: String,
    pub backup_path: String,
    pub draft_path: String,
    pub final_path: String,
    pub results: Vec<CondensedFile>,
}

// ---------------------------------------------------------------------------
// Summarizer / sequential thinking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    Concise,
    Detailed,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Concise => "concise",
            SummaryType::Detailed => "detailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerArgs {
    pub conversation_history: String,
    pub summary_type: SummaryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_compression_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingArgs {
    pub problem_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_alternatives: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingResult {
    pub status: String,
    pub message: String,
    pub problem_statement: String,
    pub thinking_depth: u32,
    pub steps: Vec<String>,
    pub decisions: Vec<String>,
    pub alternatives: Vec<String>,
}
