//! CLI interface for IntelliCode
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for the `intellicode` binary.

use clap::{Parser, Subcommand, ValueEnum};
use sdk::types::{Priority, SummaryType, WorkflowType};
use std::path::PathBuf;

/// IntelliCode tool server
///
/// Serves a catalog of code analysis, memory bank and summarization tools
/// over stdio, and runs the same tools and workflows from the command line.
#[derive(Parser, Debug)]
#[command(name = "intellicode")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the tool catalog over stdin/stdout
    Serve {
        /// Do not run the nightly digest, audit and memory map jobs
        #[arg(long)]
        no_schedule: bool,

        /// Do not watch the workspace for changes
        #[arg(long)]
        no_watch: bool,
    },

    /// Run a workflow once
    Workflow {
        /// Workflow to run
        #[arg(value_enum)]
        workflow_type: WorkflowKind,

        /// Target files, relative to the workspace
        files: Vec<String>,

        /// Override the analysis priority
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// Search the web for the diagnosed errors (full_analysis)
        #[arg(long)]
        web_search: bool,

        /// Compression rate for context_condensing (0.0 - 1.0)
        #[arg(long)]
        rate: Option<f64>,
    },

    /// Call a single tool with JSON arguments
    Call {
        /// Tool name, e.g. memory_bank_manager
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// List the registered tools
    Tools,

    /// Create the memory bank layout and default documents
    Init,

    /// Summarize a conversation transcript file
    Summarize {
        /// Transcript file
        file: PathBuf,

        /// Summary style
        #[arg(long = "type", value_enum, default_value = "concise")]
        summary_type: SummaryKind,

        /// Additional output file, relative to the workspace
        #[arg(short, long)]
        output: Option<String>,

        /// Compression rate override (0.0 - 1.0)
        #[arg(long)]
        rate: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum WorkflowKind {
    FullAnalysis,
    QuickCheck,
    ContextCondensing,
    DailyDigest,
    GenerateMemoryMap,
}

impl From<WorkflowKind> for WorkflowType {
    fn from(kind: WorkflowKind) -> Self {
        match kind {
            WorkflowKind::FullAnalysis => WorkflowType::FullAnalysis,
            WorkflowKind::QuickCheck => WorkflowType::QuickCheck,
            WorkflowKind::ContextCondensing => WorkflowType::ContextCondensing,
            WorkflowKind::DailyDigest => WorkflowType::DailyDigest,
            WorkflowKind::GenerateMemoryMap => WorkflowType::GenerateMemoryMap,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PriorityArg {
    P0,
    P1,
    P2,
}

impl From<PriorityArg> for Priority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::P0 => Priority::P0,
            PriorityArg::P1 => Priority::P1,
            PriorityArg::P2 => Priority::P2,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SummaryKind {
    Concise,
    Detailed,
}

impl From<SummaryKind> for SummaryType {
    fn from(kind: SummaryKind) -> Self {
        match kind {
            SummaryKind::Concise => SummaryType::Concise,
            SummaryKind::Detailed => SummaryType::Detailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workflow_with_files() {
        let cli = Cli::parse_from([
            "intellicode",
            "--json",
            "workflow",
            "quick_check",
            "src/a.ts",
            "src/b.ts",
        ]);

        assert!(cli.json);
        match cli.command {
            Command::Workflow {
                workflow_type,
                files,
                ..
            } => {
                assert_eq!(WorkflowType::from(workflow_type), WorkflowType::QuickCheck);
                assert_eq!(files, vec!["src/a.ts", "src/b.ts"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_call_defaults_to_empty_arguments() {
        let cli = Cli::parse_from(["intellicode", "call", "daily_digest_generator"]);
        match cli.command {
            Command::Call { tool, arguments } => {
                assert_eq!(tool, "daily_digest_generator");
                assert_eq!(arguments, "{}");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "intellicode",
            "summarize",
            "chat.md",
            "--type",
            "detailed",
            "--log",
            "debug",
        ]);
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Command::Summarize {
                summary_type: SummaryKind::Detailed,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_workflow_rejected() {
        assert!(Cli::try_parse_from(["intellicode", "workflow", "deploy"]).is_err());
    }
}
