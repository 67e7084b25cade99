//! IntelliCode Engine Library
//!
//! This library provides the tool catalog, the call router and the workflows
//! built on top of them. It is used by both the main binary and integration
//! tests.

/// Configuration management module
pub mod config;

/// Telemetry and Observability
pub mod telemetry;

/// File-backed memory bank store
pub mod memory_bank;

/// LLM provider abstraction layer
pub mod llm;

/// Pause hook for paced tools
pub mod delay;

/// Inspection, diagnosis, execution and conflict checks
pub mod analysis;

/// ESLint, tsc and SerpAPI adapters
pub mod integrations;

/// Priority-aware conversation summarizer
pub mod summarizer;

/// Multi-tool workflows
pub mod workflow;

/// Tool registry, router and catalog
pub mod tools;

/// Line-delimited JSON stdio server
pub mod server;

/// Nightly maintenance jobs
pub mod scheduler;

/// Workspace file watcher
pub mod watcher;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
