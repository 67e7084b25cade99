//! Error types and handling
//!
//! This module provides the error types shared by the engine and every tool.
//! All errors implement the `ErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Taxonomy
//!
//! - **NotFound**: a tool, file, or memory record is absent
//! - **Validation**: a required argument is missing or malformed; raised
//!   before any side effect
//! - **External**: an underlying capability (lint engine, type checker,
//!   search API, LLM) failed
//! - **Infrastructure**: configuration, I/O, serialization, routing limits
//!
//! Partial failures (archive, audit) are never raised; they are reported as
//! per-item results by the operation itself.

use std::path::PathBuf;
use thiserror::Error;

/// Trait for error extensions
///
/// Provides additional context for errors: a user-friendly hint and
/// recoverability information.
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and never contains the raw
    /// message, secrets, or file paths.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried by the caller once the cause is
    /// fixed. No component retries automatically.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ErrorExt};
///
/// let error = EngineError::ToolNotFound("web_search_enhanced".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad log level".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Not found errors
    #[error("Tool '{0}' not found or does not have a handler")]
    ToolNotFound(String),

    #[error("Memory record not found: {category}/{name}")]
    RecordNotFound { category: String, name: String },

    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    // Validation errors
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid memory path: {0}")]
    InvalidPath(String),

    // External capability errors
    #[error("{capability} failed: {message}")]
    Capability { capability: String, message: String },

    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Network error: {0}")]
    Network(String),

    // Routing errors
    #[error("Tool already registered: {0}")]
    ToolAlreadyRegistered(String),

    #[error("Call depth exceeded: {depth} nested tool calls (limit {limit})")]
    CallDepthExceeded { depth: usize, limit: usize },

    #[error("Unexpected response from {tool}: expected {expected}")]
    UnexpectedResponse { tool: String, expected: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Build an external capability failure
    pub fn capability(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Returns true for the NotFound family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound(_) | Self::RecordNotFound { .. } | Self::FileNotFound(_)
        )
    }

    /// Returns true for errors raised before any side effect took place
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidParameter(_) | Self::InvalidPath(_)
        )
    }
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::ToolNotFound(_) => "The requested tool is not available",
            Self::RecordNotFound { .. } => {
                "The memory bank document does not exist. Run 'intellicode init' to seed defaults"
            }
            Self::FileNotFound(_) => "The target file does not exist",

            Self::MissingParameter(_) => "A required argument is missing",
            Self::InvalidParameter(_) => "An argument has an invalid value",
            Self::InvalidPath(_) => "Memory bank names must be relative and stay inside the bank",

            Self::Capability { .. } => "An external analysis engine failed. Check that it is installed",
            Self::LLMProvider(_) => "LLM provider unavailable. Check your API keys and network",
            Self::Network(_) => "Network operation failed. Check your connection",

            Self::ToolAlreadyRegistered(_) => "Each tool name can only be registered once",
            Self::CallDepthExceeded { .. } => "A tool is calling itself too deeply",
            Self::UnexpectedResponse { .. } => "A tool returned a result of the wrong kind",

            Self::Serialization(_) => "Failed to encode or decode structured data",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_)
            | Self::ToolAlreadyRegistered(_)
            | Self::CallDepthExceeded { .. }
            | Self::UnexpectedResponse { .. } => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(EngineError::ToolNotFound("x".into()).is_not_found());
        assert!(EngineError::RecordNotFound {
            category: "core".into(),
            name: "a.md".into()
        }
        .is_not_found());
        assert!(!EngineError::MissingParameter("content".into()).is_not_found());
    }

    #[test]
    fn test_validation_family() {
        assert!(EngineError::MissingParameter("content".into()).is_validation());
        assert!(EngineError::InvalidPath("../x".into()).is_validation());
        assert!(!EngineError::Network("down".into()).is_validation());
    }

    #[test]
    fn test_capability_message_is_unmodified() {
        let err = EngineError::capability("eslint", "Cannot find module 'eslint'");
        assert_eq!(err.to_string(), "eslint failed: Cannot find module 'eslint'");
    }

    #[test]
    fn test_recoverability() {
        assert!(EngineError::Network("timeout".into()).is_recoverable());
        assert!(!EngineError::CallDepthExceeded { depth: 17, limit: 16 }.is_recoverable());
    }
}
