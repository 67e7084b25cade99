//! IntelliCode SDK
//!
//! Shared contract between the engine and its tools: the error taxonomy,
//! the typed tool protocol and the `Tool` trait.

/// Tool trait and handler context
pub mod core_tool;

/// Error types and handling
pub mod errors;

/// Tool names, requests and responses
pub mod protocol;

/// Per-tool argument and result types
pub mod types;

// Re-export commonly used types
pub use core_tool::{RouterHandle, Tool, ToolContext, ToolDescriptor, ToolInvoker};
pub use errors::{EngineError, ErrorExt};
pub use protocol::{ToolName, ToolRequest, ToolResponse};
pub use types::*;
