//! Tool trait and handler context
//!
//! This module defines the `Tool` trait every catalog entry implements and
//! the `ToolContext` handed to a handler on each invocation. The context is
//! the only way a handler reaches the rest of the engine: it carries a
//! `RouterHandle` that dispatches nested calls to sibling tools.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::EngineError;
use crate::protocol::{ToolName, ToolRequest, ToolResponse};

/// Static description of a tool, listed by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: ToolName, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name,
            description: description.into(),
            input_schema,
        }
    }
}

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema
    fn descriptor(&self) -> ToolDescriptor;

    /// Handle one invocation
    ///
    /// The request is always the variant matching `descriptor().name`; the
    /// router guarantees it.
    async fn handle(&self, request: ToolRequest, ctx: &ToolContext)
        -> Result<ToolResponse, EngineError>;
}

/// Dispatch side of the router (implemented by the engine)
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke a tool at the given nesting depth
    async fn invoke_at(&self, request: ToolRequest, depth: usize)
        -> Result<ToolResponse, EngineError>;
}

/// Handle for calling sibling tools
///
/// Each handle remembers the depth of the call that produced it, so a
/// nested call is dispatched one level deeper.
#[derive(Clone)]
pub struct RouterHandle {
    inner: Arc<dyn ToolInvoker>,
    depth: usize,
}

impl RouterHandle {
    pub fn new(inner: Arc<dyn ToolInvoker>, depth: usize) -> Self {
        Self { inner, depth }
    }

    /// Depth of the call currently being handled (0 = top level)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Call another tool by request
    pub async fn call(&self, request: ToolRequest) -> Result<ToolResponse, EngineError> {
        self.inner.invoke_at(request, self.depth + 1).await
    }
}

/// Context passed to a tool handler
#[derive(Clone)]
pub struct ToolContext {
    pub router: RouterHandle,
}

impl ToolContext {
    pub fn new(router: RouterHandle) -> Self {
        Self { router }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryResult;
    use std::sync::Mutex;

    struct RecordingInvoker {
        depths: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ToolInvoker for RecordingInvoker {
        async fn invoke_at(
            &self,
            _request: ToolRequest,
            depth: usize,
        ) -> Result<ToolResponse, EngineError> {
            self.depths.lock().unwrap().push(depth);
            Ok(ToolResponse::Summary(SummaryResult {
                summary: String::new(),
            }))
        }
    }

    #[tokio::test]
    async fn test_router_handle_increments_depth() {
        let invoker = Arc::new(RecordingInvoker {
            depths: Mutex::new(Vec::new()),
        });
        let handle = RouterHandle::new(invoker.clone(), 3);
        let request = ToolRequest::from_call("daily_digest_generator", Value::Null).unwrap();

        handle.call(request).await.unwrap();

        assert_eq!(handle.depth(), 3);
        assert_eq!(*invoker.depths.lock().unwrap(), vec![4]);
    }
}
