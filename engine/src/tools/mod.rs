//! Tool registry and call router
//!
//! The registry maps each `ToolName` to exactly one handler. The router
//! resolves a request against the registry and hands the handler a
//! `ToolContext` whose `RouterHandle` points back at the same router, so
//! any tool can call any other. Nested calls carry a depth counter and fail
//! with `CallDepthExceeded` past `server.max_call_depth`.

pub mod adapters;
pub mod analysis;
pub mod memory;
pub mod summarizer;
pub mod thinking;
pub mod workflow;

use async_trait::async_trait;
use sdk::core_tool::{RouterHandle, Tool, ToolContext, ToolDescriptor, ToolInvoker};
use sdk::errors::EngineError;
use sdk::protocol::{ToolName, ToolRequest, ToolResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::delay::{DelayHook, SleepDelay};
use crate::llm::{self, LLMProvider};
use crate::memory_bank::MemoryBank;

/// Shared dependencies handed to tool constructors
#[derive(Clone)]
pub struct ToolServices {
    pub config: Arc<Config>,
    pub bank: MemoryBank,
    pub enhancer: Option<Arc<dyn LLMProvider>>,
    pub delay: Arc<dyn DelayHook>,
}

impl ToolServices {
    /// Services as configured: real delay, enhancer from `llm.preferred`
    pub fn from_config(config: Arc<Config>) -> Self {
        let delay = SleepDelay::new(Duration::from_millis(
            config.integrations.sequential_thinking.delay_ms,
        ));
        Self {
            bank: MemoryBank::new(config.core.memory_root.clone()),
            enhancer: llm::provider_from_config(&config),
            delay: Arc::new(delay),
            config,
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn DelayHook>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_enhancer(mut self, enhancer: Option<Arc<dyn LLMProvider>>) -> Self {
        self.enhancer = enhancer;
        self
    }
}

/// Registry of available tools, keyed by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry with no tools registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tool in the catalog, with the subprocess and HTTP adapters
    pub fn standard(services: &ToolServices) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        registry.register_core(services)?;
        registry.register_adapters(services)?;
        Ok(registry)
    }

    /// Tools implemented in-process (everything but lint, type check, search)
    pub fn register_core(&mut self, services: &ToolServices) -> Result<(), EngineError> {
        self.register(Arc::new(analysis::CodeIntelligenceTool::new(services)?))?;
        self.register(Arc::new(analysis::MemoryMapTool::new(services)?))?;
        self.register(Arc::new(memory::MemoryBankTool::new(services)))?;
        self.register(Arc::new(workflow::WorkflowTool::new(services)))?;
        self.register(Arc::new(workflow::DailyDigestTool::new(services)))?;
        self.register(Arc::new(workflow::ContextCondensingTool::new(services)?))?;
        self.register(Arc::new(summarizer::SummarizerTool::new(services)?))?;
        self.register(Arc::new(thinking::SequentialThinkingTool::new(services)))?;
        Ok(())
    }

    /// ESLint, tsc and SerpAPI adapters
    pub fn register_adapters(&mut self, services: &ToolServices) -> Result<(), EngineError> {
        self.register(Arc::new(adapters::LintTool::new(services)))?;
        self.register(Arc::new(adapters::TypeCheckTool::new(services)?))?;
        self.register(Arc::new(adapters::WebSearchTool::new(services)))?;
        Ok(())
    }

    /// Register a tool under its descriptor name
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), EngineError> {
        let name = tool.descriptor().name;
        if self.tools.contains_key(&name) {
            return Err(EngineError::ToolAlreadyRegistered(name.to_string()));
        }

        debug!("Registered tool {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: ToolName) -> Option<&Arc<dyn Tool>> {
        self.tools.get(&name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in catalog order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        ToolName::ALL
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }
}

/// Dispatches requests to registered tools
#[derive(Clone)]
pub struct ToolRouter {
    registry: Arc<ToolRegistry>,
    max_depth: usize,
}

impl ToolRouter {
    pub fn new(registry: ToolRegistry, max_depth: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            max_depth,
        }
    }

    /// Top-level invocation
    pub async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse, EngineError> {
        self.invoke_at(request, 0).await
    }

    /// Invocation from the wire: `(name, JSON arguments)`
    pub async fn invoke_raw(&self, name: &str, arguments: Value) -> Result<ToolResponse, EngineError> {
        let request = ToolRequest::from_call(name, arguments)?;
        self.invoke(request).await
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    /// A handle for callers outside any tool (scheduler, watcher, server)
    pub fn handle(&self) -> RouterHandle {
        RouterHandle::new(Arc::new(self.clone()), 0)
    }
}

#[async_trait]
impl ToolInvoker for ToolRouter {
    async fn invoke_at(
        &self,
        request: ToolRequest,
        depth: usize,
    ) -> Result<ToolResponse, EngineError> {
        let name = request.tool_name();
        if depth > self.max_depth {
            warn!("Refusing call to {} at depth {}", name, depth);
            return Err(EngineError::CallDepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }

        let tool = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::ToolNotFound(name.to_string()))?;

        debug!("Dispatching {} (depth {})", name, depth);
        let ctx = ToolContext::new(RouterHandle::new(Arc::new(self.clone()), depth));

        tool.handle(request, &ctx).await.map_err(|e| {
            debug!("Tool {} failed: {}", name, e);
            e
        })
    }
}

/// JSON schema helper shared by the tool descriptors
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Error for a request routed to the wrong handler
pub(crate) fn mismatched(tool: ToolName, request: &ToolRequest) -> EngineError {
    EngineError::InvalidParameter(format!(
        "{} cannot handle a {} request",
        tool,
        request.tool_name()
    ))
}
