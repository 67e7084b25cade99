//! Line-delimited JSON tool server
//!
//! Reads one request object per line and writes one reply per line:
//!
//! ```text
//! {"id": 1, "method": "tools/list"}
//! {"id": 2, "method": "tools/call", "params": {"name": "...", "arguments": {...}}}
//! ```
//!
//! Replies carry either `result` or `error: {message, hint}`. Every
//! `tools/call` is appended to a session log; once the log reaches
//! `server.summarize_after_messages` entries it is handed to the
//! conversation summarizer in the background and cleared.

use sdk::errors::{EngineError, ErrorExt};
use sdk::protocol::ToolRequest;
use sdk::types::{SummarizerArgs, SummaryType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::tools::ToolRouter;

/// Inbound request line
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub message: String,
    pub hint: String,
}

impl From<&EngineError> for RpcError {
    fn from(e: &EngineError) -> Self {
        Self {
            message: e.to_string(),
            hint: e.user_hint().to_string(),
        }
    }
}

/// Outbound reply line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcReply {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcReply {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, e: &EngineError) -> Self {
        Self {
            id,
            result: None,
            error: Some(e.into()),
        }
    }
}

/// The stdio server: a router plus the session log
pub struct ToolServer {
    router: ToolRouter,
    session: Arc<Mutex<Vec<String>>>,
    summarize_after: usize,
}

impl ToolServer {
    pub fn new(router: ToolRouter, summarize_after: usize) -> Self {
        Self {
            router,
            session: Arc::new(Mutex::new(Vec::new())),
            summarize_after,
        }
    }

    /// Serve on the process stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<(), EngineError> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve over any line reader and writer
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), EngineError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Tool server ready ({} tools)", self.router.descriptors().len());

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let reply = self.handle_line(&line).await;
            let mut encoded = serde_json::to_string(&reply)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }

        info!("Input closed, tool server stopping");
        Ok(())
    }

    /// Handle one request line and build its reply
    pub async fn handle_line(&self, line: &str) -> RpcReply {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!("Unparseable request line: {}", e);
                return RpcReply::err(Value::Null, &EngineError::from(e));
            }
        };

        match request.method.as_str() {
            "tools/list" => {
                let tools = self.router.descriptors();
                match serde_json::to_value(&tools) {
                    Ok(list) => RpcReply::ok(request.id, serde_json::json!({ "tools": list })),
                    Err(e) => RpcReply::err(request.id, &EngineError::from(e)),
                }
            }
            "tools/call" => self.handle_call(request.id, request.params).await,
            other => RpcReply::err(
                request.id,
                &EngineError::InvalidParameter(format!("unknown method '{}'", other)),
            ),
        }
    }

    async fn handle_call(&self, id: Value, params: Value) -> RpcReply {
        let params: CallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return RpcReply::err(
                    id,
                    &EngineError::InvalidParameter(format!("tools/call params: {}", e)),
                )
            }
        };

        debug!("tools/call {}", params.name);
        let outcome = self
            .router
            .invoke_raw(&params.name, params.arguments.clone())
            .await
            .and_then(|response| response.to_json());

        let reply = match &outcome {
            Ok(result) => RpcReply::ok(id, result.clone()),
            Err(e) => {
                error!("Tool call {} failed: {}", params.name, e);
                RpcReply::err(id, e)
            }
        };

        let transcript = match &outcome {
            Ok(result) => result.to_string(),
            Err(e) => format!("Error: {}", e),
        };
        self.record(format!(
            "**User:**\n{} {}\n**Assistant:**\n{}",
            params.name, params.arguments, transcript
        ))
        .await;

        reply
    }

    /// Append to the session log, summarizing when the threshold is hit
    async fn record(&self, entry: String) {
        if self.summarize_after == 0 {
            return;
        }

        let batch = {
            let mut session = self.session.lock().await;
            session.push(entry);
            if session.len() < self.summarize_after {
                return;
            }
            std::mem::take(&mut *session)
        };

        info!("Session log reached {} entries, summarizing", batch.len());
        let handle = self.router.handle();
        tokio::spawn(async move {
            let request = ToolRequest::Summarize(SummarizerArgs {
                conversation_history: batch.join("\n\n"),
                summary_type: SummaryType::Concise,
                output_file: None,
                override_compression_rate: None,
            });
            if let Err(e) = handle.call(request).await {
                warn!("Background session summary failed: {}", e);
            }
        });
    }

    /// Entries waiting for the next summary
    pub async fn pending_entries(&self) -> usize {
        self.session.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use sdk::core_tool::{Tool, ToolContext, ToolDescriptor};
    use sdk::protocol::{ToolName, ToolResponse};
    use sdk::types::SummaryResult;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSummarizer {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingSummarizer {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(ToolName::ConversationSummarizer, "counts", json!({}))
        }

        async fn handle(
            &self,
            request: ToolRequest,
            _ctx: &ToolContext,
        ) -> Result<ToolResponse, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match request {
                ToolRequest::Summarize(args) => Ok(ToolResponse::Summary(SummaryResult {
                    summary: args.conversation_history,
                })),
                _ => Err(EngineError::InvalidParameter("unexpected".to_string())),
            }
        }
    }

    fn server(summarize_after: usize) -> (ToolServer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CountingSummarizer {
                calls: calls.clone(),
            }))
            .unwrap();
        (ToolServer::new(ToolRouter::new(registry, 16), summarize_after), calls)
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (server, _) = server(0);
        let reply = server
            .handle_line(r#"{"id": 1, "method": "tools/list"}"#)
            .await;

        assert_eq!(reply.id, json!(1));
        let tools = &reply.result.unwrap()["tools"];
        assert_eq!(tools[0]["name"], "conversation_summarizer");
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let (server, _) = server(0);
        let line = json!({
            "id": "a",
            "method": "tools/call",
            "params": {
                "name": "conversation_summarizer",
                "arguments": { "conversation_history": "hello", "summary_type": "concise" }
            }
        });

        let reply = server.handle_line(&line.to_string()).await;
        assert!(reply.error.is_none());
        assert_eq!(reply.result.unwrap()["summary"], "hello");
    }

    #[tokio::test]
    async fn test_unknown_tool_reports_error_with_hint() {
        let (server, _) = server(0);
        let line = json!({
            "id": 7,
            "method": "tools/call",
            "params": { "name": "nope", "arguments": {} }
        });

        let reply = server.handle_line(&line.to_string()).await;
        let error = reply.error.unwrap();
        assert!(error.message.contains("nope"));
        assert!(!error.hint.is_empty());
        assert!(reply.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_json() {
        let (server, _) = server(0);
        let reply = server
            .handle_line(r#"{"id": 1, "method": "tools/delete"}"#)
            .await;
        assert!(reply.error.unwrap().message.contains("tools/delete"));

        let reply = server.handle_line("{not json").await;
        assert_eq!(reply.id, Value::Null);
        assert!(reply.error.is_some());
    }

    #[tokio::test]
    async fn test_session_log_triggers_summary_and_resets() {
        let (server, calls) = server(2);
        let line = json!({
            "id": 1,
            "method": "tools/call",
            "params": { "name": "web_search_enhanced", "arguments": { "query": "x" } }
        })
        .to_string();

        server.handle_line(&line).await;
        assert_eq!(server.pending_entries().await, 1);

        server.handle_line(&line).await;
        assert_eq!(server.pending_entries().await, 0);

        for _ in 0..50 {
            if calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serve_writes_one_reply_per_line() {
        let (server, _) = server(0);
        let input = b"{\"id\":1,\"method\":\"tools/list\"}\n\n{\"id\":2,\"method\":\"x\"}\n";
        let mut output = Vec::new();

        server
            .serve(tokio::io::BufReader::new(&input[..]), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let replies: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert!(replies[1]["error"]["message"].is_string());
    }
}
