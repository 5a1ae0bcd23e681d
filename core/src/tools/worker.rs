//! Transport to the out-of-process tool worker
//!
//! The worker hosts the stateless tools (web search, weather, entity
//! extraction, note analytics). One JSON envelope per line in each
//! direction:
//!
//! ```text
//! -> {"id": 1, "method": "tools/call", "params": {"name": ..., "arguments": ...}}
//! <- {"id": 1, "result": {"content": [{"type": "text", "text": <json payload>}]}}
//! <- {"id": 1, "error": {"message": ...}}
//! ```
//!
//! The client is lifetime-scoped: the host creates it once and injects it
//! into the dispatcher. The connection is established lazily on first use
//! behind an async mutex, so concurrent first use opens exactly one
//! process. Without a configured worker every call degrades to a
//! `WorkerUnavailable` failure instead of an error escaping the run.

use crate::config::WorkerConfig;
use crate::error::ToolError;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Client for the tool worker process
pub struct WorkerClient {
    config: Option<WorkerConfig>,
    conn: Mutex<Option<WorkerConnection>>,
}

struct WorkerConnection {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl WorkerClient {
    /// Create a client. `None` disables the worker; remote stateless tools
    /// then fail with a stub message so the engine stays functional.
    pub fn new(config: Option<WorkerConfig>) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// A client with no worker configured
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Call a tool on the worker, bounded by the configured timeout.
    /// Failures (including timeouts) are local to the call.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let Some(config) = &self.config else {
            return Err(ToolError::WorkerUnavailable);
        };

        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            tracing::debug!(command = %config.command, "starting tool worker");
            *guard = Some(WorkerConnection::open(config).await?);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(ToolError::WorkerUnavailable);
        };

        match timeout(config.timeout(), conn.round_trip(name, arguments)).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(err)) => {
                // The stream may be desynchronized; reconnect on next use.
                drop_connection(&mut guard).await;
                Err(err)
            }
            Err(_) => {
                drop_connection(&mut guard).await;
                Err(ToolError::Timeout {
                    name: name.to_string(),
                })
            }
        }
    }

    /// Tear down the worker process. Safe to call when the connection was
    /// never opened, and idempotent.
    pub async fn shutdown(&self) {
        let mut guard = self.conn.lock().await;
        drop_connection(&mut guard).await;
    }
}

async fn drop_connection(guard: &mut Option<WorkerConnection>) {
    if let Some(mut conn) = guard.take() {
        let _ = conn.child.kill().await;
    }
}

impl WorkerConnection {
    async fn open(config: &WorkerConfig) -> Result<Self, ToolError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            tracing::warn!("failed to spawn tool worker: {}", e);
            ToolError::WorkerUnavailable
        })?;

        let stdin = child.stdin.take().ok_or(ToolError::WorkerUnavailable)?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or(ToolError::WorkerUnavailable)?;

        Ok(Self {
            child,
            stdin,
            stdout,
            next_id: 0,
        })
    }

    async fn round_trip(&mut self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        self.next_id += 1;
        let id = self.next_id;

        let envelope = json!({
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        });

        let mut line = serde_json::to_string(&envelope).map_err(|e| ToolError::Worker {
            message: e.to_string(),
        })?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(io_error)?;
        self.stdin.flush().await.map_err(io_error)?;

        let mut response = String::new();
        let read = self.stdout.read_line(&mut response).await.map_err(io_error)?;
        if read == 0 {
            return Err(ToolError::Worker {
                message: "worker closed the connection".to_string(),
            });
        }

        parse_response(id, response.trim())
    }
}

fn io_error(err: std::io::Error) -> ToolError {
    ToolError::Worker {
        message: format!("worker I/O error: {}", err),
    }
}

/// Parse one response envelope. Malformed responses fail the call, not the
/// run.
pub(crate) fn parse_response(expected_id: u64, line: &str) -> Result<Value, ToolError> {
    let envelope: Value = serde_json::from_str(line).map_err(|e| ToolError::Worker {
        message: format!("malformed worker response: {}", e),
    })?;

    let id = envelope.get("id").and_then(Value::as_u64);
    if id != Some(expected_id) {
        return Err(ToolError::Worker {
            message: format!(
                "worker response id mismatch: expected {}, got {:?}",
                expected_id, id
            ),
        });
    }

    if let Some(error) = envelope.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown worker error");
        return Err(ToolError::Worker {
            message: message.to_string(),
        });
    }

    let text = envelope
        .get("result")
        .and_then(|result| result.get("content"))
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        })
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::Worker {
            message: "worker response has no text content".to_string(),
        })?;

    // The text block carries a JSON-encoded payload; a bare string payload
    // is passed through as-is.
    Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}
