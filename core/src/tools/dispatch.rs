//! Tool dispatcher
//!
//! Routes a validated tool call to a local mutation handler, the worker
//! transport, or the workspace connector. Every error raised during a
//! dispatch is caught here and converted into a `Failure` outcome fed back
//! to the model; nothing a tool does can abort the run.

use crate::error::{Result, ToolError};
use crate::store::NoteStore;
use crate::tools::catalog::{descriptor_for, names};
use crate::tools::enrich::{enrich, EnrichContext};
use crate::tools::schema::validate_arguments;
use crate::tools::worker::WorkerClient;
use crate::tools::workspace::{dispatch_workspace, is_workspace_tool, WorkspaceConnector};
use crate::tools::notes;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Per-run context, supplied once and read-only to the dispatcher
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Id of the acting user
    pub actor_id: String,

    /// Id of the note currently open in the caller's UI, if any
    pub current_note_id: Option<String>,

    /// Credential for the connected workspace, if the user linked one
    pub workspace_token: Option<String>,
}

impl RunContext {
    /// Context with no open note and no workspace connection
    pub fn for_actor<S: Into<String>>(actor_id: S) -> Self {
        Self {
            actor_id: actor_id.into(),
            current_note_id: None,
            workspace_token: None,
        }
    }

    /// Set the currently open note
    pub fn with_current_note<S: Into<String>>(mut self, note_id: S) -> Self {
        self.current_note_id = Some(note_id.into());
        self
    }

    /// Set the workspace credential
    pub fn with_workspace_token<S: Into<String>>(mut self, token: S) -> Self {
        self.workspace_token = Some(token.into());
        self
    }
}

/// Outcome of one tool dispatch. Structured internally; serialized to text
/// only when appended to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The tool ran and produced a payload
    Success(Value),

    /// The tool failed; the model sees the message and may retry
    Failure(String),
}

impl ToolOutcome {
    /// Whether the dispatch succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// Serialize for the tool turn's content. Failures keep a stable
    /// `{"error": ...}` shape so the model can recognize them.
    pub fn into_turn_content(self) -> String {
        match self {
            ToolOutcome::Success(payload) => payload.to_string(),
            ToolOutcome::Failure(message) => json!({ "error": message }).to_string(),
        }
    }
}

/// Routes validated tool calls to their handlers
pub struct Dispatcher {
    store: Arc<dyn NoteStore>,
    workspace: Arc<dyn WorkspaceConnector>,
    worker: Arc<WorkerClient>,
}

impl Dispatcher {
    /// Create a dispatcher over the engine's collaborators
    pub fn new(
        store: Arc<dyn NoteStore>,
        workspace: Arc<dyn WorkspaceConnector>,
        worker: Arc<WorkerClient>,
    ) -> Self {
        Self {
            store,
            workspace,
            worker,
        }
    }

    /// Execute one tool call. Never returns an error: every failure is
    /// folded into the outcome.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
        ctx: &RunContext,
        note_corpus: &str,
    ) -> ToolOutcome {
        let started = Instant::now();
        let result = self.try_dispatch(name, arguments, ctx, note_corpus).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(payload) => {
                tracing::debug!(tool = name, elapsed_ms, "tool dispatch succeeded");
                ToolOutcome::Success(payload)
            }
            Err(err) => {
                tracing::warn!(tool = name, elapsed_ms, "tool dispatch failed: {}", err);
                ToolOutcome::Failure(err.to_string())
            }
        }
    }

    async fn try_dispatch(
        &self,
        name: &str,
        arguments: Value,
        ctx: &RunContext,
        note_corpus: &str,
    ) -> Result<Value> {
        // Unknown tool is checked before any handler category is consulted
        let descriptor = descriptor_for(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        validate_arguments(&descriptor.parameters, &arguments).map_err(crate::error::Error::Tool)?;

        let arguments = enrich(
            name,
            arguments,
            &EnrichContext {
                note_corpus,
            },
        );

        match name {
            names::CREATE_NOTE => notes::create_note(self.store.as_ref(), ctx, &arguments).await,
            names::UPDATE_NOTE => notes::update_note(self.store.as_ref(), ctx, &arguments).await,
            _ if is_workspace_tool(name) => {
                let token = ctx
                    .workspace_token
                    .as_deref()
                    .ok_or(ToolError::NotConnected)?;
                dispatch_workspace(self.workspace.as_ref(), name, &arguments, token).await
            }
            // Remaining catalog entries are the stateless worker tools
            _ => Ok(self.worker.call(name, arguments).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryNoteStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Workspace fake that counts network-reaching calls
    #[derive(Default)]
    struct CountingWorkspace {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WorkspaceConnector for CountingWorkspace {
        async fn has_credential(&self, _user_id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn get_credential(&self, _user_id: &str) -> Result<String> {
            Err(ToolError::NotConnected.into())
        }
        async fn search(&self, _query: &str, _token: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"results": []}))
        }
        async fn get_page(&self, _page_id: &str, _token: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}))
        }
        async fn create_page(
            &self,
            _database_id: &str,
            _title: &str,
            _content: &str,
            _token: &str,
        ) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}))
        }
        async fn append_page(&self, _page_id: &str, _content: &str, _token: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}))
        }
        async fn list_databases(&self, _token: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"results": []}))
        }
    }

    fn dispatcher(
        store: Arc<InMemoryNoteStore>,
        workspace: Arc<CountingWorkspace>,
    ) -> Dispatcher {
        Dispatcher::new(store, workspace, Arc::new(WorkerClient::disabled()))
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_touching_collaborators() {
        let store = Arc::new(InMemoryNoteStore::new());
        let workspace = Arc::new(CountingWorkspace::default());
        let d = dispatcher(store.clone(), workspace.clone());

        let outcome = d
            .dispatch(
                "launch_rocket",
                json!({}),
                &RunContext::for_actor("alice"),
                "",
            )
            .await;

        match outcome {
            ToolOutcome::Failure(message) => assert!(message.contains("Unknown tool")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(store.list_for_owner("alice").await.unwrap().is_empty());
        assert_eq!(workspace.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_fail_before_the_handler() {
        let store = Arc::new(InMemoryNoteStore::new());
        let d = dispatcher(store.clone(), Arc::new(CountingWorkspace::default()));

        // content is required
        let outcome = d
            .dispatch(
                names::CREATE_NOTE,
                json!({}),
                &RunContext::for_actor("alice"),
                "",
            )
            .await;

        assert!(!outcome.is_success());
        assert!(store.list_for_owner("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn workspace_call_without_credential_issues_no_network_call() {
        let workspace = Arc::new(CountingWorkspace::default());
        let d = dispatcher(Arc::new(InMemoryNoteStore::new()), workspace.clone());

        let outcome = d
            .dispatch(
                names::WORKSPACE_SEARCH,
                json!({"query": "roadmap"}),
                &RunContext::for_actor("alice"),
                "",
            )
            .await;

        match outcome {
            ToolOutcome::Failure(message) => assert!(message.contains("not connected")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(workspace.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn workspace_call_with_credential_reaches_the_connector() {
        let workspace = Arc::new(CountingWorkspace::default());
        let d = dispatcher(Arc::new(InMemoryNoteStore::new()), workspace.clone());

        let ctx = RunContext::for_actor("alice").with_workspace_token("secret");
        let outcome = d
            .dispatch(names::WORKSPACE_SEARCH, json!({"query": "roadmap"}), &ctx, "")
            .await;

        assert!(outcome.is_success());
        assert_eq!(workspace.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_tool_without_worker_degrades_to_stub_failure() {
        let d = dispatcher(
            Arc::new(InMemoryNoteStore::new()),
            Arc::new(CountingWorkspace::default()),
        );

        let outcome = d
            .dispatch(
                names::GET_WEATHER,
                json!({"location": "Paris"}),
                &RunContext::for_actor("alice"),
                "",
            )
            .await;

        match outcome {
            ToolOutcome::Failure(message) => {
                assert!(message.contains("unavailable in this environment"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn successful_mutation_flows_through_dispatch() {
        let store = Arc::new(InMemoryNoteStore::new());
        let d = dispatcher(store.clone(), Arc::new(CountingWorkspace::default()));

        let outcome = d
            .dispatch(
                names::CREATE_NOTE,
                json!({"content": "<p>hello</p>"}),
                &RunContext::for_actor("alice"),
                "",
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(store.list_for_owner("alice").await.unwrap().len(), 1);
    }

    #[test]
    fn failure_serializes_with_stable_error_shape() {
        let content = ToolOutcome::Failure("boom".to_string()).into_turn_content();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["error"], "boom");
    }
}
