//! Orchestration loop
//!
//! Drives repeated model-tool exchanges for one run: ask the model, execute
//! any requested tool calls strictly in order, feed the results back, and
//! stop on a plain-text reply or at the iteration cap. Individual tool
//! failures are local; only a model completion failure aborts the run.

use crate::agent::effects::SideEffectFlags;
use crate::agent::prompt::build_system_prompt;
use crate::config::EngineConfig;
use crate::llm::{ConversationTurn, ModelClient, ToolCallRequest, TurnRole};
use crate::store::NoteStore;
use crate::tools::{catalog, Dispatcher, RunContext};
use serde::Serialize;
use std::sync::Arc;

/// Returned when the model produced neither text nor tool calls
pub const FALLBACK_RESPONSE: &str = "<p>Sorry, I couldn't generate a response.</p>";

/// Returned when the model completion collaborator itself failed
pub const MODEL_ERROR_RESPONSE: &str =
    "<p>Something went wrong while answering. Please try again.</p>";

/// Final result of one run. The response is an HTML fragment ready for the
/// caller to render; the flags tell it whether to refresh cached notes.
/// Persisting the exchange is the caller's responsibility.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// HTML fragment answering the user's question
    pub response: String,

    /// A note was created during the run
    pub note_created: bool,

    /// A note was updated during the run
    pub note_updated: bool,
}

enum LoopState {
    AwaitingModel,
    DispatchingTools(Vec<ToolCallRequest>),
    Done(String),
}

/// The orchestration engine for assistant runs
pub struct Orchestrator {
    config: EngineConfig,
    model: Arc<dyn ModelClient>,
    dispatcher: Dispatcher,
    store: Arc<dyn NoteStore>,
}

impl Orchestrator {
    /// Create an engine over its collaborators
    pub fn new(
        config: EngineConfig,
        model: Arc<dyn ModelClient>,
        dispatcher: Dispatcher,
        store: Arc<dyn NoteStore>,
    ) -> Self {
        Self {
            config,
            model,
            dispatcher,
            store,
        }
    }

    /// Execute one run: prior turns plus a new user question. The engine
    /// does not persist anything; it returns the final text and the
    /// side-effect flags and leaves the history with the caller.
    pub async fn run(
        &self,
        prior_turns: Vec<ConversationTurn>,
        question: &str,
        ctx: RunContext,
    ) -> RunOutcome {
        let tools = catalog();

        let mut history = prior_turns;
        let needs_system_prompt = history
            .first()
            .map(|turn| turn.role != TurnRole::System)
            .unwrap_or(true);
        if needs_system_prompt {
            history.insert(
                0,
                ConversationTurn::system(build_system_prompt(ctx.current_note_id.as_deref())),
            );
        }
        history.push(ConversationTurn::user(question));

        // Snapshot the corpus once; enrichment sees the notes as of run
        // start even if the run itself mutates them.
        let note_corpus = match self.store.list_for_owner(&ctx.actor_id).await {
            Ok(notes) => notes
                .iter()
                .map(|note| note.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(err) => {
                tracing::warn!("failed to snapshot note corpus: {}", err);
                String::new()
            }
        };

        let mut flags = SideEffectFlags::default();
        let mut iterations = 0usize;
        let mut last_text: Option<String> = None;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    let reply = match self.model.complete(&history, &tools).await {
                        Ok(reply) => reply,
                        Err(err) => {
                            tracing::error!("model completion failed, aborting run: {}", err);
                            return RunOutcome {
                                response: MODEL_ERROR_RESPONSE.to_string(),
                                note_created: false,
                                note_updated: false,
                            };
                        }
                    };

                    let text = reply
                        .content
                        .clone()
                        .filter(|content| !content.trim().is_empty());

                    if reply.tool_calls.is_empty() {
                        LoopState::Done(text.unwrap_or_else(|| FALLBACK_RESPONSE.to_string()))
                    } else {
                        if let Some(text) = &text {
                            last_text = Some(text.clone());
                        }
                        // Keep the raw requests on the assistant turn; the
                        // provider requires them to accept the tool turns.
                        history.push(ConversationTurn::assistant(
                            reply.content,
                            reply.tool_calls.clone(),
                        ));
                        LoopState::DispatchingTools(reply.tool_calls)
                    }
                }

                LoopState::DispatchingTools(calls) => {
                    // Strictly sequential, in the order the model issued
                    // them: a later call may depend on an earlier mutation.
                    for call in &calls {
                        let outcome = self
                            .dispatcher
                            .dispatch(&call.name, call.arguments.clone(), &ctx, &note_corpus)
                            .await;
                        flags.record(&call.name, &outcome);
                        history.push(ConversationTurn::tool(
                            call.id.clone(),
                            outcome.into_turn_content(),
                        ));
                    }

                    iterations += 1;
                    if iterations >= self.config.max_iterations {
                        tracing::debug!(iterations, "iteration cap reached, ending run");
                        LoopState::Done(
                            last_text
                                .clone()
                                .unwrap_or_else(|| FALLBACK_RESPONSE.to_string()),
                        )
                    } else {
                        LoopState::AwaitingModel
                    }
                }

                LoopState::Done(response) => {
                    return RunOutcome {
                        response,
                        note_created: flags.note_created,
                        note_updated: flags.note_updated,
                    };
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, Result};
    use crate::llm::ModelReply;
    use crate::store::InMemoryNoteStore;
    use crate::tools::workspace::WorkspaceConnector;
    use crate::tools::{names, ToolDescriptor, WorkerClient};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Step {
        Reply(ModelReply),
        Fail,
    }

    /// Scripted fake model: plays back a fixed sequence of replies and
    /// records every history it was shown, making the state machine fully
    /// deterministic to test.
    struct ScriptedModel {
        steps: Mutex<VecDeque<Step>>,
        repeat: Option<ModelReply>,
        histories: Mutex<Vec<Vec<ConversationTurn>>>,
    }

    impl ScriptedModel {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into_iter().collect()),
                repeat: None,
                histories: Mutex::new(Vec::new()),
            }
        }

        fn repeating(reply: ModelReply) -> Self {
            Self {
                steps: Mutex::new(VecDeque::new()),
                repeat: Some(reply),
                histories: Mutex::new(Vec::new()),
            }
        }

        fn completions(&self) -> usize {
            self.histories.lock().unwrap().len()
        }

        fn history(&self, call: usize) -> Vec<ConversationTurn> {
            self.histories.lock().unwrap()[call].clone()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn complete(
            &self,
            history: &[ConversationTurn],
            _tools: &[ToolDescriptor],
        ) -> Result<ModelReply> {
            self.histories.lock().unwrap().push(history.to_vec());
            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Reply(reply)) => Ok(reply),
                Some(Step::Fail) => Err(ModelError::ApiError {
                    status: 500,
                    message: "scripted failure".to_string(),
                }
                .into()),
                None => match &self.repeat {
                    Some(reply) => Ok(reply.clone()),
                    None => Ok(ModelReply::text("<p>script exhausted</p>")),
                },
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    /// Workspace fake that refuses everything; engine tests never reach it
    struct NullWorkspace;

    #[async_trait]
    impl WorkspaceConnector for NullWorkspace {
        async fn has_credential(&self, _user_id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn get_credential(&self, _user_id: &str) -> Result<String> {
            Err(crate::error::ToolError::NotConnected.into())
        }
        async fn search(&self, _query: &str, _token: &str) -> Result<Value> {
            panic!("workspace should not be reached")
        }
        async fn get_page(&self, _page_id: &str, _token: &str) -> Result<Value> {
            panic!("workspace should not be reached")
        }
        async fn create_page(
            &self,
            _database_id: &str,
            _title: &str,
            _content: &str,
            _token: &str,
        ) -> Result<Value> {
            panic!("workspace should not be reached")
        }
        async fn append_page(&self, _page_id: &str, _content: &str, _token: &str) -> Result<Value> {
            panic!("workspace should not be reached")
        }
        async fn list_databases(&self, _token: &str) -> Result<Value> {
            panic!("workspace should not be reached")
        }
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    fn engine(
        model: Arc<ScriptedModel>,
        store: Arc<InMemoryNoteStore>,
        worker: WorkerClient,
    ) -> Orchestrator {
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(NullWorkspace),
            Arc::new(worker),
        );
        Orchestrator::new(EngineConfig::default(), model, dispatcher, store)
    }

    #[cfg(unix)]
    fn echo_worker() -> WorkerClient {
        use crate::config::WorkerConfig;
        let script = r#"
while read line; do
  id=$(printf '%s' "$line" | sed -n 's/.*"id":\([0-9]*\).*/\1/p')
  printf '{"id":%s,"result":{"content":[{"type":"text","text":"{\\"ok\\":true}"}]}}\n' "$id"
done
"#;
        WorkerClient::new(Some(WorkerConfig::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
        )))
    }

    #[tokio::test]
    async fn plain_text_reply_ends_the_run() {
        let model = Arc::new(ScriptedModel::new(vec![Step::Reply(ModelReply::text(
            "<p>hello</p>",
        ))]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model.clone(), store, WorkerClient::disabled())
            .run(Vec::new(), "hi", RunContext::for_actor("alice"))
            .await;

        assert_eq!(outcome.response, "<p>hello</p>");
        assert!(!outcome.note_created);
        assert!(!outcome.note_updated);
        assert_eq!(model.completions(), 1);
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_fixed_string() {
        let model = Arc::new(ScriptedModel::new(vec![Step::Reply(ModelReply::default())]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model, store, WorkerClient::disabled())
            .run(Vec::new(), "hi", RunContext::for_actor("alice"))
            .await;

        assert_eq!(outcome.response, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn system_prompt_is_prepended_exactly_once() {
        let model = Arc::new(ScriptedModel::new(vec![Step::Reply(ModelReply::text(
            "<p>ok</p>",
        ))]));
        let store = Arc::new(InMemoryNoteStore::new());
        engine(model.clone(), store.clone(), WorkerClient::disabled())
            .run(Vec::new(), "hi", RunContext::for_actor("alice"))
            .await;

        let history = model.history(0);
        assert_eq!(history[0].role, TurnRole::System);
        assert_eq!(history[1].role, TurnRole::User);

        // A history that already starts with a system turn is left alone
        let model = Arc::new(ScriptedModel::new(vec![Step::Reply(ModelReply::text(
            "<p>ok</p>",
        ))]));
        let prior = vec![
            ConversationTurn::system("existing prompt"),
            ConversationTurn::user("earlier question"),
            ConversationTurn::assistant(Some("<p>earlier answer</p>".to_string()), Vec::new()),
        ];
        engine(model.clone(), store, WorkerClient::disabled())
            .run(prior, "hi again", RunContext::for_actor("alice"))
            .await;

        let history = model.history(0);
        let system_turns = history
            .iter()
            .filter(|turn| turn.role == TurnRole::System)
            .count();
        assert_eq!(system_turns, 1);
        assert_eq!(history[0].content.as_deref(), Some("existing prompt"));
    }

    #[tokio::test]
    async fn model_failure_aborts_with_safe_fragment() {
        let model = Arc::new(ScriptedModel::new(vec![Step::Fail]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model, store, WorkerClient::disabled())
            .run(Vec::new(), "hi", RunContext::for_actor("alice"))
            .await;

        assert_eq!(outcome.response, MODEL_ERROR_RESPONSE);
        assert!(!outcome.note_created);
        assert!(!outcome.note_updated);
    }

    #[tokio::test]
    async fn iteration_cap_forces_termination_with_last_text() {
        let model = Arc::new(ScriptedModel::repeating(ModelReply {
            content: Some("<p>Still checking…</p>".to_string()),
            tool_calls: vec![call("c1", names::GET_WEATHER, json!({"location": "Paris"}))],
        }));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model.clone(), store, WorkerClient::disabled())
            .run(Vec::new(), "weather?", RunContext::for_actor("alice"))
            .await;

        // The counter never exceeds the configured maximum of 3
        assert_eq!(model.completions(), 3);
        assert_eq!(outcome.response, "<p>Still checking…</p>");
    }

    #[tokio::test]
    async fn failed_tool_call_surfaces_to_the_model_and_loop_continues() {
        // No worker configured: get_weather fails, but the run goes on and
        // the model sees the error payload in a tool turn.
        let model = Arc::new(ScriptedModel::new(vec![
            Step::Reply(ModelReply::tool_calls(vec![call(
                "c1",
                names::GET_WEATHER,
                json!({"location": "Paris"}),
            )])),
            Step::Reply(ModelReply::text("<p>No weather today.</p>")),
        ]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model.clone(), store, WorkerClient::disabled())
            .run(Vec::new(), "weather?", RunContext::for_actor("alice"))
            .await;

        assert_eq!(outcome.response, "<p>No weather today.</p>");
        assert_eq!(model.completions(), 2);

        let history = model.history(1);
        let tool_turn = history
            .iter()
            .find(|turn| turn.role == TurnRole::Tool)
            .expect("tool turn appended");
        assert_eq!(tool_turn.tool_call_id.as_deref(), Some("c1"));
        let payload: Value = serde_json::from_str(tool_turn.content.as_deref().unwrap()).unwrap();
        assert!(payload["error"].is_string());
    }

    #[tokio::test]
    async fn failed_mutation_never_sets_its_flag() {
        let model = Arc::new(ScriptedModel::new(vec![
            Step::Reply(ModelReply::tool_calls(vec![call(
                "c1",
                names::CREATE_NOTE,
                json!({"content": "   "}),
            )])),
            Step::Reply(ModelReply::text("<p>That didn't work.</p>")),
        ]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model, store.clone(), WorkerClient::disabled())
            .run(Vec::new(), "make a note", RunContext::for_actor("alice"))
            .await;

        assert!(!outcome.note_created);
        assert!(store.list_for_owner("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_create_sets_the_flag() {
        let model = Arc::new(ScriptedModel::new(vec![
            Step::Reply(ModelReply::tool_calls(vec![call(
                "c1",
                names::CREATE_NOTE,
                json!({"content": "<p>shopping list</p>"}),
            )])),
            Step::Reply(ModelReply::text("<p>Created your note.</p>")),
        ]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model, store.clone(), WorkerClient::disabled())
            .run(Vec::new(), "make a note", RunContext::for_actor("alice"))
            .await;

        assert!(outcome.note_created);
        assert!(!outcome.note_updated);
        assert_eq!(store.list_for_owner("alice").await.unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn weather_question_round_trips_through_the_worker() {
        let model = Arc::new(ScriptedModel::new(vec![
            Step::Reply(ModelReply::tool_calls(vec![call(
                "c1",
                names::GET_WEATHER,
                json!({"location": "Paris"}),
            )])),
            Step::Reply(ModelReply::text("<p>It's mild in Paris.</p>")),
        ]));
        let store = Arc::new(InMemoryNoteStore::new());
        let outcome = engine(model.clone(), store, echo_worker())
            .run(
                Vec::new(),
                "What's the weather in Paris?",
                RunContext::for_actor("alice"),
            )
            .await;

        assert_eq!(outcome.response, "<p>It's mild in Paris.</p>");
        assert!(!outcome.note_created);
        assert!(!outcome.note_updated);
        assert_eq!(model.completions(), 2);

        // Exactly one tool call, echoed back with a success payload
        let history = model.history(1);
        let tool_turns: Vec<_> = history
            .iter()
            .filter(|turn| turn.role == TurnRole::Tool)
            .collect();
        assert_eq!(tool_turns.len(), 1);
        let payload: Value =
            serde_json::from_str(tool_turns[0].content.as_deref().unwrap()).unwrap();
        assert_eq!(payload["ok"], true);
    }

    #[tokio::test]
    async fn search_then_append_runs_in_request_order() {
        let store = Arc::new(InMemoryNoteStore::new());
        let note = store.create("alice", "A").await.unwrap();

        let model = Arc::new(ScriptedModel::new(vec![
            Step::Reply(ModelReply::tool_calls(vec![
                call("c1", names::WEB_SEARCH, json!({"query": "rust 1.80"})),
                call(
                    "c2",
                    names::UPDATE_NOTE,
                    json!({"content": "B", "mode": "append"}),
                ),
            ])),
            Step::Reply(ModelReply::text("<p>Added what I found.</p>")),
        ]));

        let ctx = RunContext::for_actor("alice").with_current_note(note.id.clone());
        let outcome = engine(model.clone(), store.clone(), WorkerClient::disabled())
            .run(Vec::new(), "search the web for X and add it to my note", ctx)
            .await;

        assert!(outcome.note_updated);
        assert!(!outcome.note_created);

        // Sequential execution in the order requested: the search turn
        // precedes the update turn, each echoing its call id.
        let history = model.history(1);
        let tool_ids: Vec<&str> = history
            .iter()
            .filter(|turn| turn.role == TurnRole::Tool)
            .filter_map(|turn| turn.tool_call_id.as_deref())
            .collect();
        assert_eq!(tool_ids, vec!["c1", "c2"]);

        // Assistant turn kept the raw requests for protocol fidelity
        let assistant = history
            .iter()
            .find(|turn| turn.role == TurnRole::Assistant)
            .unwrap();
        assert_eq!(assistant.tool_calls.len(), 2);

        let updated = store.find_by_id(&note.id, "alice").await.unwrap().unwrap();
        assert_eq!(updated.text, "A\n\nB");
    }
}
