//! # noteflow Core
//!
//! Core library for noteflow - the AI assistant inside a note-taking app.
//!
//! This library provides the orchestration engine that answers user
//! questions over their notes: a multi-turn model-tool loop, a catalog of
//! tools the model may call, and the dispatcher that routes each call to a
//! local note mutation, a stateless worker process, or a connected
//! third-party workspace.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use agent::{Orchestrator, RunOutcome, SideEffectFlags};
pub use config::{EngineConfig, ResolvedModelConfig, WorkerConfig};
pub use error::{Error, Result};
pub use llm::{ConversationTurn, ModelClient, OpenAiModelClient};
pub use store::{InMemoryNoteStore, Note, NoteStore, SqliteNoteStore};
pub use tools::{Dispatcher, RunContext, WorkerClient};

/// Current version of the noteflow-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
