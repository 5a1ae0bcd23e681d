//! Single question execution command

use crate::config::CliSettings;
use anyhow::{Context, Result};
use noteflow_core::tools::HttpWorkspaceConnector;
use noteflow_core::{
    Dispatcher, OpenAiModelClient, Orchestrator, RunContext, SqliteNoteStore, WorkerClient,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Options for one ask invocation
pub struct AskOptions {
    /// Id of the acting user
    pub user: String,

    /// Id of the note currently open, if any
    pub note: Option<String>,

    /// Workspace credential override from the command line
    pub workspace_token: Option<String>,

    /// Print the full outcome as JSON instead of the response text
    pub json: bool,
}

/// Answer a single question and print the result
pub async fn ask_command(question: String, settings: CliSettings, options: AskOptions) -> Result<()> {
    let model_config = settings.resolve_model()?;
    info!("using model: {}", model_config.model);

    let engine_config = settings.engine_config();

    let database = settings.database_path()?;
    if let Some(parent) = database.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    debug!("notes database: {}", database.display());

    let store = Arc::new(SqliteNoteStore::open(&database)?);
    let model = Arc::new(OpenAiModelClient::new(&model_config)?);
    let worker = Arc::new(WorkerClient::new(engine_config.worker.clone()));
    let workspace = Arc::new(HttpWorkspaceConnector::new());

    let dispatcher = Dispatcher::new(store.clone(), workspace, worker.clone());
    let engine = Orchestrator::new(engine_config, model, dispatcher, store);

    let mut ctx = RunContext::for_actor(options.user);
    if let Some(note_id) = options.note {
        ctx = ctx.with_current_note(note_id);
    }
    if let Some(token) = options.workspace_token.or(settings.workspace_token) {
        ctx = ctx.with_workspace_token(token);
    }

    let outcome = engine.run(Vec::new(), &question, ctx).await;
    worker.shutdown().await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.response);
        if outcome.note_created {
            info!("a note was created");
        }
        if outcome.note_updated {
            info!("a note was updated");
        }
    }

    Ok(())
}
