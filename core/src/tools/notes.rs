//! Local note mutation handlers
//!
//! The only tools with durable side effects. Both verify ownership through
//! the store's `(id, owner)` scoping before any write.

use crate::error::{Result, ToolError};
use crate::store::NoteStore;
use crate::tools::dispatch::RunContext;
use serde_json::{json, Value};
use std::fmt;

/// How `update_note` applies its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Concatenate after the existing text
    Append,
    /// Discard the existing text entirely
    Replace,
}

impl UpdateMode {
    fn from_args(args: &Value) -> Result<Self> {
        match args.get("mode").and_then(Value::as_str) {
            None | Some("append") => Ok(UpdateMode::Append),
            Some("replace") => Ok(UpdateMode::Replace),
            Some(other) => Err(ToolError::Validation {
                message: format!("unknown update mode: {}", other),
            }
            .into()),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Append => write!(f, "append"),
            UpdateMode::Replace => write!(f, "replace"),
        }
    }
}

/// Create a new note for the acting user. Fails before reaching the store
/// when the trimmed content is empty.
pub async fn create_note(
    store: &dyn NoteStore,
    ctx: &RunContext,
    args: &Value,
) -> Result<Value> {
    let content = args
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(ToolError::Validation {
            message: "note content must not be empty".to_string(),
        }
        .into());
    }

    let note = store.create(&ctx.actor_id, content).await?;
    tracing::info!(note_id = %note.id, "created note");
    Ok(json!({ "note_id": note.id }))
}

/// Update an existing note in append or replace mode. The target note is
/// the explicit `note_id` argument, falling back to the note currently open
/// in the caller's context.
pub async fn update_note(
    store: &dyn NoteStore,
    ctx: &RunContext,
    args: &Value,
) -> Result<Value> {
    let content = args
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mode = UpdateMode::from_args(args)?;

    let note_id = args
        .get("note_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| ctx.current_note_id.clone())
        .ok_or_else(|| ToolError::Validation {
            message: "no note to update: no note_id given and no note is open".to_string(),
        })?;

    let note = store
        .find_by_id(&note_id, &ctx.actor_id)
        .await?
        .ok_or_else(|| ToolError::NotFound {
            id: note_id.clone(),
        })?;

    let new_text = match mode {
        UpdateMode::Replace => content.to_string(),
        // No leading separator when the note is empty
        UpdateMode::Append if note.text.is_empty() => content.to_string(),
        UpdateMode::Append => format!("{}\n\n{}", note.text, content),
    };

    let updated = store.update_text(&note_id, &ctx.actor_id, &new_text).await?;
    tracing::info!(note_id = %updated.id, %mode, "updated note");
    Ok(json!({ "note_id": updated.id, "mode": mode.to_string() }))
}
