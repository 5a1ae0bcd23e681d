//! System prompt for the assistant

use crate::tools::catalog;

/// Build the system prompt. The response contract matters: the caller
/// renders the final text directly into the note editor, so the model must
/// answer with an HTML fragment, not markdown.
pub fn build_system_prompt(current_note_id: Option<&str>) -> String {
    let tool_names: Vec<&str> = catalog().iter().map(|tool| tool.name).collect();

    let note_context = match current_note_id {
        Some(id) => format!("The user currently has note {} open.", id),
        None => "The user has no note open right now.".to_string(),
    };

    format!(
        "You are the assistant inside a note-taking app. Answer the user's \
         question, using tools when they help. {}\n\n\
         Respond with a short HTML fragment (use <p>, <ul>, <li>, <strong>; \
         no markdown, no <html> or <body> wrapper). When you change the \
         user's notes, say briefly what you did.\n\n\
         Available tools: {}",
        note_context,
        tool_names.join(", ")
    )
}
