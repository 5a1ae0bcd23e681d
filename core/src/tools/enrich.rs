//! Per-tool argument enrichment
//!
//! A handful of stateless worker tools need context the model does not
//! supply: the user's note corpus as of run start. Rather than scattering
//! conditionals through the dispatcher, enrichment is a table mapping tool
//! name to a pure function over the arguments. This is the only place
//! context data crosses into otherwise-stateless tool arguments.

use super::catalog::names;
use serde_json::Value;

/// Context available to enrichment functions
pub struct EnrichContext<'a> {
    /// The caller's full note corpus, snapshotted at run start
    pub note_corpus: &'a str,
}

type EnrichFn = fn(Value, &EnrichContext<'_>) -> Value;

/// The enrichment function for a tool, if it has one
pub fn enrichment_for(name: &str) -> Option<EnrichFn> {
    match name {
        names::ANALYZE_NOTES => Some(attach_corpus),
        names::EXTRACT_ENTITIES => Some(default_text_to_corpus),
        _ => None,
    }
}

/// Apply the tool's enrichment, if any
pub fn enrich(name: &str, arguments: Value, ctx: &EnrichContext<'_>) -> Value {
    match enrichment_for(name) {
        Some(f) => f(arguments, ctx),
        None => arguments,
    }
}

/// `analyze_notes` always operates on the full corpus, regardless of what
/// the model supplied.
fn attach_corpus(mut arguments: Value, ctx: &EnrichContext<'_>) -> Value {
    if let Some(args) = arguments.as_object_mut() {
        args.insert("notes".to_string(), Value::String(ctx.note_corpus.to_string()));
    }
    arguments
}

/// `extract_entities` falls back to the corpus when no explicit text was
/// supplied.
fn default_text_to_corpus(mut arguments: Value, ctx: &EnrichContext<'_>) -> Value {
    if let Some(args) = arguments.as_object_mut() {
        let has_text = args
            .get("text")
            .and_then(Value::as_str)
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        if !has_text {
            args.insert("text".to_string(), Value::String(ctx.note_corpus.to_string()));
        }
    }
    arguments
}
