//! Side-effect tracking for note mutations

use crate::tools::{names, ToolOutcome};
use serde::{Deserialize, Serialize};

/// Flags recording whether note-mutating tools fired successfully during a
/// run. Scoped to one run, initialized false, set monotonically and never
/// reset mid-run. The caller uses them to decide whether to refresh its
/// cached view of notes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideEffectFlags {
    /// A note was created by this run
    pub note_created: bool,

    /// A note was updated by this run
    pub note_updated: bool,
}

impl SideEffectFlags {
    /// Record the outcome of one dispatch. A flag is set only when the
    /// corresponding mutation dispatch actually succeeded; a failed attempt
    /// never sets it.
    pub fn record(&mut self, tool_name: &str, outcome: &ToolOutcome) {
        if !outcome.is_success() {
            return;
        }
        match tool_name {
            names::CREATE_NOTE => self.note_created = true,
            names::UPDATE_NOTE => self.note_updated = true,
            _ => {}
        }
    }
}
