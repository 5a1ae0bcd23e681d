//! The orchestration engine and its run-scoped state

pub mod effects;
pub mod engine;
pub mod prompt;

pub use effects::SideEffectFlags;
pub use engine::{Orchestrator, RunOutcome, FALLBACK_RESPONSE, MODEL_ERROR_RESPONSE};
pub use prompt::build_system_prompt;
