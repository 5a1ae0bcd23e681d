//! Model completion collaborator: turn data model, client trait and the
//! OpenAI-compatible implementation

pub mod client;
pub mod message;
pub mod openai;

pub use client::{ModelClient, ModelReply};
pub use message::{ConversationTurn, ToolCallRequest, TurnRole};
pub use openai::OpenAiModelClient;
