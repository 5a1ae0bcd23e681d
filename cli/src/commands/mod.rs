//! CLI command implementations

pub mod ask;
pub mod tools;

pub use ask::{ask_command, AskOptions};
pub use tools::tools_command;
