//! Tool catalog, validation, enrichment and dispatch

pub mod catalog;
pub mod dispatch;
pub mod enrich;
pub mod notes;
pub mod schema;
pub mod worker;
pub mod workspace;

pub use catalog::{catalog, names, ToolDescriptor};
pub use dispatch::{Dispatcher, RunContext, ToolOutcome};
pub use worker::WorkerClient;
pub use workspace::{HttpWorkspaceConnector, WorkspaceConnector};
