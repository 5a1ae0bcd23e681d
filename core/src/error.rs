//! Error types and handling for the noteflow engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the noteflow engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model completion errors (fatal to a run)
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Tool dispatch errors (local to one tool call)
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Note store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("No configuration found")]
    NoConfigFound,
}

/// Model completion errors. Any of these aborts the run; the caller
/// receives a fixed safe error fragment instead of a response.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Empty completion response")]
    EmptyResponse,
}

/// Tool dispatch errors. These are caught at the dispatcher boundary and
/// surfaced to the model as a failed tool result, never to the caller.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid tool arguments: {message}")]
    Validation { message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Workspace is not connected")]
    NotConnected,

    #[error("Note not found: {id}")]
    NotFound { id: String },

    #[error("Tool worker unavailable in this environment")]
    WorkerUnavailable,

    #[error("Tool call timed out: {name}")]
    Timeout { name: String },

    #[error("Worker protocol error: {message}")]
    Worker { message: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },
}

/// Note store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Note not found: {id}")]
    NotFound { id: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database {
            message: err.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
