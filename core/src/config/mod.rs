//! Engine configuration structures

pub mod model;

pub use model::{ResolvedModelConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Maximum model-tool round trips in one run before forced termination
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// Default per-call timeout for worker round trips
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 30;

/// Configuration for the orchestration engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Iteration cap for one run
    pub max_iterations: usize,

    /// Tool worker process configuration. `None` means remote stateless
    /// tools degrade to a stub failure instead of being dispatched.
    #[serde(default)]
    pub worker: Option<WorkerConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            worker: None,
        }
    }
}

impl EngineConfig {
    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the worker configuration
    pub fn with_worker(mut self, worker: WorkerConfig) -> Self {
        self.worker = Some(worker);
        self
    }
}

/// Configuration for the out-of-process tool worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Program to spawn
    pub command: String,

    /// Arguments for the program
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables for the worker process
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Per-call timeout in seconds
    #[serde(default = "default_worker_timeout")]
    pub timeout_secs: u64,
}

fn default_worker_timeout() -> u64 {
    DEFAULT_WORKER_TIMEOUT_SECS
}

impl WorkerConfig {
    /// Create a worker configuration with the default timeout
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: HashMap::new(),
            timeout_secs: DEFAULT_WORKER_TIMEOUT_SECS,
        }
    }

    /// Per-call timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
