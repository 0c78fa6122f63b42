use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an invocation before the entrypoint runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid entrypoint '{name}', abort")]
    InvalidEntrypoint { name: String },

    #[error("entrypoint path is too long ({len} bytes, limit {max})")]
    TooLong { len: usize, max: usize },

    #[error("entrypoint not found (tried {tried:?}), abort")]
    NotFound { tried: Vec<PathBuf> },

    #[error("entrypoint '{name}' has an invalid extension (must be .py or .pyc), abort")]
    InvalidExtension { name: String },
}

/// Misuse or failure of the process-wide runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("runtime is not initialized")]
    NotInitialized,

    /// Restarting a finalized runtime is unsupported.
    #[error("runtime has been finalized and cannot be used again")]
    Finalized,

    #[error("runtime initialization failed: {0}")]
    InitFailed(String),
}

/// Failure reported by an interpreter backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
