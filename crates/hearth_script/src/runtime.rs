//! Interpreter interface
//!
//! Execution semantics stay inside the interpreter. The bridge only needs
//! "run this, did it raise?" plus a way to print what was raised.

use crate::bootstrap;
use hearth_core::RuntimeBackend;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The script raised; the interpreter keeps the details for
    /// [`Interpreter::report_error`].
    #[error("{kind}: {message}")]
    Raised { kind: String, message: String },

    #[error("failed to open '{}': {reason}", path.display())]
    Open { path: PathBuf, reason: String },
}

impl ScriptError {
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Whether the entrypoint defined `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainCall {
    Called,
    Missing,
}

/// An embedded interpreter.
///
/// Every method except the lifecycle hooks is only called while the calling
/// thread holds an [`AccessToken`](hearth_core::AccessToken).
pub trait Interpreter: RuntimeBackend {
    /// Execute a block of statements in the main module namespace.
    fn run_source(&self, source: &str) -> Result<(), ScriptError>;

    /// Execute a source or compiled file in the main module namespace.
    fn run_file(&self, path: &Path) -> Result<(), ScriptError>;

    /// Print the pending error through the interpreter's own facility.
    /// Does not return when the error is an exit request.
    fn report_error(&self, error: &ScriptError);

    /// Write to the interpreter's (possibly redirected) stdout.
    fn write_stdout(&self, text: &str);

    /// Call `main(argument)` if the main module defines it.
    fn call_main(&self, argument: &str) -> Result<MainCall, ScriptError>;

    /// Ask the interpreter to exit the process with `code`.
    fn request_exit(&self, code: i32) -> Result<(), ScriptError> {
        self.run_source(&bootstrap::exit(code))
    }
}
