//! Hearth Scripting Layer
//!
//! The embedded interpreter as seen by the bridge
//!
//! ## Architecture
//!
//! - **[`Interpreter`]:** execute statements and files, report errors, call `main`
//! - **Bootstrap:** fixed statements run before the entrypoint (path setup, stream redirection)
//! - **FFI:** the `androidembed.log` callback scripts use to reach the platform log
//!
//! The CPython backend lives behind the `python` feature.

pub mod bootstrap;
pub mod ffi;
#[cfg(feature = "python")]
pub mod python;
pub mod runtime;

pub use bootstrap::Statement;
pub use runtime::{Interpreter, MainCall, ScriptError};

#[cfg(feature = "python")]
pub use python::PythonInterpreter;
