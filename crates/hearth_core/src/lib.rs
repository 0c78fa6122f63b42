//! Hearth Core
//!
//! The bootstrap state machine shared by every entry point:
//! - Runtime lifecycle (init once, per-invocation access, one-shot finalize)
//! - Module search path derived from the unpacked bundle
//! - Entrypoint resolution with compiled/source fallback

pub mod entrypoint;
pub mod error;
pub mod lifecycle;
pub mod paths;

pub use entrypoint::{Entrypoint, EntrypointKind, FileProbe, FsProbe};
pub use error::{BackendError, LifecycleError, ResolveError};
pub use lifecycle::{AccessToken, Runtime, RuntimeBackend, RuntimeState};
pub use paths::SearchPath;

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
