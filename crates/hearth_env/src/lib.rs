//! Hearth Environment Layer
//!
//! Everything the bridge knows about configuration arrives through
//! environment variables:
//!
//! - **Caller identity:** written by the entry points from host strings
//! - **Side-channel file:** `p4a_env_vars.txt` in the unpack directory
//! - **Computed defaults:** app path, unpack dir, log name
//!
//! [`merge`] applies the tiers in a fixed order and returns a typed
//! [`MergedEnv`] snapshot for the rest of the pipeline.

pub mod env_file;
pub mod environment;
pub mod keys;
pub mod launch;
pub mod merge;

pub use env_file::{EnvFileError, ENV_FILE_NAME};
pub use environment::{Environment, MapEnv, ProcessEnv};
pub use launch::LaunchRequest;
pub use merge::{merge, EnvFileStatus, MergedEnv};

/// Bootstrap identity exported to applications as `P4A_BOOTSTRAP`.
///
/// Baked in at build time from `HEARTH_BOOTSTRAP_NAME`.
pub const BOOTSTRAP_NAME: &str = match option_env!("HEARTH_BOOTSTRAP_NAME") {
    Some(name) => name,
    None => "service_only",
};
