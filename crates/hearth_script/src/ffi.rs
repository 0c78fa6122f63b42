//! Native callbacks exposed to scripts
//!
//! Scripts reach the platform log through `androidembed.log(message)`.
//! The tag is read from `PYTHON_NAME` on every call, so an env-file override
//! is honoured.

use hearth_env::keys;

/// Tag for script output.
pub fn log_tag() -> String {
    std::env::var(keys::PYTHON_NAME).unwrap_or_else(|_| keys::DEFAULT_LOG_NAME.to_string())
}

/// Backing implementation of `androidembed.log`.
pub fn log_from_script(message: &str) {
    let tag = log_tag();
    tracing::info!(target: "script", tag = %tag, "{message}");
}
