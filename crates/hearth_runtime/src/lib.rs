//! Hearth Runtime
//!
//! Boots the embedded interpreter for the host's call sites and runs the
//! user entrypoint.
//!
//! - [`driver`]: one invocation from environment merge to exit request
//! - [`entry`]: foreground, service, worker and teardown adapters
//! - `exports` (feature `python`): the C ABI the host links against

pub mod driver;
pub mod entry;
#[cfg(feature = "python")]
pub mod exports;
pub mod logging;

#[cfg(test)]
mod testing;

pub use driver::{Driver, ExecutionOutcome, ExitPolicy};
pub use entry::CallSite;
