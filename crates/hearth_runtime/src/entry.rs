//! Entry adapters
//!
//! Each host call site writes its identity into the environment, merges it
//! and starts the interpreter under the process environment lock, then runs
//! the driver with its own exit policy. The lock is dropped before any script
//! runs, so a long-running service never blocks a worker starting next to it.

use crate::driver::{Driver, ExecutionOutcome, ExitPolicy};
use hearth_core::Runtime;
use hearth_env::{keys, merge, Environment, LaunchRequest, MergedEnv, ProcessEnv, BOOTSTRAP_NAME};
use hearth_script::Interpreter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Foreground activity; identity comes from variables the host set
    /// beforehand.
    App,
    Service,
    /// Background worker; the host finalizes through [`teardown`].
    Worker,
}

impl CallSite {
    pub fn argument_key(self) -> Option<&'static str> {
        match self {
            CallSite::App => None,
            CallSite::Service => Some(keys::PYTHON_SERVICE_ARGUMENT),
            CallSite::Worker => Some(keys::PYTHON_WORKER_ARGUMENT),
        }
    }

    pub fn exit_policy(self) -> ExitPolicy {
        match self {
            CallSite::App | CallSite::Service => ExitPolicy::RequestExit,
            CallSite::Worker => ExitPolicy::ReturnToHost,
        }
    }
}

/// Write the caller identity (if any) and merge the environment.
pub fn prepare<E: Environment + ?Sized>(
    env: &mut E,
    site: CallSite,
    request: Option<&LaunchRequest>,
) -> MergedEnv {
    if let Some(request) = request {
        request.write_to(env, site.argument_key(), BOOTSTRAP_NAME);
    }
    merge(env, BOOTSTRAP_NAME)
}

/// Run one invocation against the process environment.
pub fn start<I: Interpreter>(
    runtime: &Runtime<I>,
    site: CallSite,
    request: Option<LaunchRequest>,
) -> ExecutionOutcome {
    let driver = Driver::new(runtime);
    let (merged, search_path) = {
        let mut env = ProcessEnv::lock();
        let merged = prepare(&mut env, site, request.as_ref());
        // Interpreter start-up reads the environment
        match driver.start_runtime(&merged) {
            Ok(search_path) => (merged, search_path),
            Err(_) => return ExecutionOutcome::aborted(),
        }
    };
    let argument = request.and_then(|request| request.argument);
    driver.run_started(&merged, search_path.as_ref(), argument.as_deref(), site.exit_policy())
}

pub fn start_app<I: Interpreter>(runtime: &Runtime<I>) -> i32 {
    start(runtime, CallSite::App, None).code
}

pub fn start_service<I: Interpreter>(runtime: &Runtime<I>, request: LaunchRequest) -> i32 {
    start(runtime, CallSite::Service, Some(request)).code
}

pub fn start_worker<I: Interpreter>(runtime: &Runtime<I>, request: LaunchRequest) -> i32 {
    start(runtime, CallSite::Worker, Some(request)).code
}

/// Worker teardown. The runtime cannot be started again afterwards.
pub fn teardown<I: Interpreter>(runtime: &Runtime<I>) -> i32 {
    runtime.finalize()
}
