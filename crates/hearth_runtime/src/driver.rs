//! Execution driver
//!
//! One invocation, start to finish:
//! 1. change into the app directory
//! 2. derive the search path and initialize the runtime (once per process)
//! 3. register against the runtime for the rest of the invocation
//! 4. bootstrap statements, entrypoint, optional `main(argument)`
//! 5. exit request when the call site wants one
//!
//! Script errors are reported and execution moves on to the next stage.
//! Resolution failures stop the invocation with [`RESOLUTION_FAILURE`].
//! Registration is released on every path by the token's scope.
//!
//! Steps 1 and 2 are [`Driver::start_runtime`], the rest is
//! [`Driver::run_started`]. Interpreter start-up reads the process
//! environment, so callers sharing it hold the environment lock across
//! `start_runtime` (see [`crate::entry::start`]).

use hearth_core::{
    AccessToken, Entrypoint, FileProbe, FsProbe, LifecycleError, Runtime, SearchPath,
};
use hearth_env::MergedEnv;
use hearth_script::{bootstrap, Interpreter, MainCall, ScriptError};

pub const SUCCESS: i32 = 0;
pub const SCRIPT_ERROR: i32 = 1;
pub const RESOLUTION_FAILURE: i32 = -1;

/// What to do once the entrypoint and `main` have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Exit through the interpreter with the result code. Regular
    /// finalization breaks the next launch; `sys.exit` does not.
    RequestExit,
    /// Return to the host, which owns the lifecycle.
    ReturnToHost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub code: i32,
    pub error_occurred: bool,
    pub exit_requested: bool,
}

impl ExecutionOutcome {
    pub(crate) fn aborted() -> Self {
        Self {
            code: RESOLUTION_FAILURE,
            error_occurred: true,
            exit_requested: false,
        }
    }
}

pub struct Driver<'rt, I: Interpreter, P = FsProbe> {
    runtime: &'rt Runtime<I>,
    probe: P,
    change_dir: bool,
}

impl<'rt, I: Interpreter> Driver<'rt, I> {
    pub fn new(runtime: &'rt Runtime<I>) -> Self {
        Self {
            runtime,
            probe: FsProbe,
            change_dir: true,
        }
    }
}

impl<'rt, I: Interpreter, P: FileProbe> Driver<'rt, I, P> {
    pub fn with_probe<Q: FileProbe>(self, probe: Q) -> Driver<'rt, I, Q> {
        Driver {
            runtime: self.runtime,
            probe,
            change_dir: self.change_dir,
        }
    }

    /// Leave the process working directory alone.
    pub fn without_chdir(mut self) -> Self {
        self.change_dir = false;
        self
    }

    pub fn run(
        &self,
        merged: &MergedEnv,
        argument: Option<&str>,
        policy: ExitPolicy,
    ) -> ExecutionOutcome {
        match self.start_runtime(merged) {
            Ok(search_path) => self.run_started(merged, search_path.as_ref(), argument, policy),
            Err(_) => ExecutionOutcome::aborted(),
        }
    }

    /// Change into the app directory, derive the search path and make sure
    /// the interpreter is running.
    pub fn start_runtime(&self, merged: &MergedEnv) -> Result<Option<SearchPath>, LifecycleError> {
        tracing::info!("Initializing Python for Android");
        match serde_json::to_string(merged) {
            Ok(config) => tracing::debug!(%config, "effective launch configuration"),
            Err(err) => tracing::debug!(%err, "failed to render launch configuration"),
        }

        if self.change_dir {
            change_dir(merged);
        }

        let search_path = merged.unpack_dir.as_deref().and_then(SearchPath::resolve);
        if let Err(err) = self.runtime.ensure_initialized(search_path.as_ref()) {
            tracing::error!(%err, "cannot start python");
            return Err(err);
        }
        Ok(search_path)
    }

    /// Register, run the bootstrap, entrypoint and `main`, then release.
    pub fn run_started(
        &self,
        merged: &MergedEnv,
        search_path: Option<&SearchPath>,
        argument: Option<&str>,
        policy: ExitPolicy,
    ) -> ExecutionOutcome {
        let token = match self.runtime.acquire_access() {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(%err, "cannot register against the runtime");
                return ExecutionOutcome::aborted();
            }
        };
        let outcome = self.execute(&token, merged, search_path, argument, policy);
        token.release();

        if outcome.exit_requested {
            tracing::warn!("Unexpectedly reached python finalization");
        }
        outcome
    }

    fn execute(
        &self,
        token: &AccessToken<'_, I>,
        merged: &MergedEnv,
        search_path: Option<&SearchPath>,
        argument: Option<&str>,
        policy: ExitPolicy,
    ) -> ExecutionOutcome {
        let interpreter = token.interpreter();

        for statement in bootstrap::statements(search_path) {
            if let Err(err) = interpreter.run_source(&statement.source) {
                tracing::warn!(statement = statement.label, %err, "bootstrap statement raised");
                interpreter.report_error(&err);
            }
        }
        tracing::info!("AND: Ran string");

        tracing::info!("Run user program, change dir and execute entrypoint");
        let name = merged.entrypoint.as_deref().unwrap_or_default();
        let entrypoint = match Entrypoint::resolve(name, &self.probe) {
            Ok(entrypoint) => entrypoint,
            Err(err) => {
                tracing::error!(%err, "entrypoint resolution failed");
                return ExecutionOutcome::aborted();
            }
        };

        let mut code = SUCCESS;
        match interpreter.run_file(entrypoint.path()) {
            Ok(()) => {}
            Err(err @ ScriptError::Open { .. }) => {
                tracing::error!(%err, "Open the entrypoint failed");
                return ExecutionOutcome::aborted();
            }
            Err(err) => {
                code = SCRIPT_ERROR;
                report(interpreter, &err);
            }
        }

        tracing::info!("Executing main function if it exists");
        match interpreter.call_main(argument.unwrap_or_default()) {
            Ok(MainCall::Called) => tracing::debug!("main() returned"),
            Ok(MainCall::Missing) => tracing::debug!("entrypoint defines no main()"),
            Err(err) => {
                code = SCRIPT_ERROR;
                report(interpreter, &err);
            }
        }

        tracing::info!(code, "Python for android ended.");

        let exit_requested = policy == ExitPolicy::RequestExit;
        if exit_requested {
            // Normally does not return: the interpreter exits the process
            if let Err(err) = interpreter.request_exit(code) {
                interpreter.report_error(&err);
            }
        }

        ExecutionOutcome {
            code,
            error_occurred: code != SUCCESS,
            exit_requested,
        }
    }
}

fn report<I: Interpreter>(interpreter: &I, err: &ScriptError) {
    tracing::error!(%err, "python raised");
    interpreter.report_error(err);
    interpreter.write_stdout("\n");
}

fn change_dir(merged: &MergedEnv) {
    let Some(app_dir) = merged.app_dir.as_deref() else {
        return;
    };
    tracing::info!(
        dir = %app_dir.display(),
        "Changing directory to the one provided by ANDROID_ARGUMENT"
    );
    if let Err(err) = std::env::set_current_dir(app_dir) {
        tracing::warn!(%err, dir = %app_dir.display(), "failed to change directory");
    }
}
