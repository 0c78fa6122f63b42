//! CPython backend
//!
//! Thread registration maps onto `PyGILState_Ensure`/`Release`; everything
//! else goes through pyo3 while the registration is held. Errors raised by
//! scripts are put back into the interpreter so `report_error` can print
//! them with `PyErr_Print` semantics (an exit request terminates there).

use crate::bootstrap;
use crate::ffi;
use crate::runtime::{Interpreter, MainCall, ScriptError};
use hearth_core::{BackendError, RuntimeBackend, SearchPath};
use hearth_env::keys;
use pyo3::exceptions::PyAttributeError;
use pyo3::prelude::*;
use std::ffi::CString;
use std::path::Path;

#[pyfunction]
fn log(message: &str) {
    ffi::log_from_script(message);
}

#[pymodule]
fn androidembed(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(log, m)?)?;
    Ok(())
}

/// Restore `err` as the pending exception and describe it.
fn pending(py: Python<'_>, err: PyErr) -> ScriptError {
    let kind = err
        .get_type(py)
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "Exception".to_string());
    let message = err.value(py).to_string();
    err.restore(py);
    ScriptError::raised(kind, message)
}

#[derive(Debug, Default)]
pub struct PythonInterpreter;

impl PythonInterpreter {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeBackend for PythonInterpreter {
    type Registration = pyo3::ffi::PyGILState_STATE;

    fn initialize(&self, search_path: Option<&SearchPath>) -> Result<(), BackendError> {
        if unsafe { pyo3::ffi::Py_IsInitialized() } != 0 {
            return Err(BackendError::new(
                "a Python interpreter is already running in this process",
            ));
        }

        // Bundle paths go ahead of whatever the host put in PYTHONPATH. The
        // entry adapters hold the environment lock until this returns.
        if let Some(search_path) = search_path {
            let primary = search_path.primary();
            let paths = match std::env::var(keys::PYTHONPATH) {
                Ok(existing) if !existing.is_empty() => format!("{primary}:{existing}"),
                _ => primary,
            };
            std::env::set_var(keys::PYTHONPATH, &paths);
            tracing::info!(%paths, "set wchar paths");
        }

        pyo3::append_to_inittab!(androidembed);
        // Leaves the GIL released, as PyEval_SaveThread would
        Python::initialize();
        Ok(())
    }

    fn attach(&self) -> Self::Registration {
        unsafe { pyo3::ffi::PyGILState_Ensure() }
    }

    fn detach(&self, registration: Self::Registration) {
        unsafe { pyo3::ffi::PyGILState_Release(registration) }
    }

    fn finalize(&self) -> i32 {
        unsafe {
            pyo3::ffi::PyGILState_Ensure();
            pyo3::ffi::Py_FinalizeEx()
        }
    }
}

impl Interpreter for PythonInterpreter {
    fn run_source(&self, source: &str) -> Result<(), ScriptError> {
        let code = CString::new(source)
            .map_err(|_| ScriptError::raised("ValueError", "source contains a NUL byte"))?;
        Python::attach(|py| py.run(&code, None, None).map_err(|err| pending(py, err)))
    }

    fn run_file(&self, path: &Path) -> Result<(), ScriptError> {
        std::fs::File::open(path).map_err(|err| ScriptError::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        self.run_source(&bootstrap::run_file(path))
    }

    fn report_error(&self, error: &ScriptError) {
        Python::attach(|py| match PyErr::take(py) {
            Some(err) => err.print(py),
            None => tracing::error!(%error, "script error"),
        });
    }

    fn write_stdout(&self, text: &str) {
        Python::attach(|py| {
            let written = py
                .import("sys")
                .and_then(|sys| sys.getattr("stdout"))
                .and_then(|stdout| stdout.call_method1("write", (text,)));
            if let Err(err) = written {
                tracing::debug!(%err, "failed to write to sys.stdout");
            }
        });
    }

    fn call_main(&self, argument: &str) -> Result<MainCall, ScriptError> {
        Python::attach(|py| {
            let main_module = py.import("__main__").map_err(|err| pending(py, err))?;
            let main = match main_module.getattr("main") {
                Ok(main) => main,
                Err(err) if err.is_instance_of::<PyAttributeError>(py) => {
                    return Ok(MainCall::Missing)
                }
                Err(err) => return Err(pending(py, err)),
            };
            main.call1((argument,)).map_err(|err| pending(py, err))?;
            Ok(MainCall::Called)
        })
    }
}
