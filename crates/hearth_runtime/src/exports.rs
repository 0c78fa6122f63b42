//! C ABI for the host's native bridge
//!
//! Strings arrive as NUL-terminated UTF-8. A null or malformed string fails
//! the call with -1 before anything runs. Panics are caught here; they must
//! not unwind into the host.

use crate::entry;
use crate::logging;
use anyhow::{bail, Context as _, Result};
use hearth_core::Runtime;
use hearth_env::{Environment, LaunchRequest, ProcessEnv};
use hearth_script::PythonInterpreter;
use once_cell::sync::Lazy;
use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

static RUNTIME: Lazy<Runtime<PythonInterpreter>> =
    Lazy::new(|| Runtime::new(PythonInterpreter::new()));

fn guarded(name: &str, call: impl FnOnce() -> Result<c_int>) -> c_int {
    logging::init();
    tracing::info!("Entering {name}");
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => {
            tracing::error!("{name} failed: {err:#}");
            -1
        }
        Err(_) => {
            tracing::error!("{name} panicked");
            -1
        }
    }
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the call.
unsafe fn read_str(ptr: *const c_char, what: &str) -> Result<String> {
    if ptr.is_null() {
        bail!("{what} is null");
    }
    let value = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .with_context(|| format!("{what} is not valid UTF-8"))?;
    Ok(value.to_owned())
}

/// # Safety
/// Every pointer must satisfy [`read_str`].
#[allow(clippy::too_many_arguments)]
unsafe fn read_request(
    private_dir: *const c_char,
    app_dir: *const c_char,
    entrypoint: *const c_char,
    log_name: *const c_char,
    python_home: *const c_char,
    python_path: *const c_char,
    argument: *const c_char,
) -> Result<LaunchRequest> {
    unsafe {
        Ok(LaunchRequest {
            private_dir: read_str(private_dir, "private dir")?,
            app_dir: read_str(app_dir, "app dir")?,
            entrypoint: read_str(entrypoint, "entrypoint")?,
            log_name: read_str(log_name, "log name")?,
            python_home: read_str(python_home, "python home")?,
            python_path: read_str(python_path, "python path")?,
            argument: Some(read_str(argument, "argument")?),
        })
    }
}

/// Foreground start. Reads its configuration from the environment the host
/// populated with [`hearth_setenv`].
#[no_mangle]
pub extern "C" fn hearth_app_start() -> c_int {
    guarded("hearth_app_start", || Ok(entry::start_app(&RUNTIME)))
}

/// # Safety
/// All arguments must be valid NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn hearth_service_start(
    private_dir: *const c_char,
    app_dir: *const c_char,
    entrypoint: *const c_char,
    log_name: *const c_char,
    python_home: *const c_char,
    python_path: *const c_char,
    argument: *const c_char,
) -> c_int {
    guarded("hearth_service_start", || {
        let request = unsafe {
            read_request(
                private_dir,
                app_dir,
                entrypoint,
                log_name,
                python_home,
                python_path,
                argument,
            )
        }?;
        Ok(entry::start_service(&RUNTIME, request))
    })
}

/// # Safety
/// All arguments must be valid NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn hearth_worker_start(
    private_dir: *const c_char,
    app_dir: *const c_char,
    entrypoint: *const c_char,
    log_name: *const c_char,
    python_home: *const c_char,
    python_path: *const c_char,
    argument: *const c_char,
) -> c_int {
    guarded("hearth_worker_start", || {
        let request = unsafe {
            read_request(
                private_dir,
                app_dir,
                entrypoint,
                log_name,
                python_home,
                python_path,
                argument,
            )
        }?;
        Ok(entry::start_worker(&RUNTIME, request))
    })
}

/// One-shot: the worker process cannot start Python again afterwards.
#[no_mangle]
pub extern "C" fn hearth_worker_teardown() -> c_int {
    guarded("hearth_worker_teardown", || Ok(entry::teardown(&RUNTIME)))
}

/// Returns -1 when the pair cannot live in the environment (empty name, `=`
/// in the name, NUL anywhere).
///
/// # Safety
/// Both arguments must be valid NUL-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn hearth_setenv(name: *const c_char, value: *const c_char) -> c_int {
    guarded("hearth_setenv", || {
        let name = unsafe { read_str(name, "variable name") }?;
        let value = unsafe { read_str(value, "variable value") }?;
        if !ProcessEnv::lock().set(&name, &value) {
            bail!("refused to set {name:?}");
        }
        Ok(0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_str_rejects_null_and_bad_utf8() {
        let err = unsafe { read_str(std::ptr::null(), "entrypoint") }
            .expect_err("null should fail");
        assert_eq!(err.to_string(), "entrypoint is null");

        let bad = [0xffu8, 0xfe, 0x00];
        let err = unsafe { read_str(bad.as_ptr().cast(), "app dir") }
            .expect_err("bad UTF-8 should fail");
        assert_eq!(err.to_string(), "app dir is not valid UTF-8");

        let good = c"main.py";
        let value = unsafe { read_str(good.as_ptr(), "entrypoint") }.expect("valid string");
        assert_eq!(value, "main.py");
    }

    #[test]
    fn guarded_maps_failures_to_minus_one() {
        assert_eq!(guarded("ok", || Ok(3)), 3);
        assert_eq!(guarded("err", || bail!("boom")), -1);
        assert_eq!(guarded("panic", || panic!("boom")), -1);
    }

    #[test]
    #[serial_test::serial]
    fn setenv_reports_refused_pairs() {
        let value = c"yes";
        let code = unsafe { hearth_setenv(c"HEARTH_SETENV_TEST".as_ptr(), value.as_ptr()) };
        assert_eq!(code, 0);
        assert_eq!(std::env::var("HEARTH_SETENV_TEST").as_deref(), Ok("yes"));

        assert_eq!(unsafe { hearth_setenv(c"HEARTH=BAD".as_ptr(), value.as_ptr()) }, -1);
        assert_eq!(unsafe { hearth_setenv(c"".as_ptr(), value.as_ptr()) }, -1);
        assert_eq!(unsafe { hearth_setenv(std::ptr::null(), value.as_ptr()) }, -1);

        std::env::remove_var("HEARTH_SETENV_TEST");
    }
}
