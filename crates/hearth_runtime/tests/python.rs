//! End-to-end runs against the embedded CPython through the C ABI.
//!
//! One interpreter serves the whole test binary. Paths that end the process
//! or finalize the interpreter run in a child copy of this binary.

#![cfg(feature = "python")]

use hearth_env::keys;
use hearth_runtime::exports::{
    hearth_service_start, hearth_setenv, hearth_worker_start, hearth_worker_teardown,
};
use hearth_script::bootstrap::string_literal;
use serial_test::serial;
use std::ffi::{c_char, c_int, CString};
use std::path::Path;
use std::process::{Command, ExitStatus};

type StartFn = unsafe extern "C" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
) -> c_int;

const CHILD_VAR: &str = "HEARTH_PYTHON_CHILD";

fn c_string(value: &str) -> CString {
    CString::new(value).expect("test strings have no interior NUL")
}

/// Entrypoint source. Each run starts from a `__main__` without `main`.
fn script(body: &str) -> String {
    format!("globals().pop('main', None)\n{body}")
}

fn write_script(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), script(body)).expect("script should be writable");
}

fn quoted(path: &Path) -> String {
    string_literal(&path.to_string_lossy())
}

fn launch(start: StartFn, app_dir: &Path, entrypoint: &str, argument: &str) -> c_int {
    std::env::remove_var(keys::ANDROID_UNPACK);
    let previous_dir = std::env::current_dir().expect("cwd should be readable");

    let app_dir = c_string(&app_dir.to_string_lossy());
    let entrypoint = c_string(entrypoint);
    let log_name = c_string("hearth-test");
    let unset = c_string("");
    let argument = c_string(argument);
    let code = unsafe {
        start(
            app_dir.as_ptr(),
            app_dir.as_ptr(),
            entrypoint.as_ptr(),
            log_name.as_ptr(),
            unset.as_ptr(),
            unset.as_ptr(),
            argument.as_ptr(),
        )
    };

    std::env::set_current_dir(previous_dir).expect("cwd should be restorable");
    code
}

fn is_child(test: &str) -> bool {
    std::env::var(CHILD_VAR).as_deref() == Ok(test)
}

fn run_in_child(test: &str) -> ExitStatus {
    let exe = std::env::current_exe().expect("test binary path should be known");
    Command::new(exe)
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_VAR, test)
        .status()
        .expect("child should spawn")
}

#[test]
#[serial]
fn argument_reaches_main_intact() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    let out = dir.path().join("argument.txt");
    write_script(
        dir.path(),
        "main.py",
        &format!(
            "def main(arg):\n    with open({}, 'w') as f:\n        f.write(arg)\n",
            quoted(&out)
        ),
    );
    let argument = "it's a \"q\" \\ x";

    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", argument), 0);

    let received = std::fs::read_to_string(&out).expect("main should have written its argument");
    assert_eq!(received, argument);
}

#[test]
#[serial]
fn compiled_entrypoint_runs() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    let marker = dir.path().join("marker.txt");
    let source = dir.path().join("comp.py");
    let compiled = dir.path().join("comp.pyc");
    write_script(
        dir.path(),
        "comp.py",
        &format!("with open({}, 'w') as f:\n    f.write('compiled')\n", quoted(&marker)),
    );
    write_script(
        dir.path(),
        "main.py",
        &format!(
            "import py_compile\npy_compile.compile({}, cfile={}, doraise=True)\n",
            quoted(&source),
            quoted(&compiled)
        ),
    );
    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), 0);
    std::fs::remove_file(&source).expect("source should be removable");

    assert_eq!(launch(hearth_worker_start, dir.path(), "comp.pyc", ""), 0);

    let written = std::fs::read_to_string(&marker).expect("compiled entrypoint should have run");
    assert_eq!(written, "compiled");
}

#[test]
#[serial]
fn raising_entrypoint_returns_script_error() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    write_script(dir.path(), "main.py", "1/0\n");

    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), 1);

    // The failed run released its registration
    write_script(dir.path(), "main.py", "x = 1\n");
    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), 0);
}

#[test]
#[serial]
fn raising_main_returns_script_error() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    write_script(dir.path(), "main.py", "def main(arg):\n    raise ValueError(arg)\n");

    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", "bad"), 1);
}

#[test]
#[serial]
fn entrypoint_without_main_succeeds() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    write_script(dir.path(), "main.py", "value = 42\n");

    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", "ignored"), 0);
}

#[test]
#[serial]
fn missing_entrypoint_is_a_resolution_failure() {
    let dir = tempfile::tempdir().expect("temp dir should exist");

    assert_eq!(launch(hearth_worker_start, dir.path(), "absent.py", ""), -1);
    assert_eq!(launch(hearth_worker_start, dir.path(), "main", ""), -1);
}

#[test]
#[serial]
fn worker_on_another_thread_shares_the_interpreter() {
    let dir = tempfile::tempdir().expect("temp dir should exist");
    let out = dir.path().join("thread.txt");
    write_script(
        dir.path(),
        "main.py",
        &format!("with open({}, 'a') as f:\n    f.write('run\\n')\n", quoted(&out)),
    );

    let app_dir = dir.path().to_path_buf();
    let code = std::thread::spawn(move || launch(hearth_worker_start, &app_dir, "main.py", ""))
        .join()
        .expect("worker thread should not panic");
    assert_eq!(code, 0);
    assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), 0);

    let lines = std::fs::read_to_string(&out).expect("both runs should have written");
    assert_eq!(lines.lines().count(), 2);
}

#[test]
#[serial]
fn null_strings_are_rejected() {
    let value = c_string("x");
    let code = unsafe {
        hearth_worker_start(
            value.as_ptr(),
            value.as_ptr(),
            std::ptr::null(),
            value.as_ptr(),
            value.as_ptr(),
            value.as_ptr(),
            value.as_ptr(),
        )
    };
    assert_eq!(code, -1);
    assert_eq!(unsafe { hearth_setenv(c"A=B".as_ptr(), value.as_ptr()) }, -1);
}

#[test]
fn service_exits_through_the_interpreter() {
    const NAME: &str = "service_exits_through_the_interpreter";
    if is_child(NAME) {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        write_script(dir.path(), "main.py", "1/0\n");
        launch(hearth_service_start, dir.path(), "main.py", "");
        // sys.exit(1) should have ended the process already
        std::process::exit(85);
    }

    assert_eq!(run_in_child(NAME).code(), Some(1));
}

#[test]
fn teardown_is_final() {
    const NAME: &str = "teardown_is_final";
    if is_child(NAME) {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        write_script(dir.path(), "main.py", "value = 1\n");

        assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), 0);
        assert_eq!(hearth_worker_teardown(), 0);
        assert_eq!(launch(hearth_worker_start, dir.path(), "main.py", ""), -1);
        return;
    }

    assert!(run_in_child(NAME).success());
}
