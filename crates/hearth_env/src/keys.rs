//! Environment variable names shared with the host and with scripts

pub const ANDROID_PRIVATE: &str = "ANDROID_PRIVATE";
pub const ANDROID_ARGUMENT: &str = "ANDROID_ARGUMENT";
pub const ANDROID_APP_PATH: &str = "ANDROID_APP_PATH";
pub const ANDROID_ENTRYPOINT: &str = "ANDROID_ENTRYPOINT";
/// Not set by services; falls back to `ANDROID_ARGUMENT`.
pub const ANDROID_UNPACK: &str = "ANDROID_UNPACK";

pub const PYTHON_NAME: &str = "PYTHON_NAME";
pub const PYTHONHOME: &str = "PYTHONHOME";
pub const PYTHONPATH: &str = "PYTHONPATH";
pub const PYTHONOPTIMIZE: &str = "PYTHONOPTIMIZE";

pub const P4A_BOOTSTRAP: &str = "P4A_BOOTSTRAP";

pub const PYTHON_SERVICE_ARGUMENT: &str = "PYTHON_SERVICE_ARGUMENT";
pub const PYTHON_WORKER_ARGUMENT: &str = "PYTHON_WORKER_ARGUMENT";

/// Log tag used when `PYTHON_NAME` is absent.
pub const DEFAULT_LOG_NAME: &str = "python";

/// Fixed optimization level for every entry point.
pub const OPTIMIZE_LEVEL: &str = "2";
