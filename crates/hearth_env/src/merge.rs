//! Environment merge
//!
//! Order matters and is fixed:
//! 1. bootstrap marker and derived variables (app path, unpack dir, log name)
//! 2. snapshot of app dir, entrypoint and log name
//! 3. `p4a_env_vars.txt` applied with overwrite
//! 4. unpack dir re-read, so the file may relocate the bundle
//!
//! The caller identity has already been written by the entry point at this
//! point, so the file wins over caller values for any key it defines.

use crate::env_file;
use crate::environment::Environment;
use crate::keys;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of the side-channel file lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvFileStatus {
    Applied { pairs: usize },
    Missing,
}

/// Typed view of the merged environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedEnv {
    pub bootstrap_name: String,
    /// `ANDROID_ARGUMENT`; the working directory for the script.
    pub app_dir: Option<PathBuf>,
    /// `ANDROID_ENTRYPOINT` as it stood before the env file was applied.
    pub entrypoint: Option<String>,
    pub log_name: String,
    /// `ANDROID_UNPACK` after the env file was applied.
    pub unpack_dir: Option<PathBuf>,
    pub env_file: EnvFileStatus,
}

/// Merge derived defaults and the env file into `env`.
///
/// Never fails. A missing env file is logged and skipped.
pub fn merge<E: Environment + ?Sized>(env: &mut E, bootstrap_name: &str) -> MergedEnv {
    env.set(keys::P4A_BOOTSTRAP, bootstrap_name);

    let app_dir = env.get(keys::ANDROID_ARGUMENT);
    match app_dir.as_deref() {
        Some(dir) => {
            env.set(keys::ANDROID_APP_PATH, dir);
            if !env.contains(keys::ANDROID_UNPACK) {
                env.set(keys::ANDROID_UNPACK, dir);
            }
        }
        None => tracing::warn!("ANDROID_ARGUMENT is not set, app path left undefined"),
    }

    let entrypoint = env.get(keys::ANDROID_ENTRYPOINT);
    let log_name = match env.get(keys::PYTHON_NAME) {
        Some(name) => name,
        None => {
            env.set(keys::PYTHON_NAME, keys::DEFAULT_LOG_NAME);
            keys::DEFAULT_LOG_NAME.to_string()
        }
    };

    tracing::info!("Setting additional env vars from {}", env_file::ENV_FILE_NAME);
    let env_file = match env.get(keys::ANDROID_UNPACK) {
        Some(unpack) => apply_env_file(env, Path::new(&unpack)),
        None => {
            tracing::warn!("no unpack directory, skipping {}", env_file::ENV_FILE_NAME);
            EnvFileStatus::Missing
        }
    };

    MergedEnv {
        bootstrap_name: bootstrap_name.to_string(),
        app_dir: app_dir.map(PathBuf::from),
        entrypoint,
        log_name,
        unpack_dir: env.get(keys::ANDROID_UNPACK).map(PathBuf::from),
        env_file,
    }
}

fn apply_env_file<E: Environment + ?Sized>(env: &mut E, unpack_dir: &Path) -> EnvFileStatus {
    match env_file::apply(env, &env_file::path_in(unpack_dir)) {
        Ok(pairs) => {
            tracing::debug!(pairs, "applied {}", env_file::ENV_FILE_NAME);
            EnvFileStatus::Applied { pairs }
        }
        Err(err) => {
            tracing::warn!(%err, "no {} found / failed to open", env_file::ENV_FILE_NAME);
            EnvFileStatus::Missing
        }
    }
}
