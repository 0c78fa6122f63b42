//! Side-channel environment file (`p4a_env_vars.txt`)
//!
//! One `KEY=VALUE` pair per line, split on the first `=`. A trailing `\n`
//! and then a trailing `\r` are stripped from the value; nothing else is
//! interpreted. Lines without `=` are skipped, and so are lines that are not
//! valid UTF-8.

use crate::environment::Environment;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up inside the unpack directory.
pub const ENV_FILE_NAME: &str = "p4a_env_vars.txt";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("failed to read env file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Location of the env file for an unpack directory.
pub fn path_in(unpack_dir: &Path) -> PathBuf {
    unpack_dir.join(ENV_FILE_NAME)
}

/// Split a single raw line (line terminator included or not).
///
/// Returns `None` for lines with no `=`. The name may come back empty;
/// [`Environment::set`] drops those.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    let value = match value.strip_suffix('\n') {
        Some(value) => value.strip_suffix('\r').unwrap_or(value),
        None => value,
    };
    Some((name, value))
}

/// Read and parse `path`. Lines that are not valid UTF-8 are skipped with a
/// warning.
pub fn load(path: &Path) -> Result<Vec<(String, String)>, EnvFileError> {
    let bytes = std::fs::read(path).map_err(|source| EnvFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pairs = Vec::new();
    for (index, raw) in bytes.split_inclusive(|byte| *byte == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(raw) else {
            tracing::warn!(line = index + 1, file = %path.display(), "skipping non UTF-8 line");
            continue;
        };
        if let Some((name, value)) = parse_line(line) {
            pairs.push((name.to_string(), value.to_string()));
        }
    }
    Ok(pairs)
}

/// Load `path` and set every pair on `env` with overwrite.
///
/// Returns how many pairs `env` accepted.
pub fn apply<E: Environment + ?Sized>(env: &mut E, path: &Path) -> Result<usize, EnvFileError> {
    let pairs = load(path)?;
    Ok(pairs
        .iter()
        .filter(|(name, value)| env.set(name, value))
        .count())
}
