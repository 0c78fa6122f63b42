//! Entrypoint resolution
//!
//! Either spelling is accepted as input and the compiled artifact wins when
//! both exist:
//!
//! | nominal    | tried in order        |
//! |------------|-----------------------|
//! | `main.pyc` | `main.pyc`, `main.py` |
//! | `main.py`  | `main.pyc`, `main.py` |
//!
//! Names are relative to the working directory unless absolute.

use crate::error::ResolveError;
use std::path::{Path, PathBuf};

/// Size of the fixed entrypoint name buffer. Names longer than
/// `ENTRYPOINT_MAXLEN - 2` bytes are rejected rather than truncated.
pub const ENTRYPOINT_MAXLEN: usize = 128;

pub const COMPILED_SUFFIX: &str = ".pyc";
pub const SOURCE_SUFFIX: &str = ".py";

/// Existence check used during resolution.
pub trait FileProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the filesystem: the path must open as a regular file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        std::fs::File::open(path)
            .and_then(|file| file.metadata())
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

impl<F: Fn(&Path) -> bool> FileProbe for F {
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrypointKind {
    Compiled,
    Source,
}

/// A resolved, existing entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint {
    nominal: String,
    path: PathBuf,
    kind: EntrypointKind,
}

impl Entrypoint {
    pub fn resolve(name: &str, probe: &impl FileProbe) -> Result<Self, ResolveError> {
        let Some(dot) = name.rfind('.') else {
            return Err(ResolveError::InvalidEntrypoint {
                name: name.to_string(),
            });
        };

        let max = ENTRYPOINT_MAXLEN - 2;
        if name.len() > max {
            return Err(ResolveError::TooLong {
                len: name.len(),
                max,
            });
        }

        let (compiled, source) = match &name[dot..] {
            COMPILED_SUFFIX => (name.to_string(), name[..name.len() - 1].to_string()),
            SOURCE_SUFFIX => (format!("{name}c"), name.to_string()),
            _ => {
                return Err(ResolveError::InvalidExtension {
                    name: name.to_string(),
                })
            }
        };

        let compiled = PathBuf::from(compiled);
        let source = PathBuf::from(source);
        let (path, kind) = if probe.exists(&compiled) {
            (compiled, EntrypointKind::Compiled)
        } else if probe.exists(&source) {
            (source, EntrypointKind::Source)
        } else {
            return Err(ResolveError::NotFound {
                tried: vec![compiled, source],
            });
        };

        tracing::debug!(entrypoint = %path.display(), ?kind, "resolved entrypoint");
        Ok(Self {
            nominal: name.to_string(),
            path,
            kind,
        })
    }

    /// The name as the caller spelled it.
    pub fn nominal(&self) -> &str {
        &self.nominal
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EntrypointKind {
        self.kind
    }
}
