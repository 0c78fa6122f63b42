//! Environment backends
//!
//! [`ProcessEnv`] writes through to the real process environment, which is
//! what the embedded interpreter reads. [`MapEnv`] keeps everything in memory.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Key/value store with overwrite-on-set semantics.
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, replacing any previous value.
    ///
    /// Pairs the platform cannot represent (empty key, `=` in the key, NUL
    /// anywhere) are dropped with a warning. Returns whether the pair was
    /// stored.
    fn set(&mut self, key: &str, value: &str) -> bool;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn is_settable(key: &str, value: &str) -> bool {
    if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
        tracing::warn!(key, "refusing to set unrepresentable environment variable");
        return false;
    }
    true
}

static PROCESS_ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// The process environment, held under a process-wide lock.
///
/// Entry points may run concurrently on different host threads; holding the
/// lock keeps one invocation's identity writes and merge together.
pub struct ProcessEnv {
    _guard: MutexGuard<'static, ()>,
}

impl ProcessEnv {
    /// Block until no other invocation is writing the environment.
    pub fn lock() -> Self {
        let guard = PROCESS_ENV_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Self { _guard: guard }
    }
}

impl Environment for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let settable = is_settable(key, value);
        if settable {
            std::env::set_var(key, value);
        }
        settable
    }
}

/// In-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Environment for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let settable = is_settable(key, value);
        if settable {
            self.vars.insert(key.to_string(), value.to_string());
        }
        settable
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
