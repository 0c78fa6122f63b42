//! Runtime lifecycle
//!
//! One [`Runtime`] per process. It starts the interpreter at most once,
//! however many entry points race to use it, and hands out [`AccessToken`]s
//! that register the calling thread for the length of one invocation.
//!
//! Finalizing is one-shot: a finalized runtime rejects every further
//! initialization or access attempt. Restart is not supported.

use crate::error::{BackendError, LifecycleError};
use crate::paths::SearchPath;
use once_cell::sync::OnceCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Hooks the lifecycle needs from an embedded interpreter.
pub trait RuntimeBackend: Send + Sync {
    /// Per-thread registration returned by [`attach`](Self::attach).
    type Registration;

    /// Register native modules, start the interpreter with `search_path`
    /// (default path when `None`) and release it from the initializing
    /// thread. Called at most once per process.
    fn initialize(&self, search_path: Option<&SearchPath>) -> Result<(), BackendError>;

    /// Register the current thread as the interpreter user. May block.
    fn attach(&self) -> Self::Registration;

    fn detach(&self, registration: Self::Registration);

    /// Tear the interpreter down. Returns 0 on success.
    fn finalize(&self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Initialized,
    Finalized,
}

pub struct Runtime<B: RuntimeBackend> {
    backend: B,
    init: OnceCell<Result<(), String>>,
    finalized: AtomicBool,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl<B: RuntimeBackend> Runtime<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            init: OnceCell::new(),
            finalized: AtomicBool::new(false),
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> RuntimeState {
        if self.finalized.load(Ordering::Acquire) {
            return RuntimeState::Finalized;
        }
        match self.init.get() {
            Some(Ok(())) => RuntimeState::Initialized,
            _ => RuntimeState::Uninitialized,
        }
    }

    /// Initialize the interpreter unless some invocation already did.
    ///
    /// Concurrent first callers block until the winner finishes; all of
    /// them observe the same outcome. A failed initialization is not retried.
    pub fn ensure_initialized(
        &self,
        search_path: Option<&SearchPath>,
    ) -> Result<(), LifecycleError> {
        if self.finalized.load(Ordering::Acquire) {
            return Err(LifecycleError::Finalized);
        }

        let outcome = self.init.get_or_init(|| {
            tracing::info!("Preparing to initialize python");
            let result = self.backend.initialize(search_path).map_err(|err| err.to_string());
            match &result {
                Ok(()) => tracing::info!("Initialized python"),
                Err(err) => tracing::error!(%err, "python initialization failed"),
            }
            result
        });

        outcome.clone().map_err(LifecycleError::InitFailed)
    }

    /// Register the calling thread. The registration lasts until the
    /// returned token is dropped.
    pub fn acquire_access(&self) -> Result<AccessToken<'_, B>, LifecycleError> {
        match self.state() {
            RuntimeState::Initialized => {}
            RuntimeState::Uninitialized => return Err(LifecycleError::NotInitialized),
            RuntimeState::Finalized => return Err(LifecycleError::Finalized),
        }

        tracing::info!("Attempting to register against the Global Interpreter Lock");
        let registration = self.backend.attach();
        self.acquired.fetch_add(1, Ordering::AcqRel);
        tracing::info!("Registered against the Global Interpreter Lock");

        Ok(AccessToken {
            runtime: self,
            registration: Some(registration),
            _thread_bound: PhantomData,
        })
    }

    /// Tear the runtime down for good.
    ///
    /// Only the worker teardown path calls this, after its invocation has
    /// returned. Finalizing while another thread holds a token is undefined.
    /// Returns the backend's code, or 0 when there was nothing to tear down.
    pub fn finalize(&self) -> i32 {
        if self.finalized.swap(true, Ordering::AcqRel) {
            tracing::warn!("runtime already finalized");
            return 0;
        }
        match self.init.get() {
            Some(Ok(())) => {
                let code = self.backend.finalize();
                tracing::info!(code, "Finalized python");
                code
            }
            _ => 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Tokens currently held.
    pub fn live_tokens(&self) -> u64 {
        // Every release is counted after its acquire, so reading the
        // released side first never sees more releases than acquires
        let released = self.released_total();
        let acquired = self.acquired_total();
        acquired.saturating_sub(released)
    }

    pub fn acquired_total(&self) -> u64 {
        self.acquired.load(Ordering::Acquire)
    }

    pub fn released_total(&self) -> u64 {
        self.released.load(Ordering::Acquire)
    }
}

/// Scoped registration against the runtime.
///
/// Every interpreter call of an invocation goes through
/// [`interpreter`](Self::interpreter). Dropping the token releases the
/// registration, so early returns cannot leak it. Not `Send`: the
/// registration belongs to the thread that acquired it.
pub struct AccessToken<'rt, B: RuntimeBackend> {
    runtime: &'rt Runtime<B>,
    registration: Option<B::Registration>,
    _thread_bound: PhantomData<*const ()>,
}

impl<'rt, B: RuntimeBackend> AccessToken<'rt, B> {
    pub fn interpreter(&self) -> &'rt B {
        &self.runtime.backend
    }

    pub fn release(self) {
        drop(self);
    }
}

impl<B: RuntimeBackend> Drop for AccessToken<'_, B> {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            tracing::info!("Attempting to release Global Interpreter Lock");
            self.runtime.backend.detach(registration);
            self.runtime.released.fetch_add(1, Ordering::AcqRel);
            tracing::info!("Released Global Interpreter Lock");
        }
    }
}
