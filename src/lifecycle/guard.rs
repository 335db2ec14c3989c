//! Exactly-once asynchronous initialization.
//!
//! # State Transitions
//! ```text
//! Uninitialized → InFlight → Initialized
//! InFlight → Uninitialized   (initialization failed; next caller retries)
//! ```
//!
//! Callers that arrive while an initialization is in flight wait for it
//! and receive its outcome, success or failure. Only a call made after a
//! failed attempt has finished starts a new one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, OnceCell};

use crate::error::InitError;

/// Caches the outcome of the first successful initialization.
#[derive(Debug)]
pub struct LifecycleGuard<T = (), E = InitError> {
    component: &'static str,
    cell: OnceCell<T>,
    /// Held for the duration of an attempt; holds the last failure.
    in_flight: Mutex<Option<E>>,
    failed_attempts: AtomicU64,
}

impl<T, E: Clone> LifecycleGuard<T, E> {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            cell: OnceCell::new(),
            in_flight: Mutex::new(None),
            failed_attempts: AtomicU64::new(0),
        }
    }

    /// Run `init` unless a previous call already succeeded.
    ///
    /// Every successful call returns the value produced by the one
    /// initialization that actually ran.
    pub async fn run<F, Fut>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.cell.get() {
            tracing::trace!(component = self.component, "Already initialized");
            return Ok(value);
        }

        let seen = self.failed_attempts.load(Ordering::Acquire);
        let mut last_failure = self.in_flight.lock().await;

        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        // An attempt we waited on failed while we queued.
        if self.failed_attempts.load(Ordering::Acquire) != seen {
            if let Some(err) = last_failure.as_ref() {
                tracing::debug!(component = self.component, "Joined a failed initialization");
                return Err(err.clone());
            }
        }

        match init().await {
            Ok(value) => {
                *last_failure = None;
                Ok(self.cell.get_or_init(|| async move { value }).await)
            }
            Err(err) => {
                *last_failure = Some(err.clone());
                self.failed_attempts.fetch_add(1, Ordering::Release);
                tracing::debug!(component = self.component, "Initialization failed");
                Err(err)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
