//! Port acquisition with retry on busy ports.
//!
//! # State Transitions
//! ```text
//! Idle → Attempting(port)
//! Attempting(port) → Bound(addr)          bind succeeded
//! Attempting(port) → Retrying(port + 1)   address in use, auto-listen on, budget left
//! Attempting(port) → Failed               any other error, auto-listen off, or budget spent
//! Retrying(port)   → Attempting(port)
//! ```
//!
//! Attempts are strictly sequential: the next port is only tried once the
//! outcome of the current one is known.

use std::net::SocketAddr;

use crate::adapter::HttpAdapter;
use crate::error::{BindError, ListenError};
use crate::net::policy::AutoListenPolicy;
use crate::observability::metrics::{self, BindOutcomeLabel};
use crate::observability::Logger;

const CONTEXT: &str = "PortBinder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Idle,
    Attempting(u16),
    Retrying(u16),
    Bound(SocketAddr),
    Failed,
}

/// Outcome of one bind attempt, without the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    InUse,
    OtherError,
}

/// Record of one bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBindAttempt {
    pub candidate_port: u16,
    pub outcome: AttemptOutcome,
}

/// Drives an adapter's `listen` until a port is bound or binding fails.
pub struct PortBinder<'a> {
    adapter: &'a dyn HttpAdapter,
    logger: &'a dyn Logger,
    policy: AutoListenPolicy,
    host: Option<&'a str>,
    state: BindState,
    attempts: Vec<PortBindAttempt>,
}

impl<'a> PortBinder<'a> {
    pub fn new(adapter: &'a dyn HttpAdapter, logger: &'a dyn Logger, policy: AutoListenPolicy) -> Self {
        Self {
            adapter,
            logger,
            policy,
            host: None,
            state: BindState::Idle,
            attempts: Vec::new(),
        }
    }

    pub fn with_host(mut self, host: Option<&'a str>) -> Self {
        self.host = host;
        self
    }

    pub fn state(&self) -> BindState {
        self.state
    }

    pub fn attempts(&self) -> &[PortBindAttempt] {
        &self.attempts
    }

    /// Bind `requested`, moving to higher ports while they are busy and the
    /// policy allows it.
    pub async fn bind(&mut self, requested: u16) -> Result<SocketAddr, ListenError> {
        let mut port = requested;
        let mut busy = 0u32;
        self.state = BindState::Attempting(port);

        loop {
            let err = match self.attempt(port).await {
                Ok(addr) => {
                    self.state = BindState::Bound(addr);
                    return Ok(addr);
                }
                Err(err) if err.is_addr_in_use() => err,
                Err(err) => return Err(self.fail(err.into())),
            };

            if !self.policy.enabled {
                return Err(self.fail(err.into()));
            }

            busy += 1;
            let next = match port.checked_add(1) {
                Some(next) if busy < self.policy.max_attempts => next,
                _ => {
                    return Err(self.fail(ListenError::RetryExhausted {
                        first: requested,
                        last: port,
                        attempts: busy,
                    }))
                }
            };

            self.logger.log(
                CONTEXT,
                &format!("Port {port} is in use, trying port {next} instead"),
            );
            tracing::debug!(port, next_port = next, attempt = busy, "Retrying bind");

            self.state = BindState::Retrying(next);
            port = next;
            self.state = BindState::Attempting(port);
        }
    }

    async fn attempt(&mut self, port: u16) -> Result<SocketAddr, BindError> {
        let result = self.adapter.listen(port, self.host).await;
        let (outcome, label) = match &result {
            Ok(_) => (AttemptOutcome::Success, BindOutcomeLabel::Success),
            Err(e) if e.is_addr_in_use() => (AttemptOutcome::InUse, BindOutcomeLabel::InUse),
            Err(_) => (AttemptOutcome::OtherError, BindOutcomeLabel::Error),
        };
        metrics::record_bind_attempt(label);
        self.attempts.push(PortBindAttempt {
            candidate_port: port,
            outcome,
        });
        result
    }

    fn fail(&mut self, err: ListenError) -> ListenError {
        self.state = BindState::Failed;
        self.logger.error(CONTEXT, &err.to_string());
        err
    }
}
