use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

/// Circuit breaker guarding the advisory upstream.
///
/// Closed counts consecutive failures; at `fail_max` it opens and rejects
/// calls without touching the network. After `reset_timeout` a single probe
/// is let through: success closes the circuit, failure re-opens it. A probe
/// whose outcome is never reported (the caller was cancelled mid-flight)
/// re-opens the circuit on drop so a later probe can still run.
pub struct CircuitBreaker {
    fail_max: u32,
    reset_timeout: Duration,
    state: Mutex<State>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Closed { failures: u32 },
    Open { since: Instant },
    /// A single probe is in flight; everyone else is rejected.
    HalfOpen,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("circuit breaker is open")]
pub struct BreakerOpen;

/// Permission for one guarded call. The caller must report the outcome via
/// [`CallPermit::record_success`] or [`CallPermit::record_failure`]; a
/// half-open probe permit dropped without an outcome re-opens the circuit.
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    resolved: bool,
}

impl CircuitBreaker {
    pub fn new(fail_max: u32, reset_timeout: Duration) -> Self {
        Self {
            fail_max: fail_max.max(1),
            reset_timeout,
            state: Mutex::new(State::Closed { failures: 0 }),
        }
    }

    /// Asks whether a call may proceed. In half-open state only one probe is
    /// admitted at a time.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, BreakerOpen> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match *state {
            State::Closed { .. } => Ok(CallPermit {
                breaker: self,
                probe: false,
                resolved: false,
            }),
            State::Open { since } => {
                if since.elapsed() >= self.reset_timeout {
                    info!("circuit breaker half-open, admitting probe");
                    *state = State::HalfOpen;
                    Ok(CallPermit {
                        breaker: self,
                        probe: true,
                        resolved: false,
                    })
                } else {
                    Err(BreakerOpen)
                }
            }
            State::HalfOpen => Err(BreakerOpen),
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            State::Closed { .. } => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen => BreakerState::HalfOpen,
        }
    }

    fn on_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !matches!(*state, State::Closed { failures: 0 }) {
            info!("circuit breaker closed");
        }
        *state = State::Closed { failures: 0 };
    }

    fn on_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = match *state {
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.fail_max {
                    warn!(failures, "circuit breaker opened");
                    State::Open {
                        since: Instant::now(),
                    }
                } else {
                    State::Closed { failures }
                }
            }
            State::HalfOpen => {
                warn!("probe failed, circuit breaker re-opened");
                State::Open {
                    since: Instant::now(),
                }
            }
            open @ State::Open { .. } => open,
        };
    }

    fn on_probe_abandoned(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(*state, State::HalfOpen) {
            warn!("probe abandoned without an outcome, circuit breaker re-opened");
            *state = State::Open {
                since: Instant::now(),
            };
        }
    }
}

impl CallPermit<'_> {
    pub fn record_success(mut self) {
        self.resolved = true;
        self.breaker.on_success();
    }

    pub fn record_failure(mut self) {
        self.resolved = true;
        self.breaker.on_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.resolved {
            self.breaker.on_probe_abandoned();
        }
    }
}
