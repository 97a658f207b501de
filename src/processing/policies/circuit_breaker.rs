//! Consecutive-failure circuit breaker.
//!
//! Fails calls fast once a backend has produced `failure_threshold` qualifying failures in a row.
//! After `open_duration` a single trial call is let through; its outcome closes the breaker or
//! opens it for another full duration. A trial dropped before it finishes hands its slot to the
//! next caller. Every check-and-transition happens under one lock, never held across an await.
use crate::processing::core::errors::QueryError;
use crate::processing::policies::predicate::FailurePredicate;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

/// How a call got past the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Normal,
    Trial,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    predicate: FailurePredicate,
    failure_threshold: u32,
    open_duration: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(predicate: FailurePredicate, failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            predicate,
            failure_threshold: failure_threshold.max(1),
            open_duration,
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn open_duration(&self) -> Duration {
        self.open_duration
    }

    pub fn predicate(&self) -> &FailurePredicate {
        &self.predicate
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Observed state. An open breaker whose duration has elapsed reports half-open.
    pub fn state(&self) -> CircuitState {
        match *self.lock() {
            BreakerState::Closed { .. } => CircuitState::Closed,
            BreakerState::Open { until } if Instant::now() >= until => CircuitState::HalfOpen,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Admits a call or rejects it. Returns `None` while open or while a trial is in flight.
    ///
    /// A caller admitted here must settle the call with `record_success`, `record_failure` or
    /// `release_trial`; [`CircuitBreaker::execute`] does so even when its future is dropped.
    pub fn try_acquire(&self) -> Option<Admission> {
        let mut state = self.lock();
        match *state {
            BreakerState::Closed { .. } => Some(Admission::Normal),
            BreakerState::Open { until } if Instant::now() >= until => {
                *state = BreakerState::HalfOpen {
                    trial_in_flight: true,
                };
                Some(Admission::Trial)
            }
            BreakerState::Open { .. } => None,
            BreakerState::HalfOpen {
                trial_in_flight: true,
            } => None,
            BreakerState::HalfOpen {
                trial_in_flight: false,
            } => {
                *state = BreakerState::HalfOpen {
                    trial_in_flight: true,
                };
                Some(Admission::Trial)
            }
        }
    }

    pub fn record_success(&self, admission: Admission) {
        let mut state = self.lock();
        match (*state, admission) {
            (BreakerState::Closed { .. }, _) => {
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
            }
            (BreakerState::HalfOpen { .. }, Admission::Trial) => {
                info!("circuit breaker closed after successful trial call");
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
            }
            _ => {}
        }
    }

    pub fn record_failure(&self, admission: Admission, error: &QueryError) {
        let mut state = self.lock();
        // A rejection from a breaker nested inside this one is not a backend failure.
        let rejected_downstream = matches!(error, QueryError::CircuitOpen { .. });
        if rejected_downstream || !self.predicate.qualifies(error) {
            if let (BreakerState::HalfOpen { .. }, Admission::Trial) = (*state, admission) {
                *state = BreakerState::HalfOpen {
                    trial_in_flight: false,
                };
            }
            return;
        }
        match (*state, admission) {
            (BreakerState::Closed {
                consecutive_failures,
            }, _) => {
                let failures = consecutive_failures + 1;
                if failures >= self.failure_threshold {
                    warn!(
                        "circuit breaker opened for {:?} after {} failures: {}",
                        self.open_duration, failures, error
                    );
                    *state = BreakerState::Open {
                        until: Instant::now() + self.open_duration,
                    };
                } else {
                    *state = BreakerState::Closed {
                        consecutive_failures: failures,
                    };
                }
            }
            (BreakerState::HalfOpen { .. }, Admission::Trial) => {
                warn!("circuit breaker reopened after failed trial call: {}", error);
                *state = BreakerState::Open {
                    until: Instant::now() + self.open_duration,
                };
            }
            _ => {}
        }
    }

    /// Gives up a trial without an outcome. The next caller becomes the trial.
    pub fn release_trial(&self) {
        let mut state = self.lock();
        if let BreakerState::HalfOpen {
            trial_in_flight: true,
        } = *state
        {
            debug!("circuit breaker trial call abandoned, admitting the next caller");
            *state = BreakerState::HalfOpen {
                trial_in_flight: false,
            };
        }
    }

    /// Runs `operation` under the breaker. `on_open` builds the rejection error.
    pub async fn execute<T, F, Fut, R>(&self, on_open: R, operation: F) -> Result<T, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
        R: FnOnce() -> QueryError,
    {
        let Some(admission) = self.try_acquire() else {
            return Err(on_open());
        };
        let call = AdmittedCall {
            breaker: self,
            admission,
            settled: false,
        };
        let result = operation().await;
        call.settle(&result);
        result
    }
}

/// An admitted call whose outcome is not recorded yet. Dropping it unsettled releases a trial.
struct AdmittedCall<'a> {
    breaker: &'a CircuitBreaker,
    admission: Admission,
    settled: bool,
}

impl AdmittedCall<'_> {
    fn settle<T>(mut self, result: &Result<T, QueryError>) {
        self.settled = true;
        match result {
            Ok(_) => self.breaker.record_success(self.admission),
            Err(error) => self.breaker.record_failure(self.admission, error),
        }
    }
}

impl Drop for AdmittedCall<'_> {
    fn drop(&mut self) {
        if !self.settled && self.admission == Admission::Trial {
            self.breaker.release_trial();
        }
    }
}
