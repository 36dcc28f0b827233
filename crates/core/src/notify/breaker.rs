//! Circuit breaker state machine for the notification transport.

use std::time::{Duration, Instant};

/// Breaker states. Closed counts consecutive failures; Open rejects until a
/// cooldown elapses; HalfOpen lets exactly one probe through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen,
}

/// Failure-counting circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: State,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    /// Creates a closed breaker that opens after `failure_threshold`
    /// consecutive failures and stays open for `cooldown`.
    #[must_use]
    pub const fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: State::Closed { failures: 0 },
            failure_threshold: if failure_threshold == 0 {
                1
            } else {
                failure_threshold
            },
            cooldown,
        }
    }

    /// Whether a delivery attempt may proceed right now.
    ///
    /// An open breaker whose cooldown has elapsed transitions to half-open
    /// and admits the caller as the single probe.
    pub fn allow(&mut self, now: Instant) -> bool {
        match self.state {
            State::Closed { .. } => true,
            State::Open { until } if now >= until => {
                self.state = State::HalfOpen;
                true
            }
            State::Open { .. } | State::HalfOpen => false,
        }
    }

    /// Records a successful delivery, closing the breaker.
    pub fn record_success(&mut self) {
        self.state = State::Closed { failures: 0 };
    }

    /// Records a failed delivery (after all retries were exhausted).
    pub fn record_failure(&mut self, now: Instant) {
        self.state = match self.state {
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.failure_threshold {
                    State::Open {
                        until: now + self.cooldown,
                    }
                } else {
                    State::Closed { failures }
                }
            }
            // A failed probe re-opens for a full cooldown.
            State::HalfOpen | State::Open { .. } => State::Open {
                until: now + self.cooldown,
            },
        };
    }

    /// True if the breaker currently rejects deliveries.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }
}
