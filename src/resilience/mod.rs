//! Circuit-breaker resilience state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

/// Circuit breaker state.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
pub enum BreakerState {
    /// Normal processing.
    Closed,
    /// Processing refused.
    Open,
    /// Trial state after an Open period.
    #[serde(rename = "Half-Open")]
    #[strum(serialize = "Half-Open")]
    HalfOpen,
}

/// Per-session resilience record.
///
/// `gate_pass_rate` and `avg_latency_ms` are reporting-only gauges; the
/// transition logic reads none of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResilienceStats {
    pub breaker: BreakerState,
    pub consecutive_failures: u32,
    pub retry_count: u64,
    pub gate_pass_rate: f64,
    pub avg_latency_ms: f64,
    pub last_failure: Option<DateTime<Utc>>,
}

impl Default for ResilienceStats {
    fn default() -> Self {
        Self {
            breaker: BreakerState::Closed,
            consecutive_failures: 0,
            retry_count: 0,
            gate_pass_rate: 98.5,
            avg_latency_ms: 24.0,
            last_failure: None,
        }
    }
}

/// One observed breaker transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerTransition {
    pub from: BreakerState,
    pub to: BreakerState,
}

impl BreakerTransition {
    /// The breaker opened on this evaluation.
    pub fn opened(&self) -> bool {
        self.from != BreakerState::Open && self.to == BreakerState::Open
    }

    /// The breaker fully recovered (HalfOpen back to Closed).
    pub fn recovered(&self) -> bool {
        self.from == BreakerState::HalfOpen && self.to == BreakerState::Closed
    }
}

/// The circuit breaker driven by one failure signal per processed message.
///
/// Recovery from Open takes two consecutive clean evaluations: the first
/// moves to HalfOpen, the second back to Closed.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    stats: ResilienceStats,
    threshold: u32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            stats: ResilienceStats::default(),
            threshold,
        }
    }

    pub fn stats(&self) -> &ResilienceStats {
        &self.stats
    }

    pub fn state(&self) -> BreakerState {
        self.stats.breaker
    }

    /// Advance the state machine with one failure observation.
    pub fn observe(&mut self, failure: bool) -> BreakerTransition {
        let from = self.stats.breaker;
        let to = if failure {
            match from {
                BreakerState::Closed => {
                    self.record_failure();
                    if self.stats.consecutive_failures >= self.threshold {
                        BreakerState::Open
                    } else {
                        BreakerState::Closed
                    }
                }
                // Already open: no further counting while refusing traffic.
                BreakerState::Open => BreakerState::Open,
                BreakerState::HalfOpen => {
                    self.record_failure();
                    BreakerState::Open
                }
            }
        } else {
            match from {
                BreakerState::Closed => {
                    self.stats.consecutive_failures = 0;
                    BreakerState::Closed
                }
                BreakerState::Open => BreakerState::HalfOpen,
                BreakerState::HalfOpen => {
                    self.stats.consecutive_failures = 0;
                    BreakerState::Closed
                }
            }
        };
        self.stats.breaker = to;
        let transition = BreakerTransition { from, to };
        if transition.opened() {
            warn!(
                failures = self.stats.consecutive_failures,
                "circuit breaker opened"
            );
        }
        transition
    }

    fn record_failure(&mut self) {
        self.stats.consecutive_failures += 1;
        self.stats.retry_count += 1;
        self.stats.last_failure = Some(Utc::now());
    }
}

/// Source of the per-message failure signal.
///
/// Stands in for a judgment about an external dependency's health. Injected
/// so the breaker can be driven deterministically in tests.
pub trait FailureSource: Send {
    fn sample(&mut self) -> bool;
}

/// Simulated gate failures at a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomFailureSource {
    rate: f64,
}

impl RandomFailureSource {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl FailureSource for RandomFailureSource {
    fn sample(&mut self) -> bool {
        use rand::Rng;
        rand::rng().random_bool(self.rate.clamp(0.0, 1.0))
    }
}

/// Replays a fixed sequence of signals, then reports success forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFailureSource {
    script: std::collections::VecDeque<bool>,
}

impl ScriptedFailureSource {
    pub fn new(signals: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: signals.into_iter().collect(),
        }
    }
}

impl FailureSource for ScriptedFailureSource {
    fn sample(&mut self) -> bool {
        self.script.pop_front().unwrap_or(false)
    }
}
