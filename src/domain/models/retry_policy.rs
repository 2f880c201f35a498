//! Bounded retry policies.
//!
//! Every wait-and-poll loop in the controller runs under one of these, and
//! running out of attempts is reported as [`RetryOutcome::Exhausted`] rather
//! than falling through silently.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait before attempt `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DelayStrategy {
    /// Same delay every attempt.
    Fixed { delay_ms: u64 },
    /// `initial + step * attempt`, capped at `max`.
    Linear { initial_ms: u64, step_ms: u64, max_ms: u64 },
}

impl DelayStrategy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Linear { initial_ms, step_ms, max_ms } => {
                let grown = initial_ms.saturating_add(step_ms.saturating_mul(u64::from(attempt)));
                Duration::from_millis(grown.min(max_ms))
            }
        }
    }
}

/// Maximum attempts plus the delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: DelayStrategy,
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: DelayStrategy::Fixed { delay_ms },
        }
    }

    pub const fn linear(max_attempts: u32, initial_ms: u64, step_ms: u64, max_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: DelayStrategy::Linear { initial_ms, step_ms, max_ms },
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.delay_for(attempt)
    }

    /// Whether `attempts` already used up the budget.
    pub const fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

/// Result of running something under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum RetryOutcome<T> {
    /// The awaited condition held before the budget ran out.
    Settled(T),
    /// The budget ran out; `T` is the last observed value.
    Exhausted(T),
}

impl<T> RetryOutcome<T> {
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Settled(value) | Self::Exhausted(value) => value,
        }
    }
}
