//! # Backoff policy for restart delays.
//!
//! [`BackoffPolicy`] maps a child's restart count to the delay applied before
//! the next restart. The count passed in is the per-child slot counter (how
//! many times that slot was restarted before), never a supervisor-wide total.
//!
//! - [`BackoffPolicy::Constant`] fixed delay for every restart
//! - [`BackoffPolicy::Exponential`] delay doubles per restart, capped
//! - [`BackoffPolicy::Linear`] delay grows by a fixed increment, capped
//! - [`BackoffPolicy::Jitter`] wraps another policy and randomizes its output
//!
//! All policies are pure: the same count yields the same delay, except for
//! `Jitter` which samples independently on every call.

use std::time::Duration;

use rand::Rng;

/// Restart delay policy.
///
/// Constructed via [`constant`](BackoffPolicy::constant),
/// [`exponential`](BackoffPolicy::exponential),
/// [`linear`](BackoffPolicy::linear) or [`jitter`](BackoffPolicy::jitter).
#[derive(Clone, Debug)]
pub enum BackoffPolicy {
    /// The same delay for every restart.
    Constant {
        /// Delay applied before each restart.
        delay: Duration,
    },

    /// `initial * 2^restarts`, capped at `max`.
    Exponential {
        /// Delay before the first restart.
        initial: Duration,
        /// Upper bound for the computed delay.
        max: Duration,
    },

    /// `initial + restarts * increment`, capped at `max`.
    Linear {
        /// Delay before the first restart.
        initial: Duration,
        /// Added per prior restart.
        increment: Duration,
        /// Upper bound for the computed delay.
        max: Duration,
    },

    /// Randomizes the wrapped policy's delay by up to `factor` in either
    /// direction, clamped to non-negative.
    Jitter {
        /// Policy producing the base delay.
        base: Box<BackoffPolicy>,
        /// Jitter amplitude in `[0, 1]` (clamped at construction).
        factor: f64,
    },
}

impl Default for BackoffPolicy {
    /// Returns `Exponential(100ms, 5s)`.
    fn default() -> Self {
        BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(5))
    }
}

impl BackoffPolicy {
    /// Fixed delay between restarts.
    pub fn constant(delay: Duration) -> Self {
        BackoffPolicy::Constant { delay }
    }

    /// Doubling delay: `initial`, `2*initial`, `4*initial`, ... capped at `max`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        BackoffPolicy::Exponential { initial, max }
    }

    /// Linearly growing delay: `initial + restarts * increment`, capped at `max`.
    pub fn linear(initial: Duration, increment: Duration, max: Duration) -> Self {
        BackoffPolicy::Linear {
            initial,
            increment,
            max,
        }
    }

    /// Wraps `base` and spreads its delay over
    /// `[base * (1 - factor), base * (1 + factor)]`.
    ///
    /// `factor` is clamped to `[0.0, 1.0]`; non-finite values collapse to `0.0`.
    pub fn jitter(base: BackoffPolicy, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        BackoffPolicy::Jitter {
            base: Box::new(base),
            factor,
        }
    }

    /// Computes the delay before the next restart.
    ///
    /// `restarts` is the number of times the child's slot has already been
    /// restarted. Growth that overflows the duration range saturates at the
    /// policy's `max`.
    pub fn compute_delay(&self, restarts: u32) -> Duration {
        match self {
            BackoffPolicy::Constant { delay } => *delay,

            BackoffPolicy::Exponential { initial, max } => {
                let secs = initial.as_secs_f64() * 2f64.powf(f64::from(restarts));
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }

            BackoffPolicy::Linear {
                initial,
                increment,
                max,
            } => increment
                .checked_mul(restarts)
                .and_then(|grown| initial.checked_add(grown))
                .map_or(*max, |delay| delay.min(*max)),

            BackoffPolicy::Jitter { base, factor } => {
                let base_secs = base.compute_delay(restarts).as_secs_f64();
                let spread = base_secs * factor * rand::rng().random_range(-1.0..=1.0);
                Duration::from_secs_f64((base_secs + spread).max(0.0))
            }
        }
    }
}
