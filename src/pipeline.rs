//! Shuffle-test orchestration
//!
//! This module provides the public API for circatest. It drives the
//! within-day shuffler and the circular vector calculator `n_shuffles`
//! times to build a null distribution, then compares the real resultant
//! vector length against it to produce an empirical p-value.

use crate::error::CircadianError;
use crate::shuffle::within_day_shuffle;
use crate::types::{
    DetrendStat, ShuffleConfig, ShuffleDistribution, ShuffleMode, ShuffleTestResult,
};
use crate::vector::circadian_vector;
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress callback cadence (iterations)
const PROGRESS_INTERVAL: usize = 100;

/// Run a shuffle test with default settings.
///
/// Defaults: 1000 shuffles, `complete` mode, no detrending, entropy-seeded
/// randomness. Use [`ShuffleTest`] to configure any of these.
///
/// # Example
/// ```ignore
/// let result = shuffle_test(&timestamps, &activity_counts)?;
/// if result.p_value < 0.05 {
///     println!("circadian peak near hour {:.1}", result.real.peak_hour());
/// }
/// ```
pub fn shuffle_test(
    timestamps: &[DateTime<Utc>],
    values: &[f64],
) -> Result<ShuffleTestResult, CircadianError> {
    ShuffleTest::new().run(timestamps, values)
}

/// Configurable shuffle test.
///
/// Builds a null distribution by repeatedly shuffling observation values
/// within their day-buckets and recomputing the resultant vector, then
/// reports the fraction of shuffled vector lengths strictly exceeding the
/// real one.
pub struct ShuffleTest {
    config: ShuffleConfig,
    progress: Option<Box<dyn Fn(usize)>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for ShuffleTest {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleTest {
    /// Create a shuffle test with default settings
    pub fn new() -> Self {
        Self {
            config: ShuffleConfig::default(),
            progress: None,
            cancel: None,
        }
    }

    /// Set the number of shuffled resamples (default 1000)
    pub fn with_shuffles(mut self, n_shuffles: usize) -> Self {
        self.config.n_shuffles = n_shuffles;
        self
    }

    /// Set the within-day shuffling strategy (default `complete`)
    pub fn with_mode(mut self, mode: ShuffleMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Enable per-day detrending with the given statistic (default off)
    pub fn with_detrend(mut self, stat: DetrendStat) -> Self {
        self.config.detrend = true;
        self.config.stat = stat;
        self
    }

    /// Fix the random seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Install a progress callback, invoked with the number of completed
    /// shuffles every 100 iterations (default no-op)
    pub fn with_progress(mut self, callback: impl Fn(usize) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Install a cancellation token, checked once per iteration.
    ///
    /// When the token is set the run stops with
    /// [`CircadianError::Cancelled`]; no partial result is returned.
    pub fn with_cancel(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the test.
    ///
    /// Validation happens eagerly: a shape mismatch or a zero shuffle count
    /// fails before any shuffling is done. Given a fixed seed the result is
    /// fully deterministic.
    ///
    /// # Errors
    /// - [`CircadianError::ShapeMismatch`] when the sequences differ in length
    /// - [`CircadianError::InvalidShuffleCount`] when `n_shuffles` is 0
    /// - [`CircadianError::Cancelled`] when the cancellation token fires
    pub fn run(
        &self,
        timestamps: &[DateTime<Utc>],
        values: &[f64],
    ) -> Result<ShuffleTestResult, CircadianError> {
        if timestamps.len() != values.len() {
            return Err(CircadianError::ShapeMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        if self.config.n_shuffles == 0 {
            return Err(CircadianError::InvalidShuffleCount(0));
        }

        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut distribution = ShuffleDistribution::with_capacity(self.config.n_shuffles);

        for iteration in 1..=self.config.n_shuffles {
            if let Some(token) = &self.cancel {
                if token.load(Ordering::Relaxed) {
                    return Err(CircadianError::Cancelled {
                        completed: iteration - 1,
                        requested: self.config.n_shuffles,
                    });
                }
            }

            let shuffled = within_day_shuffle(
                timestamps,
                values,
                self.config.mode,
                self.config.detrend,
                self.config.stat,
                &mut rng,
            )?;
            distribution.push(circadian_vector(timestamps, Some(shuffled.as_slice()))?);

            if iteration % PROGRESS_INTERVAL == 0 {
                if let Some(callback) = &self.progress {
                    callback(iteration);
                }
            }
        }

        let real = circadian_vector(timestamps, Some(values))?;
        let p_value = empirical_p_value(&distribution.lengths, real.length);

        Ok(ShuffleTestResult {
            real,
            distribution,
            p_value,
            config: self.config,
        })
    }
}

/// Fraction of shuffled lengths strictly greater than the observed one.
///
/// A pure count, invariant to the order of the distribution. NaN entries
/// (and a NaN observed length) never compare as greater, so degenerate
/// vectors contribute nothing to the exceedance count.
fn empirical_p_value(shuffled_lengths: &[f64], real_length: f64) -> f64 {
    let exceedances = shuffled_lengths
        .iter()
        .filter(|&&length| length > real_length)
        .count();
    exceedances as f64 / shuffled_lengths.len() as f64
}
