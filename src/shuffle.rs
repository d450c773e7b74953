//! Within-day shuffling
//!
//! Produces one randomized variant of the observation sequence per call.
//! Values are only rearranged within their own day-bucket, so the day-level
//! structure of the data survives while the time-of-day structure is
//! randomized. Optional detrending removes day-to-day scale differences
//! before shuffling.

use crate::buckets::day_buckets;
use crate::error::CircadianError;
use crate::types::{DetrendStat, ShuffleMode};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Produce one within-day shuffled copy of `values`.
///
/// The timestamp sequence is untouched; the returned sequence is aligned to
/// it index-for-index. With `ShuffleMode::Complete` each day's values are
/// independently permuted uniformly at random; with `ShuffleMode::Circshift`
/// each day's values are rotated by one uniformly random offset, preserving
/// within-day adjacency.
///
/// When `detrend` is set, each day's values are first divided by that day's
/// mean or median (per `stat`). A day whose statistic is zero or non-finite
/// is left undivided.
///
/// # Errors
/// Returns [`CircadianError::ShapeMismatch`] when the sequences differ in
/// length.
pub fn within_day_shuffle<R: Rng>(
    timestamps: &[DateTime<Utc>],
    values: &[f64],
    mode: ShuffleMode,
    detrend: bool,
    stat: DetrendStat,
    rng: &mut R,
) -> Result<Vec<f64>, CircadianError> {
    if timestamps.len() != values.len() {
        return Err(CircadianError::ShapeMismatch {
            timestamps: timestamps.len(),
            values: values.len(),
        });
    }

    let buckets = day_buckets(timestamps);
    let mut shuffled = values.to_vec();

    for bucket in &buckets {
        let mut day_values: Vec<f64> = bucket.indices.iter().map(|&i| values[i]).collect();

        if detrend {
            detrend_bucket(&mut day_values, stat);
        }

        match mode {
            ShuffleMode::Complete => day_values.shuffle(rng),
            ShuffleMode::Circshift => {
                // Buckets are never empty: each one was created for at least
                // one observation
                let shift = rng.gen_range(0..day_values.len());
                day_values.rotate_right(shift);
            }
        }

        for (&index, &value) in bucket.indices.iter().zip(day_values.iter()) {
            shuffled[index] = value;
        }
    }

    Ok(shuffled)
}

/// Detrend the values of every day-bucket in place, without shuffling.
///
/// Exposed for callers that want the normalized sequence itself rather than
/// a shuffled resample.
pub fn detrend_by_day(
    timestamps: &[DateTime<Utc>],
    values: &[f64],
    stat: DetrendStat,
) -> Result<Vec<f64>, CircadianError> {
    if timestamps.len() != values.len() {
        return Err(CircadianError::ShapeMismatch {
            timestamps: timestamps.len(),
            values: values.len(),
        });
    }

    let mut detrended = values.to_vec();
    for bucket in &day_buckets(timestamps) {
        let mut day_values: Vec<f64> = bucket.indices.iter().map(|&i| values[i]).collect();
        detrend_bucket(&mut day_values, stat);
        for (&index, &value) in bucket.indices.iter().zip(day_values.iter()) {
            detrended[index] = value;
        }
    }

    Ok(detrended)
}

fn detrend_bucket(day_values: &mut [f64], stat: DetrendStat) {
    let statistic = match stat {
        DetrendStat::Mean => mean(day_values),
        DetrendStat::Median => median(day_values),
    };

    // A zero or non-finite statistic would wipe out or corrupt the bucket;
    // leave such days unscaled
    if statistic == 0.0 || !statistic.is_finite() {
        return;
    }

    for value in day_values.iter_mut() {
        *value /= statistic;
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
