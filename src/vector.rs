//! Circular vector calculation
//!
//! Maps each timestamp to an angle on the 24-hour circle and computes the
//! weighted circular mean of the observations. The resultant length measures
//! how concentrated the observations are around one time of day; the
//! direction points at that time of day.

use crate::error::CircadianError;
use crate::types::ResultantVector;
use chrono::{DateTime, Timelike, Utc};
use std::f64::consts::TAU;

/// Seconds in one circadian cycle
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Angle of a timestamp on the 24-hour circle, in radians [0, 2*pi)
///
/// Midnight maps to 0, noon to pi. Only the time of day matters; the
/// calendar date is discarded, so timestamps exactly 24 hours apart map to
/// the same angle.
pub fn circadian_angle(timestamp: &DateTime<Utc>) -> f64 {
    let seconds = f64::from(timestamp.num_seconds_from_midnight())
        + f64::from(timestamp.nanosecond()) * 1e-9;
    TAU * (seconds / SECONDS_PER_DAY)
}

/// Compute the weighted circular mean of observations on the 24-hour circle.
///
/// With `weights = None` every observation counts equally (unit weights).
/// The resultant length is normalized by the sum of absolute weights, so it
/// falls in [0, 1] for non-negative weights and is directly comparable
/// between the original data and any reshuffling of the same values.
///
/// # Errors
/// Returns [`CircadianError::ShapeMismatch`] when a weight sequence of a
/// different length than the timestamps is supplied.
///
/// # Degenerate input
/// Empty input (or weights summing to zero in absolute value) yields
/// `length = NaN, direction = NaN` rather than an error; callers compare
/// lengths with `>` so NaN never counts as an exceedance.
pub fn circadian_vector(
    timestamps: &[DateTime<Utc>],
    weights: Option<&[f64]>,
) -> Result<ResultantVector, CircadianError> {
    if let Some(w) = weights {
        if w.len() != timestamps.len() {
            return Err(CircadianError::ShapeMismatch {
                timestamps: timestamps.len(),
                values: w.len(),
            });
        }
    }

    let mut cos_sum = 0.0;
    let mut sin_sum = 0.0;
    let mut weight_sum = 0.0;

    for (i, ts) in timestamps.iter().enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        let theta = circadian_angle(ts);
        cos_sum += w * theta.cos();
        sin_sum += w * theta.sin();
        weight_sum += w.abs();
    }

    // Empty input or all-zero weights carry no direction at all;
    // atan2(0, 0) would report 0 (midnight), so force NaN explicitly
    if weight_sum == 0.0 {
        return Ok(ResultantVector {
            length: f64::NAN,
            direction: f64::NAN,
        });
    }

    Ok(ResultantVector {
        length: cos_sum.hypot(sin_sum) / weight_sum,
        direction: sin_sum.atan2(cos_sum),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::f64::consts::PI;

    fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    /// 24 hourly samples per day over `days` days
    fn hourly_timestamps(days: u32) -> Vec<DateTime<Utc>> {
        (1..=days)
            .flat_map(|d| (0..24).map(move |h| ts(d, h, 0)))
            .collect()
    }

    #[test]
    fn test_angle_landmarks() {
        assert!((circadian_angle(&ts(1, 0, 0)) - 0.0).abs() < 1e-12);
        assert!((circadian_angle(&ts(1, 6, 0)) - PI / 2.0).abs() < 1e-12);
        assert!((circadian_angle(&ts(1, 12, 0)) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_angle_invariant_to_full_day_rotation() {
        let base = ts(5, 9, 30);
        let shifted = base + Duration::hours(24);
        assert!((circadian_angle(&base) - circadian_angle(&shifted)).abs() < 1e-12);
    }

    #[test]
    fn test_midnight_wrap_is_close() {
        // 23:59 and 00:01 are 2 minutes apart on the circle, not 24 hours
        let a = circadian_angle(&ts(1, 23, 59));
        let b = circadian_angle(&ts(2, 0, 1));
        let diff = (a - b).rem_euclid(TAU);
        let circular_dist = diff.min(TAU - diff);
        let two_minutes = TAU * 120.0 / 86_400.0;
        assert!((circular_dist - two_minutes).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_data_has_near_zero_length() {
        let timestamps = hourly_timestamps(3);
        let vector = circadian_vector(&timestamps, None).unwrap();
        // 24 evenly spaced unit vectors cancel exactly (up to rounding)
        assert!(vector.length < 1e-10);
    }

    #[test]
    fn test_concentrated_data_points_at_peak() {
        let timestamps = hourly_timestamps(3);
        let weights: Vec<f64> = timestamps
            .iter()
            .map(|t| if t.hour() == 12 { 10.0 } else { 0.0 })
            .collect();

        let vector = circadian_vector(&timestamps, Some(weights.as_slice())).unwrap();
        assert!((vector.length - 1.0).abs() < 1e-10);
        assert!((vector.direction - PI).abs() < 1e-10);
        assert!((vector.peak_hour() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_weights_match_explicit_ones() {
        let timestamps = vec![ts(1, 3, 0), ts(1, 9, 15), ts(2, 21, 40)];
        let ones = vec![1.0; timestamps.len()];

        let unweighted = circadian_vector(&timestamps, None).unwrap();
        let weighted = circadian_vector(&timestamps, Some(ones.as_slice())).unwrap();

        assert!((unweighted.length - weighted.length).abs() < 1e-12);
        assert!((unweighted.direction - weighted.direction).abs() < 1e-12);
    }

    #[test]
    fn test_length_bounded_for_nonnegative_weights() {
        let timestamps = hourly_timestamps(2);
        let weights: Vec<f64> = (0..timestamps.len()).map(|i| (i % 5) as f64).collect();

        let vector = circadian_vector(&timestamps, Some(weights.as_slice())).unwrap();
        assert!(vector.length >= 0.0);
        assert!(vector.length <= 1.0 + 1e-12);
        assert!(vector.direction > -PI && vector.direction <= PI);
    }

    #[test]
    fn test_shape_mismatch() {
        let timestamps = vec![ts(1, 8, 0), ts(1, 9, 0)];
        let err = circadian_vector(&timestamps, Some(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            CircadianError::ShapeMismatch {
                timestamps: 2,
                values: 1
            }
        ));
    }

    #[test]
    fn test_empty_input_is_nan_not_error() {
        let vector = circadian_vector(&[], None).unwrap();
        assert!(vector.length.is_nan());
        assert!(vector.direction.is_nan());
    }

    #[test]
    fn test_zero_weights_are_nan() {
        let timestamps = vec![ts(1, 8, 0), ts(1, 20, 0)];
        let vector = circadian_vector(&timestamps, Some(&[0.0, 0.0])).unwrap();
        assert!(vector.length.is_nan());
        assert!(vector.direction.is_nan());
    }
}
