//! Core types for the circatest pipeline
//!
//! This module defines the data structures that flow through the shuffle-test
//! pipeline: shuffle configuration, resultant vectors, the null distribution,
//! and the final test result.

use crate::error::CircadianError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Within-day shuffling strategy
///
/// `Complete` destroys all within-day ordering; `Circshift` rotates each
/// day's values by a random offset, preserving within-day adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleMode {
    Complete,
    Circshift,
}

impl ShuffleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShuffleMode::Complete => "complete",
            ShuffleMode::Circshift => "circshift",
        }
    }
}

impl FromStr for ShuffleMode {
    type Err = CircadianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(ShuffleMode::Complete),
            "circshift" => Ok(ShuffleMode::Circshift),
            other => Err(CircadianError::InvalidMode(other.to_string())),
        }
    }
}

/// Summary statistic used to detrend each day before shuffling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetrendStat {
    Mean,
    Median,
}

impl DetrendStat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetrendStat::Mean => "mean",
            DetrendStat::Median => "median",
        }
    }
}

impl FromStr for DetrendStat {
    type Err = CircadianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(DetrendStat::Mean),
            "median" => Ok(DetrendStat::Median),
            other => Err(CircadianError::InvalidStat(other.to_string())),
        }
    }
}

/// Effective configuration of a shuffle test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShuffleConfig {
    /// Number of shuffled resamples in the null distribution
    pub n_shuffles: usize,
    /// Within-day shuffling strategy
    pub mode: ShuffleMode,
    /// Whether day-to-day scale was removed before shuffling
    pub detrend: bool,
    /// Statistic used for detrending (ignored unless `detrend`)
    pub stat: DetrendStat,
    /// Seed of the random stream, when one was fixed
    pub seed: Option<u64>,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            n_shuffles: 1000,
            mode: ShuffleMode::Complete,
            detrend: false,
            stat: DetrendStat::Mean,
            seed: None,
        }
    }
}

/// Resultant vector of observations placed on the 24-hour circle
///
/// `length` reflects circadian concentration (0 = uniform, larger = more
/// clustered); `direction` is the mean angle in (-pi, pi], where 0 is
/// midnight and pi is noon. Both are NaN for degenerate (empty or
/// zero-weight) input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResultantVector {
    /// Normalized vector length
    pub length: f64,
    /// Mean angle (radians)
    pub direction: f64,
}

impl ResultantVector {
    /// Peak time of day implied by the direction, in hours [0, 24)
    pub fn peak_hour(&self) -> f64 {
        let hours = self.direction / std::f64::consts::TAU * 24.0;
        hours.rem_euclid(24.0)
    }
}

/// Null distribution built from shuffled resamples
///
/// Both sequences are exactly `n_shuffles` long and ordered by shuffle
/// index. The distribution is immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleDistribution {
    /// Resultant vector length per shuffle
    pub lengths: Vec<f64>,
    /// Resultant vector direction per shuffle (radians)
    pub directions: Vec<f64>,
}

impl ShuffleDistribution {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            lengths: Vec::with_capacity(n),
            directions: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, vector: ResultantVector) {
        self.lengths.push(vector.length);
        self.directions.push(vector.direction);
    }

    /// Number of shuffled resamples in the distribution
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Outcome of a shuffle test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShuffleTestResult {
    /// Resultant vector of the original (unshuffled) data
    pub real: ResultantVector,
    /// Null distribution from shuffled resamples
    pub distribution: ShuffleDistribution,
    /// Fraction of shuffled lengths strictly greater than the real length
    pub p_value: f64,
    /// Configuration the test was run with
    pub config: ShuffleConfig,
}

impl ShuffleTestResult {
    /// Load a test result from JSON
    pub fn from_json(json: &str) -> Result<Self, CircadianError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the test result to JSON
    pub fn to_json(&self) -> Result<String, CircadianError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_round_trip() {
        assert_eq!("complete".parse::<ShuffleMode>().unwrap(), ShuffleMode::Complete);
        assert_eq!("circshift".parse::<ShuffleMode>().unwrap(), ShuffleMode::Circshift);
        assert_eq!(ShuffleMode::Circshift.as_str(), "circshift");
    }

    #[test]
    fn test_invalid_mode_and_stat() {
        let err = "shuffled".parse::<ShuffleMode>().unwrap_err();
        assert!(matches!(err, CircadianError::InvalidMode(_)));

        let err = "mode".parse::<DetrendStat>().unwrap_err();
        assert!(matches!(err, CircadianError::InvalidStat(_)));
    }

    #[test]
    fn test_peak_hour() {
        let noon = ResultantVector {
            length: 1.0,
            direction: std::f64::consts::PI,
        };
        assert!((noon.peak_hour() - 12.0).abs() < 1e-9);

        // Small negative angle wraps to just before midnight
        let late = ResultantVector {
            length: 1.0,
            direction: -std::f64::consts::TAU / 24.0,
        };
        assert!((late.peak_hour() - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_result_serialization() {
        let result = ShuffleTestResult {
            real: ResultantVector {
                length: 0.42,
                direction: 1.1,
            },
            distribution: ShuffleDistribution {
                lengths: vec![0.1, 0.2],
                directions: vec![0.5, -0.5],
            },
            p_value: 0.0,
            config: ShuffleConfig::default(),
        };

        let json = result.to_json().unwrap();
        let loaded = ShuffleTestResult::from_json(&json).unwrap();

        assert_eq!(loaded.distribution.lengths, result.distribution.lengths);
        assert_eq!(loaded.config.n_shuffles, 1000);
        assert_eq!(loaded.config.mode, ShuffleMode::Complete);
    }
}
