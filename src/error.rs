//! Error types for circatest

use thiserror::Error;

/// Errors that can occur while configuring or running a shuffle test
#[derive(Debug, Error)]
pub enum CircadianError {
    #[error("Timestamp/value length mismatch: {timestamps} timestamps vs {values} values")]
    ShapeMismatch { timestamps: usize, values: usize },

    #[error("Number of shuffles must be positive, got {0}")]
    InvalidShuffleCount(usize),

    #[error("Unrecognized shuffle mode: {0} (expected \"complete\" or \"circshift\")")]
    InvalidMode(String),

    #[error("Unrecognized detrend statistic: {0} (expected \"mean\" or \"median\")")]
    InvalidStat(String),

    #[error("Shuffle test cancelled after {completed} of {requested} shuffles")]
    Cancelled { completed: usize, requested: usize },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
