//! circatest - permutation-based significance testing for circadian patterns
//!
//! Given timestamped weighted observations, circatest maps each observation
//! onto the 24-hour circle, summarizes the data as a resultant vector
//! (concentration + peak time), and tests the vector length for
//! non-uniformity against a null distribution built by shuffling values
//! within each calendar day: day structure is preserved, time-of-day
//! structure is randomized.
//!
//! ## Modules
//!
//! - **vector**: circular vector calculation on the 24-hour circle
//! - **shuffle**: within-day shuffling (`complete` / `circshift`) and
//!   per-day detrending
//! - **pipeline**: the shuffle-test orchestrator and its builder API
//! - **buckets**: day-bucket partitioning shared by the above

pub mod buckets;
pub mod error;
pub mod pipeline;
pub mod shuffle;
pub mod types;
pub mod vector;

pub use error::CircadianError;
pub use pipeline::{shuffle_test, ShuffleTest};
pub use shuffle::{detrend_by_day, within_day_shuffle};
pub use types::{
    DetrendStat, ResultantVector, ShuffleConfig, ShuffleDistribution, ShuffleMode,
    ShuffleTestResult,
};
pub use vector::{circadian_angle, circadian_vector};

/// circatest version reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
