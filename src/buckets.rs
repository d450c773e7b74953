//! Day-bucket partitioning
//!
//! Groups observation indices by the calendar date of their timestamp.
//! Bucket membership is derived once from the timestamps and stays fixed for
//! the whole shuffle run; shuffling rearranges values within a bucket, never
//! across buckets.

use chrono::{DateTime, NaiveDate, Utc};

/// Indices of the observations falling on one calendar day
#[derive(Debug, Clone)]
pub struct DayBucket {
    /// Calendar date (UTC) shared by all observations in the bucket
    pub date: NaiveDate,
    /// Positions into the original timestamp/value sequences, input order
    pub indices: Vec<usize>,
}

/// Partition observation indices into day-buckets.
///
/// Buckets appear in order of first occurrence and preserve the input order
/// of their indices. Timestamps need not be sorted; out-of-order samples
/// still land in the bucket for their own date.
pub fn day_buckets(timestamps: &[DateTime<Utc>]) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();

    for (i, ts) in timestamps.iter().enumerate() {
        let date = ts.date_naive();
        match buckets.iter_mut().find(|b| b.date == date) {
            Some(bucket) => bucket.indices.push(i),
            None => buckets.push(DayBucket {
                date,
                indices: vec![i],
            }),
        }
    }

    buckets
}
