//! Gap-filled day series for charting
//!
//! This module turns windowed records into a fixed-length, day-indexed
//! series so charting code never needs to guess the x-axis domain. Each
//! bucket holds the arithmetic mean of its day's values, or `None` when
//! the day is empty; consumers bridge gaps between adjacent non-null
//! buckets rather than showing broken lines.

use crate::types::{date_key, Bucket, Dated, RawAssessment, RawEntry};
use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which numeric field a series is built over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKey {
    /// Journal intensity, 0-10, one-decimal precision
    Intensity,
    /// Assessment score, 0-100, integer precision
    Score,
}

impl ValueKey {
    /// Round a mean to the field's natural precision
    fn round(&self, value: f64) -> f64 {
        match self {
            ValueKey::Intensity => (value * 10.0).round() / 10.0,
            ValueKey::Score => value.round(),
        }
    }
}

/// A record that can contribute a value to a series
pub trait Sampled: Dated {
    /// The record's value for the key, or `None` when the record does not
    /// carry that field (an entry has no score, an assessment no intensity)
    fn value_for(&self, key: ValueKey) -> Option<f64>;
}

impl Sampled for RawEntry {
    fn value_for(&self, key: ValueKey) -> Option<f64> {
        match key {
            ValueKey::Intensity => Some(self.intensity),
            ValueKey::Score => None,
        }
    }
}

impl Sampled for RawAssessment {
    fn value_for(&self, key: ValueKey) -> Option<f64> {
        match key {
            ValueKey::Score => Some(self.score),
            ValueKey::Intensity => None,
        }
    }
}

/// Build a padded series of exactly `window_days` buckets, oldest first,
/// ending at `today`. Record timestamps are truncated to calendar days
/// in the given timezone. Deterministic for a frozen `today`.
pub fn compute_series<T: Sampled>(
    records: &[T],
    key: ValueKey,
    window_days: u32,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<Bucket> {
    let span = window_days.max(1);
    let start = today - Duration::days(span as i64 - 1);

    let mut buckets = Vec::with_capacity(span as usize);
    for day_offset in 0..span {
        let day = start + Duration::days(day_offset as i64);

        let mut sum = 0.0;
        let mut count = 0u32;
        for record in records {
            if record.day(offset) != day {
                continue;
            }
            if let Some(value) = record.value_for(key) {
                sum += value;
                count += 1;
            }
        }

        let value = if count > 0 {
            Some(key.round(sum / count as f64))
        } else {
            None
        };

        buckets.push(Bucket {
            date_key: date_key(day),
            value,
        });
    }

    buckets
}
