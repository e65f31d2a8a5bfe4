//! Core types for the moodscope engine
//!
//! This module defines the data structures that flow through the engine:
//! raw journal/assessment records, window specifications, chart buckets,
//! and the derived snapshot/streak outputs.
//!
//! Every derived value is a pure function of the raw records plus a window
//! specification and an explicit `today` date; nothing derived is cached
//! across mutations.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Origin of a journal record, for provenance tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Logged directly by the user
    Manual,
    /// Produced by the emotion classifier from free text
    Classifier,
    /// For custom/unknown sources, use Other with a name
    #[serde(untagged)]
    Other(String),
}

impl SourceTag {
    pub fn as_str(&self) -> &str {
        match self {
            SourceTag::Manual => "manual",
            SourceTag::Classifier => "classifier",
            SourceTag::Other(name) => name.as_str(),
        }
    }
}

/// A normalized free-text mood log with a derived emotion and 0-10 intensity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    /// Record identifier (may be a temporary `local-*` id before persistence)
    pub id: String,
    /// Free text the user logged
    pub text: String,
    /// When the entry was logged (UTC)
    pub timestamp: DateTime<Utc>,
    /// Title-Case emotion label (e.g. "Calm", "Anxious")
    pub emotion_label: String,
    /// Intensity on a 0-10 scale
    pub intensity: f64,
    /// Where this record came from
    pub source_tag: SourceTag,
}

/// A normalized clinical assessment result scored 0-100
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAssessment {
    /// Record identifier
    pub id: String,
    /// Name of the questionnaire (e.g. "PHQ-9")
    pub test_name: String,
    /// Assessment category (e.g. "depression", "anxiety")
    pub category: String,
    /// Score on a 0-100 scale
    pub score: f64,
    /// When the assessment was completed (UTC)
    pub timestamp: DateTime<Utc>,
}

/// A record with a calendar-day position
///
/// All window and bucket comparisons truncate timestamps to the calendar
/// day in the user's timezone, so two records on the same local day are
/// always co-bucketed regardless of time-of-day. Timestamps are stored in
/// UTC; the offset is supplied by the caller alongside `today`.
pub trait Dated {
    fn timestamp(&self) -> DateTime<Utc>;

    /// Calendar day of the record, truncated to local midnight
    fn day(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp().with_timezone(&offset).date_naive()
    }
}

impl Dated for RawEntry {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Dated for RawAssessment {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Calendar unit for anchored windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Date range used to select records for aggregation
///
/// Either anchored to "today" on a calendar unit, or a trailing span of
/// N days. Both bounds are inclusive; a boundary exactly at midnight is
/// inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WindowSpec {
    Calendar { unit: CalendarUnit },
    Rolling { days: u32 },
}

/// One day-slot in a padded chart series
///
/// `value` is `None` when no record fell on that day; consumers bridge
/// gaps between adjacent non-null buckets rather than breaking the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Calendar day, formatted `YYYY-MM-DD`
    pub date_key: String,
    /// Mean of the day's values, rounded to the field's natural precision
    pub value: Option<f64>,
}

/// Windowed wellness aggregate, recomputed on every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessSnapshot {
    /// Journal entries plus assessments in the window
    pub total_count: usize,
    /// Mean journal intensity (0-10), 0.0 when no journal records
    pub journal_average: f64,
    /// Mean of the 5 most recent assessment scores, normalized to 0-10
    pub assessment_average10: f64,
    /// Blended 0-10 wellness score (70/30 toward clinical assessments)
    pub blended_score: f64,
    /// Most frequent emotion, "Neutral" when no journal records
    pub dominant_emotion: String,
    /// Second most frequent emotion, "None" when fewer than two
    pub secondary_emotion: String,
    /// Tally of Title-Case emotion labels across journal records
    pub emotion_counts: BTreeMap<String, u32>,
}

/// One day in the streak week view
///
/// Exactly one of the three flags is set for every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    /// Calendar day, formatted `YYYY-MM-DD`
    pub date_key: String,
    /// The day has at least one journal entry
    pub active: bool,
    /// The day is in the past with no entry
    pub missed: bool,
    /// The day is later than today
    pub future: bool,
}

/// Engagement streak state derived from the full entry history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive entry days counted back from today or yesterday
    pub current_streak: u32,
    /// Current ISO week (Monday start), one cell per day
    pub last7_days: Vec<DayCell>,
}

/// Lifecycle of an optimistically inserted record
///
/// A new record is appended in-memory immediately (`Pending`), then either
/// has its temporary id swapped for the persisted one (`Confirmed`) or the
/// write fails and the record is kept anyway (`FailedKept`). Records are
/// never rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Confirmed,
    FailedKept,
}

/// Format a date the way every `date_key` in the engine is formatted
pub fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
