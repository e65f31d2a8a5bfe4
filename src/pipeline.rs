//! Pipeline orchestration
//!
//! This module provides the public API of the engine: window a record set,
//! aggregate it into a snapshot, pad it into a chart series, or fold the
//! full history into a streak. Every function is a pure fold over the
//! records it is given plus an explicit `today` and timezone offset, in
//! which record timestamps are truncated to calendar days; the `*_now`
//! variants anchor both to the system-local clock.

use crate::aggregate::Aggregator;
use crate::classifier::EmotionClassifier;
use crate::series::{self, Sampled, ValueKey};
use crate::store::OptimisticStore;
use crate::streak::StreakCalculator;
use crate::types::{
    Bucket, RawAssessment, RawEntry, SourceTag, StreakState, WellnessSnapshot, WindowSpec,
};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

/// Compute a wellness snapshot for one window.
///
/// Both record lists are filtered to the window before aggregation.
pub fn compute_snapshot(
    entries: &[RawEntry],
    assessments: &[RawAssessment],
    window: &WindowSpec,
    today: NaiveDate,
    offset: FixedOffset,
) -> WellnessSnapshot {
    let windowed_entries = window.filter(entries, today, offset);
    let windowed_assessments = window.filter(assessments, today, offset);
    Aggregator::snapshot(&windowed_entries, &windowed_assessments)
}

/// [`compute_snapshot`] anchored to the system-local date and timezone
pub fn compute_snapshot_now(
    entries: &[RawEntry],
    assessments: &[RawAssessment],
    window: &WindowSpec,
) -> WellnessSnapshot {
    let (today, offset) = local_anchor();
    compute_snapshot(entries, assessments, window, today, offset)
}

/// Build a gap-filled chart series over the trailing `window_days` days
pub fn compute_series<T: Sampled>(
    records: &[T],
    key: ValueKey,
    window_days: u32,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<Bucket> {
    series::compute_series(records, key, window_days, today, offset)
}

/// [`compute_series`] anchored to the system-local date and timezone
pub fn compute_series_now<T: Sampled>(
    records: &[T],
    key: ValueKey,
    window_days: u32,
) -> Vec<Bucket> {
    let (today, offset) = local_anchor();
    compute_series(records, key, window_days, today, offset)
}

/// Build a chart series sized to a window: the bucket count is the
/// window's day span ending at `today`, so a month window charts
/// month-to-date and a rolling window charts its full span
pub fn compute_window_series<T: Sampled>(
    records: &[T],
    key: ValueKey,
    window: &WindowSpec,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<Bucket> {
    series::compute_series(records, key, window.span_days(today), today, offset)
}

/// Compute the engagement streak over the full entry history
pub fn compute_streak(
    entries: &[RawEntry],
    today: NaiveDate,
    offset: FixedOffset,
) -> StreakState {
    StreakCalculator::compute(entries, today, offset)
}

/// [`compute_streak`] anchored to the system-local date and timezone
pub fn compute_streak_now(entries: &[RawEntry]) -> StreakState {
    let (today, offset) = local_anchor();
    compute_streak(entries, today, offset)
}

/// Today and the UTC offset of the system-local clock, taken together so
/// record truncation and the window anchor agree on what "today" means
fn local_anchor() -> (NaiveDate, FixedOffset) {
    let now = Local::now();
    (now.date_naive(), now.offset().fix())
}

/// Stateful engine owning an in-memory record set.
///
/// Mood logs are inserted optimistically through the classifier; every
/// derived view is recomputed from scratch on each query, so any insert
/// or confirmation is reflected immediately. Nothing derived is cached.
///
/// The engine is configured with the user's UTC offset once; all views
/// truncate record timestamps to calendar days in that zone.
#[derive(Debug, Clone)]
pub struct InsightsEngine {
    entries: OptimisticStore,
    assessments: Vec<RawAssessment>,
    offset: FixedOffset,
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightsEngine {
    /// Create an engine computing days in UTC
    pub fn new() -> Self {
        Self::in_timezone(Utc.fix())
    }

    /// Create an engine computing days in the given user timezone
    pub fn in_timezone(offset: FixedOffset) -> Self {
        Self {
            entries: OptimisticStore::new(),
            assessments: Vec::new(),
            offset,
        }
    }

    /// Seed the engine with already-fetched history
    pub fn with_history(entries: Vec<RawEntry>, assessments: Vec<RawAssessment>) -> Self {
        Self {
            entries: OptimisticStore::with_history(entries),
            assessments,
            offset: Utc.fix(),
        }
    }

    /// The UTC offset the engine truncates calendar days in
    pub fn timezone(&self) -> FixedOffset {
        self.offset
    }

    /// Classify free text and insert the resulting entry optimistically.
    /// Returns the temporary id to reconcile once the write acknowledges.
    pub fn log_mood(&mut self, text: &str, at: DateTime<Utc>) -> String {
        let classified = EmotionClassifier::classify(text);
        self.entries.insert(RawEntry {
            id: String::new(),
            text: text.to_string(),
            timestamp: at,
            emotion_label: classified.emotion,
            intensity: classified.intensity,
            source_tag: SourceTag::Classifier,
        })
    }

    /// Insert an already-shaped entry optimistically
    pub fn log_entry(&mut self, entry: RawEntry) -> String {
        self.entries.insert(entry)
    }

    /// Append a completed assessment
    pub fn record_assessment(&mut self, assessment: RawAssessment) {
        self.assessments.push(assessment);
    }

    /// Reconcile a pending entry with its persisted id
    pub fn confirm_entry(
        &mut self,
        temp_id: &str,
        persisted_id: &str,
    ) -> Result<(), crate::error::ComputeError> {
        self.entries.confirm(temp_id, persisted_id)
    }

    /// Record a failed write; the entry is kept
    pub fn entry_write_failed(&mut self, temp_id: &str) -> Result<(), crate::error::ComputeError> {
        self.entries.mark_failed(temp_id)
    }

    pub fn entries(&self) -> Vec<RawEntry> {
        self.entries.records()
    }

    pub fn assessments(&self) -> &[RawAssessment] {
        &self.assessments
    }

    /// Windowed snapshot over the current record set
    pub fn snapshot(&self, window: &WindowSpec, today: NaiveDate) -> WellnessSnapshot {
        compute_snapshot(
            &self.entries.records(),
            &self.assessments,
            window,
            today,
            self.offset,
        )
    }

    /// Intensity chart series over the trailing `days` days
    pub fn intensity_series(&self, days: u32, today: NaiveDate) -> Vec<Bucket> {
        compute_series(
            &self.entries.records(),
            ValueKey::Intensity,
            days,
            today,
            self.offset,
        )
    }

    /// Assessment score chart series over the trailing `days` days
    pub fn score_series(&self, days: u32, today: NaiveDate) -> Vec<Bucket> {
        compute_series(&self.assessments, ValueKey::Score, days, today, self.offset)
    }

    /// Engagement streak over the full entry history (never windowed)
    pub fn streak(&self, today: NaiveDate) -> StreakState {
        compute_streak(&self.entries.records(), today, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CalendarUnit;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn at(day: NaiveDate, hour: u32) -> DateTime<Utc> {
        use chrono::Datelike;
        Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), hour, 0, 0)
            .unwrap()
    }

    fn assessment(score: f64, day: NaiveDate) -> RawAssessment {
        RawAssessment {
            id: format!("a-{day}"),
            test_name: "PHQ-9".to_string(),
            category: "depression".to_string(),
            score,
            timestamp: at(day, 12),
        }
    }

    #[test]
    fn test_snapshot_windows_both_signal_types() {
        let mut engine = InsightsEngine::new();
        engine.log_mood("feeling calm and at peace", at(today(), 9));
        engine.log_mood("really sad back then", at(today() - Duration::days(40), 9));
        engine.record_assessment(assessment(80.0, today()));
        engine.record_assessment(assessment(10.0, today() - Duration::days(40)));

        let snapshot = engine.snapshot(
            &WindowSpec::Calendar {
                unit: CalendarUnit::Month,
            },
            today(),
        );

        // Only the two in-month records participate
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.dominant_emotion, "Calm");
        assert_eq!(snapshot.assessment_average10, 8.0);
    }

    #[test]
    fn test_optimistic_log_updates_views_immediately() {
        let mut engine = InsightsEngine::new();
        assert_eq!(engine.streak(today()).current_streak, 0);

        let temp_id = engine.log_mood("okay day", at(today(), 8));

        assert_eq!(engine.streak(today()).current_streak, 1);
        assert!(temp_id.starts_with("local-"));
    }

    #[test]
    fn test_failed_write_still_counts_in_views() {
        let mut engine = InsightsEngine::new();
        let temp_id = engine.log_mood("okay day", at(today(), 8));
        engine.entry_write_failed(&temp_id).unwrap();

        assert_eq!(engine.streak(today()).current_streak, 1);
        let snapshot = engine.snapshot(
            &WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            },
            today(),
        );
        assert_eq!(snapshot.total_count, 1);
    }

    #[test]
    fn test_confirm_does_not_change_derived_values() {
        let mut engine = InsightsEngine::new();
        let temp_id = engine.log_mood("at peace tonight", at(today(), 21));

        let before = engine.snapshot(
            &WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            },
            today(),
        );
        engine.confirm_entry(&temp_id, "db-7").unwrap();
        let after = engine.snapshot(
            &WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            },
            today(),
        );

        assert_eq!(before, after);
        assert_eq!(engine.entries()[0].id, "db-7");
    }

    #[test]
    fn test_window_series_bucket_count_follows_the_window() {
        let mut engine = InsightsEngine::new();
        engine.log_mood("feeling calm", at(today(), 9));

        // 2024-03-15 -> a month window pads 15 month-to-date buckets
        let series = compute_window_series(
            &engine.entries(),
            ValueKey::Intensity,
            &WindowSpec::Calendar {
                unit: CalendarUnit::Month,
            },
            today(),
            engine.timezone(),
        );

        assert_eq!(series.len(), 15);
        assert_eq!(series[0].date_key, "2024-03-01");
        assert!(series[14].value.is_some());
    }

    #[test]
    fn test_series_from_engine_records() {
        let mut engine = InsightsEngine::new();
        engine.log_mood("feeling calm", at(today() - Duration::days(2), 9));
        engine.record_assessment(assessment(64.0, today()));

        let intensity = engine.intensity_series(7, today());
        let score = engine.score_series(7, today());

        assert_eq!(intensity.len(), 7);
        assert!(intensity[4].value.is_some());
        assert_eq!(score[6].value, Some(64.0));
    }

    #[test]
    fn test_engine_views_follow_the_configured_timezone() {
        // 21:00 March 15 in UTC-5 is stored as 02:00 March 16 UTC; the
        // day window and streak for March 15 must both see the entry
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let mut engine = InsightsEngine::in_timezone(minus_five);
        engine.log_mood(
            "at peace tonight",
            Utc.with_ymd_and_hms(2024, 3, 16, 2, 0, 0).unwrap(),
        );

        let snapshot = engine.snapshot(
            &WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            },
            today(),
        );

        assert_eq!(snapshot.total_count, 1);
        assert_eq!(engine.streak(today()).current_streak, 1);
    }

    #[test]
    fn test_streak_spans_all_history_not_the_window() {
        let mut engine = InsightsEngine::new();
        engine.log_mood("okay", at(today(), 9));
        engine.log_mood("okay", at(today() - Duration::days(1), 9));
        engine.log_mood("okay", at(today() - Duration::days(2), 9));

        // A day window would only see today's entry; the streak sees all 3
        assert_eq!(engine.streak(today()).current_streak, 3);
    }
}
