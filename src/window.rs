//! Temporal window filtering
//!
//! This module selects records whose calendar day falls inside a
//! [`WindowSpec`]. Record timestamps and window boundaries are both
//! truncated to midnight in the user's timezone before comparing, so two
//! records on the same local calendar day are always co-bucketed
//! regardless of time-of-day, and both window bounds are inclusive.

use crate::types::{CalendarUnit, Dated, WindowSpec};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate};

impl WindowSpec {
    /// Whether a record day falls inside the window anchored at `today`
    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        match self {
            WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            } => day == today,
            WindowSpec::Calendar {
                unit: CalendarUnit::Week,
            } => day >= today - Duration::days(6) && day <= today,
            WindowSpec::Calendar {
                unit: CalendarUnit::Month,
            } => day.year() == today.year() && day.month() == today.month(),
            WindowSpec::Calendar {
                unit: CalendarUnit::Year,
            } => day.year() == today.year(),
            WindowSpec::Rolling { days } => {
                let span = (*days).max(1) as i64;
                day >= today - Duration::days(span - 1) && day <= today
            }
        }
    }

    /// Number of calendar days the window covers ending at `today`,
    /// which is the bucket count used for padded chart series
    pub fn span_days(&self, today: NaiveDate) -> u32 {
        match self {
            WindowSpec::Calendar {
                unit: CalendarUnit::Day,
            } => 1,
            WindowSpec::Calendar {
                unit: CalendarUnit::Week,
            } => 7,
            WindowSpec::Calendar {
                unit: CalendarUnit::Month,
            } => today.day(),
            WindowSpec::Calendar {
                unit: CalendarUnit::Year,
            } => today.ordinal(),
            WindowSpec::Rolling { days } => (*days).max(1),
        }
    }

    /// Filter records to those inside the window, truncating record
    /// timestamps to calendar days in the given timezone
    pub fn filter<T: Dated + Clone>(
        &self,
        records: &[T],
        today: NaiveDate,
        offset: FixedOffset,
    ) -> Vec<T> {
        records
            .iter()
            .filter(|record| self.contains(record.day(offset), today))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawEntry, SourceTag};
    use chrono::{Offset, TimeZone, Utc};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn entry_on(date: &str, hour: u32) -> RawEntry {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        RawEntry {
            id: format!("e-{date}-{hour}"),
            text: String::new(),
            timestamp: Utc
                .with_ymd_and_hms(day.year(), day.month(), day.day(), hour, 30, 0)
                .unwrap(),
            emotion_label: "Calm".to_string(),
            intensity: 5.0,
            source_tag: SourceTag::Manual,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_day_window_matches_today_only() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Day,
        };
        let records = vec![entry_on("2024-03-15", 0), entry_on("2024-03-14", 23)];
        let filtered = spec.filter(&records, today(), utc());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].day(utc()), today());
    }

    #[test]
    fn test_week_window_is_trailing_not_monday_aligned() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Week,
        };
        // 2024-03-15 is a Friday; trailing 7 days reach back to Saturday 03-09
        assert!(spec.contains(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), today()));
        assert!(!spec.contains(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), today()));
        assert!(spec.contains(today(), today()));
    }

    #[test]
    fn test_month_window_is_calendar_aligned() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Month,
        };
        assert!(spec.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), today()));
        assert!(!spec.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), today()));
        // Same month of a different year is outside
        assert!(!spec.contains(NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(), today()));
    }

    #[test]
    fn test_year_window() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Year,
        };
        assert!(spec.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), today()));
        assert!(!spec.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), today()));
    }

    #[test]
    fn test_rolling_window_inclusive_bounds() {
        let spec = WindowSpec::Rolling { days: 30 };
        let lower = today() - Duration::days(29);
        assert!(spec.contains(lower, today()));
        assert!(!spec.contains(lower - Duration::days(1), today()));
        assert!(!spec.contains(today() + Duration::days(1), today()));
    }

    #[test]
    fn test_same_day_records_co_bucketed_regardless_of_time() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Day,
        };
        // Midnight and late evening on the same day are both inside
        let records = vec![entry_on("2024-03-15", 0), entry_on("2024-03-15", 23)];
        assert_eq!(spec.filter(&records, today(), utc()).len(), 2);
    }

    #[test]
    fn test_local_evening_entry_stays_on_its_local_day() {
        let spec = WindowSpec::Calendar {
            unit: CalendarUnit::Day,
        };
        // 21:00 March 15 in UTC-5 is stored as 02:00 March 16 UTC; the
        // day window for March 15 must still include it
        let records = vec![entry_on("2024-03-16", 2)];
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();

        assert_eq!(spec.filter(&records, today(), minus_five).len(), 1);
        assert!(spec.filter(&records, today(), utc()).is_empty());
    }

    #[test]
    fn test_span_days() {
        let t = today();
        assert_eq!(
            WindowSpec::Calendar {
                unit: CalendarUnit::Day
            }
            .span_days(t),
            1
        );
        assert_eq!(
            WindowSpec::Calendar {
                unit: CalendarUnit::Week
            }
            .span_days(t),
            7
        );
        assert_eq!(
            WindowSpec::Calendar {
                unit: CalendarUnit::Month
            }
            .span_days(t),
            15
        );
        // 2024 is a leap year; March 15 is day 75
        assert_eq!(
            WindowSpec::Calendar {
                unit: CalendarUnit::Year
            }
            .span_days(t),
            75
        );
        assert_eq!(WindowSpec::Rolling { days: 90 }.span_days(t), 90);
    }
}
