//! Engagement streak computation
//!
//! This module derives [`StreakState`] from the full, unfiltered journal
//! history: the count of consecutive entry days and a 7-day hit/miss view
//! anchored to the current ISO week (Monday start).
//!
//! The streak tolerates exactly one missed day of grace: an entry
//! yesterday keeps the streak live today, but two consecutive missed days
//! reset it to 0. The grace day itself does not add to the count; only
//! dates with entries are counted.

use crate::types::{date_key, DayCell, Dated, RawEntry, StreakState};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate};
use std::collections::BTreeSet;

/// Streak calculator over the full entry history
pub struct StreakCalculator;

impl StreakCalculator {
    /// Compute the current streak and week view as of `today`, truncating
    /// entry timestamps to calendar days in the given timezone.
    ///
    /// Days strictly after `today` (clock skew, pre-dated imports) are
    /// ignored so they cannot mask a live streak.
    pub fn compute(entries: &[RawEntry], today: NaiveDate, offset: FixedOffset) -> StreakState {
        let active_days: BTreeSet<NaiveDate> = entries
            .iter()
            .map(|e| e.day(offset))
            .filter(|&day| day <= today)
            .collect();

        StreakState {
            current_streak: current_streak(&active_days, today),
            last7_days: week_view(&active_days, today),
        }
    }
}

fn current_streak(active_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let latest = match active_days.iter().next_back() {
        Some(&latest) => latest,
        None => return 0,
    };

    // One day of grace: checking in yesterday still counts as live today
    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for &day in active_days.iter().rev().skip(1) {
        if previous - day == Duration::days(1) {
            streak += 1;
            previous = day;
        } else {
            break;
        }
    }
    streak
}

/// One cell per day of the ISO week containing `today`, Monday first.
/// Every day is exactly one of active, missed or future.
fn week_view(active_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Vec<DayCell> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    (0..7)
        .map(|offset| {
            let day = monday + Duration::days(offset);
            let future = day > today;
            let active = !future && active_days.contains(&day);
            DayCell {
                date_key: date_key(day),
                active,
                missed: !future && !active,
                future,
            }
        })
        .collect()
}
