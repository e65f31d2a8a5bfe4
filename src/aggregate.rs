//! Wellness aggregation
//!
//! This module folds windowed journal and assessment records into a
//! [`WellnessSnapshot`]: emotion distribution, dominant/secondary emotion,
//! per-signal averages and the blended 0-10 wellness score.
//!
//! The blend weights clinical assessments over free-text mood logging at
//! 70/30. That ratio is an intentional product decision and must not be
//! changed without revisiting every consumer of the score.

use crate::classifier::EmotionClassifier;
use crate::types::{RawAssessment, RawEntry, WellnessSnapshot};
use std::collections::BTreeMap;

/// Weight of the journal average in the blended score
const JOURNAL_WEIGHT: f64 = 0.3;

/// Weight of the assessment average in the blended score
const ASSESSMENT_WEIGHT: f64 = 0.7;

/// How many of the most recent assessments feed the assessment average
const RECENT_ASSESSMENTS: usize = 5;

/// Dominant emotion when the window has no journal records
const NO_DATA_DOMINANT: &str = "Neutral";

/// Secondary emotion when fewer than two emotions are present
const NO_DATA_SECONDARY: &str = "None";

/// Aggregator for computing windowed wellness snapshots
pub struct Aggregator;

impl Aggregator {
    /// Compute a snapshot from records already filtered to one window.
    ///
    /// Every degenerate input has a defined fallback: empty journal yields
    /// average 0 and dominant "Neutral", empty everything yields score 0.
    pub fn snapshot(entries: &[RawEntry], assessments: &[RawAssessment]) -> WellnessSnapshot {
        let emotion_counts = tally_emotions(entries);
        let (dominant_emotion, secondary_emotion) = rank_emotions(entries, &emotion_counts);

        let journal_average = mean_intensity(entries);
        let assessment_average10 = recent_assessment_average10(assessments);

        let blended_score = match (!entries.is_empty(), !assessments.is_empty()) {
            (true, true) => {
                JOURNAL_WEIGHT * journal_average + ASSESSMENT_WEIGHT * assessment_average10
            }
            (true, false) => journal_average,
            (false, true) => assessment_average10,
            (false, false) => 0.0,
        };

        WellnessSnapshot {
            total_count: entries.len() + assessments.len(),
            journal_average: round1(journal_average),
            assessment_average10: round1(assessment_average10),
            blended_score: round1(blended_score),
            dominant_emotion,
            secondary_emotion,
            emotion_counts,
        }
    }
}

/// Tally Title-Case emotion labels across journal records only;
/// assessments carry no emotion
fn tally_emotions(entries: &[RawEntry]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.emotion_label.clone()).or_insert(0) += 1;
    }
    counts
}

/// Order emotions by (count desc, mean intensity desc, taxonomy order)
/// and return the top two labels
fn rank_emotions(entries: &[RawEntry], counts: &BTreeMap<String, u32>) -> (String, String) {
    if entries.is_empty() {
        return (NO_DATA_DOMINANT.to_string(), NO_DATA_SECONDARY.to_string());
    }

    let mut ranked: Vec<(&str, u32, f64)> = counts
        .iter()
        .map(|(label, &count)| {
            let sum: f64 = entries
                .iter()
                .filter(|e| e.emotion_label == *label)
                .map(|e| e.intensity)
                .sum();
            (label.as_str(), count, sum / count as f64)
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| {
                EmotionClassifier::taxonomy_rank(a.0).cmp(&EmotionClassifier::taxonomy_rank(b.0))
            })
    });

    let dominant = ranked[0].0.to_string();
    let secondary = ranked
        .get(1)
        .map(|(label, _, _)| label.to_string())
        .unwrap_or_else(|| NO_DATA_SECONDARY.to_string());
    (dominant, secondary)
}

/// Mean journal intensity, 0 when empty
fn mean_intensity(entries: &[RawEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| e.intensity).sum::<f64>() / entries.len() as f64
}

/// Mean of the most recent `RECENT_ASSESSMENTS` scores, normalized from
/// the 0-100 scale to 0-10; 0 when empty
fn recent_assessment_average10(assessments: &[RawAssessment]) -> f64 {
    if assessments.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<&RawAssessment> = assessments.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(RECENT_ASSESSMENTS);

    let mean: f64 = sorted.iter().map(|a| a.score).sum::<f64>() / sorted.len() as f64;
    mean / 10.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
