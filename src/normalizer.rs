//! Record normalization
//!
//! This module validates loosely-typed storage rows (database rows or
//! local-fallback JSON) into canonical [`RawEntry`] / [`RawAssessment`]
//! records.
//!
//! Defaulting rules:
//! - missing emotion label -> `"Neutral"`
//! - missing intensity -> 5, missing score -> 50 (mid values, so malformed
//!   rows do not skew averages toward "very bad")
//! - emotion labels are Title-Cased for consistent keying
//!
//! Rows with an unparsable timestamp or a non-numeric intensity/score are
//! dropped and reported, never fatal.

use crate::types::{RawAssessment, RawEntry, SourceTag};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Default intensity for journal rows missing the field (mid of 0-10)
pub const DEFAULT_INTENSITY: f64 = 5.0;

/// Default score for assessment rows missing the field (mid of 0-100)
pub const DEFAULT_SCORE: f64 = 50.0;

/// Emotion label for journal rows missing one
pub const NEUTRAL_LABEL: &str = "Neutral";

/// Loosely-typed journal row as it arrives from storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryRow {
    pub id: Option<String>,
    pub text: Option<String>,
    pub timestamp: Option<String>,
    pub emotion_label: Option<String>,
    /// Number or numeric string; anything else rejects the row
    pub intensity: Option<serde_json::Value>,
    pub source_tag: Option<String>,
}

/// Loosely-typed assessment row as it arrives from storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentRow {
    pub id: Option<String>,
    pub test_name: Option<String>,
    pub category: Option<String>,
    /// Number or numeric string; anything else rejects the row
    pub score: Option<serde_json::Value>,
    pub timestamp: Option<String>,
}

/// Why a row was dropped during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum RejectReason {
    /// Timestamp missing or unparsable
    BadTimestamp(String),
    /// Intensity/score present but not coercible to a number
    NonNumericValue(String),
}

/// A dropped row, reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub id: Option<String>,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Normalization output: surviving records plus the rejection report
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

/// Normalizer for converting raw rows into canonical records
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Normalize journal rows, dropping and reporting malformed ones
    pub fn normalize_entries(rows: Vec<EntryRow>) -> Normalized<RawEntry> {
        let mut records = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for row in rows {
            match normalize_entry(row) {
                Ok(entry) => records.push(entry),
                Err(rejection) => {
                    warn!(
                        "dropping journal row {:?}: {:?}",
                        rejection.id, rejection.reason
                    );
                    rejected.push(rejection);
                }
            }
        }

        Normalized { records, rejected }
    }

    /// Normalize assessment rows, dropping and reporting malformed ones
    pub fn normalize_assessments(rows: Vec<AssessmentRow>) -> Normalized<RawAssessment> {
        let mut records = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for row in rows {
            match normalize_assessment(row) {
                Ok(assessment) => records.push(assessment),
                Err(rejection) => {
                    warn!(
                        "dropping assessment row {:?}: {:?}",
                        rejection.id, rejection.reason
                    );
                    rejected.push(rejection);
                }
            }
        }

        Normalized { records, rejected }
    }
}

fn normalize_entry(row: EntryRow) -> Result<RawEntry, RejectedRow> {
    let timestamp = parse_timestamp(row.timestamp.as_deref()).map_err(|raw| RejectedRow {
        id: row.id.clone(),
        reason: RejectReason::BadTimestamp(raw),
    })?;

    let intensity = coerce_number(row.intensity.as_ref(), DEFAULT_INTENSITY).map_err(|raw| {
        RejectedRow {
            id: row.id.clone(),
            reason: RejectReason::NonNumericValue(raw),
        }
    })?;

    let emotion_label = row
        .emotion_label
        .as_deref()
        .filter(|label| !label.trim().is_empty())
        .map(title_case)
        .unwrap_or_else(|| NEUTRAL_LABEL.to_string());

    let source_tag = match row.source_tag.as_deref() {
        Some("manual") | None => SourceTag::Manual,
        Some("classifier") => SourceTag::Classifier,
        Some(other) => SourceTag::Other(other.to_string()),
    };

    Ok(RawEntry {
        id: row.id.unwrap_or_default(),
        text: row.text.unwrap_or_default(),
        timestamp,
        emotion_label,
        intensity: intensity.clamp(0.0, 10.0),
        source_tag,
    })
}

fn normalize_assessment(row: AssessmentRow) -> Result<RawAssessment, RejectedRow> {
    let timestamp = parse_timestamp(row.timestamp.as_deref()).map_err(|raw| RejectedRow {
        id: row.id.clone(),
        reason: RejectReason::BadTimestamp(raw),
    })?;

    let score = coerce_number(row.score.as_ref(), DEFAULT_SCORE).map_err(|raw| RejectedRow {
        id: row.id.clone(),
        reason: RejectReason::NonNumericValue(raw),
    })?;

    Ok(RawAssessment {
        id: row.id.unwrap_or_default(),
        test_name: row.test_name.unwrap_or_default(),
        category: row.category.unwrap_or_default(),
        score: score.clamp(0.0, 100.0),
        timestamp,
    })
}

/// Parse a stored timestamp into a canonical UTC instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD`
/// (interpreted as midnight). Anything else is an error carrying the raw
/// text for the rejection report.
pub fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>, String> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return Err("<missing>".to_string()),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        // Midnight is inside the day on both ends
        return Ok(parsed.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }

    Err(raw.to_string())
}

/// Coerce a loosely-typed numeric field: absent -> default, finite number
/// or numeric string -> value, anything else -> error with the raw
/// rendering. "NaN"/"inf" strings parse as f64 but would poison every
/// mean downstream, so non-finite values are rejected too.
fn coerce_number(value: Option<&serde_json::Value>, default: f64) -> Result<f64, String> {
    let coerced = match value {
        None | Some(serde_json::Value::Null) => return Ok(default),
        Some(serde_json::Value::Number(n)) => n.as_f64().ok_or_else(|| n.to_string())?,
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().map_err(|_| s.clone())?,
        Some(other) => return Err(other.to_string()),
    };

    if coerced.is_finite() {
        Ok(coerced)
    } else {
        Err(coerced.to_string())
    }
}

/// Title-Case a label: first letter of each word upper, rest lower
pub fn title_case(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry_row(timestamp: &str) -> EntryRow {
        EntryRow {
            id: Some("e1".to_string()),
            text: Some("fine today".to_string()),
            timestamp: Some(timestamp.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_label_and_intensity_default() {
        let normalized = RecordNormalizer::normalize_entries(vec![entry_row("2024-03-10")]);
        assert!(normalized.rejected.is_empty());

        let entry = &normalized.records[0];
        assert_eq!(entry.emotion_label, "Neutral");
        assert_eq!(entry.intensity, DEFAULT_INTENSITY);
    }

    #[test]
    fn test_label_title_cased() {
        let mut row = entry_row("2024-03-10T08:00:00Z");
        row.emotion_label = Some("aNXious".to_string());
        let normalized = RecordNormalizer::normalize_entries(vec![row]);
        assert_eq!(normalized.records[0].emotion_label, "Anxious");
    }

    #[test]
    fn test_unparsable_timestamp_dropped_not_fatal() {
        let rows = vec![entry_row("next tuesday"), entry_row("2024-03-10")];
        let normalized = RecordNormalizer::normalize_entries(rows);

        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.rejected.len(), 1);
        assert_eq!(
            normalized.rejected[0].reason,
            RejectReason::BadTimestamp("next tuesday".to_string())
        );
    }

    #[test]
    fn test_numeric_string_intensity_coerced() {
        let mut row = entry_row("2024-03-10");
        row.intensity = Some(serde_json::Value::String("7.5".to_string()));
        let normalized = RecordNormalizer::normalize_entries(vec![row]);
        assert_eq!(normalized.records[0].intensity, 7.5);
    }

    #[test]
    fn test_non_numeric_score_dropped() {
        let row = AssessmentRow {
            id: Some("a1".to_string()),
            test_name: Some("PHQ-9".to_string()),
            score: Some(serde_json::Value::String("high".to_string())),
            timestamp: Some("2024-03-10".to_string()),
            ..Default::default()
        };
        let normalized = RecordNormalizer::normalize_assessments(vec![row]);

        assert!(normalized.records.is_empty());
        assert_eq!(
            normalized.rejected[0].reason,
            RejectReason::NonNumericValue("high".to_string())
        );
    }

    #[test]
    fn test_non_finite_strings_rejected() {
        // "NaN" and "inf" parse as f64 but must not reach a mean
        for raw in ["NaN", "inf", "-inf"] {
            let mut row = entry_row("2024-03-10");
            row.id = Some(format!("e-{raw}"));
            row.intensity = Some(serde_json::Value::String(raw.to_string()));
            let normalized = RecordNormalizer::normalize_entries(vec![row]);

            assert!(normalized.records.is_empty(), "{raw} must be dropped");
            assert!(matches!(
                normalized.rejected[0].reason,
                RejectReason::NonNumericValue(_)
            ));
        }
    }

    #[test]
    fn test_missing_score_defaults_to_mid() {
        let row = AssessmentRow {
            id: Some("a1".to_string()),
            timestamp: Some("2024-03-10 09:30:00".to_string()),
            ..Default::default()
        };
        let normalized = RecordNormalizer::normalize_assessments(vec![row]);
        assert_eq!(normalized.records[0].score, DEFAULT_SCORE);
    }

    #[test]
    fn test_intensity_clamped_to_scale() {
        let mut row = entry_row("2024-03-10");
        row.intensity = Some(serde_json::json!(14));
        let normalized = RecordNormalizer::normalize_entries(vec![row]);
        assert_eq!(normalized.records[0].intensity, 10.0);
    }

    #[test]
    fn test_camel_case_row_shape() {
        let row: EntryRow = serde_json::from_str(
            r#"{"id": "e1", "emotionLabel": "happy", "intensity": 8, "timestamp": "2024-03-10T10:00:00Z", "sourceTag": "classifier"}"#,
        )
        .unwrap();
        let normalized = RecordNormalizer::normalize_entries(vec![row]);

        let entry = &normalized.records[0];
        assert_eq!(entry.emotion_label, "Happy");
        assert_eq!(entry.source_tag, SourceTag::Classifier);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("NEUTRAL"), "Neutral");
        assert_eq!(title_case("very tired"), "Very Tired");
    }
}
