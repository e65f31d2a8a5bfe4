//! Record sources and the optimistic write store
//!
//! The engine owns no transport: it consumes two read contracts
//! ([`EntrySource`]) and exposes pure computation over whatever records
//! arrive. A remote source and a local fallback are unioned WITHOUT
//! deduplication; both are treated as independently authoritative
//! histories, and a failed remote fetch degrades to local-only data.
//!
//! [`OptimisticStore`] implements the append-then-patch-id discipline for
//! new records: a record is visible to every derived view the moment it is
//! inserted (with a temporary id), and the write either confirms the
//! persisted id later or fails and leaves the record in place. A user's
//! local mood log is never silently dropped.

use crate::error::ComputeError;
use crate::normalizer::{AssessmentRow, EntryRow, RecordNormalizer};
use crate::types::{RawAssessment, RawEntry, RecordStatus};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of temporary identifiers handed out by [`OptimisticStore`]
pub const TEMP_ID_PREFIX: &str = "local-";

/// Read contract the engine's environment supplies
///
/// Row shapes are the loose storage shapes; normalization happens on this
/// side of the boundary so callers never ship malformed records into the
/// aggregation layer.
pub trait EntrySource {
    fn list_entries(&self, user_id: &str) -> Result<Vec<EntryRow>, ComputeError>;
    fn list_assessments(&self, user_id: &str) -> Result<Vec<AssessmentRow>, ComputeError>;
}

/// In-memory source, used as the local fallback and in tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySource {
    pub entries: Vec<EntryRow>,
    pub assessments: Vec<AssessmentRow>,
}

impl EntrySource for InMemorySource {
    fn list_entries(&self, _user_id: &str) -> Result<Vec<EntryRow>, ComputeError> {
        Ok(self.entries.clone())
    }

    fn list_assessments(&self, _user_id: &str) -> Result<Vec<AssessmentRow>, ComputeError> {
        Ok(self.assessments.clone())
    }
}

/// Remote source plus local fallback, merged per the union contract
pub struct RecordSources<'a> {
    remote: Option<&'a dyn EntrySource>,
    local: &'a dyn EntrySource,
}

impl<'a> RecordSources<'a> {
    pub fn new(remote: Option<&'a dyn EntrySource>, local: &'a dyn EntrySource) -> Self {
        Self { remote, local }
    }

    /// Fetch, normalize and union journal histories.
    ///
    /// Remote failure is logged and degrades to local-only data; it never
    /// fails the computation. The union is a plain concatenation: a record
    /// present in both stores is double-counted by design.
    pub fn entries(&self, user_id: &str) -> Vec<RawEntry> {
        let remote_rows = match self.remote.map(|source| source.list_entries(user_id)) {
            Some(Ok(rows)) => rows,
            Some(Err(err)) => {
                warn!("remote entry fetch failed, using local fallback only: {err}");
                Vec::new()
            }
            None => Vec::new(),
        };
        let local_rows = self.local.list_entries(user_id).unwrap_or_default();

        let mut rows = remote_rows;
        rows.extend(local_rows);
        RecordNormalizer::normalize_entries(rows).records
    }

    /// Fetch, normalize and union assessment histories; same contract as
    /// [`Self::entries`]
    pub fn assessments(&self, user_id: &str) -> Vec<RawAssessment> {
        let remote_rows = match self.remote.map(|source| source.list_assessments(user_id)) {
            Some(Ok(rows)) => rows,
            Some(Err(err)) => {
                warn!("remote assessment fetch failed, using local fallback only: {err}");
                Vec::new()
            }
            None => Vec::new(),
        };
        let local_rows = self.local.list_assessments(user_id).unwrap_or_default();

        let mut rows = remote_rows;
        rows.extend(local_rows);
        RecordNormalizer::normalize_assessments(rows).records
    }
}

/// One journal record with its write-lifecycle status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub record: RawEntry,
    pub status: RecordStatus,
}

/// In-memory journal store with optimistic inserts
///
/// State machine per record: `Pending -> Confirmed` when the write
/// acknowledges, or `Pending -> FailedKept` when it does not. No
/// transition removes a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimisticStore {
    tracked: Vec<TrackedEntry>,
}

impl OptimisticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-persisted history
    pub fn with_history(records: Vec<RawEntry>) -> Self {
        Self {
            tracked: records
                .into_iter()
                .map(|record| TrackedEntry {
                    record,
                    status: RecordStatus::Confirmed,
                })
                .collect(),
        }
    }

    /// Append a record immediately under a temporary id and return that id.
    /// Derived views include the record from this moment on.
    pub fn insert(&mut self, mut record: RawEntry) -> String {
        let temp_id = format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4());
        record.id = temp_id.clone();
        self.tracked.push(TrackedEntry {
            record,
            status: RecordStatus::Pending,
        });
        temp_id
    }

    /// Swap a temporary id for the persisted one once the write acknowledges
    pub fn confirm(&mut self, temp_id: &str, persisted_id: &str) -> Result<(), ComputeError> {
        let tracked = self
            .tracked
            .iter_mut()
            .find(|t| t.record.id == temp_id)
            .ok_or_else(|| ComputeError::UnknownRecord(temp_id.to_string()))?;

        tracked.record.id = persisted_id.to_string();
        tracked.status = RecordStatus::Confirmed;
        Ok(())
    }

    /// Record a failed write. The record stays in place; the failure is
    /// only logged.
    pub fn mark_failed(&mut self, temp_id: &str) -> Result<(), ComputeError> {
        let tracked = self
            .tracked
            .iter_mut()
            .find(|t| t.record.id == temp_id)
            .ok_or_else(|| ComputeError::UnknownRecord(temp_id.to_string()))?;

        error!("write failed for entry {temp_id}; keeping the local record");
        tracked.status = RecordStatus::FailedKept;
        Ok(())
    }

    /// All records regardless of status, in insertion order
    pub fn records(&self) -> Vec<RawEntry> {
        self.tracked.iter().map(|t| t.record.clone()).collect()
    }

    /// Status of a record by id, if it exists
    pub fn status(&self, id: &str) -> Option<RecordStatus> {
        self.tracked
            .iter()
            .find(|t| t.record.id == id)
            .map(|t| t.status)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Load store state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize store state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
