//! Moodscope - Pure aggregation engine for personal wellness tracking
//!
//! Moodscope turns free-text mood entries and structured clinical-assessment
//! scores into time-windowed statistics through a deterministic pipeline:
//! row normalization → window filtering → aggregation / series padding /
//! streak computation.
//!
//! ## Modules
//!
//! - **Classifier**: rule-based free text → (emotion, intensity)
//! - **Normalizer**: loose storage rows → canonical records, with a
//!   rejection report for malformed rows
//! - **Window / Series / Aggregate / Streak**: the derived views
//! - **Store**: read contracts, remote∪local union, optimistic inserts
//!
//! The engine owns no wire format, persistence or UI; it is invoked with
//! records already fetched by its environment. Every derived value is a
//! pure function of the records, the window spec, an explicit `today` and
//! the user's UTC offset (records bucket on their local calendar day).

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod series;
pub mod store;
pub mod streak;
pub mod types;
pub mod window;

pub use classifier::{Classification, EmotionClassifier};
pub use error::ComputeError;
pub use pipeline::{
    compute_series, compute_series_now, compute_snapshot, compute_snapshot_now, compute_streak,
    compute_streak_now, compute_window_series, InsightsEngine,
};
pub use series::ValueKey;
pub use store::{EntrySource, InMemorySource, OptimisticStore, RecordSources};
pub use types::{
    Bucket, CalendarUnit, DayCell, RawAssessment, RawEntry, RecordStatus, SourceTag, StreakState,
    WellnessSnapshot, WindowSpec,
};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
