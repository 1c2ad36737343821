//! # flyer-accuracy
//!
//! Counts matching outcomes and corrections per store, per phase, and
//! per deal type, derives day-bucketed trends, and projects when a
//! target accuracy will be reached. State lives in one JSON artifact.

pub mod metrics;
pub mod tracker;
pub mod trend;

pub use metrics::{AccuracyMetrics, HistoryEntry, StoreAccuracy};
pub use tracker::AccuracyTracker;
