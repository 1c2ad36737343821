//! Read-only accuracy report types consumed by the orchestrator and by
//! external dashboards.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::LearningPhase;

/// Global counters with derived rates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalAccuracy {
    pub total_deals: u64,
    pub correct_matches: u64,
    pub incorrect_matches: u64,
    pub corrections_received: u64,
    pub accuracy: f64,
    pub correction_rate: f64,
}

/// Accuracy of one phase across all stores, against its fixed target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseAccuracy {
    pub phase: LearningPhase,
    pub total_deals: u64,
    pub accuracy: f64,
    pub target_accuracy: f64,
    pub meets_target: bool,
    /// target − accuracy; negative when the target is beaten.
    pub gap: f64,
}

/// Slimmed-down counters for per-phase / per-deal-type breakdowns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSlice {
    pub total_deals: u64,
    pub accuracy: f64,
}

/// Per-store accuracy view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReport {
    pub store: String,
    pub total_deals: u64,
    pub accuracy: f64,
    pub correction_rate: f64,
    pub by_phase: BTreeMap<u8, MetricsSlice>,
    pub by_deal_type: BTreeMap<String, MetricsSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// One day bucket of the trend window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAccuracy {
    pub date: NaiveDate,
    pub accuracy: f64,
    pub total: u64,
}

/// Day-bucketed accuracy trend over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub window_days: i64,
    pub data_points: usize,
    pub direction: TrendDirection,
    pub daily: Vec<DailyAccuracy>,
    /// Sample-weighted mean over the window.
    pub overall_accuracy: f64,
}

/// Where the least-squares projection landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    /// Already at or above the target.
    Achieved,
    /// Fewer than three day buckets to fit a line through.
    InsufficientData,
    /// Slope is zero or negative; more corrections needed.
    NotImproving { daily_slope: f64 },
    /// More than a year out at the current rate.
    LongTerm {
        estimated_days: i64,
        daily_slope: f64,
    },
    Estimated {
        date: NaiveDate,
        estimated_days: i64,
        daily_slope: f64,
    },
}

/// Target-date projection from the daily-accuracy fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProjection {
    pub target_accuracy: f64,
    pub current_accuracy: f64,
    pub outcome: ProjectionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionReason {
    InsufficientSamples,
    LowAccuracy,
}

/// A store flagged for more data or more corrections, worst first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionItem {
    pub store: String,
    pub reason: AttentionReason,
    pub total_deals: u64,
    pub accuracy: f64,
    pub correction_rate: f64,
}

/// Everything the dashboards want in one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub generated_at: DateTime<Utc>,
    pub global: GlobalAccuracy,
    pub by_phase: Vec<PhaseAccuracy>,
    pub by_store: Vec<StoreReport>,
    pub trend: TrendReport,
    pub projection: TargetProjection,
    pub needing_attention: Vec<AttentionItem>,
}
