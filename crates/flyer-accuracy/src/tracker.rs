//! The accuracy tracker: counters in, reports out.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use flyer_core::config::TrackerConfig;
use flyer_core::errors::PersistError;
use flyer_core::models::{
    AccuracyReport, AttentionItem, AttentionReason, GlobalAccuracy, MetricsSlice, PhaseAccuracy,
    StoreReport, TargetProjection, TrendReport,
};
use flyer_core::persist;
use flyer_core::{DealType, LearningPhase};

use crate::metrics::{AccuracyMetrics, HistoryEntry, StoreAccuracy};
use crate::trend;

/// The persisted artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TrackerState {
    global: AccuracyMetrics,
    stores: BTreeMap<String, StoreAccuracy>,
}

/// Records matching outcomes and corrections, persisting after every
/// mutation.
pub struct AccuracyTracker {
    state: TrackerState,
    path: Option<PathBuf>,
    config: TrackerConfig,
}

impl AccuracyTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            state: TrackerState::default(),
            path: None,
            config,
        }
    }

    /// Tracker backed by an artifact; a corrupt file starts fresh.
    pub fn open(path: impl Into<PathBuf>, config: TrackerConfig) -> Self {
        let path = path.into();
        let state: TrackerState = persist::load_json_or_default(&path);
        debug!(
            path = %path.display(),
            stores = state.stores.len(),
            "accuracy tracker opened"
        );
        Self {
            state,
            path: Some(path),
            config,
        }
    }

    fn store_key(store: &str) -> String {
        store.trim().to_lowercase()
    }

    fn store_entry(&mut self, store: &str) -> &mut StoreAccuracy {
        let key = Self::store_key(store);
        self.state
            .stores
            .entry(key.clone())
            .or_insert_with(|| StoreAccuracy::named(&key))
    }

    /// Record one matching outcome.
    pub fn record_result(
        &mut self,
        store: &str,
        is_correct: bool,
        phase: LearningPhase,
        deal_type: DealType,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<(), PersistError> {
        let ts = timestamp.unwrap_or_else(Utc::now);
        let cap = self.config.history_cap;
        self.store_entry(store)
            .add_result(is_correct, phase, deal_type, ts, cap);
        self.state.global.record(is_correct);
        self.save()
    }

    /// Record one user correction.
    pub fn record_correction(
        &mut self,
        store: &str,
        phase: LearningPhase,
        deal_type: DealType,
    ) -> Result<(), PersistError> {
        self.store_entry(store).add_correction(phase, deal_type);
        self.state.global.corrections_received += 1;
        self.save()
    }

    pub fn global_accuracy(&self) -> GlobalAccuracy {
        let g = &self.state.global;
        GlobalAccuracy {
            total_deals: g.total_deals,
            correct_matches: g.correct_matches,
            incorrect_matches: g.incorrect_matches,
            corrections_received: g.corrections_received,
            accuracy: g.accuracy(),
            correction_rate: g.correction_rate(),
        }
    }

    /// Per-store view; unknown stores report all zeros.
    pub fn store_report(&self, store: &str) -> StoreReport {
        let key = Self::store_key(store);
        match self.state.stores.get(&key) {
            Some(s) => StoreReport {
                store: key,
                total_deals: s.overall.total_deals,
                accuracy: s.overall.accuracy(),
                correction_rate: s.overall.correction_rate(),
                by_phase: s
                    .by_phase
                    .iter()
                    .map(|(phase, m)| {
                        (
                            *phase,
                            MetricsSlice {
                                total_deals: m.total_deals,
                                accuracy: m.accuracy(),
                            },
                        )
                    })
                    .collect(),
                by_deal_type: s
                    .by_deal_type
                    .iter()
                    .map(|(dtype, m)| {
                        (
                            dtype.clone(),
                            MetricsSlice {
                                total_deals: m.total_deals,
                                accuracy: m.accuracy(),
                            },
                        )
                    })
                    .collect(),
            },
            None => StoreReport {
                store: key,
                total_deals: 0,
                accuracy: 0.0,
                correction_rate: 0.0,
                by_phase: BTreeMap::new(),
                by_deal_type: BTreeMap::new(),
            },
        }
    }

    /// One phase across all stores, against its fixed target.
    pub fn phase_accuracy(&self, phase: LearningPhase) -> PhaseAccuracy {
        let mut total = 0u64;
        let mut correct = 0u64;
        for s in self.state.stores.values() {
            if let Some(m) = s.by_phase.get(&phase.as_number()) {
                total += m.total_deals;
                correct += m.correct_matches;
            }
        }
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        let target = phase.target_accuracy();
        PhaseAccuracy {
            phase,
            total_deals: total,
            accuracy,
            target_accuracy: target,
            meets_target: accuracy >= target,
            gap: target - accuracy,
        }
    }

    fn collect_history(&self, store: Option<&str>) -> Vec<&HistoryEntry> {
        match store {
            Some(s) => self
                .state
                .stores
                .get(&Self::store_key(s))
                .map(|sa| sa.history.iter().collect())
                .unwrap_or_default(),
            None => self
                .state
                .stores
                .values()
                .flat_map(|sa| sa.history.iter())
                .collect(),
        }
    }

    /// Day-bucketed trend, optionally filtered to one store.
    pub fn trend(&self, store: Option<&str>, window_days: i64) -> TrendReport {
        trend::build_trend(&self.collect_history(store), window_days, Utc::now())
    }

    /// Projected date for reaching `target` accuracy, from a linear fit
    /// over the projection window.
    pub fn project_target_date(&self, target: f64, store: Option<&str>) -> TargetProjection {
        let now = Utc::now();
        let t = trend::build_trend(
            &self.collect_history(store),
            self.config.projection_window_days,
            now,
        );
        TargetProjection {
            target_accuracy: target,
            current_accuracy: t.overall_accuracy,
            outcome: trend::project(&t, target, now),
        }
    }

    /// Stores that need more data or more corrections, worst accuracy
    /// first.
    pub fn needing_attention(&self) -> Vec<AttentionItem> {
        let mut items: Vec<AttentionItem> = self
            .state
            .stores
            .values()
            .filter_map(|s| {
                let reason = if s.overall.total_deals < self.config.attention_min_samples {
                    AttentionReason::InsufficientSamples
                } else if s.overall.accuracy() < self.config.attention_min_accuracy {
                    AttentionReason::LowAccuracy
                } else {
                    return None;
                };
                Some(AttentionItem {
                    store: s.store_name.clone(),
                    reason,
                    total_deals: s.overall.total_deals,
                    accuracy: s.overall.accuracy(),
                    correction_rate: s.overall.correction_rate(),
                })
            })
            .collect();
        items.sort_by(|a, b| {
            a.accuracy
                .partial_cmp(&b.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.store.cmp(&b.store))
        });
        items
    }

    /// The full dashboard report.
    pub fn report(&self) -> AccuracyReport {
        AccuracyReport {
            generated_at: Utc::now(),
            global: self.global_accuracy(),
            by_phase: [LearningPhase::Regex, LearningPhase::Template, LearningPhase::Ml]
                .into_iter()
                .map(|p| self.phase_accuracy(p))
                .collect(),
            by_store: self
                .state
                .stores
                .keys()
                .map(|s| self.store_report(s))
                .collect(),
            trend: self.trend(None, self.config.trend_window_days),
            projection: self
                .project_target_date(self.config.default_target_accuracy, None),
            needing_attention: self.needing_attention(),
        }
    }

    fn save(&self) -> Result<(), PersistError> {
        match &self.path {
            Some(path) => persist::save_json(path, &self.state),
            None => Ok(()),
        }
    }
}
