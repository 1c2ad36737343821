//! Raw counters and per-store breakdowns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flyer_core::{DealType, LearningPhase};

/// Outcome counters for one slice of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub total_deals: u64,
    pub correct_matches: u64,
    pub incorrect_matches: u64,
    pub corrections_received: u64,
}

impl AccuracyMetrics {
    pub fn accuracy(&self) -> f64 {
        if self.total_deals == 0 {
            return 0.0;
        }
        self.correct_matches as f64 / self.total_deals as f64
    }

    pub fn correction_rate(&self) -> f64 {
        if self.total_deals == 0 {
            return 0.0;
        }
        self.corrections_received as f64 / self.total_deals as f64
    }

    pub fn record(&mut self, is_correct: bool) {
        self.total_deals += 1;
        if is_correct {
            self.correct_matches += 1;
        } else {
            self.incorrect_matches += 1;
        }
    }
}

/// One recorded matching outcome, kept for trend analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
    pub phase: u8,
    pub deal_type: DealType,
}

/// All accuracy state for one store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreAccuracy {
    pub store_name: String,
    pub overall: AccuracyMetrics,
    pub by_phase: BTreeMap<u8, AccuracyMetrics>,
    pub by_deal_type: BTreeMap<String, AccuracyMetrics>,
    /// Newest last, capped by the tracker's `history_cap`.
    pub history: Vec<HistoryEntry>,
}

impl StoreAccuracy {
    pub fn named(store: &str) -> Self {
        Self {
            store_name: store.to_string(),
            ..Self::default()
        }
    }

    pub fn add_result(
        &mut self,
        is_correct: bool,
        phase: LearningPhase,
        deal_type: DealType,
        timestamp: DateTime<Utc>,
        history_cap: usize,
    ) {
        self.overall.record(is_correct);

        self.by_phase
            .entry(phase.as_number())
            .or_default()
            .record(is_correct);
        self.by_deal_type
            .entry(deal_type.as_str().to_string())
            .or_default()
            .record(is_correct);

        self.history.push(HistoryEntry {
            timestamp,
            is_correct,
            phase: phase.as_number(),
            deal_type,
        });
        if self.history.len() > history_cap {
            let excess = self.history.len() - history_cap;
            self.history.drain(..excess);
        }
    }

    /// Corrections only bump counters for slices that already exist;
    /// a correction implies a prior recorded result.
    pub fn add_correction(&mut self, phase: LearningPhase, deal_type: DealType) {
        self.overall.corrections_received += 1;
        if let Some(m) = self.by_phase.get_mut(&phase.as_number()) {
            m.corrections_received += 1;
        }
        if let Some(m) = self.by_deal_type.get_mut(deal_type.as_str()) {
            m.corrections_received += 1;
        }
    }
}
