pub mod accuracy;
pub mod correction;
pub mod matching;
pub mod processing;
pub mod stats;
pub mod training;

pub use accuracy::{
    AccuracyReport, AttentionItem, AttentionReason, DailyAccuracy, GlobalAccuracy, MetricsSlice,
    PhaseAccuracy, ProjectionOutcome, StoreReport, TargetProjection, TrendDirection, TrendReport,
};
pub use correction::{CorrectionAction, CorrectionOutcome, CorrectionRecord, RetrainStatus};
pub use matching::ProductMatch;
pub use processing::{ProcessingResult, ProcessingSummary};
pub use stats::{LearnerStats, PhaseReadiness};
pub use training::{TrainingExample, TrainingReport};
