/// Matching/training errors. Training failures are reported in status
/// objects by the learner, never raised past it.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("insufficient training data: need {needed} labeled examples, got {got}")]
    InsufficientTrainingData { needed: usize, got: usize },

    #[error("classifier backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("no trained model loaded")]
    NotTrained,
}
