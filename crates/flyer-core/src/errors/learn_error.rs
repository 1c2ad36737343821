/// Learner-boundary errors for inputs arriving from external callers.
#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    #[error("unrecognized deal type '{value}'")]
    UnknownDealType { value: String },

    #[error("invalid phase number {value}, expected 1..=3")]
    InvalidPhase { value: u8 },
}
