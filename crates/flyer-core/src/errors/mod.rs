mod extract_error;
mod learn_error;
mod match_error;
mod persist_error;

pub use extract_error::ExtractError;
pub use learn_error::LearnError;
pub use match_error::MatchError;
pub use persist_error::PersistError;

/// Top-level error for the flyerparse core.
#[derive(Debug, thiserror::Error)]
pub enum FlyerError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type FlyerResult<T> = Result<T, FlyerError>;
