/// Extraction-layer errors. Parsing itself never fails — malformed input
/// yields an empty deal list — so these only surface when callers register
/// patterns or templates explicitly.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("no template registered for store '{store}'")]
    UnknownStore { store: String },
}
