/// Artifact persistence errors. Load failures at startup are downgraded to
/// warnings by `persist::load_json_or_default`; save failures propagate.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed JSON in {path}: {message}")]
    Malformed { path: String, message: String },
}
