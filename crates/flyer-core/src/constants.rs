/// Core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Artifact file names inside the configured data directory.
pub const TEMPLATES_FILE: &str = "templates.json";
pub const ACCURACY_FILE: &str = "accuracy.json";
pub const MODEL_FILE: &str = "match_model.json";
pub const LEARNER_STATE_FILE: &str = "learner_state.json";
pub const TRAINING_BUFFER_FILE: &str = "training_buffer.json";
pub const CORRECTIONS_FILE: &str = "corrections.json";

/// Length of the match feature vector.
pub const FEATURE_COUNT: usize = 10;

/// Store key used when the caller supplies no hint.
pub const UNKNOWN_STORE: &str = "unknown";

/// Two prices within this are the same deal for merge purposes.
pub const PRICE_EPSILON: f64 = 0.01;
