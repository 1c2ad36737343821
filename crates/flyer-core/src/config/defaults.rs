//! Default values backing the config structs.

// Phase transition guards.
pub const MIN_ADS_FOR_TEMPLATE: u64 = 5;
pub const MIN_CORRECTIONS_FOR_TEMPLATE: u64 = 20;
pub const MIN_ADS_FOR_ML: u64 = 15;
pub const MIN_CORRECTIONS_FOR_ML: u64 = 50;
pub const MIN_ACCURACY_FOR_ML: f64 = 0.55;
pub const RETRAIN_THRESHOLD: u64 = 10;

// Extraction.
/// How far back (in chars) a product name may sit from its deal.
pub const MAX_PRODUCT_DISTANCE: usize = 100;
/// OCR fragments closer than this fraction of page height belong to the
/// same row. Empirically tuned, not an invariant.
pub const ROW_Y_PROXIMITY: f64 = 0.05;
pub const MAX_RAW_TEXT_LEN: usize = 100;
/// Plausible price bounds for learned-pattern captures.
pub const MIN_PLAUSIBLE_PRICE: f64 = 0.01;
pub const MAX_PLAUSIBLE_PRICE: f64 = 1000.0;

// Matching.
pub const CANDIDATE_LIMIT: usize = 50;
pub const CATEGORY_BACKFILL_THRESHOLD: usize = 10;
pub const TOP_K_MATCHES: usize = 3;
pub const MIN_TRAINING_EXAMPLES: usize = 10;
pub const VALIDATION_SPLIT: f64 = 0.2;
pub const TRAINING_EPOCHS: usize = 200;
pub const LEARNING_RATE: f64 = 0.1;

// Accuracy tracking.
pub const HISTORY_CAP: usize = 1000;
pub const TREND_WINDOW_DAYS: i64 = 7;
pub const PROJECTION_WINDOW_DAYS: i64 = 14;
pub const ATTENTION_MIN_SAMPLES: u64 = 10;
pub const ATTENTION_MIN_ACCURACY: f64 = 0.6;
pub const DEFAULT_TARGET_ACCURACY: f64 = 0.85;
