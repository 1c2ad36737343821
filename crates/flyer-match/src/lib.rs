//! # flyer-match
//!
//! Phase 3: ranks extracted deals against a product catalog. Scores come
//! from a ten-feature similarity vector, weighted heuristically until a
//! logistic classifier has been trained from user corrections.

pub mod classifier;
pub mod engine;
pub mod features;
pub mod strings;

pub use classifier::LogisticModel;
pub use engine::SimilarityMatcher;
