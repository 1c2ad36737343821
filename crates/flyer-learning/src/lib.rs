//! # flyer-learning
//!
//! The progressive learner: wires the regex extractor, template
//! extractor, similarity matcher, and accuracy tracker behind one
//! mutable facade. Every ad flows through [`ProgressiveLearner::process_ad`],
//! every user correction through [`ProgressiveLearner::learn_from_correction`],
//! and corrections are what move the learner from phase to phase.

mod correction;
mod engine;
mod state;

pub use correction::{CorrectionRequest, DealPatch};
pub use engine::ProgressiveLearner;
pub use state::LearnerState;
