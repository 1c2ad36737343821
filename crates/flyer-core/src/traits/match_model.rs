/// Capability-checked classifier strategy.
///
/// A model is either present and trained or absent; the matcher holds an
/// `Option` of one and falls back to fixed heuristic weights when it is
/// absent. No scattered null checks.
pub trait MatchModel: Send + Sync {
    /// Positive-class probability for one feature vector.
    fn predict(&self, features: &[f64]) -> f64;

    /// The feature ordering the model was trained with.
    fn feature_names(&self) -> &[String];
}
