//! Logistic-regression match classifier.
//!
//! Trained by batch gradient descent on correction-derived examples and
//! persisted as a plain JSON artifact, so a saved model is readable and
//! diffable. Feature order is fixed by [`crate::features::FEATURE_NAMES`].

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use flyer_core::config::MatchConfig;
use flyer_core::errors::MatchError;
use flyer_core::models::{TrainingExample, TrainingReport};
use flyer_core::traits::MatchModel;

use crate::features;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub feature_names: Vec<String>,
}

impl MatchModel for LogisticModel {
    fn predict(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Train a model from labeled examples. Shuffles, holds out the
/// configured validation fraction, and reports accuracy on both splits.
pub fn train(
    examples: &[TrainingExample],
    config: &MatchConfig,
) -> Result<(LogisticModel, TrainingReport), MatchError> {
    if examples.len() < config.min_training_examples {
        return Err(MatchError::InsufficientTrainingData {
            needed: config.min_training_examples,
            got: examples.len(),
        });
    }

    let data: Vec<(Vec<f64>, f64)> = examples
        .iter()
        .map(|ex| {
            let x = features::feature_vector(&ex.deal, &ex.product);
            (x, if ex.is_match { 1.0 } else { 0.0 })
        })
        .collect();

    let mut indices: Vec<usize> = (0..data.len()).collect();
    indices.shuffle(&mut rand::thread_rng());

    let n_val = (data.len() as f64 * config.validation_split) as usize;
    let (val_idx, train_idx) = indices.split_at(n_val);

    let mut weights = vec![0.0; features::FEATURE_NAMES.len()];
    let mut bias = 0.0;
    let n = train_idx.len() as f64;

    for _ in 0..config.training_epochs {
        let mut grad_w = vec![0.0; weights.len()];
        let mut grad_b = 0.0;
        for &i in train_idx {
            let (x, y) = &data[i];
            let pred = sigmoid(
                weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>() + bias,
            );
            let err = pred - y;
            for (g, v) in grad_w.iter_mut().zip(x.iter()) {
                *g += err * v;
            }
            grad_b += err;
        }
        for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
            *w -= config.learning_rate * g / n;
        }
        bias -= config.learning_rate * grad_b / n;
    }

    let model = LogisticModel {
        weights,
        bias,
        feature_names: features::feature_names(),
    };

    let accuracy_on = |idx: &[usize]| -> f64 {
        if idx.is_empty() {
            return 0.0;
        }
        let correct = idx
            .iter()
            .filter(|&&i| {
                let (x, y) = &data[i];
                (model.predict(x) >= 0.5) == (*y >= 0.5)
            })
            .count();
        correct as f64 / idx.len() as f64
    };

    let train_accuracy = accuracy_on(train_idx);
    let validation_accuracy = if val_idx.is_empty() {
        train_accuracy
    } else {
        accuracy_on(val_idx)
    };

    // Importance as normalized absolute weight.
    let total: f64 = model.weights.iter().map(|w| w.abs()).sum();
    let feature_importance: Vec<(String, f64)> = model
        .feature_names
        .iter()
        .zip(model.weights.iter())
        .map(|(name, w)| {
            let share = if total > 0.0 {
                w.abs() / total
            } else {
                1.0 / model.weights.len() as f64
            };
            (name.clone(), share)
        })
        .collect();

    let report = TrainingReport {
        train_accuracy,
        validation_accuracy,
        samples_trained: train_idx.len(),
        samples_validated: val_idx.len(),
        feature_importance,
    };

    info!(
        samples = examples.len(),
        train_accuracy, validation_accuracy, "classifier trained"
    );
    Ok((model, report))
}
