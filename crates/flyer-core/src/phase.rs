use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::LearnError;

/// The three extraction/matching strategies, in increasing accuracy order.
///
/// Transitions are one-directional (Regex → Template → Ml) and only the
/// table in [`LearningPhase::next`] defines them; illegal jumps are
/// unrepresentable outside the learner's explicit `force_phase` escape
/// hatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LearningPhase {
    #[default]
    Regex,
    Template,
    Ml,
}

impl LearningPhase {
    /// Transition table. `None` means terminal.
    pub fn next(self) -> Option<LearningPhase> {
        match self {
            LearningPhase::Regex => Some(LearningPhase::Template),
            LearningPhase::Template => Some(LearningPhase::Ml),
            LearningPhase::Ml => None,
        }
    }

    /// Whether `from → to` is a legal forward transition.
    pub fn allows(from: LearningPhase, to: LearningPhase) -> bool {
        from.next() == Some(to)
    }

    /// External numbering: 1, 2, 3.
    pub fn as_number(self) -> u8 {
        match self {
            LearningPhase::Regex => 1,
            LearningPhase::Template => 2,
            LearningPhase::Ml => 3,
        }
    }

    /// Weight of the phase in combined-confidence blending.
    pub fn confidence_weight(self) -> f64 {
        match self {
            LearningPhase::Regex => 0.35,
            LearningPhase::Template => 0.55,
            LearningPhase::Ml => 0.75,
        }
    }

    /// Accuracy the phase is expected to reach before the next one makes
    /// sense.
    pub fn target_accuracy(self) -> f64 {
        match self {
            LearningPhase::Regex => 0.35,
            LearningPhase::Template => 0.55,
            LearningPhase::Ml => 0.80,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LearningPhase::Regex => "regex",
            LearningPhase::Template => "template",
            LearningPhase::Ml => "ml",
        }
    }
}

impl TryFrom<u8> for LearningPhase {
    type Error = LearnError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LearningPhase::Regex),
            2 => Ok(LearningPhase::Template),
            3 => Ok(LearningPhase::Ml),
            other => Err(LearnError::InvalidPhase { value: other }),
        }
    }
}

impl fmt::Display for LearningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phase {} ({})", self.as_number(), self.name())
    }
}
