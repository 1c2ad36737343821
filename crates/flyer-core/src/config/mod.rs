pub mod defaults;

mod extract_config;
mod match_config;
mod phase_config;
mod tracker_config;

pub use extract_config::ExtractConfig;
pub use match_config::MatchConfig;
pub use phase_config::PhaseConfig;
pub use tracker_config::TrackerConfig;

use serde::{Deserialize, Serialize};

/// Aggregated configuration for the whole core. Callers construct it
/// (usually from `Default`) and hand it to the learner; the core never
/// reads process-wide globals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerConfig {
    pub phase: PhaseConfig,
    pub extract: ExtractConfig,
    pub matching: MatchConfig,
    pub tracker: TrackerConfig,
}
