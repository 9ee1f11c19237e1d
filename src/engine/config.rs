//! Quest engine configuration.

use serde::{Deserialize, Serialize};

use crate::quest::reward::DEFAULT_GROUP;

/// Quest engine configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Activate on reset when no step waits for an Active requirement.
    pub auto_activate: bool,

    /// Reward group applied to every completed step.
    pub default_reward_group: String,

    /// Evaluation passes per call (0 = number of steps + 1).
    pub max_passes: usize,

    /// Write a Pending journal entry when a step becomes reachable.
    pub journal_on_activation: bool,

    /// Seed for the game RNG when the engine builds a context itself.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_activate: true,
            default_reward_group: DEFAULT_GROUP.to_string(),
            max_passes: 0,
            journal_on_activation: true,
            rng_seed: 42,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_auto_activate(mut self, on: bool) -> Self {
        self.auto_activate = on;
        self
    }

    #[must_use]
    pub fn with_default_reward_group(mut self, group: impl Into<String>) -> Self {
        self.default_reward_group = group.into();
        self
    }

    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    #[must_use]
    pub fn with_journal_on_activation(mut self, on: bool) -> Self {
        self.journal_on_activation = on;
        self
    }

    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Pass cap for a quest with `steps` steps.
    #[must_use]
    pub fn pass_limit(&self, steps: usize) -> usize {
        if self.max_passes == 0 {
            steps + 1
        } else {
            self.max_passes
        }
    }
}
