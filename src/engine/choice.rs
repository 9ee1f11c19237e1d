//! Player decisions the engine cannot make itself.
//!
//! Rewards may be split into groups the player picks between, and an
//! `OfferNextStepChoice` reward lets the player pick which branch of the
//! quest to follow. Frontends implement `ChoiceProvider` to ask the
//! player; the engine only calls it synchronously while applying rewards.

use std::collections::VecDeque;

use crate::core::StepId;
use crate::quest::Quest;

/// Answers choices raised while a step's rewards are applied.
///
/// ## Implementation Notes
///
/// - Returning `None` from `choose_group` applies only the default group.
/// - Returning `None` from `choose_step` leaves every offered step open.
/// - Answers outside the offered options are ignored by the engine.
pub trait ChoiceProvider {
    /// Pick one optional reward group of `step`.
    fn choose_group(&mut self, quest: &Quest, step: StepId, groups: &[String]) -> Option<String>;

    /// Pick one of the offered steps; the others are skipped.
    fn choose_step(&mut self, quest: &Quest, offered: &[StepId]) -> Option<StepId>;
}

/// Always takes the first option.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoice;

impl ChoiceProvider for FirstChoice {
    fn choose_group(&mut self, _quest: &Quest, _step: StepId, groups: &[String]) -> Option<String> {
        groups.first().cloned()
    }

    fn choose_step(&mut self, _quest: &Quest, offered: &[StepId]) -> Option<StepId> {
        offered.first().copied()
    }
}

/// Replays prepared answers in order, then declines.
///
/// Useful for tests and for replaying a recorded play-through.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChoices {
    groups: VecDeque<String>,
    steps: VecDeque<StepId>,
}

impl ScriptedChoices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a group answer (builder pattern).
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push_back(group.into());
        self
    }

    /// Queue a step answer (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: StepId) -> Self {
        self.steps.push_back(step);
        self
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.groups.len() + self.steps.len()
    }
}

impl ChoiceProvider for ScriptedChoices {
    fn choose_group(&mut self, _quest: &Quest, _step: StepId, groups: &[String]) -> Option<String> {
        if groups.is_empty() {
            return None;
        }
        self.groups.pop_front()
    }

    fn choose_step(&mut self, _quest: &Quest, offered: &[StepId]) -> Option<StepId> {
        if offered.is_empty() {
            return None;
        }
        self.steps.pop_front()
    }
}
