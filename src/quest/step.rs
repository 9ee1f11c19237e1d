//! Quest steps and their runtime progress.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::requirement::{Requirement, RequirementKind};
use super::reward::Reward;
use crate::core::StepId;

/// How a set of booleans combines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicType {
    #[default]
    And,
    Or,
}

impl LogicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicType::And => "And",
            LogicType::Or => "Or",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Some(LogicType::And),
            "or" => Some(LogicType::Or),
            _ => None,
        }
    }

    /// Combine a sequence. An empty `And` is true; an empty `Or` is false.
    pub fn combine(self, mut values: impl Iterator<Item = bool>) -> bool {
        match self {
            LogicType::And => values.all(|v| v),
            LogicType::Or => values.any(|v| v),
        }
    }
}

/// Which predecessor set a link goes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// The predecessor must complete before this step is reachable.
    Required,
    /// The predecessor completing fails this step.
    Fail,
    /// The predecessor completing skips this step.
    Preempted,
}

pub type StepLinks = SmallVec<[StepId; 4]>;

/// One node of the step graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStep {
    pub id: StepId,
    pub name: String,
    pub description: String,
    /// How `required_steps` combine.
    pub logic_type: LogicType,
    /// How `requirements` combine.
    pub req_type: LogicType,
    pub requirements: Vec<Requirement>,
    pub rewards: Vec<Reward>,
    pub required_steps: StepLinks,
    pub fail_steps: StepLinks,
    pub preempted_steps: StepLinks,
}

impl QuestStep {
    /// Create an empty step.
    pub fn new(id: StepId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            logic_type: LogicType::And,
            req_type: LogicType::And,
            requirements: Vec::new(),
            rewards: Vec::new(),
            required_steps: StepLinks::new(),
            fail_steps: StepLinks::new(),
            preempted_steps: StepLinks::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_logic(mut self, logic: LogicType) -> Self {
        self.logic_type = logic;
        self
    }

    #[must_use]
    pub fn with_req_type(mut self, req_type: LogicType) -> Self {
        self.req_type = req_type;
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.rewards.push(reward);
        self
    }

    /// Does any requirement wait for quest activation?
    #[must_use]
    pub fn has_active_requirement(&self) -> bool {
        self.requirements
            .iter()
            .any(|r| matches!(r.kind, RequirementKind::Active))
    }

    #[must_use]
    pub fn links(&self, kind: LinkKind) -> &StepLinks {
        match kind {
            LinkKind::Required => &self.required_steps,
            LinkKind::Fail => &self.fail_steps,
            LinkKind::Preempted => &self.preempted_steps,
        }
    }

    pub fn links_mut(&mut self, kind: LinkKind) -> &mut StepLinks {
        match kind {
            LinkKind::Required => &mut self.required_steps,
            LinkKind::Fail => &mut self.fail_steps,
            LinkKind::Preempted => &mut self.preempted_steps,
        }
    }

    /// Which set, if any, references `other`.
    #[must_use]
    pub fn link_to(&self, other: StepId) -> Option<LinkKind> {
        [LinkKind::Required, LinkKind::Fail, LinkKind::Preempted]
            .into_iter()
            .find(|&k| self.links(k).contains(&other))
    }

    /// Every referenced predecessor, with the set it is in.
    pub fn all_links(&self) -> impl Iterator<Item = (LinkKind, StepId)> + '_ {
        let tag = |kind: LinkKind, ids: &StepLinks| ids.iter().map(move |&id| (kind, id)).collect::<Vec<_>>();
        tag(LinkKind::Required, &self.required_steps)
            .into_iter()
            .chain(tag(LinkKind::Fail, &self.fail_steps))
            .chain(tag(LinkKind::Preempted, &self.preempted_steps))
    }

    /// Distinct reward groups other than `default_group`, in first-seen order.
    #[must_use]
    pub fn optional_groups(&self, default_group: &str) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        for reward in &self.rewards {
            if reward.group != default_group && !groups.contains(&reward.group) {
                groups.push(reward.group.clone());
            }
        }
        groups
    }
}

/// Runtime status of a step within one play-through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepState {
    /// Not yet reachable.
    #[default]
    Inactive,
    /// Reachable, requirements not yet met.
    Active,
    Complete,
    Failed,
    /// Removed from consideration by a preempting step or a choice.
    Skipped,
}

impl StepState {
    pub const ALL: [StepState; 5] = [
        StepState::Inactive,
        StepState::Active,
        StepState::Complete,
        StepState::Failed,
        StepState::Skipped,
    ];

    /// Complete, Failed and Skipped steps are never evaluated again.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, StepState::Complete | StepState::Failed | StepState::Skipped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Inactive => "Inactive",
            StepState::Active => "Active",
            StepState::Complete => "Complete",
            StepState::Failed => "Failed",
            StepState::Skipped => "Skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Per-step runtime record.
///
/// Baselines are captured when the step becomes reachable so that
/// step-scoped requirements only count what happened afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub state: StepState,
    /// Game day on which the step became reachable.
    pub started_day: Option<u32>,
    /// Length of the character's kill log at that moment.
    pub kill_baseline: usize,
    /// Length of the character's move log at that moment.
    pub move_baseline: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_combinations() {
        assert!(LogicType::And.combine(std::iter::empty()));
        assert!(!LogicType::Or.combine(std::iter::empty()));
        assert!(LogicType::Or.combine([false, true].into_iter()));
        assert!(!LogicType::And.combine([true, false].into_iter()));
    }

    #[test]
    fn test_link_lookup() {
        let mut step = QuestStep::new(StepId(2), "Return");
        step.required_steps.push(StepId(0));
        step.fail_steps.push(StepId(1));

        assert_eq!(step.link_to(StepId(0)), Some(LinkKind::Required));
        assert_eq!(step.link_to(StepId(1)), Some(LinkKind::Fail));
        assert_eq!(step.link_to(StepId(5)), None);
        assert_eq!(step.all_links().count(), 2);
    }

    #[test]
    fn test_settled_states() {
        assert!(!StepState::Inactive.is_settled());
        assert!(!StepState::Active.is_settled());
        assert!(StepState::Skipped.is_settled());
        assert_eq!(StepState::parse("complete"), Some(StepState::Complete));
    }
}
