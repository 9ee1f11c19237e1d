//! The quest graph.
//!
//! A `Quest` owns its steps, the locations and minor characters its
//! payloads refer to by name, the journal, and the runtime progress of one
//! play-through. Authoring operations keep the graph consistent; runtime
//! operations are driven by the engine.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::error::QuestError;
use super::journal::Journal;
use super::reward::RewardKind;
use super::step::{LinkKind, QuestStep, StepProgress, StepState};
use crate::core::StepId;
use crate::store::{AttributeValue, Block};

/// Quest lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestState {
    #[default]
    Assigned,
    Active,
    Complete,
    Failed,
}

impl QuestState {
    pub const ALL: [QuestState; 4] = [
        QuestState::Assigned,
        QuestState::Active,
        QuestState::Complete,
        QuestState::Failed,
    ];

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, QuestState::Complete | QuestState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestState::Assigned => "Assigned",
            QuestState::Active => "Active",
            QuestState::Complete => "Complete",
            QuestState::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// A named place a quest refers to, satisfied by any of its candidate
/// clearings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLocation {
    pub name: String,
    pub candidates: Vec<String>,
}

impl QuestLocation {
    pub fn new(name: impl Into<String>, candidates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Is `clearing` one of this location's clearings? A location with no
    /// candidates names its clearing directly.
    #[must_use]
    pub fn contains(&self, clearing: &str) -> bool {
        if self.candidates.is_empty() {
            return self.name.eq_ignore_ascii_case(clearing);
        }
        self.candidates.iter().any(|c| c.eq_ignore_ascii_case(clearing))
    }
}

/// A quest-specific character granted and removed by rewards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestMinorCharacter {
    pub name: String,
    /// "this" attributes the live object starts with.
    pub attributes: Block,
}

impl QuestMinorCharacter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Block::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key, value.into());
        self
    }
}

/// A quest: step graph plus the state of one play-through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub description: String,
    pub state: QuestState,
    steps: Vec<QuestStep>,
    pub minor_characters: Vec<QuestMinorCharacter>,
    pub locations: Vec<QuestLocation>,
    pub journal: Journal,
    progress: FxHashMap<StepId, StepProgress>,
    rewarded: FxHashSet<StepId>,
    next_step: u32,
}

impl Quest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // === Steps ===

    #[must_use]
    pub fn steps(&self) -> &[QuestStep] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, id: StepId) -> Option<&QuestStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut QuestStep> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    #[must_use]
    pub fn step_index(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Find a step by name.
    #[must_use]
    pub fn step_named(&self, name: &str) -> Option<&QuestStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Append a new empty step and return its id.
    pub fn add_step(&mut self, name: impl Into<String>) -> StepId {
        let id = StepId::new(self.next_step);
        self.next_step += 1;
        self.steps.push(QuestStep::new(id, name));
        id
    }

    /// Append a prepared step, keeping its id.
    pub fn push_step(&mut self, step: QuestStep) -> Result<StepId, QuestError> {
        if self.step(step.id).is_some() {
            return Err(QuestError::DuplicateStep(step.id));
        }
        let id = step.id;
        self.next_step = self.next_step.max(id.raw() + 1);
        self.steps.push(step);
        Ok(id)
    }

    /// Remove a step and every reference to it.
    pub fn remove_step(&mut self, id: StepId) -> Option<QuestStep> {
        let index = self.step_index(id)?;
        let removed = self.steps.remove(index);
        for step in &mut self.steps {
            step.required_steps.retain(|s| *s != id);
            step.fail_steps.retain(|s| *s != id);
            step.preempted_steps.retain(|s| *s != id);
            for reward in &mut step.rewards {
                if let RewardKind::OfferNextStepChoice { steps } = &mut reward.kind {
                    steps.retain(|s| *s != id);
                }
            }
        }
        self.progress.remove(&id);
        self.rewarded.remove(&id);
        Some(removed)
    }

    /// Move a step to `index` in declaration order.
    pub fn move_step(&mut self, id: StepId, index: usize) -> bool {
        let Some(from) = self.step_index(id) else {
            return false;
        };
        let step = self.steps.remove(from);
        let to = index.min(self.steps.len());
        self.steps.insert(to, step);
        true
    }

    /// Make `step` reference `predecessor` in the given set.
    ///
    /// A step may reference a given predecessor in only one set.
    pub fn link(&mut self, step: StepId, predecessor: StepId, kind: LinkKind) -> Result<(), QuestError> {
        if step == predecessor {
            return Err(QuestError::SelfReference(step));
        }
        if self.step(predecessor).is_none() {
            return Err(QuestError::UnknownStep {
                step,
                missing: predecessor,
            });
        }
        let Some(target) = self.step_mut(step) else {
            return Err(QuestError::UnknownStep {
                step: predecessor,
                missing: step,
            });
        };
        match target.link_to(predecessor) {
            Some(existing) if existing == kind => Ok(()),
            Some(_) => Err(QuestError::ExclusivityViolation { step, predecessor }),
            None => {
                target.links_mut(kind).push(predecessor);
                Ok(())
            }
        }
    }

    /// Remove any link from `step` to `predecessor`.
    pub fn unlink(&mut self, step: StepId, predecessor: StepId) -> bool {
        let Some(target) = self.step_mut(step) else {
            return false;
        };
        let Some(kind) = target.link_to(predecessor) else {
            return false;
        };
        target.links_mut(kind).retain(|s| *s != predecessor);
        true
    }

    /// Check the graph: unique ids, no self links, no links to unknown
    /// steps, and at most one link per ordered pair.
    pub fn validate(&self) -> Result<(), QuestError> {
        let mut seen = FxHashSet::default();
        for step in &self.steps {
            if !seen.insert(step.id) {
                return Err(QuestError::DuplicateStep(step.id));
            }
        }

        for step in &self.steps {
            let mut linked = FxHashSet::default();
            for (_, predecessor) in step.all_links() {
                if predecessor == step.id {
                    return Err(QuestError::SelfReference(step.id));
                }
                if !seen.contains(&predecessor) {
                    return Err(QuestError::UnknownStep {
                        step: step.id,
                        missing: predecessor,
                    });
                }
                if !linked.insert(predecessor) {
                    return Err(QuestError::ExclusivityViolation {
                        step: step.id,
                        predecessor,
                    });
                }
            }

            for reward in &step.rewards {
                if let RewardKind::OfferNextStepChoice { steps } = &reward.kind {
                    if let Some(&missing) = steps.iter().find(|s| !seen.contains(*s)) {
                        return Err(QuestError::UnknownStep {
                            step: step.id,
                            missing,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // === Referenced content ===

    #[must_use]
    pub fn location(&self, name: &str) -> Option<&QuestLocation> {
        self.locations.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn minor_character(&self, name: &str) -> Option<&QuestMinorCharacter> {
        self.minor_characters.iter().find(|m| m.name == name)
    }

    /// Does any step wait for activation?
    #[must_use]
    pub fn has_active_requirement(&self) -> bool {
        self.steps.iter().any(QuestStep::has_active_requirement)
    }

    // === Play-through ===

    #[must_use]
    pub fn progress(&self, id: StepId) -> StepProgress {
        self.progress.get(&id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn step_state(&self, id: StepId) -> StepState {
        self.progress(id).state
    }

    pub(crate) fn set_progress(&mut self, id: StepId, progress: StepProgress) {
        self.progress.insert(id, progress);
    }

    #[must_use]
    pub fn is_rewarded(&self, id: StepId) -> bool {
        self.rewarded.contains(&id)
    }

    /// Record that a step's rewards were applied. Returns `false` if they
    /// already had been.
    pub(crate) fn mark_rewarded(&mut self, id: StepId) -> bool {
        self.rewarded.insert(id)
    }

    /// Rewarded steps, in declaration order.
    pub fn rewarded_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().map(|s| s.id).filter(|id| self.rewarded.contains(id))
    }

    /// Start a fresh play-through. The journal is kept.
    pub fn reset(&mut self) {
        self.state = QuestState::Assigned;
        self.progress.clear();
        self.rewarded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::reward::Reward;

    fn three_steps() -> (Quest, StepId, StepId, StepId) {
        let mut quest = Quest::new("Escort");
        let a = quest.add_step("Meet");
        let b = quest.add_step("Travel");
        let c = quest.add_step("Arrive");
        (quest, a, b, c)
    }

    #[test]
    fn test_link_exclusivity() {
        let (mut quest, a, b, _) = three_steps();
        quest.link(b, a, LinkKind::Required).unwrap();
        quest.link(b, a, LinkKind::Required).unwrap();
        assert_eq!(quest.step(b).unwrap().required_steps.len(), 1);

        assert_eq!(
            quest.link(b, a, LinkKind::Fail),
            Err(QuestError::ExclusivityViolation { step: b, predecessor: a })
        );
        assert_eq!(quest.link(a, a, LinkKind::Fail), Err(QuestError::SelfReference(a)));
        assert!(quest.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_hand_edited_graphs() {
        let (mut quest, a, b, _) = three_steps();
        let step = quest.step_mut(b).unwrap();
        step.required_steps.push(a);
        step.preempted_steps.push(a);
        assert!(matches!(quest.validate(), Err(QuestError::ExclusivityViolation { .. })));

        let (mut quest, _, b, _) = three_steps();
        quest.step_mut(b).unwrap().fail_steps.push(StepId(40));
        assert_eq!(
            quest.validate(),
            Err(QuestError::UnknownStep { step: b, missing: StepId(40) })
        );
    }

    #[test]
    fn test_remove_step_strips_references() {
        let (mut quest, a, b, c) = three_steps();
        quest.link(b, a, LinkKind::Required).unwrap();
        quest.link(c, a, LinkKind::Preempted).unwrap();
        quest.step_mut(b).unwrap().rewards.push(Reward::new(RewardKind::OfferNextStepChoice {
            steps: vec![a, c],
        }));

        quest.remove_step(a).unwrap();
        assert!(quest.validate().is_ok());
        assert!(quest.step(b).unwrap().required_steps.is_empty());
        assert!(quest.step(c).unwrap().preempted_steps.is_empty());
    }

    #[test]
    fn test_move_step() {
        let (mut quest, a, _, c) = three_steps();
        assert!(quest.move_step(c, 0));
        assert_eq!(quest.steps()[0].id, c);
        assert!(quest.move_step(c, 99));
        assert_eq!(quest.steps()[2].id, c);
        assert_eq!(quest.steps()[0].id, a);
    }

    #[test]
    fn test_push_step_keeps_ids_unique() {
        let (mut quest, a, _, _) = three_steps();
        assert_eq!(
            quest.push_step(QuestStep::new(a, "dup")),
            Err(QuestError::DuplicateStep(a))
        );
        quest.push_step(QuestStep::new(StepId(10), "late")).unwrap();
        assert_eq!(quest.add_step("next"), StepId(11));
    }

    #[test]
    fn test_reset_keeps_journal() {
        use crate::quest::journal::{JournalEntry, JournalKind};

        let (mut quest, a, _, _) = three_steps();
        quest.state = QuestState::Active;
        quest.mark_rewarded(a);
        quest.journal.append(JournalEntry::new("Meet", "", JournalKind::Finished));

        quest.reset();
        assert_eq!(quest.state, QuestState::Assigned);
        assert!(!quest.is_rewarded(a));
        assert_eq!(quest.journal.len(), 1);
    }

    #[test]
    fn test_location_candidates() {
        let lair = QuestLocation::new("Lair", ["Cave 4", "Cave 6"]);
        assert!(lair.contains("cave 6"));
        assert!(!lair.contains("Lair"));
        let named: QuestLocation = QuestLocation::new("Woods 2", Vec::<String>::new());
        assert!(named.contains("Woods 2"));
    }
}
