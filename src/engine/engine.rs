//! The quest state machine.
//!
//! A `QuestEngine` owns one quest's play-through and advances it when the
//! game reports events. Evaluation runs in passes: each pass walks the
//! steps in declaration order, settles failed and preempted steps, opens
//! newly reachable ones, and completes the ones whose requirements hold.
//! Passes repeat while something changes, up to the configured cap.
//!
//! ## Exactly-once rewards
//!
//! A step's rewards are applied the first time it is found satisfied and
//! the step is recorded as rewarded before any reward runs. Re-evaluating
//! with the same event never applies them again.
//!
//! ## Several quests, one character
//!
//! `report_event` writes the event onto the character before evaluating.
//! When a character carries several quests, call [`record_event`] once and
//! then `test_requirements` on each engine, so the event is recorded once.

use tracing::{debug, info};

use super::choice::{ChoiceProvider, FirstChoice};
use super::config::EngineConfig;
use super::context::{keys, GameContext};
use super::event::{EventKind, QuestEvent, TradeAction};
use crate::core::{GameRng, ObjectId, StepId};
use crate::quest::{
    EvalContext, JournalEntry, JournalKind, Quest, QuestError, QuestState, RewardContext,
    RewardOutcome, StepProgress, StepState,
};
use crate::store::{GameData, StoreError, THIS};

/// What one pass changed.
#[derive(Clone, Copy, Debug, Default)]
struct Pass {
    changed: bool,
    reset_requested: bool,
}

/// Where a step stands before its requirements are looked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gate {
    /// Settled, or not evaluated while the quest is Assigned.
    Ignore,
    /// A fail step is Complete.
    Fail,
    /// A preempting step is Complete.
    Preempt,
    /// Predecessors not Complete yet.
    Blocked,
    /// Reachable.
    Open,
}

/// Drives one quest through a play-through.
pub struct QuestEngine {
    quest: Quest,
    config: EngineConfig,
    choices: Box<dyn ChoiceProvider>,
}

impl std::fmt::Debug for QuestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestEngine")
            .field("quest", &self.quest.name)
            .field("state", &self.quest.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QuestEngine {
    /// Create an engine for a quest, checking its step graph.
    pub fn new(quest: Quest) -> Result<Self, QuestError> {
        quest.validate()?;
        Ok(Self {
            quest,
            config: EngineConfig::default(),
            choices: Box::new(FirstChoice),
        })
    }

    /// Set the configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set who answers reward choices (builder pattern).
    #[must_use]
    pub fn with_choices(mut self, choices: impl ChoiceProvider + 'static) -> Self {
        self.choices = Box::new(choices);
        self
    }

    #[must_use]
    pub fn quest(&self) -> &Quest {
        &self.quest
    }

    /// Mutable access for authoring tools. Changing the step graph
    /// mid-play is allowed but not re-validated.
    pub fn quest_mut(&mut self) -> &mut Quest {
        &mut self.quest
    }

    #[must_use]
    pub fn into_quest(self) -> Quest {
        self.quest
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A game context over `data` with the configured RNG seed.
    #[must_use]
    pub fn new_context(&self, data: GameData) -> GameContext {
        GameContext::new(data).with_rng(GameRng::new(self.config.rng_seed))
    }

    /// Append a journal entry. Allowed in every state.
    pub fn append_journal(&mut self, entry: JournalEntry) {
        self.quest.journal.append(entry);
    }

    // === Lifecycle ===

    /// Start a fresh play-through.
    ///
    /// Progress and granted rewards are cleared; the journal is kept. The
    /// quest becomes Active at once unless a step waits for activation or
    /// auto-activation is off.
    pub fn reset(&mut self) {
        self.quest.reset();
        info!(quest = %self.quest.name, "quest reset");
        if self.config.auto_activate && !self.quest.has_active_requirement() {
            self.set_state(QuestState::Active);
        }
    }

    /// Activate the quest and evaluate it against an `Activate` event.
    pub fn activate(&mut self, ctx: &mut GameContext, character: ObjectId) -> Result<bool, QuestError> {
        if self.quest.state.is_terminal() {
            return Ok(false);
        }
        let activated = self.quest.state == QuestState::Assigned;
        self.set_state(QuestState::Active);
        let changed = self.test_requirements(ctx, &QuestEvent::activate(), character)?;
        Ok(activated || changed)
    }

    /// Record `event` onto the character, then evaluate the quest.
    pub fn report_event(
        &mut self,
        ctx: &mut GameContext,
        event: &QuestEvent,
        character: ObjectId,
    ) -> Result<bool, QuestError> {
        record_event(ctx, event, character)?;
        self.test_requirements(ctx, event, character)
    }

    // === Evaluation ===

    /// Re-evaluate every pending step against `event`.
    ///
    /// Returns whether any step changed status. A terminal quest is left
    /// alone and reports no change.
    pub fn test_requirements(
        &mut self,
        ctx: &mut GameContext,
        event: &QuestEvent,
        character: ObjectId,
    ) -> Result<bool, QuestError> {
        if self.quest.state.is_terminal() {
            debug!(quest = %self.quest.name, state = self.quest.state.as_str(), "quest is settled; ignoring event");
            return Ok(false);
        }
        if !ctx.data.contains(character) {
            return Err(StoreError::UnknownObject(character).into());
        }

        let limit = self.config.pass_limit(self.quest.steps().len());
        let mut changed = false;
        for pass in 0..limit {
            let result = self.run_pass(ctx, event, character)?;
            changed |= result.changed;
            if result.reset_requested {
                self.reset();
                break;
            }
            if !result.changed || self.quest.state.is_terminal() {
                break;
            }
            if pass + 1 == limit {
                debug!(quest = %self.quest.name, limit, "pass limit reached");
            }
        }
        Ok(changed)
    }

    fn run_pass(
        &mut self,
        ctx: &mut GameContext,
        event: &QuestEvent,
        character: ObjectId,
    ) -> Result<Pass, QuestError> {
        let mut pass = Pass::default();
        let ids: Vec<StepId> = self.quest.steps().iter().map(|s| s.id).collect();

        for id in ids {
            if self.quest.state.is_terminal() || pass.reset_requested {
                break;
            }
            match self.gate(id) {
                Gate::Ignore | Gate::Blocked => continue,
                Gate::Fail => {
                    self.settle(id, StepState::Failed);
                    pass.changed = true;
                    continue;
                }
                Gate::Preempt => {
                    self.settle(id, StepState::Skipped);
                    pass.changed = true;
                    continue;
                }
                Gate::Open => {}
            }

            let mut progress = self.quest.progress(id);
            if progress.state == StepState::Inactive {
                progress = self.open_step(ctx, character, id)?;
                pass.changed = true;
            }

            if !self.is_satisfied(ctx, event, character, id, progress)? {
                continue;
            }

            self.settle(id, StepState::Complete);
            pass.changed = true;
            if !self.quest.mark_rewarded(id) {
                continue;
            }
            let outcome = self.grant_rewards(ctx, character, id)?;
            for skipped in outcome.skipped {
                if !self.quest.step_state(skipped).is_settled() {
                    self.settle(skipped, StepState::Skipped);
                }
            }
            pass.reset_requested |= outcome.reset_requested;
        }
        Ok(pass)
    }

    fn gate(&self, id: StepId) -> Gate {
        let Some(step) = self.quest.step(id) else {
            return Gate::Ignore;
        };
        if self.quest.step_state(id).is_settled() {
            return Gate::Ignore;
        }
        if self.quest.state == QuestState::Assigned && !step.has_active_requirement() {
            return Gate::Ignore;
        }

        let complete = |s: &StepId| self.quest.step_state(*s) == StepState::Complete;
        if step.fail_steps.iter().any(complete) {
            return Gate::Fail;
        }
        if step.preempted_steps.iter().any(complete) {
            return Gate::Preempt;
        }
        let reachable = step.required_steps.is_empty()
            || step.logic_type.combine(step.required_steps.iter().map(complete));
        if reachable {
            Gate::Open
        } else {
            Gate::Blocked
        }
    }

    fn is_satisfied(
        &self,
        ctx: &GameContext,
        event: &QuestEvent,
        character: ObjectId,
        id: StepId,
        progress: StepProgress,
    ) -> Result<bool, QuestError> {
        let Some(step) = self.quest.step(id) else {
            return Ok(false);
        };
        let character = ctx
            .data
            .object(character)
            .ok_or(StoreError::UnknownObject(character))?;
        let eval = EvalContext {
            game: ctx,
            event,
            character,
            quest: &self.quest,
            progress,
        };
        let satisfied = step
            .req_type
            .combine(step.requirements.iter().map(|r| r.test(&eval)));
        debug!(step = %id, name = %step.name, satisfied, "evaluated step");
        Ok(satisfied)
    }

    /// Make a step Active, capturing its baselines.
    fn open_step(
        &mut self,
        ctx: &GameContext,
        character: ObjectId,
        id: StepId,
    ) -> Result<StepProgress, QuestError> {
        let character = ctx
            .data
            .object(character)
            .ok_or(StoreError::UnknownObject(character))?;
        let progress = StepProgress {
            state: StepState::Active,
            started_day: Some(ctx.clock.day),
            kill_baseline: character.list(THIS, keys::KILL_LOG).len(),
            move_baseline: character.list(THIS, keys::MOVE_LOG).len(),
        };
        self.quest.set_progress(id, progress);
        debug!(step = %id, day = ctx.clock.day, "step reachable");
        if self.config.journal_on_activation {
            self.journal(id, JournalKind::Pending);
        }
        Ok(progress)
    }

    /// Apply the default group and the chosen optional group, in list order.
    fn grant_rewards(
        &mut self,
        ctx: &mut GameContext,
        character: ObjectId,
        id: StepId,
    ) -> Result<RewardOutcome, QuestError> {
        let mut outcome = RewardOutcome::default();
        let Some(step) = self.quest.step(id) else {
            return Ok(outcome);
        };
        let default_group = self.config.default_reward_group.as_str();
        let groups = step.optional_groups(default_group);
        let chosen = if groups.is_empty() {
            None
        } else {
            self.choices
                .choose_group(&self.quest, id, &groups)
                .filter(|g| groups.contains(g))
        };
        let rewards: Vec<_> = step
            .rewards
            .iter()
            .filter(|r| r.group == default_group || Some(&r.group) == chosen.as_ref())
            .cloned()
            .collect();

        let before = self.quest.state;
        for reward in &rewards {
            let mut rctx = RewardContext {
                game: &mut *ctx,
                character,
                quest: &mut self.quest,
                step: id,
                choices: &mut *self.choices,
                outcome: &mut outcome,
            };
            reward.apply(&mut rctx)?;
        }
        if self.quest.state != before {
            info!(
                quest = %self.quest.name,
                from = before.as_str(),
                to = self.quest.state.as_str(),
                step = %id,
                "quest state changed by reward"
            );
        }
        Ok(outcome)
    }

    fn settle(&mut self, id: StepId, state: StepState) {
        let mut progress = self.quest.progress(id);
        progress.state = state;
        self.quest.set_progress(id, progress);
        debug!(step = %id, state = state.as_str(), "step settled");
        let kind = match state {
            StepState::Complete => JournalKind::Finished,
            StepState::Failed | StepState::Skipped => JournalKind::Failed,
            StepState::Inactive | StepState::Active => JournalKind::Pending,
        };
        self.journal(id, kind);
    }

    fn journal(&mut self, id: StepId, kind: JournalKind) {
        if let Some(step) = self.quest.step(id) {
            let entry = JournalEntry::new(step.name.clone(), step.description.clone(), kind);
            self.quest.journal.append(entry);
        }
    }

    fn set_state(&mut self, state: QuestState) {
        if self.quest.state != state {
            info!(
                quest = %self.quest.name,
                from = self.quest.state.as_str(),
                to = state.as_str(),
                "quest state changed"
            );
            self.quest.state = state;
        }
    }
}

/// Write what an event did onto the character and the clock.
///
/// Kills and moves are logged so step-scoped requirements can count from a
/// baseline; arrivals update the current clearing; time and phase events
/// advance the clock.
pub fn record_event(ctx: &mut GameContext, event: &QuestEvent, character: ObjectId) -> Result<(), QuestError> {
    match event.kind {
        EventKind::TimePassed => {
            ctx.clock.advance_days(u32::try_from(event.count).unwrap_or(0));
            return Ok(());
        }
        EventKind::PhaseChange => {
            if let Some(phase) = event.phase {
                ctx.clock.phase = phase;
            }
            return Ok(());
        }
        _ => {}
    }

    let known = |key: &str| {
        ctx.data
            .object(character)
            .is_some_and(|o| o.list(THIS, key).iter().any(|k| k == event.name()))
    };
    let discovered = known(keys::DISCOVERIES);
    let learned = known(keys::SPELLS);
    let awakened = known(keys::AWAKENED_SPELLS);

    match event.kind {
        EventKind::Loot => {
            if let Some(item) = event.object {
                ctx.data.hold(character, item)?;
            }
            return Ok(());
        }
        EventKind::Trade => {
            if let Some(item) = event.object {
                match event.trade {
                    Some(TradeAction::Buy) => ctx.data.hold(character, item)?,
                    Some(TradeAction::Sell) => {
                        ctx.data.detach(item);
                    }
                    None => {}
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let mut editor = ctx
        .data
        .edit(character)
        .ok_or(StoreError::UnknownObject(character))?;
    match event.kind {
        EventKind::Kill => {
            for _ in 0..event.count.max(0) {
                editor.add_list_item(THIS, keys::KILL_LOG, event.name())?;
            }
        }
        EventKind::LocationArrival => {
            editor.set(THIS, keys::CLEARING, event.name());
            editor.add_list_item(THIS, keys::MOVE_LOG, event.name())?;
        }
        EventKind::PathTraversed => {
            for clearing in &event.path {
                editor.add_list_item(THIS, keys::MOVE_LOG, clearing.as_str())?;
            }
            if let Some(last) = event.path.last() {
                editor.set(THIS, keys::CLEARING, last.as_str());
            }
        }
        EventKind::AttributeGain => {
            editor.adjust_int(THIS, event.name(), event.count)?;
        }
        EventKind::Discovery if !discovered => {
            editor.add_list_item(THIS, keys::DISCOVERIES, event.name())?;
        }
        EventKind::SpellLearned if !learned => {
            editor.add_list_item(THIS, keys::SPELLS, event.name())?;
        }
        EventKind::SpellAwakened => {
            if !learned {
                editor.add_list_item(THIS, keys::SPELLS, event.name())?;
            }
            if !awakened {
                editor.add_list_item(THIS, keys::AWAKENED_SPELLS, event.name())?;
            }
        }
        _ => {}
    }
    Ok(())
}
