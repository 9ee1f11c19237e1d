//! Step rewards.
//!
//! Rewards are the only place quest progress writes to the game. Each one
//! is applied at most once per play-through; the engine guarantees that
//! by recording rewarded steps, so `apply` itself need not be idempotent.
//!
//! Targets are located with predicate queries (`"treasure,!large"`). A
//! reward whose target cannot be found logs a warning and does nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::QuestError;
use super::journal::{JournalEntry, JournalKind};
use super::quest::{Quest, QuestState};
use crate::core::{ObjectId, StepId};
use crate::engine::context::keys;
use crate::engine::{ChoiceProvider, GameContext};
use crate::query::{Predicate, PredicateBuilder};
use crate::store::{StoreError, THIS};

/// Reward group applied regardless of choice.
pub const DEFAULT_GROUP: &str = "ALL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionKind {
    Hireling,
    Visitor,
    Companion,
}

impl CompanionKind {
    pub const ALL: [CompanionKind; 3] = [CompanionKind::Hireling, CompanionKind::Visitor, CompanionKind::Companion];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanionKind::Hireling => "Hireling",
            CompanionKind::Visitor => "Visitor",
            CompanionKind::Companion => "Companion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// How a relationship level changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipChange {
    Set(i64),
    Change(i64),
}

/// Where `SendInventory` sends items.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryDestination {
    /// A named quest location or clearing.
    Location(String),
    /// Each item's own `home` clearing.
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteDraw {
    Treasure,
    Spell,
}

impl SiteDraw {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteDraw::Treasure => "Treasure",
            SiteDraw::Spell => "Spell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [SiteDraw::Treasure, SiteDraw::Spell]
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// What a reward does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    // === Messages and journal ===

    /// Show a message to the player.
    EmitInformation { text: String },

    AppendJournalEntry {
        key: String,
        text: String,
        kind: JournalKind,
    },

    // === Character ===

    /// Give the first matching object not already carried, or take the
    /// first matching carried object away.
    GrantOrRemoveItem { item: String, remove: bool },

    /// Add `delta` to a numeric attribute (fame, notoriety, gold).
    AdjustAttribute { attribute: String, delta: i64 },

    GrantCompanion { kind: CompanionKind, companion: String },

    /// Move the character to a quest location or clearing.
    Teleport { location: String },

    /// Set or shift the character's standing with a native group.
    Relationship {
        group: String,
        change: RelationshipChange,
    },

    AlterHide { hidden: bool },

    AlterBlock { blocked: bool },

    GrantOrRemoveMinorCharacter { name: String, remove: bool },

    /// Drop every carried item where the character stands.
    StripInventory,

    SendInventory { destination: InventoryDestination },

    /// Add paths or passages to the character's discoveries.
    RevealPaths { paths: Vec<String> },

    // === World ===

    /// Bring a matching object into the character's clearing.
    SummonGuardian { guardian: String },

    /// Send matching monsters in the character's clearing off the board.
    ScareMonsters { monsters: String },

    /// Tag matching denizens with a quest mark.
    MarkDenizen { denizen: String, mark: String },

    /// Give a random treasure (or teach a random spell) held by a site.
    DrawTreasureOrSpellFromSite { site: String, draw: SiteDraw },

    // === Quest flow ===

    CompleteQuest,

    FailQuest,

    ActivateQuest,

    /// Reset the quest once the current evaluation finishes.
    ResetQuest,

    /// Let the player pick one of these steps; the rest are skipped.
    OfferNextStepChoice { steps: Vec<StepId> },
}

impl RewardKind {
    /// Every kind name, in authoring order.
    pub const NAMES: [&'static str; 22] = [
        "EmitInformation",
        "GrantOrRemoveItem",
        "AdjustAttribute",
        "GrantCompanion",
        "Teleport",
        "Relationship",
        "CompleteQuest",
        "FailQuest",
        "SummonGuardian",
        "AlterHide",
        "AlterBlock",
        "GrantOrRemoveMinorCharacter",
        "ScareMonsters",
        "MarkDenizen",
        "StripInventory",
        "SendInventory",
        "AppendJournalEntry",
        "RevealPaths",
        "OfferNextStepChoice",
        "DrawTreasureOrSpellFromSite",
        "ActivateQuest",
        "ResetQuest",
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RewardKind::EmitInformation { .. } => "EmitInformation",
            RewardKind::AppendJournalEntry { .. } => "AppendJournalEntry",
            RewardKind::GrantOrRemoveItem { .. } => "GrantOrRemoveItem",
            RewardKind::AdjustAttribute { .. } => "AdjustAttribute",
            RewardKind::GrantCompanion { .. } => "GrantCompanion",
            RewardKind::Teleport { .. } => "Teleport",
            RewardKind::Relationship { .. } => "Relationship",
            RewardKind::AlterHide { .. } => "AlterHide",
            RewardKind::AlterBlock { .. } => "AlterBlock",
            RewardKind::GrantOrRemoveMinorCharacter { .. } => "GrantOrRemoveMinorCharacter",
            RewardKind::StripInventory => "StripInventory",
            RewardKind::SendInventory { .. } => "SendInventory",
            RewardKind::RevealPaths { .. } => "RevealPaths",
            RewardKind::SummonGuardian { .. } => "SummonGuardian",
            RewardKind::ScareMonsters { .. } => "ScareMonsters",
            RewardKind::MarkDenizen { .. } => "MarkDenizen",
            RewardKind::DrawTreasureOrSpellFromSite { .. } => "DrawTreasureOrSpellFromSite",
            RewardKind::CompleteQuest => "CompleteQuest",
            RewardKind::FailQuest => "FailQuest",
            RewardKind::ActivateQuest => "ActivateQuest",
            RewardKind::ResetQuest => "ResetQuest",
            RewardKind::OfferNextStepChoice { .. } => "OfferNextStepChoice",
        }
    }
}

/// A reward tagged with the group it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: RewardKind,
    pub group: String,
}

impl From<RewardKind> for Reward {
    fn from(kind: RewardKind) -> Self {
        Self::new(kind)
    }
}

/// Side results of applying rewards that the engine acts on afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardOutcome {
    /// Steps to mark Skipped.
    pub skipped: Vec<StepId>,
    /// A `ResetQuest` reward fired.
    pub reset_requested: bool,
}

/// Everything a reward may touch.
pub struct RewardContext<'a> {
    pub game: &'a mut GameContext,
    pub character: ObjectId,
    pub quest: &'a mut Quest,
    /// The step being rewarded.
    pub step: StepId,
    pub choices: &'a mut dyn ChoiceProvider,
    pub outcome: &'a mut RewardOutcome,
}

impl Reward {
    /// Create a reward in the default group.
    pub fn new(kind: RewardKind) -> Self {
        Self {
            kind,
            group: DEFAULT_GROUP.to_string(),
        }
    }

    /// Put this reward in a choosable group (builder pattern).
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn apply(&self, ctx: &mut RewardContext<'_>) -> Result<(), QuestError> {
        debug!(step = %ctx.step, reward = self.kind.name(), group = %self.group, "applying reward");
        apply(&self.kind, ctx)
    }
}

/// Convenience constructors.
impl Reward {
    pub fn information(text: impl Into<String>) -> Self {
        Self::new(RewardKind::EmitInformation { text: text.into() })
    }

    pub fn adjust(attribute: impl Into<String>, delta: i64) -> Self {
        Self::new(RewardKind::AdjustAttribute {
            attribute: attribute.into(),
            delta,
        })
    }

    pub fn complete_quest() -> Self {
        Self::new(RewardKind::CompleteQuest)
    }

    pub fn fail_quest() -> Self {
        Self::new(RewardKind::FailQuest)
    }
}

impl RewardContext<'_> {
    fn character_exists(&self) -> Result<(), QuestError> {
        if self.game.data.contains(self.character) {
            Ok(())
        } else {
            Err(StoreError::UnknownObject(self.character).into())
        }
    }

    /// Resolve a quest location name (or bare clearing name) to an object.
    fn resolve_location(&self, name: &str) -> Option<ObjectId> {
        let clearing = self
            .quest
            .location(name)
            .and_then(|l| l.candidates.first().map(String::as_str))
            .unwrap_or(name);
        self.game.location_named(clearing).map(|o| o.id())
    }

    fn current_location(&self) -> Option<ObjectId> {
        let character = self.game.data.object(self.character)?;
        self.game.location_of(character).map(|o| o.id())
    }

    /// First object matching `pred` outside the character's own subtree.
    fn find_outside(&self, pred: &Predicate) -> Option<ObjectId> {
        self.game
            .data
            .iter()
            .find(|o| {
                o.id() != self.character
                    && !self.game.data.is_ancestor(self.character, o.id())
                    && pred.matches(o)
            })
            .map(|o| o.id())
    }

    /// First carried object (any depth) matching `pred`.
    fn find_carried(&self, pred: &Predicate) -> Option<ObjectId> {
        self.game
            .data
            .subtree(self.character)
            .into_iter()
            .skip(1)
            .find(|&id| self.game.data.object(id).is_some_and(|o| pred.matches(o)))
    }

    /// Items held directly by the character.
    fn carried_items(&self) -> Vec<ObjectId> {
        self.game
            .data
            .children(self.character)
            .filter(|o| o.has(THIS, keys::ITEM))
            .map(|o| o.id())
            .collect()
    }

    fn set_flag(&mut self, key: &str, on: bool) {
        if let Some(mut editor) = self.game.data.edit(self.character) {
            if on {
                editor.set(THIS, key, "true");
            } else {
                editor.remove(THIS, key);
            }
        }
    }
}

fn apply(kind: &RewardKind, ctx: &mut RewardContext<'_>) -> Result<(), QuestError> {
    ctx.character_exists()?;
    let character = ctx.character;

    match kind {
        RewardKind::EmitInformation { text } => ctx.game.emit(text.clone()),

        RewardKind::AppendJournalEntry { key, text, kind } => {
            ctx.quest.journal.append(JournalEntry::new(key.clone(), text.clone(), *kind));
        }

        RewardKind::GrantOrRemoveItem { item, remove } => {
            let pred = Predicate::parse(item);
            if *remove {
                match ctx.find_carried(&pred) {
                    Some(found) => {
                        ctx.game.data.detach(found);
                    }
                    None => warn!(predicate = %item, "no carried item to remove"),
                }
            } else {
                match ctx.find_outside(&pred) {
                    Some(found) => ctx.game.data.hold(character, found)?,
                    None => warn!(predicate = %item, "no item to grant"),
                }
            }
        }

        RewardKind::AdjustAttribute { attribute, delta } => {
            if let Some(mut editor) = ctx.game.data.edit(character) {
                editor.adjust_int(THIS, attribute, *delta)?;
            }
        }

        RewardKind::GrantCompanion { kind, companion } => {
            let pred = Predicate::parse(companion);
            match ctx.find_outside(&pred) {
                Some(found) => {
                    ctx.game.data.hold(character, found)?;
                    if let Some(mut editor) = ctx.game.data.edit(found) {
                        editor.set(THIS, keys::COMPANION, kind.as_str());
                    }
                }
                None => warn!(predicate = %companion, "no companion to grant"),
            }
        }

        RewardKind::Teleport { location } => {
            let clearing = match ctx.resolve_location(location) {
                Some(id) => ctx.game.data.object(id).map(|o| o.name.clone()),
                None => {
                    warn!(location = %location, "teleport target not found");
                    None
                }
            };
            if let (Some(clearing), Some(mut editor)) = (clearing, ctx.game.data.edit(character)) {
                editor.set(THIS, keys::CLEARING, clearing);
            }
        }

        RewardKind::Relationship { group, change } => {
            if let Some(mut editor) = ctx.game.data.edit(character) {
                match change {
                    RelationshipChange::Set(level) => {
                        editor.set_int(keys::RELATIONSHIPS, group, *level);
                    }
                    RelationshipChange::Change(delta) => {
                        editor.adjust_int(keys::RELATIONSHIPS, group, *delta)?;
                    }
                }
            }
        }

        RewardKind::AlterHide { hidden } => ctx.set_flag(keys::HIDDEN, *hidden),

        RewardKind::AlterBlock { blocked } => ctx.set_flag(keys::BLOCKED, *blocked),

        RewardKind::GrantOrRemoveMinorCharacter { name, remove } => {
            let held = ctx
                .game
                .data
                .children(character)
                .find(|o| o.has(THIS, keys::MINOR_CHARACTER) && o.name == *name)
                .map(|o| o.id());
            match (held, *remove) {
                (Some(id), true) => {
                    ctx.game.data.remove_object(id);
                }
                (None, false) => {
                    let mut block = ctx
                        .quest
                        .minor_character(name)
                        .map(|mc| mc.attributes.clone())
                        .unwrap_or_default();
                    block.insert(keys::MINOR_CHARACTER, ctx.quest.name.clone().into());
                    let id = ctx.game.data.create_object(name.clone());
                    if let Some(mut editor) = ctx.game.data.edit(id) {
                        editor.set_block(THIS, block);
                    }
                    ctx.game.data.hold(character, id)?;
                }
                _ => {}
            }
        }

        RewardKind::StripInventory => {
            let location = ctx.current_location();
            for item in ctx.carried_items() {
                match location {
                    Some(loc) => ctx.game.data.hold(loc, item)?,
                    None => {
                        ctx.game.data.detach(item);
                    }
                }
            }
        }

        RewardKind::SendInventory { destination } => {
            for item in ctx.carried_items() {
                let target = match destination {
                    InventoryDestination::Location(name) => ctx.resolve_location(name),
                    InventoryDestination::Default => ctx
                        .game
                        .data
                        .object(item)
                        .and_then(|o| o.get_scalar(THIS, keys::HOME))
                        .and_then(|home| ctx.game.location_named(home))
                        .map(|o| o.id()),
                };
                match target {
                    Some(loc) => ctx.game.data.hold(loc, item)?,
                    None => {
                        warn!(%item, "no destination for item; removing from play");
                        ctx.game.data.detach(item);
                    }
                }
            }
        }

        RewardKind::RevealPaths { paths } => {
            let known: Vec<String> = ctx
                .game
                .data
                .object(character)
                .map(|o| o.list(THIS, keys::DISCOVERIES).to_vec())
                .unwrap_or_default();
            if let Some(mut editor) = ctx.game.data.edit(character) {
                for path in paths.iter().filter(|p| !known.contains(p)) {
                    editor.add_list_item(THIS, keys::DISCOVERIES, path.clone())?;
                }
            }
        }

        RewardKind::SummonGuardian { guardian } => {
            let pred = Predicate::parse(guardian);
            match (ctx.find_outside(&pred), ctx.current_location()) {
                (Some(found), Some(location)) => ctx.game.data.hold(location, found)?,
                (None, _) => warn!(predicate = %guardian, "no guardian to summon"),
                (_, None) => warn!("character has no clearing to summon into"),
            }
        }

        RewardKind::ScareMonsters { monsters } => {
            let Some(location) = ctx.current_location() else {
                return Ok(());
            };
            let pred = Predicate::parse(monsters);
            let scared: Vec<ObjectId> = ctx
                .game
                .data
                .children(location)
                .filter(|o| o.has(THIS, keys::MONSTER) && pred.matches(o))
                .map(|o| o.id())
                .collect();
            for monster in scared {
                ctx.game.data.detach(monster);
            }
        }

        RewardKind::MarkDenizen { denizen, mark } => {
            let pred = Predicate::parse(denizen);
            let marked: Vec<ObjectId> = ctx
                .game
                .data
                .iter()
                .filter(|o| o.has(THIS, keys::DENIZEN) && pred.matches(o))
                .map(|o| o.id())
                .collect();
            for id in marked {
                if let Some(mut editor) = ctx.game.data.edit(id) {
                    editor.set(THIS, keys::QUEST_MARK, mark.clone());
                }
            }
        }

        RewardKind::DrawTreasureOrSpellFromSite { site, draw } => {
            let Some(site_id) = Predicate::parse(site).first(ctx.game.data.iter()).map(|o| o.id())
            else {
                warn!(predicate = %site, "site not found");
                return Ok(());
            };
            let marker = match draw {
                SiteDraw::Treasure => keys::TREASURE,
                SiteDraw::Spell => keys::SPELL,
            };
            let wanted = PredicateBuilder::new().present(marker).build();
            let pool: Vec<ObjectId> = ctx
                .game
                .data
                .children(site_id)
                .filter(|o| wanted.matches(o))
                .map(|o| o.id())
                .collect();
            let Some(&picked) = ctx.game.rng.choose(&pool) else {
                warn!(%site_id, draw = draw.as_str(), "site has nothing to draw");
                return Ok(());
            };
            match draw {
                SiteDraw::Treasure => ctx.game.data.hold(character, picked)?,
                SiteDraw::Spell => {
                    let spell = ctx.game.data.object(picked).map(|o| o.name.clone());
                    if let (Some(spell), Some(mut editor)) = (spell, ctx.game.data.edit(character)) {
                        editor.add_list_item(THIS, keys::SPELLS, spell)?;
                    }
                }
            }
        }

        RewardKind::CompleteQuest => {
            if !ctx.quest.state.is_terminal() {
                ctx.quest.state = QuestState::Complete;
            }
        }

        RewardKind::FailQuest => {
            if !ctx.quest.state.is_terminal() {
                ctx.quest.state = QuestState::Failed;
            }
        }

        RewardKind::ActivateQuest => {
            if ctx.quest.state == QuestState::Assigned {
                ctx.quest.state = QuestState::Active;
            }
        }

        RewardKind::ResetQuest => ctx.outcome.reset_requested = true,

        RewardKind::OfferNextStepChoice { steps } => {
            if steps.is_empty() {
                return Ok(());
            }
            let chosen = ctx
                .choices
                .choose_step(&*ctx.quest, steps)
                .filter(|c| steps.contains(c));
            if let Some(chosen) = chosen {
                ctx.outcome
                    .skipped
                    .extend(steps.iter().copied().filter(|&s| s != chosen));
            }
        }
    }
    Ok(())
}
