//! Step requirements.
//!
//! A requirement is a read-only test against the reported event, the
//! character, the live game and the quest. Missing data (no clearing, no
//! such attribute, unknown location) evaluates to `false`, never an error.
//! Every requirement carries a `negate` flag that inverts its result.
//!
//! ## Kinds
//!
//! Event-driven kinds only hold while handling the matching event:
//! `LootAcquired`, `SearchResult`, `MissionCampaign`, `Trade`.
//!
//! State-driven kinds read the character or the world and hold for as long
//! as that state lasts: everything else.

use serde::{Deserialize, Serialize};

use super::pattern;
use super::quest::{Quest, QuestState};
use super::step::StepProgress;
use crate::core::{GamePhase, MagicColor};
use crate::engine::context::keys;
use crate::engine::{EventKind, GameContext, MissionAction, QuestEvent, TradeAction};
use crate::store::{GameObject, THIS};

/// Numeric comparison for attribute thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    AtLeast,
    AtMost,
    Equal,
}

impl Comparison {
    pub const ALL: [Comparison; 3] = [Comparison::AtLeast, Comparison::AtMost, Comparison::Equal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::AtLeast => "AtLeast",
            Comparison::AtMost => "AtMost",
            Comparison::Equal => "Equal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    #[must_use]
    pub fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::AtMost => value <= threshold,
            Comparison::Equal => value == threshold,
        }
    }
}

/// What a requirement tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementKind {
    // === Character state ===

    /// A numeric "this" attribute of the character compared to a threshold.
    AttributeThreshold {
        attribute: String,
        threshold: i64,
        comparison: Comparison,
    },

    /// The character stands in the named quest location (or clearing).
    OccupyLocation { location: String },

    /// The character holds, at any depth, an item whose name matches.
    InventoryContains { item: String },

    /// The character's discoveries include a match.
    Discovery { discovery: String },

    /// The character has learned (or awakened) a matching spell.
    LearnOrAwakenSpell { spell: String, awaken: bool },

    /// The character holds the named quest minor character.
    MinorCharacterPresent { name: String },

    // === Logs ===

    /// The character has killed at least `count` matching denizens, counted
    /// since the step became reachable when `step_only` is set.
    Kill {
        denizen: String,
        count: u32,
        step_only: bool,
    },

    /// The character walked these clearings consecutively since the step
    /// became reachable.
    PathTraversed { clearings: Vec<String> },

    // === World ===

    /// At least `days` days have passed since the step became reachable.
    TimePassed { days: u32 },

    GamePhase { phase: GamePhase },

    /// The character's clearing holds no denizens.
    NoDenizensInClearing,

    /// The color is present today or in the character's clearing.
    ColorMagicPresent { color: MagicColor },

    // === Quest ===

    /// The quest is being (or has been) activated.
    Active,

    // === Events ===

    /// A matching item was just looted.
    LootAcquired { item: String },

    /// A roll on a matching table produced a matching result.
    SearchResult { table: String, result: String },

    MissionCampaign { mission: String, action: MissionAction },

    Trade { action: TradeAction, item: String },
}

impl RequirementKind {
    /// Every kind name, in authoring order.
    pub const NAMES: [&'static str; 17] = [
        "AttributeThreshold",
        "OccupyLocation",
        "LootAcquired",
        "Kill",
        "TimePassed",
        "GamePhase",
        "Active",
        "SearchResult",
        "InventoryContains",
        "MissionCampaign",
        "Trade",
        "Discovery",
        "NoDenizensInClearing",
        "LearnOrAwakenSpell",
        "MinorCharacterPresent",
        "PathTraversed",
        "ColorMagicPresent",
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RequirementKind::AttributeThreshold { .. } => "AttributeThreshold",
            RequirementKind::OccupyLocation { .. } => "OccupyLocation",
            RequirementKind::LootAcquired { .. } => "LootAcquired",
            RequirementKind::Kill { .. } => "Kill",
            RequirementKind::TimePassed { .. } => "TimePassed",
            RequirementKind::GamePhase { .. } => "GamePhase",
            RequirementKind::Active => "Active",
            RequirementKind::SearchResult { .. } => "SearchResult",
            RequirementKind::InventoryContains { .. } => "InventoryContains",
            RequirementKind::MissionCampaign { .. } => "MissionCampaign",
            RequirementKind::Trade { .. } => "Trade",
            RequirementKind::Discovery { .. } => "Discovery",
            RequirementKind::NoDenizensInClearing => "NoDenizensInClearing",
            RequirementKind::LearnOrAwakenSpell { .. } => "LearnOrAwakenSpell",
            RequirementKind::MinorCharacterPresent { .. } => "MinorCharacterPresent",
            RequirementKind::PathTraversed { .. } => "PathTraversed",
            RequirementKind::ColorMagicPresent { .. } => "ColorMagicPresent",
        }
    }
}

/// A requirement with its negation flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub kind: RequirementKind,
    #[serde(default)]
    pub negate: bool,
}

impl From<RequirementKind> for Requirement {
    fn from(kind: RequirementKind) -> Self {
        Self::new(kind)
    }
}

/// Everything a requirement may look at.
pub struct EvalContext<'a> {
    pub game: &'a GameContext,
    pub event: &'a QuestEvent,
    pub character: &'a GameObject,
    pub quest: &'a Quest,
    /// Progress of the step being evaluated.
    pub progress: StepProgress,
}

impl Requirement {
    pub fn new(kind: RequirementKind) -> Self {
        Self {
            kind,
            negate: false,
        }
    }

    /// Invert this requirement (builder pattern).
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Evaluate, applying negation.
    #[must_use]
    pub fn test(&self, ctx: &EvalContext<'_>) -> bool {
        evaluate(&self.kind, ctx) != self.negate
    }
}

/// Convenience constructors.
impl Requirement {
    pub fn attribute_at_least(attribute: impl Into<String>, threshold: i64) -> Self {
        Self::new(RequirementKind::AttributeThreshold {
            attribute: attribute.into(),
            threshold,
            comparison: Comparison::AtLeast,
        })
    }

    pub fn occupy(location: impl Into<String>) -> Self {
        Self::new(RequirementKind::OccupyLocation {
            location: location.into(),
        })
    }

    pub fn kill(denizen: impl Into<String>, count: u32) -> Self {
        Self::new(RequirementKind::Kill {
            denizen: denizen.into(),
            count,
            step_only: false,
        })
    }

    pub fn active() -> Self {
        Self::new(RequirementKind::Active)
    }
}

fn evaluate(kind: &RequirementKind, ctx: &EvalContext<'_>) -> bool {
    let character = ctx.character;
    let event = ctx.event;

    match kind {
        RequirementKind::AttributeThreshold {
            attribute,
            threshold,
            comparison,
        } => character
            .get_int(THIS, attribute)
            .is_some_and(|v| comparison.holds(v, *threshold)),

        RequirementKind::OccupyLocation { location } => {
            let Some(current) = character.get_scalar(THIS, keys::CLEARING) else {
                return false;
            };
            match ctx.quest.location(location) {
                Some(quest_location) => quest_location.contains(current),
                None => location.eq_ignore_ascii_case(current),
            }
        }

        RequirementKind::InventoryContains { item } => {
            let Some(re) = pattern::compile(item) else {
                return false;
            };
            ctx.game
                .data
                .subtree(character.id())
                .into_iter()
                .skip(1)
                .filter_map(|id| ctx.game.data.object(id))
                .any(|o| re.is_match(&o.name))
        }

        RequirementKind::Discovery { discovery } => {
            pattern::count(discovery, character.list(THIS, keys::DISCOVERIES)) > 0
        }

        RequirementKind::LearnOrAwakenSpell { spell, awaken } => {
            let key = if *awaken { keys::AWAKENED_SPELLS } else { keys::SPELLS };
            pattern::count(spell, character.list(THIS, key)) > 0
        }

        RequirementKind::MinorCharacterPresent { name } => ctx
            .game
            .data
            .children(character.id())
            .any(|o| o.has(THIS, keys::MINOR_CHARACTER) && o.name == *name),

        RequirementKind::Kill {
            denizen,
            count,
            step_only,
        } => {
            let log = character.list(THIS, keys::KILL_LOG);
            let window = if *step_only {
                &log[ctx.progress.kill_baseline.min(log.len())..]
            } else {
                log
            };
            pattern::count(denizen, window) >= *count as usize
        }

        RequirementKind::PathTraversed { clearings } => {
            if clearings.is_empty() {
                return true;
            }
            let log = character.list(THIS, keys::MOVE_LOG);
            let recent = &log[ctx.progress.move_baseline.min(log.len())..];
            recent.windows(clearings.len()).any(|w| {
                w.iter()
                    .zip(clearings)
                    .all(|(walked, wanted)| walked.eq_ignore_ascii_case(wanted))
            })
        }

        RequirementKind::TimePassed { days } => ctx
            .progress
            .started_day
            .is_some_and(|start| ctx.game.clock.days_since(start) >= *days),

        RequirementKind::GamePhase { phase } => ctx.game.clock.phase == *phase,

        RequirementKind::NoDenizensInClearing => {
            ctx.game.location_of(character).is_some_and(|location| {
                !ctx.game
                    .data
                    .children(location.id())
                    .any(|o| o.has(THIS, keys::DENIZEN))
            })
        }

        RequirementKind::ColorMagicPresent { color } => {
            ctx.game.clock.day_colors.contains(color)
                || ctx.game.location_of(character).is_some_and(|location| {
                    location
                        .list(THIS, keys::COLOR_MAGIC)
                        .iter()
                        .any(|c| MagicColor::parse(c) == Some(*color))
                })
        }

        RequirementKind::Active => {
            event.kind == EventKind::Activate || ctx.quest.state == QuestState::Active
        }

        RequirementKind::LootAcquired { item } => {
            event.kind == EventKind::Loot && pattern::matches(item, event.name())
        }

        RequirementKind::SearchResult { table, result } => {
            event.kind == EventKind::Search
                && event.table.as_deref().is_some_and(|t| pattern::matches(table, t))
                && pattern::matches(result, event.name())
        }

        RequirementKind::MissionCampaign { mission, action } => {
            event.kind == EventKind::Mission
                && event.mission == Some(*action)
                && pattern::matches(mission, event.name())
        }

        RequirementKind::Trade { action, item } => {
            event.kind == EventKind::Trade
                && event.trade == Some(*action)
                && pattern::matches(item, event.name())
        }
    }
}
