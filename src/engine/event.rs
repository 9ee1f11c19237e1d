//! Events reported into the quest engine.
//!
//! An event names what happened and carries the payload fields that kind
//! of event needs. Requirements that react to events (loot, trade, search,
//! mission) read the payload; `report_event` also records the lasting
//! effect of the event on the character before evaluating.

use serde::{Deserialize, Serialize};

use crate::core::{GamePhase, ObjectId};

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The quest was activated.
    Activate,
    /// An attribute (fame, notoriety, gold, ...) changed by `count`.
    AttributeGain,
    /// The character arrived in a clearing.
    LocationArrival,
    /// The character killed `count` of a denizen.
    Kill,
    /// `count` days passed.
    TimePassed,
    /// The phase of day changed.
    PhaseChange,
    /// An item was bought or sold.
    Trade,
    /// A search table was rolled.
    Search,
    /// A mission or campaign action.
    Mission,
    /// An item was looted.
    Loot,
    SpellLearned,
    SpellAwakened,
    /// A path, passage or site was discovered.
    Discovery,
    /// A sequence of clearings was walked.
    PathTraversed,
    /// Re-evaluate without any new fact.
    Any,
}

/// Buy or sell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub const ALL: [TradeAction; 2] = [TradeAction::Buy, TradeAction::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// What was done with a mission or campaign chit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionAction {
    Pickup,
    Complete,
    Abandon,
    Fail,
}

impl MissionAction {
    pub const ALL: [MissionAction; 4] = [
        MissionAction::Pickup,
        MissionAction::Complete,
        MissionAction::Abandon,
        MissionAction::Fail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionAction::Pickup => "Pickup",
            MissionAction::Complete => "Complete",
            MissionAction::Abandon => "Abandon",
            MissionAction::Fail => "Fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// An event with its payload.
///
/// ## Payload by kind
///
/// | Kind            | `name`              | other fields            |
/// |-----------------|---------------------|-------------------------|
/// | AttributeGain   | attribute key       | `count` = delta         |
/// | LocationArrival | clearing            |                         |
/// | Kill            | denizen             | `count`, `object`       |
/// | TimePassed      |                     | `count` = days          |
/// | PhaseChange     |                     | `phase`                 |
/// | Trade           | item                | `trade`, `object`       |
/// | Search          | result              | `table`                 |
/// | Mission         | mission             | `mission`               |
/// | Loot            | item                | `object`                |
/// | Spell*          | spell               |                         |
/// | Discovery       | discovery           |                         |
/// | PathTraversed   |                     | `path`                  |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestEvent {
    pub kind: EventKind,
    pub name: Option<String>,
    pub object: Option<ObjectId>,
    pub count: i64,
    pub table: Option<String>,
    pub phase: Option<GamePhase>,
    pub trade: Option<TradeAction>,
    pub mission: Option<MissionAction>,
    pub path: Vec<String>,
    pub tags: Vec<String>,
}

impl QuestEvent {
    /// Create an event of the given kind with an empty payload.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            name: None,
            object: None,
            count: 1,
            table: None,
            phase: None,
            trade: None,
            mission: None,
            path: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the payload name (builder pattern).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the object involved (builder pattern).
    #[must_use]
    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The payload name, or "" if none.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Constructors for common events.
impl QuestEvent {
    pub fn activate() -> Self {
        Self::new(EventKind::Activate)
    }

    pub fn any() -> Self {
        Self::new(EventKind::Any)
    }

    pub fn attribute_gain(attribute: impl Into<String>, delta: i64) -> Self {
        Self::new(EventKind::AttributeGain).with_name(attribute).with_count(delta)
    }

    pub fn arrival(clearing: impl Into<String>) -> Self {
        Self::new(EventKind::LocationArrival).with_name(clearing)
    }

    pub fn kill(denizen: impl Into<String>) -> Self {
        Self::new(EventKind::Kill).with_name(denizen)
    }

    pub fn time_passed(days: u32) -> Self {
        Self::new(EventKind::TimePassed).with_count(i64::from(days))
    }

    pub fn phase_change(phase: GamePhase) -> Self {
        let mut event = Self::new(EventKind::PhaseChange);
        event.phase = Some(phase);
        event
    }

    pub fn trade(action: TradeAction, item: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Trade).with_name(item);
        event.trade = Some(action);
        event
    }

    /// A search roll on `table` that produced `result`.
    pub fn search(table: impl Into<String>, result: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Search).with_name(result);
        event.table = Some(table.into());
        event
    }

    pub fn mission(action: MissionAction, mission: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Mission).with_name(mission);
        event.mission = Some(action);
        event
    }

    pub fn loot(item: impl Into<String>) -> Self {
        Self::new(EventKind::Loot).with_name(item)
    }

    pub fn spell_learned(spell: impl Into<String>) -> Self {
        Self::new(EventKind::SpellLearned).with_name(spell)
    }

    pub fn spell_awakened(spell: impl Into<String>) -> Self {
        Self::new(EventKind::SpellAwakened).with_name(spell)
    }

    pub fn discovery(what: impl Into<String>) -> Self {
        Self::new(EventKind::Discovery).with_name(what)
    }

    pub fn path(clearings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut event = Self::new(EventKind::PathTraversed);
        event.path = clearings.into_iter().map(Into::into).collect();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let event = QuestEvent::kill("Giant").with_count(2).with_tag("ambush");
        assert_eq!(event.kind, EventKind::Kill);
        assert_eq!(event.name(), "Giant");
        assert_eq!(event.count, 2);
        assert!(event.has_tag("ambush"));

        let search = QuestEvent::search("Locate", "Discover Chits");
        assert_eq!(search.table.as_deref(), Some("Locate"));
        assert_eq!(QuestEvent::any().name(), "");
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(TradeAction::parse("sell"), Some(TradeAction::Sell));
        assert_eq!(MissionAction::parse(" Pickup "), Some(MissionAction::Pickup));
        assert_eq!(MissionAction::parse("Escort"), None);
    }
}
