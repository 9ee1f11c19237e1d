//! The live game a quest is evaluated against.
//!
//! Characters, items, clearings and denizens are plain stored objects. The
//! keys below are the conventions this crate reads and writes on them.

use crate::core::{GameClock, GameRng, ObjectId};
use crate::query::PredicateBuilder;
use crate::store::{GameData, GameObject, THIS};

/// Attribute keys and object markers.
pub mod keys {
    // === Character "this" attributes ===
    pub const FAME: &str = "fame";
    pub const NOTORIETY: &str = "notoriety";
    pub const GOLD: &str = "gold";
    /// Name of the clearing the character stands in.
    pub const CLEARING: &str = "clearing";
    pub const HIDDEN: &str = "hidden";
    pub const BLOCKED: &str = "blocked";
    /// Names of everything the character has killed, in order.
    pub const KILL_LOG: &str = "kill_log";
    /// Clearings entered, in order.
    pub const MOVE_LOG: &str = "move_log";
    pub const DISCOVERIES: &str = "discoveries";
    pub const SPELLS: &str = "spells";
    pub const AWAKENED_SPELLS: &str = "awakened_spells";

    /// Block on the character mapping native group to relationship level.
    pub const RELATIONSHIPS: &str = "relationships";

    // === Object markers ("this" keys) ===
    pub const LOCATION: &str = "location";
    pub const COLOR_MAGIC: &str = "color_magic";
    pub const DENIZEN: &str = "denizen";
    pub const MONSTER: &str = "monster";
    pub const ITEM: &str = "item";
    pub const TREASURE: &str = "treasure";
    pub const SPELL: &str = "spell";
    pub const MINOR_CHARACTER: &str = "minor_character";
    /// Hireling, Visitor or Companion.
    pub const COMPANION: &str = "companion";
    /// Clearing an item returns to when sent to its default location.
    pub const HOME: &str = "home";
    pub const QUEST_MARK: &str = "quest_mark";
}

/// Live game state handed to the engine.
#[derive(Clone, Debug, Default)]
pub struct GameContext {
    pub data: GameData,
    pub clock: GameClock,
    pub rng: GameRng,
    messages: Vec<String>,
}

impl GameContext {
    #[must_use]
    pub fn new(data: GameData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: GameClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.data.object(id)
    }

    /// The clearing object with this name.
    #[must_use]
    pub fn location_named(&self, name: &str) -> Option<&GameObject> {
        let is_location = PredicateBuilder::new().present(keys::LOCATION).build();
        self.data
            .iter()
            .find(|o| o.name == name && is_location.matches(o))
    }

    /// The clearing a character currently stands in.
    #[must_use]
    pub fn location_of(&self, character: &GameObject) -> Option<&GameObject> {
        let clearing = character.get_scalar(THIS, keys::CLEARING)?;
        self.location_named(clearing)
    }

    /// Queue a message for the player.
    pub fn emit(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_of() {
        let mut data = GameData::new();
        let cave = data.create_object("Cave 4");
        data.edit(cave).unwrap().set(THIS, keys::LOCATION, "");
        data.create_object("Cave 5");
        let hero = data.create_object("Amazon");
        data.edit(hero).unwrap().set(THIS, keys::CLEARING, "Cave 4");
        let lost = data.create_object("Dwarf");
        data.edit(lost).unwrap().set(THIS, keys::CLEARING, "Cave 5");

        let ctx = GameContext::new(data);
        let hero_obj = ctx.object(hero).unwrap();
        assert_eq!(ctx.location_of(hero_obj).map(GameObject::id), Some(cave));
        // Cave 5 exists but is not marked as a location.
        assert!(ctx.location_of(ctx.object(lost).unwrap()).is_none());
    }

    #[test]
    fn test_messages_drain() {
        let mut ctx = GameContext::default();
        ctx.emit("The ghost speaks");
        assert_eq!(ctx.messages().len(), 1);
        assert_eq!(ctx.take_messages(), ["The ghost speaks"]);
        assert!(ctx.messages().is_empty());
    }
}
