//! Driving quests from game events.
//!
//! The game reports what happened through [`QuestEngine::report_event`];
//! the engine records it on the character, re-evaluates the quest and
//! applies rewards. [`GameContext`] is the live game state the engine and
//! rewards work against, and [`ChoiceProvider`] answers the choices
//! rewards raise.
//!
//! ## Example Usage
//!
//! ```
//! use realm_quest::engine::{keys, GameContext, QuestEngine, QuestEvent};
//! use realm_quest::quest::{QuestState, Requirement, Reward};
//! use realm_quest::store::{GameData, THIS};
//!
//! let mut data = GameData::new();
//! let hero = data.create_object("Berserker");
//! let mut ctx = GameContext::new(data);
//!
//! let mut quest = realm_quest::quest::Quest::new("Giant Slayer");
//! let step = quest.add_step("Kill three giants");
//! quest.step_mut(step).unwrap().requirements.push(Requirement::kill("Giant", 3));
//! quest.step_mut(step).unwrap().rewards.push(Reward::adjust(keys::FAME, 10));
//! quest.step_mut(step).unwrap().rewards.push(Reward::complete_quest());
//!
//! let mut engine = QuestEngine::new(quest).unwrap();
//! engine.reset();
//! for _ in 0..3 {
//!     engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
//! }
//!
//! assert_eq!(engine.quest().state, QuestState::Complete);
//! assert_eq!(ctx.data.object(hero).unwrap().get_int(THIS, keys::FAME), Some(10));
//! ```

pub mod choice;
pub mod config;
pub mod context;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod event;

pub use choice::{ChoiceProvider, FirstChoice, ScriptedChoices};
pub use config::EngineConfig;
pub use context::{keys, GameContext};
pub use engine::{record_event, QuestEngine};
pub use event::{EventKind, MissionAction, QuestEvent, TradeAction};
