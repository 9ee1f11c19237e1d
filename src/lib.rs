//! # realm-quest
//!
//! The engine room of a board-game editor suite: a schema-less object
//! store, predicate queries over stored objects, save-format migration,
//! and a quest state machine built on top of them.
//!
//! ## Design Principles
//!
//! 1. **Schema-less Data**: Every game piece is an object with ordered
//!    attribute blocks. Missing data is absence, never an error.
//!
//! 2. **Typed Quests**: Requirements and rewards are tagged unions with
//!    exhaustive matching; authoring metadata lives in a separate table.
//!
//! 3. **Bounded Loops**: Migration is capped by its registry length and
//!    quest evaluation by its step count, so neither can spin forever.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: the object arena is an `im::OrdMap`,
//!   so copying authored data into a live game is O(1).
//!
//! - **Exactly-once Rewards**: the engine records rewarded steps per
//!   play-through instead of relying on rewards being idempotent.
//!
//! ## Modules
//!
//! - `core`: Object and step ids, game clock, RNG
//! - `store`: Objects, attribute blocks, change notification
//! - `query`: Predicate parsing and matching
//! - `migrate`: Versioned document migration
//! - `quest`: Quest graph, requirements, rewards, authoring descriptors
//! - `engine`: Quest state machine driven by game events
//! - `persist`: JSON documents with migration on load

pub mod core;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod persist;
pub mod query;
pub mod quest;
pub mod store;

// Re-export commonly used types
pub use crate::core::{GameClock, GamePhase, GameRng, MagicColor, ObjectId, StepId};

pub use crate::store::{AttributeValue, Block, ChangeRecord, GameData, GameObject, StoreError, THIS};

pub use crate::query::{Clause, Predicate, PredicateBuilder, QueryEngine};

pub use crate::migrate::{MigrationError, MigrationReport, Migrator, Versioned};

pub use crate::quest::{
    LinkKind, LogicType, Quest, QuestError, QuestState, QuestStep, Requirement, RequirementKind,
    Reward, RewardKind, StepState,
};

pub use crate::engine::{ChoiceProvider, EngineConfig, GameContext, QuestEngine, QuestEvent};

pub use crate::persist::{Document, DocumentError};

pub use crate::error::{Error, Result};
