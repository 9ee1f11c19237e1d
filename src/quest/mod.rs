//! The quest graph: steps, requirements, rewards and their dependencies.
//!
//! ## Key Components
//!
//! - [`Quest`]: ordered steps plus locations, minor characters, journal
//!   and the progress of one play-through
//! - [`QuestStep`]: requirements combined with And/Or, rewards, and links
//!   to required, failing and preempting steps
//! - [`Requirement`] / [`Reward`]: tagged unions over every kind authors
//!   can pick, evaluated and applied by the engine
//! - [`descriptor`]: authoring metadata per kind
//! - [`codec`]: quest <-> stored object tree
//!
//! ## Example Usage
//!
//! ```
//! use realm_quest::quest::{LinkKind, Quest, Requirement, Reward};
//!
//! let mut quest = Quest::new("Slay the Giant");
//! let hunt = quest.add_step("Hunt");
//! let claim = quest.add_step("Claim the bounty");
//!
//! quest.step_mut(hunt).unwrap().requirements.push(Requirement::kill("Giant", 1));
//! quest.step_mut(claim).unwrap().rewards.push(Reward::adjust("gold", 20));
//! quest.step_mut(claim).unwrap().rewards.push(Reward::complete_quest());
//! quest.link(claim, hunt, LinkKind::Required).unwrap();
//!
//! // A step may reference a predecessor in only one set.
//! assert!(quest.link(claim, hunt, LinkKind::Fail).is_err());
//! assert!(quest.validate().is_ok());
//! ```

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod journal;
mod pattern;
#[allow(clippy::module_inception)]
pub mod quest;
pub mod requirement;
pub mod reward;
pub mod step;

pub use codec::{read_quest, write_quest};
pub use descriptor::{FieldKind, PropertyDescriptor};
pub use error::QuestError;
pub use journal::{Journal, JournalEntry, JournalKind};
pub use quest::{Quest, QuestLocation, QuestMinorCharacter, QuestState};
pub use requirement::{Comparison, EvalContext, Requirement, RequirementKind};
pub use reward::{
    CompanionKind, InventoryDestination, RelationshipChange, Reward, RewardContext, RewardKind,
    RewardOutcome, SiteDraw, DEFAULT_GROUP,
};
pub use step::{LinkKind, LogicType, QuestStep, StepLinks, StepProgress, StepState};
