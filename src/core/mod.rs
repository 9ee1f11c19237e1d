//! Core types shared by every module: identities, the game clock, and
//! deterministic randomness.

pub mod clock;
pub mod id;
pub mod rng;

pub use clock::{GameClock, GamePhase, MagicColor};
pub use id::{ObjectId, StepId};
pub use rng::{GameRng, GameRngState};
