//! Identity types.
//!
//! Every stored object has an `ObjectId` allocated by its `GameData`.
//! Quest steps carry a quest-local `StepId`; step ids are only meaningful
//! inside the quest that declared them.
//!
//! ```
//! use realm_quest::core::{ObjectId, StepId};
//!
//! let object = ObjectId::new(7);
//! assert_eq!(object.raw(), 7);
//! assert_eq!(format!("{}", StepId::new(2)), "Step(2)");
//! ```

use serde::{Deserialize, Serialize};

/// Identity of an object within one `GameData`.
///
/// Ids are never reused while the store is alive, so a stale id simply
/// resolves to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create an object ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Quest-local step sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepId(pub u32);

impl StepId {
    /// Create a step ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for StepId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for StepId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_next() {
        assert_eq!(ObjectId::new(4).next(), ObjectId::new(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ObjectId(42)), "Object(42)");
        assert_eq!(format!("{}", StepId(3)), "Step(3)");
    }

    #[test]
    fn test_step_id_parse() {
        assert_eq!(" 12 ".parse::<StepId>().ok(), Some(StepId(12)));
        assert!("twelve".parse::<StepId>().is_err());
    }

    #[test]
    fn test_serialization() {
        let id = ObjectId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
