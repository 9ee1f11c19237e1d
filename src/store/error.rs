//! Store errors.
//!
//! Missing blocks and keys are never errors; they read back as absence.
//! Only a typed accessor hitting the wrong variant, or a structural
//! violation of the ownership forest, is reported.

use thiserror::Error;

use crate::core::ObjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A typed accessor found a different variant than it asked for.
    #[error("{block}.{key} holds a {found}, expected a {expected}")]
    TypeMismatch {
        block: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Object id does not exist in this store.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// Holding the child would create a cycle in the ownership forest.
    #[error("{child} cannot be held by {parent}: would create a cycle")]
    HoldCycle { parent: ObjectId, child: ObjectId },

    /// An object appears in more than one holder's `holds` list.
    #[error("{child} is held by both {first} and {second}")]
    MultipleHolders {
        child: ObjectId,
        first: ObjectId,
        second: ObjectId,
    },

    /// Two objects share an id.
    #[error("duplicate object id {0}")]
    DuplicateId(ObjectId),

    /// Renaming onto an existing block.
    #[error("block {0} already exists")]
    BlockExists(String),
}

impl StoreError {
    pub(crate) fn mismatch(
        block: &str,
        key: &str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            block: block.to_string(),
            key: key.to_string(),
            expected,
            found,
        }
    }
}
