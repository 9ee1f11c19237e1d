use thiserror::Error;

use crate::core::{ObjectId, StepId};
use crate::store::StoreError;

/// Structural and authoring errors in a quest.
///
/// These are reported when a quest is built, loaded or copied. Evaluation
/// itself never fails on missing data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestError {
    /// A step references a step id the quest does not declare.
    #[error("{step} references unknown {missing}")]
    UnknownStep { step: StepId, missing: StepId },

    /// Two steps share an id.
    #[error("duplicate {0}")]
    DuplicateStep(StepId),

    /// A step lists itself as a predecessor.
    #[error("{0} references itself")]
    SelfReference(StepId),

    /// `step` references `predecessor` in more than one of its
    /// required/fail/preempted sets.
    #[error("{step} references {predecessor} in more than one link set")]
    ExclusivityViolation { step: StepId, predecessor: StepId },

    /// A required authoring field is absent.
    #[error("{block} is missing required field {key:?}")]
    MissingField { block: String, key: String },

    /// A field is present but its value cannot be read.
    #[error("{block}.{key} has invalid value {value:?}")]
    InvalidField {
        block: String,
        key: String,
        value: String,
    },

    /// A requirement or reward block names a kind this crate does not know.
    #[error("{block} has unknown kind {kind:?}")]
    UnknownKind { block: String, kind: String },

    /// The object is not a quest.
    #[error("{0} is not a quest")]
    NotAQuest(ObjectId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
