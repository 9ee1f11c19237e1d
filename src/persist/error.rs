use thiserror::Error;

use crate::core::ObjectId;
use crate::migrate::MigrationError;
use crate::quest::QuestError;
use crate::store::StoreError;

/// Failure loading or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable document: {0}")]
    Json(#[from] serde_json::Error),

    /// The object graph violates the store's structural rules.
    #[error("corrupt document: {0}")]
    Corrupt(#[from] StoreError),

    #[error("root object {0} is missing")]
    MissingRoot(ObjectId),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// The root object is not a well-formed quest.
    #[error("invalid quest: {0}")]
    Quest(#[from] QuestError),
}
