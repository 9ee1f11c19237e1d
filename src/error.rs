//! Crate-level error type.

use thiserror::Error;

use crate::migrate::MigrationError;
use crate::persist::DocumentError;
use crate::quest::QuestError;
use crate::store::StoreError;

/// Any error this crate reports.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Quest(#[from] QuestError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
