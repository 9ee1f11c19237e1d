use thiserror::Error;

use crate::store::StoreError;

/// Failure while bringing a document up to the current format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// No transform is registered for the document's version tag.
    #[error("unknown document version {0:?}")]
    UnknownVersion(String),

    /// The chain did not reach the current version within the registry's
    /// length. Indicates a malformed registry.
    #[error("migration stopped at {version:?} after {limit} steps")]
    IterationLimit { version: String, limit: usize },

    /// A transform found data it could not convert.
    #[error("migrating from {from}: {source}")]
    Store {
        from: String,
        #[source]
        source: StoreError,
    },
}
