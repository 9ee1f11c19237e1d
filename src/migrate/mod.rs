//! Save-format migration.
//!
//! [`Migrator`] is generic over any [`Versioned`] document; [`standard`]
//! builds the registry for this crate's own [`Document`](crate::persist::Document)
//! format.

pub mod error;
pub mod migrator;
pub mod transforms;

pub use error::MigrationError;
pub use migrator::{MigrationReport, Migrator, Transform, Versioned};
pub use transforms::{standard, CURRENT_VERSION, VERSIONS};
