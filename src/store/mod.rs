//! Schema-less attribute/object store.
//!
//! Every game piece is a [`GameObject`]: a name plus ordered attribute
//! blocks, each an ordered map from key to [`AttributeValue`]. Objects live
//! in a [`GameData`] arena which allocates ids, keeps the `holds`/`held_by`
//! forest consistent, and notifies observers on change.
//!
//! ## Absence is not an error
//!
//! Reading a missing block or key yields `None` or an empty list. Only a
//! typed accessor that finds the wrong variant returns a [`StoreError`].

pub mod data;
pub mod error;
pub mod object;
pub mod observer;
pub mod ordered;
pub mod value;

pub use data::{GameData, ObjectEditor};
pub use error::StoreError;
pub use object::{GameObject, THIS};
pub use observer::{ChangeRecord, ObserverHub};
pub use ordered::OrderedMap;
pub use value::{AttributeValue, Block};
