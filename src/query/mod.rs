//! Predicate queries over stored objects.
//!
//! Predicates select objects by the contents of their "this" block. They
//! are user-authored strings, so parse problems never propagate: a
//! malformed clause is logged and matches nothing.
//!
//! ```
//! use realm_quest::core::ObjectId;
//! use realm_quest::query::find;
//! use realm_quest::store::GameObject;
//!
//! let objects = vec![
//!     GameObject::new(ObjectId(0), "Sword").with_this("weapon", ""),
//!     GameObject::new(ObjectId(1), "Magic Sword").with_this("weapon", "").with_this("magic", ""),
//!     GameObject::new(ObjectId(2), "Shield").with_this("armor", ""),
//! ];
//! let found = find("weapon,!magic", &objects);
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "Sword");
//! ```

pub mod clause;
pub mod engine;
pub mod predicate;

pub use clause::Clause;
pub use engine::{find, find_first, QueryEngine, DEFAULT_CACHE_CAPACITY};
pub use predicate::{Predicate, PredicateBuilder};
