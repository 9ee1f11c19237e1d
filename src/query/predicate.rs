//! Compiled predicates.
//!
//! A predicate string is a comma-separated list of clauses, all of which
//! must hold:
//!
//! | Clause      | Holds when                                   |
//! |-------------|----------------------------------------------|
//! | `key`       | "this" contains `key`                        |
//! | `!key`      | "this" does not contain `key`                |
//! | `key=value` | "this" holds the scalar `value` under `key`  |
//!
//! Blank entries between commas are skipped. A clause that does not parse
//! compiles to [`Clause::Malformed`] and makes the whole predicate match
//! nothing.
//!
//! ```
//! use realm_quest::query::{Predicate, PredicateBuilder};
//!
//! let parsed = Predicate::parse("weapon,!magic");
//! let built = PredicateBuilder::new().present("weapon").absent("magic").build();
//! assert_eq!(parsed, built);
//! assert_eq!(built.to_string(), "weapon,!magic");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::clause::Clause;
use crate::store::{GameObject, THIS};

/// A parsed predicate: clauses ANDed together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    clauses: SmallVec<[Clause; 4]>,
}

impl Predicate {
    /// The predicate that matches every object.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Compile a predicate string.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let clauses = text
            .split(',')
            .filter(|raw| !raw.trim().is_empty())
            .map(Clause::parse)
            .collect();
        Self { clauses }
    }

    #[must_use]
    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Does any clause fail to parse?
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.clauses.iter().any(Clause::is_malformed)
    }

    /// Test one object. The empty predicate matches everything, including
    /// objects with no "this" block.
    #[must_use]
    pub fn matches(&self, obj: &GameObject) -> bool {
        if self.clauses.is_empty() {
            return true;
        }
        let this = obj.get_block(THIS);
        self.clauses.iter().all(|c| c.matches(this))
    }

    /// Matching objects, in input order.
    pub fn filter<'a, I>(&self, objects: I) -> Vec<&'a GameObject>
    where
        I: IntoIterator<Item = &'a GameObject>,
    {
        objects.into_iter().filter(|o| self.matches(o)).collect()
    }

    /// First matching object.
    pub fn first<'a, I>(&self, objects: I) -> Option<&'a GameObject>
    where
        I: IntoIterator<Item = &'a GameObject>,
    {
        objects.into_iter().find(|o| self.matches(o))
    }
}

impl FromStr for Predicate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Build a predicate without formatting a string.
#[derive(Clone, Debug, Default)]
pub struct PredicateBuilder {
    clauses: SmallVec<[Clause; 4]>,
}

impl PredicateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn present(mut self, key: impl Into<String>) -> Self {
        self.clauses.push(Clause::Present(key.into()));
        self
    }

    #[must_use]
    pub fn absent(mut self, key: impl Into<String>) -> Self {
        self.clauses.push(Clause::Absent(key.into()));
        self
    }

    #[must_use]
    pub fn equals(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Equals {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> Predicate {
        Predicate {
            clauses: self.clauses,
        }
    }
}
