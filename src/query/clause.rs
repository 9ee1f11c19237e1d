//! Atomic predicate clauses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Block;

/// One clause of a predicate, tested against an object's "this" block.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clause {
    /// `key`: the key is present (any value).
    Present(String),
    /// `!key`: the key is absent.
    Absent(String),
    /// `key=value`: the key holds exactly this scalar.
    Equals { key: String, value: String },
    /// Unparseable text. Never matches.
    Malformed(String),
}

impl Clause {
    /// Parse one clause. Surrounding whitespace is ignored.
    ///
    /// `a|b` in a value is not alternation; it is compared literally.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        let malformed = || Clause::Malformed(text.to_string());

        if let Some(rest) = text.strip_prefix('!') {
            let key = rest.trim();
            if key.is_empty() || key.contains('=') || key.starts_with('!') {
                return malformed();
            }
            return Clause::Absent(key.to_string());
        }

        match text.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    return malformed();
                }
                Clause::Equals {
                    key: key.to_string(),
                    value: value.trim().to_string(),
                }
            }
            None if text.is_empty() => malformed(),
            None => Clause::Present(text.to_string()),
        }
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Clause::Malformed(_))
    }

    /// Test against a "this" block. An object without one matches nothing.
    #[must_use]
    pub fn matches(&self, this: Option<&Block>) -> bool {
        let Some(this) = this else {
            return false;
        };
        match self {
            Clause::Present(key) => this.contains_key(key),
            Clause::Absent(key) => !this.contains_key(key),
            Clause::Equals { key, value } => this
                .get(key)
                .and_then(|v| v.as_scalar())
                .is_some_and(|s| s == value),
            Clause::Malformed(_) => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Present(key) => write!(f, "{key}"),
            Clause::Absent(key) => write!(f, "!{key}"),
            Clause::Equals { key, value } => write!(f, "{key}={value}"),
            Clause::Malformed(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttributeValue;

    fn this_block() -> Block {
        let mut block = Block::new();
        block.insert("weapon", AttributeValue::from(""));
        block.insert("weight", AttributeValue::from("M"));
        block.insert("tags", AttributeValue::from(vec!["M"]));
        block
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Clause::parse(" weapon "), Clause::Present("weapon".into()));
        assert_eq!(Clause::parse("!magic"), Clause::Absent("magic".into()));
        assert_eq!(
            Clause::parse("weight = M"),
            Clause::Equals { key: "weight".into(), value: "M".into() }
        );
        assert_eq!(
            Clause::parse("vulnerability="),
            Clause::Equals { key: "vulnerability".into(), value: String::new() }
        );
    }

    #[test]
    fn test_parse_malformed() {
        for raw in ["", "!", "=M", "!a=b", "!!a", "  =  "] {
            assert!(Clause::parse(raw).is_malformed(), "{raw:?} should be malformed");
        }
    }

    #[test]
    fn test_matching() {
        let block = this_block();
        assert!(Clause::parse("weapon").matches(Some(&block)));
        assert!(Clause::parse("!magic").matches(Some(&block)));
        assert!(!Clause::parse("!weapon").matches(Some(&block)));
        assert!(Clause::parse("weight=M").matches(Some(&block)));
        assert!(!Clause::parse("weight=H").matches(Some(&block)));
        // Equality only compares scalars.
        assert!(!Clause::parse("tags=M").matches(Some(&block)));
    }

    #[test]
    fn test_alternation_is_literal() {
        let mut block = this_block();
        assert!(!Clause::parse("weight=M|H").matches(Some(&block)));
        block.insert("weight", AttributeValue::from("M|H"));
        assert!(Clause::parse("weight=M|H").matches(Some(&block)));
    }

    #[test]
    fn test_missing_this_matches_nothing() {
        assert!(!Clause::parse("weapon").matches(None));
        assert!(!Clause::parse("!weapon").matches(None));
    }
}
