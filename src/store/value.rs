//! Attribute values.
//!
//! Stored values are stringly typed, as authored content is: a number is a
//! scalar that happens to parse. The tag on `AttributeValue` is what keeps
//! lists and scalars apart, so asking for a list where a scalar lives is a
//! detectable mismatch rather than a silent reinterpretation.
//!
//! ## AttributeValue Types
//!
//! - `Scalar`: a single string (`fame = "12"`, `clearing = "Cave 4"`)
//! - `List`: ordered strings (`SPECIAL_ACTION = ["ENHANCED_PEER"]`)
//! - `Block`: a nested ordered block (journal entries, relationship tables)

use serde::{Deserialize, Serialize};

use super::ordered::OrderedMap;

/// An ordered key/value group: one attribute block of an object.
pub type Block = OrderedMap<AttributeValue>;

/// Value stored under an attribute key.
///
/// Serialized untagged, so in JSON a scalar is a string, a list is an array,
/// and a nested block is an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Single string value.
    Scalar(String),
    /// Ordered list of strings.
    List(Vec<String>),
    /// Nested block.
    Block(Block),
}

impl AttributeValue {
    /// Human-readable name of the variant (for error messages).
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Scalar(_) => "scalar",
            AttributeValue::List(_) => "list",
            AttributeValue::Block(_) => "block",
        }
    }

    /// Get as string reference if this is a Scalar value.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if this is a Scalar value that parses.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        self.as_scalar().and_then(|s| s.trim().parse().ok())
    }

    /// Get as list reference if this is a List value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Get as block reference if this is a Block value.
    #[must_use]
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            AttributeValue::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            AttributeValue::Block(b) => Some(b),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Scalar(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Scalar(v.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Scalar(v.to_string())
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Scalar(v.to_string())
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Scalar(v.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Scalar(v.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        AttributeValue::List(v)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(v: Vec<&str>) -> Self {
        AttributeValue::List(v.into_iter().map(String::from).collect())
    }
}

impl From<Block> for AttributeValue {
    fn from(v: Block) -> Self {
        AttributeValue::Block(v)
    }
}
