//! Stored objects.
//!
//! A `GameObject` is any game piece: character, item, quest, quest step,
//! clearing, minor character. Its data is a set of named attribute blocks;
//! unqualified attributes live in the `"this"` block.
//!
//! Methods on `GameObject` mutate silently. Code holding a `GameData` should
//! go through [`GameData::edit`](super::GameData::edit) so observers hear
//! about the change.

use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::ordered::OrderedMap;
use super::value::{AttributeValue, Block};
use crate::core::ObjectId;

/// Name of the block holding an object's own unqualified attributes.
pub const THIS: &str = "this";

/// A stored object: identity, name, ordered attribute blocks, and the
/// objects it holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    id: ObjectId,

    /// Display name.
    pub name: String,

    #[serde(default)]
    blocks: OrderedMap<Block>,

    /// Owned children in order.
    #[serde(default)]
    holds: Vec<ObjectId>,

    /// Current holder; derived from the holder's `holds`.
    #[serde(skip)]
    held_by: Option<ObjectId>,
}

impl GameObject {
    /// Create a detached object. Ids are normally allocated by
    /// `GameData::create_object`.
    #[must_use]
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            blocks: OrderedMap::new(),
            holds: Vec::new(),
            held_by: None,
        }
    }

    /// Set an attribute (builder pattern).
    #[must_use]
    pub fn with(mut self, block: &str, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.set(block, key, value);
        self
    }

    /// Set a "this" attribute (builder pattern).
    #[must_use]
    pub fn with_this(self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.with(THIS, key, value)
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// Owned children, in order.
    #[must_use]
    pub fn holds(&self) -> &[ObjectId] {
        &self.holds
    }

    #[must_use]
    pub fn held_by(&self) -> Option<ObjectId> {
        self.held_by
    }

    pub(crate) fn holds_mut(&mut self) -> &mut Vec<ObjectId> {
        &mut self.holds
    }

    pub(crate) fn set_held_by(&mut self, holder: Option<ObjectId>) {
        self.held_by = holder;
    }

    // === Reads ===

    #[must_use]
    pub fn get(&self, block: &str, key: &str) -> Option<&AttributeValue> {
        self.blocks.get(block)?.get(key)
    }

    #[must_use]
    pub fn has(&self, block: &str, key: &str) -> bool {
        self.get(block, key).is_some()
    }

    /// Scalar value, or `None` if absent or not a scalar.
    #[must_use]
    pub fn get_scalar(&self, block: &str, key: &str) -> Option<&str> {
        self.get(block, key).and_then(AttributeValue::as_scalar)
    }

    /// Scalar value; a list or block under the key is a mismatch.
    pub fn try_scalar(&self, block: &str, key: &str) -> Result<Option<&str>, StoreError> {
        match self.get(block, key) {
            None => Ok(None),
            Some(AttributeValue::Scalar(s)) => Ok(Some(s)),
            Some(other) => Err(StoreError::mismatch(block, key, "scalar", other.kind_name())),
        }
    }

    /// Scalar parsed as an integer.
    #[must_use]
    pub fn get_int(&self, block: &str, key: &str) -> Option<i64> {
        self.get(block, key).and_then(AttributeValue::as_int)
    }

    /// List value; empty when absent. A scalar or block is a mismatch.
    pub fn get_list(&self, block: &str, key: &str) -> Result<&[String], StoreError> {
        match self.get(block, key) {
            None => Ok(&[]),
            Some(AttributeValue::List(items)) => Ok(items),
            Some(other) => Err(StoreError::mismatch(block, key, "list", other.kind_name())),
        }
    }

    /// List value; empty when absent or of another type.
    #[must_use]
    pub fn list(&self, block: &str, key: &str) -> &[String] {
        self.get_list(block, key).unwrap_or(&[])
    }

    #[must_use]
    pub fn get_block(&self, block: &str) -> Option<&Block> {
        self.blocks.get(block)
    }

    #[must_use]
    pub fn has_block(&self, block: &str) -> bool {
        self.blocks.contains_key(block)
    }

    /// Block names in insertion order.
    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys()
    }

    #[must_use]
    pub fn blocks(&self) -> &OrderedMap<Block> {
        &self.blocks
    }

    /// "this" attribute lookup.
    #[must_use]
    pub fn this(&self, key: &str) -> Option<&AttributeValue> {
        self.get(THIS, key)
    }

    // === Writes ===

    /// Set a value, creating the block if needed. Returns whether anything
    /// changed.
    pub fn set(&mut self, block: &str, key: &str, value: impl Into<AttributeValue>) -> bool {
        let value = value.into();
        let target = self.blocks.get_or_insert_with(block, Block::new);
        if target.get(key) == Some(&value) {
            return false;
        }
        target.insert(key, value);
        true
    }

    pub fn remove(&mut self, block: &str, key: &str) -> Option<AttributeValue> {
        self.blocks.get_mut(block)?.remove(key)
    }

    pub fn set_list(&mut self, block: &str, key: &str, items: Vec<String>) -> bool {
        self.set(block, key, AttributeValue::List(items))
    }

    /// Append to a list attribute, creating it if absent. Duplicates are kept.
    pub fn add_list_item(
        &mut self,
        block: &str,
        key: &str,
        item: impl Into<String>,
    ) -> Result<(), StoreError> {
        let target = self.blocks.get_or_insert_with(block, Block::new);
        match target.get_or_insert_with(key, || AttributeValue::List(Vec::new())) {
            AttributeValue::List(items) => {
                items.push(item.into());
                Ok(())
            }
            other => Err(StoreError::mismatch(block, key, "list", other.kind_name())),
        }
    }

    /// Add `delta` to an integer scalar (absent counts as zero).
    /// Returns the new value.
    pub fn adjust_int(&mut self, block: &str, key: &str, delta: i64) -> Result<i64, StoreError> {
        let current = match self.try_scalar(block, key)? {
            Some(s) => s.trim().parse::<i64>().unwrap_or(0),
            None => 0,
        };
        let next = current.saturating_add(delta);
        self.set(block, key, next);
        Ok(next)
    }

    /// Replace a whole block.
    pub fn set_block(&mut self, block: &str, contents: Block) -> bool {
        if self.blocks.get(block) == Some(&contents) {
            return false;
        }
        self.blocks.insert(block, contents);
        true
    }

    pub fn remove_block(&mut self, block: &str) -> Option<Block> {
        self.blocks.remove(block)
    }

    /// Rename a block, keeping its position. Returns `Ok(false)` when `old`
    /// does not exist.
    pub fn rename_block(&mut self, old: &str, new: &str) -> Result<bool, StoreError> {
        if old != new && self.blocks.contains_key(new) {
            return Err(StoreError::BlockExists(new.to_string()));
        }
        Ok(self.blocks.rename(old, new))
    }

    /// Deep-copy `src` into `dst`, replacing `dst`. Returns `false` when
    /// `src` does not exist.
    pub fn copy_block(&mut self, src: &str, dst: &str) -> bool {
        match self.blocks.get(src).cloned() {
            Some(copy) => {
                self.blocks.insert(dst, copy);
                true
            }
            None => false,
        }
    }
}
