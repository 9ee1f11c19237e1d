//! The object arena.
//!
//! `GameData` owns every object of one document or one live game, allocates
//! ids, and maintains the ownership forest (`holds` / `held_by`). It is the
//! only path through which mutations notify observers.
//!
//! Objects are kept in an `im::OrdMap`, so cloning a `GameData` to start a
//! live game from authored content is O(1) and iteration follows id order
//! (creation order).
//!
//! ```
//! use realm_quest::store::{GameData, THIS};
//!
//! let mut data = GameData::new();
//! let hero = data.create_object("Amazon");
//! let sword = data.create_object("Short Sword");
//! data.hold(hero, sword).unwrap();
//!
//! let changes = data.subscribe(hero);
//! data.edit(hero).unwrap().set(THIS, "fame", 4i64);
//! assert_eq!(changes.try_recv().unwrap().key.as_deref(), Some("fame"));
//! assert_eq!(data.object(sword).unwrap().held_by(), Some(hero));
//! ```

use std::sync::mpsc::Receiver;

use im::OrdMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::error::StoreError;
use super::object::GameObject;
use super::observer::{ChangeRecord, ObserverHub};
use super::value::{AttributeValue, Block};
use crate::core::ObjectId;

/// Arena of objects forming one document or one live game.
#[derive(Clone, Debug, Default)]
pub struct GameData {
    objects: OrdMap<ObjectId, GameObject>,
    next_id: u32,
    observers: ObserverHub,
}

impl PartialEq for GameData {
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects
    }
}

impl Eq for GameData {}

impl GameData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from loaded objects, deriving `held_by` from `holds`.
    ///
    /// Fails on duplicate ids, dangling children, a child listed by two
    /// holders, or an ownership cycle.
    pub fn from_objects(objects: impl IntoIterator<Item = GameObject>) -> Result<Self, StoreError> {
        let mut data = Self::new();
        for mut obj in objects {
            obj.set_held_by(None);
            let id = obj.id();
            if data.objects.contains_key(&id) {
                return Err(StoreError::DuplicateId(id));
            }
            data.next_id = data.next_id.max(id.0 + 1);
            data.objects.insert(id, obj);
        }

        let links: Vec<(ObjectId, ObjectId)> = data
            .objects
            .values()
            .flat_map(|o| o.holds().iter().map(move |&child| (o.id(), child)))
            .collect();

        for (parent, child) in links {
            let Some(obj) = data.objects.get_mut(&child) else {
                return Err(StoreError::UnknownObject(child));
            };
            if let Some(first) = obj.held_by() {
                return Err(StoreError::MultipleHolders {
                    child,
                    first,
                    second: parent,
                });
            }
            obj.set_held_by(Some(parent));
        }

        // Every chain of holders must end within `len` steps.
        let limit = data.objects.len();
        for obj in data.objects.values() {
            let mut cursor = obj.held_by();
            let mut steps = 0;
            while let Some(holder) = cursor {
                steps += 1;
                if steps > limit {
                    return Err(StoreError::HoldCycle {
                        parent: holder,
                        child: obj.id(),
                    });
                }
                cursor = data.objects.get(&holder).and_then(GameObject::held_by);
            }
        }

        Ok(data)
    }

    /// Create a new, unheld object.
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, GameObject::new(id, name));
        id
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Resolve a list of ids, skipping any that no longer exist.
    pub fn resolve<'a>(&'a self, ids: &'a [ObjectId]) -> impl Iterator<Item = &'a GameObject> + 'a {
        ids.iter().filter_map(move |id| self.objects.get(id))
    }

    /// Objects held directly by `id`, in order.
    pub fn children(&self, id: ObjectId) -> impl Iterator<Item = &GameObject> {
        self.objects
            .get(&id)
            .into_iter()
            .flat_map(move |o| o.holds().iter().filter_map(move |c| self.objects.get(c)))
    }

    /// `id` and everything below it, depth-first in holds order.
    #[must_use]
    pub fn subtree(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(obj) = self.objects.get(&next) else {
                continue;
            };
            out.push(next);
            stack.extend(obj.holds().iter().rev().copied());
        }
        out
    }

    /// Is `ancestor` somewhere above `id` in the ownership forest?
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut cursor = self.objects.get(&id).and_then(GameObject::held_by);
        while let Some(holder) = cursor {
            if holder == ancestor {
                return true;
            }
            cursor = self.objects.get(&holder).and_then(GameObject::held_by);
        }
        false
    }

    // === Observation ===

    /// Subscribe to changes on one object.
    pub fn subscribe(&mut self, id: ObjectId) -> Receiver<ChangeRecord> {
        self.observers.subscribe(id)
    }

    // === Mutation ===

    /// Mutable access that notifies observers.
    pub fn edit(&mut self, id: ObjectId) -> Option<ObjectEditor<'_>> {
        if self.objects.contains_key(&id) {
            Some(ObjectEditor { data: self, id })
        } else {
            None
        }
    }

    /// Make `parent` hold `child`, detaching it from any previous holder.
    pub fn hold(&mut self, parent: ObjectId, child: ObjectId) -> Result<(), StoreError> {
        for id in [parent, child] {
            if !self.objects.contains_key(&id) {
                return Err(StoreError::UnknownObject(id));
            }
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(StoreError::HoldCycle { parent, child });
        }
        if self.objects.get(&child).and_then(GameObject::held_by) == Some(parent) {
            return Ok(());
        }

        let previous = self.unlink(child);

        if let Some(p) = self.objects.get_mut(&parent) {
            p.holds_mut().push(child);
        }
        if let Some(c) = self.objects.get_mut(&child) {
            c.set_held_by(Some(parent));
        }
        debug!(%parent, %child, "hold");
        if let Some(previous) = previous {
            self.observers.notify(ChangeRecord::object(previous));
        }
        self.observers.notify(ChangeRecord::object(parent));
        self.observers.notify(ChangeRecord::object(child));
        Ok(())
    }

    /// Sever `child` from its holder. Returns the former holder.
    pub fn detach(&mut self, child: ObjectId) -> Option<ObjectId> {
        let holder = self.unlink(child)?;
        self.observers.notify(ChangeRecord::object(holder));
        self.observers.notify(ChangeRecord::object(child));
        Some(holder)
    }

    /// Break the link between `child` and its holder without notifying.
    fn unlink(&mut self, child: ObjectId) -> Option<ObjectId> {
        let holder = self.objects.get(&child)?.held_by()?;
        if let Some(h) = self.objects.get_mut(&holder) {
            h.holds_mut().retain(|&c| c != child);
        }
        if let Some(c) = self.objects.get_mut(&child) {
            c.set_held_by(None);
        }
        Some(holder)
    }

    /// Remove an object. It is detached from its holder and its children
    /// become unheld.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<GameObject> {
        if !self.objects.contains_key(&id) {
            return None;
        }
        if let Some(holder) = self.unlink(id) {
            self.observers.notify(ChangeRecord::object(holder));
        }

        let children: Vec<ObjectId> = self
            .objects
            .get(&id)
            .map(|o| o.holds().to_vec())
            .unwrap_or_default();
        for child in children {
            if let Some(c) = self.objects.get_mut(&child) {
                c.set_held_by(None);
            }
            self.observers.notify(ChangeRecord::object(child));
        }

        self.observers.notify(ChangeRecord::object(id));
        self.observers.unsubscribe_all(id);
        let mut removed = self.objects.remove(&id)?;
        removed.holds_mut().clear();
        Some(removed)
    }

    /// Deep-copy the subtree rooted at `root` in `src` into this store with
    /// fresh ids. Returns the mapping from source ids to new ids; the copied
    /// root is unheld.
    pub fn import_tree(
        &mut self,
        src: &GameData,
        root: ObjectId,
    ) -> Result<FxHashMap<ObjectId, ObjectId>, StoreError> {
        if !src.contains(root) {
            return Err(StoreError::UnknownObject(root));
        }
        let ids = src.subtree(root);

        let mut mapping = FxHashMap::default();
        for &old in &ids {
            mapping.insert(old, ObjectId::new(self.next_id));
            self.next_id += 1;
        }

        for &old in &ids {
            let Some(source) = src.object(old) else {
                continue;
            };
            let mut copy = source.clone();
            let new_id = mapping[&old];
            copy.set_id(new_id);
            *copy.holds_mut() = source
                .holds()
                .iter()
                .filter_map(|c| mapping.get(c).copied())
                .collect();
            let holder = if old == root {
                None
            } else {
                source.held_by().and_then(|h| mapping.get(&h).copied())
            };
            copy.set_held_by(holder);
            self.objects.insert(new_id, copy);
        }

        debug!(%root, copied = ids.len(), "imported subtree");
        Ok(mapping)
    }
}

/// Mutating handle for one object. Every call that changes the object sends
/// exactly one `ChangeRecord` to its observers.
pub struct ObjectEditor<'a> {
    data: &'a mut GameData,
    id: ObjectId,
}

impl ObjectEditor<'_> {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn object(&self) -> Option<&GameObject> {
        self.data.object(self.id)
    }

    fn apply<R>(
        &mut self,
        record: ChangeRecord,
        f: impl FnOnce(&mut GameObject) -> (R, bool),
    ) -> Option<R> {
        let obj = self.data.objects.get_mut(&self.id)?;
        let (result, changed) = f(obj);
        if changed {
            self.data.observers.notify(record);
        }
        Some(result)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let record = ChangeRecord::object(self.id);
        self.apply(record, |o| {
            let changed = o.name != name;
            o.name = name;
            (changed, changed)
        })
        .unwrap_or(false)
    }

    pub fn set(&mut self, block: &str, key: &str, value: impl Into<AttributeValue>) -> bool {
        let value = value.into();
        let record = ChangeRecord::attribute(self.id, block, key);
        self.apply(record, |o| {
            let changed = o.set(block, key, value);
            (changed, changed)
        })
        .unwrap_or(false)
    }

    pub fn remove(&mut self, block: &str, key: &str) -> Option<AttributeValue> {
        let record = ChangeRecord::attribute(self.id, block, key);
        self.apply(record, |o| {
            let removed = o.remove(block, key);
            let changed = removed.is_some();
            (removed, changed)
        })
        .flatten()
    }

    pub fn set_list(&mut self, block: &str, key: &str, items: Vec<String>) -> bool {
        self.set(block, key, AttributeValue::List(items))
    }

    pub fn add_list_item(
        &mut self,
        block: &str,
        key: &str,
        item: impl Into<String>,
    ) -> Result<(), StoreError> {
        let id = self.id;
        let record = ChangeRecord::attribute(id, block, key);
        self.apply(record, |o| {
            let result = o.add_list_item(block, key, item);
            let changed = result.is_ok();
            (result, changed)
        })
        .unwrap_or(Err(StoreError::UnknownObject(id)))
    }

    pub fn set_int(&mut self, block: &str, key: &str, value: i64) -> bool {
        self.set(block, key, value)
    }

    /// Add `delta` to an integer scalar (absent counts as zero).
    pub fn adjust_int(&mut self, block: &str, key: &str, delta: i64) -> Result<i64, StoreError> {
        let id = self.id;
        let record = ChangeRecord::attribute(id, block, key);
        self.apply(record, |o| {
            let before = o.get(block, key).cloned();
            let result = o.adjust_int(block, key, delta);
            let changed = result.is_ok() && o.get(block, key) != before.as_ref();
            (result, changed)
        })
        .unwrap_or(Err(StoreError::UnknownObject(id)))
    }

    pub fn set_block(&mut self, block: &str, contents: Block) -> bool {
        let record = ChangeRecord::block(self.id, block);
        self.apply(record, |o| {
            let changed = o.set_block(block, contents);
            (changed, changed)
        })
        .unwrap_or(false)
    }

    pub fn remove_block(&mut self, block: &str) -> Option<Block> {
        let record = ChangeRecord::block(self.id, block);
        self.apply(record, |o| {
            let removed = o.remove_block(block);
            let changed = removed.is_some();
            (removed, changed)
        })
        .flatten()
    }

    pub fn rename_block(&mut self, old: &str, new: &str) -> Result<bool, StoreError> {
        let id = self.id;
        let record = ChangeRecord::block(id, new);
        self.apply(record, |o| {
            let result = o.rename_block(old, new);
            let changed = matches!(result, Ok(true)) && old != new;
            (result, changed)
        })
        .unwrap_or(Err(StoreError::UnknownObject(id)))
    }

    pub fn copy_block(&mut self, src: &str, dst: &str) -> bool {
        let record = ChangeRecord::block(self.id, dst);
        self.apply(record, |o| {
            let changed = o.copy_block(src, dst);
            (changed, changed)
        })
        .unwrap_or(false)
    }
}
