//! Change notification.
//!
//! Observers subscribe to one object and receive a `ChangeRecord` on a
//! channel for every mutating call that actually changed it. Subscriptions
//! are process-local: they are never serialized, and a cloned store starts
//! with none.

use std::sync::mpsc::{channel, Receiver, Sender};

use rustc_hash::FxHashMap;

use crate::core::ObjectId;

/// What changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    /// The object that changed.
    pub object: ObjectId,
    /// Affected block, if the change was scoped to one.
    pub block: Option<String>,
    /// Affected key, if the change was scoped to one.
    pub key: Option<String>,
}

impl ChangeRecord {
    /// A single attribute changed.
    pub fn attribute(object: ObjectId, block: &str, key: &str) -> Self {
        Self {
            object,
            block: Some(block.to_string()),
            key: Some(key.to_string()),
        }
    }

    /// A whole block changed (copied, renamed, replaced, removed).
    pub fn block(object: ObjectId, block: &str) -> Self {
        Self {
            object,
            block: Some(block.to_string()),
            key: None,
        }
    }

    /// Name or ownership changed.
    pub fn object(object: ObjectId) -> Self {
        Self {
            object,
            block: None,
            key: None,
        }
    }
}

/// Registered subscribers, keyed by observed object.
#[derive(Debug, Default)]
pub struct ObserverHub {
    subscribers: FxHashMap<ObjectId, Vec<Sender<ChangeRecord>>>,
}

impl Clone for ObserverHub {
    /// Subscriptions belong to the original store only.
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl ObserverHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes on `object`.
    pub fn subscribe(&mut self, object: ObjectId) -> Receiver<ChangeRecord> {
        let (tx, rx) = channel();
        self.subscribers.entry(object).or_default().push(tx);
        rx
    }

    /// Drop every subscription on `object`.
    pub fn unsubscribe_all(&mut self, object: ObjectId) {
        self.subscribers.remove(&object);
    }

    /// Number of live subscriptions on `object`.
    #[must_use]
    pub fn subscriber_count(&self, object: ObjectId) -> usize {
        self.subscribers.get(&object).map_or(0, Vec::len)
    }

    /// Deliver a record to the object's subscribers. Subscribers whose
    /// receiver has been dropped are pruned.
    pub fn notify(&mut self, record: ChangeRecord) {
        let Some(senders) = self.subscribers.get_mut(&record.object) else {
            return;
        };
        senders.retain(|tx| tx.send(record.clone()).is_ok());
        if senders.is_empty() {
            self.subscribers.remove(&record.object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_reaches_subscribers() {
        let mut hub = ObserverHub::new();
        let rx1 = hub.subscribe(ObjectId(1));
        let rx2 = hub.subscribe(ObjectId(1));
        let other = hub.subscribe(ObjectId(2));

        hub.notify(ChangeRecord::attribute(ObjectId(1), "this", "fame"));

        assert_eq!(rx1.try_recv().unwrap().key.as_deref(), Some("fame"));
        assert!(rx2.try_recv().is_ok());
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut hub = ObserverHub::new();
        let rx = hub.subscribe(ObjectId(1));
        assert_eq!(hub.subscriber_count(ObjectId(1)), 1);

        drop(rx);
        hub.notify(ChangeRecord::object(ObjectId(1)));
        assert_eq!(hub.subscriber_count(ObjectId(1)), 0);
    }

    #[test]
    fn test_clone_has_no_subscribers() {
        let mut hub = ObserverHub::new();
        let _rx = hub.subscribe(ObjectId(1));
        assert_eq!(hub.clone().subscriber_count(ObjectId(1)), 0);
    }
}
