//! Quest journal.
//!
//! An append-only log. Entries are never edited or removed; a later entry
//! with the same key supersedes an earlier one for display.

use im::Vector;
use serde::{Deserialize, Serialize};

/// Status tag on a journal entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JournalKind {
    #[default]
    Pending,
    Finished,
    Failed,
}

impl JournalKind {
    pub const ALL: [JournalKind; 3] = [JournalKind::Pending, JournalKind::Finished, JournalKind::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            JournalKind::Pending => "Pending",
            JournalKind::Finished => "Finished",
            JournalKind::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JournalEntry {
    pub key: String,
    pub text: String,
    pub kind: JournalKind,
}

impl JournalEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>, kind: JournalKind) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            kind,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    entries: Vector<JournalEntry>,
}

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Most recent entry for `key`.
    #[must_use]
    pub fn latest(&self, key: &str) -> Option<&JournalEntry> {
        self.entries.iter().rev().find(|e| e.key == key)
    }
}

impl FromIterator<JournalEntry> for Journal {
    fn from_iter<I: IntoIterator<Item = JournalEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
