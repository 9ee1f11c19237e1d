//! In-memory documents and their JSON form.
//!
//! A document is one object graph rooted at a top-level object (a quest, a
//! character) plus a `description` carrying the format version tag. On disk
//! it is JSON:
//!
//! ```json
//! {
//!   "description": "2.0",
//!   "root": 0,
//!   "objects": [ { "id": 0, "name": "Wizard", "blocks": { "this": { } }, "holds": [] } ]
//! }
//! ```
//!
//! Loading always produces a fresh document and migrates it before handing
//! it back, so a failed load never touches state the caller already has.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::DocumentError;
use crate::core::ObjectId;
use crate::migrate::{self, MigrationReport, Versioned, CURRENT_VERSION};
use crate::quest::{read_quest, write_quest, Quest};
use crate::store::{GameData, GameObject};

/// An object graph with a version tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Format version tag.
    pub description: String,
    /// The top-level object.
    pub root: ObjectId,
    pub data: GameData,
}

/// Serialized shape.
#[derive(Serialize, Deserialize)]
struct DocumentFile {
    description: String,
    root: ObjectId,
    objects: Vec<GameObject>,
}

impl Document {
    /// Create a current-version document with a single root object.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut data = GameData::new();
        let root = data.create_object(root_name);
        Self {
            description: CURRENT_VERSION.to_string(),
            root,
            data,
        }
    }

    /// Wrap existing data. Fails if `root` is not in `data`.
    pub fn from_data(data: GameData, root: ObjectId) -> Result<Self, DocumentError> {
        if !data.contains(root) {
            return Err(DocumentError::MissingRoot(root));
        }
        Ok(Self {
            description: CURRENT_VERSION.to_string(),
            root,
            data,
        })
    }

    /// A current-version document holding one quest.
    pub fn from_quest(quest: &Quest) -> Result<Self, DocumentError> {
        let mut data = GameData::new();
        let root = write_quest(&mut data, quest)?;
        Self::from_data(data, root)
    }

    #[must_use]
    pub fn root_object(&self) -> Option<&GameObject> {
        self.data.object(self.root)
    }

    /// Read the root object as a quest.
    pub fn quest(&self) -> Result<Quest, DocumentError> {
        Ok(read_quest(&self.data, self.root)?)
    }

    /// Copy the whole document tree into a live game with fresh ids.
    /// Returns the id of the copied root.
    pub fn copy_into(&self, target: &mut GameData) -> Result<ObjectId, DocumentError> {
        let mapping = target.import_tree(&self.data, self.root)?;
        mapping
            .get(&self.root)
            .copied()
            .ok_or(DocumentError::MissingRoot(self.root))
    }

    /// Parse JSON without migrating.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let file: DocumentFile = serde_json::from_str(text)?;
        let data = GameData::from_objects(file.objects)?;
        if !data.contains(file.root) {
            return Err(DocumentError::MissingRoot(file.root));
        }
        Ok(Self {
            description: file.description,
            root: file.root,
            data,
        })
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        let file = DocumentFile {
            description: self.description.clone(),
            root: self.root,
            objects: self.data.iter().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parse and bring up to the current format.
    pub fn parse(text: &str) -> Result<(Self, MigrationReport), DocumentError> {
        let mut doc = Self::from_json(text)?;
        let report = migrate::standard().migrate(&mut doc)?;
        Ok((doc, report))
    }

    /// Read, parse and migrate a document. The report says whether the file
    /// was in an older format and should be saved again.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, MigrationReport), DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let (doc, report) = Self::parse(&text)?;
        if report.migrated() {
            info!(path = %path.display(), from = %report.from, "loaded document in older format");
        } else {
            debug!(path = %path.display(), objects = doc.data.len(), "loaded document");
        }
        Ok((doc, report))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), objects = self.data.len(), "saved document");
        Ok(())
    }
}

impl Versioned for Document {
    fn version(&self) -> &str {
        &self.description
    }

    fn set_version(&mut self, version: &str) {
        self.description = version.to_string();
    }
}
