//! The save-format history.
//!
//! | From | To  | Change                                                         |
//! |------|-----|----------------------------------------------------------------|
//! | 1.0  | 1.1 | `enh_peer` flag on level blocks becomes `SPECIAL_ACTION` entry |
//! | 1.1  | 1.2 | scalar `advantage`, `required_step`, `fail_step` become lists  |
//! | 1.2  | 2.0 | synonymous reward groups and requirement kinds folded, `chits` block renamed |

use super::migrator::Migrator;
use crate::core::ObjectId;
use crate::persist::Document;
use crate::quest::codec::{
    is_indexed_block, FAIL_STEPS, GROUP, KIND, REQUIRED_STEPS, REQUIREMENT_PREFIX, REWARD_PREFIX,
};
use crate::store::{AttributeValue, GameData, StoreError, THIS};

/// Every format version, oldest first.
pub const VERSIONS: [&str; 4] = ["1.0", "1.1", "1.2", "2.0"];

/// The version documents are written in.
pub const CURRENT_VERSION: &str = "2.0";

pub const SPECIAL_ACTION: &str = "SPECIAL_ACTION";
pub const ENHANCED_PEER: &str = "ENHANCED_PEER";

/// The migrator for quest and character documents.
#[must_use]
pub fn standard() -> Migrator<Document> {
    Migrator::<Document>::new(CURRENT_VERSION)
        .step("1.0", "1.1", |doc| fold_enhanced_peer(&mut doc.data))
        .step("1.1", "1.2", |doc| listify_scalars(&mut doc.data))
        .step("1.2", "2.0", |doc| fold_synonyms(&mut doc.data))
}

fn is_level_block(name: &str) -> bool {
    name.strip_prefix("level_")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn block_names(data: &GameData, id: ObjectId, keep: impl Fn(&str) -> bool) -> Vec<String> {
    data.object(id)
        .map(|o| o.block_names().filter(|n| keep(n)).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Turn a scalar into a one-item list in place (an empty scalar becomes an
/// empty list). Lists are left alone.
fn scalar_to_list(data: &mut GameData, id: ObjectId, block: &str, key: &str) -> Result<(), StoreError> {
    let Some(value) = data.object(id).and_then(|o| o.get(block, key)).cloned() else {
        return Ok(());
    };
    let items = match value {
        AttributeValue::List(_) => return Ok(()),
        AttributeValue::Scalar(s) if s.trim().is_empty() => Vec::new(),
        AttributeValue::Scalar(s) => vec![s],
        other => return Err(StoreError::mismatch(block, key, "scalar", other.kind_name())),
    };
    if let Some(mut editor) = data.edit(id) {
        editor.set_list(block, key, items);
    }
    Ok(())
}

/// Move a scalar under `old` to the end of the list under `new`.
fn move_scalar_into_list(
    data: &mut GameData,
    id: ObjectId,
    block: &str,
    old: &str,
    new: &str,
) -> Result<(), StoreError> {
    let Some(mut editor) = data.edit(id) else {
        return Ok(());
    };
    match editor.remove(block, old) {
        None => Ok(()),
        Some(AttributeValue::Scalar(s)) if s.trim().is_empty() => Ok(()),
        Some(AttributeValue::Scalar(s)) => editor.add_list_item(block, new, s),
        Some(AttributeValue::List(items)) => {
            for item in items {
                editor.add_list_item(block, new, item)?;
            }
            Ok(())
        }
        Some(other) => Err(StoreError::mismatch(block, old, "scalar", other.kind_name())),
    }
}

fn fold_enhanced_peer(data: &mut GameData) -> Result<(), StoreError> {
    let ids: Vec<ObjectId> = data.ids().collect();
    for id in ids {
        for block in block_names(data, id, is_level_block) {
            scalar_to_list(data, id, &block, SPECIAL_ACTION)?;

            let Some(mut editor) = data.edit(id) else {
                continue;
            };
            if editor.remove(&block, "enh_peer").is_none() {
                continue;
            }
            let present = editor
                .object()
                .is_some_and(|o| o.list(&block, SPECIAL_ACTION).iter().any(|a| a == ENHANCED_PEER));
            if !present {
                editor.add_list_item(&block, SPECIAL_ACTION, ENHANCED_PEER)?;
            }
        }
    }
    Ok(())
}

fn listify_scalars(data: &mut GameData) -> Result<(), StoreError> {
    let ids: Vec<ObjectId> = data.ids().collect();
    for id in ids {
        for block in block_names(data, id, is_level_block) {
            move_scalar_into_list(data, id, &block, "advantage", "advantages")?;
        }
        move_scalar_into_list(data, id, THIS, "required_step", REQUIRED_STEPS)?;
        move_scalar_into_list(data, id, THIS, "fail_step", FAIL_STEPS)?;
    }
    Ok(())
}

fn fold_synonyms(data: &mut GameData) -> Result<(), StoreError> {
    let ids: Vec<ObjectId> = data.ids().collect();
    for id in ids {
        for block in block_names(data, id, |n| is_indexed_block(n, REWARD_PREFIX)) {
            let group = data.object(id).and_then(|o| o.get_scalar(&block, GROUP)).map(str::to_string);
            if let Some(group) = group {
                if group.trim().is_empty() || group.trim().eq_ignore_ascii_case("all") {
                    if let Some(mut editor) = data.edit(id) {
                        editor.set(&block, GROUP, "ALL");
                    }
                }
            }
        }

        for block in block_names(data, id, |n| is_indexed_block(n, REQUIREMENT_PREFIX)) {
            let kind = data.object(id).and_then(|o| o.get_scalar(&block, KIND));
            let renamed = match kind {
                Some("KillCount") => "Kill",
                Some("Location") => "OccupyLocation",
                _ => continue,
            };
            if let Some(mut editor) = data.edit(id) {
                editor.set(&block, KIND, renamed);
            }
        }

        let has_chits = data.object(id).is_some_and(|o| o.has_block("chits"));
        if has_chits {
            if let Some(mut editor) = data.edit(id) {
                editor.rename_block("chits", "chit_list")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::Versioned;

    fn character(version: &str) -> (Document, ObjectId) {
        let mut doc = Document::new("Wizard");
        doc.set_version(version);
        let root = doc.root;
        (doc, root)
    }

    #[test]
    fn test_enh_peer_becomes_special_action() {
        let (mut doc, root) = character("1.0");
        {
            let mut editor = doc.data.edit(root).unwrap();
            editor.set("level_2", "enh_peer", "");
            editor.set("level_2", SPECIAL_ACTION, "ROBE");
            editor.set("level_3", "enh_peer", "");
        }

        let report = standard().migrate(&mut doc).unwrap();
        assert_eq!(report.steps, 3);

        let obj = doc.data.object(root).unwrap();
        assert!(!obj.has("level_2", "enh_peer"));
        assert_eq!(obj.list("level_2", SPECIAL_ACTION), ["ROBE", ENHANCED_PEER]);
        assert_eq!(obj.list("level_3", SPECIAL_ACTION), [ENHANCED_PEER]);
    }

    #[test]
    fn test_steps_from_each_version() {
        for (index, version) in VERSIONS.iter().enumerate() {
            let (mut doc, _) = character(version);
            let report = standard().migrate(&mut doc).unwrap();
            assert_eq!(report.steps, VERSIONS.len() - 1 - index, "from {version}");
            assert_eq!(doc.version(), CURRENT_VERSION);
        }
    }

    #[test]
    fn test_scalar_links_become_lists() {
        let (mut doc, root) = character("1.1");
        let step = doc.data.create_object("Step 2");
        doc.data.hold(root, step).unwrap();
        {
            let mut editor = doc.data.edit(step).unwrap();
            editor.set(THIS, "required_step", "1");
            editor.set(THIS, "fail_step", "");
        }
        doc.data.edit(root).unwrap().set("level_1", "advantage", "Aura of Power");

        standard().migrate(&mut doc).unwrap();

        let step_obj = doc.data.object(step).unwrap();
        assert_eq!(step_obj.list(THIS, REQUIRED_STEPS), ["1"]);
        assert!(!step_obj.has(THIS, "required_step"));
        assert!(!step_obj.has(THIS, FAIL_STEPS));
        let root_obj = doc.data.object(root).unwrap();
        assert_eq!(root_obj.list("level_1", "advantages"), ["Aura of Power"]);
    }

    #[test]
    fn test_synonyms_folded() {
        let (mut doc, root) = character("1.2");
        {
            let mut editor = doc.data.edit(root).unwrap();
            editor.set("rew0", GROUP, "all");
            editor.set("rew1", GROUP, "Gold");
            editor.set("req0", KIND, "KillCount");
            editor.set("req1", KIND, "Location");
            editor.set("chits", "MOVE", "M4");
        }

        standard().migrate(&mut doc).unwrap();

        let obj = doc.data.object(root).unwrap();
        assert_eq!(obj.get_scalar("rew0", GROUP), Some("ALL"));
        assert_eq!(obj.get_scalar("rew1", GROUP), Some("Gold"));
        assert_eq!(obj.get_scalar("req0", KIND), Some("Kill"));
        assert_eq!(obj.get_scalar("req1", KIND), Some("OccupyLocation"));
        assert!(obj.has_block("chit_list"));
        assert!(!obj.has_block("chits"));
    }

    #[test]
    fn test_level_block_names() {
        assert!(is_level_block("level_1"));
        assert!(is_level_block("level_12"));
        assert!(!is_level_block("level_"));
        assert!(!is_level_block("levels"));
    }
}
