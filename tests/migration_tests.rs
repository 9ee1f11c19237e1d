//! Save-format migration integration tests.

use realm_quest::migrate::transforms::{ENHANCED_PEER, SPECIAL_ACTION};
use realm_quest::migrate::{standard, MigrationError, Migrator, Versioned, CURRENT_VERSION, VERSIONS};
use realm_quest::persist::Document;
use realm_quest::store::THIS;

fn tagged(version: &str) -> Document {
    let mut doc = Document::new("Witch King");
    doc.set_version(version);
    doc
}

/// A document at version N takes exactly index(current) - index(N) steps.
#[test]
fn test_step_count_matches_version_distance() {
    let migrator = standard();
    let current = VERSIONS.iter().position(|v| *v == CURRENT_VERSION).unwrap();
    for (index, version) in VERSIONS.iter().enumerate() {
        let mut doc = tagged(version);
        let report = migrator.migrate(&mut doc).unwrap();
        assert_eq!(report.steps, current - index, "from {version}");
        assert_eq!(report.from, *version);
        assert_eq!(doc.version(), CURRENT_VERSION);
    }
}

/// The registry's versions are the published chain.
#[test]
fn test_standard_chain() {
    let migrator = standard();
    assert_eq!(migrator.versions().collect::<Vec<_>>(), VERSIONS);
    assert_eq!(migrator.len(), VERSIONS.len() - 1);
}

/// The obsolete `enh_peer` flag ends up as a special action.
#[test]
fn test_enh_peer_becomes_special_action() {
    let mut doc = tagged("1.0");
    {
        let mut editor = doc.data.edit(doc.root).unwrap();
        editor.set("level_1", "enh_peer", "");
        editor.set("level_2", SPECIAL_ACTION, "HEAL");
        editor.set("level_2", "enh_peer", "");
        editor.set("level_3", "advantage", "Fly");
    }

    standard().migrate(&mut doc).unwrap();
    let root = doc.root_object().unwrap();
    for level in ["level_1", "level_2"] {
        assert!(!root.has(level, "enh_peer"));
        assert!(root.list(level, SPECIAL_ACTION).iter().any(|a| a == ENHANCED_PEER));
    }
    assert_eq!(root.list("level_2", SPECIAL_ACTION), ["HEAL", ENHANCED_PEER]);
    assert_eq!(root.list("level_3", "advantages"), ["Fly"]);
    assert!(!root.has("level_3", "advantage"));
}

/// Step links and synonymous values are normalized.
#[test]
fn test_quest_data_is_normalized() {
    let mut doc = tagged("1.1");
    let step = doc.data.create_object("Second");
    doc.data.hold(doc.root, step).unwrap();
    {
        let mut editor = doc.data.edit(step).unwrap();
        editor.set(THIS, "required_step", "0");
        editor.set(THIS, "fail_step", "3");
        editor.set("req0", "kind", "KillCount");
        editor.set("req1", "kind", "Location");
        editor.set("rew0", "group", "all");
        editor.set("rew1", "group", "");
        editor.set("rew2", "group", "Gold");
        editor.set("chits", "0", "Flame");
    }

    standard().migrate(&mut doc).unwrap();
    let step = doc.data.object(step).unwrap();
    assert_eq!(step.list(THIS, "required_steps"), ["0"]);
    assert_eq!(step.list(THIS, "fail_steps"), ["3"]);
    assert_eq!(step.get_scalar("req0", "kind"), Some("Kill"));
    assert_eq!(step.get_scalar("req1", "kind"), Some("OccupyLocation"));
    assert_eq!(step.get_scalar("rew0", "group"), Some("ALL"));
    assert_eq!(step.get_scalar("rew1", "group"), Some("ALL"));
    assert_eq!(step.get_scalar("rew2", "group"), Some("Gold"));
    assert!(step.has_block("chit_list"));
    assert!(!step.has_block("chits"));
}

/// An unknown tag fails and leaves the document untouched.
#[test]
fn test_unknown_version_leaves_document_alone() {
    let mut doc = tagged("0.7");
    let before = doc.clone();
    assert_eq!(
        standard().migrate(&mut doc),
        Err(MigrationError::UnknownVersion("0.7".into()))
    );
    assert_eq!(doc, before);
}

/// A registry that loops is stopped by the iteration cap.
#[test]
fn test_cycle_hits_iteration_limit() {
    let looping = Migrator::<Document>::new("9.9")
        .step("1.0", "1.1", |_| Ok(()))
        .step("1.1", "1.0", |_| Ok(()));
    let mut doc = tagged("1.0");
    assert_eq!(
        looping.migrate(&mut doc),
        Err(MigrationError::IterationLimit { version: "1.0".into(), limit: 2 })
    );
    assert_eq!(doc.version(), "1.0");
}
