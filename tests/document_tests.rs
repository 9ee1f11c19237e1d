//! Documents on disk.

use tempfile::TempDir;

use realm_quest::engine::{keys, QuestEngine, QuestEvent};
use realm_quest::migrate::transforms::{ENHANCED_PEER, SPECIAL_ACTION};
use realm_quest::migrate::CURRENT_VERSION;
use realm_quest::persist::{Document, DocumentError};
use realm_quest::quest::{LinkKind, Quest, QuestState, Requirement, Reward, StepState};
use realm_quest::store::{GameData, THIS};

fn escort_quest() -> Quest {
    let mut quest = Quest::new("Escort");
    let meet = quest.add_step("Meet");
    let arrive = quest.add_step("Arrive");
    quest.step_mut(meet).unwrap().requirements.push(Requirement::occupy("Chapel"));
    quest.step_mut(arrive).unwrap().requirements.push(Requirement::occupy("Inn"));
    quest.step_mut(arrive).unwrap().rewards.push(Reward::adjust(keys::FAME, 7));
    quest.step_mut(arrive).unwrap().rewards.push(Reward::complete_quest());
    quest.link(arrive, meet, LinkKind::Required).unwrap();
    quest
}

#[test]
fn test_save_and_load_current_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("escort.json");

    let doc = Document::from_quest(&escort_quest()).unwrap();
    doc.save(&path).unwrap();

    let (loaded, report) = Document::load(&path).unwrap();
    assert!(!report.migrated());
    assert_eq!(loaded, doc);
    assert_eq!(loaded.quest().unwrap(), escort_quest());
}

#[test]
fn test_old_document_is_migrated_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wizard.json");

    let mut doc = Document::new("Wizard");
    doc.description = "1.0".into();
    doc.data.edit(doc.root).unwrap().set("level_4", "enh_peer", "");
    doc.save(&path).unwrap();

    let (loaded, report) = Document::load(&path).unwrap();
    assert!(report.migrated());
    assert_eq!(report.from, "1.0");
    assert_eq!(report.steps, 3);
    assert_eq!(loaded.description, CURRENT_VERSION);
    let root = loaded.root_object().unwrap();
    assert_eq!(root.list("level_4", SPECIAL_ACTION), [ENHANCED_PEER]);

    // Saving again writes the current format; loading it is a no-op.
    loaded.save(&path).unwrap();
    let (again, report) = Document::load(&path).unwrap();
    assert!(!report.migrated());
    assert_eq!(again, loaded);
}

#[test]
fn test_unknown_version_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");

    let mut doc = Document::new("Wizard");
    doc.description = "3.5".into();
    doc.save(&path).unwrap();

    assert!(matches!(Document::load(&path), Err(DocumentError::Migration(_))));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Document::load(dir.path().join("absent.json")),
        Err(DocumentError::Io(_))
    ));
}

/// Progress saved mid-quest picks up where it left off.
#[test]
fn test_play_through_survives_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("in_progress.json");

    let mut data = GameData::new();
    let hero = data.create_object("Pilgrim");
    let mut engine = QuestEngine::new(escort_quest()).unwrap();
    let mut ctx = engine.new_context(data);
    engine.reset();
    engine.report_event(&mut ctx, &QuestEvent::arrival("Chapel"), hero).unwrap();

    Document::from_quest(engine.quest()).unwrap().save(&path).unwrap();
    let (loaded, _) = Document::load(&path).unwrap();
    let restored = loaded.quest().unwrap();
    assert_eq!(&restored, engine.quest());

    let arrive = restored.step_named("Arrive").unwrap().id;
    assert_eq!(restored.step_state(arrive), StepState::Active);

    let mut engine = QuestEngine::new(restored).unwrap();
    engine.report_event(&mut ctx, &QuestEvent::arrival("Inn"), hero).unwrap();
    assert_eq!(engine.quest().state, QuestState::Complete);
    assert_eq!(ctx.data.object(hero).unwrap().get_int(THIS, keys::FAME), Some(7));
}

/// Copying a document into a live game gives every object a fresh id.
#[test]
fn test_copy_into_live_game() {
    let doc = Document::from_quest(&escort_quest()).unwrap();
    let mut live = GameData::new();
    let hero = live.create_object("Pilgrim");

    let copy = doc.copy_into(&mut live).unwrap();
    assert_ne!(copy, hero);
    assert_eq!(live.subtree(copy).len(), doc.data.len());
    assert!(live.object(copy).unwrap().held_by().is_none());
}
