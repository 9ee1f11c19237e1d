//! Quest engine scenarios driven through the public event boundary.

use realm_quest::engine::{keys, EngineConfig, GameContext, QuestEngine, QuestEvent, ScriptedChoices};
use realm_quest::quest::{
    JournalEntry, JournalKind, LinkKind, LogicType, Quest, QuestState, Requirement, RequirementKind, Reward,
    StepState,
};
use realm_quest::store::{GameData, THIS};
use realm_quest::ObjectId;

fn world() -> (GameContext, ObjectId) {
    let mut data = GameData::new();
    let inn = data.create_object("Inn");
    data.edit(inn).unwrap().set(THIS, keys::LOCATION, "");
    let hero = data.create_object("Captain");
    data.edit(hero).unwrap().set(THIS, keys::CLEARING, "Oak Woods 2");
    (GameContext::new(data), hero)
}

fn fame(ctx: &GameContext, hero: ObjectId) -> Option<i64> {
    ctx.data.object(hero).unwrap().get_int(THIS, keys::FAME)
}

/// A step with no requirements is satisfied on activation and pays once.
#[test]
fn test_empty_step_pays_once_on_activation() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Welcome");
    let step = quest.add_step("Arrive");
    quest.step_mut(step).unwrap().rewards.push(Reward::adjust(keys::FAME, 3));

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    assert!(engine.activate(&mut ctx, hero).unwrap());
    assert_eq!(engine.quest().step_state(step), StepState::Complete);
    assert_eq!(fame(&ctx, hero), Some(3));

    assert!(!engine.activate(&mut ctx, hero).unwrap());
    for _ in 0..4 {
        assert!(!engine.report_event(&mut ctx, &QuestEvent::any(), hero).unwrap());
    }
    assert_eq!(fame(&ctx, hero), Some(3));
    assert_eq!(engine.quest().rewarded_steps().collect::<Vec<_>>(), [step]);
}

/// A required step gates its successor even when the successor's own
/// requirements already hold.
#[test]
fn test_required_step_gates_successor() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Pilgrimage");
    let a = quest.add_step("Reach the inn");
    let b = quest.add_step("Rest");
    quest.step_mut(a).unwrap().requirements.push(Requirement::occupy("Inn"));
    quest.step_mut(b).unwrap().rewards.push(Reward::adjust(keys::FAME, 1));
    quest.link(b, a, LinkKind::Required).unwrap();

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    for _ in 0..3 {
        engine.report_event(&mut ctx, &QuestEvent::any(), hero).unwrap();
        assert_eq!(engine.quest().step_state(b), StepState::Inactive);
    }
    assert_eq!(fame(&ctx, hero), None);

    assert!(engine.report_event(&mut ctx, &QuestEvent::arrival("Inn"), hero).unwrap());
    assert_eq!(engine.quest().step_state(a), StepState::Complete);
    assert_eq!(engine.quest().step_state(b), StepState::Complete);
    assert_eq!(fame(&ctx, hero), Some(1));
}

/// With `logic_type = Or` any one completed predecessor opens the step.
#[test]
fn test_or_predecessors() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Either Way");
    let left = quest.add_step("Left");
    let right = quest.add_step("Right");
    let end = quest.add_step("End");
    quest.step_mut(left).unwrap().requirements.push(Requirement::occupy("Inn"));
    quest.step_mut(right).unwrap().requirements.push(Requirement::kill("Goblin", 1));
    quest.step_mut(end).unwrap().logic_type = LogicType::Or;
    quest.link(end, left, LinkKind::Required).unwrap();
    quest.link(end, right, LinkKind::Required).unwrap();

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    engine.report_event(&mut ctx, &QuestEvent::kill("Goblin"), hero).unwrap();
    assert_eq!(engine.quest().step_state(left), StepState::Active);
    assert_eq!(engine.quest().step_state(end), StepState::Complete);
}

/// Kill counts are satisfied at the threshold and stay satisfied above it.
#[test]
fn test_kill_threshold() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Giant Slayer");
    let hunt = quest.add_step("Hunt");
    let more = quest.add_step("Keep hunting");
    quest.step_mut(hunt).unwrap().requirements.push(Requirement::kill("Giant", 3));
    quest.step_mut(more).unwrap().requirements.push(Requirement::kill("Giant", 3));
    quest.step_mut(more).unwrap().requirements.push(Requirement::kill("Ogre", 1));
    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();

    for _ in 0..2 {
        engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
        engine.report_event(&mut ctx, &QuestEvent::kill("Wolf"), hero).unwrap();
    }
    assert_eq!(engine.quest().step_state(hunt), StepState::Active);

    engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
    assert_eq!(engine.quest().step_state(hunt), StepState::Complete);

    engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
    engine.report_event(&mut ctx, &QuestEvent::kill("Ogre"), hero).unwrap();
    assert_eq!(engine.quest().step_state(more), StepState::Complete);
}

/// Step-only kills count from the moment the step became reachable.
#[test]
fn test_step_only_kill_window() {
    let (mut ctx, hero) = world();
    ctx.data
        .edit(hero)
        .unwrap()
        .set_list(THIS, keys::KILL_LOG, vec!["Giant".into(), "Giant".into()]);

    let mut quest = Quest::new("Fresh Blood");
    let travel = quest.add_step("Travel");
    let hunt = quest.add_step("Hunt");
    quest.step_mut(travel).unwrap().requirements.push(Requirement::occupy("Inn"));
    quest.step_mut(hunt).unwrap().requirements.push(Requirement::new(RequirementKind::Kill {
        denizen: "Giant".into(),
        count: 2,
        step_only: true,
    }));
    quest.link(hunt, travel, LinkKind::Required).unwrap();

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    engine.report_event(&mut ctx, &QuestEvent::arrival("Inn"), hero).unwrap();
    assert_eq!(engine.quest().step_state(hunt), StepState::Active);
    assert_eq!(engine.quest().progress(hunt).kill_baseline, 2);

    engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
    assert_eq!(engine.quest().step_state(hunt), StepState::Active);
    engine.report_event(&mut ctx, &QuestEvent::kill("Giant"), hero).unwrap();
    assert_eq!(engine.quest().step_state(hunt), StepState::Complete);
}

/// Once a reward completes the quest, further evaluation changes nothing.
#[test]
fn test_complete_quest_is_terminal() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Short Errand");
    let go = quest.add_step("Go");
    let after = quest.add_step("After");
    quest.step_mut(go).unwrap().requirements.push(Requirement::occupy("Inn"));
    quest.step_mut(go).unwrap().rewards.push(Reward::complete_quest());
    quest.step_mut(after).unwrap().requirements.push(Requirement::kill("Wolf", 1));
    quest.step_mut(after).unwrap().rewards.push(Reward::adjust(keys::FAME, 50));

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    engine.report_event(&mut ctx, &QuestEvent::arrival("Inn"), hero).unwrap();
    assert_eq!(engine.quest().state, QuestState::Complete);

    assert!(!engine.test_requirements(&mut ctx, &QuestEvent::any(), hero).unwrap());
    assert!(!engine.report_event(&mut ctx, &QuestEvent::kill("Wolf"), hero).unwrap());
    assert_eq!(engine.quest().state, QuestState::Complete);
    assert_eq!(fame(&ctx, hero), None);

    let before = engine.quest().journal.len();
    engine.append_journal(JournalEntry::new("Epilogue", "The inn is quiet.", JournalKind::Finished));
    assert_eq!(engine.quest().journal.len(), before + 1);
}

/// Journal entries follow each step's status changes.
#[test]
fn test_journal_follows_status() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Letters");
    let deliver = quest.add_step("Deliver");
    quest.step_mut(deliver).unwrap().description = "Take the letter to the inn.".into();
    quest.step_mut(deliver).unwrap().requirements.push(Requirement::occupy("Inn"));

    let mut engine = QuestEngine::new(quest).unwrap();
    engine.reset();
    engine.report_event(&mut ctx, &QuestEvent::any(), hero).unwrap();
    assert_eq!(engine.quest().journal.latest("Deliver").unwrap().kind, JournalKind::Pending);

    engine.report_event(&mut ctx, &QuestEvent::arrival("Inn"), hero).unwrap();
    let latest = engine.quest().journal.latest("Deliver").unwrap();
    assert_eq!(latest.kind, JournalKind::Finished);
    assert_eq!(latest.text, "Take the letter to the inn.");
    assert_eq!(engine.quest().journal.len(), 2);
}

/// Optional groups pay out only the chosen group alongside "ALL".
#[test]
fn test_chosen_reward_group() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Bounty");
    let claim = quest.add_step("Claim");
    {
        let step = quest.step_mut(claim).unwrap();
        step.rewards.push(Reward::adjust(keys::FAME, 1));
        step.rewards.push(Reward::adjust(keys::GOLD, 20).in_group("Gold"));
        step.rewards.push(Reward::adjust(keys::NOTORIETY, 5).in_group("Fear"));
    }

    let mut engine = QuestEngine::new(quest)
        .unwrap()
        .with_choices(ScriptedChoices::new().with_group("Fear"));
    engine.reset();
    engine.activate(&mut ctx, hero).unwrap();

    let hero = ctx.data.object(hero).unwrap();
    assert_eq!(hero.get_int(THIS, keys::FAME), Some(1));
    assert_eq!(hero.get_int(THIS, keys::GOLD), None);
    assert_eq!(hero.get_int(THIS, keys::NOTORIETY), Some(5));
}

/// With auto-activation off a fresh quest waits for `activate`.
#[test]
fn test_manual_activation() {
    let (mut ctx, hero) = world();
    let mut quest = Quest::new("Sealed Orders");
    let open = quest.add_step("Open");
    quest.step_mut(open).unwrap().rewards.push(Reward::information("The seal breaks."));

    let mut engine = QuestEngine::new(quest)
        .unwrap()
        .with_config(EngineConfig::default().with_auto_activate(false));
    engine.reset();
    assert_eq!(engine.quest().state, QuestState::Assigned);
    assert!(!engine.report_event(&mut ctx, &QuestEvent::any(), hero).unwrap());
    assert!(ctx.messages().is_empty());

    engine.activate(&mut ctx, hero).unwrap();
    assert_eq!(engine.quest().state, QuestState::Active);
    assert_eq!(ctx.take_messages(), ["The seal breaks."]);
}
