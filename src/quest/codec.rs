//! Reading and writing quests as stored objects.
//!
//! ## Layout
//!
//! The quest is an object marked `quest` in "this", holding one child per
//! step (marked `step`), per minor character (`quest_minor_character`) and
//! per quest location (`quest_location`).
//!
//! A step object keeps its scalar fields and link lists in "this". Each
//! requirement is a block `req0`, `req1`, ... and each reward a block
//! `rew0`, `rew1`, ..., keyed as listed in [`descriptor`](super::descriptor).
//! Runtime progress lives in a `progress` block. The quest's journal is a
//! `journal` block of nested entry blocks.

use std::str::FromStr;

use tracing::debug;

use super::descriptor::{requirement_fields, reward_fields, PropertyDescriptor};
use super::error::QuestError;
use super::journal::{Journal, JournalEntry, JournalKind};
use super::quest::{Quest, QuestLocation, QuestMinorCharacter, QuestState};
use super::requirement::{Comparison, Requirement, RequirementKind};
use super::reward::{
    CompanionKind, InventoryDestination, RelationshipChange, Reward, RewardKind, SiteDraw,
    DEFAULT_GROUP,
};
use super::step::{LogicType, QuestStep, StepLinks, StepProgress, StepState};
use crate::core::{GamePhase, MagicColor, ObjectId, StepId};
use crate::engine::{MissionAction, TradeAction};
use crate::query::PredicateBuilder;
use crate::store::{AttributeValue, Block, GameData, GameObject, StoreError, THIS};

pub const QUEST: &str = "quest";
pub const STEP: &str = "step";
pub const QUEST_MINOR_CHARACTER: &str = "quest_minor_character";
pub const QUEST_LOCATION: &str = "quest_location";

pub const REQUIREMENT_PREFIX: &str = "req";
pub const REWARD_PREFIX: &str = "rew";
pub const KIND: &str = "kind";
pub const NEGATE: &str = "negate";
pub const GROUP: &str = "group";

pub const REQUIRED_STEPS: &str = "required_steps";
pub const FAIL_STEPS: &str = "fail_steps";
pub const PREEMPTED_STEPS: &str = "preempted_steps";

const STEP_ID: &str = "step_id";
const STATE: &str = "state";
const DESCRIPTION: &str = "description";
const LOGIC_TYPE: &str = "logic_type";
const REQ_TYPE: &str = "req_type";
const PROGRESS: &str = "progress";
const JOURNAL: &str = "journal";
const ATTRIBUTES: &str = "attributes";
const CANDIDATES: &str = "candidates";

/// Is `name` the prefix followed only by digits (`req0`, `rew12`)?
#[must_use]
pub fn is_indexed_block(name: &str, prefix: &str) -> bool {
    block_index(name, prefix).is_some()
}

fn block_index(name: &str, prefix: &str) -> Option<usize> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Indexed blocks of an object sorted by index.
fn indexed_blocks<'a>(obj: &'a GameObject, prefix: &str) -> Vec<(&'a str, &'a Block)> {
    let mut found: Vec<(usize, &str, &Block)> = obj
        .blocks()
        .iter()
        .filter_map(|(name, block)| block_index(name, prefix).map(|i| (i, name, block)))
        .collect();
    found.sort_by_key(|(i, _, _)| *i);
    found.into_iter().map(|(_, name, block)| (name, block)).collect()
}

fn format_flag(on: bool) -> &'static str {
    if on {
        "true"
    } else {
        "false"
    }
}

/// Typed reads from one block, reporting errors against its name.
struct BlockReader<'a> {
    name: &'a str,
    block: &'a Block,
}

impl<'a> BlockReader<'a> {
    fn new(name: &'a str, block: &'a Block) -> Self {
        Self { name, block }
    }

    fn missing(&self, key: &str) -> QuestError {
        QuestError::MissingField {
            block: self.name.to_string(),
            key: key.to_string(),
        }
    }

    fn invalid(&self, key: &str, value: &str) -> QuestError {
        QuestError::InvalidField {
            block: self.name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn require(&self, fields: &[PropertyDescriptor]) -> Result<(), QuestError> {
        match fields.iter().find(|f| f.required && !self.block.contains_key(f.key)) {
            Some(f) => Err(self.missing(f.key)),
            None => Ok(()),
        }
    }

    fn opt_text(&self, key: &str) -> Result<Option<&'a str>, QuestError> {
        match self.block.get(key) {
            None => Ok(None),
            Some(AttributeValue::Scalar(s)) => Ok(Some(s)),
            Some(other) => Err(StoreError::mismatch(self.name, key, "scalar", other.kind_name()).into()),
        }
    }

    fn text(&self, key: &str) -> Result<String, QuestError> {
        self.opt_text(key)?
            .map(str::to_string)
            .ok_or_else(|| self.missing(key))
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<T, QuestError> {
        let raw = self.opt_text(key)?.ok_or_else(|| self.missing(key))?;
        raw.trim().parse().map_err(|_| self.invalid(key, raw))
    }

    /// Absent reads as false; an empty value as true.
    fn flag(&self, key: &str) -> Result<bool, QuestError> {
        match self.opt_text(key)? {
            None => Ok(false),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "" | "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(self.invalid(key, raw)),
            },
        }
    }

    fn select<T>(&self, key: &str, parse: fn(&str) -> Option<T>) -> Result<T, QuestError> {
        let raw = self.opt_text(key)?.ok_or_else(|| self.missing(key))?;
        parse(raw).ok_or_else(|| self.invalid(key, raw))
    }

    fn opt_select<T>(&self, key: &str, parse: fn(&str) -> Option<T>, default: T) -> Result<T, QuestError> {
        match self.opt_text(key)? {
            None => Ok(default),
            Some(raw) => parse(raw).ok_or_else(|| self.invalid(key, raw)),
        }
    }

    /// A list; a lone scalar is read as a one-item list.
    fn list(&self, key: &str) -> Result<Vec<String>, QuestError> {
        match self.block.get(key) {
            None => Err(self.missing(key)),
            Some(AttributeValue::List(items)) => Ok(items.clone()),
            Some(AttributeValue::Scalar(s)) if s.trim().is_empty() => Ok(Vec::new()),
            Some(AttributeValue::Scalar(s)) => Ok(vec![s.clone()]),
            Some(other) => Err(StoreError::mismatch(self.name, key, "list", other.kind_name()).into()),
        }
    }

    fn steps(&self, key: &str) -> Result<Vec<StepId>, QuestError> {
        self.list(key)?
            .iter()
            .map(|raw| raw.trim().parse().map_err(|_| self.invalid(key, raw)))
            .collect()
    }

    fn opt_steps(&self, key: &str) -> Result<StepLinks, QuestError> {
        if !self.block.contains_key(key) {
            return Ok(StepLinks::new());
        }
        Ok(self.steps(key)?.into_iter().collect())
    }
}

fn step_list(ids: &[StepId]) -> AttributeValue {
    AttributeValue::List(ids.iter().map(|s| s.raw().to_string()).collect())
}

// === Requirements ===

/// Encode a requirement as a block.
#[must_use]
pub fn requirement_to_block(req: &Requirement) -> Block {
    let mut b = Block::new();
    b.insert(KIND, req.kind.name().into());
    if req.negate {
        b.insert(NEGATE, "true".into());
    }
    match &req.kind {
        RequirementKind::AttributeThreshold {
            attribute,
            threshold,
            comparison,
        } => {
            b.insert("attribute", attribute.as_str().into());
            b.insert("threshold", (*threshold).into());
            b.insert("comparison", comparison.as_str().into());
        }
        RequirementKind::OccupyLocation { location } => {
            b.insert("location", location.as_str().into());
        }
        RequirementKind::LootAcquired { item } | RequirementKind::InventoryContains { item } => {
            b.insert("item", item.as_str().into());
        }
        RequirementKind::Kill {
            denizen,
            count,
            step_only,
        } => {
            b.insert("denizen", denizen.as_str().into());
            b.insert("count", (*count).into());
            b.insert("step_only", format_flag(*step_only).into());
        }
        RequirementKind::TimePassed { days } => {
            b.insert("days", (*days).into());
        }
        RequirementKind::GamePhase { phase } => {
            b.insert("phase", phase.as_str().into());
        }
        RequirementKind::Active | RequirementKind::NoDenizensInClearing => {}
        RequirementKind::SearchResult { table, result } => {
            b.insert("table", table.as_str().into());
            b.insert("result", result.as_str().into());
        }
        RequirementKind::MissionCampaign { mission, action } => {
            b.insert("mission", mission.as_str().into());
            b.insert("action", action.as_str().into());
        }
        RequirementKind::Trade { action, item } => {
            b.insert("action", action.as_str().into());
            b.insert("item", item.as_str().into());
        }
        RequirementKind::Discovery { discovery } => {
            b.insert("discovery", discovery.as_str().into());
        }
        RequirementKind::LearnOrAwakenSpell { spell, awaken } => {
            b.insert("spell", spell.as_str().into());
            b.insert("awaken", format_flag(*awaken).into());
        }
        RequirementKind::MinorCharacterPresent { name } => {
            b.insert("minor_character", name.as_str().into());
        }
        RequirementKind::PathTraversed { clearings } => {
            b.insert("clearings", AttributeValue::List(clearings.clone()));
        }
        RequirementKind::ColorMagicPresent { color } => {
            b.insert("color", color.as_str().into());
        }
    }
    b
}

/// Decode a requirement block, checking required fields first.
pub fn requirement_from_block(name: &str, block: &Block) -> Result<Requirement, QuestError> {
    let r = BlockReader::new(name, block);
    let kind_name = r.text(KIND)?;
    let fields = requirement_fields(&kind_name).ok_or_else(|| QuestError::UnknownKind {
        block: name.to_string(),
        kind: kind_name.clone(),
    })?;
    r.require(fields)?;

    let kind = match kind_name.as_str() {
        "AttributeThreshold" => RequirementKind::AttributeThreshold {
            attribute: r.text("attribute")?,
            threshold: r.number("threshold")?,
            comparison: r.opt_select("comparison", Comparison::parse, Comparison::AtLeast)?,
        },
        "OccupyLocation" => RequirementKind::OccupyLocation {
            location: r.text("location")?,
        },
        "LootAcquired" => RequirementKind::LootAcquired { item: r.text("item")? },
        "Kill" => RequirementKind::Kill {
            denizen: r.text("denizen")?,
            count: r.number("count")?,
            step_only: r.flag("step_only")?,
        },
        "TimePassed" => RequirementKind::TimePassed { days: r.number("days")? },
        "GamePhase" => RequirementKind::GamePhase {
            phase: r.select("phase", GamePhase::parse)?,
        },
        "Active" => RequirementKind::Active,
        "SearchResult" => RequirementKind::SearchResult {
            table: r.text("table")?,
            result: r.opt_text("result")?.unwrap_or_default().to_string(),
        },
        "InventoryContains" => RequirementKind::InventoryContains { item: r.text("item")? },
        "MissionCampaign" => RequirementKind::MissionCampaign {
            mission: r.text("mission")?,
            action: r.select("action", MissionAction::parse)?,
        },
        "Trade" => RequirementKind::Trade {
            action: r.select("action", TradeAction::parse)?,
            item: r.text("item")?,
        },
        "Discovery" => RequirementKind::Discovery {
            discovery: r.text("discovery")?,
        },
        "NoDenizensInClearing" => RequirementKind::NoDenizensInClearing,
        "LearnOrAwakenSpell" => RequirementKind::LearnOrAwakenSpell {
            spell: r.text("spell")?,
            awaken: r.flag("awaken")?,
        },
        "MinorCharacterPresent" => RequirementKind::MinorCharacterPresent {
            name: r.text("minor_character")?,
        },
        "PathTraversed" => RequirementKind::PathTraversed {
            clearings: r.list("clearings")?,
        },
        "ColorMagicPresent" => RequirementKind::ColorMagicPresent {
            color: r.select("color", MagicColor::parse)?,
        },
        other => {
            return Err(QuestError::UnknownKind {
                block: name.to_string(),
                kind: other.to_string(),
            })
        }
    };

    Ok(Requirement {
        kind,
        negate: r.flag(NEGATE)?,
    })
}

// === Rewards ===

/// Encode a reward as a block.
#[must_use]
pub fn reward_to_block(reward: &Reward) -> Block {
    let mut b = Block::new();
    b.insert(KIND, reward.kind.name().into());
    b.insert(GROUP, reward.group.as_str().into());
    match &reward.kind {
        RewardKind::EmitInformation { text } => {
            b.insert("text", text.as_str().into());
        }
        RewardKind::AppendJournalEntry { key, text, kind } => {
            b.insert("entry_key", key.as_str().into());
            b.insert("text", text.as_str().into());
            b.insert("entry_kind", kind.as_str().into());
        }
        RewardKind::GrantOrRemoveItem { item, remove } => {
            b.insert("item", item.as_str().into());
            b.insert("remove", format_flag(*remove).into());
        }
        RewardKind::AdjustAttribute { attribute, delta } => {
            b.insert("attribute", attribute.as_str().into());
            b.insert("delta", (*delta).into());
        }
        RewardKind::GrantCompanion { kind, companion } => {
            b.insert("companion_kind", kind.as_str().into());
            b.insert("companion", companion.as_str().into());
        }
        RewardKind::Teleport { location } => {
            b.insert("location", location.as_str().into());
        }
        RewardKind::Relationship { group, change } => {
            let (mode, amount) = match change {
                RelationshipChange::Set(v) => ("Set", *v),
                RelationshipChange::Change(v) => ("Change", *v),
            };
            b.insert("native_group", group.as_str().into());
            b.insert("mode", mode.into());
            b.insert("amount", amount.into());
        }
        RewardKind::AlterHide { hidden } => {
            b.insert("hidden", format_flag(*hidden).into());
        }
        RewardKind::AlterBlock { blocked } => {
            b.insert("blocked", format_flag(*blocked).into());
        }
        RewardKind::GrantOrRemoveMinorCharacter { name, remove } => {
            b.insert("minor_character", name.as_str().into());
            b.insert("remove", format_flag(*remove).into());
        }
        RewardKind::SendInventory { destination } => match destination {
            InventoryDestination::Location(location) => {
                b.insert("destination", "Location".into());
                b.insert("location", location.as_str().into());
            }
            InventoryDestination::Default => {
                b.insert("destination", "Default".into());
            }
        },
        RewardKind::RevealPaths { paths } => {
            b.insert("paths", AttributeValue::List(paths.clone()));
        }
        RewardKind::SummonGuardian { guardian } => {
            b.insert("guardian", guardian.as_str().into());
        }
        RewardKind::ScareMonsters { monsters } => {
            b.insert("monsters", monsters.as_str().into());
        }
        RewardKind::MarkDenizen { denizen, mark } => {
            b.insert("denizen", denizen.as_str().into());
            b.insert("mark", mark.as_str().into());
        }
        RewardKind::DrawTreasureOrSpellFromSite { site, draw } => {
            b.insert("site", site.as_str().into());
            b.insert("draw", draw.as_str().into());
        }
        RewardKind::OfferNextStepChoice { steps } => {
            b.insert("steps", step_list(steps));
        }
        RewardKind::StripInventory
        | RewardKind::CompleteQuest
        | RewardKind::FailQuest
        | RewardKind::ActivateQuest
        | RewardKind::ResetQuest => {}
    }
    b
}

/// Decode a reward block, checking required fields first. A missing or
/// empty group reads as the default group.
pub fn reward_from_block(name: &str, block: &Block) -> Result<Reward, QuestError> {
    let r = BlockReader::new(name, block);
    let kind_name = r.text(KIND)?;
    let fields = reward_fields(&kind_name).ok_or_else(|| QuestError::UnknownKind {
        block: name.to_string(),
        kind: kind_name.clone(),
    })?;
    r.require(fields)?;

    let kind = match kind_name.as_str() {
        "EmitInformation" => RewardKind::EmitInformation { text: r.text("text")? },
        "AppendJournalEntry" => RewardKind::AppendJournalEntry {
            key: r.text("entry_key")?,
            text: r.text("text")?,
            kind: r.opt_select("entry_kind", JournalKind::parse, JournalKind::Pending)?,
        },
        "GrantOrRemoveItem" => RewardKind::GrantOrRemoveItem {
            item: r.text("item")?,
            remove: r.flag("remove")?,
        },
        "AdjustAttribute" => RewardKind::AdjustAttribute {
            attribute: r.text("attribute")?,
            delta: r.number("delta")?,
        },
        "GrantCompanion" => RewardKind::GrantCompanion {
            kind: r.select("companion_kind", CompanionKind::parse)?,
            companion: r.text("companion")?,
        },
        "Teleport" => RewardKind::Teleport {
            location: r.text("location")?,
        },
        "Relationship" => {
            let amount = r.number("amount")?;
            let change = match r.text("mode")?.trim() {
                m if m.eq_ignore_ascii_case("set") => RelationshipChange::Set(amount),
                m if m.eq_ignore_ascii_case("change") => RelationshipChange::Change(amount),
                m => return Err(r.invalid("mode", m)),
            };
            RewardKind::Relationship {
                group: r.text("native_group")?,
                change,
            }
        }
        "CompleteQuest" => RewardKind::CompleteQuest,
        "FailQuest" => RewardKind::FailQuest,
        "SummonGuardian" => RewardKind::SummonGuardian {
            guardian: r.text("guardian")?,
        },
        "AlterHide" => RewardKind::AlterHide {
            hidden: r.flag("hidden")?,
        },
        "AlterBlock" => RewardKind::AlterBlock {
            blocked: r.flag("blocked")?,
        },
        "GrantOrRemoveMinorCharacter" => RewardKind::GrantOrRemoveMinorCharacter {
            name: r.text("minor_character")?,
            remove: r.flag("remove")?,
        },
        "ScareMonsters" => RewardKind::ScareMonsters {
            monsters: r.text("monsters")?,
        },
        "MarkDenizen" => RewardKind::MarkDenizen {
            denizen: r.text("denizen")?,
            mark: r.text("mark")?,
        },
        "StripInventory" => RewardKind::StripInventory,
        "SendInventory" => {
            let destination = match r.text("destination")?.trim() {
                d if d.eq_ignore_ascii_case("default") => InventoryDestination::Default,
                d if d.eq_ignore_ascii_case("location") => {
                    InventoryDestination::Location(r.text("location")?)
                }
                d => return Err(r.invalid("destination", d)),
            };
            RewardKind::SendInventory { destination }
        }
        "RevealPaths" => RewardKind::RevealPaths {
            paths: r.list("paths")?,
        },
        "OfferNextStepChoice" => RewardKind::OfferNextStepChoice {
            steps: r.steps("steps")?,
        },
        "DrawTreasureOrSpellFromSite" => RewardKind::DrawTreasureOrSpellFromSite {
            site: r.text("site")?,
            draw: r.select("draw", SiteDraw::parse)?,
        },
        "ActivateQuest" => RewardKind::ActivateQuest,
        "ResetQuest" => RewardKind::ResetQuest,
        other => {
            return Err(QuestError::UnknownKind {
                block: name.to_string(),
                kind: other.to_string(),
            })
        }
    };

    let group = match r.opt_text(GROUP)? {
        Some(g) if !g.trim().is_empty() => g.to_string(),
        _ => DEFAULT_GROUP.to_string(),
    };
    Ok(Reward { kind, group })
}

// === Steps ===

fn write_step(data: &mut GameData, quest: &Quest, step: &QuestStep) -> ObjectId {
    let id = data.create_object(step.name.clone());
    let Some(mut e) = data.edit(id) else {
        return id;
    };
    e.set(THIS, STEP, "");
    e.set(THIS, STEP_ID, i64::from(step.id.raw()));
    e.set(THIS, DESCRIPTION, step.description.as_str());
    e.set(THIS, LOGIC_TYPE, step.logic_type.as_str());
    e.set(THIS, REQ_TYPE, step.req_type.as_str());
    e.set(THIS, REQUIRED_STEPS, step_list(&step.required_steps));
    e.set(THIS, FAIL_STEPS, step_list(&step.fail_steps));
    e.set(THIS, PREEMPTED_STEPS, step_list(&step.preempted_steps));

    for (i, req) in step.requirements.iter().enumerate() {
        e.set_block(&format!("{REQUIREMENT_PREFIX}{i}"), requirement_to_block(req));
    }
    for (i, reward) in step.rewards.iter().enumerate() {
        e.set_block(&format!("{REWARD_PREFIX}{i}"), reward_to_block(reward));
    }

    let progress = quest.progress(step.id);
    if progress != StepProgress::default() || quest.is_rewarded(step.id) {
        let mut p = Block::new();
        p.insert(STATE, progress.state.as_str().into());
        if let Some(day) = progress.started_day {
            p.insert("started_day", day.into());
        }
        p.insert("kill_baseline", (progress.kill_baseline as i64).into());
        p.insert("move_baseline", (progress.move_baseline as i64).into());
        p.insert("rewarded", format_flag(quest.is_rewarded(step.id)).into());
        e.set_block(PROGRESS, p);
    }
    id
}

fn read_step(obj: &GameObject) -> Result<(QuestStep, Option<(StepProgress, bool)>), QuestError> {
    let this = obj.get_block(THIS).cloned().unwrap_or_default();
    let name = format!("{}.{THIS}", obj.name);
    let r = BlockReader::new(&name, &this);

    let id = StepId::new(r.number(STEP_ID)?);
    let mut step = QuestStep::new(id, obj.name.clone())
        .with_description(r.opt_text(DESCRIPTION)?.unwrap_or_default())
        .with_logic(r.opt_select(LOGIC_TYPE, LogicType::parse, LogicType::And)?)
        .with_req_type(r.opt_select(REQ_TYPE, LogicType::parse, LogicType::And)?);
    step.required_steps = r.opt_steps(REQUIRED_STEPS)?;
    step.fail_steps = r.opt_steps(FAIL_STEPS)?;
    step.preempted_steps = r.opt_steps(PREEMPTED_STEPS)?;

    for (block_name, block) in indexed_blocks(obj, REQUIREMENT_PREFIX) {
        step.requirements.push(requirement_from_block(block_name, block)?);
    }
    for (block_name, block) in indexed_blocks(obj, REWARD_PREFIX) {
        step.rewards.push(reward_from_block(block_name, block)?);
    }

    let progress = match obj.get_block(PROGRESS) {
        None => None,
        Some(block) => {
            let p = BlockReader::new(PROGRESS, block);
            let progress = StepProgress {
                state: p.opt_select(STATE, StepState::parse, StepState::Inactive)?,
                started_day: match p.opt_text("started_day")? {
                    Some(_) => Some(p.number("started_day")?),
                    None => None,
                },
                kill_baseline: p.number("kill_baseline")?,
                move_baseline: p.number("move_baseline")?,
            };
            Some((progress, p.flag("rewarded")?))
        }
    };
    Ok((step, progress))
}

// === Quests ===

/// Write a quest into `data` as a new object tree. Returns the quest
/// object's id.
pub fn write_quest(data: &mut GameData, quest: &Quest) -> Result<ObjectId, QuestError> {
    let root = data.create_object(quest.name.clone());
    if let Some(mut e) = data.edit(root) {
        e.set(THIS, QUEST, "");
        e.set(THIS, STATE, quest.state.as_str());
        e.set(THIS, DESCRIPTION, quest.description.as_str());

        let mut journal = Block::new();
        for (i, entry) in quest.journal.iter().enumerate() {
            let mut b = Block::new();
            b.insert("key", entry.key.as_str().into());
            b.insert("text", entry.text.as_str().into());
            b.insert(KIND, entry.kind.as_str().into());
            journal.insert(i.to_string(), AttributeValue::Block(b));
        }
        e.set_block(JOURNAL, journal);
    }

    for step in quest.steps() {
        let child = write_step(data, quest, step);
        data.hold(root, child)?;
    }

    for mc in &quest.minor_characters {
        let child = data.create_object(mc.name.clone());
        if let Some(mut e) = data.edit(child) {
            e.set(THIS, QUEST_MINOR_CHARACTER, "");
            e.set_block(ATTRIBUTES, mc.attributes.clone());
        }
        data.hold(root, child)?;
    }

    for location in &quest.locations {
        let child = data.create_object(location.name.clone());
        if let Some(mut e) = data.edit(child) {
            e.set(THIS, QUEST_LOCATION, "");
            e.set_list(THIS, CANDIDATES, location.candidates.clone());
        }
        data.hold(root, child)?;
    }

    debug!(quest = %quest.name, %root, steps = quest.steps().len(), "wrote quest");
    Ok(root)
}

/// Read the quest stored at `id`, validating its step graph.
pub fn read_quest(data: &GameData, id: ObjectId) -> Result<Quest, QuestError> {
    let obj = data.object(id).ok_or(StoreError::UnknownObject(id))?;
    if !obj.has(THIS, QUEST) {
        return Err(QuestError::NotAQuest(id));
    }

    let mut quest = Quest::new(obj.name.clone());
    quest.description = obj.get_scalar(THIS, DESCRIPTION).unwrap_or_default().to_string();
    let this_name = format!("{}.{THIS}", obj.name);
    let this = obj.get_block(THIS).cloned().unwrap_or_default();
    quest.state = BlockReader::new(&this_name, &this).opt_select(STATE, QuestState::parse, QuestState::Assigned)?;

    let is_step = PredicateBuilder::new().present(STEP).build();
    let is_minor = PredicateBuilder::new().present(QUEST_MINOR_CHARACTER).build();
    let is_location = PredicateBuilder::new().present(QUEST_LOCATION).build();

    for child in data.children(id) {
        if is_step.matches(child) {
            let (step, progress) = read_step(child)?;
            let step_id = step.id;
            quest.push_step(step)?;
            if let Some((progress, rewarded)) = progress {
                quest.set_progress(step_id, progress);
                if rewarded {
                    quest.mark_rewarded(step_id);
                }
            }
        } else if is_minor.matches(child) {
            quest.minor_characters.push(QuestMinorCharacter {
                name: child.name.clone(),
                attributes: child.get_block(ATTRIBUTES).cloned().unwrap_or_default(),
            });
        } else if is_location.matches(child) {
            quest.locations.push(QuestLocation::new(
                child.name.clone(),
                child.list(THIS, CANDIDATES).iter().cloned(),
            ));
        }
    }

    if let Some(journal) = obj.get_block(JOURNAL) {
        let entries: Result<Journal, QuestError> = journal
            .iter()
            .map(|(index, value)| {
                let block = value.as_block().ok_or_else(|| {
                    QuestError::Store(StoreError::mismatch(JOURNAL, index, "block", value.kind_name()))
                })?;
                let r = BlockReader::new(JOURNAL, block);
                Ok(JournalEntry::new(
                    r.text("key")?,
                    r.opt_text("text")?.unwrap_or_default(),
                    r.opt_select(KIND, JournalKind::parse, JournalKind::Pending)?,
                ))
            })
            .collect();
        quest.journal = entries?;
    }

    quest.validate()?;
    debug!(quest = %quest.name, steps = quest.steps().len(), "read quest");
    Ok(quest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::step::LinkKind;

    fn sample_requirements() -> Vec<Requirement> {
        vec![
            Requirement::attribute_at_least("fame", 10),
            Requirement::occupy("Lair"),
            Requirement::new(RequirementKind::LootAcquired { item: "Crown".into() }),
            Requirement::new(RequirementKind::Kill { denizen: "Giant".into(), count: 3, step_only: true }),
            Requirement::new(RequirementKind::TimePassed { days: 7 }),
            Requirement::new(RequirementKind::GamePhase { phase: GamePhase::Evening }),
            Requirement::active(),
            Requirement::new(RequirementKind::SearchResult { table: "Locate".into(), result: "Passages".into() }),
            Requirement::new(RequirementKind::InventoryContains { item: "Amulet".into() }).negated(),
            Requirement::new(RequirementKind::MissionCampaign { mission: "Escort".into(), action: MissionAction::Complete }),
            Requirement::new(RequirementKind::Trade { action: TradeAction::Buy, item: "Horse".into() }),
            Requirement::new(RequirementKind::Discovery { discovery: "Hidden Path".into() }),
            Requirement::new(RequirementKind::NoDenizensInClearing),
            Requirement::new(RequirementKind::LearnOrAwakenSpell { spell: "Peace".into(), awaken: true }),
            Requirement::new(RequirementKind::MinorCharacterPresent { name: "Princess".into() }),
            Requirement::new(RequirementKind::PathTraversed { clearings: vec!["Cave 1".into(), "Cave 2".into()] }),
            Requirement::new(RequirementKind::ColorMagicPresent { color: MagicColor::Black }),
        ]
    }

    fn sample_rewards(next: StepId) -> Vec<Reward> {
        vec![
            Reward::information("Well done"),
            Reward::new(RewardKind::AppendJournalEntry { key: "note".into(), text: "x".into(), kind: JournalKind::Finished }),
            Reward::new(RewardKind::GrantOrRemoveItem { item: "treasure,!large".into(), remove: false }),
            Reward::adjust("gold", -5).in_group("Gold"),
            Reward::new(RewardKind::GrantCompanion { kind: CompanionKind::Hireling, companion: "native=Lancers".into() }),
            Reward::new(RewardKind::Teleport { location: "Lair".into() }),
            Reward::new(RewardKind::Relationship { group: "Order".into(), change: RelationshipChange::Change(1) }),
            Reward::complete_quest(),
            Reward::fail_quest(),
            Reward::new(RewardKind::SummonGuardian { guardian: "guardian".into() }),
            Reward::new(RewardKind::AlterHide { hidden: true }),
            Reward::new(RewardKind::AlterBlock { blocked: false }),
            Reward::new(RewardKind::GrantOrRemoveMinorCharacter { name: "Princess".into(), remove: true }),
            Reward::new(RewardKind::ScareMonsters { monsters: "monster".into() }),
            Reward::new(RewardKind::MarkDenizen { denizen: "denizen".into(), mark: "hunted".into() }),
            Reward::new(RewardKind::StripInventory),
            Reward::new(RewardKind::SendInventory { destination: InventoryDestination::Location("Lair".into()) }),
            Reward::new(RewardKind::SendInventory { destination: InventoryDestination::Default }),
            Reward::new(RewardKind::RevealPaths { paths: vec!["Secret Passage".into()] }),
            Reward::new(RewardKind::OfferNextStepChoice { steps: vec![next] }),
            Reward::new(RewardKind::DrawTreasureOrSpellFromSite { site: "site=Vault".into(), draw: SiteDraw::Spell }),
            Reward::new(RewardKind::ActivateQuest),
            Reward::new(RewardKind::ResetQuest),
        ]
    }

    #[test]
    fn test_every_requirement_kind_survives_a_block() {
        for req in sample_requirements() {
            let block = requirement_to_block(&req);
            let fields = requirement_fields(req.kind.name()).unwrap();
            for (key, _) in block.iter() {
                assert!(
                    [KIND, NEGATE].contains(&key) || fields.iter().any(|f| f.key == key),
                    "{} writes undeclared key {key}",
                    req.kind.name()
                );
            }
            assert_eq!(requirement_from_block("req0", &block).unwrap(), req);
        }
    }

    #[test]
    fn test_every_reward_kind_survives_a_block() {
        for reward in sample_rewards(StepId(1)) {
            let block = reward_to_block(&reward);
            let fields = reward_fields(reward.kind.name()).unwrap();
            for (key, _) in block.iter() {
                assert!(
                    [KIND, GROUP].contains(&key) || fields.iter().any(|f| f.key == key),
                    "{} writes undeclared key {key}",
                    reward.kind.name()
                );
            }
            assert_eq!(reward_from_block("rew0", &block).unwrap(), reward);
        }
    }

    #[test]
    fn test_missing_required_field() {
        let mut block = Block::new();
        block.insert(KIND, "Kill".into());
        block.insert("denizen", "Giant".into());
        assert_eq!(
            requirement_from_block("req3", &block),
            Err(QuestError::MissingField { block: "req3".into(), key: "count".into() })
        );
    }

    #[test]
    fn test_bad_values_are_reported() {
        let mut block = Block::new();
        block.insert(KIND, "Kill".into());
        block.insert("denizen", "Giant".into());
        block.insert("count", "lots".into());
        assert!(matches!(
            requirement_from_block("req0", &block),
            Err(QuestError::InvalidField { .. })
        ));

        block.insert(KIND, "Teleportation".into());
        assert!(matches!(
            requirement_from_block("req0", &block),
            Err(QuestError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_missing_group_is_default() {
        let mut block = Block::new();
        block.insert(KIND, "CompleteQuest".into());
        assert_eq!(reward_from_block("rew0", &block).unwrap().group, DEFAULT_GROUP);
        block.insert(GROUP, "".into());
        assert_eq!(reward_from_block("rew0", &block).unwrap().group, DEFAULT_GROUP);
    }

    #[test]
    fn test_quest_round_trip() {
        let mut quest = Quest::new("Rescue the Princess");
        quest.description = "She is held in the Lair".into();
        quest.locations.push(QuestLocation::new("Lair", ["Cave 4", "Cave 6"]));
        quest.minor_characters.push(QuestMinorCharacter::new("Princess").with_attribute("gender", "female"));

        let find = quest.add_step("Find her");
        let escort = quest.add_step("Escort her home");
        {
            let step = quest.step_mut(find).unwrap();
            step.requirements = sample_requirements();
            step.req_type = LogicType::Or;
        }
        quest.step_mut(escort).unwrap().rewards = sample_rewards(find);
        quest.link(escort, find, LinkKind::Required).unwrap();
        quest.journal.append(JournalEntry::new("Find her", "Search the caves", JournalKind::Pending));
        quest.set_progress(find, StepProgress {
            state: StepState::Complete,
            started_day: Some(3),
            kill_baseline: 2,
            move_baseline: 5,
        });
        quest.mark_rewarded(find);

        let mut data = GameData::new();
        let root = write_quest(&mut data, &quest).unwrap();
        let back = read_quest(&data, root).unwrap();
        assert_eq!(back, quest);
    }

    #[test]
    fn test_non_quest_object() {
        let mut data = GameData::new();
        let id = data.create_object("Sword");
        assert_eq!(read_quest(&data, id), Err(QuestError::NotAQuest(id)));
    }

    #[test]
    fn test_indexed_blocks_sort_numerically() {
        assert!(is_indexed_block("req10", REQUIREMENT_PREFIX));
        assert!(!is_indexed_block("required", REQUIREMENT_PREFIX));
        assert!(!is_indexed_block("req", REQUIREMENT_PREFIX));

        let obj = GameObject::new(ObjectId(0), "step")
            .with("req10", KIND, "Active")
            .with("req2", KIND, "Active")
            .with("rew0", KIND, "FailQuest");
        let names: Vec<_> = indexed_blocks(&obj, REQUIREMENT_PREFIX).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["req2", "req10"]);
    }
}
