//! Authoring metadata for requirement and reward kinds.
//!
//! Editors build their forms from these tables: for each kind, the block
//! keys it reads, how each should be edited, and which must be present.
//! The quest model itself never looks at labels or selections.
//!
//! ```
//! use realm_quest::quest::descriptor::{requirement_fields, FieldKind};
//!
//! let kill = requirement_fields("Kill").unwrap();
//! assert_eq!(kill[0].key, "denizen");
//! assert_eq!(kill[0].field, FieldKind::Regex);
//! assert!(requirement_fields("Nonsense").is_none());
//! ```

/// How a field is edited and stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text scalar.
    Text,
    /// Name filter (regular expression) scalar.
    Regex,
    /// Predicate string selecting objects.
    Predicate,
    /// Integer scalar.
    Number,
    /// "true"/"false" scalar; absent reads as false.
    Flag,
    /// One of a fixed set of scalars.
    Selection(&'static [&'static str]),
    /// List of step ids.
    StepList,
    /// List of strings.
    TextList,
}

/// One editable field of a requirement or reward block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub field: FieldKind,
    pub required: bool,
}

const fn required(key: &'static str, label: &'static str, field: FieldKind) -> PropertyDescriptor {
    PropertyDescriptor {
        key,
        label,
        field,
        required: true,
    }
}

const fn optional(key: &'static str, label: &'static str, field: FieldKind) -> PropertyDescriptor {
    PropertyDescriptor {
        key,
        label,
        field,
        required: false,
    }
}

// === Selections ===

pub const COMPARISONS: &[&str] = &["AtLeast", "AtMost", "Equal"];
pub const PHASES: &[&str] = &["Birdsong", "Daylight", "Sunset", "Evening"];
pub const COLORS: &[&str] = &["White", "Grey", "Gold", "Purple", "Black"];
pub const MISSION_ACTIONS: &[&str] = &["Pickup", "Complete", "Abandon", "Fail"];
pub const TRADE_ACTIONS: &[&str] = &["Buy", "Sell"];
pub const COMPANION_KINDS: &[&str] = &["Hireling", "Visitor", "Companion"];
pub const RELATIONSHIP_MODES: &[&str] = &["Set", "Change"];
pub const DESTINATIONS: &[&str] = &["Location", "Default"];
pub const JOURNAL_KINDS: &[&str] = &["Pending", "Finished", "Failed"];
pub const DRAWS: &[&str] = &["Treasure", "Spell"];

/// Keys every requirement block carries.
pub const REQUIREMENT_COMMON: &[PropertyDescriptor] = &[
    required("kind", "Type", FieldKind::Text),
    optional("negate", "Not", FieldKind::Flag),
];

/// Keys every reward block carries.
pub const REWARD_COMMON: &[PropertyDescriptor] = &[
    required("kind", "Type", FieldKind::Text),
    optional("group", "Reward group", FieldKind::Text),
];

// === Requirement tables ===

const REQ_ATTRIBUTE_THRESHOLD: &[PropertyDescriptor] = &[
    required("attribute", "Attribute", FieldKind::Text),
    required("threshold", "Value", FieldKind::Number),
    optional("comparison", "Comparison", FieldKind::Selection(COMPARISONS)),
];

const REQ_OCCUPY_LOCATION: &[PropertyDescriptor] = &[required("location", "Location", FieldKind::Text)];

const REQ_LOOT_ACQUIRED: &[PropertyDescriptor] = &[required("item", "Item filter", FieldKind::Regex)];

const REQ_KILL: &[PropertyDescriptor] = &[
    required("denizen", "Denizen filter", FieldKind::Regex),
    required("count", "Count", FieldKind::Number),
    optional("step_only", "Only kills during this step", FieldKind::Flag),
];

const REQ_TIME_PASSED: &[PropertyDescriptor] = &[required("days", "Days", FieldKind::Number)];

const REQ_GAME_PHASE: &[PropertyDescriptor] = &[required("phase", "Phase", FieldKind::Selection(PHASES))];

const REQ_SEARCH_RESULT: &[PropertyDescriptor] = &[
    required("table", "Table filter", FieldKind::Regex),
    optional("result", "Result filter", FieldKind::Regex),
];

const REQ_INVENTORY_CONTAINS: &[PropertyDescriptor] = &[required("item", "Item filter", FieldKind::Regex)];

const REQ_MISSION_CAMPAIGN: &[PropertyDescriptor] = &[
    required("mission", "Mission filter", FieldKind::Regex),
    required("action", "Action", FieldKind::Selection(MISSION_ACTIONS)),
];

const REQ_TRADE: &[PropertyDescriptor] = &[
    required("action", "Action", FieldKind::Selection(TRADE_ACTIONS)),
    required("item", "Item filter", FieldKind::Regex),
];

const REQ_DISCOVERY: &[PropertyDescriptor] = &[required("discovery", "Discovery filter", FieldKind::Regex)];

const REQ_LEARN_OR_AWAKEN_SPELL: &[PropertyDescriptor] = &[
    required("spell", "Spell filter", FieldKind::Regex),
    optional("awaken", "Must be awakened", FieldKind::Flag),
];

const REQ_MINOR_CHARACTER_PRESENT: &[PropertyDescriptor] = &[required("minor_character", "Minor character", FieldKind::Text)];

const REQ_PATH_TRAVERSED: &[PropertyDescriptor] = &[required("clearings", "Clearings", FieldKind::TextList)];

const REQ_COLOR_MAGIC_PRESENT: &[PropertyDescriptor] = &[required("color", "Color", FieldKind::Selection(COLORS))];

// === Reward tables ===

const REW_EMIT_INFORMATION: &[PropertyDescriptor] = &[required("text", "Message", FieldKind::Text)];

const REW_GRANT_OR_REMOVE_ITEM: &[PropertyDescriptor] = &[
    required("item", "Item", FieldKind::Predicate),
    optional("remove", "Remove instead of grant", FieldKind::Flag),
];

const REW_ADJUST_ATTRIBUTE: &[PropertyDescriptor] = &[
    required("attribute", "Attribute", FieldKind::Text),
    required("delta", "Change", FieldKind::Number),
];

const REW_GRANT_COMPANION: &[PropertyDescriptor] = &[
    required("companion_kind", "As", FieldKind::Selection(COMPANION_KINDS)),
    required("companion", "Companion", FieldKind::Predicate),
];

const REW_TELEPORT: &[PropertyDescriptor] = &[required("location", "Location", FieldKind::Text)];

const REW_RELATIONSHIP: &[PropertyDescriptor] = &[
    required("native_group", "Native group", FieldKind::Text),
    required("mode", "Mode", FieldKind::Selection(RELATIONSHIP_MODES)),
    required("amount", "Amount", FieldKind::Number),
];

const REW_SUMMON_GUARDIAN: &[PropertyDescriptor] = &[required("guardian", "Guardian", FieldKind::Predicate)];

const REW_ALTER_HIDE: &[PropertyDescriptor] = &[optional("hidden", "Hidden", FieldKind::Flag)];

const REW_ALTER_BLOCK: &[PropertyDescriptor] = &[optional("blocked", "Blocked", FieldKind::Flag)];

const REW_GRANT_OR_REMOVE_MINOR_CHARACTER: &[PropertyDescriptor] = &[
    required("minor_character", "Minor character", FieldKind::Text),
    optional("remove", "Remove instead of grant", FieldKind::Flag),
];

const REW_SCARE_MONSTERS: &[PropertyDescriptor] = &[required("monsters", "Monsters", FieldKind::Predicate)];

const REW_MARK_DENIZEN: &[PropertyDescriptor] = &[
    required("denizen", "Denizen", FieldKind::Predicate),
    required("mark", "Mark", FieldKind::Text),
];

const REW_SEND_INVENTORY: &[PropertyDescriptor] = &[
    required("destination", "Destination", FieldKind::Selection(DESTINATIONS)),
    optional("location", "Location", FieldKind::Text),
];

const REW_APPEND_JOURNAL_ENTRY: &[PropertyDescriptor] = &[
    required("entry_key", "Entry", FieldKind::Text),
    required("text", "Text", FieldKind::Text),
    optional("entry_kind", "Status", FieldKind::Selection(JOURNAL_KINDS)),
];

const REW_REVEAL_PATHS: &[PropertyDescriptor] = &[required("paths", "Paths", FieldKind::TextList)];

const REW_OFFER_NEXT_STEP_CHOICE: &[PropertyDescriptor] = &[required("steps", "Steps", FieldKind::StepList)];

const REW_DRAW_TREASURE_OR_SPELL_FROM_SITE: &[PropertyDescriptor] = &[
    required("site", "Site", FieldKind::Predicate),
    required("draw", "Draw", FieldKind::Selection(DRAWS)),
];

/// Fields for a requirement kind, by kind name.
#[must_use]
pub fn requirement_fields(kind: &str) -> Option<&'static [PropertyDescriptor]> {
    let fields: &'static [PropertyDescriptor] = match kind {
        "AttributeThreshold" => REQ_ATTRIBUTE_THRESHOLD,
        "OccupyLocation" => REQ_OCCUPY_LOCATION,
        "LootAcquired" => REQ_LOOT_ACQUIRED,
        "Kill" => REQ_KILL,
        "TimePassed" => REQ_TIME_PASSED,
        "GamePhase" => REQ_GAME_PHASE,
        "Active" | "NoDenizensInClearing" => &[],
        "SearchResult" => REQ_SEARCH_RESULT,
        "InventoryContains" => REQ_INVENTORY_CONTAINS,
        "MissionCampaign" => REQ_MISSION_CAMPAIGN,
        "Trade" => REQ_TRADE,
        "Discovery" => REQ_DISCOVERY,
        "LearnOrAwakenSpell" => REQ_LEARN_OR_AWAKEN_SPELL,
        "MinorCharacterPresent" => REQ_MINOR_CHARACTER_PRESENT,
        "PathTraversed" => REQ_PATH_TRAVERSED,
        "ColorMagicPresent" => REQ_COLOR_MAGIC_PRESENT,
        _ => return None,
    };
    Some(fields)
}

/// Fields for a reward kind, by kind name.
#[must_use]
pub fn reward_fields(kind: &str) -> Option<&'static [PropertyDescriptor]> {
    let fields: &'static [PropertyDescriptor] = match kind {
        "EmitInformation" => REW_EMIT_INFORMATION,
        "GrantOrRemoveItem" => REW_GRANT_OR_REMOVE_ITEM,
        "AdjustAttribute" => REW_ADJUST_ATTRIBUTE,
        "GrantCompanion" => REW_GRANT_COMPANION,
        "Teleport" => REW_TELEPORT,
        "Relationship" => REW_RELATIONSHIP,
        "CompleteQuest" | "FailQuest" | "StripInventory" | "ActivateQuest" | "ResetQuest" => &[],
        "SummonGuardian" => REW_SUMMON_GUARDIAN,
        "AlterHide" => REW_ALTER_HIDE,
        "AlterBlock" => REW_ALTER_BLOCK,
        "GrantOrRemoveMinorCharacter" => REW_GRANT_OR_REMOVE_MINOR_CHARACTER,
        "ScareMonsters" => REW_SCARE_MONSTERS,
        "MarkDenizen" => REW_MARK_DENIZEN,
        "SendInventory" => REW_SEND_INVENTORY,
        "AppendJournalEntry" => REW_APPEND_JOURNAL_ENTRY,
        "RevealPaths" => REW_REVEAL_PATHS,
        "OfferNextStepChoice" => REW_OFFER_NEXT_STEP_CHOICE,
        "DrawTreasureOrSpellFromSite" => REW_DRAW_TREASURE_OR_SPELL_FROM_SITE,
        _ => return None,
    };
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::requirement::RequirementKind;
    use crate::quest::reward::RewardKind;

    #[test]
    fn test_every_kind_has_a_table() {
        for name in RequirementKind::NAMES {
            assert!(requirement_fields(name).is_some(), "requirement {name}");
        }
        for name in RewardKind::NAMES {
            assert!(reward_fields(name).is_some(), "reward {name}");
        }
    }

    #[test]
    fn test_keys_do_not_shadow_common_keys() {
        let common = ["kind", "negate", "group"];
        for name in RequirementKind::NAMES {
            for field in requirement_fields(name).unwrap() {
                assert!(!common.contains(&field.key), "{name}.{}", field.key);
            }
        }
        for name in RewardKind::NAMES {
            for field in reward_fields(name).unwrap() {
                assert!(!common.contains(&field.key), "{name}.{}", field.key);
            }
        }
    }
}
