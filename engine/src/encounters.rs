use serde::{Deserialize, Serialize};

use crate::{
    character::Attribute,
    checks::RollResult,
    content::EraId,
    error::ResolveError,
    inventory::{Item, ItemEffect, ItemType, Rarity},
    journal::JournalDraft,
    Dice,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterType {
    Exploration,
    Combat,
    Social,
    Puzzle,
    Discovery,
    Trap,
    Rest,
    Merchant,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
    Deadly,
}

/// DC adjustment for an encounter difficulty.
pub fn difficulty_modifier(level: DifficultyLevel) -> i32 {
    match level {
        DifficultyLevel::Easy => -2,
        DifficultyLevel::Medium => 0,
        DifficultyLevel::Hard => 3,
        DifficultyLevel::Deadly => 6,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Tense,
    Mysterious,
    Peaceful,
    Dangerous,
    Eerie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

fn one() -> u32 {
    1
}

/// An item handed out by an outcome. Quantity defaults to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGrant {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub rarity: Rarity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
    #[serde(default = "one")]
    pub quantity: u32,
}

impl ItemGrant {
    pub fn to_item(&self) -> Item {
        Item {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            rarity: self.rarity,
            icon: self.icon.clone(),
            effect: self.effect,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipChange {
    pub npc_id: String,
    pub change: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub quest_id: String,
    pub objective_id: String,
}

/// One outcome branch; the full set of state changes it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterOutcome {
    pub narration: String,
    pub health_change: Option<i32>,
    pub energy_change: Option<i32>,
    pub gold_change: Option<i64>,
    pub experience_gain: Option<i64>,
    pub items_gained: Vec<ItemGrant>,
    pub items_lost: Vec<String>,
    pub relationship_changes: Vec<RelationshipChange>,
    pub quest_progress: Option<QuestProgress>,
    pub unlock_location: Option<String>,
    pub trigger_encounter: Option<String>,
    pub add_journal_entry: Option<JournalDraft>,
}

pub type EffectBundle = EncounterOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consequences {
    pub success: Option<EncounterOutcome>,
    pub failure: Option<EncounterOutcome>,
    pub default: Option<EncounterOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub required_attribute: Option<Attribute>,
    #[serde(default)]
    pub required_skill: Option<String>,
    /// Target number for the d20 check, when the choice has one.
    #[serde(default)]
    pub difficulty_check: Option<i32>,
    pub consequences: Consequences,
}

impl EncounterChoice {
    pub fn needs_roll(&self) -> bool {
        self.difficulty_check.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConditions {
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
    pub required_quest: Option<String>,
    pub required_item: Option<String>,
    pub required_npc_met: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
}

impl EncounterConditions {
    pub fn level_allows(&self, level: u32) -> bool {
        self.min_level.is_none_or(|min| level >= min) && self.max_level.is_none_or(|max| level <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EncounterType,
    pub title: String,
    pub narration: String,
    pub era: EraId,
    #[serde(default)]
    pub location: Option<String>,
    pub difficulty: DifficultyLevel,
    pub choices: Vec<EncounterChoice>,
    #[serde(default)]
    pub conditions: EncounterConditions,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Encounter {
    pub fn choice(&self, id: &str) -> Option<&EncounterChoice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// Pick the outcome branch for a choice.
///
/// Choices without a check always take `default`, and any roll given is ignored.
/// Checked choices need a roll that carries a verdict.
pub fn resolve_choice<'a>(
    encounter: &'a Encounter,
    choice_id: &str,
    roll: Option<&RollResult>,
) -> Result<&'a EncounterOutcome, ResolveError> {
    let choice = encounter.choice(choice_id).ok_or_else(|| ResolveError::UnknownChoice {
        encounter: encounter.id.clone(),
        choice: choice_id.to_string(),
    })?;
    let branch = |slot: &'a Option<EncounterOutcome>, name: &'static str| {
        slot.as_ref().ok_or_else(|| ResolveError::MissingBranch { choice: choice.id.clone(), branch: name })
    };
    if !choice.needs_roll() {
        return branch(&choice.consequences.default, "default");
    }
    let roll = roll.ok_or_else(|| ResolveError::RollRequired { choice: choice.id.clone() })?;
    match roll.success {
        Some(true) => branch(&choice.consequences.success, "success"),
        Some(false) => branch(&choice.consequences.failure, "failure"),
        None => Err(ResolveError::RollWithoutVerdict { choice: choice.id.clone() }),
    }
}

/// Encounters of `era` whose location and level bounds admit the player.
///
/// An encounter without a location is eligible anywhere; with no location
/// given, all locations are eligible.
pub fn eligible<'a>(
    encounters: &'a [Encounter],
    era: &EraId,
    location: Option<&str>,
    level: u32,
) -> Vec<&'a Encounter> {
    encounters
        .iter()
        .filter(|e| &e.era == era)
        .filter(|e| match (location, e.location.as_deref()) {
            (Some(here), Some(there)) => here == there,
            _ => true,
        })
        .filter(|e| e.conditions.level_allows(level))
        .collect()
}

/// Uniform pick among [`eligible`] encounters; `None` when nothing qualifies.
pub fn random_encounter<'a>(
    dice: &mut Dice,
    encounters: &'a [Encounter],
    era: &EraId,
    location: Option<&str>,
    level: u32,
) -> Option<&'a Encounter> {
    let pool = eligible(encounters, era, location, level);
    if pool.is_empty() {
        return None;
    }
    Some(pool[dice.pick(pool.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::DieType;

    fn outcome(text: &str) -> EncounterOutcome {
        EncounterOutcome { narration: text.into(), ..Default::default() }
    }

    fn encounter() -> Encounter {
        Encounter {
            id: "e".into(),
            kind: EncounterType::Exploration,
            title: "E".into(),
            narration: String::new(),
            era: EraId::from("stranger_things"),
            location: None,
            difficulty: DifficultyLevel::Easy,
            choices: vec![
                EncounterChoice {
                    id: "check".into(),
                    text: String::new(),
                    required_attribute: Some(Attribute::Wisdom),
                    required_skill: None,
                    difficulty_check: Some(10),
                    consequences: Consequences {
                        success: Some(outcome("won")),
                        failure: Some(outcome("lost")),
                        default: None,
                    },
                },
                EncounterChoice {
                    id: "walk".into(),
                    text: String::new(),
                    required_attribute: None,
                    required_skill: None,
                    difficulty_check: None,
                    consequences: Consequences { default: Some(outcome("walked")), ..Default::default() },
                },
            ],
            conditions: EncounterConditions::default(),
            mood: None,
            tags: vec![],
        }
    }

    fn roll(success: Option<bool>) -> RollResult {
        RollResult { die: DieType::D20, natural: 10, modifier: 0, total: 10, dc: Some(10), success }
    }

    #[test]
    fn branches_follow_verdict() {
        let e = encounter();
        assert_eq!(resolve_choice(&e, "check", Some(&roll(Some(true)))).unwrap().narration, "won");
        assert_eq!(resolve_choice(&e, "check", Some(&roll(Some(false)))).unwrap().narration, "lost");
        assert_eq!(resolve_choice(&e, "walk", Some(&roll(Some(false)))).unwrap().narration, "walked");
    }

    #[test]
    fn usage_errors() {
        let e = encounter();
        assert_eq!(
            resolve_choice(&e, "check", None),
            Err(ResolveError::RollRequired { choice: "check".into() })
        );
        assert_eq!(
            resolve_choice(&e, "check", Some(&roll(None))),
            Err(ResolveError::RollWithoutVerdict { choice: "check".into() })
        );
        assert!(matches!(resolve_choice(&e, "fly", None), Err(ResolveError::UnknownChoice { .. })));
    }

    #[test]
    fn difficulty_modifiers() {
        assert_eq!(difficulty_modifier(DifficultyLevel::Easy), -2);
        assert_eq!(difficulty_modifier(DifficultyLevel::Deadly), 6);
    }
}
