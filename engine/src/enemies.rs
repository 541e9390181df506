use serde::{Deserialize, Serialize};

use crate::{character::Attribute, content::EraId, encounters::DifficultyLevel, Dice};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: String,
    /// Drop probability in `0.0..=1.0`.
    pub chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityEffect {
    Stun,
    Poison,
    Fear,
    Drain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAbility {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub effect: Option<AbilityEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub era: EraId,
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub loot_table: Vec<LootEntry>,
    pub experience_reward: i64,
    pub gold_reward: GoldRange,
    #[serde(default)]
    pub abilities: Vec<EnemyAbility>,
    #[serde(default)]
    pub weaknesses: Vec<Attribute>,
    #[serde(default)]
    pub resistances: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub items: Vec<String>,
    pub gold: i64,
    pub experience: i64,
}

/// Roll each loot entry independently, then the gold range.
pub fn roll_loot(dice: &mut Dice, enemy: &Enemy, mut log: impl FnMut(String)) -> LootDrop {
    let items: Vec<String> = enemy
        .loot_table
        .iter()
        .filter(|entry| dice.chance(entry.chance))
        .map(|entry| entry.item_id.clone())
        .collect();
    let gold = dice.between(enemy.gold_reward.min, enemy.gold_reward.max);
    log(format!(
        "[LOOT][{}] items=[{}] gold={} xp={}",
        enemy.name,
        items.join(", "),
        gold,
        enemy.experience_reward
    ));
    LootDrop { items, gold, experience: enemy.experience_reward }
}
