use serde::{Deserialize, Serialize};

use crate::content::EraId;

const BUILTIN_RULES: &str = include_str!("../content/rules.yaml");

/// Numeric rulebook. Every field has a default, so a YAML override only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// `K` in `floor((score - K) / 2)`.
    pub modifier_base: i32,
    /// DC assumed for a d20 roll made without an explicit one.
    pub default_d20_dc: i32,
    pub xp_per_level: i64,
    pub quest_completion_xp: i64,
    pub dice_history_cap: usize,
    pub skill_threshold_growth: f64,
    pub skill_unlock_prerequisite_level: u32,
    pub relationship_min: i32,
    pub relationship_max: i32,
    /// Health or energy restored by one consumable.
    pub consumable_restore: i32,
    pub starting: StartingValues,
    pub point_buy: PointBuy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingValues {
    pub health: i32,
    pub energy: i32,
    pub gold: i64,
    pub era: EraId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointBuy {
    pub base: i32,
    pub points: i32,
    pub min: i32,
    pub max: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            modifier_base: 10,
            default_d20_dc: 10,
            xp_per_level: 200,
            quest_completion_xp: 100,
            dice_history_cap: 50,
            skill_threshold_growth: 1.5,
            skill_unlock_prerequisite_level: 3,
            relationship_min: -100,
            relationship_max: 100,
            consumable_restore: 20,
            starting: StartingValues::default(),
            point_buy: PointBuy::default(),
        }
    }
}

impl Default for StartingValues {
    fn default() -> Self {
        Self { health: 100, energy: 100, gold: 50, era: EraId::from("stranger_things") }
    }
}

impl Default for PointBuy {
    fn default() -> Self {
        Self { base: 5, points: 6, min: 1, max: 10 }
    }
}

impl Rules {
    pub fn builtin() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Clamp a relationship value into the configured bounds.
    pub fn clamp_relationship(&self, value: i64) -> i32 {
        value.clamp(self.relationship_min as i64, self.relationship_max as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_yaml_matches_defaults() {
        assert_eq!(Rules::builtin().unwrap(), Rules::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let rules = Rules::from_yaml_str("xp_per_level: 300\nstarting:\n  gold: 5\n").unwrap();
        assert_eq!(rules.xp_per_level, 300);
        assert_eq!(rules.starting.gold, 5);
        assert_eq!(rules.starting.health, 100);
        assert_eq!(rules.modifier_base, 10);
    }
}
