use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{content::EraId, error::CreationError, rules::Rules};

const DEFAULT_SCORE: i32 = 5;
const DEFAULT_BACKSTORY: &str = "A wanderer with a mysterious past, ready to forge their destiny.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Vision,
    Resilience,
    Influence,
    Wisdom,
    Audacity,
    Integrity,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Self::Vision,
        Self::Resilience,
        Self::Influence,
        Self::Wisdom,
        Self::Audacity,
        Self::Integrity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vision => "vision",
            Self::Resilience => "resilience",
            Self::Influence => "influence",
            Self::Wisdom => "wisdom",
            Self::Audacity => "audacity",
            Self::Integrity => "integrity",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| format!("unknown attribute `{s}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub vision: i32,
    pub resilience: i32,
    pub influence: i32,
    pub wisdom: i32,
    pub audacity: i32,
    pub integrity: i32,
}

impl Attributes {
    pub fn uniform(value: i32) -> Self {
        Self {
            vision: value,
            resilience: value,
            influence: value,
            wisdom: value,
            audacity: value,
            integrity: value,
        }
    }

    pub fn get(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Vision => self.vision,
            Attribute::Resilience => self.resilience,
            Attribute::Influence => self.influence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Audacity => self.audacity,
            Attribute::Integrity => self.integrity,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: i32) {
        let slot = match attr {
            Attribute::Vision => &mut self.vision,
            Attribute::Resilience => &mut self.resilience,
            Attribute::Influence => &mut self.influence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Audacity => &mut self.audacity,
            Attribute::Integrity => &mut self.integrity,
        };
        *slot = value;
    }

    pub fn total(&self) -> i32 {
        Attribute::ALL.iter().map(|a| self.get(*a)).sum()
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(DEFAULT_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Visionary,
    Strategist,
    Connector,
    Creator,
    Protector,
    Seeker,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Self::Visionary,
        Self::Strategist,
        Self::Connector,
        Self::Creator,
        Self::Protector,
        Self::Seeker,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Visionary => "visionary",
            Self::Strategist => "strategist",
            Self::Connector => "connector",
            Self::Creator => "creator",
            Self::Protector => "protector",
            Self::Seeker => "seeker",
        }
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.key() == wanted)
            .ok_or_else(|| format!("unknown archetype `{s}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,
    pub backstory: String,
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
    pub level: u32,
    pub experience: i64,
    pub health: i32,
    pub max_health: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub gold: i64,
    pub current_era: EraId,
}

/// `floor(xp / per_level) + 1`; negative experience counts as zero.
pub fn level_for_experience(experience: i64, per_level: i64) -> u32 {
    let per_level = per_level.max(1);
    let level = experience.max(0) / per_level + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Input to character creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl CharacterDraft {
    pub fn new(name: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            name: name.into(),
            archetype,
            backstory: String::new(),
            attributes: Attributes::default(),
        }
    }

    /// Points spent above the point-buy base.
    pub fn points_spent(&self, rules: &Rules) -> i32 {
        self.attributes.total() - rules.point_buy.base * Attribute::ALL.len() as i32
    }

    pub fn validate(&self, rules: &Rules) -> Result<(), CreationError> {
        if self.name.trim().is_empty() {
            return Err(CreationError::BlankName);
        }
        let pb = rules.point_buy;
        for attr in Attribute::ALL {
            let value = self.attributes.get(attr);
            if value < pb.min || value > pb.max {
                return Err(CreationError::AttributeOutOfRange {
                    attribute: attr.as_str(),
                    value,
                    min: pb.min,
                    max: pb.max,
                });
            }
        }
        let spent = self.points_spent(rules);
        if spent > pb.points {
            return Err(CreationError::OverBudget { spent, budget: pb.points });
        }
        Ok(())
    }

    pub fn build(
        self,
        id: String,
        created_at: DateTime<Utc>,
        rules: &Rules,
    ) -> Result<Character, CreationError> {
        self.validate(rules)?;
        let backstory = match self.backstory.trim() {
            "" => DEFAULT_BACKSTORY.to_string(),
            text => text.to_string(),
        };
        let start = &rules.starting;
        Ok(Character {
            id,
            name: self.name.trim().to_string(),
            archetype: self.archetype,
            backstory,
            attributes: self.attributes,
            created_at,
            level: 1,
            experience: 0,
            health: start.health,
            max_health: start.health,
            energy: start.energy,
            max_energy: start.energy,
            gold: start.gold,
            current_era: start.era.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn level_from_experience() {
        assert_eq!(level_for_experience(0, 200), 1);
        assert_eq!(level_for_experience(199, 200), 1);
        assert_eq!(level_for_experience(200, 200), 2);
        assert_eq!(level_for_experience(-50, 200), 1);
        assert_eq!(level_for_experience(1999, 200), 10);
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        assert_eq!("WISDOM".parse::<Attribute>(), Ok(Attribute::Wisdom));
        assert_eq!(" audacity ".parse::<Attribute>(), Ok(Attribute::Audacity));
        assert!("strength".parse::<Attribute>().is_err());
    }

    #[test]
    fn draft_builds_with_starting_values() {
        let rules = Rules::default();
        let mut draft = CharacterDraft::new("  Max  ", Archetype::Seeker);
        draft.attributes.audacity = 9;
        draft.attributes.vision = 7;
        let c = draft.build("char_1".into(), now(), &rules).unwrap();
        assert_eq!(c.name, "Max");
        assert_eq!(c.health, 100);
        assert_eq!(c.gold, 50);
        assert_eq!(c.level, 1);
        assert_eq!(c.current_era.as_str(), "stranger_things");
        assert!(!c.backstory.is_empty());
    }

    #[test]
    fn draft_rejects_overspend_and_range() {
        let rules = Rules::default();
        let mut draft = CharacterDraft::new("Max", Archetype::Seeker);
        draft.attributes.audacity = 10;
        draft.attributes.vision = 8;
        assert_eq!(
            draft.validate(&rules),
            Err(CreationError::OverBudget { spent: 8, budget: 6 })
        );

        let mut draft = CharacterDraft::new("Max", Archetype::Seeker);
        draft.attributes.wisdom = 0;
        assert!(matches!(
            draft.validate(&rules),
            Err(CreationError::AttributeOutOfRange { attribute: "wisdom", .. })
        ));

        let draft = CharacterDraft::new("   ", Archetype::Seeker);
        assert_eq!(draft.validate(&rules), Err(CreationError::BlankName));
    }
}
