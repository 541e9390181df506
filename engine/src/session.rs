use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{checks::DiceRoll, content::EraId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Narration,
    Choice,
    Player,
    Consequence,
    System,
    Dice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice_roll: Option<DiceRoll>,
    pub timestamp: DateTime<Utc>,
}

/// Words counted the way the reading stats count them: split on single spaces.
pub fn word_count(text: &str) -> u64 {
    text.split(' ').count() as u64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub character_id: String,
    #[serde(default)]
    pub messages: Vec<StoryMessage>,
    pub current_scene: String,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    pub era: EraId,
    #[serde(default)]
    pub rolls: u32,
    #[serde(default)]
    pub failed_rolls: u32,
    #[serde(default)]
    pub natural_twenties: u32,
}

impl GameSession {
    pub fn new(id: String, character_id: String, era: EraId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            character_id,
            messages: Vec::new(),
            current_scene: "intro".to_string(),
            is_active: true,
            started_at,
            era,
            rolls: 0,
            failed_rolls: 0,
            natural_twenties: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_spaces() {
        assert_eq!(word_count("You step into the dark"), 5);
        assert_eq!(word_count(""), 1);
    }
}
