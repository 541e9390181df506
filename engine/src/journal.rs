use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::EraId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalEntryType {
    Story,
    Discovery,
    Character,
    Location,
    Item,
    Lore,
}

impl JournalEntryType {
    pub fn default_icon(self) -> &'static str {
        match self {
            Self::Story => "book-open",
            Self::Discovery => "sparkles",
            Self::Character => "user",
            Self::Location => "map-pin",
            Self::Item => "package",
            Self::Lore => "scroll",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: JournalEntryType,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub icon: String,
    pub era: EraId,
}

/// A journal entry before the store stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDraft {
    #[serde(rename = "type")]
    pub kind: JournalEntryType,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl JournalDraft {
    pub fn stamp(self, id: String, date: DateTime<Utc>, era: EraId) -> JournalEntry {
        let icon = self.icon.unwrap_or_else(|| self.kind.default_icon().to_string());
        JournalEntry { id, kind: self.kind, title: self.title, content: self.content, date, icon, era }
    }
}
