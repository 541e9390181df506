use serde::{Deserialize, Serialize};

use crate::{content::EraId, rules::Rules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    pub relationship: i32,
    #[serde(default)]
    pub met: bool,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub era: Option<EraId>,
}

impl Npc {
    /// Add `delta` and clamp into the rulebook bounds. Returns `(before, after)`.
    pub fn adjust_relationship(&mut self, delta: i64, rules: &Rules) -> (i32, i32) {
        let before = self.relationship;
        self.relationship = rules.clamp_relationship((before as i64).saturating_add(delta));
        (before, self.relationship)
    }

    /// One-way. Returns true on first meeting.
    pub fn meet(&mut self) -> bool {
        !std::mem::replace(&mut self.met, true)
    }
}
