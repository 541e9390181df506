use serde::{Deserialize, Serialize};

use crate::{
    achievements::Achievement,
    character::Character,
    checks::DiceRoll,
    content::{Catalog, EraId},
    daily::DailyChallenge,
    inventory::Inventory,
    journal::JournalEntry,
    locations::Location,
    npcs::Npc,
    quests::Quest,
    rules::Rules,
    session::GameSession,
    settings::{Settings, WorldConfig},
    skills::Skill,
    stats::PlayerStats,
};

/// The whole persisted game. Missing fields load as their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub character: Option<Character>,
    pub settings: Settings,
    pub world: WorldConfig,
    pub inventory: Inventory,
    pub quests: Vec<Quest>,
    pub npcs: Vec<Npc>,
    pub achievements: Vec<Achievement>,
    /// Newest first.
    pub dice_history: Vec<DiceRoll>,
    pub current_session: Option<GameSession>,
    pub session_history: Vec<GameSession>,
    pub skills: Vec<Skill>,
    /// Newest first.
    pub journal: Vec<JournalEntry>,
    pub locations: Vec<Location>,
    pub daily_challenges: Vec<DailyChallenge>,
    pub unlocked_eras: Vec<EraId>,
    pub player_stats: PlayerStats,
}

impl GameState {
    /// Fresh state seeded from the catalog. No character, no quests.
    pub fn seeded(catalog: &Catalog, rules: &Rules) -> Self {
        Self {
            npcs: catalog.npcs.clone(),
            achievements: catalog.achievements.clone(),
            skills: catalog.skills.clone(),
            locations: catalog.locations.clone(),
            unlocked_eras: vec![rules.starting.era.clone()],
            ..Self::default()
        }
    }

    pub fn current_era(&self) -> &EraId {
        self.character
            .as_ref()
            .map(|c| &c.current_era)
            .unwrap_or(&self.world.era)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn unlocked_achievement_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked()).count()
    }
}
