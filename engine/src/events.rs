use serde::{Deserialize, Serialize};

use crate::{
    checks::RollResult,
    content::EraId,
    inventory::{ItemType, Rarity},
    quests::QuestType,
    stats::Stat,
};

/// Something that changed in the game state.
///
/// Mutators emit these; achievement rules and daily-challenge tracking react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CharacterCreated { id: String },
    CharacterCleared,
    HealthChanged { before: i32, after: i32, max: i32 },
    EnergyChanged { before: i32, after: i32, max: i32 },
    CharacterDefeated { id: String },
    GoldChanged { before: i64, after: i64 },
    ExperienceGained { amount: i64, total: i64 },
    LevelChanged { from: u32, to: u32 },
    DiceRolled { roll: RollResult },
    ItemAdded { id: String, kind: ItemType, rarity: Rarity, quantity: u32 },
    ItemRemoved { id: String, quantity: u32 },
    ItemUsed { id: String },
    QuestAdded { id: String },
    ObjectiveUpdated { quest_id: String, objective_id: String, completed: bool },
    QuestCompleted { id: String, kind: QuestType },
    QuestFailed { id: String },
    NpcAdded { id: String },
    NpcMet { id: String },
    RelationshipChanged { npc_id: String, before: i32, after: i32 },
    AchievementUnlocked { id: String },
    SkillXpGained { id: String, amount: u64 },
    SkillLeveledUp { id: String, level: u32 },
    SkillUnlocked { id: String },
    JournalEntryAdded { id: String },
    LocationDiscovered { id: String },
    LocationVisited { id: String },
    EraUnlocked { era: EraId },
    EraChanged { era: EraId },
    ChoiceMade { encounter_id: String, choice_id: String },
    DailyChallengesGenerated { count: usize },
    ChallengeProgressed { id: String, progress: u32, target: u32 },
    ChallengeCompleted { id: String },
    SessionStarted { id: String },
    MessageAdded { words: u64 },
    SessionEnded { id: String, rolls: u32, failed_rolls: u32 },
    StatIncremented { stat: Stat, value: u64 },
    GameReset,
}

impl GameEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CharacterCreated { .. } => "character_created",
            Self::CharacterCleared => "character_cleared",
            Self::HealthChanged { .. } => "health_changed",
            Self::EnergyChanged { .. } => "energy_changed",
            Self::CharacterDefeated { .. } => "character_defeated",
            Self::GoldChanged { .. } => "gold_changed",
            Self::ExperienceGained { .. } => "experience_gained",
            Self::LevelChanged { .. } => "level_changed",
            Self::DiceRolled { .. } => "dice_rolled",
            Self::ItemAdded { .. } => "item_added",
            Self::ItemRemoved { .. } => "item_removed",
            Self::ItemUsed { .. } => "item_used",
            Self::QuestAdded { .. } => "quest_added",
            Self::ObjectiveUpdated { .. } => "objective_updated",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::QuestFailed { .. } => "quest_failed",
            Self::NpcAdded { .. } => "npc_added",
            Self::NpcMet { .. } => "npc_met",
            Self::RelationshipChanged { .. } => "relationship_changed",
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::SkillXpGained { .. } => "skill_xp_gained",
            Self::SkillLeveledUp { .. } => "skill_leveled_up",
            Self::SkillUnlocked { .. } => "skill_unlocked",
            Self::JournalEntryAdded { .. } => "journal_entry_added",
            Self::LocationDiscovered { .. } => "location_discovered",
            Self::LocationVisited { .. } => "location_visited",
            Self::EraUnlocked { .. } => "era_unlocked",
            Self::EraChanged { .. } => "era_changed",
            Self::ChoiceMade { .. } => "choice_made",
            Self::DailyChallengesGenerated { .. } => "daily_challenges_generated",
            Self::ChallengeProgressed { .. } => "challenge_progressed",
            Self::ChallengeCompleted { .. } => "challenge_completed",
            Self::SessionStarted { .. } => "session_started",
            Self::MessageAdded { .. } => "message_added",
            Self::SessionEnded { .. } => "session_ended",
            Self::StatIncremented { .. } => "stat_incremented",
            Self::GameReset => "game_reset",
        }
    }
}

/// Ids of every achievement unlocked in `events`, in order.
pub fn unlocked_achievements(events: &[GameEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::AchievementUnlocked { id } => Some(id.as_str()),
            _ => None,
        })
        .collect()
}
