use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    events::GameEvent,
    inventory::{ItemType, Rarity},
    quests::{QuestStatus, QuestType},
    rules::Rules,
    state::GameState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Progress,
    Dice,
    Social,
    Collection,
    Exploration,
    Quests,
    Combat,
    Story,
    Secret,
    Genre,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub secret: bool,
    pub category: AchievementCategory,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Stamp the unlock time. A second call keeps the first timestamp and returns false.
    pub fn unlock(&mut self, at: DateTime<Utc>) -> bool {
        if self.unlocked_at.is_some() {
            return false;
        }
        self.unlocked_at = Some(at);
        true
    }
}

/// Every achievement id the rules below can award.
pub const RULE_IDS: &[&str] = &[
    "first_steps",
    "centurion",
    "perfect_session",
    "level_5",
    "legend",
    "master",
    "level_50",
    "level_100",
    "gold_100",
    "gold_1000",
    "gold_10000",
    "dice_master",
    "snake_eyes",
    "roll_100",
    "roll_500",
    "roll_1000",
    "lucky_streak",
    "comeback_king",
    "triple_20",
    "risk_taker",
    "first_contact",
    "social_butterfly",
    "popular",
    "best_friend",
    "enemy_made",
    "diplomat",
    "charmer",
    "loved_by_all",
    "villain",
    "first_item",
    "collector",
    "hoarder",
    "museum_curator",
    "legendary_find",
    "rare_collector",
    "weapon_master",
    "armored_up",
    "key_keeper",
    "artifact_hunter",
    "first_discovery",
    "explorer",
    "world_walker",
    "cartographer",
    "thorough",
    "danger_seeker",
    "upside_down_visitor",
    "era_traveler",
    "quest_complete",
    "quest_master",
    "side_quester",
    "main_story",
    "perfectionist",
    "quest_fail",
    "daily_warrior",
    "wordsmith",
    "bookworm",
    "scholar",
    "choice_maker",
    "decisive",
    "survivor",
];

/// DC at or above which a success counts toward `risk_taker`.
pub const HIGH_DC: i32 = 15;

const UPSIDE_DOWN: &str = "upside_down";

fn at_least(out: &mut Vec<String>, value: u64, thresholds: &[(u64, &str)]) {
    for (min, id) in thresholds {
        if value >= *min {
            out.push((*id).to_string());
        }
    }
}

/// Achievement ids earned by `event`, given the state after it happened.
///
/// Already-unlocked ids may be returned; unlocking is idempotent.
pub fn triggered_by(state: &GameState, event: &GameEvent, rules: &Rules) -> Vec<String> {
    let mut out = Vec::new();
    let stats = &state.player_stats;
    match event {
        GameEvent::SessionStarted { .. } => {
            out.push("first_steps".into());
            at_least(&mut out, stats.sessions_played, &[(100, "centurion")]);
        }
        GameEvent::SessionEnded { rolls, failed_rolls, .. } => {
            if *rolls > 0 && *failed_rolls == 0 {
                out.push("perfect_session".into());
            }
        }
        GameEvent::LevelChanged { to, .. } => {
            at_least(
                &mut out,
                *to as u64,
                &[(5, "level_5"), (10, "legend"), (25, "master"), (50, "level_50"), (100, "level_100")],
            );
        }
        GameEvent::GoldChanged { after, .. } => {
            at_least(
                &mut out,
                (*after).max(0) as u64,
                &[(100, "gold_100"), (1000, "gold_1000"), (10_000, "gold_10000")],
            );
        }
        GameEvent::DiceRolled { roll } => {
            if roll.is_critical_success() {
                out.push("dice_master".into());
            }
            if roll.is_critical_failure() {
                out.push("snake_eyes".into());
            }
            at_least(
                &mut out,
                stats.dice_rolled,
                &[(100, "roll_100"), (500, "roll_500"), (1000, "roll_1000")],
            );
            at_least(&mut out, stats.high_dc_successes, &[(10, "risk_taker")]);
            let verdicts: Vec<Option<bool>> =
                state.dice_history.iter().map(|r| r.roll.success).collect();
            if verdicts.len() >= 5 && verdicts[..5].iter().all(|v| *v == Some(true)) {
                out.push("lucky_streak".into());
            }
            if roll.success == Some(true)
                && verdicts.len() >= 4
                && verdicts[1..4].iter().all(|v| *v == Some(false))
            {
                out.push("comeback_king".into());
            }
            if state.current_session.as_ref().is_some_and(|s| s.natural_twenties >= 3) {
                out.push("triple_20".into());
            }
        }
        GameEvent::NpcMet { .. } => {
            out.push("first_contact".into());
            if !state.npcs.is_empty() && state.npcs.iter().all(|n| n.met) {
                out.push("social_butterfly".into());
            }
            at_least(&mut out, stats.npcs_met, &[(10, "popular")]);
        }
        GameEvent::RelationshipChanged { before, after, .. } => {
            if *after >= rules.relationship_max {
                out.push("best_friend".into());
            }
            if *after <= rules.relationship_min {
                out.push("enemy_made".into());
            }
            if *before < 0 && *after > 0 {
                out.push("diplomat".into());
            }
            let count = |pred: &dyn Fn(i32) -> bool| {
                state.npcs.iter().filter(|n| pred(n.relationship)).count() as u64
            };
            at_least(&mut out, count(&|r| r >= 50), &[(3, "charmer")]);
            at_least(&mut out, count(&|r| r >= 75), &[(5, "loved_by_all")]);
            at_least(&mut out, count(&|r| r <= -50), &[(3, "villain")]);
        }
        GameEvent::ItemAdded { rarity, .. } => {
            let inv = &state.inventory;
            out.push("first_item".into());
            at_least(&mut out, inv.total_quantity(), &[(10, "collector"), (50, "hoarder")]);
            at_least(&mut out, stats.items_collected, &[(100, "museum_curator")]);
            if *rarity == Rarity::Legendary {
                out.push("legendary_find".into());
            }
            at_least(&mut out, inv.count_rarity(Rarity::Rare), &[(5, "rare_collector")]);
            at_least(&mut out, inv.count_kind(ItemType::Weapon), &[(10, "weapon_master")]);
            at_least(&mut out, inv.count_kind(ItemType::Armor), &[(10, "armored_up")]);
            at_least(&mut out, inv.count_kind(ItemType::Key), &[(5, "key_keeper")]);
            at_least(&mut out, inv.count_kind(ItemType::Artifact), &[(10, "artifact_hunter")]);
        }
        GameEvent::LocationDiscovered { id } => {
            out.push("first_discovery".into());
            let discovered = state.locations.iter().filter(|l| l.discovered).count() as u64;
            at_least(&mut out, discovered, &[(5, "explorer"), (20, "world_walker")]);
            if let Some(loc) = state.locations.iter().find(|l| &l.id == id) {
                let era_done = state
                    .locations
                    .iter()
                    .filter(|l| l.era == loc.era)
                    .all(|l| l.discovered);
                if era_done {
                    out.push("cartographer".into());
                }
            }
        }
        GameEvent::LocationVisited { id } => {
            if let Some(loc) = state.locations.iter().find(|l| &l.id == id) {
                if loc.danger_level >= 5 {
                    out.push("danger_seeker".into());
                }
                let era_done = state
                    .locations
                    .iter()
                    .filter(|l| l.era == loc.era)
                    .all(|l| l.visited);
                if era_done {
                    out.push("thorough".into());
                }
            }
            if id == UPSIDE_DOWN {
                out.push("upside_down_visitor".into());
            }
        }
        GameEvent::EraUnlocked { .. } => out.push("era_traveler".into()),
        GameEvent::QuestCompleted { id, kind } => {
            out.push("quest_complete".into());
            let done = |k: Option<QuestType>| {
                state
                    .quests
                    .iter()
                    .filter(|q| q.status == QuestStatus::Completed)
                    .filter(|q| k.is_none_or(|k| q.kind == k))
                    .count() as u64
            };
            at_least(&mut out, done(None), &[(10, "quest_master")]);
            at_least(&mut out, done(Some(QuestType::Side)), &[(5, "side_quester")]);
            if *kind == QuestType::Main {
                out.push("main_story".into());
            }
            if let Some(quest) = state.quests.iter().find(|q| &q.id == id) {
                if quest.all_objectives_done() {
                    out.push("perfectionist".into());
                }
                if let Some(extra) = &quest.completion_achievement {
                    out.push(extra.clone());
                }
            }
        }
        GameEvent::QuestFailed { .. } => out.push("quest_fail".into()),
        GameEvent::ChallengeCompleted { .. } => {
            at_least(&mut out, stats.dailies_completed, &[(7, "daily_warrior")]);
        }
        GameEvent::MessageAdded { .. } => {
            at_least(
                &mut out,
                stats.words_read,
                &[(10_000, "wordsmith"), (50_000, "bookworm"), (100_000, "scholar")],
            );
        }
        GameEvent::ChoiceMade { .. } => {
            at_least(&mut out, stats.choices_made, &[(50, "choice_maker"), (200, "decisive")]);
        }
        GameEvent::HealthChanged { before, after, max } => {
            if *after < *before && *after > 0 && (*after as i64) * 10 <= *max as i64 {
                out.push("survivor".into());
            }
        }
        _ => {}
    }
    out
}
