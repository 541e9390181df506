use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Dice,
    Explore,
    Social,
    Combat,
    Story,
}

impl ChallengeKind {
    pub fn key(self) -> &'static str {
        match self {
            Self::Dice => "dice",
            Self::Explore => "explore",
            Self::Social => "social",
            Self::Combat => "combat",
            Self::Story => "story",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReward {
    pub xp: i64,
    #[serde(default)]
    pub gold: Option<i64>,
    #[serde(default)]
    pub item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub target: u32,
    pub progress: u32,
    pub reward: ChallengeReward,
    pub completed: bool,
    pub expires_at: DateTime<Utc>,
}

impl DailyChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Add progress. Returns true exactly once: on the call that completes it.
    pub fn advance(&mut self, amount: u32) -> bool {
        if self.completed {
            return false;
        }
        self.progress = self.progress.saturating_add(amount);
        if self.progress >= self.target {
            self.completed = true;
            return true;
        }
        false
    }
}

struct Template {
    kind: ChallengeKind,
    title: &'static str,
    description: &'static str,
    target: u32,
    xp: i64,
    gold: Option<i64>,
}

const TEMPLATES: [Template; 3] = [
    Template {
        kind: ChallengeKind::Dice,
        title: "Roll the Dice",
        description: "Roll 10 dice today",
        target: 10,
        xp: 50,
        gold: None,
    },
    Template {
        kind: ChallengeKind::Explore,
        title: "Explorer",
        description: "Discover a new location",
        target: 1,
        xp: 75,
        gold: Some(25),
    },
    Template {
        kind: ChallengeKind::Story,
        title: "Storyteller",
        description: "Make 5 choices in your adventure",
        target: 5,
        xp: 100,
        gold: None,
    },
];

/// The fixed daily batch. `make_id` receives the challenge kind.
pub fn generate(
    expires_at: DateTime<Utc>,
    mut make_id: impl FnMut(ChallengeKind) -> String,
) -> Vec<DailyChallenge> {
    TEMPLATES
        .iter()
        .map(|t| DailyChallenge {
            id: make_id(t.kind),
            title: t.title.to_string(),
            description: t.description.to_string(),
            kind: t.kind,
            target: t.target,
            progress: 0,
            reward: ChallengeReward { xp: t.xp, gold: t.gold, item: None },
            completed: false,
            expires_at,
        })
        .collect()
}

/// Which challenge kind an event counts toward, and by how much.
pub fn progress_from(event: &GameEvent) -> Option<(ChallengeKind, u32)> {
    match event {
        GameEvent::DiceRolled { .. } => Some((ChallengeKind::Dice, 1)),
        GameEvent::LocationDiscovered { .. } => Some((ChallengeKind::Explore, 1)),
        GameEvent::ChoiceMade { .. } => Some((ChallengeKind::Story, 1)),
        GameEvent::NpcMet { .. } => Some((ChallengeKind::Social, 1)),
        _ => None,
    }
}

/// True when the batch is empty or every entry has expired.
pub fn needs_refresh(batch: &[DailyChallenge], now: DateTime<Utc>) -> bool {
    batch.iter().all(|c| c.is_expired(now))
}
