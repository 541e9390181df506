use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub total_play_time: u64,
    pub sessions_played: u64,
    pub dice_rolled: u64,
    pub critical_successes: u64,
    pub critical_failures: u64,
    pub quests_completed: u64,
    pub quests_failed: u64,
    pub npcs_met: u64,
    pub items_collected: u64,
    pub locations_discovered: u64,
    pub choices_made: u64,
    pub words_read: u64,
    /// Successful rolls against DC 15 or higher.
    pub high_dc_successes: u64,
    pub dailies_completed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    TotalPlayTime,
    SessionsPlayed,
    DiceRolled,
    CriticalSuccesses,
    CriticalFailures,
    QuestsCompleted,
    QuestsFailed,
    NpcsMet,
    ItemsCollected,
    LocationsDiscovered,
    ChoicesMade,
    WordsRead,
    HighDcSuccesses,
    DailiesCompleted,
}

impl Stat {
    pub const ALL: [Stat; 14] = [
        Self::TotalPlayTime,
        Self::SessionsPlayed,
        Self::DiceRolled,
        Self::CriticalSuccesses,
        Self::CriticalFailures,
        Self::QuestsCompleted,
        Self::QuestsFailed,
        Self::NpcsMet,
        Self::ItemsCollected,
        Self::LocationsDiscovered,
        Self::ChoicesMade,
        Self::WordsRead,
        Self::HighDcSuccesses,
        Self::DailiesCompleted,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::TotalPlayTime => "total_play_time",
            Self::SessionsPlayed => "sessions_played",
            Self::DiceRolled => "dice_rolled",
            Self::CriticalSuccesses => "critical_successes",
            Self::CriticalFailures => "critical_failures",
            Self::QuestsCompleted => "quests_completed",
            Self::QuestsFailed => "quests_failed",
            Self::NpcsMet => "npcs_met",
            Self::ItemsCollected => "items_collected",
            Self::LocationsDiscovered => "locations_discovered",
            Self::ChoicesMade => "choices_made",
            Self::WordsRead => "words_read",
            Self::HighDcSuccesses => "high_dc_successes",
            Self::DailiesCompleted => "dailies_completed",
        }
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.key() == s)
            .ok_or_else(|| format!("unknown stat `{s}`"))
    }
}

impl PlayerStats {
    pub fn get(&self, stat: Stat) -> u64 {
        *self.slot(stat)
    }

    /// Saturating add; returns the new value.
    pub fn increment(&mut self, stat: Stat, amount: u64) -> u64 {
        let slot = self.slot_mut(stat);
        *slot = slot.saturating_add(amount);
        *slot
    }

    fn slot(&self, stat: Stat) -> &u64 {
        match stat {
            Stat::TotalPlayTime => &self.total_play_time,
            Stat::SessionsPlayed => &self.sessions_played,
            Stat::DiceRolled => &self.dice_rolled,
            Stat::CriticalSuccesses => &self.critical_successes,
            Stat::CriticalFailures => &self.critical_failures,
            Stat::QuestsCompleted => &self.quests_completed,
            Stat::QuestsFailed => &self.quests_failed,
            Stat::NpcsMet => &self.npcs_met,
            Stat::ItemsCollected => &self.items_collected,
            Stat::LocationsDiscovered => &self.locations_discovered,
            Stat::ChoicesMade => &self.choices_made,
            Stat::WordsRead => &self.words_read,
            Stat::HighDcSuccesses => &self.high_dc_successes,
            Stat::DailiesCompleted => &self.dailies_completed,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut u64 {
        match stat {
            Stat::TotalPlayTime => &mut self.total_play_time,
            Stat::SessionsPlayed => &mut self.sessions_played,
            Stat::DiceRolled => &mut self.dice_rolled,
            Stat::CriticalSuccesses => &mut self.critical_successes,
            Stat::CriticalFailures => &mut self.critical_failures,
            Stat::QuestsCompleted => &mut self.quests_completed,
            Stat::QuestsFailed => &mut self.quests_failed,
            Stat::NpcsMet => &mut self.npcs_met,
            Stat::ItemsCollected => &mut self.items_collected,
            Stat::LocationsDiscovered => &mut self.locations_discovered,
            Stat::ChoicesMade => &mut self.choices_made,
            Stat::WordsRead => &mut self.words_read,
            Stat::HighDcSuccesses => &mut self.high_dc_successes,
            Stat::DailiesCompleted => &mut self.dailies_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_keys_round_trip_through_serde() {
        for stat in Stat::ALL {
            let json = serde_json::to_string(&stat).unwrap();
            assert_eq!(json, format!("\"{}\"", stat.key()));
            assert_eq!(stat.key().parse::<Stat>(), Ok(stat));
        }
    }

    #[test]
    fn increment_saturates() {
        let mut stats = PlayerStats { words_read: u64::MAX - 1, ..Default::default() };
        assert_eq!(stats.increment(Stat::WordsRead, 5), u64::MAX);
        assert_eq!(stats.increment(Stat::DiceRolled, 1), 1);
    }
}
