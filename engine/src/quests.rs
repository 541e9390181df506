use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::EraId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Main,
    Side,
    Personal,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

impl QuestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: QuestType,
    pub status: QuestStatus,
    pub objectives: Vec<QuestObjective>,
    #[serde(default)]
    pub rewards: Vec<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub era: Option<EraId>,
    /// Era opened when this quest completes.
    #[serde(default)]
    pub unlocks_era: Option<EraId>,
    /// Achievement unlocked when this quest completes.
    #[serde(default)]
    pub completion_achievement: Option<String>,
}

impl Quest {
    pub fn objective(&self, id: &str) -> Option<&QuestObjective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Set one objective's flag. Returns the previous value, or `None` if no such objective.
    pub fn set_objective(&mut self, id: &str, completed: bool) -> Option<bool> {
        let obj = self.objectives.iter_mut().find(|o| o.id == id)?;
        Some(std::mem::replace(&mut obj.completed, completed))
    }

    pub fn all_objectives_done(&self) -> bool {
        self.objectives.iter().all(|o| o.completed)
    }

    /// `Active → Completed`. Returns false when the quest was already terminal.
    pub fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Completed;
        self.completed_at = Some(at);
        true
    }

    /// `Active → Failed`. Returns false when the quest was already terminal.
    pub fn fail(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = QuestStatus::Failed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest() -> Quest {
        Quest {
            id: "q".into(),
            title: "Q".into(),
            description: String::new(),
            kind: QuestType::Side,
            status: QuestStatus::Active,
            objectives: vec![
                QuestObjective { id: "a".into(), description: "A".into(), completed: false },
                QuestObjective { id: "b".into(), description: "B".into(), completed: false },
            ],
            rewards: vec![],
            started_at: None,
            completed_at: None,
            era: None,
            unlocks_era: None,
            completion_achievement: None,
        }
    }

    #[test]
    fn terminal_states_are_sticky() {
        let now = DateTime::from_timestamp(10, 0).unwrap();
        let mut q = quest();
        assert!(q.complete(now));
        assert!(!q.complete(now));
        assert!(!q.fail());
        assert_eq!(q.status, QuestStatus::Completed);

        let mut q = quest();
        assert!(q.fail());
        assert!(!q.complete(now));
        assert_eq!(q.completed_at, None);
    }

    #[test]
    fn objectives_do_not_complete_the_quest() {
        let mut q = quest();
        assert_eq!(q.set_objective("a", true), Some(false));
        assert_eq!(q.set_objective("b", true), Some(false));
        assert!(q.all_objectives_done());
        assert_eq!(q.status, QuestStatus::Active);
        assert_eq!(q.set_objective("zzz", true), None);
    }
}
