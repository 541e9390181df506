use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Combat,
    Social,
    Survival,
    Knowledge,
    Mystical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: SkillCategory,
    pub max_level: u32,
    pub current_level: u32,
    pub xp_required: u64,
    pub xp_current: u64,
    #[serde(default)]
    pub icon: String,
    pub unlocked: bool,
    #[serde(default)]
    pub prerequisite_id: Option<String>,
}

impl Skill {
    /// Accumulate XP and level up as many times as the total allows.
    ///
    /// Each level-up subtracts the current threshold and scales the next one by
    /// `growth`, rounded down. Stops at `max_level`. Returns the levels gained.
    /// Locked skills ignore XP.
    pub fn gain_xp(&mut self, amount: u64, growth: f64) -> u32 {
        if !self.unlocked {
            return 0;
        }
        self.xp_current = self.xp_current.saturating_add(amount);
        let start = self.current_level;
        while self.xp_current >= self.xp_required && self.current_level < self.max_level {
            self.xp_current -= self.xp_required;
            self.current_level += 1;
            self.xp_required = scale_threshold(self.xp_required, growth);
        }
        self.current_level - start
    }

    /// Whether the skill may be unlocked given the current level of its prerequisite.
    pub fn can_unlock(&self, prerequisite_level: Option<u32>, needed: u32) -> bool {
        match &self.prerequisite_id {
            None => true,
            Some(_) => prerequisite_level.is_some_and(|lvl| lvl >= needed),
        }
    }

    /// Returns false when already unlocked.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.current_level = self.current_level.max(1);
        true
    }
}

// A zero threshold would loop forever; keep it at least 1.
fn scale_threshold(required: u64, growth: f64) -> u64 {
    let next = (required as f64 * growth).floor();
    if next.is_finite() && next >= 1.0 {
        next.min(u64::MAX as f64) as u64
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lore() -> Skill {
        Skill {
            id: "lore".into(),
            name: "Lore".into(),
            description: String::new(),
            category: SkillCategory::Knowledge,
            max_level: 10,
            current_level: 2,
            xp_required: 150,
            xp_current: 100,
            icon: String::new(),
            unlocked: true,
            prerequisite_id: None,
        }
    }

    #[test]
    fn single_grant_levels_once_and_scales() {
        let mut s = lore();
        assert_eq!(s.gain_xp(200, 1.5), 1);
        assert_eq!((s.current_level, s.xp_current, s.xp_required), (3, 150, 225));
    }

    #[test]
    fn large_grant_loops_until_max_level() {
        let mut s = lore();
        s.max_level = 4;
        s.gain_xp(100_000, 1.5);
        assert_eq!(s.current_level, 4);
        assert!(s.xp_current > s.xp_required);
    }

    #[test]
    fn locked_skill_ignores_xp() {
        let mut s = lore();
        s.unlocked = false;
        assert_eq!(s.gain_xp(1000, 1.5), 0);
        assert_eq!(s.xp_current, 100);
    }

    #[test]
    fn prerequisite_gate() {
        let mut s = lore();
        s.prerequisite_id = Some("perception".into());
        assert!(!s.can_unlock(Some(2), 3));
        assert!(s.can_unlock(Some(3), 3));
        assert!(!s.can_unlock(None, 3));
    }
}
