use serde::{Deserialize, Serialize};

use crate::character::Character;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Standing,
    /// Health is at 0. Nothing forces a game over; the store's defeat hook decides.
    Defeated,
}

impl LifeState {
    pub fn of(character: &Character) -> Self {
        if character.health <= 0 {
            Self::Defeated
        } else {
            Self::Standing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterChange {
    pub before: i32,
    pub after: i32,
    /// Health went from above 0 to exactly 0 in this call.
    pub dropped: bool,
}

impl MeterChange {
    pub fn delta(&self) -> i32 {
        self.after - self.before
    }
}

fn clamp_meter(current: i32, max: i32, delta: i64) -> i32 {
    let max = max.max(0) as i64;
    (current as i64 + delta).clamp(0, max) as i32
}

/// Apply a health delta clamped to `0..=max_health`.
pub fn apply_health_delta(
    character: &mut Character,
    delta: i64,
    mut log: impl FnMut(String),
) -> MeterChange {
    let before = character.health;
    character.health = clamp_meter(before, character.max_health, delta);
    log(format!(
        "[HP][{}] {} → {} ({:+})",
        character.name, before, character.health, delta
    ));
    let dropped = before > 0 && character.health == 0;
    if dropped {
        log(format!("[STATE][{}] drops to 0 health → Defeated", character.name));
    }
    MeterChange { before, after: character.health, dropped }
}

/// Apply an energy delta clamped to `0..=max_energy`.
pub fn apply_energy_delta(
    character: &mut Character,
    delta: i64,
    mut log: impl FnMut(String),
) -> MeterChange {
    let before = character.energy;
    character.energy = clamp_meter(before, character.max_energy, delta);
    log(format!(
        "[EN][{}] {} → {} ({:+})",
        character.name, before, character.energy, delta
    ));
    MeterChange { before, after: character.energy, dropped: false }
}

/// Called when a character's health reaches 0.
pub trait DefeatHandler: Send {
    fn on_defeat(&mut self, character: &Character);
}

/// Records nothing and forces nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDefeat;

impl DefeatHandler for IgnoreDefeat {
    fn on_defeat(&mut self, _character: &Character) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        character::{Archetype, CharacterDraft},
        rules::Rules,
    };
    use chrono::DateTime;

    fn hero() -> Character {
        CharacterDraft::new("Hero", Archetype::Protector)
            .build("c1".into(), DateTime::from_timestamp(0, 0).unwrap(), &Rules::default())
            .unwrap()
    }

    #[test]
    fn damage_clamps_at_zero_and_reports_drop() {
        let mut c = hero();
        c.health = 20;
        let mut lines = Vec::new();
        let change = apply_health_delta(&mut c, -30, |l| lines.push(l));
        assert_eq!(c.health, 0);
        assert!(change.dropped);
        assert_eq!(change.delta(), -20);
        assert_eq!(LifeState::of(&c), LifeState::Defeated);
        assert!(lines.iter().any(|l| l.starts_with("[STATE][Hero]")));
    }

    #[test]
    fn healing_caps_at_max() {
        let mut c = hero();
        c.health = 95;
        let change = apply_health_delta(&mut c, 50, |_| {});
        assert_eq!(c.health, 100);
        assert!(!change.dropped);
    }

    #[test]
    fn already_at_zero_does_not_drop_again() {
        let mut c = hero();
        c.health = 0;
        let change = apply_health_delta(&mut c, -5, |_| {});
        assert!(!change.dropped);
    }

    #[test]
    fn energy_clamps_both_ways() {
        let mut c = hero();
        apply_energy_delta(&mut c, i64::MIN / 2, |_| {});
        assert_eq!(c.energy, 0);
        apply_energy_delta(&mut c, i64::MAX / 2, |_| {});
        assert_eq!(c.energy, c.max_energy);
    }
}
