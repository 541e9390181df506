use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{character::Attribute, rules::Rules, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    pub const ALL: [DieType; 6] = [Self::D4, Self::D6, Self::D8, Self::D10, Self::D12, Self::D20];

    pub fn faces(self) -> u8 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.faces())
    }
}

impl FromStr for DieType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let faces = s.trim().trim_start_matches(['d', 'D']);
        Self::ALL
            .into_iter()
            .find(|d| d.faces().to_string() == faces)
            .ok_or_else(|| format!("unknown die `{s}` (expected d4, d6, d8, d10, d12 or d20)"))
    }
}

/// `floor((value - base) / 2)`, rounding toward negative infinity.
pub fn attribute_modifier(value: i32, base: i32) -> i32 {
    (value - base).div_euclid(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    pub die: DieType,
    #[serde(default)]
    pub attribute_value: Option<i32>,
    #[serde(default)]
    pub dc: Option<i32>,
}

impl RollRequest {
    pub fn flavor(die: DieType) -> Self {
        Self { die, attribute_value: None, dc: None }
    }

    pub fn check(attribute_value: i32, dc: i32) -> Self {
        Self { die: DieType::D20, attribute_value: Some(attribute_value), dc: Some(dc) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub die: DieType,
    pub natural: u8,
    pub modifier: i32,
    pub total: i32,
    pub dc: Option<i32>,
    /// Present only when the roll was made against a DC.
    pub success: Option<bool>,
}

impl RollResult {
    pub fn is_critical_success(&self) -> bool {
        self.die == DieType::D20 && self.natural == 20
    }

    pub fn is_critical_failure(&self) -> bool {
        self.die == DieType::D20 && self.natural == 1
    }
}

/// Roll one die, add the attribute modifier, and judge it against the DC.
///
/// A d20 without an explicit DC is judged against `rules.default_d20_dc`;
/// other dice without a DC are flavor rolls and carry no verdict.
pub fn roll_dice(dice: &mut Dice, req: &RollRequest, rules: &Rules) -> RollResult {
    let natural = dice.roll(req.die.faces());
    let modifier = req
        .attribute_value
        .map(|v| attribute_modifier(v, rules.modifier_base))
        .unwrap_or(0);
    let total = natural as i32 + modifier;
    let dc = req.dc.or((req.die == DieType::D20).then_some(rules.default_d20_dc));
    RollResult { die: req.die, natural, modifier, total, dc, success: dc.map(|dc| total >= dc) }
}

/// Same as [`roll_dice`] with an explicit modifier instead of an attribute score.
pub fn roll_with_modifier(dice: &mut Dice, die: DieType, modifier: i32, dc: Option<i32>) -> RollResult {
    let natural = dice.roll(die.faces());
    let total = natural as i32 + modifier;
    RollResult { die, natural, modifier, total, dc, success: dc.map(|dc| total >= dc) }
}

pub fn describe_roll(label: &str, roll: &RollResult) -> String {
    let verdict = match (roll.dc, roll.success) {
        (Some(dc), Some(ok)) => format!(" vs DC {} → {}", dc, if ok { "success" } else { "failure" }),
        _ => String::new(),
    };
    let crit = if roll.is_critical_success() {
        " (NAT20)"
    } else if roll.is_critical_failure() {
        " (NAT1)"
    } else {
        ""
    };
    format!(
        "[ROLL][{}] {}={} {:+} = {}{}{}",
        label, roll.die, roll.natural, roll.modifier, roll.total, crit, verdict
    )
}

/// A roll as it is kept in the player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub id: String,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub roll: RollResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_rounds_down() {
        assert_eq!(attribute_modifier(8, 10), -1);
        assert_eq!(attribute_modifier(9, 10), -1);
        assert_eq!(attribute_modifier(10, 10), 0);
        assert_eq!(attribute_modifier(11, 10), 0);
        assert_eq!(attribute_modifier(12, 10), 1);
        assert_eq!(attribute_modifier(1, 10), -5);
    }

    #[test]
    fn die_names_parse() {
        assert_eq!("d20".parse::<DieType>(), Ok(DieType::D20));
        assert_eq!("D6".parse::<DieType>(), Ok(DieType::D6));
        assert!("d7".parse::<DieType>().is_err());
        assert_eq!(DieType::D12.to_string(), "d12");
    }

    #[test]
    fn d20_defaults_to_dc_ten() {
        let rules = Rules::default();
        let mut dice = Dice::from_scripted(vec![10]);
        let r = roll_dice(&mut dice, &RollRequest::flavor(DieType::D20), &rules);
        assert_eq!(r.dc, Some(10));
        assert_eq!(r.success, Some(true));
    }

    #[test]
    fn flavor_roll_has_no_verdict() {
        let rules = Rules::default();
        let mut dice = Dice::from_scripted(vec![3]);
        let r = roll_dice(&mut dice, &RollRequest::flavor(DieType::D6), &rules);
        assert_eq!(r.natural, 3);
        assert_eq!(r.success, None);
        assert_eq!(r.dc, None);
    }

    #[test]
    fn modifier_applies_to_total() {
        let rules = Rules::default();
        let mut dice = Dice::from_scripted(vec![11]);
        let r = roll_dice(&mut dice, &RollRequest::check(6, 12), &rules);
        assert_eq!(r.modifier, -2);
        assert_eq!(r.total, 9);
        assert_eq!(r.success, Some(false));
    }
}
