use talecraft_engine::{attribute_modifier, roll_dice, Dice, DieType, RollRequest, Rules};

#[test]
fn attribute_modifier_rounds_down() {
    assert_eq!(attribute_modifier(10, 10), 0);
    assert_eq!(attribute_modifier(11, 10), 0);
    assert_eq!(attribute_modifier(12, 10), 1);
    assert_eq!(attribute_modifier(9, 10), -1);
    assert_eq!(attribute_modifier(8, 10), -1);
    assert_eq!(attribute_modifier(1, 10), -5);
    assert_eq!(attribute_modifier(20, 10), 5);
}

#[test]
fn every_die_stays_in_range() {
    let rules = Rules::default();
    let mut dice = Dice::from_seed(2025);
    for die in DieType::ALL {
        for _ in 0..1000 {
            let r = roll_dice(&mut dice, &RollRequest::flavor(die), &rules);
            assert!((1..=die.faces()).contains(&r.natural), "{die} rolled {}", r.natural);
        }
    }
}

// Critical values of the chi-square distribution at p = 0.001.
fn chi_square_limit(df: usize) -> f64 {
    match df {
        3 => 16.27,
        5 => 20.52,
        7 => 24.32,
        9 => 27.88,
        11 => 31.26,
        19 => 43.82,
        _ => unreachable!("no die has {} faces", df + 1),
    }
}

#[test]
fn seeded_rolls_are_uniform() {
    const ROLLS: usize = 10_000;
    let mut dice = Dice::from_seed(7);
    for die in DieType::ALL {
        let faces = die.faces() as usize;
        let mut counts = vec![0usize; faces];
        for _ in 0..ROLLS {
            counts[dice.roll(die.faces()) as usize - 1] += 1;
        }
        let expected = ROLLS as f64 / faces as f64;
        let chi: f64 = counts.iter().map(|&c| (c as f64 - expected).powi(2) / expected).sum();
        assert!(chi < chi_square_limit(faces - 1), "{die}: chi-square {chi:.2}");
    }
}

#[test]
fn check_compares_total_with_dc() {
    let rules = Rules::default();
    // audacity 14 → +2
    let mut dice = Dice::from_scripted(vec![10, 9]);
    let hit = roll_dice(&mut dice, &RollRequest::check(14, 12), &rules);
    assert_eq!((hit.natural, hit.modifier, hit.total, hit.success), (10, 2, 12, Some(true)));
    let miss = roll_dice(&mut dice, &RollRequest::check(14, 12), &rules);
    assert_eq!(miss.success, Some(false));
}

#[test]
fn d20_without_dc_uses_default_and_flavor_dice_have_no_verdict() {
    let rules = Rules::default();
    let mut dice = Dice::from_scripted(vec![10, 6]);
    let d20 = roll_dice(&mut dice, &RollRequest::flavor(DieType::D20), &rules);
    assert_eq!(d20.dc, Some(rules.default_d20_dc));
    assert_eq!(d20.success, Some(true));
    let d6 = roll_dice(&mut dice, &RollRequest::flavor(DieType::D6), &rules);
    assert_eq!((d6.dc, d6.success), (None, None));
    assert!(!d6.is_critical_success());
}

#[test]
fn criticals_are_d20_only() {
    let rules = Rules::default();
    let mut dice = Dice::from_scripted(vec![20, 1]);
    let nat20 = roll_dice(&mut dice, &RollRequest::check(5, 30), &rules);
    assert!(nat20.is_critical_success());
    // a natural 20 is not an automatic success
    assert_eq!(nat20.success, Some(false));
    let nat1 = roll_dice(&mut dice, &RollRequest::check(10, 1), &rules);
    assert!(nat1.is_critical_failure());
    assert_eq!(nat1.success, Some(true));
}
