use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Duration;
use talecraft_engine::{
    clock::FixedClock,
    encounters::EncounterOutcome,
    events::unlocked_achievements,
    inventory::{Item, ItemEffect, ItemType, Rarity},
    life::DefeatHandler,
    settings::Language,
    Archetype, Catalog, Character, CharacterDraft, Dice, DieType, EraId, GameEvent, ProgressionStore, Rules,
};

const NOW: i64 = 1_700_000_000; // 2023-11-14 22:13:20 UTC

fn store(rolls: Vec<u8>) -> ProgressionStore {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let mut store = ProgressionStore::new(catalog, Rules::builtin().unwrap())
        .with_dice(Dice::from_scripted(rolls))
        .with_clock(FixedClock::at_timestamp(NOW));
    store.create_character(CharacterDraft::new("Will", Archetype::Seeker)).unwrap();
    store
}

fn hero(store: &ProgressionStore) -> &Character {
    store.state().character.as_ref().unwrap()
}

fn unlocked(store: &ProgressionStore, id: &str) -> bool {
    store.state().achievement(id).is_some_and(|a| a.is_unlocked())
}

fn item(id: &str, kind: ItemType, effect: Option<ItemEffect>, quantity: u32) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        description: String::new(),
        kind,
        rarity: Rarity::Common,
        icon: String::new(),
        effect,
        quantity,
    }
}

struct CountDefeats(Arc<AtomicUsize>);

impl DefeatHandler for CountDefeats {
    fn on_defeat(&mut self, _character: &Character) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn health_drop_to_zero_fires_defeat_once() {
    let defeats = Arc::new(AtomicUsize::new(0));
    let mut s = store(vec![]).with_defeat_handler(CountDefeats(defeats.clone()));
    s.apply_effect_bundle(&EncounterOutcome { health_change: Some(-80), ..Default::default() });
    assert_eq!(hero(&s).health, 20);

    let events = s.apply_effect_bundle(&EncounterOutcome { health_change: Some(-30), ..Default::default() });
    assert_eq!(hero(&s).health, 0);
    assert_eq!(events[0], GameEvent::HealthChanged { before: 20, after: 0, max: 100 });
    assert!(events.iter().any(|e| matches!(e, GameEvent::CharacterDefeated { .. })));
    s.apply_effect_bundle(&EncounterOutcome { health_change: Some(-10), ..Default::default() });
    assert_eq!(defeats.load(Ordering::SeqCst), 1);
}

#[test]
fn survivor_needs_low_but_nonzero_health() {
    let mut s = store(vec![]);
    let events = s.apply_effect_bundle(&EncounterOutcome { health_change: Some(-92), ..Default::default() });
    assert_eq!(unlocked_achievements(&events), vec!["survivor"]);
}

#[test]
fn choice_applies_every_effect_in_order() {
    let mut s = store(vec![11]);
    let encounter = s.catalog().encounter("st_meet_dustin").unwrap().clone();
    let (record, _) = s.roll_for_choice(&encounter, "share_info").unwrap();
    let roll = record.unwrap().roll;
    // influence 5 → -3
    assert_eq!((roll.natural, roll.modifier, roll.total, roll.success), (11, -3, 8, Some(true)));

    let report = s.choose(&encounter, "share_info", Some(&roll)).unwrap();
    let tags: Vec<&str> = report.events.iter().map(GameEvent::tag).collect();
    assert_eq!(
        tags,
        [
            "choice_made",
            "experience_gained",
            "relationship_changed",
            "location_discovered",
            "journal_entry_added",
            "achievement_unlocked",
        ]
    );
    assert_eq!(hero(&s).experience, 40);
    assert_eq!(s.state().npc("dustin").unwrap().relationship, 50);
    assert!(s.state().location("party_hq").unwrap().discovered);
    assert_eq!(s.state().journal.len(), 1);
    assert_eq!(s.state().journal[0].era, EraId::from("stranger_things"));
    assert_eq!(s.state().player_stats.choices_made, 1);
    assert!(unlocked(&s, "first_discovery"));
    assert_eq!(report.next_encounter, None);

    let log = s.take_transcript();
    assert!(log.iter().any(|l| l.starts_with("[CHECK][st_meet_dustin]")));
    assert!(log.iter().any(|l| l.starts_with("[ROLL][influence]")));
    assert!(log.iter().any(|l| l.starts_with("[OUTCOME][st_meet_dustin] share_info → success")));
}

#[test]
fn unchecked_choice_needs_no_roll() {
    let mut s = store(vec![]);
    let encounter = s.catalog().encounter("st_flickering_lights").unwrap().clone();
    let (record, events) = s.roll_for_choice(&encounter, "run_home").unwrap();
    assert!(record.is_none());
    assert!(events.is_empty());
    assert!(s.choose(&encounter, "run_home", None).is_ok());
    assert!(s.state().dice_history.is_empty());
}

#[test]
fn skill_checks_add_the_skill_level() {
    let mut s = store(vec![10]);
    let encounter = s.catalog().encounter("st_school_basement").unwrap().clone();
    let (record, _) = s.roll_for_choice(&encounter, "sneak_down").unwrap();
    let roll = record.unwrap().roll;
    // stealth starts at level 1
    assert_eq!((roll.modifier, roll.total, roll.dc), (1, 11, Some(12)));
    assert_eq!(roll.success, Some(false));
}

#[test]
fn quest_lifecycle_is_guarded() {
    let mut s = store(vec![]);
    let events = s.start_session(None);
    assert!(events.contains(&GameEvent::QuestAdded { id: "main_mystery".into() }));
    assert!(unlocked(&s, "first_steps"));

    s.update_quest_objective("main_mystery", "obj1", true);
    let quest = s.state().quest("main_mystery").unwrap();
    assert!(quest.objective("obj1").unwrap().completed);
    assert!(quest.objectives.iter().skip(1).all(|o| !o.completed));

    let events = s.complete_quest("main_mystery");
    let got = unlocked_achievements(&events);
    for id in ["quest_complete", "main_story", "chapter_one", "era_traveler"] {
        assert!(got.contains(&id), "missing {id} in {got:?}");
    }
    assert!(!got.contains(&"perfectionist"));
    assert_eq!(hero(&s).experience, 100);
    assert_eq!(hero(&s).level, 1);
    assert!(s.state().unlocked_eras.contains(&EraId::from("medieval")));
    assert_eq!(s.state().player_stats.quests_completed, 1);

    assert!(s.complete_quest("main_mystery").is_empty());
    assert!(s.fail_quest("main_mystery").is_empty());
    assert!(s.update_quest_objective("main_mystery", "obj2", true).is_empty());
    assert!(s.complete_quest("no_such_quest").is_empty());
}

#[test]
fn experience_recomputes_level() {
    let mut s = store(vec![]);
    let events = s.apply_effect_bundle(&EncounterOutcome { experience_gain: Some(450), ..Default::default() });
    assert!(events.contains(&GameEvent::LevelChanged { from: 1, to: 3 }));
    assert_eq!(hero(&s).level, 3);
}

#[test]
fn achievement_unlock_is_idempotent() {
    let mut s = store(vec![]);
    assert_eq!(s.unlock_achievement("first_item").len(), 1);
    let first = s.state().achievement("first_item").unwrap().unlocked_at;
    let mut later = FixedClock::at_timestamp(NOW);
    later.advance(Duration::days(3));
    s.set_clock(later);
    assert!(s.unlock_achievement("first_item").is_empty());
    assert_eq!(s.state().achievement("first_item").unwrap().unlocked_at, first);
    assert_eq!(s.state().unlocked_achievement_count(), 1);
}

#[test]
fn dice_history_is_capped_newest_first() {
    let faces: Vec<u8> = (0..60).map(|i| (i % 6 + 1) as u8).collect();
    let mut s = store(faces);
    for _ in 0..60 {
        s.roll_dice_and_record(DieType::D6, None, None);
    }
    let history = &s.state().dice_history;
    assert_eq!(history.len(), 50);
    // the 60th face was 6, the 59th 5
    assert_eq!((history[0].roll.natural, history[1].roll.natural), (6, 5));
    assert_eq!(s.state().player_stats.dice_rolled, 60);
}

#[test]
fn comeback_after_three_failures() {
    let mut s = store(vec![2, 3, 4, 18]);
    let mut last = Vec::new();
    for _ in 0..4 {
        last = s.roll_dice_and_record(DieType::D20, None, Some(15)).1;
    }
    assert!(unlocked_achievements(&last).contains(&"comeback_king"));
    assert_eq!(s.state().player_stats.high_dc_successes, 1);
}

#[test]
fn session_counters_drive_triple_20_and_perfect_session() {
    let mut s = store(vec![20, 20, 20]);
    s.start_session(None);
    for _ in 0..3 {
        s.roll_dice_and_record(DieType::D20, Some(talecraft_engine::Attribute::Audacity), None);
    }
    assert!(unlocked(&s, "triple_20"));
    assert!(unlocked(&s, "dice_master"));
    assert_eq!(s.state().player_stats.critical_successes, 3);

    let events = s.end_session();
    assert!(unlocked_achievements(&events).contains(&"perfect_session"));
    assert!(s.state().current_session.is_none());
    assert_eq!(s.state().session_history.len(), 1);
    assert!(s.end_session().is_empty());
}

#[test]
fn daily_dice_challenge_rewards_once() {
    let mut s = store(vec![]);
    s.generate_daily_challenges();
    let batch = &s.state().daily_challenges;
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].expires_at.to_rfc3339(), "2023-11-15T00:00:00+00:00");

    let mut completed = 0;
    for _ in 0..11 {
        let (_, events) = s.roll_dice_and_record(DieType::D6, None, None);
        completed += events.iter().filter(|e| matches!(e, GameEvent::ChallengeCompleted { .. })).count();
    }
    assert_eq!(completed, 1);
    assert_eq!(hero(&s).experience, 50);
    assert_eq!(s.state().player_stats.dailies_completed, 1);

    assert!(s.refresh_daily_challenges().is_empty());
    let mut tomorrow = FixedClock::at_timestamp(NOW);
    tomorrow.advance(Duration::hours(2));
    s.set_clock(tomorrow);
    assert_eq!(s.refresh_daily_challenges(), vec![GameEvent::DailyChallengesGenerated { count: 3 }]);
    assert!(s.state().daily_challenges.iter().all(|c| c.progress == 0 && !c.completed));
}

#[test]
fn skill_unlock_waits_for_prerequisite() {
    let mut s = store(vec![]);
    assert!(s.unlock_skill("sixth_sense").is_empty());
    assert!(s.add_skill_xp("sixth_sense", 500).is_empty());
    s.add_skill_xp("perception", 100);
    s.add_skill_xp("perception", 150);
    assert_eq!(s.state().skill("perception").unwrap().current_level, 3);
    assert_eq!(s.unlock_skill("sixth_sense"), vec![GameEvent::SkillUnlocked { id: "sixth_sense".into() }]);
    assert_eq!(s.state().skill("sixth_sense").unwrap().current_level, 1);
}

#[test]
fn consumables_restore_and_are_consumed() {
    let mut s = store(vec![]);
    s.apply_effect_bundle(&EncounterOutcome { health_change: Some(-50), ..Default::default() });
    s.add_item(item("bandage", ItemType::Consumable, Some(ItemEffect::Heal), 2));
    s.add_item(item("bat", ItemType::Weapon, None, 1));

    let events = s.use_item("bandage");
    assert_eq!(events[0], GameEvent::ItemUsed { id: "bandage".into() });
    assert_eq!(hero(&s).health, 70);
    assert_eq!(s.state().inventory.get("bandage").unwrap().quantity, 1);
    assert!(s.use_item("bat").is_empty());
    assert!(s.use_item("ghost").is_empty());
    s.use_item("bandage");
    assert!(!s.state().inventory.contains("bandage"));
}

#[test]
fn meeting_is_one_way() {
    let mut s = store(vec![]);
    let events = s.meet_npc("dustin");
    assert!(unlocked_achievements(&events).contains(&"first_contact"));
    assert!(s.meet_npc("dustin").is_empty());
    assert_eq!(s.state().player_stats.npcs_met, 1);
}

#[test]
fn relationships_clamp_at_bounds() {
    let mut s = store(vec![]);
    let events = s.update_relationship("dr_owens", -500);
    assert!(events.contains(&GameEvent::RelationshipChanged { npc_id: "dr_owens".into(), before: -10, after: -100 }));
    assert!(unlocked_achievements(&events).contains(&"enemy_made"));
}

#[test]
fn visiting_the_upside_down_discovers_it() {
    let mut s = store(vec![]);
    let events = s.visit_location("upside_down");
    assert!(events.contains(&GameEvent::LocationDiscovered { id: "upside_down".into() }));
    let got = unlocked_achievements(&events);
    assert!(got.contains(&"upside_down_visitor"));
    assert!(got.contains(&"danger_seeker"));
    assert!(s.visit_location("upside_down").is_empty());
}

#[test]
fn encounters_follow_era_and_level() {
    let mut s = store(vec![2]);
    let picked = s.pick_encounter(None).map(|e| e.id);
    assert!(matches!(picked.as_deref(), Some("st_flickering_lights" | "st_meet_dustin")));

    s.set_current_era(&EraId::from("medieval"));
    assert!(s.pick_encounter(None).is_none());
    assert!(s.set_current_era(&EraId::from("atlantis")).is_empty());
}

#[test]
fn reset_keeps_settings_and_replays_intro() {
    let mut s = store(vec![]);
    s.settings_mut().language = Language::Es;
    s.settings_mut().has_seen_intro = true;
    s.start_session(None);
    assert_eq!(s.reset(), vec![GameEvent::GameReset]);
    let state = s.state();
    assert!(state.character.is_none());
    assert!(state.quests.is_empty());
    assert_eq!(state.settings.language, Language::Es);
    assert!(!state.settings.has_seen_intro);
}

#[test]
fn mutators_without_character_are_noops() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let mut s = ProgressionStore::new(catalog, Rules::builtin().unwrap());
    assert!(s.start_session(None).is_empty());
    assert!(s.apply_effect_bundle(&EncounterOutcome { gold_change: Some(5), ..Default::default() }).is_empty());
    assert!(s.clear_character().is_empty());
}

#[test]
fn creation_rejects_overspent_points() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let mut s = ProgressionStore::new(catalog, Rules::builtin().unwrap());
    let mut draft = CharacterDraft::new("Steve", Archetype::Protector);
    draft.attributes = talecraft_engine::Attributes::uniform(8);
    assert!(s.create_character(draft).is_err());
    assert!(s.state().character.is_none());
}
