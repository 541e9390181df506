use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use talecraft_engine::{
    api::{self, NewGameConfig},
    persist, Attributes, Catalog, Dice, ProgressionStore, Rules,
};

#[derive(Parser)]
#[command(name = "simulate-choice")]
#[command(about = "Monte Carlo sim: play one encounter choice many times")]
struct Args {
    /// Encounter id from the catalog
    #[arg(long)]
    encounter: String,

    /// Choice id within the encounter
    #[arg(long)]
    choice: String,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Score used for every attribute of the simulated character
    #[arg(long, default_value_t = 5)]
    score: i32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

#[derive(Default)]
struct Tally {
    successes: u32,
    rolled: u32,
    defeats: u32,
    health: i64,
    gold: i64,
    xp: i64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let catalog = Arc::new(Catalog::builtin().context("load built-in catalog")?);
    let rules = Rules::builtin().context("parse built-in rules")?;
    let encounter = catalog
        .encounter(&args.encounter)
        .cloned()
        .ok_or_else(|| anyhow!("unknown encounter `{}`", args.encounter))?;
    if encounter.choice(&args.choice).is_none() {
        anyhow::bail!("encounter `{}` has no choice `{}`", encounter.id, args.choice);
    }

    let template = api::new_game(NewGameConfig {
        name: "Simulant".into(),
        start_session: false,
        ..Default::default()
    })?;
    let mut base = persist::from_json(&template.save)?;
    // Point-buy limits apply to players, not to the simulation.
    if let Some(c) = base.character.as_mut() {
        c.attributes = Attributes::uniform(args.score);
    }
    let start = base.character.clone().ok_or_else(|| anyhow!("template has no character"))?;

    let mut tally = Tally::default();
    for i in 0..args.trials {
        let mut store = ProgressionStore::from_state(catalog.clone(), rules.clone(), base.clone())
            .with_dice(Dice::from_seed(args.seed.wrapping_add(i as u64)));
        let (record, _) = store.roll_for_choice(&encounter, &args.choice)?;
        let roll = record.map(|r| r.roll);
        if let Some(r) = roll {
            tally.rolled += 1;
            if r.success == Some(true) {
                tally.successes += 1;
            }
        }
        let report = store.choose(&encounter, &args.choice, roll.as_ref())?;
        if report.events.iter().any(|e| e.tag() == "character_defeated") {
            tally.defeats += 1;
        }
        if let Some(end) = store.state().character.as_ref() {
            tally.health += (end.health - start.health) as i64;
            tally.gold += end.gold - start.gold;
            tally.xp += end.experience - start.experience;
        }
    }

    let n = args.trials.max(1) as f64;
    println!("encounter={} choice={} trials={}", encounter.id, args.choice, args.trials);
    if let Some(c) = encounter.choice(&args.choice) {
        match (c.required_attribute, &c.required_skill) {
            (Some(attr), _) => println!("check attribute={attr} score={}", args.score),
            (None, Some(skill)) => println!("check skill={skill}"),
            (None, None) => {}
        }
    }
    if tally.rolled > 0 {
        println!("success_rate={:.3}", tally.successes as f64 / tally.rolled as f64);
    }
    println!(
        "avg_health={:+.2} avg_gold={:+.2} avg_xp={:+.2} defeats={}",
        tally.health as f64 / n,
        tally.gold as f64 / n,
        tally.xp as f64 / n,
        tally.defeats
    );
    Ok(())
}
