use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use encoding_rs::Encoding;
use talecraft_engine::{
    api::{self, NewGameConfig, PlayConfig, RollConfig},
    persist, Archetype, Attribute, Attributes, DieType, EraId, GameState,
};

#[derive(Subcommand)]
enum Cmd {
    /// Roll a die several times, optionally with an attribute score and DC
    Roll {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Die to roll (d4, d6, d8, d10, d12, d20)
        #[arg(long, default_value = "d20")]
        die: DieType,
        /// Number of rolls
        #[arg(long, default_value_t = 5)]
        rolls: u32,
        /// Attribute score feeding the modifier
        #[arg(long)]
        score: Option<i32>,
        /// Difficulty class to meet or beat
        #[arg(long)]
        dc: Option<i32>,
    },
    /// Create a character and write a fresh save file
    New {
        #[arg(long)]
        save: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "seeker")]
        archetype: Archetype,
        #[arg(long, default_value = "")]
        backstory: String,
        /// Starting era (must exist in the catalog)
        #[arg(long)]
        era: Option<String>,
        /// Attribute score override, e.g. `--attr audacity=7` (repeatable)
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(Attribute, i32)>,
    },
    /// Print a summary of a save file
    Status {
        #[arg(long)]
        save: PathBuf,
    },
    /// Draw a random encounter for the character's era and level
    Explore {
        #[arg(long)]
        save: PathBuf,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Play one choice of an encounter and update the save file
    Play {
        #[arg(long)]
        save: PathBuf,
        #[arg(long)]
        encounter: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        choice: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse a narration text file for an embedded dice check
    Directive { file: PathBuf },
    /// Refresh and list the daily challenges of a save
    Daily {
        #[arg(long)]
        save: PathBuf,
        /// Replace the batch even if it has not expired
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print one catalog entry as JSON
    Lookup { category: String, key: String },
    /// Reset a save, keeping settings
    Reset {
        #[arg(long)]
        save: PathBuf,
    },
}

#[derive(Parser)]
#[command(name = "talecraft")]
#[command(about = "Talecraft progression engine harness")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn parse_attr(raw: &str) -> Result<(Attribute, i32), String> {
    let (name, value) = raw.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let attr: Attribute = name.parse()?;
    let value = value.trim().parse().map_err(|e| format!("bad score `{value}`: {e}"))?;
    Ok((attr, value))
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<GameState> {
    let text = read_text_auto(path)?;
    persist::from_json(&text).with_context(|| format!("parse save file {}", path.display()))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_status(state: &GameState) {
    let Some(c) = state.character.as_ref() else {
        println!("no character");
        return;
    };
    println!("{} the {} (level {}, {} xp)", c.name, c.archetype.key(), c.level, c.experience);
    println!("health {}/{}  energy {}/{}  gold {}", c.health, c.max_health, c.energy, c.max_energy, c.gold);
    println!("era {}  unlocked eras {}", c.current_era, state.unlocked_eras.len());
    println!(
        "achievements {}/{}  items {}  rolls {}",
        state.unlocked_achievement_count(),
        state.achievements.len(),
        state.inventory.total_quantity(),
        state.player_stats.dice_rolled
    );
    for q in &state.quests {
        let done = q.objectives.iter().filter(|o| o.completed).count();
        println!("quest {} [{:?}] {}/{}", q.id, q.status, done, q.objectives.len());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Roll { seed, die, rolls, score, dc } => {
            let cfg = RollConfig { die, count: rolls, attribute_value: score, dc, seed };
            for line in api::roll(&cfg)?.log {
                println!("{line}");
            }
        }
        Cmd::New { save, name, archetype, backstory, era, attrs } => {
            let mut attributes = Attributes::default();
            for (attr, value) in attrs {
                attributes.set(attr, value);
            }
            let cfg = NewGameConfig {
                name,
                archetype,
                backstory,
                attributes,
                era: era.map(EraId::from),
                ..Default::default()
            };
            let report = api::new_game(cfg)?;
            fs::write(&save, &report.save).with_context(|| format!("write {}", save.display()))?;
            print_status(&persist::from_json(&report.save)?);
        }
        Cmd::Status { save } => print_status(&load(&save)?),
        Cmd::Explore { save, location, seed } => {
            let mut store = api::open_store(load(&save)?, Some(seed))?;
            let encounter = store
                .pick_encounter(location.as_deref())
                .ok_or_else(|| anyhow!("nothing happens here"))?;
            println!("{} ({})", encounter.title, encounter.id);
            println!("{}", encounter.narration);
            for choice in &encounter.choices {
                let check = match (choice.difficulty_check, choice.required_attribute, &choice.required_skill) {
                    (Some(dc), Some(attr), _) => format!(" [{attr} DC {dc}]"),
                    (Some(dc), None, Some(skill)) => format!(" [{skill} DC {dc}]"),
                    (Some(dc), None, None) => format!(" [DC {dc}]"),
                    (None, ..) => String::new(),
                };
                println!("  {}: {}{}", choice.id, choice.text, check);
            }
        }
        Cmd::Play { save, encounter, location, choice, seed, json } => {
            let text = read_text_auto(&save)?;
            let cfg = PlayConfig {
                save_json: Some(text),
                encounter_id: encounter,
                location,
                choice_id: choice,
                seed,
                ..Default::default()
            };
            let report = api::play_encounter(&cfg)?;
            fs::write(&save, &report.save).with_context(|| format!("write {}", save.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in &report.log {
                    println!("{line}");
                }
                println!("{}", report.narration);
                if let Some(next) = &report.next_encounter {
                    println!("next: {next}");
                }
            }
        }
        Cmd::Directive { file } => {
            let parsed = api::parse_narration(&read_text_auto(&file)?);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Cmd::Daily { save, force } => {
            let mut store = api::open_store(load(&save)?, None)?;
            if force {
                store.generate_daily_challenges();
            } else {
                store.refresh_daily_challenges();
            }
            for c in &store.state().daily_challenges {
                let mark = if c.completed { "x" } else { " " };
                println!("[{mark}] {} {}/{} ({} xp)", c.title, c.progress, c.target, c.reward.xp);
            }
            persist::save_to_path(store.state(), &save)?;
        }
        Cmd::Lookup { category, key } => println!("{}", api::lookup_json(&category, &key)?),
        Cmd::Reset { save } => {
            let mut store = api::open_store(load(&save)?, None)?;
            store.reset();
            persist::save_to_path(store.state(), &save)?;
            println!("reset {}", save.display());
        }
    }
    Ok(())
}
