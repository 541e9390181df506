use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    character::{Archetype, Attributes, CharacterDraft},
    checks::{describe_roll, roll_dice, DieType, RollRequest, RollResult},
    content::{Catalog, Category, EraId},
    directive::{self, ParsedNarration},
    events::GameEvent,
    persist,
    rules::Rules,
    session::MessageKind,
    settings::WorldConfigPatch,
    state::GameState,
    store::ProgressionStore,
    Dice,
};

const DEFAULT_SEED: u64 = 42;

fn builtin() -> Result<(Arc<Catalog>, Rules)> {
    let catalog = Catalog::builtin().context("load built-in catalog")?;
    let rules = Rules::builtin().context("parse built-in rules")?;
    catalog.check_rules(&rules).context("built-in rules disagree with the catalog")?;
    Ok((Arc::new(catalog), rules))
}

/// A store over the built-in content, with seeded dice when `seed` is given.
pub fn open_store(state: GameState, seed: Option<u64>) -> Result<ProgressionStore> {
    let (catalog, rules) = builtin()?;
    let store = ProgressionStore::from_state(catalog, rules, state);
    Ok(match seed {
        Some(seed) => store.with_dice(Dice::from_seed(seed)),
        None => store,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub die: DieType,
    pub count: u32,
    pub attribute_value: Option<i32>,
    pub dc: Option<i32>,
    pub seed: u64,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self { die: DieType::D20, count: 1, attribute_value: None, dc: None, seed: DEFAULT_SEED }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RollReport {
    pub rolls: Vec<RollResult>,
    pub log: Vec<String>,
}

/// Seeded rolls outside any game state.
pub fn roll(cfg: &RollConfig) -> Result<RollReport> {
    let rules = Rules::builtin().context("parse built-in rules")?;
    let mut dice = Dice::from_seed(cfg.seed);
    let req = RollRequest { die: cfg.die, attribute_value: cfg.attribute_value, dc: cfg.dc };
    let label = cfg.die.to_string();
    let rolls: Vec<RollResult> = (0..cfg.count).map(|_| roll_dice(&mut dice, &req, &rules)).collect();
    let log = rolls.iter().map(|r| describe_roll(&label, r)).collect();
    Ok(RollReport { rolls, log })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewGameConfig {
    pub name: String,
    pub archetype: Archetype,
    pub backstory: String,
    pub attributes: Attributes,
    pub era: Option<EraId>,
    pub world: WorldConfigPatch,
    pub start_session: bool,
}

impl Default for NewGameConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            archetype: Archetype::ALL[0],
            backstory: String::new(),
            attributes: Attributes::default(),
            era: None,
            world: WorldConfigPatch::default(),
            start_session: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGameReport {
    pub events: Vec<GameEvent>,
    pub save: String,
}

/// Create a character on a fresh state and return the save blob.
pub fn new_game(cfg: NewGameConfig) -> Result<NewGameReport> {
    let (catalog, rules) = builtin()?;
    let mut store = ProgressionStore::new(catalog, rules);
    store.update_world_config(cfg.world);
    let draft = CharacterDraft {
        name: cfg.name,
        archetype: cfg.archetype,
        backstory: cfg.backstory,
        attributes: cfg.attributes,
    };
    let mut events = store.create_character(draft).context("create character")?;
    if let Some(era) = &cfg.era {
        if store.catalog().era(era).is_none() {
            bail!("unknown era `{era}`");
        }
        events.extend(store.unlock_era(era));
        events.extend(store.set_current_era(era));
    }
    if cfg.start_session {
        events.extend(store.start_session(None));
    }
    let save = persist::to_json(store.state()).context("serialize save")?;
    Ok(NewGameReport { events, save })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Save blob to play against; takes precedence over `save_path`.
    pub save_json: Option<String>,
    pub save_path: Option<String>,
    /// Encounter to play. When absent one is drawn for `location`.
    pub encounter_id: Option<String>,
    pub location: Option<String>,
    pub choice_id: String,
    pub seed: u64,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            save_json: None,
            save_path: None,
            encounter_id: None,
            location: None,
            choice_id: String::new(),
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayReport {
    pub encounter_id: String,
    pub roll: Option<RollResult>,
    pub narration: String,
    pub events: Vec<GameEvent>,
    pub next_encounter: Option<String>,
    pub log: Vec<String>,
    pub save: String,
}

pub fn load_state(save_json: Option<&str>, save_path: Option<&str>) -> Result<GameState> {
    match (save_json, save_path) {
        (Some(text), _) => persist::from_json(text).context("parse save blob"),
        (None, Some(path)) => persist::load_from_path(path),
        (None, None) => bail!("no save given: pass save_json or save_path"),
    }
}

/// Play one choice of one encounter: roll if the choice needs it, apply the
/// outcome and return the new save blob.
pub fn play_encounter(cfg: &PlayConfig) -> Result<PlayReport> {
    let state = load_state(cfg.save_json.as_deref(), cfg.save_path.as_deref())?;
    if state.character.is_none() {
        bail!("save has no character");
    }
    let mut store = open_store(state, Some(cfg.seed))?;

    let encounter = match &cfg.encounter_id {
        Some(id) => store
            .catalog()
            .encounter(id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown encounter `{id}`"))?,
        None => store
            .pick_encounter(cfg.location.as_deref())
            .ok_or_else(|| anyhow!("no encounter available here"))?,
    };

    let (record, mut events) = store
        .roll_for_choice(&encounter, &cfg.choice_id)
        .with_context(|| format!("roll for `{}`", cfg.choice_id))?;
    let roll = record.as_ref().map(|r| r.roll);
    let report = store
        .choose(&encounter, &cfg.choice_id, roll.as_ref())
        .with_context(|| format!("resolve `{}` in `{}`", cfg.choice_id, encounter.id))?;
    events.extend(report.events);
    let narration = report.outcome.narration.clone();
    events.extend(store.add_message(MessageKind::Narration, narration.clone(), Vec::new(), record));

    let log = store.take_transcript();
    let save = persist::to_json(store.state()).context("serialize save")?;
    Ok(PlayReport {
        encounter_id: encounter.id,
        roll,
        narration,
        events,
        next_encounter: report.next_encounter,
        log,
        save,
    })
}

pub fn parse_narration(text: &str) -> ParsedNarration {
    directive::parse_narration(text)
}

/// Catalog row as pretty JSON.
pub fn lookup_json(category: &str, key: &str) -> Result<String> {
    let category: Category = category.parse().map_err(|e: String| anyhow!(e))?;
    let catalog = Catalog::builtin().context("load built-in catalog")?;
    let entry = catalog.lookup(category, key)?;
    serde_json::to_string_pretty(&entry).context("serialize catalog entry")
}
