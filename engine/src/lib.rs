use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod achievements;
pub mod api;
pub mod character;
pub mod checks;
pub mod clock;
pub mod content;
pub mod daily;
pub mod directive;
pub mod encounters;
pub mod enemies;
pub mod error;
pub mod events;
pub mod inventory;
pub mod journal;
pub mod life;
pub mod locations;
pub mod narrative;
pub mod npcs;
pub mod persist;
pub mod quests;
pub mod rules;
pub mod session;
pub mod settings;
pub mod skills;
pub mod state;
pub mod stats;
pub mod store;

pub use character::{Archetype, Attribute, Attributes, Character, CharacterDraft};
pub use checks::{attribute_modifier, roll_dice, DiceRoll, DieType, RollRequest, RollResult};
pub use content::{Catalog, Category, EraId, Genre, Difficulty, ToneId};
pub use directive::{parse_narration, DiceDirective, ParsedNarration};
pub use encounters::{resolve_choice, EffectBundle, Encounter, EncounterChoice, EncounterOutcome};
pub use error::{CatalogError, CreationError, PersistError, ResolveError};
pub use events::GameEvent;
pub use rules::Rules;
pub use state::GameState;
pub use store::ProgressionStore;

/// Source of every random draw in the engine.
///
/// Seeded dice are deterministic per seed. Scripted dice replay a fixed
/// sequence of faces, which tests use to force exact outcomes.
pub struct Dice {
    source: DiceSource,
}

enum DiceSource {
    Seeded(ChaCha8Rng),
    Scripted(VecDeque<u8>),
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: DiceSource::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self { source: DiceSource::Seeded(ChaCha8Rng::from_entropy()) }
    }

    /// Scripted faces are clamped into `1..=sides`; an exhausted script rolls 1.
    pub fn from_scripted(rolls: Vec<u8>) -> Self {
        Self { source: DiceSource::Scripted(rolls.into()) }
    }

    pub fn roll(&mut self, sides: u8) -> u8 {
        let sides = sides.max(1);
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_range(1..=sides),
            DiceSource::Scripted(queue) => queue.pop_front().unwrap_or(1).clamp(1, sides),
        }
    }

    /// Uniform index into a collection of `len` elements (`len > 0`).
    pub fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_range(0..len),
            // scripted faces are 1-based
            DiceSource::Scripted(queue) => {
                (queue.pop_front().unwrap_or(1).saturating_sub(1) as usize) % len
            }
        }
    }

    /// True with probability `p`. A scripted face of 1 counts as a hit.
    pub fn chance(&mut self, p: f64) -> bool {
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_bool(p.clamp(0.0, 1.0)),
            DiceSource::Scripted(queue) => queue.pop_front().unwrap_or(1) == 1,
        }
    }

    /// Uniform integer in `min..=max` (bounds are swapped if reversed).
    pub fn between(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_range(lo..=hi),
            DiceSource::Scripted(queue) => {
                let face = queue.pop_front().unwrap_or(1) as i64;
                (lo + face - 1).min(hi)
            }
        }
    }
}
