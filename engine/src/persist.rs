use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::PersistError, state::GameState};

pub const STORAGE_KEY: &str = "talecraft-storage";
pub const CURRENT_VERSION: u32 = 1;

/// Versioned envelope around the persisted [`GameState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub key: String,
    pub version: u32,
    pub state: GameState,
}

impl SaveFile {
    pub fn new(state: GameState) -> Self {
        Self { key: STORAGE_KEY.to_string(), version: CURRENT_VERSION, state }
    }
}

type Migration = fn(Value) -> Result<Value, PersistError>;

/// `MIGRATIONS[n]` upgrades a version `n` document to version `n + 1`.
const MIGRATIONS: [Migration; CURRENT_VERSION as usize] = [v0_to_v1];

// Top-level keys whose snake_case form still differs from the current field.
const RENAMED_KEYS: &[(&str, &str)] = &[("world_config", "world")];

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rewrite every camelCase object key at any depth. A key already present in
/// snake_case wins over its camelCase twin.
fn snake_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let (legacy, current): (Vec<_>, Vec<_>) =
                map.into_iter().partition(|(k, _)| k.bytes().any(|b| b.is_ascii_uppercase()));
            let mut out = Map::new();
            for (k, v) in current {
                out.insert(k, snake_keys(v));
            }
            for (k, v) in legacy {
                out.entry(snake_case(&k)).or_insert_with(|| snake_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(snake_keys).collect()),
        other => other,
    }
}

/// Version 0 is the state as older clients wrote it: camelCase keys
/// throughout, either bare or inside a `{"version":0,"state":..}` envelope.
fn v0_to_v1(doc: Value) -> Result<Value, PersistError> {
    let Value::Object(mut doc) = doc else {
        return Err(PersistError::Shape("version 0 state must be a JSON object"));
    };
    let (key, state) = match doc.remove("state") {
        Some(Value::Object(inner)) => (doc.remove("key"), inner),
        Some(_) => return Err(PersistError::Shape("envelope `state` must be a JSON object")),
        None => (None, doc),
    };
    let Value::Object(mut state) = snake_keys(Value::Object(state)) else {
        return Err(PersistError::Shape("version 0 state must be a JSON object"));
    };
    for (old, new) in RENAMED_KEYS {
        if let Some(v) = state.remove(*old) {
            state.entry(*new).or_insert(v);
        }
    }
    let mut envelope = Map::new();
    envelope.insert("key".into(), key.unwrap_or_else(|| Value::from(STORAGE_KEY)));
    envelope.insert("version".into(), Value::from(1u32));
    envelope.insert("state".into(), Value::Object(state));
    Ok(Value::Object(envelope))
}

fn version_of(doc: &Value) -> Result<u32, PersistError> {
    match doc.get("version") {
        // A bare state never carries an envelope's `state` field.
        None if doc.get("state").is_none() => Ok(0),
        None => Err(PersistError::Shape("envelope is missing `version`")),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(PersistError::Shape("`version` must be a non-negative integer")),
    }
}

pub fn to_json(state: &GameState) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&SaveFile::new(state.clone()))?)
}

/// Parse a save blob of any known version, migrating it forward.
pub fn from_json(text: &str) -> Result<GameState, PersistError> {
    let mut doc: Value = serde_json::from_str(text)?;
    if !doc.is_object() {
        return Err(PersistError::Shape("save blob must be a JSON object"));
    }
    let mut version = version_of(&doc)?;
    if version > CURRENT_VERSION {
        return Err(PersistError::UnsupportedVersion { found: version, supported: CURRENT_VERSION });
    }
    while version < CURRENT_VERSION {
        doc = MIGRATIONS[version as usize](doc)?;
        version += 1;
    }
    let save: SaveFile = serde_json::from_value(doc)?;
    if save.key != STORAGE_KEY {
        return Err(PersistError::WrongKey { found: save.key, expected: STORAGE_KEY });
    }
    Ok(save.state)
}

pub fn save_to_path(state: &GameState, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text = to_json(state)?;
    fs::write(path, text).with_context(|| format!("write save file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved game");
    Ok(())
}

pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<GameState> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read save file {}", path.display()))?;
    from_json(&text).with_context(|| format!("parse save file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_state_migrates_and_renames_legacy_keys() {
        let blob = r#"{"unlockedEras":["medieval"],"playerStats":{"diceRolled":7},"worldConfig":{"worldName":"Hawkins"}}"#;
        let state = from_json(blob).unwrap();
        assert_eq!(state.unlocked_eras, vec![crate::content::EraId::from("medieval")]);
        assert_eq!(state.player_stats.dice_rolled, 7);
        assert_eq!(state.world.world_name.as_deref(), Some("Hawkins"));
    }

    #[test]
    fn snake_case_key_beats_its_camel_twin() {
        let doc = snake_keys(serde_json::json!({"maxHealth": 1, "max_health": 2, "items": [{"xpCurrent": 3}]}));
        assert_eq!(doc, serde_json::json!({"max_health": 2, "items": [{"xp_current": 3}]}));
    }

    #[test]
    fn version_zero_envelope_with_scalar_state_is_rejected() {
        let blob = r#"{"version":0,"state":"nope"}"#;
        assert!(matches!(from_json(blob), Err(PersistError::Shape(_))));
    }

    #[test]
    fn future_version_is_rejected() {
        let blob = r#"{"key":"talecraft-storage","version":9,"state":{}}"#;
        assert!(matches!(
            from_json(blob),
            Err(PersistError::UnsupportedVersion { found: 9, supported: 1 })
        ));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let blob = r#"{"key":"other-app","version":1,"state":{}}"#;
        assert!(matches!(from_json(blob), Err(PersistError::WrongKey { .. })));
    }

    #[test]
    fn non_object_is_a_shape_error() {
        assert!(matches!(from_json("[1,2]"), Err(PersistError::Shape(_))));
    }
}
