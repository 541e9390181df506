use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Serialize;
use serde_json::json;
use talecraft_engine::api::{self, NewGameConfig, PlayConfig, RollConfig};

pub const VERSION: &str = concat!("talecraft-ffi ", env!("CARGO_PKG_VERSION"));

/// `{"ok":true,"result":..}` or `{"ok":false,"error":".."}`.
fn envelope<T: Serialize>(result: anyhow::Result<T>) -> String {
    let payload = match result.and_then(|v| Ok(serde_json::to_value(v)?)) {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": format!("{e:#}") }),
    };
    payload.to_string()
}

fn parse<T: serde::de::DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    serde_json::from_str(input).map_err(|e| anyhow::anyhow!("invalid_config: {e}"))
}

// Internal functions for testing without JNI overhead

pub fn roll_internal(input: &str) -> String {
    envelope(parse::<RollConfig>(input).and_then(|cfg| api::roll(&cfg)))
}

pub fn parse_narration_internal(text: &str) -> String {
    envelope(Ok(api::parse_narration(text)))
}

pub fn new_game_internal(input: &str) -> String {
    envelope(parse::<NewGameConfig>(input).and_then(api::new_game))
}

pub fn play_encounter_internal(input: &str) -> String {
    envelope(parse::<PlayConfig>(input).and_then(|cfg| api::play_encounter(&cfg)))
}

pub fn lookup_internal(category: &str, key: &str) -> String {
    envelope(api::lookup_json(category, key).and_then(|text| Ok(serde_json::from_str::<serde_json::Value>(&text)?)))
}

fn to_java(env: &JNIEnv, text: String) -> jstring {
    match env.new_string(text) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn with_input(mut env: JNIEnv, input: JString, f: impl FnOnce(&str) -> String) -> jstring {
    let text = match env.get_string(&input) {
        Ok(s) => f(&String::from(s)),
        Err(e) => envelope::<()>(Err(anyhow::anyhow!("invalid_string: {e}"))),
    };
    to_java(&env, text)
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    to_java(&env, VERSION.to_string())
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_rollJson(env: JNIEnv, _class: JClass, json: JString) -> jstring {
    with_input(env, json, roll_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_parseNarrationJson(
    env: JNIEnv,
    _class: JClass,
    text: JString,
) -> jstring {
    with_input(env, text, parse_narration_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_newGameJson(env: JNIEnv, _class: JClass, json: JString) -> jstring {
    with_input(env, json, new_game_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_playEncounterJson(
    env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(env, json, play_encounter_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_talecraft_Ffi_lookupJson(
    mut env: JNIEnv,
    _class: JClass,
    category: JString,
    key: JString,
) -> jstring {
    let args = env
        .get_string(&category)
        .map(String::from)
        .and_then(|c| env.get_string(&key).map(|k| (c, String::from(k))));
    let text = match args {
        Ok((c, k)) => lookup_internal(&c, &k),
        Err(e) => envelope::<()>(Err(anyhow::anyhow!("invalid_string: {e}"))),
    };
    to_java(&env, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn decode(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn roll_is_deterministic() {
        let a = roll_internal(r#"{"seed":42,"count":3,"die":"d6"}"#);
        let b = roll_internal(r#"{"seed":42,"count":3,"die":"d6"}"#);
        assert_eq!(a, b);
        let v = decode(&a);
        assert_eq!(v["ok"], true);
        assert_eq!(v["result"]["rolls"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn bad_config_is_reported() {
        let v = decode(&roll_internal("not json"));
        assert_eq!(v["ok"], false);
        assert!(v["error"].as_str().unwrap().starts_with("invalid_config"));
    }

    #[test]
    fn narration_directive_surfaces() {
        let v = decode(&parse_narration_internal("Listen.\n[DICE_CHECK: wisdom DC:14]"));
        assert_eq!(v["result"]["directive"]["attribute"], "wisdom");
        assert_eq!(v["result"]["directive"]["dc"], 14);
        assert_eq!(v["result"]["text"], "Listen.");
    }

    #[test]
    fn new_game_then_play() {
        let v = decode(&new_game_internal(r#"{"name":"Max"}"#));
        assert_eq!(v["ok"], true);
        let save = v["result"]["save"].as_str().unwrap().to_string();
        let play = json!({
            "save_json": save,
            "encounter_id": "st_flickering_lights",
            "choice_id": "run_home",
        });
        let v = decode(&play_encounter_internal(&play.to_string()));
        assert_eq!(v["ok"], true, "{v}");
        assert!(v["result"]["roll"].is_null());
    }

    #[test]
    fn lookup_returns_catalog_row() {
        let v = decode(&lookup_internal("era", "medieval"));
        assert_eq!(v["ok"], true);
        assert!(v["result"]["name"].is_string());
    }
}
