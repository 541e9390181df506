use serde::{Deserialize, Serialize};

use crate::content::{Difficulty, EraId, Genre, ToneId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Ja,
    Ko,
    Zh,
    Ru,
    Ar,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Self::En,
        Self::Es,
        Self::Fr,
        Self::De,
        Self::It,
        Self::Pt,
        Self::Ja,
        Self::Ko,
        Self::Zh,
        Self::Ru,
        Self::Ar,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Zh => "zh",
            Self::Ru => "ru",
            Self::Ar => "ar",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub haptic_enabled: bool,
    pub text_speed: TextSpeed,
    pub language: Language,
    pub has_seen_intro: bool,
    pub has_completed_onboarding: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptic_enabled: true,
            text_speed: TextSpeed::Normal,
            language: Language::En,
            has_seen_intro: false,
            has_completed_onboarding: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarratorPersonality {
    #[default]
    Dramatic,
    Mysterious,
    Friendly,
    Dark,
    Epic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub genre: Genre,
    pub era: EraId,
    pub tone: ToneId,
    pub difficulty: Difficulty,
    pub custom_themes: Vec<String>,
    pub world_name: Option<String>,
    pub world_description: Option<String>,
    pub main_conflict: Option<String>,
    pub ai_personality: NarratorPersonality,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            genre: Genre::Adventure,
            era: EraId::from("stranger_things"),
            tone: ToneId::from("balanced"),
            difficulty: Difficulty::Normal,
            custom_themes: Vec::new(),
            world_name: None,
            world_description: None,
            main_conflict: None,
            ai_personality: NarratorPersonality::Dramatic,
        }
    }
}

/// Partial update for [`WorldConfig`]; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfigPatch {
    pub genre: Option<Genre>,
    pub era: Option<EraId>,
    pub tone: Option<ToneId>,
    pub difficulty: Option<Difficulty>,
    pub custom_themes: Option<Vec<String>>,
    pub world_name: Option<String>,
    pub world_description: Option<String>,
    pub main_conflict: Option<String>,
    pub ai_personality: Option<NarratorPersonality>,
}

impl WorldConfig {
    pub fn apply(&mut self, patch: WorldConfigPatch) {
        if let Some(v) = patch.genre {
            self.genre = v;
        }
        if let Some(v) = patch.era {
            self.era = v;
        }
        if let Some(v) = patch.tone {
            self.tone = v;
        }
        if let Some(v) = patch.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = patch.custom_themes {
            self.custom_themes = v;
        }
        if patch.world_name.is_some() {
            self.world_name = patch.world_name;
        }
        if patch.world_description.is_some() {
            self.world_description = patch.world_description;
        }
        if patch.main_conflict.is_some() {
            self.main_conflict = patch.main_conflict;
        }
        if let Some(v) = patch.ai_personality {
            self.ai_personality = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_named_fields() {
        let mut cfg = WorldConfig::default();
        let patch: WorldConfigPatch =
            serde_json::from_str(r#"{"genre":"horror","world_name":"Hawkins"}"#).unwrap();
        cfg.apply(patch);
        assert_eq!(cfg.genre, Genre::Horror);
        assert_eq!(cfg.world_name.as_deref(), Some("Hawkins"));
        assert_eq!(cfg.tone.as_str(), "balanced");
        assert_eq!(cfg.difficulty, Difficulty::Normal);
    }
}
