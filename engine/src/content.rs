use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    achievements::{Achievement, RULE_IDS},
    character::Archetype,
    encounters::{Encounter, EncounterOutcome},
    enemies::Enemy,
    error::CatalogError,
    locations::Location,
    npcs::Npc,
    quests::Quest,
    rules::Rules,
    settings::Language,
    skills::Skill,
};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

string_id!(
    /// Key into the era table. Checked against the catalog at load time.
    EraId
);
string_id!(
    /// Key into the tone table.
    ToneId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Fantasy,
    Scifi,
    Horror,
    Mystery,
    Adventure,
    PostApocalyptic,
    Superhero,
    Mythology,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Self::Fantasy,
        Self::Scifi,
        Self::Horror,
        Self::Mystery,
        Self::Adventure,
        Self::PostApocalyptic,
        Self::Superhero,
        Self::Mythology,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Story,
    Normal,
    Challenging,
    Hardcore,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Self::Story, Self::Normal, Self::Challenging, Self::Hardcore];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeInfo {
    pub name: String,
    pub title: String,
    pub strength: String,
    pub weakness: String,
    pub quest: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreInfo {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    #[serde(default)]
    pub themes: Vec<String>,
    /// Eras listed first when recommending a pairing. Any era may still be chosen.
    #[serde(default)]
    pub compatible_eras: Vec<EraId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub mood: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraInfo {
    pub name: String,
    pub year: String,
    pub tagline: String,
    pub description: String,
    pub atmosphere: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub native_name: String,
    pub flag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Archetype,
    Era,
    Genre,
    Tone,
    Difficulty,
    Language,
    Skill,
    Location,
    Npc,
    Achievement,
    Quest,
    Encounter,
    Enemy,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Self::Archetype,
        Self::Era,
        Self::Genre,
        Self::Tone,
        Self::Difficulty,
        Self::Language,
        Self::Skill,
        Self::Location,
        Self::Npc,
        Self::Achievement,
        Self::Quest,
        Self::Encounter,
        Self::Enemy,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Archetype => "archetype",
            Self::Era => "era",
            Self::Genre => "genre",
            Self::Tone => "tone",
            Self::Difficulty => "difficulty",
            Self::Language => "language",
            Self::Skill => "skill",
            Self::Location => "location",
            Self::Npc => "npc",
            Self::Achievement => "achievement",
            Self::Quest => "quest",
            Self::Encounter => "encounter",
            Self::Enemy => "enemy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown category `{s}`"))
    }
}

/// A borrowed catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry<'a> {
    Archetype(&'a ArchetypeInfo),
    Era(&'a EraInfo),
    Genre(&'a GenreInfo),
    Tone(&'a ToneInfo),
    Difficulty(&'a DifficultyInfo),
    Language(&'a LanguageInfo),
    Skill(&'a Skill),
    Location(&'a Location),
    Npc(&'a Npc),
    Achievement(&'a Achievement),
    Quest(&'a Quest),
    Encounter(&'a Encounter),
    Enemy(&'a Enemy),
}

/// Raw JSON for each table.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub archetypes: &'a str,
    pub eras: &'a str,
    pub genres: &'a str,
    pub tones: &'a str,
    pub difficulties: &'a str,
    pub languages: &'a str,
    pub skills: &'a str,
    pub locations: &'a str,
    pub npcs: &'a str,
    pub achievements: &'a str,
    pub quests: &'a str,
    pub encounters: &'a str,
    pub enemies: &'a str,
}

pub fn builtin_sources() -> Sources<'static> {
    Sources {
        archetypes: include_str!("../content/archetypes.json"),
        eras: include_str!("../content/eras.json"),
        genres: include_str!("../content/genres.json"),
        tones: include_str!("../content/tones.json"),
        difficulties: include_str!("../content/difficulties.json"),
        languages: include_str!("../content/languages.json"),
        skills: include_str!("../content/skills.json"),
        locations: include_str!("../content/locations.json"),
        npcs: include_str!("../content/npcs.json"),
        achievements: include_str!("../content/achievements.json"),
        quests: include_str!("../content/quests.json"),
        encounters: include_str!("../content/encounters.json"),
        enemies: include_str!("../content/enemies.json"),
    }
}

/// Static game content. Immutable once loaded; every cross-reference has been checked.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub archetypes: IndexMap<Archetype, ArchetypeInfo>,
    pub eras: IndexMap<EraId, EraInfo>,
    pub genres: IndexMap<Genre, GenreInfo>,
    pub tones: IndexMap<ToneId, ToneInfo>,
    pub difficulties: IndexMap<Difficulty, DifficultyInfo>,
    pub languages: IndexMap<Language, LanguageInfo>,
    pub skills: Vec<Skill>,
    pub locations: Vec<Location>,
    pub npcs: Vec<Npc>,
    pub achievements: Vec<Achievement>,
    pub quests: Vec<Quest>,
    pub encounters: Vec<Encounter>,
    pub enemies: Vec<Enemy>,
}

fn parse<T: DeserializeOwned>(table: &'static str, text: &str) -> Result<T, CatalogError> {
    serde_json::from_str(text).map_err(|source| CatalogError::Parse { table, source })
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_sources(builtin_sources())
    }

    pub fn from_sources(src: Sources<'_>) -> Result<Self, CatalogError> {
        let catalog = Self {
            archetypes: parse("archetypes", src.archetypes)?,
            eras: parse("eras", src.eras)?,
            genres: parse("genres", src.genres)?,
            tones: parse("tones", src.tones)?,
            difficulties: parse("difficulties", src.difficulties)?,
            languages: parse("languages", src.languages)?,
            skills: parse("skills", src.skills)?,
            locations: parse("locations", src.locations)?,
            npcs: parse("npcs", src.npcs)?,
            achievements: parse("achievements", src.achievements)?,
            quests: parse("quests", src.quests)?,
            encounters: parse("encounters", src.encounters)?,
            enemies: parse("enemies", src.enemies)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn lookup(&self, category: Category, key: &str) -> Result<Entry<'_>, CatalogError> {
        let found = match category {
            Category::Archetype => {
                enum_key::<Archetype>(key).and_then(|k| self.archetypes.get(&k)).map(Entry::Archetype)
            }
            Category::Era => self.eras.get(&EraId::from(key)).map(Entry::Era),
            Category::Genre => enum_key::<Genre>(key).and_then(|k| self.genres.get(&k)).map(Entry::Genre),
            Category::Tone => self.tones.get(&ToneId::from(key)).map(Entry::Tone),
            Category::Difficulty => enum_key::<Difficulty>(key)
                .and_then(|k| self.difficulties.get(&k))
                .map(Entry::Difficulty),
            Category::Language => {
                enum_key::<Language>(key).and_then(|k| self.languages.get(&k)).map(Entry::Language)
            }
            Category::Skill => self.skill(key).map(Entry::Skill),
            Category::Location => self.location(key).map(Entry::Location),
            Category::Npc => self.npc(key).map(Entry::Npc),
            Category::Achievement => self.achievement(key).map(Entry::Achievement),
            Category::Quest => self.quest(key).map(Entry::Quest),
            Category::Encounter => self.encounter(key).map(Entry::Encounter),
            Category::Enemy => self.enemy(key).map(Entry::Enemy),
        };
        found.ok_or_else(|| CatalogError::NotFound { category, key: key.to_string() })
    }

    pub fn era(&self, id: &EraId) -> Option<&EraInfo> {
        self.eras.get(id)
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn encounter(&self, id: &str) -> Option<&Encounter> {
        self.encounters.iter().find(|e| e.id == id)
    }

    pub fn enemy(&self, id: &str) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Eras in the order a genre recommends them: compatible ones first.
    pub fn eras_for_genre(&self, genre: Genre) -> Vec<&EraId> {
        let preferred: Vec<&EraId> = self
            .genres
            .get(&genre)
            .map(|g| g.compatible_eras.iter().collect())
            .unwrap_or_default();
        let rest = self.eras.keys().filter(|e| !preferred.contains(e));
        preferred.iter().copied().chain(rest).collect()
    }

    /// Checks that the rulebook only names content that exists.
    pub fn check_rules(&self, rules: &Rules) -> Result<(), CatalogError> {
        self.require_era("rules.starting", &rules.starting.era)
    }

    fn require_era(&self, from: &str, era: &EraId) -> Result<(), CatalogError> {
        if self.eras.contains_key(era) {
            Ok(())
        } else {
            Err(dangling(from, "era", era.as_str()))
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        require_all(Category::Archetype, &Archetype::ALL, &self.archetypes, |a| a.key().to_string())?;
        require_all(Category::Genre, &Genre::ALL, &self.genres, |g| variant_name(g))?;
        require_all(Category::Difficulty, &Difficulty::ALL, &self.difficulties, |d| variant_name(d))?;
        require_all(Category::Language, &Language::ALL, &self.languages, |l| l.key().to_string())?;

        for (genre, info) in &self.genres {
            for era in &info.compatible_eras {
                self.require_era(&format!("genre `{}`", variant_name(genre)), era)?;
            }
        }

        unique("skill", self.skills.iter().map(|s| s.id.as_str()))?;
        unique("location", self.locations.iter().map(|l| l.id.as_str()))?;
        unique("npc", self.npcs.iter().map(|n| n.id.as_str()))?;
        unique("achievement", self.achievements.iter().map(|a| a.id.as_str()))?;
        unique("quest", self.quests.iter().map(|q| q.id.as_str()))?;
        unique("encounter", self.encounters.iter().map(|e| e.id.as_str()))?;
        unique("enemy", self.enemies.iter().map(|e| e.id.as_str()))?;

        for skill in &self.skills {
            if let Some(pre) = &skill.prerequisite_id {
                if self.skill(pre).is_none() {
                    return Err(dangling(&format!("skill `{}`", skill.id), "skill", pre));
                }
            }
        }

        for loc in &self.locations {
            let from = format!("location `{}`", loc.id);
            self.require_era(&from, &loc.era)?;
            for next in &loc.connected_to {
                if self.location(next).is_none() {
                    return Err(dangling(&from, "location", next));
                }
            }
        }

        for npc in &self.npcs {
            if let Some(era) = &npc.era {
                self.require_era(&format!("npc `{}`", npc.id), era)?;
            }
        }

        for quest in &self.quests {
            let from = format!("quest `{}`", quest.id);
            unique("objective", quest.objectives.iter().map(|o| o.id.as_str()))?;
            for era in quest.era.iter().chain(quest.unlocks_era.iter()) {
                self.require_era(&from, era)?;
            }
            if let Some(ach) = &quest.completion_achievement {
                if self.achievement(ach).is_none() {
                    return Err(dangling(&from, "achievement", ach));
                }
            }
        }

        for enc in &self.encounters {
            self.validate_encounter(enc)?;
        }

        for enemy in &self.enemies {
            let from = format!("enemy `{}`", enemy.id);
            self.require_era(&from, &enemy.era)?;
            if enemy.loot_table.iter().any(|l| !(0.0..=1.0).contains(&l.chance)) {
                return Err(CatalogError::InvalidValue { from, problem: "loot chance outside 0..=1" });
            }
            if enemy.gold_reward.min > enemy.gold_reward.max {
                return Err(CatalogError::InvalidValue { from, problem: "gold range is reversed" });
            }
        }

        for id in RULE_IDS {
            if self.achievement(id).is_none() {
                return Err(dangling("achievement rules", "achievement", id));
            }
        }
        Ok(())
    }

    fn validate_encounter(&self, enc: &Encounter) -> Result<(), CatalogError> {
        let from = format!("encounter `{}`", enc.id);
        self.require_era(&from, &enc.era)?;
        if let Some(loc) = &enc.location {
            if self.location(loc).is_none() {
                return Err(dangling(&from, "location", loc));
            }
        }
        let cond = &enc.conditions;
        if let Some(q) = &cond.required_quest {
            if self.quest(q).is_none() {
                return Err(dangling(&from, "quest", q));
            }
        }
        if let Some(n) = &cond.required_npc_met {
            if self.npc(n).is_none() {
                return Err(dangling(&from, "npc", n));
            }
        }
        if let (Some(min), Some(max)) = (cond.min_level, cond.max_level) {
            if min > max {
                return Err(CatalogError::InvalidValue { from, problem: "min_level above max_level" });
            }
        }
        if enc.choices.is_empty() {
            return Err(CatalogError::InvalidValue { from, problem: "encounter has no choices" });
        }
        unique("choice", enc.choices.iter().map(|c| c.id.as_str()))?;

        for choice in &enc.choices {
            let malformed = |problem: &'static str| CatalogError::MalformedChoice {
                encounter: enc.id.clone(),
                choice: choice.id.clone(),
                problem,
            };
            let c = &choice.consequences;
            if choice.needs_roll() {
                if c.success.is_none() || c.failure.is_none() {
                    return Err(malformed("checked choice needs success and failure outcomes"));
                }
            } else if c.default.is_none() {
                return Err(malformed("unchecked choice needs a default outcome"));
            }
            if choice.required_skill.is_some() && choice.required_attribute.is_some() {
                return Err(malformed("choice names both a skill and an attribute"));
            }
            if let Some(skill) = &choice.required_skill {
                if self.skill(skill).is_none() {
                    return Err(dangling(&from, "skill", skill));
                }
            }
            for outcome in [&c.success, &c.failure, &c.default].into_iter().flatten() {
                self.validate_outcome(&from, outcome)?;
            }
        }
        Ok(())
    }

    fn validate_outcome(&self, from: &str, outcome: &EncounterOutcome) -> Result<(), CatalogError> {
        for rel in &outcome.relationship_changes {
            if self.npc(&rel.npc_id).is_none() {
                return Err(dangling(from, "npc", &rel.npc_id));
            }
        }
        if let Some(progress) = &outcome.quest_progress {
            let quest = self
                .quest(&progress.quest_id)
                .ok_or_else(|| dangling(from, "quest", &progress.quest_id))?;
            if quest.objective(&progress.objective_id).is_none() {
                return Err(dangling(from, "objective", &progress.objective_id));
            }
        }
        if let Some(loc) = &outcome.unlock_location {
            if self.location(loc).is_none() {
                return Err(dangling(from, "location", loc));
            }
        }
        if let Some(next) = &outcome.trigger_encounter {
            if self.encounter(next).is_none() {
                return Err(dangling(from, "encounter", next));
            }
        }
        Ok(())
    }
}

fn dangling(from: &str, kind: &'static str, target: &str) -> CatalogError {
    CatalogError::DanglingReference { from: from.to_string(), kind, target: target.to_string() }
}

fn unique<'a>(table: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId { table, id: id.to_string() });
        }
    }
    Ok(())
}

fn require_all<K: Eq + std::hash::Hash, V>(
    category: Category,
    all: &[K],
    table: &IndexMap<K, V>,
    name: impl Fn(&K) -> String,
) -> Result<(), CatalogError> {
    match all.iter().find(|k| !table.contains_key(*k)) {
        Some(missing) => Err(CatalogError::MissingEntry { category, key: name(missing) }),
        None => Ok(()),
    }
}

/// The serde name of a unit variant.
fn variant_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn enum_key<T: DeserializeOwned>(key: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(key.trim().to_ascii_lowercase())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let c = Catalog::builtin().unwrap();
        assert_eq!(c.archetypes.len(), 6);
        assert_eq!(c.genres.len(), 8);
        assert_eq!(c.difficulties.len(), 4);
        assert_eq!(c.languages.len(), 11);
        assert!(c.eras.len() > 200);
        assert_eq!(c.skills.len(), 14);
        assert_eq!(c.achievements.len(), 100);
        c.check_rules(&Rules::default()).unwrap();
    }

    #[test]
    fn lookup_hits_and_misses() {
        let c = Catalog::builtin().unwrap();
        assert!(matches!(c.lookup(Category::Archetype, "Seeker"), Ok(Entry::Archetype(_))));
        assert!(matches!(c.lookup(Category::Era, "stranger_things"), Ok(Entry::Era(_))));
        assert!(matches!(c.lookup(Category::Genre, "post_apocalyptic"), Ok(Entry::Genre(_))));
        assert!(matches!(
            c.lookup(Category::Tone, "nope"),
            Err(CatalogError::NotFound { category: Category::Tone, .. })
        ));
    }

    #[test]
    fn genre_recommendations_lead_with_compatible_eras() {
        let c = Catalog::builtin().unwrap();
        let eras = c.eras_for_genre(Genre::Fantasy);
        assert_eq!(eras[0].as_str(), "medieval");
        assert_eq!(eras.len(), c.eras.len());
    }
}
