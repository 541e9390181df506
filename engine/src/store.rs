use std::{collections::VecDeque, sync::Arc};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    achievements::{self, HIGH_DC},
    character::{level_for_experience, Attribute, CharacterDraft},
    checks::{describe_roll, roll_dice, roll_with_modifier, DiceRoll, DieType, RollRequest, RollResult},
    clock::{Clock, SystemClock},
    content::{Catalog, EraId},
    daily::{self, DailyChallenge},
    encounters::{self, resolve_choice, EffectBundle, Encounter, EncounterOutcome, TimeOfDay},
    error::{CreationError, ResolveError},
    events::GameEvent,
    inventory::{Item, ItemEffect, ItemType},
    journal::JournalDraft,
    life::{apply_energy_delta, apply_health_delta, DefeatHandler, IgnoreDefeat},
    npcs::Npc,
    quests::{Quest, QuestStatus},
    rules::Rules,
    session::{word_count, GameSession, MessageKind, StoryMessage},
    settings::{Settings, WorldConfigPatch},
    state::GameState,
    stats::Stat,
    Dice,
};

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Result of playing one encounter choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceReport {
    pub outcome: EncounterOutcome,
    pub events: Vec<GameEvent>,
    /// Encounter to chain into next, if the outcome names one.
    pub next_encounter: Option<String>,
}

/// Owns the game state and every mutation of it.
///
/// Each mutator returns the events it caused, including follow-ups such as
/// achievement unlocks and daily-challenge progress. A mutator whose
/// precondition does not hold changes nothing and returns no events.
pub struct ProgressionStore {
    state: GameState,
    catalog: Arc<Catalog>,
    rules: Rules,
    dice: Dice,
    clock: Box<dyn Clock>,
    defeat: Box<dyn DefeatHandler>,
    transcript: Vec<String>,
}

impl ProgressionStore {
    pub fn new(catalog: Arc<Catalog>, rules: Rules) -> Self {
        let state = GameState::seeded(&catalog, &rules);
        Self::from_state(catalog, rules, state)
    }

    pub fn from_state(catalog: Arc<Catalog>, rules: Rules, state: GameState) -> Self {
        Self {
            state,
            catalog,
            rules,
            dice: Dice::from_entropy(),
            clock: Box::new(SystemClock),
            defeat: Box::new(IgnoreDefeat),
            transcript: Vec::new(),
        }
    }

    pub fn with_dice(mut self, dice: Dice) -> Self {
        self.dice = dice;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_defeat_handler(mut self, handler: impl DefeatHandler + 'static) -> Self {
        self.defeat = Box::new(handler);
        self
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn set_dice(&mut self, dice: Dice) {
        self.dice = dice;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.state.settings
    }

    /// Bracket-tagged log lines gathered since the last call.
    pub fn take_transcript(&mut self) -> Vec<String> {
        std::mem::take(&mut self.transcript)
    }

    // ---- character & eras ---------------------------------------------------

    pub fn create_character(&mut self, draft: CharacterDraft) -> Result<Vec<GameEvent>, CreationError> {
        let character = draft.build(new_id("char"), self.clock.now(), &self.rules)?;
        tracing::info!(id = %character.id, name = %character.name, "character created");
        let id = character.id.clone();
        self.state.character = Some(character);
        Ok(self.settle(vec![GameEvent::CharacterCreated { id }]))
    }

    /// Drop the character and the running session.
    pub fn clear_character(&mut self) -> Vec<GameEvent> {
        if self.state.character.take().is_none() {
            tracing::debug!("clear_character: no character");
            return Vec::new();
        }
        self.state.current_session = None;
        self.settle(vec![GameEvent::CharacterCleared])
    }

    pub fn update_world_config(&mut self, patch: WorldConfigPatch) {
        self.state.world.apply(patch);
    }

    pub fn set_current_era(&mut self, era: &EraId) -> Vec<GameEvent> {
        if self.catalog.era(era).is_none() {
            tracing::debug!(%era, "set_current_era: unknown era");
            return Vec::new();
        }
        let Some(character) = self.state.character.as_mut() else {
            tracing::debug!("set_current_era: no character");
            return Vec::new();
        };
        if &character.current_era == era {
            return Vec::new();
        }
        character.current_era = era.clone();
        self.settle(vec![GameEvent::EraChanged { era: era.clone() }])
    }

    pub fn unlock_era(&mut self, era: &EraId) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.unlock_era_inner(era, &mut ev);
        self.settle(ev)
    }

    fn unlock_era_inner(&mut self, era: &EraId, ev: &mut Vec<GameEvent>) {
        if self.catalog.era(era).is_none() {
            tracing::debug!(%era, "unlock_era: unknown era");
            return;
        }
        if self.state.unlocked_eras.contains(era) {
            return;
        }
        self.state.unlocked_eras.push(era.clone());
        tracing::info!(%era, "era unlocked");
        ev.push(GameEvent::EraUnlocked { era: era.clone() });
    }

    // ---- dice ---------------------------------------------------------------

    /// Roll, record the roll in history and stats, and return it.
    ///
    /// The attribute modifier comes from the current character; with no
    /// character the roll is unmodified.
    pub fn roll_dice_and_record(
        &mut self,
        die: DieType,
        attribute: Option<Attribute>,
        dc: Option<i32>,
    ) -> (DiceRoll, Vec<GameEvent>) {
        let attribute_value = attribute
            .zip(self.state.character.as_ref())
            .map(|(a, c)| c.attributes.get(a));
        let req = RollRequest { die, attribute_value, dc };
        let result = roll_dice(&mut self.dice, &req, &self.rules);
        let mut ev = Vec::new();
        let label = attribute.map_or_else(|| die.to_string(), |a| a.to_string());
        let record = self.record_roll(result, attribute, &label, &mut ev);
        (record, self.settle(ev))
    }

    /// Roll the d20 check a choice asks for.
    ///
    /// Attribute checks use the attribute modifier; skill checks add the
    /// skill's current level. Returns `Ok(None)` for choices without a check.
    pub fn roll_for_choice(
        &mut self,
        encounter: &Encounter,
        choice_id: &str,
    ) -> Result<(Option<DiceRoll>, Vec<GameEvent>), ResolveError> {
        let choice = encounter.choice(choice_id).ok_or_else(|| ResolveError::UnknownChoice {
            encounter: encounter.id.clone(),
            choice: choice_id.to_string(),
        })?;
        let Some(dc) = choice.difficulty_check else {
            return Ok((None, Vec::new()));
        };
        let character = self.state.character.as_ref();
        let (result, label) = match (&choice.required_skill, choice.required_attribute) {
            (Some(skill), _) => {
                let level = self
                    .state
                    .skill(skill)
                    .filter(|s| s.unlocked)
                    .map_or(0, |s| s.current_level as i32);
                (roll_with_modifier(&mut self.dice, DieType::D20, level, Some(dc)), skill.clone())
            }
            (None, Some(attr)) => {
                let req = RollRequest {
                    die: DieType::D20,
                    attribute_value: character.map(|c| c.attributes.get(attr)),
                    dc: Some(dc),
                };
                (roll_dice(&mut self.dice, &req, &self.rules), attr.to_string())
            }
            (None, None) => (roll_with_modifier(&mut self.dice, DieType::D20, 0, Some(dc)), "d20".into()),
        };
        self.transcript.push(format!("[CHECK][{}] {} DC {}", encounter.id, choice.id, dc));
        let mut ev = Vec::new();
        let record = self.record_roll(result, choice.required_attribute, &label, &mut ev);
        Ok((Some(record), self.settle(ev)))
    }

    fn record_roll(
        &mut self,
        roll: RollResult,
        attribute: Option<Attribute>,
        label: &str,
        ev: &mut Vec<GameEvent>,
    ) -> DiceRoll {
        self.transcript.push(describe_roll(label, &roll));
        let record = DiceRoll { id: new_id("roll"), attribute, timestamp: self.clock.now(), roll };
        self.state.dice_history.insert(0, record.clone());
        self.state.dice_history.truncate(self.rules.dice_history_cap);

        let stats = &mut self.state.player_stats;
        stats.increment(Stat::DiceRolled, 1);
        if roll.is_critical_success() {
            stats.increment(Stat::CriticalSuccesses, 1);
        }
        if roll.is_critical_failure() {
            stats.increment(Stat::CriticalFailures, 1);
        }
        if roll.success == Some(true) && roll.dc.is_some_and(|dc| dc >= HIGH_DC) {
            stats.increment(Stat::HighDcSuccesses, 1);
        }
        if let Some(session) = self.state.current_session.as_mut() {
            session.rolls += 1;
            if roll.success == Some(false) {
                session.failed_rolls += 1;
            }
            if roll.is_critical_success() {
                session.natural_twenties += 1;
            }
        }
        ev.push(GameEvent::DiceRolled { roll });
        record
    }

    // ---- encounters ---------------------------------------------------------

    /// Resolve a choice, count it, and apply its outcome.
    pub fn choose(
        &mut self,
        encounter: &Encounter,
        choice_id: &str,
        roll: Option<&RollResult>,
    ) -> Result<ChoiceReport, ResolveError> {
        let outcome = resolve_choice(encounter, choice_id, roll)?.clone();
        let branch = match roll.and_then(|r| r.success) {
            _ if encounter.choice(choice_id).is_some_and(|c| !c.needs_roll()) => "default",
            Some(true) => "success",
            _ => "failure",
        };
        self.transcript.push(format!("[OUTCOME][{}] {} → {}", encounter.id, choice_id, branch));
        let mut ev = Vec::new();
        self.state.player_stats.increment(Stat::ChoicesMade, 1);
        ev.push(GameEvent::ChoiceMade {
            encounter_id: encounter.id.clone(),
            choice_id: choice_id.to_string(),
        });
        self.apply_bundle_inner(&outcome, &mut ev);
        let next_encounter = outcome.trigger_encounter.clone();
        Ok(ChoiceReport { outcome, events: self.settle(ev), next_encounter })
    }

    /// A random encounter for the character's era, level and the given location,
    /// honoring quest, item and NPC requirements. `None` when nothing fits.
    pub fn pick_encounter(&mut self, location: Option<&str>) -> Option<Encounter> {
        let level = self.state.character.as_ref().map_or(1, |c| c.level);
        let era = self.state.current_era().clone();
        let hour = self.clock.local_hour();
        let state = &self.state;
        let pool: Vec<&Encounter> = encounters::eligible(&self.catalog.encounters, &era, location, level)
            .into_iter()
            .filter(|e| {
                let c = &e.conditions;
                let quest_ok = c.required_quest.as_ref().is_none_or(|q| {
                    state.quest(q).is_some_and(|q| q.status != QuestStatus::Failed)
                });
                let item_ok = c.required_item.as_ref().is_none_or(|i| state.inventory.contains(i));
                let npc_ok = c
                    .required_npc_met
                    .as_ref()
                    .is_none_or(|n| state.npc(n).is_some_and(|n| n.met));
                let time_ok = c.time_of_day.is_none_or(|t| {
                    let day = (6..18).contains(&hour);
                    (t == TimeOfDay::Day) == day
                });
                quest_ok && item_ok && npc_ok && time_ok
            })
            .collect();
        if pool.is_empty() {
            tracing::debug!(%era, ?location, level, "no eligible encounter");
            return None;
        }
        Some(pool[self.dice.pick(pool.len())].clone())
    }

    /// Apply every populated field of an outcome. No-op without a character.
    pub fn apply_effect_bundle(&mut self, bundle: &EffectBundle) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.apply_bundle_inner(bundle, &mut ev);
        self.settle(ev)
    }

    fn apply_bundle_inner(&mut self, bundle: &EffectBundle, ev: &mut Vec<GameEvent>) {
        if self.state.character.is_none() {
            tracing::debug!("apply_effect_bundle: no character");
            return;
        }
        if let Some(delta) = bundle.health_change {
            self.change_health(delta as i64, ev);
        }
        if let Some(delta) = bundle.energy_change {
            self.change_energy(delta as i64, ev);
        }
        if let Some(delta) = bundle.gold_change {
            self.change_gold(delta, ev);
        }
        if let Some(xp) = bundle.experience_gain {
            self.gain_experience(xp, ev);
        }
        for grant in &bundle.items_gained {
            self.add_item_inner(grant.to_item(), ev);
        }
        for id in &bundle.items_lost {
            self.remove_item_inner(id, 1, ev);
        }
        for rel in &bundle.relationship_changes {
            self.change_relationship(&rel.npc_id, rel.change as i64, ev);
        }
        if let Some(progress) = &bundle.quest_progress {
            self.set_objective(&progress.quest_id, &progress.objective_id, true, ev);
        }
        if let Some(loc) = &bundle.unlock_location {
            self.discover_location_inner(loc, ev);
        }
        if let Some(draft) = &bundle.add_journal_entry {
            self.add_journal_inner(draft.clone(), ev);
        }
    }

    fn change_health(&mut self, delta: i64, ev: &mut Vec<GameEvent>) {
        let transcript = &mut self.transcript;
        let Some(character) = self.state.character.as_mut() else {
            return;
        };
        let change = apply_health_delta(character, delta, |l| transcript.push(format!("[EFFECT]{l}")));
        ev.push(GameEvent::HealthChanged {
            before: change.before,
            after: change.after,
            max: character.max_health,
        });
        if change.dropped {
            tracing::info!(id = %character.id, "character defeated");
            self.defeat.on_defeat(character);
            ev.push(GameEvent::CharacterDefeated { id: character.id.clone() });
        }
    }

    fn change_energy(&mut self, delta: i64, ev: &mut Vec<GameEvent>) {
        let transcript = &mut self.transcript;
        let Some(character) = self.state.character.as_mut() else {
            return;
        };
        let change = apply_energy_delta(character, delta, |l| transcript.push(format!("[EFFECT]{l}")));
        ev.push(GameEvent::EnergyChanged {
            before: change.before,
            after: change.after,
            max: character.max_energy,
        });
    }

    // Gold has no floor.
    fn change_gold(&mut self, delta: i64, ev: &mut Vec<GameEvent>) {
        let Some(character) = self.state.character.as_mut() else {
            return;
        };
        let before = character.gold;
        character.gold = before.saturating_add(delta);
        self.transcript.push(format!("[EFFECT][GOLD] {} → {}", before, character.gold));
        ev.push(GameEvent::GoldChanged { before, after: character.gold });
    }

    fn gain_experience(&mut self, amount: i64, ev: &mut Vec<GameEvent>) {
        let per_level = self.rules.xp_per_level;
        let Some(character) = self.state.character.as_mut() else {
            return;
        };
        character.experience = character.experience.saturating_add(amount);
        let from = character.level;
        character.level = level_for_experience(character.experience, per_level);
        self.transcript.push(format!("[EFFECT][XP] {:+} (total {})", amount, character.experience));
        ev.push(GameEvent::ExperienceGained { amount, total: character.experience });
        if character.level != from {
            tracing::info!(from, to = character.level, "level changed");
            ev.push(GameEvent::LevelChanged { from, to: character.level });
        }
    }

    // ---- inventory ----------------------------------------------------------

    pub fn add_item(&mut self, item: Item) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.add_item_inner(item, &mut ev);
        self.settle(ev)
    }

    fn add_item_inner(&mut self, item: Item, ev: &mut Vec<GameEvent>) {
        if item.quantity == 0 {
            tracing::debug!(id = %item.id, "add_item: zero quantity");
            return;
        }
        self.state.player_stats.increment(Stat::ItemsCollected, item.quantity as u64);
        self.transcript.push(format!("[EFFECT][ITEM] +{} {}", item.quantity, item.name));
        ev.push(GameEvent::ItemAdded {
            id: item.id.clone(),
            kind: item.kind,
            rarity: item.rarity,
            quantity: item.quantity,
        });
        self.state.inventory.add(item);
    }

    pub fn remove_item(&mut self, id: &str, quantity: u32) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.remove_item_inner(id, quantity, &mut ev);
        self.settle(ev)
    }

    fn remove_item_inner(&mut self, id: &str, quantity: u32, ev: &mut Vec<GameEvent>) {
        let removed = self.state.inventory.remove(id, quantity);
        if removed == 0 {
            tracing::debug!(id, "remove_item: not held");
            return;
        }
        self.transcript.push(format!("[EFFECT][ITEM] -{removed} {id}"));
        ev.push(GameEvent::ItemRemoved { id: id.to_string(), quantity: removed });
    }

    /// Consume one unit of a consumable. Heal and energy effects restore
    /// `Rules::consumable_restore`. Other item types are left alone.
    pub fn use_item(&mut self, id: &str) -> Vec<GameEvent> {
        let Some(item) = self.state.inventory.get(id) else {
            tracing::debug!(id, "use_item: not held");
            return Vec::new();
        };
        if item.kind != ItemType::Consumable || self.state.character.is_none() {
            tracing::debug!(id, "use_item: not usable");
            return Vec::new();
        }
        let effect = item.effect;
        let restore = self.rules.consumable_restore as i64;
        let mut ev = vec![GameEvent::ItemUsed { id: id.to_string() }];
        match effect {
            Some(ItemEffect::Heal) => self.change_health(restore, &mut ev),
            Some(ItemEffect::Energy) => self.change_energy(restore, &mut ev),
            None => {}
        }
        self.remove_item_inner(id, 1, &mut ev);
        self.settle(ev)
    }

    // ---- quests -------------------------------------------------------------

    pub fn add_quest(&mut self, quest: Quest) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.add_quest_inner(quest, &mut ev);
        self.settle(ev)
    }

    fn add_quest_inner(&mut self, mut quest: Quest, ev: &mut Vec<GameEvent>) {
        if self.state.quest(&quest.id).is_some() {
            tracing::debug!(id = %quest.id, "add_quest: already in log");
            return;
        }
        quest.started_at.get_or_insert_with(|| self.clock.now());
        ev.push(GameEvent::QuestAdded { id: quest.id.clone() });
        self.state.quests.push(quest);
    }

    /// Set one objective's flag on an active quest. Never completes the quest.
    pub fn update_quest_objective(&mut self, quest_id: &str, objective_id: &str, completed: bool) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.set_objective(quest_id, objective_id, completed, &mut ev);
        self.settle(ev)
    }

    fn set_objective(&mut self, quest_id: &str, objective_id: &str, completed: bool, ev: &mut Vec<GameEvent>) {
        let Some(quest) = self.state.quests.iter_mut().find(|q| q.id == quest_id) else {
            tracing::debug!(quest_id, "update_quest_objective: unknown quest");
            return;
        };
        if quest.status.is_terminal() {
            tracing::debug!(quest_id, "update_quest_objective: quest is closed");
            return;
        }
        match quest.set_objective(objective_id, completed) {
            Some(prev) if prev != completed => ev.push(GameEvent::ObjectiveUpdated {
                quest_id: quest_id.to_string(),
                objective_id: objective_id.to_string(),
                completed,
            }),
            Some(_) => {}
            None => tracing::debug!(quest_id, objective_id, "update_quest_objective: unknown objective"),
        }
    }

    /// `Active → Completed`: grants the completion XP and any era the quest unlocks.
    pub fn complete_quest(&mut self, id: &str) -> Vec<GameEvent> {
        let now = self.clock.now();
        let Some(quest) = self.state.quests.iter_mut().find(|q| q.id == id) else {
            tracing::debug!(id, "complete_quest: unknown quest");
            return Vec::new();
        };
        if !quest.complete(now) {
            tracing::debug!(id, status = ?quest.status, "complete_quest: quest is closed");
            return Vec::new();
        }
        let kind = quest.kind;
        let unlocks = quest.unlocks_era.clone();
        tracing::info!(id, "quest completed");
        let mut ev = vec![GameEvent::QuestCompleted { id: id.to_string(), kind }];
        self.state.player_stats.increment(Stat::QuestsCompleted, 1);
        self.gain_experience(self.rules.quest_completion_xp, &mut ev);
        if let Some(era) = unlocks {
            self.unlock_era_inner(&era, &mut ev);
        }
        self.settle(ev)
    }

    /// `Active → Failed`. No rewards.
    pub fn fail_quest(&mut self, id: &str) -> Vec<GameEvent> {
        let Some(quest) = self.state.quests.iter_mut().find(|q| q.id == id) else {
            tracing::debug!(id, "fail_quest: unknown quest");
            return Vec::new();
        };
        if !quest.fail() {
            tracing::debug!(id, "fail_quest: quest is closed");
            return Vec::new();
        }
        self.state.player_stats.increment(Stat::QuestsFailed, 1);
        self.settle(vec![GameEvent::QuestFailed { id: id.to_string() }])
    }

    // ---- npcs ---------------------------------------------------------------

    pub fn add_npc(&mut self, npc: Npc) -> Vec<GameEvent> {
        if self.state.npc(&npc.id).is_some() {
            tracing::debug!(id = %npc.id, "add_npc: already known");
            return Vec::new();
        }
        let id = npc.id.clone();
        self.state.npcs.push(npc);
        self.settle(vec![GameEvent::NpcAdded { id }])
    }

    pub fn meet_npc(&mut self, id: &str) -> Vec<GameEvent> {
        let Some(npc) = self.state.npcs.iter_mut().find(|n| n.id == id) else {
            tracing::debug!(id, "meet_npc: unknown npc");
            return Vec::new();
        };
        if !npc.meet() {
            return Vec::new();
        }
        self.state.player_stats.increment(Stat::NpcsMet, 1);
        self.settle(vec![GameEvent::NpcMet { id: id.to_string() }])
    }

    pub fn update_relationship(&mut self, id: &str, delta: i64) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.change_relationship(id, delta, &mut ev);
        self.settle(ev)
    }

    fn change_relationship(&mut self, id: &str, delta: i64, ev: &mut Vec<GameEvent>) {
        let Some(npc) = self.state.npcs.iter_mut().find(|n| n.id == id) else {
            tracing::debug!(id, "update_relationship: unknown npc");
            return;
        };
        let (before, after) = npc.adjust_relationship(delta, &self.rules);
        self.transcript.push(format!("[EFFECT][NPC][{}] {} → {}", id, before, after));
        ev.push(GameEvent::RelationshipChanged { npc_id: id.to_string(), before, after });
    }

    // ---- achievements -------------------------------------------------------

    pub fn unlock_achievement(&mut self, id: &str) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.unlock_achievement_inner(id, &mut ev);
        self.settle(ev)
    }

    fn unlock_achievement_inner(&mut self, id: &str, ev: &mut Vec<GameEvent>) {
        let now = self.clock.now();
        let Some(achievement) = self.state.achievements.iter_mut().find(|a| a.id == id) else {
            tracing::debug!(id, "unlock_achievement: unknown achievement");
            return;
        };
        if !achievement.unlock(now) {
            return;
        }
        tracing::info!(id, "achievement unlocked");
        self.transcript.push(format!("[ACHIEVEMENT] {}", achievement.title));
        ev.push(GameEvent::AchievementUnlocked { id: id.to_string() });
    }

    // ---- skills -------------------------------------------------------------

    pub fn add_skill_xp(&mut self, id: &str, amount: u64) -> Vec<GameEvent> {
        let growth = self.rules.skill_threshold_growth;
        let Some(skill) = self.state.skills.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(id, "add_skill_xp: unknown skill");
            return Vec::new();
        };
        if !skill.unlocked {
            tracing::debug!(id, "add_skill_xp: skill is locked");
            return Vec::new();
        }
        let gained = skill.gain_xp(amount, growth);
        let mut ev = vec![GameEvent::SkillXpGained { id: id.to_string(), amount }];
        if gained > 0 {
            tracing::info!(id, level = skill.current_level, "skill leveled up");
            ev.push(GameEvent::SkillLeveledUp { id: id.to_string(), level: skill.current_level });
        }
        self.settle(ev)
    }

    /// Unlock a skill whose prerequisite (if any) has reached the configured level.
    pub fn unlock_skill(&mut self, id: &str) -> Vec<GameEvent> {
        let needed = self.rules.skill_unlock_prerequisite_level;
        let Some(skill) = self.state.skill(id) else {
            tracing::debug!(id, "unlock_skill: unknown skill");
            return Vec::new();
        };
        let pre_level = skill
            .prerequisite_id
            .as_deref()
            .and_then(|pre| self.state.skill(pre))
            .map(|s| s.current_level);
        if !skill.can_unlock(pre_level, needed) {
            tracing::debug!(id, "unlock_skill: prerequisite not met");
            return Vec::new();
        }
        let unlocked = self
            .state
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .is_some_and(|s| s.unlock());
        if !unlocked {
            return Vec::new();
        }
        self.settle(vec![GameEvent::SkillUnlocked { id: id.to_string() }])
    }

    // ---- journal & locations ------------------------------------------------

    pub fn add_journal_entry(&mut self, draft: JournalDraft) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.add_journal_inner(draft, &mut ev);
        self.settle(ev)
    }

    fn add_journal_inner(&mut self, draft: JournalDraft, ev: &mut Vec<GameEvent>) {
        let era = self.state.current_era().clone();
        let entry = draft.stamp(new_id("journal"), self.clock.now(), era);
        self.transcript.push(format!("[EFFECT][JOURNAL] {}", entry.title));
        ev.push(GameEvent::JournalEntryAdded { id: entry.id.clone() });
        self.state.journal.insert(0, entry);
    }

    pub fn discover_location(&mut self, id: &str) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.discover_location_inner(id, &mut ev);
        self.settle(ev)
    }

    fn discover_location_inner(&mut self, id: &str, ev: &mut Vec<GameEvent>) {
        let Some(loc) = self.state.locations.iter_mut().find(|l| l.id == id) else {
            tracing::debug!(id, "discover_location: unknown location");
            return;
        };
        if !loc.discover() {
            return;
        }
        self.state.player_stats.increment(Stat::LocationsDiscovered, 1);
        self.transcript.push(format!("[EFFECT][MAP] discovered {}", id));
        ev.push(GameEvent::LocationDiscovered { id: id.to_string() });
    }

    /// Visiting also discovers.
    pub fn visit_location(&mut self, id: &str) -> Vec<GameEvent> {
        let Some(loc) = self.state.locations.iter_mut().find(|l| l.id == id) else {
            tracing::debug!(id, "visit_location: unknown location");
            return Vec::new();
        };
        let (newly, first_visit) = loc.visit();
        let mut ev = Vec::new();
        if newly {
            self.state.player_stats.increment(Stat::LocationsDiscovered, 1);
            ev.push(GameEvent::LocationDiscovered { id: id.to_string() });
        }
        if first_visit {
            ev.push(GameEvent::LocationVisited { id: id.to_string() });
        }
        self.settle(ev)
    }

    // ---- daily challenges ---------------------------------------------------

    /// Replace the batch unconditionally; in-progress challenges are discarded.
    pub fn generate_daily_challenges(&mut self) -> Vec<GameEvent> {
        let expires = self.clock.next_midnight();
        self.state.daily_challenges = daily::generate(expires, |k| new_id(&format!("daily_{}", k.key())));
        let count = self.state.daily_challenges.len();
        self.settle(vec![GameEvent::DailyChallengesGenerated { count }])
    }

    /// Generate a batch only when there is none or all have expired.
    pub fn refresh_daily_challenges(&mut self) -> Vec<GameEvent> {
        if !daily::needs_refresh(&self.state.daily_challenges, self.clock.now()) {
            tracing::debug!("refresh_daily_challenges: current batch still live");
            return Vec::new();
        }
        self.generate_daily_challenges()
    }

    pub fn update_challenge_progress(&mut self, id: &str, amount: u32) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.advance_challenge(|c| c.id == id, amount, &mut ev);
        if ev.is_empty() {
            tracing::debug!(id, "update_challenge_progress: unknown or completed challenge");
        }
        self.settle(ev)
    }

    fn advance_challenge(
        &mut self,
        mut pick: impl FnMut(&DailyChallenge) -> bool,
        amount: u32,
        ev: &mut Vec<GameEvent>,
    ) {
        let mut rewards = Vec::new();
        for challenge in self.state.daily_challenges.iter_mut().filter(|c| !c.completed) {
            if !pick(&*challenge) {
                continue;
            }
            let done = challenge.advance(amount);
            ev.push(GameEvent::ChallengeProgressed {
                id: challenge.id.clone(),
                progress: challenge.progress,
                target: challenge.target,
            });
            if done {
                ev.push(GameEvent::ChallengeCompleted { id: challenge.id.clone() });
                rewards.push(challenge.reward.clone());
            }
        }
        for reward in rewards {
            self.state.player_stats.increment(Stat::DailiesCompleted, 1);
            self.gain_experience(reward.xp, ev);
            if let Some(gold) = reward.gold {
                self.change_gold(gold, ev);
            }
        }
    }

    fn track_dailies(&mut self, event: &GameEvent, ev: &mut Vec<GameEvent>) {
        if let Some((kind, amount)) = daily::progress_from(event) {
            self.advance_challenge(|c| c.kind == kind, amount, ev);
        }
    }

    // ---- sessions -----------------------------------------------------------

    /// Start a session in `era` (default: the character's era). Seeds the
    /// catalog quests when the quest log is empty; archives a running session.
    pub fn start_session(&mut self, era: Option<EraId>) -> Vec<GameEvent> {
        let Some(character) = self.state.character.as_ref() else {
            tracing::debug!("start_session: no character");
            return Vec::new();
        };
        let era = era.unwrap_or_else(|| character.current_era.clone());
        let session = GameSession::new(new_id("session"), character.id.clone(), era, self.clock.now());
        let mut ev = Vec::new();
        self.end_session_inner(&mut ev);
        if self.state.quests.is_empty() {
            for quest in self.catalog.quests.clone() {
                self.add_quest_inner(quest, &mut ev);
            }
        }
        self.state.player_stats.increment(Stat::SessionsPlayed, 1);
        ev.push(GameEvent::SessionStarted { id: session.id.clone() });
        self.state.current_session = Some(session);
        self.settle(ev)
    }

    pub fn add_message(
        &mut self,
        kind: MessageKind,
        content: impl Into<String>,
        choices: Vec<String>,
        dice_roll: Option<DiceRoll>,
    ) -> Vec<GameEvent> {
        let now = self.clock.now();
        let Some(session) = self.state.current_session.as_mut() else {
            tracing::debug!("add_message: no session");
            return Vec::new();
        };
        let content = content.into();
        let words = word_count(&content);
        session.messages.push(StoryMessage {
            id: new_id("msg"),
            kind,
            content,
            choices,
            dice_roll,
            timestamp: now,
        });
        self.state.player_stats.increment(Stat::WordsRead, words);
        self.settle(vec![GameEvent::MessageAdded { words }])
    }

    pub fn end_session(&mut self) -> Vec<GameEvent> {
        let mut ev = Vec::new();
        self.end_session_inner(&mut ev);
        self.settle(ev)
    }

    fn end_session_inner(&mut self, ev: &mut Vec<GameEvent>) {
        let Some(mut session) = self.state.current_session.take() else {
            return;
        };
        session.is_active = false;
        ev.push(GameEvent::SessionEnded {
            id: session.id.clone(),
            rolls: session.rolls,
            failed_rolls: session.failed_rolls,
        });
        self.state.session_history.push(session);
    }

    // ---- stats & reset ------------------------------------------------------

    pub fn increment_stat(&mut self, stat: Stat, amount: u64) -> Vec<GameEvent> {
        let value = self.state.player_stats.increment(stat, amount);
        self.settle(vec![GameEvent::StatIncremented { stat, value }])
    }

    /// Restore every collection to its seed and drop the character. Settings
    /// and world configuration survive; the intro is shown again.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        let mut fresh = GameState::seeded(&self.catalog, &self.rules);
        fresh.settings = self.state.settings.clone();
        fresh.settings.has_seen_intro = false;
        fresh.world = self.state.world.clone();
        self.state = fresh;
        tracing::info!("game reset");
        vec![GameEvent::GameReset]
    }

    // ---- event settlement ---------------------------------------------------

    /// Run follow-up reactions (daily progress, achievements) until no new
    /// events appear. Returns every event in the order it happened.
    fn settle(&mut self, events: Vec<GameEvent>) -> Vec<GameEvent> {
        let mut queue: VecDeque<GameEvent> = events.into();
        let mut out = Vec::with_capacity(queue.len());
        while let Some(event) = queue.pop_front() {
            let mut follow = Vec::new();
            self.track_dailies(&event, &mut follow);
            for id in achievements::triggered_by(&self.state, &event, &self.rules) {
                self.unlock_achievement_inner(&id, &mut follow);
            }
            out.push(event);
            queue.extend(follow);
        }
        out
    }
}
