use serde::Serialize;

use crate::{
    character::Character,
    directive::{parse_narration, ParsedNarration},
    session::{MessageKind, StoryMessage},
    settings::{Language, WorldConfig},
};

pub const FALLBACK_NARRATION: &str =
    "The world holds its breath for a moment. Something stirs just beyond sight... What do you do next?";

/// How many recent messages accompany a narration request.
pub const HISTORY_WINDOW: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryLine {
    pub kind: MessageKind,
    pub content: String,
}

/// Everything the narrator sees for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeContext {
    pub character: Option<Character>,
    pub world: WorldConfig,
    pub language: Language,
    pub history: Vec<HistoryLine>,
    pub player_input: Option<String>,
}

impl NarrativeContext {
    pub fn new(
        character: Option<&Character>,
        world: &WorldConfig,
        language: Language,
        messages: &[StoryMessage],
        player_input: Option<String>,
    ) -> Self {
        let skip = messages.len().saturating_sub(HISTORY_WINDOW);
        let history = messages
            .iter()
            .skip(skip)
            .map(|m| HistoryLine { kind: m.kind, content: m.content.clone() })
            .collect();
        Self { character: character.cloned(), world: world.clone(), language, history, player_input }
    }
}

/// Produces story text for a turn. Implementations usually call a remote model.
pub trait Narrator {
    fn narrate(&mut self, ctx: &NarrativeContext) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct NarrationTurn {
    pub parsed: ParsedNarration,
    /// The narrator failed and the fallback text was used.
    pub fell_back: bool,
}

/// Ask the narrator for text and parse out any dice-check directive.
///
/// Narrator errors never propagate: they are logged and replaced with
/// [`FALLBACK_NARRATION`].
pub fn narrate_turn(narrator: &mut dyn Narrator, ctx: &NarrativeContext) -> NarrationTurn {
    match narrator.narrate(ctx) {
        Ok(text) => NarrationTurn { parsed: parse_narration(&text), fell_back: false },
        Err(err) => {
            tracing::warn!(error = %err, "narrator failed; using fallback text");
            NarrationTurn { parsed: parse_narration(FALLBACK_NARRATION), fell_back: true }
        }
    }
}

/// Replays canned responses in order, then fails.
#[derive(Debug, Default, Clone)]
pub struct ScriptedNarrator {
    responses: std::collections::VecDeque<String>,
}

impl ScriptedNarrator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { responses: responses.into_iter().map(Into::into).collect() }
    }
}

impl Narrator for ScriptedNarrator {
    fn narrate(&mut self, _ctx: &NarrativeContext) -> anyhow::Result<String> {
        self.responses.pop_front().ok_or_else(|| anyhow::anyhow!("no scripted narration left"))
    }
}
