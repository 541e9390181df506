use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::character::Attribute;

const DIRECTIVE_PATTERN: &str = r"(?i)\[DICE_CHECK:\s*(\w+)\s+DC:\s*(\d+)\s*\]";
const DEFAULT_CONTEXT: &str = "Skill check required";

fn directive_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DIRECTIVE_PATTERN).ok()).as_ref()
}

/// A pending skill check requested by the narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceDirective {
    pub attribute: Attribute,
    pub dc: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedNarration {
    pub text: String,
    pub directive: Option<DiceDirective>,
}

impl ParsedNarration {
    /// First line of the cleaned text, used as the prompt shown with the roll.
    pub fn check_context(&self) -> &str {
        self.text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or(DEFAULT_CONTEXT)
    }
}

/// Extract the first `[DICE_CHECK: <attribute> DC:<n>]` directive.
///
/// A valid directive is removed: its whole line if it stands alone, otherwise
/// just the tag, and the result is trimmed. An unknown attribute or an
/// unparseable DC yields no directive and the text comes back unchanged.
pub fn parse_narration(text: &str) -> ParsedNarration {
    let unchanged = || ParsedNarration { text: text.to_string(), directive: None };
    let Some(caps) = directive_regex().and_then(|re| re.captures(text)) else {
        return unchanged();
    };
    let (Ok(attribute), Ok(dc)) = (caps[1].parse::<Attribute>(), caps[2].parse::<u32>()) else {
        return unchanged();
    };
    let Some(tag) = caps.get(0) else {
        return unchanged();
    };

    let line_start = text[..tag.start()].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[tag.end()..].find('\n').map_or(text.len(), |i| tag.end() + i);
    let alone = text[line_start..tag.start()].trim().is_empty()
        && text[tag.end()..line_end].trim().is_empty();

    let cleaned = if alone {
        let cut_end = (line_end + 1).min(text.len());
        format!("{}{}", &text[..line_start], &text[cut_end..])
    } else {
        let left = text[..tag.start()].trim_end_matches([' ', '\t']);
        let right = text[tag.end()..].trim_start_matches([' ', '\t']);
        let joins_line = !left.is_empty()
            && !left.ends_with('\n')
            && !right.is_empty()
            && !right.starts_with('\n');
        format!("{}{}{}", left, if joins_line { " " } else { "" }, right)
    };

    ParsedNarration {
        text: cleaned.trim().to_string(),
        directive: Some(DiceDirective { attribute, dc }),
    }
}
