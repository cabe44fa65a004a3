//! Structured requirements extracted from a story request.

use crate::json;
use crate::story::StoryRequest;

/// Constraints every story carries, whatever the model extracted.
pub const REQUIRED_CONSTRAINTS: [&str; 6] = [
    "no gore",
    "no explicit romance",
    "no cruelty",
    "no graphic violence",
    "warm ending",
    "bedtime pacing",
];

const DEFAULT_TITLE_HINT: &str = "A Cozy Bedtime Adventure";
const DEFAULT_SETTING: &str = "a quiet, magical place";
const DEFAULT_THEME: &str = "friendship and kindness";
const DEFAULT_TONE: &str = "cozy and gentle";

/// What the story should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBrief {
    pub request: StoryRequest,
    pub title_hint: String,
    /// May be empty; the storyteller then invents characters.
    pub characters: Vec<String>,
    pub setting: String,
    pub theme: String,
    pub tone: String,
    pub constraints: Vec<String>,
}

impl StoryBrief {
    /// Brief with every field at its default.
    pub fn fallback(request: StoryRequest) -> Self {
        let mut brief = Self {
            request,
            title_hint: DEFAULT_TITLE_HINT.to_string(),
            characters: Vec::new(),
            setting: DEFAULT_SETTING.to_string(),
            theme: DEFAULT_THEME.to_string(),
            tone: DEFAULT_TONE.to_string(),
            constraints: Vec::new(),
        };
        brief.require_safety_constraints();
        brief
    }

    /// Read the parser's reply; missing or malformed fields keep defaults.
    pub fn from_reply(request: StoryRequest, reply: &str) -> Self {
        let mut brief = Self::fallback(request);
        let Some(map) = json::find_object(reply) else {
            return brief;
        };

        if let Some(title) = json::string_field(&map, "title_hint") {
            brief.title_hint = title;
        }
        if let Some(setting) = json::string_field(&map, "setting") {
            brief.setting = setting;
        }
        if let Some(theme) = json::string_field(&map, "theme") {
            brief.theme = theme;
        }
        if let Some(tone) = json::string_field(&map, "tone") {
            brief.tone = tone;
        }
        brief.characters = json::name_list(&map, "characters");
        brief.constraints = json::string_list(&map, "constraints");
        brief.require_safety_constraints();
        brief
    }

    /// Whether the model's reply contributed anything beyond defaults.
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback(self.request.clone())
    }

    fn require_safety_constraints(&mut self) {
        for required in REQUIRED_CONSTRAINTS {
            let present = self
                .constraints
                .iter()
                .any(|c| c.eq_ignore_ascii_case(required));
            if !present {
                self.constraints.push(required.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StoryRequest {
        StoryRequest::new("A story about a bunny and a kitten").unwrap()
    }

    #[test]
    fn test_full_reply() {
        let reply = r#"{
            "title_hint": "Bunny and Kitten's Moonlit Picnic",
            "characters": ["Pip the bunny", "Mittens the kitten"],
            "setting": "a meadow under the stars",
            "theme": "sharing",
            "tone": "soft and funny",
            "constraints": ["no gore", "Warm Ending", "short sentences"]
        }"#;
        let brief = StoryBrief::from_reply(request(), reply);

        assert_eq!(brief.title_hint, "Bunny and Kitten's Moonlit Picnic");
        assert_eq!(brief.characters.len(), 2);
        assert_eq!(brief.setting, "a meadow under the stars");
        assert_eq!(brief.tone, "soft and funny");
        assert!(!brief.is_fallback());

        // Model constraints first, then the missing required ones, no duplicates.
        assert_eq!(brief.constraints[..3], ["no gore", "Warm Ending", "short sentences"]);
        assert_eq!(brief.constraints.len(), 7);
        for required in REQUIRED_CONSTRAINTS {
            assert!(brief
                .constraints
                .iter()
                .any(|c| c.eq_ignore_ascii_case(required)));
        }
    }

    #[test]
    fn test_malformed_reply_falls_back() {
        let brief = StoryBrief::from_reply(request(), "I'd love to help with that!");
        assert!(brief.is_fallback());
        assert_eq!(brief.title_hint, "A Cozy Bedtime Adventure");
        assert_eq!(brief.constraints, REQUIRED_CONSTRAINTS);
        assert!(brief.characters.is_empty());
    }

    #[test]
    fn test_character_objects_keep_names() {
        let reply = r#"{"characters": [{"name": "Pip", "species": "bunny"},
                                       {"name": "Mittens", "species": "kitten"}]}"#;
        let brief = StoryBrief::from_reply(request(), reply);
        assert_eq!(brief.characters, ["Pip (bunny)", "Mittens (kitten)"]);
        assert!(!brief.is_fallback());
    }

    #[test]
    fn test_partial_reply_keeps_defaults() {
        let brief = StoryBrief::from_reply(request(), r#"{"theme": "", "tone": "sleepy"}"#);
        assert_eq!(brief.theme, "friendship and kindness");
        assert_eq!(brief.tone, "sleepy");
        assert_eq!(brief.request.as_str(), "A story about a bunny and a kitten");
    }
}
