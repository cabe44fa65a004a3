//! The six-beat story arc.

use crate::error::StoryError;
use crate::json;
use std::fmt;

pub const DEFAULT_TARGET_WORDS: u32 = 900;
pub const MIN_TARGET_WORDS: u32 = 600;
pub const MAX_TARGET_WORDS: u32 = 1100;

/// A beat's position in the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeatKind {
    Hook,
    SmallProblem,
    FirstAttempt,
    SecondAttempt,
    GentleClimax,
    WarmEnding,
}

impl BeatKind {
    /// Canonical order.
    pub const ALL: [BeatKind; 6] = [
        BeatKind::Hook,
        BeatKind::SmallProblem,
        BeatKind::FirstAttempt,
        BeatKind::SecondAttempt,
        BeatKind::GentleClimax,
        BeatKind::WarmEnding,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BeatKind::Hook => "Hook",
            BeatKind::SmallProblem => "Small Problem",
            BeatKind::FirstAttempt => "Attempt 1",
            BeatKind::SecondAttempt => "Attempt 2",
            BeatKind::GentleClimax => "Gentle Climax",
            BeatKind::WarmEnding => "Warm Ending",
        }
    }

    /// What the planner is asked to put in this beat.
    pub fn guidance(self) -> &'static str {
        match self {
            BeatKind::Hook => "introduce characters + cozy setting",
            BeatKind::SmallProblem => "kid-safe",
            BeatKind::FirstAttempt => "a first try at solving it",
            BeatKind::SecondAttempt => "a different try",
            BeatKind::GentleClimax => "safe, not scary",
            BeatKind::WarmEnding => "calm, bedtime-ready",
        }
    }

    fn default_description(self) -> &'static str {
        match self {
            BeatKind::Hook => "Introduce the characters in a cozy place.",
            BeatKind::SmallProblem => "A tiny kid-safe problem appears.",
            BeatKind::FirstAttempt => "They try a simple solution.",
            BeatKind::SecondAttempt => "They try a different solution.",
            BeatKind::GentleClimax => "A small safe moment resolves the problem.",
            BeatKind::WarmEnding => "Calm wrap-up and bedtime-ready goodnight.",
        }
    }
}

impl fmt::Display for BeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beat {
    pub kind: BeatKind,
    pub description: String,
}

/// Six beats in canonical order plus a length target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryArc {
    beats: [Beat; 6],
    target_words: u32,
}

impl StoryArc {
    /// Build an arc from six descriptions given in canonical order.
    pub fn new(descriptions: [String; 6], target_words: u32) -> Result<Self, StoryError> {
        let mut descriptions = descriptions.into_iter();
        let beats = BeatKind::ALL.map(|kind| Beat {
            kind,
            description: descriptions.next().unwrap_or_default(),
        });

        if let Some(empty) = beats.iter().find(|b| b.description.trim().is_empty()) {
            return Err(StoryError::MalformedArc {
                reason: format!("the {} beat is empty", empty.kind),
            });
        }

        Ok(Self {
            beats,
            target_words: clamp_target_words(Some(f64::from(target_words))),
        })
    }

    /// The outline used when a planner reply is unusable and strict mode is off.
    pub fn default_outline() -> Self {
        Self {
            beats: BeatKind::ALL.map(|kind| Beat {
                kind,
                description: kind.default_description().to_string(),
            }),
            target_words: DEFAULT_TARGET_WORDS,
        }
    }

    /// Read the planner's reply.
    ///
    /// Accepts a JSON object with `beats` (and optionally `target_words`), or
    /// plain text with one numbered or bulleted line per beat. Anything that
    /// does not yield exactly six beats is malformed.
    pub fn from_reply(reply: &str) -> Result<Self, StoryError> {
        let (items, target_words) = match json::find_object(reply) {
            Some(map) if map.contains_key("beats") => (
                json::string_list(&map, "beats"),
                map.get("target_words").and_then(json::as_number),
            ),
            _ => (list_items(reply), None),
        };

        if items.len() != BeatKind::ALL.len() {
            return Err(StoryError::MalformedArc {
                reason: format!("expected 6 beats, found {}", items.len()),
            });
        }

        let mut items = items.into_iter();
        let descriptions = BeatKind::ALL.map(|kind| {
            items
                .next()
                .map(|text| strip_label(&text, kind))
                .unwrap_or_default()
        });

        let mut arc = Self::new(descriptions, DEFAULT_TARGET_WORDS)?;
        arc.target_words = clamp_target_words(target_words);
        Ok(arc)
    }

    pub fn beats(&self) -> &[Beat; 6] {
        &self.beats
    }

    pub fn target_words(&self) -> u32 {
        self.target_words
    }
}

impl fmt::Display for StoryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, beat) in self.beats.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. {}: {}", i + 1, beat.kind, beat.description)?;
        }
        Ok(())
    }
}

fn clamp_target_words(value: Option<f64>) -> u32 {
    match value {
        Some(words)
            if (f64::from(MIN_TARGET_WORDS)..=f64::from(MAX_TARGET_WORDS)).contains(&words) =>
        {
            words.round() as u32
        }
        _ => DEFAULT_TARGET_WORDS,
    }
}

/// Numbered (`1.`, `2)`) or bulleted (`-`, `*`, `•`) lines in a plain reply.
fn list_items(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
                rest
            } else {
                let digits = line.find(|c: char| !c.is_ascii_digit())?;
                if digits == 0 {
                    return None;
                }
                line[digits..].strip_prefix(['.', ')', ':'])?
            };
            let rest = rest.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
        .collect()
}

/// Drop a leading "Hook:" style label so only the description remains.
fn strip_label(text: &str, kind: BeatKind) -> String {
    let text = text.replace("**", "");
    let text = strip_numbering(text.trim().trim_start_matches('*').trim_start());
    let label = kind.label();
    let unlabeled = match text.get(..label.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(label) => {
            let rest = &text[label.len()..];
            let rest = parenthetical_suffix(rest);
            rest.trim_start_matches([':', '-', '–', '—', ' '])
        }
        _ => text,
    };
    unlabeled.trim().to_string()
}

/// Drop a leading "1." or "2)" the planner repeated inside a JSON beat.
fn strip_numbering(text: &str) -> &str {
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return text;
    }
    match text[digits..].strip_prefix(['.', ')']) {
        Some(rest) => rest.trim_start(),
        None => text,
    }
}

/// Skip a "(introduce characters)" note the planner sometimes copies from the prompt.
fn parenthetical_suffix(rest: &str) -> &str {
    let trimmed = rest.trim_start();
    if trimmed.starts_with('(') {
        if let Some(close) = trimmed.find(')') {
            return &trimmed[close + 1..];
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(arc: &StoryArc) -> Vec<BeatKind> {
        arc.beats().iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_json_reply() {
        let reply = r#"```json
{
  "target_words": 750,
  "beats": [
    "Hook: Pip the bunny and Mittens the kitten share a burrow under an old oak.",
    "Small Problem: The night-light firefly has gone missing.",
    "Attempt 1: They search the clover patch.",
    "Attempt 2: They ask the wise old owl.",
    "Gentle Climax: The firefly was napping inside a tulip.",
    "Warm Ending: Everyone curls up, glowing and sleepy."
  ]
}
```"#;
        let arc = StoryArc::from_reply(reply).unwrap();
        assert_eq!(kinds(&arc), BeatKind::ALL);
        assert_eq!(arc.target_words(), 750);
        assert_eq!(
            arc.beats()[1].description,
            "The night-light firefly has gone missing."
        );
    }

    #[test]
    fn test_plain_text_reply() {
        let reply = "Here is the arc:\n\
            1. **Hook** (introduce characters + cozy setting): Two friends in a lighthouse.\n\
            2) Small Problem - The lamp flickers.\n\
            3. Attempt 1: They polish the glass.\n\
            4. Attempt 2: They ask the seagulls.\n\
            5. Gentle Climax: A moth was tickling the wick.\n\
            6. Warm Ending: The lamp glows and they fall asleep.\n\
            Sweet dreams!";
        let arc = StoryArc::from_reply(reply).unwrap();
        assert_eq!(arc.beats()[0].description, "Two friends in a lighthouse.");
        assert_eq!(arc.beats()[1].description, "The lamp flickers.");
        assert_eq!(arc.target_words(), DEFAULT_TARGET_WORDS);
    }

    #[test]
    fn test_wrong_beat_count_is_malformed() {
        let reply = r#"{"beats": ["one", "two", "three"]}"#;
        let err = StoryArc::from_reply(reply).unwrap_err();
        assert!(matches!(err, StoryError::MalformedArc { .. }));
        assert!(err.to_string().contains("found 3"));

        assert!(StoryArc::from_reply("Once upon a time there was a fox.").is_err());
    }

    #[test]
    fn test_empty_beat_is_malformed() {
        let reply = r#"{"beats": ["Hook:", "b", "c", "d", "e", "f"]}"#;
        let err = StoryArc::from_reply(reply).unwrap_err();
        assert!(err.to_string().contains("Hook"));
    }

    #[test]
    fn test_target_words_out_of_range() {
        let beats = r#"["a", "b", "c", "d", "e", "f"]"#;
        for words in ["5000", "12", "\"lots\""] {
            let reply = format!(r#"{{"target_words": {words}, "beats": {beats}}}"#);
            assert_eq!(StoryArc::from_reply(&reply).unwrap().target_words(), 900);
        }
        let reply = format!(r#"{{"target_words": "1100", "beats": {beats}}}"#);
        assert_eq!(StoryArc::from_reply(&reply).unwrap().target_words(), 1100);
    }

    #[test]
    fn test_default_outline() {
        let arc = StoryArc::default_outline();
        assert_eq!(kinds(&arc), BeatKind::ALL);
        assert!(arc.beats().iter().all(|b| !b.description.is_empty()));
        assert!(arc.to_string().starts_with("1. Hook: Introduce the characters"));
        assert!(arc.to_string().contains("\n6. Warm Ending: "));
    }

    #[test]
    fn test_labels_only_stripped_for_matching_beat() {
        assert_eq!(
            strip_label("Hookworms are not in this story", BeatKind::SmallProblem),
            "Hookworms are not in this story"
        );
        assert_eq!(strip_label("attempt 2 — try again", BeatKind::SecondAttempt), "try again");
        assert_eq!(strip_label("1900 was a cold year", BeatKind::Hook), "1900 was a cold year");
    }

    #[test]
    fn test_numbered_json_beats() {
        let reply = r#"{"beats": ["1) Hook: Two owls in a barn.", "2. Small Problem: A cold draft.",
            "3) **Attempt 1**: They stuff straw in the gap.", "4) Attempt 2: They ask the cows.",
            "5. Gentle Climax: The farmer shuts the door.", "6) Warm Ending: Snug and asleep."]}"#;
        let arc = StoryArc::from_reply(reply).unwrap();
        assert_eq!(arc.beats()[0].description, "Two owls in a barn.");
        assert_eq!(arc.beats()[2].description, "They stuff straw in the gap.");
        let rendered = arc.to_string();
        assert!(rendered.starts_with("1. Hook: Two owls in a barn.\n2. Small Problem: A cold"));
    }
}
