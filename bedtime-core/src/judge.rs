//! Judge verdicts.
//!
//! The judge's pass/fail and fix list are taken as the model reports them.
//! Scores, strengths and issues are kept for logging only.

use crate::json;
use std::collections::BTreeMap;

/// Rubric the judge scores, each 0–10.
pub const RUBRIC: [&str; 7] = [
    "age_appropriateness",
    "coziness",
    "story_arc",
    "character_warmth",
    "language_simplicity",
    "creativity",
    "safety",
];

const SCORE_THRESHOLD: u8 = 7;
const SAFETY_THRESHOLD: u8 = 8;

/// The outcome of one judging call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JudgeVerdict {
    pub passed: bool,
    /// Concrete improvements, in the order the judge gave them.
    pub fixes: Vec<String>,
    pub scores: BTreeMap<String, u8>,
    pub strengths: Vec<String>,
    pub issues: Vec<String>,
    /// Set when the reply could not be read and this verdict is the fail-safe.
    pub malformed: bool,
}

impl JudgeVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    pub fn fail(fixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            passed: false,
            fixes: fixes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Failing verdict with no fixes, used for unreadable replies.
    pub fn fail_safe() -> Self {
        Self {
            malformed: true,
            ..Default::default()
        }
    }

    /// Read the judge's reply.
    ///
    /// Needs a JSON object with a readable `overall_pass`; anything else is
    /// the fail-safe verdict.
    pub fn from_reply(reply: &str) -> Self {
        let Some(map) = json::find_object(reply) else {
            return Self::fail_safe();
        };
        let Some(passed) = map.get("overall_pass").and_then(json::as_bool) else {
            return Self::fail_safe();
        };

        let scores = match map.get("scores") {
            Some(serde_json::Value::Object(scores)) => scores
                .iter()
                .filter_map(|(name, value)| {
                    let score = json::as_number(value)?.round().clamp(0.0, 10.0) as u8;
                    Some((name.clone(), score))
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Self {
            passed,
            fixes: json::string_list(&map, "fixes"),
            scores,
            strengths: json::string_list(&map, "strengths"),
            issues: json::string_list(&map, "issues"),
            malformed: false,
        }
    }

    /// Whether the scores alone clear the bar (all ≥ 7, safety ≥ 8).
    ///
    /// `None` when the judge gave no scores.
    pub fn scores_pass(&self) -> Option<bool> {
        if self.scores.is_empty() {
            return None;
        }
        let safety = self.scores.get("safety").copied().unwrap_or(0);
        let all_clear = self.scores.values().all(|score| *score >= SCORE_THRESHOLD);
        Some(all_clear && safety >= SAFETY_THRESHOLD)
    }

    /// The judge's scores contradict its own verdict.
    pub fn is_inconsistent(&self) -> bool {
        self.scores_pass().is_some_and(|ok| ok != self.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_reply() {
        let reply = r#"{
            "overall_pass": true,
            "scores": {"age_appropriateness": 9, "coziness": 8, "story_arc": 8,
                       "character_warmth": 9, "language_simplicity": 8,
                       "creativity": 7, "safety": 10},
            "strengths": ["gentle humor"],
            "issues": [],
            "fixes": []
        }"#;
        let verdict = JudgeVerdict::from_reply(reply);
        assert!(verdict.passed);
        assert!(verdict.fixes.is_empty());
        assert!(!verdict.malformed);
        assert_eq!(verdict.scores.len(), RUBRIC.len());
        assert_eq!(verdict.scores_pass(), Some(true));
        assert!(!verdict.is_inconsistent());
    }

    #[test]
    fn test_failing_reply_keeps_fix_order() {
        let reply = r#"Verdict:
```json
{"overall_pass": "false", "scores": {"safety": 6.6, "coziness": "9"},
 "issues": ["the storm is scary"],
 "fixes": ["Make the storm a soft drizzle", "Add a lullaby at the end"]}
```"#;
        let verdict = JudgeVerdict::from_reply(reply);
        assert!(!verdict.passed);
        assert_eq!(
            verdict.fixes,
            ["Make the storm a soft drizzle", "Add a lullaby at the end"]
        );
        assert_eq!(verdict.scores["safety"], 7);
        assert_eq!(verdict.scores["coziness"], 9);
        assert_eq!(verdict.scores_pass(), Some(false));
        assert_eq!(verdict.issues, ["the storm is scary"]);
    }

    #[test]
    fn test_malformed_reply_is_fail_safe() {
        for reply in [
            "The story is lovely!",
            r#"{"scores": {"safety": 10}}"#,
            r#"{"overall_pass": "maybe", "fixes": ["x"]}"#,
            "",
        ] {
            let verdict = JudgeVerdict::from_reply(reply);
            assert!(!verdict.passed, "reply {reply:?} should fail");
            assert!(verdict.fixes.is_empty());
            assert!(verdict.malformed);
        }
    }

    #[test]
    fn test_self_report_trusted_over_scores() {
        let reply = r#"{"overall_pass": false,
                        "scores": {"safety": 9, "coziness": 9}, "fixes": []}"#;
        let verdict = JudgeVerdict::from_reply(reply);
        assert!(!verdict.passed);
        assert!(verdict.is_inconsistent());
    }

    #[test]
    fn test_missing_safety_score_does_not_pass() {
        let mut verdict = JudgeVerdict::pass();
        verdict.scores.insert("coziness".to_string(), 10);
        assert_eq!(verdict.scores_pass(), Some(false));
        assert!(verdict.is_inconsistent());
        assert_eq!(JudgeVerdict::fail(["x"]).scores_pass(), None);
    }
}
