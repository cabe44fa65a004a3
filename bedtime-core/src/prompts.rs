//! Prompt templates, one per stage.

use crate::arc::{BeatKind, StoryArc};
use crate::brief::{StoryBrief, REQUIRED_CONSTRAINTS};
use crate::judge::RUBRIC;
use crate::story::StoryRequest;

/// Asked for when a failing verdict came with no fixes.
pub const FALLBACK_FIX: &str = "Make it cozier and simpler.";

const AUDIENCE: &str = "ages 5–10";

fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse_request(request: &StoryRequest) -> String {
    let required = REQUIRED_CONSTRAINTS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You extract structured requirements for a bedtime story for {AUDIENCE}.

User request:
{request}

Return ONLY valid JSON with keys:
- title_hint
- characters (list)
- setting
- theme
- tone
- constraints (list)

Constraints must include:
{required}."#
    )
}

pub fn plan_arc(request: &StoryRequest) -> String {
    let beats = BeatKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| format!("  {}) {} ({})", i + 1, kind.label(), kind.guidance()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You plan a simple bedtime story arc for {AUDIENCE}.

User request:
{request}

IMPORTANT:
- Keep the core idea of the user request.
- If the request includes unsafe topics (like "robber"), do NOT swap it for an unrelated idea.
  Reframe it gently (pretend play, a misunderstanding, learning honesty, returning things).

Return ONLY valid JSON with keys:
- target_words: integer 600 to 1100
- beats: list of EXACTLY 6 beats in this order:
{beats}"#
    )
}

pub fn tell(brief: &StoryBrief, arc: &StoryArc) -> String {
    let characters = if brief.characters.is_empty() {
        "Invent two lovable characters".to_string()
    } else {
        brief.characters.join(", ")
    };
    let constraints = bullet_list(&brief.constraints);
    let request = &brief.request;
    let title = &brief.title_hint;
    let setting = &brief.setting;
    let theme = &brief.theme;
    let tone = &brief.tone;
    let target_words = arc.target_words();

    format!(
        r#"Write a bedtime story for {AUDIENCE}.

User request (keep the core idea; reframe gently if needed, do NOT replace it):
{request}

Title idea: {title}
Characters: {characters}
Setting: {setting}
Theme: {theme}
Tone: {tone}

Constraints:
{constraints}

Story arc beats (follow these in order):
{arc}

Writing guidelines:
- Clear, natural language for {AUDIENCE}; treat the reader as a curious child, not a toddler
- Calm, comforting bedtime tone without sounding childish
- Emotionally warm; light, age-appropriate humor is welcome
- Clear arc: setup, problem, gentle resolution
- 6–10 short paragraphs ending warm and calm

OUTPUT RULES:
- Output ONLY the story (title + paragraphs)
- No commentary, no apologies, no quotes around the story

Length: about {target_words} words.

Begin the story now."#
    )
}

pub fn judge(request: &StoryRequest, story: &str) -> String {
    let rubric = bullet_list(RUBRIC);

    format!(
        r#"You are a judge evaluating a bedtime story for {AUDIENCE}.

User request:
{request}

Story:
"""{story}"""

Score each from 0–10:
{rubric}

Return ONLY valid JSON with:
- overall_pass (boolean; pass if all >= 7 and safety >= 8)
- scores (object)
- strengths (list)
- issues (list)
- fixes (list of concrete improvements)

Do NOT rewrite the story."#
    )
}

pub fn revise(request: &StoryRequest, story: &str, fixes: &[String]) -> String {
    let fixes = if fixes.is_empty() {
        bullet_list([FALLBACK_FIX])
    } else {
        bullet_list(fixes)
    };

    format!(
        r#"Revise the bedtime story below for {AUDIENCE}.

User request:
{request}

Original story:
"""{story}"""

Apply ONLY these fixes:
{fixes}

Keep character names and the overall structure.
Output ONLY the full revised story (no commentary, no quotes)."#
    )
}

pub fn feedback(request: &StoryRequest, story: &str, feedback: &str) -> String {
    format!(
        r#"Revise the bedtime story for {AUDIENCE} based on user feedback.

Original request:
{request}

User feedback:
{feedback}

Story:
"""{story}"""

Rules:
- Keep the same main characters and overall plot
- Output ONLY the revised story (no commentary, no quotes)

If the feedback is about LENGTH:
- "shorter": reduce to 4–6 short paragraphs
- "longer": expand to 8–12 short paragraphs (add cozy details, not new major plot)

If the feedback is about the ENDING (e.g. "different ending"):
- change ONLY the final paragraph and make it clearly different

Otherwise:
- apply the feedback as a tone/style change across the story.

Now output the full revised story."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StoryRequest {
        StoryRequest::new("A story about a bunny and a kitten").unwrap()
    }

    #[test]
    fn test_plan_lists_beats_in_order() {
        let prompt = plan_arc(&request());
        let positions: Vec<usize> = BeatKind::ALL
            .iter()
            .map(|kind| prompt.find(kind.label()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("EXACTLY 6 beats"));
    }

    #[test]
    fn test_tell_includes_brief_arc_and_constraints() {
        let brief = StoryBrief::fallback(request());
        let arc = StoryArc::default_outline();
        let prompt = tell(&brief, &arc);

        assert!(prompt.contains("A story about a bunny and a kitten"));
        assert!(prompt.contains("Invent two lovable characters"));
        assert!(prompt.contains("- no graphic violence"));
        assert!(prompt.contains("1. Hook: "));
        assert!(prompt.contains("6. Warm Ending: "));
        assert!(prompt.contains("about 900 words"));
    }

    #[test]
    fn test_judge_lists_rubric() {
        let prompt = judge(&request(), "The End.");
        for item in RUBRIC {
            assert!(prompt.contains(&format!("- {item}")));
        }
        assert!(prompt.contains("\"\"\"The End.\"\"\""));
    }

    #[test]
    fn test_revise_uses_fallback_fix() {
        let prompt = revise(&request(), "story", &[]);
        assert!(prompt.contains("- Make it cozier and simpler."));

        let prompt = revise(&request(), "story", &["Shorter sentences".to_string()]);
        assert!(prompt.contains("- Shorter sentences"));
        assert!(!prompt.contains(FALLBACK_FIX));
    }

    #[test]
    fn test_feedback_prompt() {
        let prompt = feedback(&request(), "story", "funnier please");
        assert!(prompt.contains("User feedback:\nfunnier please"));
    }
}
