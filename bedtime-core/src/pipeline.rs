//! The story pipeline: parse, plan, tell, judge and revise, then feedback.

use crate::arc::StoryArc;
use crate::brief::StoryBrief;
use crate::config::PipelineConfig;
use crate::error::{StoryError, StoryResult};
use crate::judge::JudgeVerdict;
use crate::model::{Prompt, Stage, StoryModel};
use crate::prompts;
use crate::revision::{LoopState, Resolution, RevisionLoop, RevisionOutcome};
use crate::story::{clean_story_text, StoryDraft, StoryRequest};
use tracing::{debug, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

/// Everything one automatic run produced.
#[derive(Debug, Clone)]
pub struct StoryOutcome {
    pub request: StoryRequest,
    pub brief: StoryBrief,
    pub arc: StoryArc,
    /// The story the loop settled on.
    pub draft: StoryDraft,
    pub resolution: Resolution,
    /// Automatic revisions performed.
    pub revisions: usize,
    /// Every verdict the judge gave, oldest first.
    pub verdicts: Vec<JudgeVerdict>,
}

/// A run after the optional feedback pass.
#[derive(Debug, Clone)]
pub struct FinishedStory {
    pub outcome: StoryOutcome,
    /// Present only when non-empty feedback was applied.
    pub revised: Option<StoryDraft>,
}

impl FinishedStory {
    /// The story to show the reader.
    pub fn final_draft(&self) -> &StoryDraft {
        self.revised.as_ref().unwrap_or(&self.outcome.draft)
    }
}

/// Drives one story from request to final draft.
pub struct StoryPipeline<M> {
    model: M,
    config: PipelineConfig,
}

impl<M: StoryModel> StoryPipeline<M> {
    pub fn new(model: M, config: PipelineConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run every automatic stage for a request.
    pub async fn run(&self, request: StoryRequest) -> StoryResult<StoryOutcome> {
        let span = info_span!("story", run_id = %Uuid::new_v4());
        async move {
            info!(request = %request, "starting story");

            let brief = self.parse_request(&request).await?;
            let arc = self.plan_arc(&request).await?;
            let draft = self.write_story(&brief, &arc).await?;
            let refined = self.refine(&request, draft).await?;

            info!(
                resolution = ?refined.resolution,
                revisions = refined.revisions,
                "story settled"
            );

            Ok(StoryOutcome {
                request,
                brief,
                arc,
                draft: refined.draft,
                resolution: refined.resolution,
                revisions: refined.revisions,
                verdicts: refined.verdicts,
            })
        }
        .instrument(span)
        .await
    }

    /// Apply reader feedback once, if any was given.
    ///
    /// Consumes the outcome so feedback cannot be applied twice.
    pub async fn finish(
        &self,
        outcome: StoryOutcome,
        feedback: Option<&str>,
    ) -> StoryResult<FinishedStory> {
        let feedback = feedback.map(str::trim).filter(|f| !f.is_empty());
        let revised = match feedback {
            Some(feedback) => Some(self.apply_feedback(&outcome, feedback).await?),
            None => {
                debug!("no feedback given");
                None
            }
        };
        Ok(FinishedStory { outcome, revised })
    }

    /// Extract a brief; an unreadable reply yields the default brief.
    #[instrument(skip_all)]
    pub async fn parse_request(&self, request: &StoryRequest) -> StoryResult<StoryBrief> {
        let reply = self
            .call(Stage::ParseRequest, prompts::parse_request(request))
            .await?;
        let brief = StoryBrief::from_reply(request.clone(), &reply);
        if brief.is_fallback() {
            warn!("request parser reply unusable, using default brief");
        }
        debug!(
            title = %brief.title_hint,
            characters = brief.characters.len(),
            "parsed request"
        );
        Ok(brief)
    }

    /// Plan the six-beat arc.
    #[instrument(skip_all)]
    pub async fn plan_arc(&self, request: &StoryRequest) -> StoryResult<StoryArc> {
        let reply = self.call(Stage::PlanArc, prompts::plan_arc(request)).await?;
        match StoryArc::from_reply(&reply) {
            Ok(arc) => {
                debug!(target_words = arc.target_words(), "planned arc");
                Ok(arc)
            }
            Err(err) if !self.config.strict_arc => {
                warn!(error = %err, "using default arc outline");
                Ok(StoryArc::default_outline())
            }
            Err(err) => Err(err),
        }
    }

    /// Write the first draft.
    #[instrument(skip_all)]
    pub async fn write_story(&self, brief: &StoryBrief, arc: &StoryArc) -> StoryResult<StoryDraft> {
        let text = self.story_call(Stage::Tell, prompts::tell(brief, arc)).await?;
        Ok(StoryDraft::first(text))
    }

    /// Judge a draft; an unreadable reply is the fail-safe verdict.
    #[instrument(skip_all, fields(revision = draft.revision()))]
    pub async fn judge(
        &self,
        request: &StoryRequest,
        draft: &StoryDraft,
    ) -> StoryResult<JudgeVerdict> {
        let reply = self
            .call(Stage::Judge, prompts::judge(request, draft.text()))
            .await?;
        let verdict = JudgeVerdict::from_reply(&reply);

        if verdict.malformed {
            warn!("judge reply unreadable, treating as a fail with no fixes");
        } else if verdict.is_inconsistent() {
            warn!(
                passed = verdict.passed,
                scores = ?verdict.scores,
                "judge verdict disagrees with its own scores"
            );
        }
        info!(passed = verdict.passed, fixes = verdict.fixes.len(), "judged");
        if !verdict.issues.is_empty() {
            debug!(issues = ?verdict.issues, "judge issues");
        }
        Ok(verdict)
    }

    /// Rewrite a draft with the judge's fixes.
    #[instrument(skip_all, fields(revision = draft.revision()))]
    pub async fn revise(
        &self,
        request: &StoryRequest,
        draft: &StoryDraft,
        fixes: &[String],
    ) -> StoryResult<StoryDraft> {
        let text = self
            .story_call(Stage::Revise, prompts::revise(request, draft.text(), fixes))
            .await?;
        Ok(draft.next(text))
    }

    /// Rewrite the settled story with reader feedback. Not re-judged.
    #[instrument(skip_all)]
    pub async fn apply_feedback(
        &self,
        outcome: &StoryOutcome,
        feedback: &str,
    ) -> StoryResult<StoryDraft> {
        let text = self
            .story_call(
                Stage::Feedback,
                prompts::feedback(&outcome.request, outcome.draft.text(), feedback),
            )
            .await?;
        Ok(outcome.draft.next(text))
    }

    /// Judge and revise until the draft passes or revisions run out.
    pub async fn refine(
        &self,
        request: &StoryRequest,
        draft: StoryDraft,
    ) -> StoryResult<RevisionOutcome> {
        let mut story = RevisionLoop::new(draft, self.config.max_revisions);

        loop {
            match story.state() {
                LoopState::Drafted => {
                    let verdict = self.judge(request, story.draft()).await?;
                    story.judged(verdict);
                }
                LoopState::Judged => {
                    if story.decide() == LoopState::Exhausted {
                        warn!(
                            revisions = story.revisions().count(),
                            "revisions exhausted, keeping last draft"
                        );
                    }
                }
                LoopState::Revising => {
                    let next = self.revise(request, story.draft(), story.pending_fixes()).await?;
                    story.revised(next);
                }
                LoopState::Accepted | LoopState::Exhausted => break,
            }
        }

        story.finish().ok_or(StoryError::EmptyStory { stage: Stage::Judge })
    }

    async fn story_call(&self, stage: Stage, text: String) -> StoryResult<String> {
        let reply = self.call(stage, text).await?;
        let story = clean_story_text(&reply);
        if story.is_empty() {
            return Err(StoryError::EmptyStory { stage });
        }
        Ok(story)
    }

    async fn call(&self, stage: Stage, text: String) -> StoryResult<String> {
        let settings = self.config.settings(stage);
        let prompt = Prompt {
            stage,
            text,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };
        debug!(%stage, chars = prompt.text.len(), "calling model");
        let reply = self.model.generate(&prompt).await?;
        debug!(%stage, chars = reply.len(), "model replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn test_empty_revision_is_fatal() {
        let model = ScriptedModel::new()
            .fallback(Stage::Judge, r#"{"overall_pass": false, "fixes": ["softer"]}"#)
            .script(Stage::Revise, ["\"\"\"   \"\"\""]);
        let pipeline = StoryPipeline::new(model, PipelineConfig::default());
        let request = StoryRequest::new("a fox").unwrap();

        let err = pipeline
            .refine(&request, StoryDraft::first("Once."))
            .await
            .unwrap_err();
        assert!(matches!(err, StoryError::EmptyStory { stage: Stage::Revise }));
    }

    #[tokio::test]
    async fn test_prompts_use_stage_settings() {
        let model = ScriptedModel::new().script(Stage::Judge, [r#"{"overall_pass": true}"#]);
        let config = PipelineConfig::default().with_max_tokens(512);
        let pipeline = StoryPipeline::new(model, config);
        let request = StoryRequest::new("a fox").unwrap();

        pipeline.judge(&request, &StoryDraft::first("Once.")).await.unwrap();

        let prompt = &pipeline.model().prompts(Stage::Judge)[0];
        assert_eq!(prompt.temperature, 0.1);
        assert_eq!(prompt.max_tokens, 512);
        assert!(prompt.text.contains("\"\"\"Once.\"\"\""));
    }
}
