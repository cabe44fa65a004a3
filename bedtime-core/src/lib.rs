//! Bedtime story engine.
//!
//! A request goes through a fixed sequence of model calls:
//!
//! 1. **Parse** the request into a [`StoryBrief`]
//! 2. **Plan** a six-beat [`StoryArc`]
//! 3. **Tell** the first [`StoryDraft`]
//! 4. **Judge** and **revise** in a bounded [`RevisionLoop`]
//! 5. Optionally apply one round of reader **feedback**
//!
//! Every call goes through the [`StoryModel`] trait, so the whole flow can be
//! driven by [`testing::ScriptedModel`] in tests.
//!
//! ```ignore
//! let client = bedtime_llm::Client::from_env(bedtime_llm::Provider::OpenAi)?;
//! let pipeline = StoryPipeline::new(client, PipelineConfig::default());
//! let outcome = pipeline.run(StoryRequest::new("A bunny and a kitten")?).await?;
//! println!("{}", outcome.draft);
//! ```

pub mod arc;
pub mod brief;
pub mod config;
pub mod error;
mod json;
pub mod judge;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod revision;
pub mod story;
pub mod testing;

pub use arc::{Beat, BeatKind, StoryArc};
pub use brief::StoryBrief;
pub use config::{PipelineConfig, StageSettings, DEFAULT_MAX_REVISIONS};
pub use error::{StoryError, StoryResult};
pub use judge::JudgeVerdict;
pub use model::{Prompt, Stage, StoryModel};
pub use pipeline::{FinishedStory, StoryOutcome, StoryPipeline};
pub use revision::{LoopState, Resolution, RevisionLoop, RevisionOutcome, RevisionState};
pub use story::{StoryDraft, StoryRequest, DEFAULT_REQUEST};
