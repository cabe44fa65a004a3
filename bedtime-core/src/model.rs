//! The model capability the pipeline is written against.
//!
//! Every stage sends one [`Prompt`] and receives one text reply. Production
//! code uses [`bedtime_llm::Client`]; tests use
//! [`ScriptedModel`](crate::testing::ScriptedModel).

use async_trait::async_trait;
use bedtime_llm::{Client, Completion, Error};
use std::fmt;

/// Pipeline stage a prompt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    ParseRequest,
    PlanArc,
    Tell,
    Judge,
    Revise,
    Feedback,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::ParseRequest,
        Stage::PlanArc,
        Stage::Tell,
        Stage::Judge,
        Stage::Revise,
        Stage::Feedback,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ParseRequest => "parse-request",
            Stage::PlanArc => "plan-arc",
            Stage::Tell => "tell",
            Stage::Judge => "judge",
            Stage::Revise => "revise",
            Stage::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

/// One request to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub stage: Stage,
    pub text: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Generate text given a prompt.
#[async_trait]
pub trait StoryModel: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, Error>;
}

#[async_trait]
impl StoryModel for Client {
    async fn generate(&self, prompt: &Prompt) -> Result<String, Error> {
        let completion = Completion::new(prompt.text.as_str())
            .with_max_tokens(prompt.max_tokens)
            .with_temperature(prompt.temperature);
        self.complete(&completion).await
    }
}
