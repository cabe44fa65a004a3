//! Testing utilities for the story pipeline.
//!
//! [`ScriptedModel`] stands in for a real model so the pipeline's control
//! flow can be exercised without API calls.

use crate::model::{Prompt, Stage, StoryModel};
use async_trait::async_trait;
use bedtime_llm::Error;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// A scripted reply for one call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// The call fails with [`Error::Network`].
    Failure(String),
}

impl ScriptedReply {
    fn into_result(self) -> Result<String, Error> {
        match self {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Failure(message) => Err(Error::Network(message)),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<Stage, VecDeque<ScriptedReply>>,
    fallback: HashMap<Stage, ScriptedReply>,
    prompts: Vec<Prompt>,
}

/// A model that returns scripted replies per stage and records every prompt.
///
/// Queued replies for a stage are returned in order; once they run out the
/// stage's fallback reply is repeated. A stage with neither fails the call.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: Mutex<Script>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for a stage.
    pub fn script<I, S>(self, stage: Stage, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock()
            .queued
            .entry(stage)
            .or_default()
            .extend(replies.into_iter().map(|r| ScriptedReply::Text(r.into())));
        self
    }

    /// Reply used for a stage after its queue is empty.
    pub fn fallback(self, stage: Stage, reply: impl Into<String>) -> Self {
        self.lock()
            .fallback
            .insert(stage, ScriptedReply::Text(reply.into()));
        self
    }

    /// Queue a failing call for a stage.
    pub fn fail(self, stage: Stage, message: impl Into<String>) -> Self {
        self.lock()
            .queued
            .entry(stage)
            .or_default()
            .push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Number of calls made for a stage.
    pub fn calls(&self, stage: Stage) -> usize {
        self.lock().prompts.iter().filter(|p| p.stage == stage).count()
    }

    /// Prompts sent for a stage, in call order.
    pub fn prompts(&self, stage: Stage) -> Vec<Prompt> {
        self.lock()
            .prompts
            .iter()
            .filter(|p| p.stage == stage)
            .cloned()
            .collect()
    }

    /// Stages in the order they were called.
    pub fn call_order(&self) -> Vec<Stage> {
        self.lock().prompts.iter().map(|p| p.stage).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A panic while holding the lock only happens inside a failing test.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StoryModel for ScriptedModel {
    async fn generate(&self, prompt: &Prompt) -> Result<String, Error> {
        let mut script = self.lock();
        script.prompts.push(prompt.clone());

        let stage = prompt.stage;
        let next = script
            .queued
            .get_mut(&stage)
            .and_then(VecDeque::pop_front)
            .or_else(|| script.fallback.get(&stage).cloned());

        match next {
            Some(reply) => reply.into_result(),
            None => Err(Error::Config(format!(
                "no scripted reply left for stage {stage}"
            ))),
        }
    }
}
