//! Pipeline configuration.

use crate::model::Stage;

/// Automatic revisions allowed after the first draft.
pub const DEFAULT_MAX_REVISIONS: usize = 3;

const DEFAULT_MAX_TOKENS: usize = 3000;

/// Sampling settings for one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSettings {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl StageSettings {
    pub const fn new(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Configuration for a [`StoryPipeline`](crate::StoryPipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound on automatic revisions per run.
    pub max_revisions: usize,

    /// Abort on a malformed arc instead of using the default outline.
    pub strict_arc: bool,

    /// Per-stage settings, indexed by `Stage as usize`.
    stages: [StageSettings; 6],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_revisions: DEFAULT_MAX_REVISIONS,
            strict_arc: true,
            stages: Stage::ALL.map(default_settings),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_revisions(mut self, max_revisions: usize) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    pub fn with_strict_arc(mut self, strict: bool) -> Self {
        self.strict_arc = strict;
        self
    }

    /// Override the settings for one stage.
    pub fn with_stage(mut self, stage: Stage, settings: StageSettings) -> Self {
        self.stages[stage as usize] = settings;
        self
    }

    /// Set `max_tokens` for every stage.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        for settings in &mut self.stages {
            settings.max_tokens = max_tokens;
        }
        self
    }

    pub fn settings(&self, stage: Stage) -> StageSettings {
        self.stages[stage as usize]
    }
}

/// Extraction and planning run cold; writing runs warm; judging runs coldest.
fn default_settings(stage: Stage) -> StageSettings {
    match stage {
        Stage::ParseRequest | Stage::PlanArc => StageSettings::new(0.2),
        Stage::Tell => StageSettings::new(0.8),
        Stage::Judge => StageSettings::new(0.1),
        Stage::Revise | Stage::Feedback => StageSettings::new(0.7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_revisions, 3);
        assert!(config.strict_arc);
        assert_eq!(config.settings(Stage::Judge).temperature, 0.1);
        assert_eq!(config.settings(Stage::Tell).temperature, 0.8);
        assert_eq!(config.settings(Stage::Feedback).max_tokens, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::new()
            .with_max_revisions(1)
            .with_strict_arc(false)
            .with_max_tokens(800)
            .with_stage(Stage::Tell, StageSettings::new(0.5).with_max_tokens(2000));

        assert_eq!(config.max_revisions, 1);
        assert!(!config.strict_arc);
        assert_eq!(config.settings(Stage::Tell), StageSettings::new(0.5).with_max_tokens(2000));
        assert_eq!(config.settings(Stage::Revise).max_tokens, 800);
        assert_eq!(config.settings(Stage::Revise).temperature, 0.7);
    }
}
