//! Error types for the story pipeline.

use crate::model::Stage;
use thiserror::Error;

/// Errors that abort a story run.
///
/// A malformed judge reply is not an error: it is read as a failing verdict.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Model call failed: {0}")]
    Model(#[from] bedtime_llm::Error),

    #[error("Story arc is malformed: {reason}")]
    MalformedArc { reason: String },

    #[error("The {stage} stage returned no story text")]
    EmptyStory { stage: Stage },

    #[error("Story request is empty")]
    EmptyRequest,
}

/// Result type for pipeline operations.
pub type StoryResult<T> = std::result::Result<T, StoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoryError::EmptyStory { stage: Stage::Revise };
        assert_eq!(err.to_string(), "The revise stage returned no story text");

        let err = StoryError::MalformedArc {
            reason: "expected 6 beats, found 4".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Story arc is malformed: expected 6 beats, found 4"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: StoryError = bedtime_llm::Error::EmptyResponse.into();
        assert!(matches!(err, StoryError::Model(_)));
    }
}
