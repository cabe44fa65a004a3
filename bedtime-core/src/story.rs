//! The request and the drafts produced for it.

use crate::error::StoryError;
use std::fmt;

/// Used when the user asks for nothing in particular.
pub const DEFAULT_REQUEST: &str =
    "A story about a girl named Alice and her best friend Bob, who happens to be a cat.";

/// The user's free-text story request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest(String);

impl StoryRequest {
    /// Capture a request, rejecting blank input.
    pub fn new(text: impl Into<String>) -> Result<Self, StoryError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StoryError::EmptyRequest);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Capture a request, falling back to [`DEFAULT_REQUEST`] for blank input.
    pub fn or_default(text: &str) -> Self {
        Self::new(text).unwrap_or_else(|_| Self(DEFAULT_REQUEST.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete story text.
///
/// Drafts are never edited; a revision produces a new draft with the
/// revision number bumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    text: String,
    revision: usize,
}

impl StoryDraft {
    /// The first draft of a story.
    pub fn first(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: 0,
        }
    }

    /// A new draft replacing this one.
    pub fn next(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: self.revision + 1,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> usize {
        self.revision
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for StoryDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Strip whitespace and stray wrapping quotes from a story reply.
pub(crate) fn clean_story_text(reply: &str) -> String {
    let mut text = reply.trim();
    for quote in ["\"\"\"", "```", "\""] {
        if text.len() < 2 * quote.len() || !text.starts_with(quote) || !text.ends_with(quote) {
            continue;
        }
        let inner = &text[quote.len()..text.len() - quote.len()];
        // A lone pair of quotes may belong to dialogue at both ends.
        if quote == "\"" && inner.contains('"') {
            continue;
        }
        text = inner.trim();
    }
    text.to_string()
}
