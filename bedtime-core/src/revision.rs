//! The bounded judge-and-revise loop.
//!
//! ```text
//! Drafted ──judge──▶ Judged ──pass───────────▶ Accepted
//!                      │
//!                      ├─fail, count < max───▶ Revising ──revise──▶ Drafted
//!                      │
//!                      └─fail, count == max──▶ Exhausted
//! ```
//!
//! [`RevisionLoop`] only tracks state; the pipeline performs the model calls
//! and feeds the results back in.

use crate::judge::JudgeVerdict;
use crate::story::StoryDraft;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// A draft is waiting to be judged.
    Drafted,
    /// The current draft has a verdict that has not been acted on.
    Judged,
    /// The current draft failed and a revision is allowed.
    Revising,
    /// The current draft passed.
    Accepted,
    /// The current draft failed with no revisions left; it is kept as-is.
    Exhausted,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Accepted | LoopState::Exhausted)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Drafted => "drafted",
            LoopState::Judged => "judged",
            LoopState::Revising => "revising",
            LoopState::Accepted => "accepted",
            LoopState::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// How a finished loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    Exhausted,
}

/// Count of automatic revisions against its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionState {
    count: usize,
    max: usize,
}

impl RevisionState {
    pub fn new(max: usize) -> Self {
        Self { count: 0, max }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn can_revise(&self) -> bool {
        self.count < self.max
    }

    fn record(&mut self) {
        debug_assert!(self.can_revise(), "revision recorded past the cap");
        self.count = (self.count + 1).min(self.max);
    }
}

/// State of one run's revision loop.
#[derive(Debug, Clone)]
pub struct RevisionLoop {
    state: LoopState,
    revisions: RevisionState,
    draft: StoryDraft,
    verdicts: Vec<JudgeVerdict>,
}

impl RevisionLoop {
    pub fn new(draft: StoryDraft, max_revisions: usize) -> Self {
        Self {
            state: LoopState::Drafted,
            revisions: RevisionState::new(max_revisions),
            draft,
            verdicts: Vec::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn draft(&self) -> &StoryDraft {
        &self.draft
    }

    pub fn revisions(&self) -> RevisionState {
        self.revisions
    }

    /// Verdicts received so far, oldest first.
    pub fn verdicts(&self) -> &[JudgeVerdict] {
        &self.verdicts
    }

    /// Fixes the next revision should apply.
    pub fn pending_fixes(&self) -> &[String] {
        match (self.state, self.verdicts.last()) {
            (LoopState::Revising, Some(verdict)) => &verdict.fixes,
            _ => &[],
        }
    }

    /// Drafted → Judged.
    pub fn judged(&mut self, verdict: JudgeVerdict) {
        self.assert_state(LoopState::Drafted);
        self.verdicts.push(verdict);
        self.transition(LoopState::Judged);
    }

    /// Judged → Accepted | Revising | Exhausted.
    pub fn decide(&mut self) -> LoopState {
        self.assert_state(LoopState::Judged);
        let passed = self.verdicts.last().is_some_and(|v| v.passed);
        let next = if passed {
            LoopState::Accepted
        } else if self.revisions.can_revise() {
            LoopState::Revising
        } else {
            LoopState::Exhausted
        };
        self.transition(next);
        next
    }

    /// Revising → Drafted with the replacement draft.
    pub fn revised(&mut self, draft: StoryDraft) {
        self.assert_state(LoopState::Revising);
        self.revisions.record();
        self.draft = draft;
        self.transition(LoopState::Drafted);
    }

    /// The resolution, once the loop is terminal.
    pub fn resolution(&self) -> Option<Resolution> {
        match self.state {
            LoopState::Accepted => Some(Resolution::Accepted),
            LoopState::Exhausted => Some(Resolution::Exhausted),
            _ => None,
        }
    }

    /// Consume the loop, returning the kept draft and what happened.
    pub fn finish(self) -> Option<RevisionOutcome> {
        let resolution = self.resolution()?;
        Some(RevisionOutcome {
            draft: self.draft,
            resolution,
            revisions: self.revisions.count(),
            verdicts: self.verdicts,
        })
    }

    fn assert_state(&self, state: LoopState) {
        debug_assert_eq!(self.state, state, "invalid revision loop transition");
    }

    fn transition(&mut self, next: LoopState) {
        debug!(
            from = %self.state,
            to = %next,
            revisions = self.revisions.count(),
            max = self.revisions.max(),
            "revision loop"
        );
        self.state = next;
    }
}

/// What the loop settled on.
#[derive(Debug, Clone)]
pub struct RevisionOutcome {
    pub draft: StoryDraft,
    pub resolution: Resolution,
    /// Automatic revisions performed.
    pub revisions: usize,
    pub verdicts: Vec<JudgeVerdict>,
}
