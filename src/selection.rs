//! Text selection and the validity gate for MODIFY/ANALYZE.

use serde::{Deserialize, Serialize};

/// Below this many trimmed characters a selection is too short to transform.
pub const MIN_SELECTION_CHARS: usize = 3;

/// Backend input ceiling.
pub const MAX_SELECTION_CHARS: usize = 5000;

/// A text range in the document. Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextSelection {
    /// Build a selection starting at `start`; `end` is derived from the text.
    pub fn new(start: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        Self { start, end, text }
    }

    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Why a selection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionIssue {
    #[error("no text selected")]
    Missing,
    #[error("selection is empty")]
    Empty,
    #[error("selection must be at least 3 characters")]
    TooShort,
    #[error("selection must be at most 5000 characters")]
    TooLong,
    #[error("selection offsets do not match its text")]
    Inconsistent,
}

/// Check a selection, reporting the first problem found.
pub fn validate(selection: Option<&TextSelection>) -> Result<(), SelectionIssue> {
    let Some(selection) = selection else {
        return Err(SelectionIssue::Missing);
    };
    let len = selection.char_len();
    if selection.end < selection.start || selection.end - selection.start != len {
        return Err(SelectionIssue::Inconsistent);
    }
    validate_text(&selection.text)
}

/// Length checks alone, for text that arrives without offsets.
pub fn validate_text(text: &str) -> Result<(), SelectionIssue> {
    let trimmed = text.trim().chars().count();
    if trimmed == 0 {
        return Err(SelectionIssue::Empty);
    }
    if trimmed < MIN_SELECTION_CHARS {
        return Err(SelectionIssue::TooShort);
    }
    if text.chars().count() > MAX_SELECTION_CHARS {
        return Err(SelectionIssue::TooLong);
    }
    Ok(())
}

/// Pure predicate used both as a UI gate and as a live invariant check.
#[must_use]
pub fn is_valid(selection: Option<&TextSelection>) -> bool {
    validate(selection).is_ok()
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
