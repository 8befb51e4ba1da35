//! Optimistic document patches with their own undo payload.
//!
//! An `OptimisticUpdate` is a value: the patch applied on submit plus the
//! patch that reverses it. The orchestrator emits `forward` immediately,
//! then either `commit`s (replacing the placeholder with the real result) or
//! emits `undo`. Updates are never edited in place.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::AssistMode;
use crate::selection::TextSelection;

/// Text shown in place of a pending result.
pub const PENDING_PLACEHOLDER: &str = "[generating...]";

/// Replace characters `start..end` with `text`. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl DocumentPatch {
    #[must_use]
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self { start: at, end: at, text: text.into() }
    }

    #[must_use]
    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self { start, end, text: text.into() }
    }

    /// Apply to `document`. `None` if the range is out of bounds.
    #[must_use]
    pub fn apply(&self, document: &str) -> Option<String> {
        if self.start > self.end {
            return None;
        }
        let start = char_to_byte(document, self.start)?;
        let end = char_to_byte(document, self.end)?;
        let mut out = String::with_capacity(document.len() + self.text.len());
        out.push_str(&document[..start]);
        out.push_str(&self.text);
        out.push_str(&document[end..]);
        Some(out)
    }

    fn inserted_end(&self) -> usize {
        self.start + self.text.chars().count()
    }
}

fn char_to_byte(s: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(0);
    }
    match s.char_indices().nth(chars) {
        Some((byte, _)) => Some(byte),
        None if s.chars().count() == chars => Some(s.len()),
        None => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimisticUpdate {
    pub id: Uuid,
    pub mode: AssistMode,
    pub forward: DocumentPatch,
    pub undo: DocumentPatch,
}

impl OptimisticUpdate {
    /// Build from a forward patch and the text it overwrites.
    #[must_use]
    pub fn new(mode: AssistMode, forward: DocumentPatch, replaced: impl Into<String>) -> Self {
        let undo = DocumentPatch::replace(forward.start, forward.inserted_end(), replaced);
        Self { id: Uuid::new_v4(), mode, forward, undo }
    }

    /// Placeholder inserted at `cursor`.
    #[must_use]
    pub fn pending_insert(mode: AssistMode, cursor: usize) -> Self {
        Self::new(mode, DocumentPatch::insert(cursor, PENDING_PLACEHOLDER), "")
    }

    /// Placeholder replacing `selection`.
    #[must_use]
    pub fn pending_replace(mode: AssistMode, selection: &TextSelection) -> Self {
        Self::new(
            mode,
            DocumentPatch::replace(selection.start, selection.end, PENDING_PLACEHOLDER),
            selection.text.clone(),
        )
    }

    /// Patch that swaps the placeholder for the final `text`.
    #[must_use]
    pub fn commit(&self, text: impl Into<String>) -> DocumentPatch {
        DocumentPatch::replace(self.forward.start, self.forward.inserted_end(), text)
    }
}

/// Receives patches for the presentation layer.
pub trait PatchSink: Send + Sync {
    fn apply(&self, patch: &DocumentPatch);
}

/// Discards every patch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl PatchSink for NoopSink {
    fn apply(&self, _patch: &DocumentPatch) {}
}
