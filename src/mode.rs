//! Assist-mode state machine.
//!
//! DESIGN
//! ======
//! `NONE → {PROMPT, CONTINUE, MODIFY, ANALYZE} → NONE`. Exactly one mode is
//! active. Every entry into a non-NONE mode opens a fresh
//! `CancellationScope`; leaving the mode (switch, reset, teardown) cancels
//! it before anything else happens, so a late response from the old mode can
//! always detect that it is stale.
//!
//! INVARIANTS
//! ==========
//! - No new non-NONE mode is entered while an operation is processing.
//! - MODIFY/ANALYZE hold only while the selection stays valid; a selection
//!   change that breaks validity drops the machine back to NONE.
//! - Completion and failure are applied only for the scope that is current.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cancel::CancellationScope;
use crate::error::{ClassifiedError, Severity};
use crate::selection::{self, TextSelection};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistMode {
    #[default]
    None,
    Prompt,
    Continue,
    Modify,
    Analyze,
}

impl AssistMode {
    /// Backend endpoint used by this mode's intent.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Prompt => "submit-prompt",
            Self::Continue => "continue",
            Self::Modify => "modify",
            Self::Analyze => "analyze",
        }
    }

    #[must_use]
    pub fn requires_selection(self) -> bool {
        matches!(self, Self::Modify | Self::Analyze)
    }

    /// Human-readable status shown while this mode's request runs.
    #[must_use]
    pub fn status_message(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Prompt => "Generating response...",
            Self::Continue => "Continuing your writing...",
            Self::Modify => "Rewriting selection...",
            Self::Analyze => "Analyzing document...",
        }
    }
}

/// Processing snapshot for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingState {
    pub is_processing: bool,
    pub current_mode: AssistMode,
    /// 0..=100 when known.
    pub progress: Option<u8>,
    pub status_message: Option<String>,
}

impl ProcessingState {
    #[must_use]
    pub fn idle(mode: AssistMode) -> Self {
        Self { is_processing: false, current_mode: mode, progress: None, status_message: None }
    }
}

/// A surfaced error plus what the UI may offer for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub error: ClassifiedError,
    pub can_retry: bool,
    pub fallback_available: bool,
}

/// Why `can_enter` said no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EntryRefusal {
    #[error("an operation is already in progress")]
    Busy,
    #[error("the document is empty")]
    EmptyDocument,
    #[error("a valid text selection is required")]
    InvalidSelection,
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Default)]
pub struct ModeStateMachine {
    mode: AssistMode,
    processing: ProcessingState,
    selection: Option<TextSelection>,
    has_content: bool,
    error: Option<ErrorState>,
    scope: Option<CancellationScope>,
    degraded: bool,
}

impl ModeStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> AssistMode {
        self.mode
    }

    #[must_use]
    pub fn processing(&self) -> &ProcessingState {
        &self.processing
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.is_processing
    }

    #[must_use]
    pub fn selection(&self) -> Option<&TextSelection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn has_valid_selection(&self) -> bool {
        selection::is_valid(self.selection.as_ref())
    }

    #[must_use]
    pub fn error_state(&self) -> Option<&ErrorState> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn scope(&self) -> Option<&CancellationScope> {
        self.scope.as_ref()
    }

    /// True once a fallback path produced the latest result.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Record whether the document has non-whitespace content.
    pub fn set_document(&mut self, content: &str) {
        self.has_content = !content.trim().is_empty();
    }

    // -------------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------------

    /// Entry gate, also used by the UI to enable controls.
    #[must_use]
    pub fn can_enter(&self, mode: AssistMode) -> bool {
        self.check_entry(mode).is_ok()
    }

    /// Like [`ModeStateMachine::can_enter`], naming the failed precondition.
    pub fn check_entry(&self, mode: AssistMode) -> Result<(), EntryRefusal> {
        if mode == AssistMode::None {
            return Ok(());
        }
        if self.processing.is_processing {
            return Err(EntryRefusal::Busy);
        }
        match mode {
            AssistMode::Continue if !self.has_content => Err(EntryRefusal::EmptyDocument),
            AssistMode::Modify | AssistMode::Analyze if !self.has_valid_selection() => {
                Err(EntryRefusal::InvalidSelection)
            }
            _ => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Enter `mode`. Returns `false` (and logs) when the gate refuses.
    pub fn enter(&mut self, mode: AssistMode) -> bool {
        if let Err(reason) = self.check_entry(mode) {
            warn!(from = ?self.mode, to = ?mode, %reason, "mode entry refused");
            return false;
        }
        self.cancel_scope();
        let from = self.mode;
        self.mode = mode;
        self.scope = (mode != AssistMode::None).then(|| CancellationScope::new(mode));
        self.processing = ProcessingState::idle(mode);
        self.error = None;
        info!(?from, to = ?mode, "mode entered");
        true
    }

    /// Back to NONE, cancelling in-flight work and clearing errors.
    pub fn reset(&mut self) {
        self.enter(AssistMode::None);
        self.error = None;
    }

    /// Replace the selection wholesale. Returns `true` if this dropped the mode.
    pub fn update_selection(&mut self, selection: Option<TextSelection>) -> bool {
        self.selection = selection;
        if self.mode.requires_selection() && !self.has_valid_selection() {
            info!(mode = ?self.mode, "selection no longer valid; leaving mode");
            self.reset();
            return true;
        }
        false
    }

    /// Mark the current mode as processing and hand out its scope.
    pub fn begin(&mut self, status_message: impl Into<String>) -> Option<CancellationScope> {
        if self.mode == AssistMode::None || self.processing.is_processing {
            return None;
        }
        let scope = self.scope.clone()?;
        if scope.is_cancelled() {
            return None;
        }
        self.error = None;
        self.processing = ProcessingState {
            is_processing: true,
            current_mode: self.mode,
            progress: Some(0),
            status_message: Some(status_message.into()),
        };
        Some(scope)
    }

    /// Update progress for the operation owning `scope_id`. Stale updates are ignored.
    pub fn set_progress(&mut self, scope_id: Uuid, progress: u8, status_message: Option<String>) -> bool {
        if !self.is_current(scope_id) || !self.processing.is_processing {
            return false;
        }
        self.processing.progress = Some(progress.min(100));
        if status_message.is_some() {
            self.processing.status_message = status_message;
        }
        true
    }

    /// Whether `scope_id` is the live scope.
    #[must_use]
    pub fn is_current(&self, scope_id: Uuid) -> bool {
        self.scope
            .as_ref()
            .is_some_and(|s| s.id() == scope_id && !s.is_cancelled())
    }

    /// Successful completion: back to NONE. Returns `false` for stale scopes.
    pub fn complete(&mut self, scope_id: Uuid, degraded: bool) -> bool {
        if !self.is_current(scope_id) {
            return false;
        }
        self.degraded = degraded;
        self.scope = None;
        self.mode = AssistMode::None;
        self.processing = ProcessingState::idle(AssistMode::None);
        self.error = None;
        true
    }

    /// Failed completion. Critical errors drop to NONE; others keep the mode
    /// so the user can fix input or retry. Returns `false` for stale scopes.
    pub fn fail(&mut self, scope_id: Uuid, error: ErrorState) -> bool {
        if !self.is_current(scope_id) {
            return false;
        }
        if error.error.severity == Severity::Critical {
            self.reset();
        } else {
            self.processing = ProcessingState::idle(self.mode);
            // Fresh scope so a retry in this mode is not born cancelled.
            self.scope = Some(CancellationScope::new(self.mode));
        }
        self.error = Some(error);
        true
    }

    /// Surface an error that did not come from a scoped operation.
    pub fn set_error(&mut self, error: ErrorState) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_degraded(&mut self, degraded: bool) {
        self.degraded = degraded;
    }

    fn cancel_scope(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.cancel();
        }
    }
}

#[cfg(test)]
#[path = "mode_test.rs"]
mod tests;
