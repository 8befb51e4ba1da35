use super::*;
use crate::error::{ClassifiedError, ErrorKind};

fn machine_with(content: &str, selection: Option<TextSelection>) -> ModeStateMachine {
    let mut machine = ModeStateMachine::new();
    machine.set_document(content);
    machine.update_selection(selection);
    machine
}

fn error_state(kind: ErrorKind) -> ErrorState {
    ErrorState { error: ClassifiedError::new(kind, "op", "boom"), can_retry: true, fallback_available: false }
}

// =============================================================================
// can_enter
// =============================================================================

#[test]
fn none_is_always_enterable() {
    let mut machine = machine_with("text", None);
    assert!(machine.can_enter(AssistMode::None));
    assert!(machine.enter(AssistMode::Prompt));
    assert!(machine.begin("working").is_some());
    assert!(machine.can_enter(AssistMode::None));
}

#[test]
fn prompt_needs_only_idle() {
    let machine = machine_with("", None);
    assert!(machine.can_enter(AssistMode::Prompt));
}

#[test]
fn continue_needs_content() {
    assert!(!machine_with("", None).can_enter(AssistMode::Continue));
    assert!(!machine_with("   \n", None).can_enter(AssistMode::Continue));
    assert!(machine_with("Once upon a time", None).can_enter(AssistMode::Continue));
}

#[test]
fn modify_and_analyze_need_valid_selection() {
    let none = machine_with("content", None);
    assert_eq!(none.check_entry(AssistMode::Modify), Err(EntryRefusal::InvalidSelection));

    let short = machine_with("content", Some(TextSelection::new(0, "ab")));
    assert!(!short.can_enter(AssistMode::Analyze));

    let ok = machine_with("content", Some(TextSelection::new(0, "abc")));
    assert!(ok.can_enter(AssistMode::Modify));
    assert!(ok.can_enter(AssistMode::Analyze));
}

#[test]
fn processing_blocks_every_other_mode() {
    let mut machine = machine_with("content", Some(TextSelection::new(0, "a valid selection")));
    assert!(machine.enter(AssistMode::Prompt));
    machine.begin("working");
    for mode in [AssistMode::Prompt, AssistMode::Continue, AssistMode::Modify, AssistMode::Analyze] {
        assert_eq!(machine.check_entry(mode), Err(EntryRefusal::Busy), "{mode:?}");
    }
    assert!(!machine.enter(AssistMode::Modify));
    assert_eq!(machine.mode(), AssistMode::Prompt);
}

// =============================================================================
// enter / reset
// =============================================================================

#[test]
fn entering_mode_opens_scope() {
    let mut machine = machine_with("content", None);
    assert!(machine.scope().is_none());
    assert!(machine.enter(AssistMode::Continue));
    let scope = machine.scope().expect("scope");
    assert_eq!(scope.mode(), AssistMode::Continue);
    assert!(!scope.is_cancelled());
}

#[test]
fn switching_modes_cancels_previous_scope() {
    let mut machine = machine_with("content", Some(TextSelection::new(0, "a valid selection")));
    machine.enter(AssistMode::Modify);
    let old = machine.scope().cloned().expect("scope");
    assert!(machine.enter(AssistMode::Analyze));
    assert!(old.is_cancelled());
    assert_ne!(machine.scope().map(CancellationScope::id), Some(old.id()));
}

#[test]
fn reset_cancels_in_flight_work_and_clears_error() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    let scope = machine.begin("working").expect("scope");
    machine.set_error(error_state(ErrorKind::Network));
    machine.reset();
    assert!(scope.is_cancelled());
    assert_eq!(machine.mode(), AssistMode::None);
    assert!(!machine.is_processing());
    assert!(machine.error_state().is_none());
    assert!(machine.scope().is_none());
}

#[test]
fn entering_clears_previous_error() {
    let mut machine = machine_with("content", None);
    machine.set_error(error_state(ErrorKind::Validation));
    machine.enter(AssistMode::Prompt);
    assert!(machine.error_state().is_none());
}

// =============================================================================
// Selection tracking
// =============================================================================

#[test]
fn invalidating_selection_leaves_modify() {
    let mut machine = machine_with("content", Some(TextSelection::new(0, "some words")));
    machine.enter(AssistMode::Modify);
    let scope = machine.scope().cloned().expect("scope");

    assert!(machine.update_selection(Some(TextSelection::new(0, "so"))));
    assert_eq!(machine.mode(), AssistMode::None);
    assert!(scope.is_cancelled());
}

#[test]
fn selection_change_outside_selection_modes_is_harmless() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    assert!(!machine.update_selection(None));
    assert_eq!(machine.mode(), AssistMode::Prompt);
}

#[test]
fn still_valid_selection_keeps_mode() {
    let mut machine = machine_with("content", Some(TextSelection::new(0, "some words")));
    machine.enter(AssistMode::Analyze);
    assert!(!machine.update_selection(Some(TextSelection::new(5, "other words"))));
    assert_eq!(machine.mode(), AssistMode::Analyze);
}

// =============================================================================
// Processing lifecycle
// =============================================================================

#[test]
fn begin_requires_active_mode() {
    let mut machine = ModeStateMachine::new();
    assert!(machine.begin("nothing").is_none());
}

#[test]
fn begin_sets_processing_snapshot() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    machine.begin("Generating response...");
    let processing = machine.processing();
    assert!(processing.is_processing);
    assert_eq!(processing.current_mode, AssistMode::Prompt);
    assert_eq!(processing.progress, Some(0));
    assert_eq!(processing.status_message.as_deref(), Some("Generating response..."));
}

#[test]
fn begin_twice_is_refused() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    assert!(machine.begin("one").is_some());
    assert!(machine.begin("two").is_none());
}

#[test]
fn progress_is_clamped_and_scoped() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    let scope = machine.begin("working").expect("scope");
    assert!(machine.set_progress(scope.id(), 250, Some("almost".into())));
    assert_eq!(machine.processing().progress, Some(100));
    assert_eq!(machine.processing().status_message.as_deref(), Some("almost"));
    assert!(!machine.set_progress(Uuid::new_v4(), 10, None));
}

#[test]
fn complete_returns_to_none() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Continue);
    let scope = machine.begin("working").expect("scope");
    assert!(machine.complete(scope.id(), true));
    assert_eq!(machine.mode(), AssistMode::None);
    assert!(!machine.is_processing());
    assert!(machine.is_degraded());
}

#[test]
fn stale_completion_is_ignored() {
    let mut machine = machine_with("content", Some(TextSelection::new(0, "some words")));
    machine.enter(AssistMode::Modify);
    let stale = machine.begin("working").expect("scope");
    machine.reset();
    machine.enter(AssistMode::Analyze);
    assert!(!machine.complete(stale.id(), false));
    assert!(!machine.fail(stale.id(), error_state(ErrorKind::Network)));
    assert_eq!(machine.mode(), AssistMode::Analyze);
    assert!(machine.error_state().is_none());
}

#[test]
fn recoverable_failure_keeps_mode_with_fresh_scope() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    let scope = machine.begin("working").expect("scope");
    assert!(machine.fail(scope.id(), error_state(ErrorKind::Network)));
    assert_eq!(machine.mode(), AssistMode::Prompt);
    assert!(!machine.is_processing());
    assert!(machine.error_state().is_some());
    let fresh = machine.scope().expect("scope");
    assert_ne!(fresh.id(), scope.id());
    assert!(!fresh.is_cancelled());
}

#[test]
fn critical_failure_drops_to_none_but_keeps_error() {
    let mut machine = machine_with("content", None);
    machine.enter(AssistMode::Prompt);
    let scope = machine.begin("working").expect("scope");
    assert!(machine.fail(scope.id(), error_state(ErrorKind::Authentication)));
    assert_eq!(machine.mode(), AssistMode::None);
    assert_eq!(machine.error_state().map(|e| e.error.kind), Some(ErrorKind::Authentication));
}

#[test]
fn endpoints_match_intents() {
    assert_eq!(AssistMode::Prompt.endpoint(), "submit-prompt");
    assert_eq!(AssistMode::Continue.endpoint(), "continue");
    assert_eq!(AssistMode::Modify.endpoint(), "modify");
    assert_eq!(AssistMode::Analyze.endpoint(), "analyze");
}
