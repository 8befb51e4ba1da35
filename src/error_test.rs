use super::*;

// =============================================================================
// ErrorKind defaults
// =============================================================================

#[test]
fn default_table_matches_taxonomy() {
    let expected = [
        (ErrorKind::Network, Severity::High, true),
        (ErrorKind::Timeout, Severity::Medium, true),
        (ErrorKind::Authentication, Severity::Critical, false),
        (ErrorKind::RateLimit, Severity::Medium, true),
        (ErrorKind::AiService, Severity::High, true),
        (ErrorKind::Storage, Severity::High, true),
        (ErrorKind::Validation, Severity::Low, false),
        (ErrorKind::OperationCancelled, Severity::Medium, false),
        (ErrorKind::Unknown, Severity::Medium, false),
    ];
    for (kind, severity, retryable) in expected {
        assert_eq!(kind.default_severity(), severity, "{kind:?}");
        assert_eq!(kind.default_retryable(), retryable, "{kind:?}");
    }
}

#[test]
fn codes_are_unique() {
    let mut codes: Vec<&str> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), ErrorKind::ALL.len());
}

#[test]
fn cancelled_offers_no_recovery() {
    assert!(
        ErrorKind::OperationCancelled
            .default_recovery_actions()
            .is_empty()
    );
}

#[test]
fn fallback_kinds_offer_switch() {
    assert!(
        ErrorKind::AiService
            .default_recovery_actions()
            .contains(&RecoveryAction::SwitchToFallback)
    );
    assert!(
        ErrorKind::RateLimit
            .default_recovery_actions()
            .contains(&RecoveryAction::SwitchToFallback)
    );
    assert!(
        !ErrorKind::Network
            .default_recovery_actions()
            .contains(&RecoveryAction::SwitchToFallback)
    );
}

// =============================================================================
// ClassifiedError
// =============================================================================

#[test]
fn new_uses_kind_defaults() {
    let err = ClassifiedError::new(ErrorKind::Network, "submit-prompt", "fetch failed");
    assert_eq!(err.severity, Severity::High);
    assert!(err.retryable);
    assert_eq!(err.operation, "submit-prompt");
    assert_eq!(err.user_message, ErrorKind::Network.user_message());
    assert!(err.timestamp > 0);
    assert_eq!(err.to_string(), "submit-prompt: fetch failed");
}

#[test]
fn validation_carries_custom_user_message() {
    let err = ClassifiedError::validation("submit-prompt", "Prompt cannot be empty");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.user_message, "Prompt cannot be empty");
    assert!(!err.retryable);
}

#[test]
fn error_code_delegates_to_kind() {
    let err = ClassifiedError::new(ErrorKind::RateLimit, "analyze", "429");
    assert_eq!(err.error_code(), "E_RATE_LIMIT");
    assert!(ErrorCode::retryable(&err));
}

#[test]
fn classified_error_serde_round_trip() {
    let err = ClassifiedError::new(ErrorKind::Storage, "persist", "quota");
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"kind\":\"storage\""));
    let restored: ClassifiedError = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, err);
}

// =============================================================================
// RawError
// =============================================================================

#[test]
fn raw_error_retryable_statuses() {
    assert!(RawError::Http { status: 503, body: String::new() }.retryable());
    assert!(RawError::Http { status: 429, body: String::new() }.retryable());
    assert!(!RawError::Http { status: 401, body: String::new() }.retryable());
    assert!(RawError::Timeout { after_ms: 10 }.retryable());
    assert!(!RawError::Cancelled.retryable());
}

#[test]
fn raw_error_display() {
    assert_eq!(RawError::message("boom").to_string(), "boom");
    assert_eq!(RawError::Http { status: 500, body: "oops".into() }.to_string(), "HTTP 500: oops");
    assert_eq!(RawError::Timeout { after_ms: 30_000 }.to_string(), "operation timed out after 30000ms");
}
