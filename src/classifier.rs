//! Error classifier: raw failure to `ClassifiedError`, plus bounded history.
//!
//! DESIGN
//! ======
//! Classification is pattern matching over the HTTP status (when present)
//! and the lowercased message, checked in priority order:
//! Authentication > RateLimit > Timeout/Cancellation > Network > AiService
//! > Storage > Validation > Unknown. The first tier that matches wins, so
//! the same input always lands on the same kind.
//!
//! Every classified error is pushed to the front of an `ErrorHistory` ring
//! (capacity 50, most-recent-first). The history belongs to one classifier
//! instance; there is no module-level state.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{ClassifiedError, ErrorKind, RawError, Severity};

pub const ERROR_HISTORY_CAPACITY: usize = 50;

/// Message used for thrown values that are neither errors nor strings.
pub const OPAQUE_FAILURE_MESSAGE: &str = "An unexpected non-error value was thrown";

const AUTH_PATTERNS: &[&str] = &[
    "unauthorized",
    "unauthenticated",
    "not authenticated",
    "authentication",
    "forbidden",
    "api key",
    "jwt",
    "session expired",
    "invalid token",
];
const RATE_LIMIT_PATTERNS: &[&str] = &["rate limit", "rate-limit", "too many requests", "quota", "throttl"];
const TIMEOUT_PATTERNS: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const CANCEL_PATTERNS: &[&str] = &["abort", "cancelled", "canceled"];
const NETWORK_PATTERNS: &[&str] = &[
    "network",
    "failed to fetch",
    "fetch failed",
    "connection",
    "offline",
    "econnrefused",
    "econnreset",
    "dns",
    "unreachable",
];
const AI_SERVICE_PATTERNS: &[&str] = &[
    "ai service",
    "openai",
    "anthropic",
    "model",
    "completion",
    "generation",
    "overloaded",
    "service unavailable",
    "bad gateway",
];
const STORAGE_PATTERNS: &[&str] = &["storage", "database", "persist", "disk", "indexeddb", "write failed"];
const VALIDATION_PATTERNS: &[&str] =
    &["validation", "invalid", "required", "too short", "too long", "empty", "content policy", "not allowed"];

// =============================================================================
// OVERRIDES
// =============================================================================

/// Call-site overrides for the kind's default severity and retryability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub severity: Option<Severity>,
    pub retryable: Option<bool>,
}

// =============================================================================
// PURE CLASSIFICATION
// =============================================================================

/// Decide the kind for a raw failure. Pure and total.
#[must_use]
pub fn classify_kind(raw: &RawError) -> ErrorKind {
    match raw {
        RawError::Timeout { .. } => ErrorKind::Timeout,
        RawError::Cancelled => ErrorKind::OperationCancelled,
        RawError::MalformedResponse(_) => ErrorKind::AiService,
        RawError::Http { status, body } => classify_status(*status).unwrap_or_else(|| classify_message(body)),
        RawError::Message(msg) => classify_message(msg),
        RawError::Opaque(serde_json::Value::String(msg)) => classify_message(msg),
        RawError::Opaque(_) => ErrorKind::Unknown,
    }
}

fn classify_status(status: u16) -> Option<ErrorKind> {
    match status {
        401 | 403 => Some(ErrorKind::Authentication),
        429 => Some(ErrorKind::RateLimit),
        408 | 504 => Some(ErrorKind::Timeout),
        500..=599 => Some(ErrorKind::AiService),
        400 | 413 | 422 => Some(ErrorKind::Validation),
        _ => None,
    }
}

fn classify_message(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    let matches = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if matches(AUTH_PATTERNS) {
        ErrorKind::Authentication
    } else if matches(RATE_LIMIT_PATTERNS) {
        ErrorKind::RateLimit
    } else if matches(TIMEOUT_PATTERNS) {
        ErrorKind::Timeout
    } else if matches(CANCEL_PATTERNS) {
        ErrorKind::OperationCancelled
    } else if matches(NETWORK_PATTERNS) {
        ErrorKind::Network
    } else if matches(AI_SERVICE_PATTERNS) {
        ErrorKind::AiService
    } else if matches(STORAGE_PATTERNS) {
        ErrorKind::Storage
    } else if matches(VALIDATION_PATTERNS) {
        ErrorKind::Validation
    } else {
        ErrorKind::Unknown
    }
}

fn technical_message(raw: &RawError) -> String {
    match raw {
        RawError::Opaque(serde_json::Value::String(msg)) => msg.clone(),
        RawError::Opaque(_) => OPAQUE_FAILURE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Classifies failures and records them in a bounded history.
#[derive(Debug, Default)]
pub struct ErrorClassifier {
    history: Mutex<VecDeque<ClassifiedError>>,
}

impl ErrorClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self { history: Mutex::new(VecDeque::with_capacity(ERROR_HISTORY_CAPACITY)) }
    }

    /// Classify with the kind's defaults and record the result.
    pub fn classify(&self, raw: &RawError, operation: &str) -> ClassifiedError {
        self.classify_with(raw, operation, Overrides::default())
    }

    /// Classify, apply call-site overrides, and record the result.
    pub fn classify_with(&self, raw: &RawError, operation: &str, overrides: Overrides) -> ClassifiedError {
        let kind = classify_kind(raw);
        let mut classified = ClassifiedError::new(kind, operation, technical_message(raw));
        if let Some(severity) = overrides.severity {
            classified.severity = severity;
        }
        if let Some(retryable) = overrides.retryable {
            classified.retryable = retryable;
        }
        debug!(operation, kind = ?kind, retryable = classified.retryable, "classified failure");
        self.record(classified.clone());
        classified
    }

    /// Append an already-classified error (e.g. validation or combined failures).
    pub fn record(&self, error: ClassifiedError) {
        let mut history = self
            .history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        history.push_front(error);
        history.truncate(ERROR_HISTORY_CAPACITY);
    }

    /// Snapshot of the history, most-recent-first.
    #[must_use]
    pub fn history(&self) -> Vec<ClassifiedError> {
        self.recent(ERROR_HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<ClassifiedError> {
        let history = self
            .history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        history.iter().take(n).cloned().collect()
    }

    #[must_use]
    pub fn counts_by_kind(&self) -> HashMap<ErrorKind, usize> {
        let history = self
            .history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut counts = HashMap::new();
        for err in history.iter() {
            *counts.entry(err.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear_history(&self) {
        self.history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
