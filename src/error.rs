//! Error taxonomy: raw failures in, classified errors out.
//!
//! DESIGN
//! ======
//! `RawError` is whatever an operation or transport produced: a thrown
//! message, a non-2xx response, a timeout, or an opaque value. The
//! classifier turns it into a `ClassifiedError` carrying a fixed `ErrorKind`,
//! severity, retryability, a plain-language user message, and the recovery
//! actions the UI should offer. Classified errors are immutable once built.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// TAXONOMY
// =============================================================================

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    RateLimit,
    AiService,
    /// Input validation or content-policy rejection.
    Validation,
    Storage,
    OperationCancelled,
    Unknown,
}

/// How bad a failure is for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Actionable control rendered next to a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    Retry,
    SwitchToFallback,
    WorkOffline,
    ManualFix,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::Network,
        ErrorKind::Timeout,
        ErrorKind::Authentication,
        ErrorKind::RateLimit,
        ErrorKind::AiService,
        ErrorKind::Validation,
        ErrorKind::Storage,
        ErrorKind::OperationCancelled,
        ErrorKind::Unknown,
    ];

    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::Authentication => Severity::Critical,
            Self::Network | Self::AiService | Self::Storage => Severity::High,
            Self::Timeout | Self::RateLimit | Self::OperationCancelled | Self::Unknown => Severity::Medium,
            Self::Validation => Severity::Low,
        }
    }

    #[must_use]
    pub fn default_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::RateLimit | Self::AiService | Self::Storage)
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Network => "E_NETWORK",
            Self::Timeout => "E_TIMEOUT",
            Self::Authentication => "E_AUTHENTICATION",
            Self::RateLimit => "E_RATE_LIMIT",
            Self::AiService => "E_AI_SERVICE",
            Self::Validation => "E_VALIDATION",
            Self::Storage => "E_STORAGE",
            Self::OperationCancelled => "E_CANCELLED",
            Self::Unknown => "E_UNKNOWN",
        }
    }

    /// Plain-language message shown to the user for this kind.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Network => "Unable to reach the server. Check your internet connection.",
            Self::Timeout => "The request took too long. Please try again.",
            Self::Authentication => "Your session has expired. Please sign in again.",
            Self::RateLimit => "Too many requests right now. Please wait a moment and try again.",
            Self::AiService => "The AI service is temporarily unavailable.",
            Self::Validation => "Please check your input and try again.",
            Self::Storage => "Your changes could not be saved locally.",
            Self::OperationCancelled => "The operation was cancelled.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn default_recovery_actions(self) -> Vec<RecoveryAction> {
        match self {
            Self::Network => vec![RecoveryAction::Retry, RecoveryAction::WorkOffline],
            Self::Timeout | Self::Storage => vec![RecoveryAction::Retry],
            Self::RateLimit | Self::AiService => vec![RecoveryAction::Retry, RecoveryAction::SwitchToFallback],
            Self::Authentication | Self::Validation | Self::Unknown => vec![RecoveryAction::ManualFix],
            Self::OperationCancelled => Vec::new(),
        }
    }
}

// =============================================================================
// RAW FAILURES
// =============================================================================

/// An uncategorized failure produced by an operation or transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RawError {
    /// A thrown error or string message.
    #[error("{0}")]
    Message(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The attempt exceeded its time ceiling.
    #[error("operation timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// A success response was missing required fields.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A non-error value was thrown. Strings are treated as messages.
    #[error("non-error value thrown: {0}")]
    Opaque(serde_json::Value),
}

impl RawError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

impl ErrorCode for RawError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Message(_) => "E_RAW_MESSAGE",
            Self::Http { .. } => "E_RAW_HTTP",
            Self::Timeout { .. } => "E_RAW_TIMEOUT",
            Self::Cancelled => "E_RAW_CANCELLED",
            Self::MalformedResponse(_) => "E_RAW_MALFORMED",
            Self::Opaque(_) => "E_RAW_OPAQUE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Http { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// CLASSIFIED ERROR
// =============================================================================

/// A failure normalized into the taxonomy. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{operation}: {message}")]
pub struct ClassifiedError {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Technical detail, retained for diagnostics.
    pub message: String,
    pub user_message: String,
    pub retryable: bool,
    pub operation: String,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub recovery_actions: Vec<RecoveryAction>,
}

impl ClassifiedError {
    /// Build an error with the kind's defaults.
    pub fn new(kind: ErrorKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            user_message: kind.user_message().to_string(),
            retryable: kind.default_retryable(),
            operation: operation.into(),
            timestamp: now_ms(),
            recovery_actions: kind.default_recovery_actions(),
        }
    }

    /// Validation failure raised before any network call.
    pub fn validation(operation: impl Into<String>, user_message: impl Into<String>) -> Self {
        let user_message = user_message.into();
        Self { user_message: user_message.clone(), ..Self::new(ErrorKind::Validation, operation, user_message) }
    }

    #[must_use]
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationCancelled, operation, "operation cancelled")
    }

    #[must_use]
    pub fn with_user_message(self, user_message: impl Into<String>) -> Self {
        Self { user_message: user_message.into(), ..self }
    }

    #[must_use]
    pub fn with_recovery_actions(self, recovery_actions: Vec<RecoveryAction>) -> Self {
        Self { recovery_actions, ..self }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::OperationCancelled
    }
}

impl ErrorCode for ClassifiedError {
    fn error_code(&self) -> &'static str {
        self.kind.code()
    }

    fn retryable(&self) -> bool {
        self.retryable
    }
}

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
