//! Retry executor: timeout-bounded, cancellable, classified retries.
//!
//! DESIGN
//! ======
//! One executor serves every call site; behavior differs only by the
//! `RetryPolicy` passed in. Each attempt races the operation against the
//! policy timeout and the scope's cancellation. Failures are classified and
//! retried with exponential backoff while the error is retryable, the policy
//! accepts its kind, and attempts remain.
//!
//! Delay before attempt `n + 1` is `min(base * multiplier^(n-1), cap)` where
//! `cap` is `rate_limit_max_delay` for RateLimit errors and `max_delay`
//! otherwise. Cancellation is terminal and never retried.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cancel::CancellationScope;
use crate::classifier::ErrorClassifier;
use crate::error::{ClassifiedError, ErrorKind, RawError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// POLICY
// =============================================================================

/// Immutable retry configuration for one operation class.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub name: &'static str,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Ceiling applied to RateLimit backoff instead of `max_delay`.
    pub rate_limit_max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Per-attempt time ceiling.
    pub timeout: Duration,
    pub retryable_kinds: HashSet<ErrorKind>,
}

impl RetryPolicy {
    /// Policy for general calls (persistence, search, replay).
    #[must_use]
    pub fn general() -> Self {
        Self {
            name: "general",
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            rate_limit_max_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            timeout: DEFAULT_TIMEOUT,
            retryable_kinds: default_retryable_kinds(),
        }
    }

    /// Policy for AI-backed calls: longer cooldowns, same attempt budget.
    #[must_use]
    pub fn ai_service() -> Self {
        Self {
            name: "ai_service",
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(15_000),
            rate_limit_max_delay: Duration::from_millis(60_000),
            backoff_multiplier: 2.0,
            timeout: DEFAULT_TIMEOUT,
            retryable_kinds: default_retryable_kinds(),
        }
    }

    /// Whether this policy retries errors of `kind` at all.
    #[must_use]
    pub fn retries_kind(&self, kind: ErrorKind) -> bool {
        self.retryable_kinds.contains(&kind)
    }

    /// Backoff ceiling for errors of `kind`.
    #[must_use]
    pub fn cap_for(&self, kind: ErrorKind) -> Duration {
        if kind == ErrorKind::RateLimit {
            self.rate_limit_max_delay.max(self.max_delay)
        } else {
            self.max_delay
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32, kind: ErrorKind) -> Duration {
        let cap = self.cap_for(kind);
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let secs = self.base_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= cap.as_secs_f64() {
            return cap;
        }
        Duration::from_secs_f64(secs)
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

fn default_retryable_kinds() -> HashSet<ErrorKind> {
    [ErrorKind::Network, ErrorKind::Timeout, ErrorKind::RateLimit, ErrorKind::AiService, ErrorKind::Storage]
        .into_iter()
        .collect()
}

// =============================================================================
// EXECUTOR
// =============================================================================

/// Outcome of a run plus the number of attempts actually made.
#[derive(Debug)]
pub struct Attempted<T> {
    pub outcome: Result<T, ClassifiedError>,
    pub attempts: u32,
}

#[derive(Clone)]
pub struct RetryExecutor {
    classifier: Arc<ErrorClassifier>,
}

impl RetryExecutor {
    #[must_use]
    pub fn new(classifier: Arc<ErrorClassifier>) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn classifier(&self) -> &Arc<ErrorClassifier> {
        &self.classifier
    }

    /// Run `op` under `policy`, returning its value or the final classified error.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        policy: &RetryPolicy,
        scope: &CancellationScope,
        op: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RawError>>,
    {
        self.run_tracked(operation, policy, scope, op)
            .await
            .outcome
    }

    /// Like [`RetryExecutor::run`], also reporting how many attempts ran.
    pub async fn run_tracked<T, F, Fut>(
        &self,
        operation: &str,
        policy: &RetryPolicy,
        scope: &CancellationScope,
        mut op: F,
    ) -> Attempted<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RawError>>,
    {
        let budget = policy.attempt_budget();
        let mut attempt: u32 = 1;

        loop {
            if scope.is_cancelled() {
                return self.cancelled(operation, attempt - 1);
            }

            let result = tokio::select! {
                biased;
                () = scope.cancelled() => Err(RawError::Cancelled),
                res = tokio::time::timeout(policy.timeout, op()) => match res {
                    Ok(inner) => inner,
                    Err(_) => Err(RawError::Timeout { after_ms: duration_ms(policy.timeout) }),
                },
            };

            let raw = match result {
                Ok(value) => return Attempted { outcome: Ok(value), attempts: attempt },
                Err(raw) => raw,
            };

            let err = self.classifier.classify(&raw, operation);
            if err.is_cancelled() {
                info!(operation, attempt, "operation cancelled");
                return Attempted { outcome: Err(err), attempts: attempt };
            }

            if !err.retryable || !policy.retries_kind(err.kind) {
                warn!(operation, attempt, kind = ?err.kind, error = %err.message, "non-retryable failure");
                return Attempted { outcome: Err(err), attempts: attempt };
            }

            if attempt >= budget {
                warn!(
                    operation,
                    attempts = attempt,
                    policy = policy.name,
                    kind = ?err.kind,
                    error = %err.message,
                    "retries exhausted"
                );
                return Attempted { outcome: Err(err), attempts: attempt };
            }

            let delay = policy.delay_for(attempt, err.kind);
            warn!(
                operation,
                attempt,
                total = budget,
                delay_ms = duration_ms(delay),
                kind = ?err.kind,
                error = %err.message,
                "attempt failed; retrying"
            );
            if !scope.sleep(delay).await {
                return self.cancelled(operation, attempt);
            }
            attempt += 1;
        }
    }

    fn cancelled<T>(&self, operation: &str, attempts: u32) -> Attempted<T> {
        info!(operation, attempts, "operation cancelled");
        let err = self.classifier.classify(&RawError::Cancelled, operation);
        Attempted { outcome: Err(err), attempts }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
