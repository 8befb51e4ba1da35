//! Graceful degradation: local fallbacks for failed AI calls.
//!
//! DESIGN
//! ======
//! Fallbacks are registered per operation name and run locally and
//! synchronously, with no network dependency. Degradation triggers only
//! for `AiService` and `RateLimit` failures, and only when the failed
//! operation has a fallback; every other error is surfaced as-is. If the
//! fallback fails too, both causes are folded into one combined error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use crate::error::{ClassifiedError, ErrorKind, RecoveryAction};
use crate::heuristic;
use crate::mode::AssistMode;
use crate::types::AssistPayload;

/// Input handed to a fallback.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRequest<'a> {
    pub operation: &'a str,
    pub mode: AssistMode,
    pub input: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FallbackError(pub String);

/// A reduced-capability, locally computed path for one operation.
pub trait Fallback: Send + Sync {
    fn run(&self, request: &FallbackRequest<'_>) -> Result<AssistPayload, FallbackError>;
}

impl<F> Fallback for F
where
    F: Fn(&FallbackRequest<'_>) -> Result<AssistPayload, FallbackError> + Send + Sync,
{
    fn run(&self, request: &FallbackRequest<'_>) -> Result<AssistPayload, FallbackError> {
        self(request)
    }
}

/// Heuristic document analysis as the ANALYZE fallback.
pub struct HeuristicAnalysis;

impl Fallback for HeuristicAnalysis {
    fn run(&self, request: &FallbackRequest<'_>) -> Result<AssistPayload, FallbackError> {
        if request.input.trim().is_empty() {
            return Err(FallbackError("no text to analyze".into()));
        }
        Ok(AssistPayload::Analysis(heuristic::analyze(request.input)))
    }
}

// =============================================================================
// POLICY
// =============================================================================

pub struct GracefulDegradationPolicy {
    fallbacks: HashMap<String, Arc<dyn Fallback>>,
    trigger_kinds: HashSet<ErrorKind>,
}

impl Default for GracefulDegradationPolicy {
    /// Heuristic analysis registered for `analyze`.
    fn default() -> Self {
        let mut policy = Self::empty();
        policy.register(AssistMode::Analyze.endpoint(), HeuristicAnalysis);
        policy
    }
}

impl GracefulDegradationPolicy {
    /// No fallbacks registered.
    #[must_use]
    pub fn empty() -> Self {
        Self { fallbacks: HashMap::new(), trigger_kinds: [ErrorKind::AiService, ErrorKind::RateLimit].into() }
    }

    pub fn register(&mut self, operation: impl Into<String>, fallback: impl Fallback + 'static) {
        self.fallbacks.insert(operation.into(), Arc::new(fallback));
    }

    #[must_use]
    pub fn has_fallback(&self, operation: &str) -> bool {
        self.fallbacks.contains_key(operation)
    }

    /// Whether `error` from `operation` should degrade rather than surface.
    #[must_use]
    pub fn should_degrade(&self, error: &ClassifiedError, operation: &str) -> bool {
        self.trigger_kinds.contains(&error.kind) && self.has_fallback(operation)
    }

    /// Run the fallback for `request.operation`. `None` when none is registered.
    pub fn run_fallback(&self, request: &FallbackRequest<'_>) -> Option<Result<AssistPayload, FallbackError>> {
        let fallback = self.fallbacks.get(request.operation)?;
        info!(operation = request.operation, mode = ?request.mode, "running local fallback");
        Some(fallback.run(request))
    }

    /// Degrade after `error`: the fallback payload, or a combined failure.
    /// `None` when the policy does not apply to this error.
    pub fn degrade(
        &self,
        error: &ClassifiedError,
        request: &FallbackRequest<'_>,
    ) -> Option<Result<AssistPayload, ClassifiedError>> {
        if !self.should_degrade(error, request.operation) {
            return None;
        }
        info!(operation = request.operation, kind = ?error.kind, "degrading to local fallback");
        let result = self.run_fallback(request)?;
        Some(result.map_err(|fallback_err| combined_failure(error, &fallback_err)))
    }
}

/// One error naming both the primary and the fallback cause.
#[must_use]
pub fn combined_failure(primary: &ClassifiedError, fallback: &FallbackError) -> ClassifiedError {
    ClassifiedError {
        message: format!("{}; fallback also failed: {fallback}", primary.message),
        user_message: format!("{} The offline alternative is unavailable as well.", primary.user_message),
        recovery_actions: primary
            .recovery_actions
            .iter()
            .copied()
            .filter(|a| *a != RecoveryAction::SwitchToFallback)
            .collect(),
        ..ClassifiedError::new(primary.kind, primary.operation.clone(), String::new())
    }
}
