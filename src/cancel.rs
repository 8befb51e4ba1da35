//! Cancellation scopes: one per non-NONE mode entry.
//!
//! A scope wraps a `tokio_util` cancellation token. Leaving the mode cancels
//! the scope; in-flight work observes it cooperatively, both the retry loop
//! (which stops attempting) and the transport (which aborts the request).
//! Work that completes after its scope was cancelled must discard its result.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::mode::AssistMode;

#[derive(Debug, Clone)]
pub struct CancellationScope {
    id: Uuid,
    mode: AssistMode,
    token: CancellationToken,
}

impl CancellationScope {
    #[must_use]
    pub fn new(mode: AssistMode) -> Self {
        Self { id: Uuid::new_v4(), mode, token: CancellationToken::new() }
    }

    /// A scope that is never cancelled by mode changes (background work).
    #[must_use]
    pub fn detached() -> Self {
        Self::new(AssistMode::None)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> AssistMode {
        self.mode
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the scope is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Token handed to the network layer.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Sleep for `duration`, returning `false` if cancelled first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.token.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scope_is_live() {
        let scope = CancellationScope::new(AssistMode::Prompt);
        assert!(!scope.is_cancelled());
        assert_eq!(scope.mode(), AssistMode::Prompt);
    }

    #[test]
    fn cancel_is_visible_through_clones_and_tokens() {
        let scope = CancellationScope::new(AssistMode::Modify);
        let clone = scope.clone();
        let token = scope.token();
        scope.cancel();
        assert!(clone.is_cancelled());
        assert!(token.is_cancelled());
        assert_eq!(clone.id(), scope.id());
    }

    #[test]
    fn scopes_are_independent() {
        let a = CancellationScope::new(AssistMode::Prompt);
        let b = CancellationScope::new(AssistMode::Prompt);
        a.cancel();
        assert!(!b.is_cancelled());
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_completes_when_live() {
        let scope = CancellationScope::detached();
        assert!(scope.sleep(Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_aborts_on_cancel() {
        let scope = CancellationScope::new(AssistMode::Analyze);
        let canceller = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        assert!(!scope.sleep(Duration::from_secs(60)).await);
    }
}
