//! Operation orchestrator: the façade the presentation layer talks to.
//!
//! DESIGN
//! ======
//! One intent runs as: validate input → pass the mode gate → `begin` on the
//! state machine (opens processing, hands out the scope) → emit the
//! optimistic patch → `RetryExecutor::run_tracked` under the AI policy →
//! apply, degrade, or surface.
//!
//! Every result is checked against the scope it was started under. A result
//! whose scope is no longer current (mode switch, reset, shutdown) is
//! discarded and its optimistic patch undone; it never touches state.
//!
//! LOCKING
//! =======
//! `State` sits behind a std `Mutex` that is only taken in short synchronous
//! sections and never held across an await. Patch and listener callbacks run
//! after the lock is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cancel::CancellationScope;
use crate::classifier::ErrorClassifier;
use crate::config::{PolicyTable, ResilienceConfig};
use crate::degrade::{FallbackRequest, GracefulDegradationPolicy, combined_failure};
use crate::error::{ClassifiedError, ErrorKind, RawError};
use crate::events::{ConnectivityMonitor, Listeners, Subscription};
use crate::mode::{AssistMode, EntryRefusal, ErrorState, ModeStateMachine, ProcessingState};
use crate::offline::{DrainReport, OfflineQueue, OfflineStatus};
use crate::optimistic::{DocumentPatch, NoopSink, OptimisticUpdate, PatchSink};
use crate::retry::{Attempted, RetryExecutor};
use crate::selection::{self, MAX_SELECTION_CHARS, SelectionIssue, TextSelection};
use crate::store::KeyValueStore;
use crate::transport::{Method, NetworkRequest};
use crate::types::{AssistOutcome, AssistPayload, ChangeOutcome, Intent, ModifyKind};

// =============================================================================
// BUILDER
// =============================================================================

pub struct OrchestratorBuilder {
    transport: Arc<dyn NetworkRequest>,
    store: Arc<dyn KeyValueStore>,
    config: ResilienceConfig,
    degradation: GracefulDegradationPolicy,
    sink: Arc<dyn PatchSink>,
    classifier: Arc<ErrorClassifier>,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn config(mut self, config: ResilienceConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn degradation(mut self, degradation: GracefulDegradationPolicy) -> Self {
        self.degradation = degradation;
        self
    }

    #[must_use]
    pub fn patch_sink(mut self, sink: Arc<dyn PatchSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Share an error history with other services.
    #[must_use]
    pub fn classifier(mut self, classifier: Arc<ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn build(self) -> OperationOrchestrator {
        let offline = OfflineQueue::load(self.store, self.config.offline_queue_key.clone());
        OperationOrchestrator {
            inner: Arc::new(Inner {
                transport: self.transport,
                executor: RetryExecutor::new(self.classifier),
                policies: self.config.policies,
                degradation: self.degradation,
                offline,
                sink: self.sink,
                state: Mutex::new(State::default()),
                selection_listeners: Listeners::new(),
                connectivity_listeners: Listeners::new(),
                watcher: Mutex::new(None),
            }),
        }
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

#[derive(Clone)]
pub struct OperationOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn NetworkRequest>,
    executor: RetryExecutor,
    policies: PolicyTable,
    degradation: GracefulDegradationPolicy,
    offline: OfflineQueue,
    sink: Arc<dyn PatchSink>,
    state: Mutex<State>,
    selection_listeners: Listeners<Option<TextSelection>>,
    connectivity_listeners: Listeners<bool>,
    watcher: Mutex<Option<AbortHandle>>,
}

#[derive(Default)]
struct State {
    machine: ModeStateMachine,
    document: String,
    last_intent: Option<Intent>,
    /// Attempts the last intent used before it failed.
    last_attempts: u32,
    /// At most one outstanding optimistic update per mode.
    pending: HashMap<AssistMode, OptimisticUpdate>,
}

/// What `start` hands to the running intent.
struct Launch {
    scope: CancellationScope,
    update_id: Option<Uuid>,
}

impl OperationOrchestrator {
    /// Start building an orchestrator over `transport`, persisting the offline queue in `store`.
    pub fn builder(transport: Arc<dyn NetworkRequest>, store: Arc<dyn KeyValueStore>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            transport,
            store,
            config: ResilienceConfig::default(),
            degradation: GracefulDegradationPolicy::default(),
            sink: Arc::new(NoopSink),
            classifier: Arc::new(ErrorClassifier::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, patches: Vec<DocumentPatch>) {
        for patch in &patches {
            self.inner.sink.apply(patch);
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &ErrorClassifier {
        self.inner.executor.classifier()
    }

    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.inner.policies
    }

    // -------------------------------------------------------------------------
    // State surface
    // -------------------------------------------------------------------------

    pub fn enter_mode(&self, mode: AssistMode) -> bool {
        let (entered, undos) = {
            let mut st = self.state();
            let entered = st.machine.enter(mode);
            let undos = if entered { take_undos(&mut st) } else { Vec::new() };
            (entered, undos)
        };
        self.emit(undos);
        entered
    }

    pub fn reset_mode(&self) {
        let undos = {
            let mut st = self.state();
            st.machine.reset();
            take_undos(&mut st)
        };
        self.emit(undos);
    }

    /// Replace the selection. Returns `true` if the active mode was dropped.
    pub fn update_selection(&self, selection: Option<TextSelection>) -> bool {
        let (dropped, undos) = {
            let mut st = self.state();
            let dropped = st.machine.update_selection(selection.clone());
            let undos = if dropped { take_undos(&mut st) } else { Vec::new() };
            (dropped, undos)
        };
        self.emit(undos);
        self.inner.selection_listeners.emit(&selection);
        dropped
    }

    /// Record the current document text (CONTINUE works from it).
    pub fn set_document(&self, content: impl Into<String>) {
        let mut st = self.state();
        st.document = content.into();
        let State { machine, document, .. } = &mut *st;
        machine.set_document(document.as_str());
    }

    #[must_use]
    pub fn can_enter(&self, mode: AssistMode) -> bool {
        self.state().machine.can_enter(mode)
    }

    #[must_use]
    pub fn mode(&self) -> AssistMode {
        self.state().machine.mode()
    }

    #[must_use]
    pub fn error_state(&self) -> Option<ErrorState> {
        self.state().machine.error_state().cloned()
    }

    #[must_use]
    pub fn processing_state(&self) -> ProcessingState {
        self.state().machine.processing().clone()
    }

    #[must_use]
    pub fn offline_status(&self) -> OfflineStatus {
        self.inner.offline.status()
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.state().machine.is_degraded()
    }

    pub fn on_selection_change(
        &self,
        callback: impl Fn(&Option<TextSelection>) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.selection_listeners.subscribe(callback)
    }

    pub fn on_connectivity_change(&self, callback: impl Fn(&bool) + Send + Sync + 'static) -> Subscription {
        self.inner.connectivity_listeners.subscribe(callback)
    }

    // -------------------------------------------------------------------------
    // Intent surface
    // -------------------------------------------------------------------------

    pub async fn submit_prompt(&self, text: &str, cursor: usize) -> Result<AssistOutcome, ClassifiedError> {
        self.execute(Intent::Prompt { text: text.to_string(), cursor }).await
    }

    pub async fn continue_writing(
        &self,
        cursor: usize,
        selection: Option<TextSelection>,
    ) -> Result<AssistOutcome, ClassifiedError> {
        let content = self.state().document.clone();
        self.execute(Intent::Continue { cursor, selection, content }).await
    }

    pub async fn modify_selection(
        &self,
        text: &str,
        kind: ModifyKind,
        custom_prompt: Option<String>,
    ) -> Result<AssistOutcome, ClassifiedError> {
        self.execute(Intent::Modify { text: text.to_string(), kind, custom_prompt }).await
    }

    pub async fn analyze_document(&self, content: &str) -> Result<AssistOutcome, ClassifiedError> {
        self.execute(Intent::Analyze { content: content.to_string() }).await
    }

    // -------------------------------------------------------------------------
    // Recovery surface
    // -------------------------------------------------------------------------

    /// Re-run the last recorded intent verbatim.
    pub async fn retry_last_operation(&self) -> Result<AssistOutcome, ClassifiedError> {
        let last = self.state().last_intent.clone();
        let Some(intent) = last else {
            return Err(self.reject_validation("retry", "There is no operation to retry."));
        };
        info!(operation = intent.operation(), "retrying last operation");
        self.state().machine.clear_error();
        self.execute(intent).await
    }

    pub fn clear_error(&self) {
        self.state().machine.clear_error();
    }

    /// Abandon the last intent's network path and produce its local fallback now.
    pub fn force_graceful_degradation(&self) -> Result<AssistOutcome, ClassifiedError> {
        let (intent, primary, undos) = {
            let mut st = self.state();
            let Some(intent) = st.last_intent.clone() else {
                let err = ClassifiedError::validation("degrade", "There is no operation to fall back from.");
                return Err(surface_validation(&mut st, self.classifier(), err));
            };
            if !self.inner.degradation.has_fallback(intent.operation()) {
                let err = ClassifiedError::validation(
                    intent.operation(),
                    "No offline alternative is available for this operation.",
                );
                return Err(surface_validation(&mut st, self.classifier(), err));
            }
            let primary = st.machine.error_state().map(|e| e.error.clone());
            st.machine.reset();
            (intent, primary, take_undos(&mut st))
        };
        self.emit(undos);

        let operation = intent.operation();
        let mode = intent.mode();
        let request = FallbackRequest { operation, mode, input: intent.source_text() };
        match self.inner.degradation.run_fallback(&request) {
            Some(Ok(payload)) => {
                self.state().machine.set_degraded(true);
                info!(operation, "forced graceful degradation");
                Ok(AssistOutcome { mode, payload, fallback_used: true, success: true, attempts: 0 })
            }
            Some(Err(fallback_err)) => {
                let primary = primary
                    .unwrap_or_else(|| ClassifiedError::new(ErrorKind::AiService, operation, "degradation requested"));
                let combined = combined_failure(&primary, &fallback_err);
                self.classifier().record(combined.clone());
                let mut st = self.state();
                let can_retry = self.retry_allowed(&combined, st.last_attempts);
                st.machine.set_error(ErrorState { error: combined.clone(), can_retry, fallback_available: false });
                Err(combined)
            }
            None => Err(self.reject_validation(operation, "No offline alternative is available for this operation.")),
        }
    }

    // -------------------------------------------------------------------------
    // State-mutating calls and connectivity
    // -------------------------------------------------------------------------

    /// Send a mutation now, or queue it when offline or the network fails.
    pub async fn persist_change(&self, kind: &str, payload: Value) -> Result<ChangeOutcome, ClassifiedError> {
        if !self.inner.offline.is_online() {
            let id = self.inner.offline.enqueue(kind, payload);
            return Ok(ChangeOutcome::Queued { id });
        }

        let scope = CancellationScope::detached();
        let transport = self.inner.transport.as_ref();
        let body = &payload;
        let result = self
            .inner
            .executor
            .run(kind, &self.inner.policies.general, &scope, || {
                let token = scope.token();
                async move {
                    transport
                        .request(kind, Method::Post, Some(body), &token)
                        .await
                        .map_err(gateway_as_network)
                }
            })
            .await;

        match result {
            Ok(response) => Ok(ChangeOutcome::Applied { response }),
            Err(err) if err.kind == ErrorKind::Network => {
                warn!(kind, error = %err.message, "mutation failed on network; queueing for replay");
                let id = self.inner.offline.enqueue(kind, payload);
                Ok(ChangeOutcome::Queued { id })
            }
            Err(err) => Err(err),
        }
    }

    /// Apply a connectivity report. Being online with pending entries drains the offline queue.
    pub async fn handle_connectivity_change(&self, online: bool) -> Option<DrainReport> {
        let was_online = self.inner.offline.is_online();
        self.inner.offline.set_online(online);
        if was_online != online {
            self.inner.connectivity_listeners.emit(&online);
        }
        // Any online report drains: entries restored from storage or queued
        // after a network failure never see an offline -> online edge.
        if online && !self.inner.offline.is_empty() { self.drain_offline_queue().await } else { None }
    }

    /// Replay queued mutations under the general policy.
    pub async fn drain_offline_queue(&self) -> Option<DrainReport> {
        let inner = &self.inner;
        inner
            .offline
            .drain(|op| async move {
                let scope = CancellationScope::detached();
                let transport = inner.transport.as_ref();
                inner
                    .executor
                    .run(&op.kind, &inner.policies.general, &scope, || {
                        let token = scope.token();
                        let op = &op;
                        async move { transport.request(&op.kind, Method::Post, Some(&op.payload), &token).await }
                    })
                    .await
                    .map(|_| ())
            })
            .await
    }

    /// Follow `monitor` in a background task until shutdown.
    pub fn watch_connectivity(&self, monitor: &ConnectivityMonitor) -> JoinHandle<()> {
        let mut rx = monitor.subscribe();
        let orchestrator = self.clone();
        let handle = tokio::spawn(async move {
            let initial = *rx.borrow_and_update();
            orchestrator.handle_connectivity_change(initial).await;
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                orchestrator.handle_connectivity_change(online).await;
            }
            debug!("connectivity source closed");
        });
        let mut watcher = self.inner.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = watcher.replace(handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Cancel live work, return to NONE, and stop the connectivity watcher.
    pub fn shutdown(&self) {
        self.reset_mode();
        let watcher = self.inner.watcher.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(watcher) = watcher {
            watcher.abort();
        }
        info!("orchestrator shut down");
    }

    // -------------------------------------------------------------------------
    // Intent lifecycle
    // -------------------------------------------------------------------------

    async fn execute(&self, intent: Intent) -> Result<AssistOutcome, ClassifiedError> {
        if let Err(message) = validate_intent(&intent) {
            return Err(self.reject_validation(intent.operation(), &message));
        }

        let (launch, patches) = self.start(&intent)?;
        self.emit(patches);

        let attempted: Attempted<AssistPayload> = self.run_intent(&intent, &launch.scope).await;
        match attempted.outcome {
            Ok(payload) => self.finish_success(&intent, &launch, payload, false, attempted.attempts),
            Err(err) => self.finish_failure(&intent, &launch, err, attempted.attempts),
        }
    }

    fn start(&self, intent: &Intent) -> Result<(Launch, Vec<DocumentPatch>), ClassifiedError> {
        let mode = intent.mode();
        let operation = intent.operation();
        let mut st = self.state();

        if st.machine.is_processing() {
            warn!(operation, "intent rejected: operation already in progress");
            let err = ClassifiedError::validation(operation, refusal_message(EntryRefusal::Busy));
            self.classifier().record(err.clone());
            return Err(err);
        }

        let mut patches = Vec::new();
        if st.machine.mode() != mode {
            if let Err(reason) = st.machine.check_entry(mode) {
                let err = ClassifiedError::validation(operation, refusal_message(reason));
                return Err(surface_validation(&mut st, self.classifier(), err));
            }
            st.machine.enter(mode);
            patches.extend(take_undos(&mut st));
        }

        let Some(scope) = st.machine.begin(mode.status_message()) else {
            let err = ClassifiedError::validation(operation, "The operation could not be started.");
            return Err(surface_validation(&mut st, self.classifier(), err));
        };
        st.last_intent = Some(intent.clone());
        st.last_attempts = 0;

        let update = optimistic_for(intent, st.machine.selection());
        let update_id = update.as_ref().map(|u| u.id);
        if let Some(update) = update {
            patches.push(update.forward.clone());
            if let Some(previous) = st.pending.insert(mode, update) {
                patches.insert(patches.len() - 1, previous.undo);
            }
        }

        info!(operation, scope = %scope.id(), "assist operation started");
        Ok((Launch { scope, update_id }, patches))
    }

    async fn run_intent(&self, intent: &Intent, scope: &CancellationScope) -> Attempted<AssistPayload> {
        let transport = self.inner.transport.as_ref();
        let body = intent.request_body();
        let body = &body;
        let endpoint = intent.mode().endpoint();
        self.inner
            .executor
            .run_tracked(intent.operation(), &self.inner.policies.ai_service, scope, || {
                let token = scope.token();
                async move {
                    let value = transport.request(endpoint, Method::Post, Some(body), &token).await?;
                    intent.parse_response(value)
                }
            })
            .await
    }

    fn finish_success(
        &self,
        intent: &Intent,
        launch: &Launch,
        payload: AssistPayload,
        fallback_used: bool,
        attempts: u32,
    ) -> Result<AssistOutcome, ClassifiedError> {
        let mode = intent.mode();
        let operation = intent.operation();
        let (applied, patches) = {
            let mut st = self.state();
            let update = take_update(&mut st, mode, launch.update_id);
            let applied = st.machine.complete(launch.scope.id(), fallback_used);
            let patches: Vec<DocumentPatch> = match (update, &payload) {
                (Some(update), AssistPayload::Text(generated)) if applied => vec![update.commit(generated.text.clone())],
                (Some(update), _) => vec![update.undo],
                (None, _) => Vec::new(),
            };
            (applied, patches)
        };
        self.emit(patches);

        if !applied {
            info!(operation, "discarding stale result");
            return Err(self.classifier().classify(&RawError::Cancelled, operation));
        }
        info!(operation, attempts, fallback_used, "assist operation completed");
        Ok(AssistOutcome { mode, payload, fallback_used, success: true, attempts })
    }

    fn finish_failure(
        &self,
        intent: &Intent,
        launch: &Launch,
        err: ClassifiedError,
        attempts: u32,
    ) -> Result<AssistOutcome, ClassifiedError> {
        let mode = intent.mode();
        let operation = intent.operation();

        let stale = err.is_cancelled() || !self.state().machine.is_current(launch.scope.id());
        if stale {
            let undos = {
                let mut st = self.state();
                if st.machine.is_current(launch.scope.id()) {
                    st.machine.reset();
                }
                take_update(&mut st, mode, launch.update_id).map(|u| u.undo).into_iter().collect()
            };
            self.emit(undos);
            info!(operation, "operation cancelled; result discarded");
            return Err(if err.is_cancelled() { err } else { ClassifiedError::cancelled(operation) });
        }

        let request = FallbackRequest { operation, mode, input: intent.source_text() };
        let (err, fallback_failed) = match self.inner.degradation.degrade(&err, &request) {
            Some(Ok(payload)) => {
                info!(operation, kind = ?err.kind, "degraded to local fallback");
                return self.finish_success(intent, launch, payload, true, attempts);
            }
            Some(Err(combined)) => {
                self.classifier().record(combined.clone());
                (combined, true)
            }
            None => (err, false),
        };

        let can_retry = self.retry_allowed(&err, attempts);
        let error_state = ErrorState {
            error: err.clone(),
            can_retry,
            fallback_available: !fallback_failed && self.inner.degradation.has_fallback(operation),
        };
        let undos: Vec<DocumentPatch> = {
            let mut st = self.state();
            st.last_attempts = attempts;
            st.machine.fail(launch.scope.id(), error_state);
            take_update(&mut st, mode, launch.update_id).map(|u| u.undo).into_iter().collect()
        };
        self.emit(undos);
        warn!(operation, kind = ?err.kind, attempts, can_retry, error = %err.message, "assist operation failed");
        Err(err)
    }

    /// A retry is offered while the error is retryable and the AI attempt budget was not used up.
    fn retry_allowed(&self, err: &ClassifiedError, attempts: u32) -> bool {
        err.retryable && attempts < self.inner.policies.ai_service.max_attempts
    }

    fn reject_validation(&self, operation: &str, message: &str) -> ClassifiedError {
        let err = ClassifiedError::validation(operation, message);
        let mut st = self.state();
        surface_validation(&mut st, self.classifier(), err)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn surface_validation(st: &mut State, classifier: &ErrorClassifier, err: ClassifiedError) -> ClassifiedError {
    warn!(operation = %err.operation, reason = %err.user_message, "intent rejected");
    classifier.record(err.clone());
    st.machine.set_error(ErrorState { error: err.clone(), can_retry: false, fallback_available: false });
    err
}

/// Mutation endpoints sit behind the same gateway as everything else; a 502/503/504
/// there means the backend is unreachable, not that the change was refused.
fn gateway_as_network(raw: RawError) -> RawError {
    match raw {
        RawError::Http { status: status @ 502..=504, .. } => {
            RawError::Message(format!("network gateway unavailable (HTTP {status})"))
        }
        other => other,
    }
}

fn take_undos(st: &mut State) -> Vec<DocumentPatch> {
    st.pending.drain().map(|(_, update)| update.undo).collect()
}

fn take_update(st: &mut State, mode: AssistMode, id: Option<Uuid>) -> Option<OptimisticUpdate> {
    let id = id?;
    if st.pending.get(&mode).is_some_and(|u| u.id == id) { st.pending.remove(&mode) } else { None }
}

fn optimistic_for(intent: &Intent, selection: Option<&TextSelection>) -> Option<OptimisticUpdate> {
    match intent {
        Intent::Prompt { cursor, .. } => Some(OptimisticUpdate::pending_insert(AssistMode::Prompt, *cursor)),
        Intent::Continue { cursor, .. } => Some(OptimisticUpdate::pending_insert(AssistMode::Continue, *cursor)),
        Intent::Modify { .. } => selection.map(|s| OptimisticUpdate::pending_replace(AssistMode::Modify, s)),
        Intent::Analyze { .. } => None,
    }
}

fn validate_intent(intent: &Intent) -> Result<(), String> {
    match intent {
        Intent::Prompt { text, .. } => {
            if text.trim().is_empty() {
                return Err("Please enter a prompt.".to_string());
            }
            if text.chars().count() > MAX_SELECTION_CHARS {
                return Err(format!("Prompts are limited to {MAX_SELECTION_CHARS} characters."));
            }
            Ok(())
        }
        Intent::Continue { content, selection, .. } => {
            if content.trim().is_empty() {
                return Err(refusal_message(EntryRefusal::EmptyDocument).to_string());
            }
            if let Some(selection) = selection {
                selection::validate(Some(selection)).map_err(selection_message)?;
            }
            Ok(())
        }
        Intent::Modify { text, kind, custom_prompt } => {
            selection::validate_text(text).map_err(selection_message)?;
            if *kind == ModifyKind::Custom && custom_prompt.as_deref().is_none_or(|p| p.trim().is_empty()) {
                return Err("Describe how the selection should be changed.".to_string());
            }
            Ok(())
        }
        // The selection gate already bounds the selection; the document itself has no ceiling.
        Intent::Analyze { content } => {
            if content.trim().is_empty() {
                return Err("There is no text to analyze.".to_string());
            }
            Ok(())
        }
    }
}

fn selection_message(issue: SelectionIssue) -> String {
    match issue {
        SelectionIssue::Missing | SelectionIssue::Empty => "Select some text first.".to_string(),
        SelectionIssue::TooShort => "Select at least 3 characters.".to_string(),
        SelectionIssue::TooLong => format!("Select at most {MAX_SELECTION_CHARS} characters."),
        SelectionIssue::Inconsistent => "The selection changed. Please select the text again.".to_string(),
    }
}

fn refusal_message(reason: EntryRefusal) -> &'static str {
    match reason {
        EntryRefusal::Busy => "Please wait for the current operation to finish.",
        EntryRefusal::EmptyDocument => "Add some text to your document first.",
        EntryRefusal::InvalidSelection => "Select at least 3 characters of text first.",
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
