//! Resilience and mode coordination for AI-assisted writing.
//!
//! The presentation layer talks to one [`OperationOrchestrator`]. It owns the
//! assist-mode state machine, runs every AI intent through validation, retry,
//! cancellation and graceful degradation, and queues state-mutating calls
//! while the client is offline. Transport and persistence are traits so the
//! host can supply its own.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`orchestrator`] | Facade: intents, recovery, connectivity |
//! | [`mode`] | Assist-mode state machine and processing/error state |
//! | [`error`] | Error taxonomy and the classified error record |
//! | [`classifier`] | Raw failure to [`ClassifiedError`], bounded history |
//! | [`selection`] | Text-selection validation |
//! | [`retry`] | Retry policies and the retry executor |
//! | [`cancel`] | Cancellation scopes tied to a mode |
//! | [`degrade`] | Local fallbacks for failed AI calls |
//! | [`heuristic`] | Heuristic document analysis used as a fallback |
//! | [`offline`] | Persistent offline queue and replay |
//! | [`optimistic`] | Optimistic document patches with undo |
//! | [`events`] | Listener registry and connectivity monitor |
//! | [`transport`] | Network request trait and its reqwest implementation |
//! | [`store`] | Key-value persistence (memory and file backed) |
//! | [`types`] | Intents, payloads and outcomes |
//! | [`config`] | Environment-driven configuration |

pub mod cancel;
pub mod classifier;
pub mod config;
pub mod degrade;
pub mod error;
pub mod events;
pub mod heuristic;
pub mod mode;
pub mod offline;
pub mod optimistic;
pub mod orchestrator;
pub mod retry;
pub mod selection;
pub mod store;
pub mod transport;
pub mod types;

pub use cancel::CancellationScope;
pub use classifier::ErrorClassifier;
pub use config::{ConfigError, HttpConfig, ResilienceConfig};
pub use degrade::GracefulDegradationPolicy;
pub use error::{ClassifiedError, ErrorKind, RawError, RecoveryAction, Severity};
pub use events::ConnectivityMonitor;
pub use mode::{AssistMode, ErrorState, ModeStateMachine, ProcessingState};
pub use offline::{OfflineQueue, OfflineStatus};
pub use orchestrator::{OperationOrchestrator, OrchestratorBuilder};
pub use retry::{RetryExecutor, RetryPolicy};
pub use selection::TextSelection;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{HttpTransport, NetworkRequest};
pub use types::{AssistOutcome, AssistPayload, ChangeOutcome, Intent, ModifyKind};
