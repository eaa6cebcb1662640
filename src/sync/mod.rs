//! The sync cycle: probe, fetch-or-fallback, normalize, cache assets.
//!
//! `SyncOrchestrator` is the only component allowed to rewrite the local
//! store; the presentation layer just consumes the `SyncOutcome` it
//! returns.

pub mod cancel;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use orchestrator::{
    DataSource, ProgressFn, SyncError, SyncOrchestrator, SyncOutcome,
};
