//! countrycache - offline-first sync core for a countries desktop app.
//!
//! Fetches the country dataset from restcountries.com when the network is
//! up, mirrors it into a local SQLite store and a flag-image directory,
//! and serves the cached copy when it is not. The presentation layer
//! (whatever renders lists and charts) calls [`SyncOrchestrator::run`] and
//! displays the returned records; everything else is internal policy:
//!
//! - [`api`]: connectivity probe and the dataset fetch.
//! - [`store`]: single-table SQLite cache with atomic full-replace.
//! - [`cache`]: best-effort flag image downloads, keyed by country name.
//! - [`sync`]: the probe -> fetch-or-fallback -> normalize orchestration.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod sync;

pub use config::Config;
pub use models::Country;
pub use sync::{CancelToken, DataSource, SyncOrchestrator, SyncOutcome};
