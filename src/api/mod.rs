//! HTTP-facing side of the sync core.
//!
//! This module provides the `ApiClient` for fetching the country dataset
//! from restcountries.com, plus a lightweight connectivity probe used to
//! decide between the remote and local paths.
//!
//! Neither the client nor the probe retries: the retry policy (fall back
//! to the local store) lives in the orchestrator.

pub mod client;
pub mod error;
pub mod probe;

pub use client::ApiClient;
pub use error::FetchError;
pub use probe::{probe, ProbeResult};
