//! Top-level sync policy: probe connectivity, fetch from the API or fall
//! back to the local store, normalize, and schedule flag caching.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task;
use tracing::{debug, info, warn};

use crate::api::{probe, ApiClient};
use crate::cache::FlagCache;
use crate::config::Config;
use crate::models::Country;
use crate::store::{CountryStore, StoreError};

use super::CancelToken;

/// Progress callback, invoked with percentages in [0, 100]. Reports are
/// monotonic: the orchestrator never walks a loading indicator backwards.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Delay between synthetic ramp steps while probing, so the indicator
/// visibly moves before any real progress exists.
const RAMP_STEP_MS: u64 = 10;

/// Progress level once the remote fetch has landed; the store replace
/// fills the remaining half of the bar.
const PROGRESS_FETCHED: u8 = 50;

/// Where the records of a completed sync cycle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    LocalCache,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Remote => write!(f, "remote"),
            DataSource::LocalCache => write!(f, "local cache"),
        }
    }
}

/// Terminal state of a sync cycle.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Records are ready for display, sorted by name. When `source` is
    /// `Remote` the store replace is already durable, but flag downloads
    /// may still be in flight: `flag_task` is their handle, so embedders
    /// can await completion (e.g. before shutdown) without it ever
    /// blocking readiness.
    Ready {
        countries: Vec<Country>,
        source: DataSource,
        synced_at: DateTime<Utc>,
        flag_task: Option<task::JoinHandle<()>>,
    },
    /// Neither the network nor the local store had anything: the caller
    /// must tell the user there is no data and no connectivity.
    Empty,
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// Store failures are fatal to the cycle; there is no further fallback.
    #[error("local store failure: {0}")]
    Store(#[from] StoreError),

    #[error("sync cancelled")]
    Cancelled,

    #[error("background task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// Drives one sync cycle per call. Owns the only write path into the
/// store and the flag cache; the presentation layer only reads.
pub struct SyncOrchestrator {
    api: ApiClient,
    store: Arc<CountryStore>,
    flags: Arc<FlagCache>,
    config: Config,
}

impl SyncOrchestrator {
    /// Wire up the whole sync core from configuration, opening the store
    /// and flag cache under the configured data directory.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new()?;
        let store = Arc::new(CountryStore::open(&config.db_path())?);
        let flags = Arc::new(FlagCache::new(config.flags_dir(), api.http_client())?);
        Ok(Self::with_parts(api, store, flags, config))
    }

    /// Assemble from pre-built collaborators.
    pub fn with_parts(
        api: ApiClient,
        store: Arc<CountryStore>,
        flags: Arc<FlagCache>,
        config: Config,
    ) -> Self {
        Self {
            api,
            store,
            flags,
            config,
        }
    }

    pub fn store(&self) -> &Arc<CountryStore> {
        &self.store
    }

    pub fn flags(&self) -> &Arc<FlagCache> {
        &self.flags
    }

    /// Run one full sync cycle:
    /// probe -> {fetch remote | read local} -> normalize -> [cache flags].
    ///
    /// The remote path replaces the store before returning `Ready`, so a
    /// later offline start sees exactly what this cycle saw. Flag caching
    /// never blocks readiness; its task handle rides along in `Ready` for
    /// callers that want to await it before shutting down.
    pub async fn run(
        &self,
        progress: ProgressFn,
        cancel: CancelToken,
    ) -> Result<SyncOutcome, SyncError> {
        let progress = ProgressReporter::new(progress);

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        // Synthetic ramp while probing: early feedback before any real
        // percentage is known.
        for pct in (10..=40).step_by(10) {
            progress.report(pct);
            tokio::time::sleep(Duration::from_millis(RAMP_STEP_MS)).await;
        }

        let probe_result = probe(&self.api.http_client(), &self.config.probe_url).await;
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        if probe_result.reachable {
            match self.api.fetch_countries(&self.config.api_url).await {
                Ok(countries) if !countries.is_empty() => {
                    return self
                        .finish_remote(countries, &progress, &cancel)
                        .await;
                }
                Ok(_) => {
                    warn!("remote returned an empty dataset, falling back to local store");
                }
                Err(e) => {
                    info!(error = %e, "remote fetch failed, falling back to local store");
                }
            }
        } else {
            info!(detail = %probe_result.detail, "offline, reading local store");
        }

        self.finish_local(&progress, &cancel).await
    }

    async fn finish_remote(
        &self,
        mut countries: Vec<Country>,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<SyncOutcome, SyncError> {
        // Ordinal (byte-wise) ordering on the display name, pinned by test.
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        progress.report(PROGRESS_FETCHED);

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        // Full-replace must be durable before this cycle counts as Ready.
        let store = Arc::clone(&self.store);
        let batch = countries.clone();
        let row_progress = progress.clone();
        task::spawn_blocking(move || {
            store.replace_all(&batch, |pct| {
                row_progress.report(PROGRESS_FETCHED + pct / 2);
            })
        })
        .await??;

        let countries = self.attach_flag_paths(countries);
        let flag_task = self.spawn_flag_caching(countries.clone(), cancel.clone());

        progress.report(100);
        info!(count = countries.len(), "sync complete from remote");
        Ok(SyncOutcome::Ready {
            countries,
            source: DataSource::Remote,
            synced_at: Utc::now(),
            flag_task: Some(flag_task),
        })
    }

    async fn finish_local(
        &self,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<SyncOutcome, SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let store = Arc::clone(&self.store);
        let mut countries = task::spawn_blocking(move || store.read_all()).await??;

        if countries.is_empty() {
            info!("no remote data and empty local store");
            return Ok(SyncOutcome::Empty);
        }

        countries.sort_by(|a, b| a.name.cmp(&b.name));
        let countries = self.attach_flag_paths(countries);

        progress.report(100);
        info!(count = countries.len(), "sync complete from local cache");
        Ok(SyncOutcome::Ready {
            countries,
            source: DataSource::LocalCache,
            synced_at: Utc::now(),
            flag_task: None,
        })
    }

    /// Attach whatever flags are already on disk. Records for which no
    /// file exists keep `local_path = None` and resolve to their remote
    /// URL or a placeholder.
    fn attach_flag_paths(&self, countries: Vec<Country>) -> Vec<Country> {
        countries
            .into_iter()
            .map(|c| {
                let path = self.flags.path(&c.name);
                c.with_local_flag(path)
            })
            .collect()
    }

    fn spawn_flag_caching(
        &self,
        countries: Vec<Country>,
        cancel: CancelToken,
    ) -> task::JoinHandle<()> {
        let flags = Arc::clone(&self.flags);
        task::spawn(async move {
            debug!(count = countries.len(), "flag caching started");
            flags.ensure_cached(&countries, &cancel).await;
            debug!("flag caching finished");
        })
    }
}

/// Wraps the caller's progress callback with a high-water mark so reports
/// stay monotonic even where the synthetic ramp and real row progress
/// overlap.
#[derive(Clone)]
struct ProgressReporter {
    callback: ProgressFn,
    high_water: Arc<AtomicU8>,
}

impl ProgressReporter {
    fn new(callback: ProgressFn) -> Self {
        Self {
            callback,
            high_water: Arc::new(AtomicU8::new(0)),
        }
    }

    fn report(&self, pct: u8) {
        let pct = pct.min(100);
        let prev = self.high_water.fetch_max(pct, Ordering::SeqCst);
        if pct > prev {
            (self.callback)(pct);
        }
    }
}
