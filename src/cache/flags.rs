//! On-disk cache of flag images, one `<CountryName>.png` per country.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use crate::models::Country;
use crate::sync::CancelToken;

/// Cap on parallel flag downloads so a 250-country sync does not open
/// 250 connections at once.
const MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// Per-image download timeout in seconds. Flags are small; anything slower
/// than this is better retried on the next sync cycle.
const DOWNLOAD_TIMEOUT_SECS: u64 = 20;

/// Directory cache of country flag images.
pub struct FlagCache {
    dir: PathBuf,
    client: Client,
}

impl FlagCache {
    /// Create the cache over `dir`, creating the directory if missing.
    /// `client` is shared with the API client for connection pooling.
    pub fn new(dir: PathBuf, client: Client) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create flag cache directory {}", dir.display()))?;
        Ok(Self { dir, client })
    }

    fn file_path(&self, country_name: &str) -> PathBuf {
        self.dir.join(format!("{country_name}.png"))
    }

    /// Path of the cached flag for `country_name`, if one exists. Pure
    /// lookup; callers must tolerate `None` even right after a sync, since
    /// downloads are best-effort and may still be in flight.
    pub fn path(&self, country_name: &str) -> Option<PathBuf> {
        let path = self.file_path(country_name);
        path.exists().then_some(path)
    }

    /// Download every flag that is not already cached.
    ///
    /// Failures are isolated per image: a country whose download fails is
    /// logged and skipped, without aborting its siblings or the batch.
    /// Already-present files are never touched, which makes repeated calls
    /// idempotent. Cancellation stops items that have not started yet.
    pub async fn ensure_cached(&self, countries: &[Country], cancel: &CancelToken) {
        let pending: Vec<(String, String)> = countries
            .iter()
            .filter_map(|c| {
                let url = c.flag.remote_url.clone()?;
                let cached = self.file_path(&c.name).exists();
                (!cached).then(|| (c.name.clone(), url))
            })
            .collect();

        if pending.is_empty() {
            debug!("all flags already cached");
            return;
        }
        debug!(count = pending.len(), "downloading missing flags");

        futures::stream::iter(pending)
            .for_each_concurrent(MAX_CONCURRENT_DOWNLOADS, |(name, url)| {
                let client = self.client.clone();
                let path = self.file_path(&name);
                async move {
                    if cancel.is_cancelled() {
                        return;
                    }
                    if let Err(e) = download_flag(&client, &url, &path).await {
                        warn!(country = %name, error = %e, "failed to download flag");
                    }
                }
            })
            .await;
    }
}

async fn download_flag(client: &Client, url: &str, path: &Path) -> Result<()> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await?
        .error_for_status()?;
    let bytes = response.bytes().await?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write flag image {}", path.display()))?;
    Ok(())
}
