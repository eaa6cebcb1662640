//! API client for the restcountries.com REST API.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{debug, info};

use crate::models::{Country, WireCountry};

use super::FetchError;

/// HTTP request timeout in seconds. The full dataset is a few megabytes,
/// so this allows slow connections while still failing in bounded time.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for fetching the country dataset.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Cheap clone of the underlying client for collaborators (probe,
    /// flag cache) that want to share the connection pool.
    pub fn http_client(&self) -> Client {
        self.client.clone()
    }

    /// Fetch the full country dataset with a single request.
    ///
    /// An empty array is a successful (if useless) result, not an error;
    /// the orchestrator decides what to do with it. No retries here.
    pub async fn fetch_countries(&self, url: &str) -> Result<Vec<Country>, FetchError> {
        debug!(url, "fetching country dataset");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }

        let wire: Vec<WireCountry> = response
            .json()
            .await
            .map_err(|e| FetchError::ParseFailure(e.to_string()))?;

        let total = wire.len();
        let countries: Vec<Country> = wire
            .into_iter()
            .filter_map(WireCountry::into_country)
            .collect();

        if countries.len() < total {
            // Nameless entries are unusable as cache keys and are dropped.
            info!(
                dropped = total - countries.len(),
                "dropped payload entries without a name"
            );
        }
        debug!(count = countries.len(), "country dataset fetched");

        Ok(countries)
    }
}
