//! Point-in-time connectivity probe.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

/// The probe should answer fast; a generate_204 endpoint responds in
/// milliseconds when the network is up.
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Outcome of a reachability check. Unreachable is an expected,
/// first-class result, never an error.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub reachable: bool,
    /// User-facing explanation when unreachable.
    pub detail: String,
}

/// Single short-lived GET against a low-payload endpoint. Any 2xx answer
/// (204 included) counts as online; every transport failure - DNS, timeout,
/// refused connection - counts as offline. No retries.
pub async fn probe(client: &Client, url: &str) -> ProbeResult {
    let request = client
        .get(url)
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS));

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            debug!(url, "connectivity probe succeeded");
            ProbeResult {
                reachable: true,
                detail: "online".to_string(),
            }
        }
        Ok(response) => {
            debug!(url, status = %response.status(), "probe endpoint answered with an error");
            ProbeResult {
                reachable: false,
                detail: format!("probe endpoint answered {}", response.status()),
            }
        }
        Err(e) => {
            debug!(url, error = %e, "connectivity probe failed");
            ProbeResult {
                reachable: false,
                detail: "Configure your Internet connection".to_string(),
            }
        }
    }
}
