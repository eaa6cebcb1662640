//! Endpoint and data-directory configuration.
//!
//! The store file and the flag cache directory live under the OS-standard
//! local data directory. There is no config file and no environment
//! variables; the endpoints are fixed.

use std::path::PathBuf;

use anyhow::Result;

/// Directory under the OS local data dir holding the store and flag cache.
const APP_DIR: &str = "countrycache";

const DB_FILE: &str = "countries.db3";
const FLAGS_DIR: &str = "Flags";

/// Full country dataset endpoint.
pub const API_URL: &str = "https://restcountries.com/v3.1/all";

/// Low-payload reachability endpoint; expected to answer 204.
pub const PROBE_URL: &str = "http://clients3.google.com/generate_204";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub probe_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find local data directory"))?
            .join(APP_DIR);
        Ok(Self {
            api_url: API_URL.to_string(),
            probe_url: PROBE_URL.to_string(),
            data_dir,
        })
    }

    /// Same endpoints, custom data directory. Used by tests and embedders.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            api_url: API_URL.to_string(),
            probe_url: PROBE_URL.to_string(),
            data_dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn flags_dir(&self) -> PathBuf {
        self.data_dir.join(FLAGS_DIR)
    }
}
