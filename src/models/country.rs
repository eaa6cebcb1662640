//! Domain model for a single country.
//!
//! These types represent country data in a clean domain format,
//! decoupled from the API response structures. Records are built once
//! (from the wire payload or from store rows) and never mutated afterwards,
//! except to attach a resolved local flag path before display.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder shown for any field the source left empty or absent.
const MISSING: &str = "N/A";

/// One country's denormalized data as consumed by the presentation layer.
///
/// `name` is the natural key: the store keeps at most one row per name and
/// the flag cache keeps at most one image file per name.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    /// Full ordered capital list. Persisted whole; flattened to the first
    /// entry only at display time.
    pub capitals: Vec<String>,
    pub region: String,
    pub subregion: String,
    pub population: u64,
    /// Surface area in km2. Zero means unknown.
    pub area: f64,
    pub gini: Option<GiniIndex>,
    /// Language code to display name.
    pub languages: BTreeMap<String, String>,
    /// Currency code to name/symbol.
    pub currencies: BTreeMap<String, Currency>,
    pub flag: FlagRef,
    pub maps: Option<MapLinks>,
}

/// A Gini index reading with the survey year it was taken from.
///
/// The wire payload maps year to value; the latest year is selected at
/// conversion time and kept here so the choice stays visible.
#[derive(Debug, Clone, PartialEq)]
pub struct GiniIndex {
    pub year: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    pub symbol: Option<String>,
}

/// Flag image reference. The remote URL and the resolved local cache path
/// are separate fields so a stale URL can never be mistaken for a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagRef {
    pub remote_url: Option<String>,
    pub local_path: Option<PathBuf>,
}

/// Where the presentation layer should load the flag image from.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagSource {
    Local(PathBuf),
    Remote(String),
}

impl FlagRef {
    /// Prefer the cached file; fall back to the remote URL. `None` means
    /// the caller should show a placeholder image.
    pub fn resolve(&self) -> Option<FlagSource> {
        if let Some(path) = &self.local_path {
            return Some(FlagSource::Local(path.clone()));
        }
        self.remote_url.clone().map(FlagSource::Remote)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLinks {
    pub google_maps: Option<String>,
    pub open_street_maps: Option<String>,
}

impl Country {
    /// First capital, or "N/A" for countries without one.
    pub fn capital_display(&self) -> &str {
        self.capitals.first().map(String::as_str).unwrap_or(MISSING)
    }

    pub fn region_display(&self) -> &str {
        non_empty_or_missing(&self.region)
    }

    pub fn subregion_display(&self) -> &str {
        non_empty_or_missing(&self.subregion)
    }

    /// Gini index formatted to two decimals. A zero reading is treated the
    /// same as no reading.
    pub fn gini_display(&self) -> String {
        match &self.gini {
            Some(g) if g.value != 0.0 => format!("{:.2}", g.value),
            _ => MISSING.to_string(),
        }
    }

    pub fn languages_display(&self) -> String {
        if self.languages.is_empty() {
            return MISSING.to_string();
        }
        self.languages.values().cloned().collect::<Vec<_>>().join(", ")
    }

    pub fn currencies_display(&self) -> String {
        if self.currencies.is_empty() {
            return MISSING.to_string();
        }
        self.currencies
            .values()
            .map(|c| match &c.symbol {
                Some(symbol) => format!("{} ({})", c.name, symbol),
                None => c.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return a copy with the local flag path attached. Called by the
    /// orchestrator once the flag cache has been consulted.
    pub fn with_local_flag(mut self, path: Option<PathBuf>) -> Self {
        self.flag.local_path = path;
        self
    }
}

fn non_empty_or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING
    } else {
        value
    }
}
