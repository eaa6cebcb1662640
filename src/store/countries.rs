//! SQLite-backed country store.
//!
//! One table, one row per country name. Structured fields (capitals,
//! languages, currencies) are embedded as JSON text columns; everything
//! else maps to plain text/numeric columns.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::debug;

use crate::models::{Country, Currency, FlagRef, GiniIndex, MapLinks};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("column serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS countries (
        name             TEXT PRIMARY KEY CHECK (length(name) > 0),
        capitals         TEXT NOT NULL,
        region           TEXT NOT NULL,
        subregion        TEXT NOT NULL,
        population       INTEGER NOT NULL,
        gini             REAL,
        gini_year        TEXT,
        flag             TEXT,
        languages        TEXT NOT NULL,
        currencies       TEXT NOT NULL,
        area             REAL NOT NULL,
        google_maps      TEXT,
        open_street_maps TEXT
    )";

/// Local cache of country records.
///
/// The connection lives behind a mutex so concurrent callers serialize
/// instead of racing a shared handle; one read/write is in flight at a time.
pub struct CountryStore {
    conn: Mutex<Connection>,
}

impl CountryStore {
    /// Open (creating if needed) the store at `path`. Safe to call on every
    /// startup: table creation is idempotent.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_conn(Connection::open(path)?)
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the entire table with `countries` in one transaction.
    ///
    /// `on_progress` is invoked with a percentage in [0, 100] after each
    /// inserted row. Any failure rolls the transaction back, leaving the
    /// pre-call contents intact.
    ///
    /// Display names are not guaranteed unique in the payload; duplicates
    /// collapse to the last entry seen rather than failing the batch.
    pub fn replace_all(
        &self,
        countries: &[Country],
        mut on_progress: impl FnMut(u8),
    ) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM countries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO countries (
                    name, capitals, region, subregion, population,
                    gini, gini_year, flag, languages, currencies,
                    area, google_maps, open_street_maps
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;

            let total = countries.len().max(1);
            for (i, country) in countries.iter().enumerate() {
                let capitals = serde_json::to_string(&country.capitals)?;
                let languages = serde_json::to_string(&country.languages)?;
                let currencies = serde_json::to_string(&country.currencies)?;

                stmt.execute(params![
                    country.name,
                    capitals,
                    country.region,
                    country.subregion,
                    country.population as i64,
                    country.gini.as_ref().map(|g| g.value),
                    country.gini.as_ref().map(|g| g.year.as_str()),
                    country.flag.remote_url,
                    languages,
                    currencies,
                    country.area,
                    country.maps.as_ref().and_then(|m| m.google_maps.as_deref()),
                    country
                        .maps
                        .as_ref()
                        .and_then(|m| m.open_street_maps.as_deref()),
                ])?;

                on_progress(((i + 1) * 100 / total) as u8);
            }
        }
        tx.commit()?;

        debug!(count = countries.len(), "country table replaced");
        Ok(())
    }

    /// Full scan. Row order is whatever SQLite hands back; callers sort.
    /// `flag.local_path` is always unset here; the flag cache owns that.
    pub fn read_all(&self) -> Result<Vec<Country>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT name, capitals, region, subregion, population,
                    gini, gini_year, flag, languages, currencies,
                    area, google_maps, open_street_maps
             FROM countries",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(RawRow {
                name: row.get(0)?,
                capitals: row.get(1)?,
                region: row.get(2)?,
                subregion: row.get(3)?,
                population: row.get(4)?,
                gini: row.get(5)?,
                gini_year: row.get(6)?,
                flag: row.get(7)?,
                languages: row.get(8)?,
                currencies: row.get(9)?,
                area: row.get(10)?,
                google_maps: row.get(11)?,
                open_street_maps: row.get(12)?,
            })
        })?;

        let mut countries = Vec::new();
        for row in rows {
            countries.push(row?.into_country()?);
        }
        Ok(countries)
    }

    /// Delete every row. Exposed for explicit resync; `replace_all` clears
    /// internally within its own transaction.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.lock().execute("DELETE FROM countries", [])?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.lock()
                .query_row("SELECT COUNT(*) FROM countries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

struct RawRow {
    name: String,
    capitals: String,
    region: String,
    subregion: String,
    population: i64,
    gini: Option<f64>,
    gini_year: Option<String>,
    flag: Option<String>,
    languages: String,
    currencies: String,
    area: f64,
    google_maps: Option<String>,
    open_street_maps: Option<String>,
}

impl RawRow {
    fn into_country(self) -> Result<Country, StoreError> {
        let capitals: Vec<String> = serde_json::from_str(&self.capitals)?;
        let languages: BTreeMap<String, String> = serde_json::from_str(&self.languages)?;
        let currencies: BTreeMap<String, Currency> = serde_json::from_str(&self.currencies)?;

        let gini = self.gini.map(|value| GiniIndex {
            year: self.gini_year.unwrap_or_default(),
            value,
        });

        let maps = if self.google_maps.is_some() || self.open_street_maps.is_some() {
            Some(MapLinks {
                google_maps: self.google_maps,
                open_street_maps: self.open_street_maps,
            })
        } else {
            None
        };

        Ok(Country {
            name: self.name,
            capitals,
            region: self.region,
            subregion: self.subregion,
            population: self.population as u64,
            area: self.area,
            gini,
            languages,
            currencies,
            flag: FlagRef {
                remote_url: self.flag,
                local_path: None,
            },
            maps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str) -> Country {
        Country {
            name: name.to_string(),
            capitals: vec![format!("{name} City")],
            region: "Testregion".to_string(),
            subregion: "Subtest".to_string(),
            population: 1_000_000,
            area: 42.5,
            gini: Some(GiniIndex {
                year: "2019".to_string(),
                value: 34.5,
            }),
            languages: BTreeMap::from([("tst".to_string(), "Testish".to_string())]),
            currencies: BTreeMap::from([(
                "TST".to_string(),
                Currency {
                    name: "Test dollar".to_string(),
                    symbol: Some("T$".to_string()),
                },
            )]),
            flag: FlagRef {
                remote_url: Some(format!("https://flagcdn.com/{name}.png")),
                local_path: None,
            },
            maps: Some(MapLinks {
                google_maps: Some("https://goo.gl/maps/x".to_string()),
                open_street_maps: None,
            }),
        }
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let store = CountryStore::open_in_memory().unwrap();
        let original = country("Brazil");

        store.replace_all(&[original.clone()], |_| {}).unwrap();
        let read = store.read_all().unwrap();

        assert_eq!(read, vec![original]);
    }

    #[test]
    fn test_round_trip_preserves_all_capitals() {
        let store = CountryStore::open_in_memory().unwrap();
        let mut za = country("South Africa");
        za.capitals = vec![
            "Pretoria".to_string(),
            "Bloemfontein".to_string(),
            "Cape Town".to_string(),
        ];

        store.replace_all(&[za.clone()], |_| {}).unwrap();
        assert_eq!(store.read_all().unwrap()[0].capitals, za.capitals);
    }

    #[test]
    fn test_absent_optionals_stay_absent() {
        let store = CountryStore::open_in_memory().unwrap();
        let mut minimal = country("Chad");
        minimal.gini = None;
        minimal.flag = FlagRef::default();
        minimal.maps = None;

        store.replace_all(&[minimal.clone()], |_| {}).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![minimal]);
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let store = CountryStore::open_in_memory().unwrap();
        store
            .replace_all(&[country("Brazil"), country("Chad")], |_| {})
            .unwrap();
        store.replace_all(&[country("Åland")], |_| {}).unwrap();

        let names: Vec<String> = store.read_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Åland"]);
    }

    #[test]
    fn test_duplicate_names_collapse_to_one_row() {
        let store = CountryStore::open_in_memory().unwrap();
        let mut newer = country("Brazil");
        newer.population = 2_000_000;

        // Payload names are not guaranteed unique; the batch must still
        // land, keeping the last entry seen for the repeated name.
        store
            .replace_all(&[country("Brazil"), country("Chad"), newer.clone()], |_| {})
            .unwrap();

        let mut read = store.read_all().unwrap();
        read.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(read.len(), 2);
        assert_eq!(read[0], newer);
        assert_eq!(read[1].name, "Chad");
    }

    #[test]
    fn test_replace_all_is_atomic_on_mid_batch_failure() {
        let store = CountryStore::open_in_memory().unwrap();
        store
            .replace_all(&[country("Brazil"), country("Chad")], |_| {})
            .unwrap();

        // An empty name violates the table's CHECK constraint on the
        // second insert, mid-transaction.
        let result = store.replace_all(&[country("Åland"), country("")], |_| {});
        assert!(result.is_err());

        let mut names: Vec<String> =
            store.read_all().unwrap().into_iter().map(|c| c.name).collect();
        names.sort();
        assert_eq!(names, vec!["Brazil", "Chad"]);
    }

    #[test]
    fn test_replace_all_progress_is_monotonic_and_completes() {
        let store = CountryStore::open_in_memory().unwrap();
        let batch: Vec<Country> = ["A", "B", "C", "D"].iter().map(|n| country(n)).collect();

        let mut reported = Vec::new();
        store.replace_all(&batch, |pct| reported.push(pct)).unwrap();

        assert_eq!(reported.len(), 4);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]), "{reported:?}");
        assert_eq!(*reported.last().unwrap(), 100);
    }

    #[test]
    fn test_clear_and_count() {
        let store = CountryStore::open_in_memory().unwrap();
        store
            .replace_all(&[country("Brazil"), country("Chad")], |_| {})
            .unwrap();
        assert_eq!(store.count().unwrap(), 2);

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.db3");

        {
            let store = CountryStore::open(&path).unwrap();
            store.replace_all(&[country("Brazil")], |_| {}).unwrap();
        }
        // Reopening must not disturb existing rows.
        let store = CountryStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
