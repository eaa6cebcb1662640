//! Wire shapes for the restcountries.com v3.1 payload.
//!
//! Field names mirror the API. Everything except the country name is
//! optional on the wire and defaults to empty; unknown fields are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::country::{Country, Currency, FlagRef, GiniIndex, MapLinks};

#[derive(Debug, Clone, Deserialize)]
pub struct WireCountry {
    #[serde(default)]
    pub name: WireName,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub area: f64,
    /// Survey year to Gini value.
    #[serde(default)]
    pub gini: BTreeMap<String, f64>,
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
    #[serde(default)]
    pub currencies: BTreeMap<String, WireCurrency>,
    #[serde(default)]
    pub flags: Option<WireFlags>,
    #[serde(default)]
    pub maps: Option<WireMaps>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireName {
    #[serde(default)]
    pub common: String,
    #[serde(default)]
    pub official: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCurrency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFlags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMaps {
    #[serde(rename = "googleMaps")]
    pub google_maps: Option<String>,
    #[serde(rename = "openStreetMaps")]
    pub open_street_maps: Option<String>,
}

impl WireCountry {
    /// Convert into a domain record. Returns `None` for payload entries
    /// without a common name, since the name is the natural key everywhere.
    ///
    /// Gini selection is deliberate: the wire mapping is keyed by survey
    /// year and the latest year wins, with the year kept alongside the
    /// value.
    pub fn into_country(self) -> Option<Country> {
        if self.name.common.is_empty() {
            return None;
        }

        let gini = self
            .gini
            .into_iter()
            .next_back()
            .map(|(year, value)| GiniIndex { year, value });

        let currencies = self
            .currencies
            .into_iter()
            .map(|(code, c)| {
                (
                    code,
                    Currency {
                        name: c.name,
                        symbol: c.symbol,
                    },
                )
            })
            .collect();

        let flag = FlagRef {
            remote_url: self.flags.and_then(|f| f.png.or(f.svg)),
            local_path: None,
        };

        let maps = self.maps.map(|m| MapLinks {
            google_maps: m.google_maps,
            open_street_maps: m.open_street_maps,
        });

        Some(Country {
            name: self.name.common,
            capitals: self.capital,
            region: self.region,
            subregion: self.subregion,
            population: self.population,
            area: self.area,
            gini,
            languages: self.languages,
            currencies,
            flag,
            maps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAZIL: &str = r#"{
        "name": {"common": "Brazil", "official": "Federative Republic of Brazil"},
        "capital": ["Brasília"],
        "region": "Americas",
        "subregion": "South America",
        "population": 212559417,
        "area": 8515767.0,
        "gini": {"2018": 53.9, "2019": 53.4},
        "languages": {"por": "Portuguese"},
        "currencies": {"BRL": {"name": "Brazilian real", "symbol": "R$"}},
        "flags": {"png": "https://flagcdn.com/w320/br.png", "svg": "https://flagcdn.com/br.svg"},
        "maps": {
            "googleMaps": "https://goo.gl/maps/waCKk21HeeqFzkNC9",
            "openStreetMaps": "https://www.openstreetmap.org/relation/59470"
        }
    }"#;

    #[test]
    fn test_full_payload_round_trips_into_domain() {
        let wire: WireCountry = serde_json::from_str(BRAZIL).unwrap();
        let country = wire.into_country().unwrap();

        assert_eq!(country.name, "Brazil");
        assert_eq!(country.capitals, vec!["Brasília"]);
        assert_eq!(country.region, "Americas");
        assert_eq!(country.subregion, "South America");
        assert_eq!(country.population, 212559417);
        assert_eq!(country.area, 8515767.0);
        assert_eq!(country.languages.get("por").unwrap(), "Portuguese");
        assert_eq!(
            country.currencies.get("BRL").unwrap().symbol.as_deref(),
            Some("R$")
        );
        assert_eq!(
            country.flag.remote_url.as_deref(),
            Some("https://flagcdn.com/w320/br.png")
        );
        assert!(country.flag.local_path.is_none());
        let maps = country.maps.unwrap();
        assert_eq!(
            maps.open_street_maps.as_deref(),
            Some("https://www.openstreetmap.org/relation/59470")
        );
    }

    #[test]
    fn test_gini_picks_latest_survey_year() {
        let wire: WireCountry = serde_json::from_str(BRAZIL).unwrap();
        let gini = wire.into_country().unwrap().gini.unwrap();
        assert_eq!(gini.year, "2019");
        assert_eq!(gini.value, 53.4);
    }

    #[test]
    fn test_minimal_payload_defaults() {
        let wire: WireCountry =
            serde_json::from_str(r#"{"name": {"common": "Chad"}}"#).unwrap();
        let country = wire.into_country().unwrap();

        assert_eq!(country.name, "Chad");
        assert!(country.capitals.is_empty());
        assert_eq!(country.population, 0);
        assert_eq!(country.area, 0.0);
        assert!(country.gini.is_none());
        assert!(country.languages.is_empty());
        assert!(country.currencies.is_empty());
        assert!(country.flag.remote_url.is_none());
        assert!(country.maps.is_none());
    }

    #[test]
    fn test_missing_png_falls_back_to_svg() {
        let wire: WireCountry = serde_json::from_str(
            r#"{"name": {"common": "Chad"}, "flags": {"svg": "https://flagcdn.com/td.svg"}}"#,
        )
        .unwrap();
        let country = wire.into_country().unwrap();
        assert_eq!(
            country.flag.remote_url.as_deref(),
            Some("https://flagcdn.com/td.svg")
        );
    }

    #[test]
    fn test_nameless_entry_is_dropped() {
        let wire: WireCountry = serde_json::from_str(r#"{"population": 5}"#).unwrap();
        assert!(wire.into_country().is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let wire: WireCountry = serde_json::from_str(
            r#"{"name": {"common": "Chad"}, "cca2": "TD", "latlng": [15.0, 19.0]}"#,
        )
        .unwrap();
        assert_eq!(wire.into_country().unwrap().name, "Chad");
    }
}
