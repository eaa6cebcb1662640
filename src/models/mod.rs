//! Data models for country records.
//!
//! Two layers, decoupled the same way the store is decoupled from the API:
//!
//! - `country`: the domain `Country` record consumed by the presentation
//!   layer, with display-safe accessors that never propagate nulls.
//! - `wire`: the raw restcountries.com v3.1 payload shapes, converted into
//!   domain records immediately after deserialization.

pub mod country;
pub mod wire;

pub use country::{Country, Currency, FlagRef, FlagSource, GiniIndex, MapLinks};
pub use wire::WireCountry;
