//! Binary asset caching for offline flag display.
//!
//! This module provides the `FlagCache`, a directory of flag images keyed
//! by country name. Presence of the file is the only hit signal: no TTL,
//! no checksum invalidation, never a re-download.

pub mod flags;

pub use flags::FlagCache;
