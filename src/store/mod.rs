//! Local relational store for offline access.
//!
//! This module provides the `CountryStore`, a single-table SQLite cache of
//! country records with full-replace semantics: every successful remote
//! sync clears and rewrites the whole table in one transaction.
//!
//! The API is blocking; async callers push operations through
//! `tokio::task::spawn_blocking`.

pub mod countries;

pub use countries::{CountryStore, StoreError};
