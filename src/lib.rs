//! Trade Pulse Library
//!
//! Serves congressional stock-trade disclosures from a TTL snapshot cache.
//! The modules are exposed for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod query;
pub mod server;
pub mod stats;
