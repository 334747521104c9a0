//! Caching layer for bridge operations.
//!
//! This module provides the read-side caching machinery:
//! - Deterministic cache keys derived from operation name + parameters
//! - An in-memory TTL store with substring invalidation
//! - In-flight request deduplication (at most one fetch per key)

mod inflight;
mod key;
mod store;

pub use inflight::InflightTracker;
pub use key::cache_key;
pub use store::CacheStore;
