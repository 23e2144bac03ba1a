//! Process-local response cache
//!
//! This module provides a time-based cache keyed by request URL. Entries are
//! created on first request, served until they reach the configured TTL, and
//! removed by a background sweep that runs once per TTL period or by an
//! explicit clear. Concurrent misses for one URL share a single fetch.

mod store;
mod sweeper;
mod value;

pub use store::{Cache, ReadPolicy, DEFAULT_TTL};
pub use value::CachedValue;
