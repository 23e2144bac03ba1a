//! Garland Tools client library
//!
//! Typed accessors for the Garland Tools game database, backed by a
//! process-local, time-based response cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;

pub use cache::{Cache, CachedValue, ReadPolicy};
pub use config::ClientConfig;
pub use data::{GarlandClient, Language};
pub use error::{FetchFailure, GarlandError, Result};
