//! Garland Tools database access
//!
//! Request paths per resource type, the language selector embedded in them,
//! and the cached HTTP client exposing one accessor per resource.

pub mod client;
pub mod endpoints;
pub mod language;

pub use client::GarlandClient;
pub use language::Language;
