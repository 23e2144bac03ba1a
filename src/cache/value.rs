//! Payload stored in the cache

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

/// A cached response body
///
/// Documents and image assets share one store, so the payload kind travels
/// with the value and accessors check it before handing data back.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// A decoded JSON document
    Json(Arc<Value>),
    /// Raw bytes of a binary asset (PNG icons and maps)
    Binary(Bytes),
}

impl CachedValue {
    pub fn json(value: Value) -> Self {
        CachedValue::Json(Arc::new(value))
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        CachedValue::Binary(bytes.into())
    }

    /// Human-readable name of the payload kind
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Json(_) => "JSON document",
            CachedValue::Binary(_) => "binary asset",
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CachedValue::Json(value) => Some(&**value),
            CachedValue::Binary(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Arc<Value>> {
        match self {
            CachedValue::Json(value) => Some(value),
            CachedValue::Binary(_) => None,
        }
    }

    pub fn into_binary(self) -> Option<Bytes> {
        match self {
            CachedValue::Binary(bytes) => Some(bytes),
            CachedValue::Json(_) => None,
        }
    }
}
