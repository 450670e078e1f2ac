//! Caching layer for derived transit data.
//!
//! Building the transit graph and scoring fuzzy matches are the expensive
//! parts of a request. Results are stored as serialized JSON in an injected
//! [`CacheBackend`] with a per-entry TTL.
//!
//! The cache is advisory: [`load`] and [`store`] swallow backend and
//! serialization failures (logging them) so callers always fall back to
//! recomputing from the snapshot.

mod memory;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use memory::MokaBackend;

/// Errors from a cache backend. Never surfaced to callers of the engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A payload could not be encoded or decoded
    #[error("cache payload error: {0}")]
    Serialization(String),
}

/// Key/value store with per-entry TTL.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// TTLs and capacity for cached artifacts.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the full stop-name corpus.
    pub stop_names_ttl: Duration,

    /// TTL for per-query autocomplete results.
    pub autocomplete_ttl: Duration,

    /// TTL for the transit graph and its indices.
    pub graph_ttl: Duration,

    /// TTL for route detail lookups.
    pub route_details_ttl: Duration,

    /// TTL for fuzzy route-number resolution.
    pub fuzzy_route_ttl: Duration,

    /// Maximum number of entries held by the in-memory backend.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Same TTL for every artifact (handy in tests).
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            stop_names_ttl: ttl,
            autocomplete_ttl: ttl,
            graph_ttl: ttl,
            route_details_ttl: ttl,
            fuzzy_route_ttl: ttl,
            ..Self::default()
        }
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stop_names_ttl: Duration::from_secs(60 * 60),
            autocomplete_ttl: Duration::from_secs(5 * 60),
            graph_ttl: Duration::from_secs(60 * 60),
            route_details_ttl: Duration::from_secs(2 * 60 * 60),
            fuzzy_route_ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Cache keys. Query-derived keys are lowercased.
pub mod keys {
    pub const GRAPH: &str = "graph:v1";
    pub const STOP_NAMES: &str = "stops:all";

    pub fn autocomplete(corpus: &str, query: &str) -> String {
        format!("autocomplete:{corpus}:{}", query.trim().to_lowercase())
    }

    pub fn route_details(query: &str) -> String {
        format!("route:{}", query.trim().to_lowercase())
    }

    pub fn fuzzy_route(query: &str) -> String {
        format!("route-fuzzy:{}", query.trim().to_lowercase())
    }
}

/// Read and decode a cached value.
///
/// Misses, backend errors and undecodable payloads all return `None`.
pub async fn load<T, B>(backend: &B, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    B: CacheBackend + ?Sized,
{
    let payload = match backend.get(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            debug!(key, "Cache miss");
            return None;
        }
        Err(e) => {
            warn!(key, error = %e, "Cache read failed, recomputing");
            return None;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(value) => {
            debug!(key, "Cache hit");
            Some(value)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding undecodable cache entry");
            // Best effort: a corrupt entry would otherwise be re-read until it expires.
            if let Err(e) = backend.delete(key).await {
                debug!(key, error = %e, "Failed to delete corrupt cache entry");
            }
            None
        }
    }
}

/// Encode and write a value. Failures are logged and otherwise ignored.
pub async fn store<T, B>(backend: &B, key: &str, value: &T, ttl: Duration)
where
    T: Serialize + ?Sized,
    B: CacheBackend + ?Sized,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            let err = CacheError::Serialization(e.to_string());
            warn!(key, error = %err, "Not caching value");
            return;
        }
    };

    if let Err(e) = backend.set(key, payload, ttl).await {
        warn!(key, error = %e, "Cache write failed");
    }
}

/// Delete a key, logging failures.
pub async fn evict<B>(backend: &B, key: &str)
where
    B: CacheBackend + ?Sized,
{
    if let Err(e) = backend.delete(key).await {
        warn!(key, error = %e, "Cache delete failed");
    }
}
