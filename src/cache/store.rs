//! In-memory response cache keyed by request URL
//!
//! Provides a `Cache` that stores fetched payloads with their insertion time,
//! collapses concurrent misses for the same key into a single fetch, and
//! expires entries through a background sweep.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use tokio::time::Instant;

use super::sweeper::{self, SweeperHandle};
use super::value::CachedValue;
use crate::error::{FetchFailure, GarlandError, Result};

/// Default time-to-live: one hour. The remote documents rarely change.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

type FetchResult = std::result::Result<CachedValue, Arc<FetchFailure>>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;

/// How the read path treats entries older than the TTL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Expired entries are refetched on read, even before the sweep removes them
    #[default]
    CheckOnRead,
    /// Entries are served until the sweep removes them, so a read may see
    /// data up to `2 * ttl` old
    SweepOnly,
}

/// A single cached payload
struct CacheEntry {
    value: CachedValue,
    /// Monotonic insertion time used for expiry
    inserted_at: Instant,
    /// Wall-clock insertion time, reported to callers
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: CachedValue) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            cached_at: Utc::now(),
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

struct State {
    entries: HashMap<String, CacheEntry>,
    /// Fetches currently running, tagged with the epoch they started in
    in_flight: HashMap<String, (u64, InFlight)>,
    ttl: Duration,
    /// Bumped by `clear` so fetches started earlier are not stored
    epoch: u64,
    sweeper: Option<SweeperHandle>,
}

/// Shared state behind every `Cache` handle
pub(super) struct Store {
    state: RwLock<State>,
    policy: ReadPolicy,
}

impl Store {
    /// Removes every entry whose age has reached the TTL
    ///
    /// Returns the number of entries removed.
    pub(super) fn sweep(&self, now: Instant) -> usize {
        let mut state = self.state.write();
        let ttl = state.ttl;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before - state.entries.len()
    }

    /// Records the outcome of a fetch started in `epoch`
    fn complete(&self, key: &str, epoch: u64, result: &FetchResult) {
        let mut state = self.state.write();

        let owned = matches!(state.in_flight.get(key), Some((started, _)) if *started == epoch);
        if !owned {
            // The cache was cleared while this fetch was running.
            tracing::debug!(key = %key, "Discarding fetch result started before clear");
            return;
        }
        state.in_flight.remove(key);

        match result {
            Ok(value) => {
                state
                    .entries
                    .insert(key.to_string(), CacheEntry::new(value.clone()));
                tracing::debug!(key = %key, kind = value.kind(), "Stored fetched payload");
            }
            Err(err) => {
                tracing::debug!(key = %key, error = %err, "Fetch failed, cache left unchanged");
            }
        }
    }
}

/// Time-based cache for remote payloads
///
/// Cloning a `Cache` yields another handle to the same store. The background
/// sweep stops once every handle has been dropped.
#[derive(Clone)]
pub struct Cache {
    store: Arc<Store>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.store.state.read();
        f.debug_struct("Cache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .field("ttl", &state.ttl)
            .field("policy", &self.store.policy)
            .finish()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::build(DEFAULT_TTL, ReadPolicy::default())
    }
}

impl Cache {
    /// Creates a cache with the given TTL and the default read policy
    ///
    /// # Returns
    /// * `Err(GarlandError::InvalidConfig)` if `ttl` is zero
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_policy(ttl, ReadPolicy::default())
    }

    /// Creates a cache with an explicit read policy
    pub fn with_policy(ttl: Duration, policy: ReadPolicy) -> Result<Self> {
        validate_ttl(ttl)?;
        Ok(Self::build(ttl, policy))
    }

    fn build(ttl: Duration, policy: ReadPolicy) -> Self {
        let store = Arc::new(Store {
            state: RwLock::new(State {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                ttl,
                epoch: 0,
                sweeper: None,
            }),
            policy,
        });

        let handle = sweeper::spawn(Arc::downgrade(&store), ttl);
        store.state.write().sweeper = handle;

        Self { store }
    }

    /// Returns the cached value for `key`, fetching it on a miss
    ///
    /// `fetch` is only invoked when no usable entry exists and no fetch for
    /// the same key is already running; concurrent callers for one key share
    /// a single fetch and receive the same result.
    ///
    /// # Returns
    /// * `Ok(CachedValue)` - the cached or freshly fetched payload
    /// * `Err(GarlandError::Fetch)` - if the fetch failed; nothing is stored
    ///   and any previous entry for `key` is left in place
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<CachedValue>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<CachedValue, FetchFailure>> + Send + 'static,
    {
        if let Some(value) = self.lookup(key) {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(value);
        }

        let in_flight = {
            let mut state = self.store.state.write();

            // Another caller may have stored the value since the read above.
            if let Some(value) = self.fresh_value(&state, key) {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }

            let joined = state.in_flight.get(key).map(|(_, pending)| pending.clone());
            match joined {
                Some(pending) => {
                    tracing::debug!(key = %key, "Joining in-flight fetch");
                    pending
                }
                None => {
                    tracing::debug!(key = %key, "Cache miss, fetching");
                    let epoch = state.epoch;
                    let pending = self.track(key.to_string(), epoch, fetch());
                    state
                        .in_flight
                        .insert(key.to_string(), (epoch, pending.clone()));
                    pending
                }
            }
        };

        in_flight
            .await
            .map_err(|source| GarlandError::fetch(key, source))
    }

    /// Runs a fetch on its own task so its outcome is recorded exactly once
    ///
    /// The task finishes even if every caller waiting on it is cancelled.
    fn track<Fut>(&self, key: String, epoch: u64, fetch: Fut) -> InFlight
    where
        Fut: Future<Output = std::result::Result<CachedValue, FetchFailure>> + Send + 'static,
    {
        let store: Weak<Store> = Arc::downgrade(&self.store);
        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(result) => result.map_err(Arc::new),
                Err(_) => Err(Arc::new(FetchFailure::Interrupted(
                    "fetch panicked".to_string(),
                ))),
            };
            if let Some(store) = store.upgrade() {
                store.complete(&key, epoch, &result);
            }
            result
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(Arc::new(FetchFailure::Interrupted(err.to_string())))
            })
        }
        .boxed()
        .shared()
    }

    fn lookup(&self, key: &str) -> Option<CachedValue> {
        let state = self.store.state.read();
        self.fresh_value(&state, key)
    }

    fn fresh_value(&self, state: &State, key: &str) -> Option<CachedValue> {
        let entry = state.entries.get(key)?;
        match self.store.policy {
            ReadPolicy::SweepOnly => Some(entry.value.clone()),
            ReadPolicy::CheckOnRead => {
                if entry.is_expired(Instant::now(), state.ttl) {
                    None
                } else {
                    Some(entry.value.clone())
                }
            }
        }
    }

    /// Removes every entry unconditionally
    ///
    /// Fetches already running still deliver their result to their callers,
    /// but the result is not stored.
    pub fn clear(&self) {
        let mut state = self.store.state.write();
        let removed = state.entries.len();
        state.entries.clear();
        state.in_flight.clear();
        state.epoch += 1;
        tracing::debug!(removed, "Cache cleared");
    }

    /// Changes the TTL and restarts the sweep one new TTL from now
    ///
    /// Existing entries keep their insertion time; the next sweep and later
    /// reads judge them against the new TTL. No sweep runs immediately.
    ///
    /// # Returns
    /// * `Err(GarlandError::InvalidConfig)` if `ttl` is zero; nothing changes
    pub fn set_ttl(&self, ttl: Duration) -> Result<()> {
        validate_ttl(ttl)?;

        let mut state = self.store.state.write();
        state.ttl = ttl;
        // Dropping the previous handle stops the old sweep task.
        state.sweeper = sweeper::spawn(Arc::downgrade(&self.store), ttl);
        tracing::info!(ttl = ?ttl, "Cache TTL updated");
        Ok(())
    }

    /// Runs one expiry pass immediately, returning the number of entries removed
    pub fn sweep_now(&self) -> usize {
        self.store.sweep(Instant::now())
    }

    pub fn ttl(&self) -> Duration {
        self.store.state.read().ttl
    }

    pub fn policy(&self) -> ReadPolicy {
        self.store.policy
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.store.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.state.read().entries.is_empty()
    }

    /// Whether an entry for `key` is present, regardless of its age
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.state.read().entries.contains_key(key)
    }

    /// Wall-clock time at which the entry for `key` was stored
    pub fn cached_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.store
            .state
            .read()
            .entries
            .get(key)
            .map(|entry| entry.cached_at)
    }
}

fn validate_ttl(ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(GarlandError::InvalidConfig(
            "cache time must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
