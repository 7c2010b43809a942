use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use insights_models::{CacheConfig, CacheKey, TabularResult};
use moka::future::Cache;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::stats::{CacheStats, StatsCounters};

type FlightGates = Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>;

/// Memoizes query results per [`CacheKey`] for a bounded time.
///
/// A lookup serves the stored result while `now - created_at < ttl`;
/// otherwise it runs the caller's computation and stores the outcome only if
/// it succeeded. Failures pass through untouched and leave nothing behind,
/// so the next lookup tries again. Expired results are never served in place
/// of a failed refresh.
///
/// Entries live in a moka cache, which gives atomic per-key replacement.
/// Freshness is judged against the injected [`Clock`], not moka's own TTL.
pub struct QueryCache {
    entries: Cache<CacheKey, Arc<CacheEntry>>,
    clock: Arc<dyn Clock>,
    gates: Option<FlightGates>,
    stats: StatsCounters,
}

impl QueryCache {
    /// Unbounded cache on the system clock, without single-flight.
    pub fn new() -> Self {
        Self::with_clock(&CacheConfig::default(), Arc::new(SystemClock))
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let mut builder = Cache::builder();
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        Self {
            entries: builder.build(),
            clock,
            gates: config.single_flight.then(|| Mutex::new(HashMap::new())),
            stats: StatsCounters::default(),
        }
    }

    /// Return the fresh result for `key`, or run `compute` and store its result.
    ///
    /// `compute` runs at most once per call. Its error type is returned
    /// unchanged.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<Arc<TabularResult>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TabularResult, E>>,
    {
        if let Some(value) = self.fresh_value(&key).await {
            self.stats.hit();
            debug!(key = %key, "Query cache hit");
            return Ok(value);
        }

        let Some(gates) = &self.gates else {
            self.stats.miss();
            debug!(key = %key, "Query cache miss");
            return self.refresh(key, ttl, compute).await;
        };

        let flight = FlightGate::acquire(gates, &key);
        let _turn = flight.wait_turn().await;
        // Whoever held the gate before us may have just stored the result.
        match self.fresh_value(&key).await {
            Some(value) => {
                self.stats.hit();
                debug!(key = %key, "Query cache hit after waiting on in-flight refresh");
                Ok(value)
            }
            None => {
                self.stats.miss();
                debug!(key = %key, "Query cache miss");
                self.refresh(key, ttl, compute).await
            }
        }
    }

    /// Stored entry for `key`, fresh or not.
    pub async fn entry(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).await
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Drop every entry that is no longer fresh. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let stale: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.entries.invalidate(key.as_ref()).await;
        }
        if !stale.is_empty() {
            debug!(count = stale.len(), "Purged expired query results");
        }
        stale.len()
    }

    /// Number of stored entries, fresh or stale.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    async fn fresh_value(&self, key: &CacheKey) -> Option<Arc<TabularResult>> {
        let entry = self.entries.get(key).await?;
        entry
            .is_fresh(self.clock.now())
            .then(|| Arc::clone(&entry.value))
    }

    async fn refresh<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<Arc<TabularResult>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TabularResult, E>>,
    {
        let started = Instant::now();
        match compute().await {
            Ok(result) => {
                let value = Arc::new(result);
                let entry = CacheEntry::new(key.clone(), Arc::clone(&value), self.clock.now(), ttl);
                debug!(
                    key = %key,
                    rows = value.len(),
                    ttl_secs = ttl.as_secs(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Stored query result"
                );
                self.entries.insert(key, Arc::new(entry)).await;
                Ok(value)
            }
            Err(e) => {
                self.stats.failure();
                warn!(
                    key = %key,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Query computation failed, nothing cached"
                );
                Err(e)
            }
        }
    }

    #[cfg(test)]
    fn open_gates(&self) -> usize {
        self.gates.as_ref().map_or(0, |gates| {
            gates.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }
}

/// One caller's claim on a per-key gate.
///
/// Dropping it, whether the caller finished or was cancelled mid-wait, removes
/// the gate from the map once no other caller holds it.
struct FlightGate<'a> {
    gates: &'a FlightGates,
    key: CacheKey,
    gate: Option<Arc<AsyncMutex<()>>>,
}

impl<'a> FlightGate<'a> {
    fn acquire(gates: &'a FlightGates, key: &CacheKey) -> Self {
        let mut map = gates.lock().unwrap_or_else(PoisonError::into_inner);
        let gate = Arc::clone(map.entry(key.clone()).or_default());
        Self {
            gates,
            key: key.clone(),
            gate: Some(gate),
        }
    }

    async fn wait_turn(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        }
    }
}

impl Drop for FlightGate<'_> {
    fn drop(&mut self) {
        let mut map = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only handed out under this lock, so the count is exact.
        drop(self.gate.take());
        if map
            .get(&self.key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            map.remove(&self.key);
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
