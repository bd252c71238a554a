use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use galley_core::AppResult;
use galley_domain::{EffectivePermissionSet, SubjectId};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Arc<EffectivePermissionSet>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    // Bumped by every invalidation; loads started under an older epoch are not stored.
    epoch: u64,
    entries: HashMap<SubjectId, CacheEntry>,
}

/// One shared load for a subject. Every caller that joins it gets the same
/// outcome, failures included.
#[derive(Debug)]
struct Flight {
    epoch: u64,
    outcome: OnceCell<AppResult<Arc<EffectivePermissionSet>>>,
}

/// Process-local cache of effective permission sets, keyed by subject.
///
/// Constructed once per process and shared by every resolver clone. Outside
/// this crate the only mutators are [`PermissionCache::invalidate`] and
/// [`PermissionCache::invalidate_all`]. Concurrent misses for one subject
/// share a single store load.
#[derive(Debug)]
pub struct PermissionCache {
    ttl: Option<Duration>,
    state: RwLock<CacheState>,
    in_flight: Mutex<HashMap<SubjectId, Arc<Flight>>>,
}

impl PermissionCache {
    /// Creates an empty cache. With `ttl = None` entries live until invalidated.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            state: RwLock::new(CacheState::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configured entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Evicts the entry of one subject.
    pub async fn invalidate(&self, subject: &SubjectId) {
        let mut state = self.state.write().await;
        state.epoch = state.epoch.wrapping_add(1);
        state.entries.remove(subject);
    }

    /// Evicts every entry.
    pub async fn invalidate_all(&self) {
        let mut state = self.state.write().await;
        state.epoch = state.epoch.wrapping_add(1);
        state.entries.clear();
    }

    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the cached set or runs `load` once per subject to fill it.
    pub(crate) async fn get_or_load<F, Fut>(
        &self,
        subject: &SubjectId,
        load: F,
    ) -> AppResult<Arc<EffectivePermissionSet>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<EffectivePermissionSet>>,
    {
        if let Some(value) = self.lookup(subject).await {
            return Ok(value);
        }

        let flight = self.flight_for(subject).await;
        let outcome = flight
            .outcome
            .get_or_init(|| async {
                if let Some(value) = self.lookup(subject).await {
                    return Ok(value);
                }

                match load().await {
                    Ok(loaded) => {
                        let value = Arc::new(loaded);
                        self.store(subject, Arc::clone(&value), flight.epoch).await;
                        Ok(value)
                    }
                    Err(error) => Err(error),
                }
            })
            .await
            .clone();

        self.finish_flight(subject, &flight).await;
        outcome
    }

    async fn lookup(&self, subject: &SubjectId) -> Option<Arc<EffectivePermissionSet>> {
        let now = Instant::now();
        {
            let state = self.state.read().await;
            match state.entries.get(subject) {
                Some(entry) if entry.is_fresh(now) => return Some(Arc::clone(&entry.value)),
                Some(_) => {}
                None => return None,
            }
        }

        let mut state = self.state.write().await;
        if state
            .entries
            .get(subject)
            .is_some_and(|entry| !entry.is_fresh(now))
        {
            state.entries.remove(subject);
        }

        None
    }

    async fn store(&self, subject: &SubjectId, value: Arc<EffectivePermissionSet>, epoch: u64) {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return;
        }

        let now = Instant::now();
        let expires_at = self
            .ttl
            .map(|ttl| now.checked_add(ttl).unwrap_or(now));

        state
            .entries
            .insert(subject.clone(), CacheEntry { value, expires_at });
    }

    /// Joins the pending load for `subject`, or opens a new one when the
    /// pending load is finished or predates the latest invalidation.
    async fn flight_for(&self, subject: &SubjectId) -> Arc<Flight> {
        let epoch = self.state.read().await.epoch;
        let mut in_flight = self.in_flight.lock().await;

        match in_flight.get(subject) {
            Some(flight) if flight.epoch == epoch && !flight.outcome.initialized() => {
                Arc::clone(flight)
            }
            _ => {
                let flight = Arc::new(Flight {
                    epoch,
                    outcome: OnceCell::new(),
                });
                in_flight.insert(subject.clone(), Arc::clone(&flight));
                flight
            }
        }
    }

    // A caller dropped mid-load leaves its entry behind; the next caller
    // either takes the load over or replaces the entry in `flight_for`.
    async fn finish_flight(&self, subject: &SubjectId, flight: &Arc<Flight>) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(subject)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            in_flight.remove(subject);
        }
    }
}
