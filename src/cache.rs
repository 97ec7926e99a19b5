//! Caller-owned cache for loaded session histories
//!
//! Wraps a [`SessionSource`] and serves the last loaded history until its
//! time-to-live expires or it is invalidated explicitly. There is no global
//! state: each cache belongs to whoever constructed it.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::import::SessionSource;
use crate::models::SessionRecord;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub total_lookups: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub invalidations: u64,
    pub load_failures: u64,
}

impl CacheMetrics {
    /// Get hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        if self.total_lookups == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / self.total_lookups as f64) * 100.0
    }
}

#[derive(Default)]
struct CacheState {
    sessions: Option<Arc<Vec<SessionRecord>>>,
    loaded_at: Option<DateTime<Utc>>,
    metrics: CacheMetrics,
}

/// TTL-bounded cache in front of a session source
pub struct SessionCache<S: SessionSource> {
    source: S,
    cache_ttl: Duration,
    clock: Clock,
    state: Mutex<CacheState>,
}

impl<S: SessionSource> SessionCache<S> {
    /// Create a cache using the system clock
    pub fn new(source: S, cache_ttl: Duration) -> Self {
        Self::with_clock(source, cache_ttl, Arc::new(Utc::now))
    }

    /// Create a cache with an explicit time source
    pub fn with_clock(source: S, cache_ttl: Duration, clock: Clock) -> Self {
        Self {
            source,
            cache_ttl,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_at(&self, state: &CacheState, now: DateTime<Utc>) -> bool {
        match (&state.sessions, state.loaded_at) {
            (Some(_), Some(loaded_at)) => now - loaded_at < self.cache_ttl,
            _ => false,
        }
    }

    /// Session history, reloaded from the source when stale
    pub fn sessions(&self) -> Result<Arc<Vec<SessionRecord>>> {
        let now = (self.clock)();
        let mut state = self.lock();
        state.metrics.total_lookups += 1;

        if self.fresh_at(&state, now) {
            if let Some(sessions) = &state.sessions {
                let sessions = Arc::clone(sessions);
                state.metrics.cache_hits += 1;
                debug!(source = %self.source.describe(), "Session cache hit");
                return Ok(sessions);
            }
        }

        state.metrics.cache_misses += 1;
        match self.source.load_sessions() {
            Ok(loaded) => {
                let sessions = Arc::new(loaded);
                info!(
                    source = %self.source.describe(),
                    sessions = sessions.len(),
                    "Session cache refreshed"
                );
                state.sessions = Some(Arc::clone(&sessions));
                state.loaded_at = Some(now);
                Ok(sessions)
            }
            Err(e) => {
                state.metrics.load_failures += 1;
                warn!(source = %self.source.describe(), error = %e, "Failed to load sessions");
                Err(e)
            }
        }
    }

    /// Drop the cached history so the next lookup reloads it
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.sessions = None;
        state.loaded_at = None;
        state.metrics.invalidations += 1;
        debug!(source = %self.source.describe(), "Session cache invalidated");
    }

    /// Whether a lookup right now would be served from the cache
    pub fn is_fresh(&self) -> bool {
        let now = (self.clock)();
        let state = self.lock();
        self.fresh_at(&state, now)
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.lock().metrics.clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
