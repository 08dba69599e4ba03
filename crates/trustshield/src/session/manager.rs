use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::{Mutex, MutexGuard};

use crate::config::{CheckoutSettings, SessionSettings};
use crate::error::{EngineError, EngineResult};
use crate::session::state::{CheckoutContext, SessionState};

const DEFAULT_LOCK_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct SessionSlot {
    state: Mutex<SessionState>,
}

impl SessionSlot {
    fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Blocking lock, for callers that must not fail.
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock()
    }
}

/// Live shopper sessions, each behind its own lock.
///
/// Idle sessions expire from the cache; operations on one session never
/// contend with another. An evicted session is gone: later calls on its id
/// fail validation. The registry and score caches evict on their own
/// schedule, and losing either of those entries acts like a logout.
pub struct SessionManager {
    cache: Cache<String, Arc<SessionSlot>>,
    checkout: CheckoutSettings,
    lock_wait: Duration,
}

impl SessionManager {
    pub fn new(settings: &SessionSettings, checkout: &CheckoutSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_sessions.max(1))
            .time_to_idle(Duration::from_secs(settings.idle_seconds.max(1)))
            .build();
        Self {
            cache,
            checkout: checkout.clone(),
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    pub fn open(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let slot = Arc::new(SessionSlot::new(self.fresh_state(&id)));
        self.cache.insert(id.clone(), slot);
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    /// Returns the session, creating it on first use of an unknown id.
    pub fn slot(&self, id: &str) -> EngineResult<Arc<SessionSlot>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(EngineError::validation("session id must not be empty"));
        }
        Ok(self
            .cache
            .get_with(id.to_string(), || Arc::new(SessionSlot::new(self.fresh_state(id)))))
    }

    /// Runs `f` with the session locked.
    ///
    /// Contention past the lock wait is retried once, then surfaces as an
    /// internal concurrency conflict.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut SessionState) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let slot = self.slot(id)?;
        let mut guard = match slot.state.try_lock_for(self.lock_wait) {
            Some(guard) => guard,
            None => {
                tracing::warn!("session {id} lock contended, retrying once");
                slot.state.try_lock_for(self.lock_wait).ok_or_else(|| {
                    EngineError::internal(format!("concurrency conflict on session {id}"))
                })?
            }
        };
        f(&mut guard)
    }

    fn fresh_state(&self, id: &str) -> SessionState {
        SessionState::new(
            id,
            CheckoutContext::new(
                self.checkout.default_shipping.clone(),
                self.checkout.default_payment.clone(),
            ),
        )
    }
}
