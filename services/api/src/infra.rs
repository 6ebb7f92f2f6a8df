use cardio_risk::assessment::{AssessmentController, SessionError, SessionId, SessionStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

type SessionMap = HashMap<SessionId, Arc<AssessmentController>>;

/// Live sessions kept before new ones are refused.
pub(crate) const DEFAULT_SESSION_CAPACITY: usize = 10_000;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session storage; sessions vanish on restart.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<SessionMap>>,
    capacity: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionMap::new())),
            capacity,
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, SessionMap>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session mutex poisoned".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.guard().map(|sessions| sessions.len()).unwrap_or_default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(
        &self,
        id: SessionId,
        controller: Arc<AssessmentController>,
    ) -> Result<(), SessionError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&id) {
            return Err(SessionError::Conflict);
        }
        if guard.len() >= self.capacity {
            return Err(SessionError::CapacityExhausted(self.capacity));
        }
        guard.insert(id, controller);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Arc<AssessmentController>>, SessionError> {
        Ok(self.guard()?.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self.guard()?.remove(id).is_some())
    }
}
