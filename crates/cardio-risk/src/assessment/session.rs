use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::controller::AssessmentController;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage abstraction for live assessment sessions. Sessions only live as
/// long as the process; nothing is persisted.
pub trait SessionStore: Send + Sync {
    fn insert(
        &self,
        id: SessionId,
        controller: Arc<AssessmentController>,
    ) -> Result<(), SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<Arc<AssessmentController>>, SessionError>;
    /// Drops a session, returning whether it existed.
    fn remove(&self, id: &SessionId) -> Result<bool, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session limit of {0} reached")]
    CapacityExhausted(usize),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
