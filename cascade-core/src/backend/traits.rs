use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ActivationRecord, SessionRecord, SessionSummary};

/// Default page size for session listings. Intentionally generous: the
/// conductor does not guarantee a sort order, so callers over-fetch and scan.
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// Structured error kinds produced by a [`ConductorBackend`].
///
/// Adapters are responsible for translating whatever their wire surface
/// reports into one of these kinds; nothing downstream of an adapter inspects
/// message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The session has not reached a terminal state yet.
    #[error("session {0} is still running")]
    StillRunning(String),

    /// The conductor has dropped the trace data for this session.
    #[error("trace data expired for session {0}")]
    TraceExpired(String),

    /// The conductor does not know the id. The message is the conductor's
    /// own wording, preserved for the caller.
    #[error("{0}")]
    NotFound(String),

    /// The conductor refused the connection.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Anything the adapter could not classify.
    #[error("{0}")]
    Other(String),
}

/// Query parameters for a session listing.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub limit: usize,
    pub skip: Option<usize>,
    pub name: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            skip: None,
            name: None,
        }
    }
}

/// The conductor service, seen from the client side.
///
/// `get_session` blocks server-side for up to `timeout_secs` waiting for the
/// session to finish; a session that is still running when the budget runs
/// out comes back as [`BackendError::StillRunning`].
#[async_trait]
pub trait ConductorBackend: Send + Sync {
    async fn get_session(
        &self,
        session_id: &str,
        timeout_secs: u64,
        full: bool,
    ) -> Result<SessionRecord, BackendError>;

    async fn list_sessions(&self, query: &ListQuery) -> Result<Vec<SessionSummary>, BackendError>;

    async fn get_activation(
        &self,
        activation_id: &str,
    ) -> Result<ActivationRecord, BackendError>;
}
