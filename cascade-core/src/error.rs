//! Error types for the Cascade core library.
//!
//! Everything that can go wrong while resolving and awaiting a session is
//! collapsed into [`CascadeError`]. Selector problems surface before any
//! remote call is made; polling problems are classified from the structured
//! [`BackendError`] kinds before they cross this boundary, so a transient
//! "still running" condition never appears here.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Selector | Duration and selector validation errors |
//! | E2001-E2099 | Polling | Terminal polling outcomes |
//! | E3001-E3099 | General | Backend passthrough and configuration errors |

use thiserror::Error;

use crate::backend::BackendError;

/// Shown when the conductor refuses connections, which usually means the
/// service is still coming up.
pub const SLOW_INIT_HINT: &str =
    "The conductor is not accepting connections yet. If it was just started, \
     give it a few seconds and try again.";

/// The main error type for Cascade operations.
#[derive(Debug, Error)]
pub enum CascadeError {
    // ========================================================================
    // Selector and input errors (E1001-E1099)
    // ========================================================================
    /// The --timeout expression could not be parsed into a positive duration
    #[error("[E1001] Invalid duration '{input}': {message}")]
    InvalidDuration { input: String, message: String },

    /// Neither an explicit session id nor --last/--last-failed was supplied
    #[error("[E1002] No session specified: provide a session id, --last, or --last-failed")]
    MissingSelector,

    /// --last and --last-failed were requested together
    #[error("[E1003] --last and --last-failed cannot be combined")]
    ConflictingSelector,

    /// The listing contained no entry matching the selector
    #[error("[E1004] No matching session found")]
    NoMatchingSession,

    // ========================================================================
    // Polling errors (E2001-E2099)
    // ========================================================================
    /// The iteration cap was exhausted while the session kept running
    #[error("[E2001] Timeout waiting for the workflow session to finish")]
    PollTimeout,

    /// The conductor has dropped the trace data for this session
    #[error("[E2002] Trace data expired for session {0}")]
    TraceExpired(String),

    /// The conductor refused the connection
    #[error("[E2003] {0}")]
    BackendUnavailable(String),

    /// The session cannot be found, as either a workflow session or a plain
    /// activation. Reported with a not-found status; the message is the
    /// conductor's own wording.
    #[error("[E2004] {message}")]
    SessionNotFound { message: String },

    /// A backend error the poller could not classify, passed through unmodified
    #[error("[E2005] {0}")]
    UnclassifiedBackendError(String),

    // ========================================================================
    // General errors (E3001-E3099)
    // ========================================================================
    /// A backend error surfaced outside the polling loop (e.g. by the lister)
    #[error("[E3001] {0}")]
    Backend(#[from] BackendError),

    /// Configuration error
    #[error("[E3002] Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Cascade operations.
pub type CascadeResult<T> = Result<T, CascadeError>;

impl CascadeError {
    /// Returns a stable error code suitable for logging or scripting.
    pub fn code(&self) -> &'static str {
        match self {
            CascadeError::InvalidDuration { .. } => "E1001",
            CascadeError::MissingSelector => "E1002",
            CascadeError::ConflictingSelector => "E1003",
            CascadeError::NoMatchingSession => "E1004",
            CascadeError::PollTimeout => "E2001",
            CascadeError::TraceExpired(_) => "E2002",
            CascadeError::BackendUnavailable(_) => "E2003",
            CascadeError::SessionNotFound { .. } => "E2004",
            CascadeError::UnclassifiedBackendError(_) => "E2005",
            CascadeError::Backend(_) => "E3001",
            CascadeError::Config(_) => "E3002",
        }
    }

    /// Returns the HTTP-style status this error maps to when reported over a
    /// programmatic surface.
    pub fn status_code(&self) -> u16 {
        match self {
            CascadeError::SessionNotFound { .. } | CascadeError::NoMatchingSession => 404,
            CascadeError::InvalidDuration { .. }
            | CascadeError::MissingSelector
            | CascadeError::ConflictingSelector => 400,
            CascadeError::PollTimeout => 408,
            CascadeError::TraceExpired(_) => 410,
            CascadeError::BackendUnavailable(_) => 503,
            CascadeError::UnclassifiedBackendError(_)
            | CascadeError::Backend(_)
            | CascadeError::Config(_) => 500,
        }
    }

    /// Returns a user-facing hint for resolving this error, if one exists.
    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            CascadeError::BackendUnavailable(_) => Some(SLOW_INIT_HINT),
            CascadeError::NoMatchingSession => {
                Some("Run 'cascade session list' to see recent sessions")
            }
            CascadeError::PollTimeout => {
                Some("The session may still complete; retry with a longer --timeout")
            }
            _ => None,
        }
    }
}
