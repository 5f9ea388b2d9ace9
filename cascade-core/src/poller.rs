//! The completion-polling state machine.
//!
//! One poll invocation owns one [`PollState`]; attempts are strictly
//! sequential, each blocking server-side up to the configured timeout. A
//! still-running report costs one iteration and a fixed backoff; any other
//! backend error gets exactly one plain-activation fallback before the
//! original error is classified and surfaced. Once a terminal record has been
//! observed it is returned immediately; a poll never un-terminates.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{BackendError, ConductorBackend};
use crate::duration::DEFAULT_TIMEOUT_SECS;
use crate::error::{CascadeError, CascadeResult, SLOW_INIT_HINT};
use crate::models::{ActivationRecord, SessionRecord, ViewMode};

/// Fixed backoff between attempts after a still-running report.
pub const POLL_INTERVAL_MS: u64 = 300;

/// Hard cap on poll attempts. The per-attempt call already blocks up to the
/// timeout budget, so this is a secondary bound against runaway polling.
pub const MAX_POLL_ITERATIONS: u32 = 100;

/// View mode appended to every decorated session record.
const FLOW_MODE: &str = "visualization";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Backoff between attempts.
    pub interval: Duration,
    /// Iteration cap; exceeding it fails the poll.
    pub max_iterations: u32,
    /// Server-side blocking budget per attempt, in seconds.
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_iterations: MAX_POLL_ITERATIONS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PollConfig {
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Book-keeping for one poll invocation. Created at poll start, mutated only
/// by the retry loop, discarded on a terminal outcome.
#[derive(Debug)]
struct PollState {
    session_id: String,
    deadline_iterations: u32,
    interval: Duration,
    elapsed_iterations: u32,
}

impl PollState {
    fn new(session_id: &str, config: &PollConfig) -> Self {
        Self {
            session_id: session_id.to_string(),
            deadline_iterations: config.max_iterations,
            interval: config.interval,
            elapsed_iterations: 0,
        }
    }
}

/// What the poller found.
#[derive(Debug, Clone)]
pub enum PolledRecord {
    /// A terminal workflow session, decorated for display.
    Session(SessionRecord),
    /// The id named a plain activation, returned as-is.
    Activation(ActivationRecord),
}

#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub record: PolledRecord,
    /// How many still-running reports were absorbed before the outcome.
    pub elapsed_iterations: u32,
}

pub struct SessionPoller<'a> {
    backend: &'a dyn ConductorBackend,
    config: PollConfig,
}

impl<'a> SessionPoller<'a> {
    pub fn new(backend: &'a dyn ConductorBackend, config: PollConfig) -> Self {
        Self { backend, config }
    }

    /// Poll until the session reaches a terminal state, the iteration budget
    /// runs out, or a non-retryable error is classified.
    pub async fn poll(&self, session_id: &str) -> CascadeResult<PollOutcome> {
        let mut state = PollState::new(session_id, &self.config);
        debug!(session_id, timeout_secs = self.config.timeout_secs, "awaiting session");

        loop {
            match self
                .backend
                .get_session(&state.session_id, self.config.timeout_secs, true)
                .await
            {
                Ok(record) => {
                    debug!(
                        session_id = %state.session_id,
                        status = %record.status,
                        iterations = state.elapsed_iterations,
                        "session reached a terminal state"
                    );
                    return Ok(PollOutcome {
                        record: PolledRecord::Session(decorate(record)),
                        elapsed_iterations: state.elapsed_iterations,
                    });
                }
                Err(BackendError::StillRunning(_)) => {
                    state.elapsed_iterations += 1;
                    if state.elapsed_iterations > state.deadline_iterations {
                        warn!(session_id = %state.session_id, "poll iteration budget exhausted");
                        return Err(CascadeError::PollTimeout);
                    }
                    tokio::time::sleep(state.interval).await;
                }
                Err(original) => return self.fall_back(&state, original).await,
            }
        }
    }

    /// The id may name a plain activation rather than a workflow session;
    /// try that interpretation exactly once before giving up.
    async fn fall_back(
        &self,
        state: &PollState,
        original: BackendError,
    ) -> CascadeResult<PollOutcome> {
        debug!(session_id = %state.session_id, error = %original, "session get failed, trying plain activation");
        match self.backend.get_activation(&state.session_id).await {
            Ok(activation) => Ok(PollOutcome {
                record: PolledRecord::Activation(activation),
                elapsed_iterations: state.elapsed_iterations,
            }),
            Err(fallback_err) => {
                debug!(error = %fallback_err, "activation fallback failed too");
                Err(classify_poll_error(original))
            }
        }
    }
}

/// Map the original poll error to its terminal kind once the fallback has
/// also failed. The fallback error itself is discarded; the original is the
/// one that describes the session.
fn classify_poll_error(original: BackendError) -> CascadeError {
    match original {
        BackendError::TraceExpired(session_id) => CascadeError::TraceExpired(session_id),
        BackendError::ConnectionRefused(detail) => {
            warn!("conductor unreachable: {detail}");
            CascadeError::BackendUnavailable(SLOW_INIT_HINT.to_string())
        }
        BackendError::NotFound(message) => CascadeError::SessionNotFound { message },
        BackendError::StillRunning(id) => {
            // handled by the retry arm; kept total for safety
            CascadeError::UnclassifiedBackendError(format!("session {id} is still running"))
        }
        BackendError::Other(message) => CascadeError::UnclassifiedBackendError(message),
    }
}

/// Attach display metadata to a terminal session record.
///
/// The "logs" relabel is a no-op when the mode is absent; records without it
/// must still decorate cleanly.
fn decorate(mut record: SessionRecord) -> SessionRecord {
    record.kind = Some("sessions".to_string());

    if let Some(path) = record.path_annotation().map(str::to_string) {
        record.open_command = Some(format!("workflow get \"/{path}\""));
    }

    if let Some(logs) = record.modes.iter_mut().find(|m| m.mode == "logs") {
        logs.label = Some("trace".to_string());
    }

    let flow_command = format!("session flow {}", record.session_id);
    record.modes.push(ViewMode {
        mode: FLOW_MODE.to_string(),
        label: Some("Session Flow".to_string()),
        direct: Some(flow_command),
    });

    record
}
