//! The resolution-then-poll pipeline behind `session get` and friends.

use std::sync::Arc;

use tracing::debug;

use crate::backend::ConductorBackend;
use crate::duration::parse_timeout;
use crate::error::CascadeResult;
use crate::lister::ListOptions;
use crate::models::SelectorRequest;
use crate::poller::{PollConfig, SessionPoller};
use crate::projector::{AwaitResult, ResultProjector};
use crate::resolver::SessionResolver;

/// Per-invocation knobs, straight from the CLI flags.
#[derive(Debug, Clone, Default)]
pub struct AwaitOptions {
    /// Raw --timeout expression; absent means the 30 s default.
    pub timeout: Option<String>,
    pub list: ListOptions,
}

/// Wires resolver, poller, and projector into one pipeline.
///
/// Each call owns its own state; concurrent invocations share nothing but
/// the backend handle.
pub struct SessionAwaiter {
    backend: Arc<dyn ConductorBackend>,
    poll: PollConfig,
}

impl SessionAwaiter {
    pub fn new(backend: Arc<dyn ConductorBackend>) -> Self {
        Self {
            backend,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(backend: Arc<dyn ConductorBackend>, poll: PollConfig) -> Self {
        Self { backend, poll }
    }

    /// Resolve the selector, await completion, and project the outcome.
    pub async fn run(
        &self,
        request: &SelectorRequest,
        options: &AwaitOptions,
        projector: &ResultProjector,
    ) -> CascadeResult<AwaitResult> {
        let timeout_secs = parse_timeout(options.timeout.as_deref())?;

        let resolver = SessionResolver::new(self.backend.as_ref(), options.list.clone());
        let session_id = resolver.resolve(request).await?;
        debug!(%session_id, timeout_secs, "selector resolved, polling for completion");

        let poller = SessionPoller::new(
            self.backend.as_ref(),
            self.poll.clone().with_timeout_secs(timeout_secs),
        );
        let outcome = poller.poll(&session_id).await?;

        Ok(projector.project(outcome))
    }
}
