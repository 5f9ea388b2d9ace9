//! Session listing, used by the "last"/"last-failed" resolution path.

use tracing::debug;

use crate::backend::{ConductorBackend, ListQuery, DEFAULT_LIST_LIMIT};
use crate::error::CascadeResult;
use crate::models::{NameFilter, SessionSummary};

/// Paging knobs for a listing. The default limit over-fetches on purpose:
/// the conductor does not sort, so the caller needs enough rows to scan.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: usize,
    pub skip: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            skip: None,
        }
    }
}

pub struct SessionLister<'a> {
    backend: &'a dyn ConductorBackend,
}

impl<'a> SessionLister<'a> {
    pub fn new(backend: &'a dyn ConductorBackend) -> Self {
        Self { backend }
    }

    /// Fetch one page of session summaries, optionally scoped to a workflow.
    ///
    /// Issues exactly one remote query. Backend errors propagate unchanged;
    /// retry policy lives in the poller, not here.
    pub async fn list(
        &self,
        filter: &NameFilter,
        options: &ListOptions,
    ) -> CascadeResult<Vec<SessionSummary>> {
        let query = ListQuery {
            limit: options.limit,
            skip: options.skip,
            name: filter.name().map(str::to_string),
        };
        debug!(limit = query.limit, skip = ?query.skip, name = ?query.name, "listing sessions");
        let summaries = self.backend.list_sessions(&query).await?;
        debug!(count = summaries.len(), "session listing returned");
        Ok(summaries)
    }
}
