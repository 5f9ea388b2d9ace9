//! Selector resolution: turn user intent into exactly one concrete session id.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::backend::ConductorBackend;
use crate::error::{CascadeError, CascadeResult};
use crate::lister::{ListOptions, SessionLister};
use crate::models::{NameFilter, Selector, SelectorRequest};

pub struct SessionResolver<'a> {
    backend: &'a dyn ConductorBackend,
    list_options: ListOptions,
}

impl<'a> SessionResolver<'a> {
    pub fn new(backend: &'a dyn ConductorBackend, list_options: ListOptions) -> Self {
        Self {
            backend,
            list_options,
        }
    }

    /// Resolve a raw request into a concrete session id.
    ///
    /// Selector validation (conflicting or missing flags) happens before any
    /// remote call.
    pub async fn resolve(&self, request: &SelectorRequest) -> CascadeResult<String> {
        let selector = Selector::from_request(request)?;
        self.resolve_selector(selector).await
    }

    /// Relative selectors re-enter here with the id they found, so the
    /// downstream polling path is the same no matter how the id was obtained.
    fn resolve_selector(
        &self,
        selector: Selector,
    ) -> Pin<Box<dyn Future<Output = CascadeResult<String>> + Send + '_>> {
        Box::pin(async move {
            match selector {
                Selector::ExplicitId(id) => {
                    if id.trim().is_empty() {
                        return Err(CascadeError::MissingSelector);
                    }
                    debug!(session_id = %id, "selector resolved");
                    Ok(id)
                }
                Selector::Last(filter) => {
                    let id = self.find_recent(&filter, false).await?;
                    self.resolve_selector(Selector::ExplicitId(id)).await
                }
                Selector::LastFailed(filter) => {
                    let id = self.find_recent(&filter, true).await?;
                    self.resolve_selector(Selector::ExplicitId(id)).await
                }
            }
        })
    }

    /// Scan the over-fetched listing for the first entry (or first failing
    /// entry). No re-sorting: the backend's recency order is taken as-is.
    async fn find_recent(&self, filter: &NameFilter, failed_only: bool) -> CascadeResult<String> {
        let lister = SessionLister::new(self.backend);
        let summaries = lister.list(filter, &self.list_options).await?;

        let hit = if failed_only {
            summaries.iter().find(|s| s.is_failed())
        } else {
            summaries.first()
        };

        match hit {
            Some(summary) => {
                debug!(session_id = %summary.session_id, failed_only, "relative selector matched");
                Ok(summary.session_id.clone())
            }
            None => Err(CascadeError::NoMatchingSession),
        }
    }
}
