use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, CascadeResult};

/// Optional workflow-name scope for a relative selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameFilter {
    /// Match sessions of any workflow.
    Any,
    /// Match only sessions of the named workflow.
    Named(String),
}

impl NameFilter {
    pub fn name(&self) -> Option<&str> {
        match self {
            NameFilter::Any => None,
            NameFilter::Named(name) => Some(name.as_str()),
        }
    }
}

impl From<Option<String>> for NameFilter {
    fn from(name: Option<String>) -> Self {
        match name {
            Some(name) => NameFilter::Named(name),
            None => NameFilter::Any,
        }
    }
}

/// Raw user intent, as it arrives from the CLI flags. May be contradictory;
/// [`Selector::from_request`] is where that gets caught.
#[derive(Debug, Clone, Default)]
pub struct SelectorRequest {
    pub session_id: Option<String>,
    pub last: Option<NameFilter>,
    pub last_failed: Option<NameFilter>,
}

impl SelectorRequest {
    pub fn explicit(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn last(filter: NameFilter) -> Self {
        Self {
            last: Some(filter),
            ..Self::default()
        }
    }

    pub fn last_failed(filter: NameFilter) -> Self {
        Self {
            last_failed: Some(filter),
            ..Self::default()
        }
    }
}

/// A validated selector: exactly one way of pointing at a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A concrete session id supplied by the caller.
    ExplicitId(String),
    /// The most recent session, optionally scoped to a workflow.
    Last(NameFilter),
    /// The most recent failed session, optionally scoped to a workflow.
    LastFailed(NameFilter),
}

impl Selector {
    /// Validate a raw request into exactly one selector variant.
    ///
    /// Runs before any remote call: asking for `--last` and `--last-failed`
    /// together, or supplying nothing at all, fails here.
    pub fn from_request(request: &SelectorRequest) -> CascadeResult<Self> {
        match (&request.last, &request.last_failed) {
            (Some(_), Some(_)) => Err(CascadeError::ConflictingSelector),
            (Some(filter), None) => Ok(Selector::Last(filter.clone())),
            (None, Some(filter)) => Ok(Selector::LastFailed(filter.clone())),
            (None, None) => match &request.session_id {
                Some(id) if !id.trim().is_empty() => Ok(Selector::ExplicitId(id.clone())),
                _ => Err(CascadeError::MissingSelector),
            },
        }
    }
}
