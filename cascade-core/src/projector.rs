//! Optional projection of a resolved record before it reaches the caller.

use serde_json::Value;

use crate::models::{ActivationRecord, SessionRecord};
use crate::poller::{PollOutcome, PolledRecord};

/// Extracts a sub-view of a terminal session record.
pub type ProjectionFn = dyn Fn(&SessionRecord) -> Value + Send + Sync;

/// The one value an await pipeline hands back: a decorated session, a plain
/// activation from the fallback path, or a projected sub-view of a session.
#[derive(Debug, Clone)]
pub enum AwaitResult {
    Session(Box<SessionRecord>),
    Activation(ActivationRecord),
    Projected(Value),
}

/// Applies an optional projection on the success path.
///
/// Projection only ever touches terminal session records; activation
/// fallbacks and error paths pass through untouched.
pub struct ResultProjector {
    projection: Option<Box<ProjectionFn>>,
}

impl ResultProjector {
    /// Return the full record, unprojected.
    pub fn full() -> Self {
        Self { projection: None }
    }

    pub fn with(projection: impl Fn(&SessionRecord) -> Value + Send + Sync + 'static) -> Self {
        Self {
            projection: Some(Box::new(projection)),
        }
    }

    /// Project out just the result payload, for `session result`.
    pub fn result_only() -> Self {
        Self::with(|record| record.result.clone().unwrap_or(Value::Null))
    }

    pub fn project(&self, outcome: PollOutcome) -> AwaitResult {
        match outcome.record {
            PolledRecord::Session(record) => match &self.projection {
                Some(projection) => AwaitResult::Projected(projection(&record)),
                None => AwaitResult::Session(Box::new(record)),
            },
            PolledRecord::Activation(activation) => AwaitResult::Activation(activation),
        }
    }
}

impl Default for ResultProjector {
    fn default() -> Self {
        Self::full()
    }
}
