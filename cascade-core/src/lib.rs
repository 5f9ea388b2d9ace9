//! Cascade core: resolve which workflow session a caller means, poll the
//! conductor until it reaches a terminal state, and hand back exactly one
//! record or one classified error.

pub mod awaiter;
pub mod backend;
pub mod config;
pub mod duration;
pub mod error;
pub mod lister;
pub mod models;
pub mod poller;
pub mod projector;
pub mod resolver;

pub use awaiter::{AwaitOptions, SessionAwaiter};
pub use backend::{BackendError, ConductorBackend, HttpConductor, ListQuery, DEFAULT_LIST_LIMIT};
pub use config::{
    CascadeConfig, ConductorConfig, ConfigLoadError, LoggingConfig, PollSettings,
};
pub use duration::{parse_timeout, DEFAULT_TIMEOUT_SECS};
pub use error::{CascadeError, CascadeResult, SLOW_INIT_HINT};
pub use lister::{ListOptions, SessionLister};
pub use models::{
    ActivationRecord, Annotation, NameFilter, Selector, SelectorRequest, SessionRecord,
    SessionStatus, SessionSummary, ViewMode,
};
pub use poller::{
    PollConfig, PollOutcome, PolledRecord, SessionPoller, MAX_POLL_ITERATIONS, POLL_INTERVAL_MS,
};
pub use projector::{AwaitResult, ResultProjector};
pub use resolver::SessionResolver;
