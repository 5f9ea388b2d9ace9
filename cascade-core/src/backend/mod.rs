pub mod http;
pub mod traits;

pub use http::HttpConductor;
pub use traits::{BackendError, ConductorBackend, ListQuery, DEFAULT_LIST_LIMIT};
