pub mod selector;
pub mod session;

pub use selector::{NameFilter, Selector, SelectorRequest};
pub use session::{ActivationRecord, Annotation, SessionRecord, SessionStatus, SessionSummary, ViewMode};
