pub mod sessions;

pub use sessions::{handle_session_command, SessionCommand};
