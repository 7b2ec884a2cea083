pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod messages;
pub mod routes;
pub mod state;

pub use routes::{MESSAGES_PATH, router};
pub use state::{AppState, AppStateInner};
