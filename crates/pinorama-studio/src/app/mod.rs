mod action;
mod filters;
mod handler;
mod state;

pub use action::Action;
pub use filters::{key_to_value, predicate, FilterSelection};
pub use handler::{handle_action, Effect};
pub use state::{AppState, Column, Connection, FetchRequest, FilterEntry, Focus, LogsStatus, UiState};
