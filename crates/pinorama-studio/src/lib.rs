//! Terminal log explorer for pinorama
//!
//! The studio talks to a pinorama server through [`pinorama_client`]: it
//! loads the introspection to learn the columns, labels, formatters and
//! styles, then queries records with the payload builder, either on demand
//! or by polling in live mode.

pub mod app;
pub mod config;
pub mod format;
pub mod messages;
mod runner;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Connection, Focus, LogsStatus};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use format::TimeZoneMode;
pub use messages::Locale;
pub use runner::{run, StudioOptions};
