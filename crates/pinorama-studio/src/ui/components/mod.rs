mod column_toggle;
mod details_panel;
mod filter_panel;
mod help_overlay;
mod status_bar;
mod title_bar;
mod toolbar;

pub use column_toggle::ColumnToggle;
pub use details_panel::{json_lines, DetailsPanel};
pub use filter_panel::FilterPanel;
pub use help_overlay::HelpOverlay;
pub use status_bar::StatusBar;
pub use title_bar::TitleBar;
pub use toolbar::Toolbar;
