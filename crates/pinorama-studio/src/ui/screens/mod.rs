mod log_explorer;

pub use log_explorer::LogExplorerScreen;
