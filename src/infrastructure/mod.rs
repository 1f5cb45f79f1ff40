//! Infrastructure layer - external adapters (log file, config, terminal, clipboard).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod export_file;
pub mod log_store;
pub mod system_clipboard;
pub mod terminal_host;
pub mod watcher;

pub use config::{ensure_config_exists, load_config};
pub use export_file::write_export;
pub use log_store::ChatLogStore;
pub use system_clipboard::SystemClipboard;
pub use terminal_host::TerminalHost;
pub use watcher::LogWatcher;
