//! Domain layer - core types and errors.
//!
//! This layer contains the chat log model, configuration model and error
//! types without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, ReadPolicy};
pub use error::{AppError, Result};
pub use models::{ChatEntry, LogStats, Role};
