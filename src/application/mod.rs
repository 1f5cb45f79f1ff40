//! Application layer - use cases and orchestration.
//!
//! This layer turns the stored chat log into exports and a rendered view,
//! and dispatches the commands the view sends back.

pub mod clipboard;
pub mod exporter;
pub mod view;

pub use clipboard::{looks_like_ai_reply, ReplyDetector};
pub use exporter::{export, ExportFormat};
pub use view::{ChatView, CommandOutcome, ViewCommand, ViewHost};
