//! System clipboard access via `arboard`.

use crate::domain::{AppError, Result};

/// Lazily opened handle on the desktop clipboard.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| AppError::Clipboard {
                message: format!("Failed to open clipboard: {e}"),
            })?;
            self.inner = Some(clipboard);
        }
        self.inner.as_mut().ok_or_else(|| AppError::Clipboard {
            message: "Clipboard unavailable".into(),
        })
    }

    /// Current clipboard text.
    ///
    /// # Errors
    /// Returns error if there is no clipboard or it holds no text.
    pub fn read_text(&mut self) -> Result<String> {
        self.ensure()?.get_text().map_err(|e| AppError::Clipboard {
            message: format!("Failed to read clipboard: {e}"),
        })
    }
}
