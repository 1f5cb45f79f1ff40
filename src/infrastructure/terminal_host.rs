//! `ViewHost` for running view commands from a terminal.
//!
//! The clipboard is stdout, the "active editor" is an optional file that
//! replies get appended to, and the save dialog resolves to a preset path
//! or the suggested one.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::application::ViewHost;
use crate::domain::{AppError, Result};

/// Terminal implementation of the host primitives.
#[derive(Debug, Default)]
pub struct TerminalHost {
    editor_file: Option<PathBuf>,
    export_path: Option<PathBuf>,
}

impl TerminalHost {
    /// Create a host. `editor_file` stands in for the active editor;
    /// `export_path` answers the save dialog.
    #[must_use]
    pub const fn new(editor_file: Option<PathBuf>, export_path: Option<PathBuf>) -> Self {
        Self {
            editor_file,
            export_path,
        }
    }
}

impl ViewHost for TerminalHost {
    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|e| AppError::io("Failed to write to stdout", e))
    }

    fn insert_into_editor(&mut self, text: &str) -> Result<bool> {
        let Some(path) = &self.editor_file else {
            return Ok(false);
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError::io(format!("Failed to open {}", path.display()), e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| AppError::io("Failed to insert into editor file", e))?;

        Ok(true)
    }

    fn choose_export_path(&mut self, suggested: &Path) -> Option<PathBuf> {
        Some(
            self.export_path
                .clone()
                .unwrap_or_else(|| suggested.to_path_buf()),
        )
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{} {}", "✓".green().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_without_editor_file_nothing_inserted() {
        let mut host = TerminalHost::default();
        assert!(!host.insert_into_editor("x").unwrap());
    }

    #[test]
    fn test_editor_file_receives_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "// header\n").unwrap();

        let mut host = TerminalHost::new(Some(path.clone()), None);
        assert!(host.insert_into_editor("fn main() {}\n").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "// header\nfn main() {}\n"
        );
    }

    #[test]
    fn test_export_path_prefers_preset() {
        let mut host = TerminalHost::new(None, Some(PathBuf::from("/tmp/out.md")));
        assert_eq!(
            host.choose_export_path(Path::new("/data/jemai_chat_export.md")),
            Some(PathBuf::from("/tmp/out.md"))
        );

        let mut host = TerminalHost::default();
        assert_eq!(
            host.choose_export_path(Path::new("/data/jemai_chat_export.md")),
            Some(PathBuf::from("/data/jemai_chat_export.md"))
        );
    }
}
