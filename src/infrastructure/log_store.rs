//! Append-only JSONL chat log.
//!
//! One `ChatEntry` per line, appended and never rewritten. Reads always
//! materialise the whole file into an owned `Vec`; an external appender may
//! race a read, in which case the reader sees some prefix of the log.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::domain::{AppError, ChatEntry, ReadPolicy, Result};

/// Handle on the chat log file.
#[derive(Debug, Clone)]
pub struct ChatLogStore {
    path: PathBuf,
    policy: ReadPolicy,
}

impl ChatLogStore {
    /// Create a handle without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, policy: ReadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    /// Create a handle and make sure the log file exists.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be created.
    pub fn open(path: impl Into<PathBuf>, policy: ReadPolicy) -> Result<Self> {
        let store = Self::new(path, policy);
        store.ensure_parent()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&store.path)
            .map_err(|e| {
                AppError::io(format!("Failed to create {}", store.path.display()), e)
            })?;

        tracing::debug!(path = %store.path.display(), "Chat log ready");
        Ok(store)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create log directory", e))?;
        }
        Ok(())
    }

    /// Append one entry as a new line.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written.
    pub fn append(&self, entry: &ChatEntry) -> Result<()> {
        self.ensure_parent()?;

        let line = serde_json::to_string(entry).map_err(AppError::parse)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::io(format!("Failed to open {}", self.path.display()), e))?;

        // A single write per record keeps concurrent appenders from interleaving.
        let mut writer = BufWriter::new(file);
        writer
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| AppError::io("Failed to append chat entry", e))?;

        tracing::debug!(role = %entry.role, chars = entry.content.len(), "Appended chat entry");
        Ok(())
    }

    /// Append, logging and swallowing any failure. Capture is best-effort.
    pub fn append_best_effort(&self, entry: &ChatEntry) -> bool {
        match self.append(entry) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Dropped chat entry");
                false
            }
        }
    }

    /// Read every entry, surfacing IO and parse failures.
    ///
    /// A missing file is an empty log, not an error. Malformed lines are an
    /// error only under [`ReadPolicy::Strict`].
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read, or (strict
    /// policy) if any line fails to decode.
    pub fn try_read_all(&self) -> Result<Vec<ChatEntry>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::io(
                    format!("Failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        parse_log(&data, self.policy)
    }

    /// Read every entry, degrading any failure to an empty log.
    #[must_use]
    pub fn read_all(&self) -> Vec<ChatEntry> {
        self.try_read_all().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Chat log unreadable, showing empty log"
            );
            Vec::new()
        })
    }
}

/// Parse JSONL text into entries according to `policy`.
///
/// # Errors
/// Returns the first parse error under [`ReadPolicy::Strict`].
pub fn parse_log(data: &str, policy: ReadPolicy) -> Result<Vec<ChatEntry>> {
    let mut entries = Vec::new();

    for (lineno, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ChatEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => match policy {
                ReadPolicy::Strict => return Err(AppError::parse(e)),
                ReadPolicy::SkipMalformed => {
                    tracing::warn!(
                        line = lineno + 1,
                        error = %e,
                        "Skipping malformed chat log line"
                    );
                }
            },
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use tempfile::tempdir;

    fn sample() -> Vec<ChatEntry> {
        vec![
            ChatEntry::new(Role::User, "hi"),
            ChatEntry::new(Role::Assistant, "hello\n```rust\nfn main() {}\n```")
                .with_time("2025-07-19T14:47:00Z"),
            ChatEntry::new(Role::Jemai, "third"),
        ]
    }

    #[test]
    fn test_open_creates_file_and_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");

        let store = ChatLogStore::open(&path, ReadPolicy::default()).unwrap();
        assert!(path.exists());
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_append_then_read_preserves_order() {
        let dir = tempdir().unwrap();
        let store = ChatLogStore::new(dir.path().join("a/b/log.jsonl"), ReadPolicy::default());

        for entry in &sample() {
            store.append(entry).unwrap();
        }

        assert_eq!(store.read_all(), sample());
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
    }

    #[test]
    fn test_time_does_not_reorder() {
        let dir = tempdir().unwrap();
        let store = ChatLogStore::new(dir.path().join("log.jsonl"), ReadPolicy::default());
        let late = ChatEntry::new(Role::User, "late").with_time("2030-01-01T00:00:00Z");
        let early = ChatEntry::new(Role::User, "early").with_time("2000-01-01T00:00:00Z");

        store.append(&late).unwrap();
        store.append(&early).unwrap();

        assert_eq!(store.read_all(), vec![late, early]);
    }

    #[test]
    fn test_missing_and_empty_file_read_empty() {
        let dir = tempdir().unwrap();
        let store = ChatLogStore::new(dir.path().join("absent.jsonl"), ReadPolicy::Strict);
        assert!(store.read_all().is_empty());

        fs::write(store.path(), "\n\n  \n").unwrap();
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_malformed_line_skipped_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"role\":\"user\",\"content\":\"hi\"}\n",
                "{not json\n",
                "{\"role\":\"ai\",\"content\":\"yo\"}\n",
            ),
        )
        .unwrap();

        let store = ChatLogStore::new(&path, ReadPolicy::SkipMalformed);
        assert_eq!(
            store.read_all(),
            vec![ChatEntry::new(Role::User, "hi"), ChatEntry::new(Role::Ai, "yo")]
        );
    }

    #[test]
    fn test_malformed_line_empties_strict_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        fs::write(
            &path,
            "{\"role\":\"user\",\"content\":\"hi\"}\n{\"role\":\"robot\",\"content\":\"x\"}\n",
        )
        .unwrap();

        let store = ChatLogStore::new(&path, ReadPolicy::Strict);
        assert!(matches!(store.try_read_all(), Err(AppError::Parse { .. })));
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_unreadable_path_degrades() {
        let dir = tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        let store = ChatLogStore::new(dir.path(), ReadPolicy::default());
        assert!(store.try_read_all().is_err());
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_append_best_effort_swallows_failure() {
        let dir = tempdir().unwrap();
        let store = ChatLogStore::new(dir.path(), ReadPolicy::default());
        assert!(!store.append_best_effort(&ChatEntry::new(Role::User, "lost")));
    }
}
