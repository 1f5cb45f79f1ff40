//! Domain models for the chat log.
//!
//! One `ChatEntry` is one line of the persisted JSONL log.

use serde::{Deserialize, Serialize};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the human.
    User,
    /// Reply captured from the assistant.
    Assistant,
    /// Legacy alias for an assistant reply.
    Ai,
    /// Reply produced by the local backend.
    Jemai,
}

impl Role {
    /// Whether the turn came from the AI side rather than the human.
    #[must_use]
    pub const fn is_ai_originated(self) -> bool {
        matches!(self, Self::Assistant | Self::Ai | Self::Jemai)
    }

    /// Lowercase wire name, as stored in the log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Ai => "ai",
            Self::Jemai => "jemai",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "ai" => Ok(Self::Ai),
            "jemai" => Ok(Self::Jemai),
            _ => Err(format!("Unknown role: {s}. Use: user, assistant, ai, jemai")),
        }
    }
}

/// A single recorded chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Who produced the turn.
    pub role: Role,
    /// Message text; may span lines and contain fenced code.
    pub content: String,
    /// Capture time as supplied by the producer. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl ChatEntry {
    /// Create an entry without a timestamp.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            time: None,
        }
    }

    /// Attach a timestamp.
    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// First line of the content, for compact listings.
    #[must_use]
    pub fn preview(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}

/// Counts over a materialised log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogStats {
    /// Number of entries.
    pub entries: usize,
    /// Entries typed by the human.
    pub user_messages: usize,
    /// AI-originated entries.
    pub ai_messages: usize,
}

impl LogStats {
    /// Tally a sequence of entries.
    #[must_use]
    pub fn from_entries(entries: &[ChatEntry]) -> Self {
        let ai_messages = entries.iter().filter(|e| e.role.is_ai_originated()).count();
        Self {
            entries: entries.len(),
            user_messages: entries.len() - ai_messages,
            ai_messages,
        }
    }
}
