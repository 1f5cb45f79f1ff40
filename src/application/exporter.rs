//! Export formats for the chat log.
//!
//! Pure transforms from a sequence of entries to text. Writing the result
//! somewhere is the caller's job.

use serde::Deserialize;

use crate::domain::{AppError, ChatEntry, Result, Role};

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `[role] content` lines.
    Txt,
    /// Markdown blocks labelled JEMAI / You.
    #[default]
    Md,
    /// One JSON record per line; the only lossless format.
    Jsonl,
}

impl ExportFormat {
    /// File extension for exports in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "md" | "markdown" => Ok(Self::Md),
            "jsonl" | "json" => Ok(Self::Jsonl),
            _ => Err(format!("Unknown format: {s}. Use: txt, md, jsonl")),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render `entries` in `format`. Empty input gives an empty string.
///
/// # Errors
/// Returns error if an entry cannot be serialized to JSON.
pub fn export(entries: &[ChatEntry], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Txt => Ok(format_transcript(entries)),
        ExportFormat::Md => Ok(format_markdown(entries)),
        ExportFormat::Jsonl => format_jsonl(entries),
    }
}

/// Plain transcript, one `[role] content` line per entry. Newlines inside
/// content are kept as-is.
#[must_use]
pub fn format_transcript(entries: &[ChatEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("[{}] {}", e.role, e.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown, one block per entry separated by a blank line.
#[must_use]
pub fn format_markdown(entries: &[ChatEntry]) -> String {
    entries
        .iter()
        .map(|e| match e.role {
            Role::Assistant => format!("**JEMAI:** {}", e.content),
            _ => format!("**You:** {}", e.content),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_jsonl(entries: &[ChatEntry]) -> Result<String> {
    let lines = entries
        .iter()
        .map(|e| serde_json::to_string(e).map_err(AppError::parse))
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReadPolicy;
    use crate::infrastructure::log_store::parse_log;

    fn conversation() -> Vec<ChatEntry> {
        vec![
            ChatEntry::new(Role::User, "hi"),
            ChatEntry::new(Role::Assistant, "hello"),
        ]
    }

    #[test]
    fn test_markdown_example() {
        assert_eq!(
            export(&conversation(), ExportFormat::Md).unwrap(),
            "**You:** hi\n\n**JEMAI:** hello"
        );
    }

    #[test]
    fn test_markdown_labels_only_assistant_as_jemai() {
        let entries = vec![
            ChatEntry::new(Role::Ai, "a"),
            ChatEntry::new(Role::Jemai, "b"),
        ];
        assert_eq!(format_markdown(&entries), "**You:** a\n\n**You:** b");
    }

    #[test]
    fn test_txt_keeps_embedded_newlines() {
        let entries = vec![
            ChatEntry::new(Role::User, "line one\nline two"),
            ChatEntry::new(Role::Jemai, "ok"),
        ];
        assert_eq!(
            export(&entries, ExportFormat::Txt).unwrap(),
            "[user] line one\nline two\n[jemai] ok"
        );
    }

    #[test]
    fn test_jsonl_round_trips() {
        let entries = vec![
            ChatEntry::new(Role::User, "multi\nline \"quoted\""),
            ChatEntry::new(Role::Assistant, "```\ncode\n```").with_time("2025-07-19T13:13:00Z"),
            ChatEntry::new(Role::Ai, ""),
        ];

        let text = export(&entries, ExportFormat::Jsonl).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(parse_log(&text, ReadPolicy::Strict).unwrap(), entries);
    }

    #[test]
    fn test_empty_input_exports_empty() {
        for format in [ExportFormat::Txt, ExportFormat::Md, ExportFormat::Jsonl] {
            assert!(export(&[], format).unwrap().trim().is_empty());
        }
    }

    #[test]
    fn test_export_is_deterministic() {
        let a = export(&conversation(), ExportFormat::Jsonl).unwrap();
        let b = export(&conversation(), ExportFormat::Jsonl).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("TXT".parse::<ExportFormat>(), Ok(ExportFormat::Txt));
        assert_eq!("markdown".parse::<ExportFormat>(), Ok(ExportFormat::Md));
        assert_eq!("jsonl".parse::<ExportFormat>(), Ok(ExportFormat::Jsonl));
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Jsonl.extension(), "jsonl");
    }
}
