//! Chat sidebar view and command dispatch.
//!
//! `ChatView` renders the log to an HTML document for a webview-style
//! display surface and turns the messages that surface posts back into
//! clipboard writes, editor insertions and exports. The actual clipboard,
//! editor and save dialog belong to the host, reached through [`ViewHost`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::exporter::{export, format_transcript, ExportFormat};
use crate::domain::{AppError, ChatEntry, Result, Role};
use crate::infrastructure::{write_export, ChatLogStore};

/// Message posted by the display surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewCommand {
    /// Export the whole log in the given format.
    ExportChat { format: ExportFormat },
    /// Copy the whole log as a transcript.
    CopyChat,
    /// Copy the most recent AI reply.
    CopyLastReply,
    /// Insert the most recent AI reply into the active editor.
    PasteLastReply,
    /// Copy one message from the current render. The index is signed so a
    /// negative one is ignored like any other out-of-range index.
    CopyMsg { idx: i64 },
}

impl ViewCommand {
    /// Parse a JSON message from the display surface.
    ///
    /// # Errors
    /// Returns error if the message is not a known command.
    pub fn from_json(message: &str) -> Result<Self> {
        serde_json::from_str(message).map_err(AppError::parse)
    }
}

/// Side-effect primitives provided by the hosting environment.
pub trait ViewHost {
    /// Replace the clipboard contents.
    ///
    /// # Errors
    /// Returns error if the clipboard cannot be written.
    fn write_clipboard(&mut self, text: &str) -> Result<()>;

    /// Insert text at the cursor of the active editor. Returns `false` when
    /// there is no active editor.
    ///
    /// # Errors
    /// Returns error if the editor rejects the edit.
    fn insert_into_editor(&mut self, text: &str) -> Result<bool>;

    /// Ask the user where to save an export. `None` means cancelled.
    fn choose_export_path(&mut self, suggested: &Path) -> Option<PathBuf>;

    /// Show an informational message.
    fn notify(&mut self, message: &str);
}

/// What a dispatched command ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Export written to this path.
    Exported(PathBuf),
    /// The user dismissed the save dialog.
    ExportCancelled,
    /// Text of this many characters handed to the clipboard.
    Copied { chars: usize },
    /// Text of this many characters inserted into the editor.
    Inserted { chars: usize },
    /// There is no active editor to paste into.
    NoEditor,
    /// The log has no AI-originated entry.
    NoReply,
    /// Index outside the current render.
    Ignored,
    /// The command failed; already logged.
    Failed(String),
}

/// Renders the log and dispatches view commands.
pub struct ChatView {
    store: ChatLogStore,
    export_dir: PathBuf,
    rendered: Vec<ChatEntry>,
}

impl ChatView {
    /// Create a view over `store`, suggesting exports into `export_dir`.
    #[must_use]
    pub fn new(store: ChatLogStore, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            export_dir: export_dir.into(),
            rendered: Vec::new(),
        }
    }

    /// Entries of the most recent render.
    #[must_use]
    pub fn rendered(&self) -> &[ChatEntry] {
        &self.rendered
    }

    /// Re-read the store and render it.
    pub fn refresh(&mut self) -> String {
        let entries = self.store.read_all();
        self.render(entries)
    }

    /// Render `entries` and remember them as the current snapshot.
    pub fn render(&mut self, entries: Vec<ChatEntry>) -> String {
        let html = render_html(&entries);
        self.rendered = entries;
        html
    }

    /// Run a command to completion. Every failure is absorbed here.
    pub fn dispatch(&self, command: &ViewCommand, host: &mut dyn ViewHost) -> CommandOutcome {
        match self.try_dispatch(command, host) {
            Ok(outcome) => outcome,
            Err(AppError::NotFound { what }) => {
                tracing::debug!(%what, "Nothing to act on");
                CommandOutcome::NoReply
            }
            Err(e @ AppError::StaleReference { .. }) => {
                tracing::debug!(error = %e, "Ignoring stale message index");
                CommandOutcome::Ignored
            }
            Err(e) => {
                tracing::warn!(?command, error = %e, "View command failed");
                CommandOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_dispatch(
        &self,
        command: &ViewCommand,
        host: &mut dyn ViewHost,
    ) -> Result<CommandOutcome> {
        match *command {
            ViewCommand::ExportChat { format } => self.export_chat(format, host),
            ViewCommand::CopyChat => {
                let text = format_transcript(&self.store.read_all());
                host.write_clipboard(&text)?;
                host.notify("JEMAI chat copied to clipboard!");
                Ok(CommandOutcome::Copied {
                    chars: text.chars().count(),
                })
            }
            ViewCommand::CopyLastReply => {
                let reply = self.last_reply()?;
                host.write_clipboard(&reply.content)?;
                host.notify("Last JEMAI reply copied!");
                Ok(CommandOutcome::Copied {
                    chars: reply.content.chars().count(),
                })
            }
            ViewCommand::PasteLastReply => {
                let reply = self.last_reply()?;
                if !host.insert_into_editor(&reply.content)? {
                    return Ok(CommandOutcome::NoEditor);
                }
                host.notify("Last JEMAI reply inserted into editor!");
                Ok(CommandOutcome::Inserted {
                    chars: reply.content.chars().count(),
                })
            }
            ViewCommand::CopyMsg { idx } => {
                let entry = usize::try_from(idx)
                    .ok()
                    .and_then(|i| self.rendered.get(i))
                    .ok_or(AppError::StaleReference {
                        idx,
                        len: self.rendered.len(),
                    })?;
                host.write_clipboard(&entry.content)?;
                host.notify("This reply copied to clipboard!");
                Ok(CommandOutcome::Copied {
                    chars: entry.content.chars().count(),
                })
            }
        }
    }

    fn export_chat(
        &self,
        format: ExportFormat,
        host: &mut dyn ViewHost,
    ) -> Result<CommandOutcome> {
        let text = export(&self.store.read_all(), format)?;
        let suggested = self
            .export_dir
            .join(format!("jemai_chat_export.{}", format.extension()));

        let Some(path) = host.choose_export_path(&suggested) else {
            return Ok(CommandOutcome::ExportCancelled);
        };

        write_export(&path, &text)?;
        host.notify(&format!("JEMAI chat log exported: {}", path.display()));
        Ok(CommandOutcome::Exported(path))
    }

    fn last_reply(&self) -> Result<ChatEntry> {
        last_ai_reply(&self.store.read_all())
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                what: "assistant reply".into(),
            })
    }
}

/// The AI-originated entry nearest the end of the log.
#[must_use]
pub fn last_ai_reply(entries: &[ChatEntry]) -> Option<&ChatEntry> {
    entries.iter().rev().find(|e| e.role.is_ai_originated())
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
html,body { font-family: Menlo,monospace; font-size:1rem; color:#232; background:#fafafa; }
.msg { padding:8px; border-bottom:1px solid #eee; margin-bottom:0; }
.user { color:#284; }
.ai { color:#0088cc; }
small { color:#aaa; }
button { margin-right:3px; margin-bottom:6px; }
code { background:#eee; padding:2px 4px; }
pre { background:#f6f6f6; padding:8px; }
</style>
</head>
<body>
"#;

const PAGE_TOOLBAR: &str = r#"<div class="toolbar" style="margin:10px 0;">
  <button onclick="vscode.postMessage({ type: 'exportChat', format: 'txt' })">Export .txt</button>
  <button onclick="vscode.postMessage({ type: 'exportChat', format: 'md' })">Export .md</button>
  <button onclick="vscode.postMessage({ type: 'exportChat', format: 'jsonl' })">Export .jsonl</button>
  <button onclick="vscode.postMessage({ type: 'copyChat' })">Copy All</button>
  <button onclick="vscode.postMessage({ type: 'copyLastReply' })">Copy Last</button>
  <button onclick="vscode.postMessage({ type: 'pasteLastReply' })">Paste Last to Editor</button>
</div>
<script>
const vscode = acquireVsCodeApi();
window.copyMsg = idx => vscode.postMessage({ type: 'copyMsg', idx });
</script>
</body>
</html>
"#;

/// Render the whole sidebar document.
#[must_use]
pub fn render_html(entries: &[ChatEntry]) -> String {
    let mut out = String::from(PAGE_HEAD);

    for (idx, entry) in entries.iter().enumerate() {
        let assistant = entry.role == Role::Assistant;
        let (class, label) = if assistant {
            ("ai", "🤖 JEMAI")
        } else {
            ("user", "🧑 You")
        };

        out.push_str(&format!("<div class=\"msg {class}\">\n"));
        out.push_str(&format!("  <b>{label}</b>\n"));
        out.push_str(&format!(
            "  <small>{}</small>\n",
            escape_html(entry.time.as_deref().unwrap_or(""))
        ));
        out.push_str(&format!("  <div>{}</div>\n", format_content(&entry.content)));
        if assistant {
            out.push_str(&format!(
                "  <button onclick=\"window.copyMsg({idx})\">Copy</button>\n"
            ));
        }
        out.push_str("</div>\n");
    }

    out.push_str(PAGE_TOOLBAR);
    out
}

const FENCE: &str = "```";

/// Escape content, turn fenced spans into preformatted blocks and the
/// remaining newlines into line breaks.
#[must_use]
pub fn format_content(content: &str) -> String {
    let escaped = escape_html(content);
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped.as_str();

    while let Some(open) = rest.find(FENCE) {
        let body_start = open + FENCE.len();
        // The fenced body must hold at least one character.
        let Some(first) = rest[body_start..].chars().next() else {
            break;
        };
        let search_from = body_start + first.len_utf8();
        let Some(close) = rest[search_from..].find(FENCE).map(|i| i + search_from) else {
            break;
        };

        out.push_str(&rest[..open]);
        out.push_str("<pre><code>");
        out.push_str(&rest[body_start..close]);
        out.push_str("</code></pre>");
        rest = &rest[close + FENCE.len()..];
    }
    out.push_str(rest);

    out.replace('\n', "<br>")
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
