//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ReadPolicy, Role};

/// JEMAI chat log - capture, view and export chat turns relayed from the
/// browser and editor.
#[derive(Parser, Debug)]
#[command(name = "jemai-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Data directory holding the chat log and config.
    #[arg(long, global = true, env = "JEMAI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the configured corrupt-line policy: skip_malformed or strict.
    #[arg(long, global = true)]
    pub read_policy: Option<ReadPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append one chat turn to the log.
    Append {
        /// Role of the turn: user, assistant, ai or jemai.
        #[arg(short, long, default_value = "user")]
        role: Role,

        /// Message text.
        content: String,

        /// Timestamp to record (defaults to now, RFC 3339).
        #[arg(short, long)]
        time: Option<String>,
    },

    /// Read a captured reply as JSON from stdin and append it as an assistant turn.
    Ingest,

    /// List the logged turns.
    List {
        /// Show only the last N turns.
        #[arg(short, long)]
        last: Option<usize>,
    },

    /// Export the log as txt, md or jsonl.
    Export {
        /// Export format (defaults to the configured one).
        #[arg(short, long)]
        format: Option<String>,

        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the log as the sidebar HTML document.
    Render {
        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a view command message, e.g. '{"type":"copyLastReply"}'.
    Dispatch {
        /// JSON message as posted by the sidebar.
        message: String,

        /// File standing in for the active editor (paste target).
        #[arg(long)]
        editor: Option<PathBuf>,

        /// Where exports are written (defaults to the suggested path).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Watch the log and re-render the sidebar HTML whenever it changes.
    Watch {
        /// Milliseconds to coalesce a burst of changes (defaults to the configured value).
        #[arg(short, long)]
        debounce: Option<u64>,

        /// File the rendered HTML is written to.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether the clipboard holds what looks like a copied AI reply.
    CheckClipboard {
        /// Read the text from stdin instead of the system clipboard.
        #[arg(long, conflicts_with = "follow")]
        stdin: bool,

        /// Keep reading the clipboard and report each new AI reply.
        #[arg(short, long)]
        follow: bool,
    },

    /// Create the default config file.
    Init,

    /// Show the paths being used.
    Paths,
}
