//! JEMAI chat log - capture, view and export chat turns.
//!
//! Producers (the browser scraper, the editor extension) append turns to a
//! JSONL log; this tool reads it back, renders the editor sidebar, runs the
//! sidebar's commands and exports the log.
//!
//! QUICK START:
//!   jemai-chat append -r assistant "hello"          # Record a turn
//!   echo '{"content":"hi"}' | jemai-chat ingest      # Record a scraped reply
//!   jemai-chat list --last 5                         # Last 5 turns
//!   jemai-chat export -f md -o chat.md               # Export as Markdown
//!   jemai-chat dispatch '{"type":"copyLastReply"}'   # Run a sidebar command
//!   jemai-chat watch -o sidebar.html                 # Keep the sidebar fresh
//!   jemai-chat check-clipboard --follow              # Offer copied AI replies

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    export, looks_like_ai_reply, ChatView, CommandOutcome, ExportFormat, ReplyDetector,
    ViewCommand,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, ChatEntry, LogStats, Role};
use infrastructure::{
    ensure_config_exists, load_config, write_export, ChatLogStore, LogWatcher, SystemClipboard,
    TerminalHost,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<ExitCode> {
    let mut config = load_config(cli.data_dir.as_deref())?;
    if let Some(policy) = cli.read_policy {
        config.log.read_policy = policy;
    }

    match cli.command {
        Commands::Append {
            role,
            content,
            time,
        } => cmd_append(&config, role, content, time)?,
        Commands::Ingest => cmd_ingest(&config)?,
        Commands::List { last } => cmd_list(&config, last),
        Commands::Export { format, output } => {
            cmd_export(&config, format.as_deref(), output.as_deref())?;
        }
        Commands::Render { output } => cmd_render(&config, output.as_deref())?,
        Commands::Dispatch {
            message,
            editor,
            output,
        } => return cmd_dispatch(&config, &message, editor, output),
        Commands::Watch { debounce, output } => cmd_watch(&config, debounce, output).await?,
        Commands::CheckClipboard { stdin, follow } => {
            return if follow {
                cmd_follow_clipboard(&config).await
            } else {
                cmd_check_clipboard(&config, stdin)
            };
        }
        Commands::Init => cmd_init(&config)?,
        Commands::Paths => cmd_paths(&config),
    }

    Ok(ExitCode::SUCCESS)
}

fn open_store(config: &AppConfig) -> domain::Result<ChatLogStore> {
    ChatLogStore::open(config.log_path(), config.log.read_policy)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Append one turn.
fn cmd_append(
    config: &AppConfig,
    role: Role,
    content: String,
    time: Option<String>,
) -> domain::Result<()> {
    let entry = ChatEntry::new(role, content).with_time(time.unwrap_or_else(now_rfc3339));

    open_store(config)?.append(&entry)?;
    println!("{} Appended {} turn", "✓".green().bold(), entry.role);
    Ok(())
}

/// Reply as posted by the page scraper. Any role it carries is ignored.
#[derive(Debug, Deserialize)]
struct IncomingReply {
    content: String,
    #[serde(default)]
    time: Option<String>,
}

/// Read a scraped reply from stdin and record it as an assistant turn.
fn cmd_ingest(config: &AppConfig) -> domain::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| AppError::io("Failed to read stdin", e))?;

    let reply: IncomingReply = serde_json::from_str(&input).map_err(AppError::parse)?;
    let entry = ChatEntry::new(Role::Assistant, reply.content)
        .with_time(reply.time.unwrap_or_else(now_rfc3339));

    // Capture is best-effort: a failed append is logged, not fatal.
    let store = ChatLogStore::new(config.log_path(), config.log.read_policy);
    if store.append_best_effort(&entry) {
        println!("{} Reply recorded", "✓".green().bold());
    }
    Ok(())
}

/// List logged turns as a table.
fn cmd_list(config: &AppConfig, last: Option<usize>) {
    let store = ChatLogStore::new(config.log_path(), config.log.read_policy);
    let entries = store.read_all();
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Role", "Time", "Message"]);

    for (idx, entry) in entries.iter().enumerate().skip(skip) {
        table.add_row(vec![
            idx.to_string(),
            entry.role.to_string(),
            entry.time.clone().unwrap_or_else(|| "-".to_string()),
            truncate(entry.preview(), 60),
        ]);
    }

    println!("{table}");
    println!();
    println!("{}", format_stats(&LogStats::from_entries(&entries)));
}

/// Export the log to a file or stdout.
fn cmd_export(
    config: &AppConfig,
    format: Option<&str>,
    output: Option<&Path>,
) -> domain::Result<()> {
    let format: ExportFormat = format
        .unwrap_or(&config.export.default_format)
        .parse()
        .map_err(|message| AppError::Config { message })?;

    let store = ChatLogStore::new(config.log_path(), config.log.read_policy);
    let entries = store.read_all();
    let text = export(&entries, format)?;

    match output {
        Some(path) => {
            write_export(path, &text)?;
            println!(
                "{} Exported {} turns to {}",
                "✓".green().bold(),
                entries.len(),
                path.display()
            );
        }
        None => println!("{text}"),
    }

    Ok(())
}

/// Render the sidebar document.
fn cmd_render(config: &AppConfig, output: Option<&Path>) -> domain::Result<()> {
    let store = ChatLogStore::new(config.log_path(), config.log.read_policy);
    let mut view = ChatView::new(store, config.exports_dir());
    let html = view.refresh();

    match output {
        Some(path) => {
            write_export(path, &html)?;
            println!(
                "{} Rendered {} turns to {}",
                "✓".green().bold(),
                view.rendered().len(),
                path.display()
            );
        }
        None => println!("{html}"),
    }

    Ok(())
}

/// Run one sidebar command against a freshly rendered view.
fn cmd_dispatch(
    config: &AppConfig,
    message: &str,
    editor: Option<PathBuf>,
    output: Option<PathBuf>,
) -> domain::Result<ExitCode> {
    let command = ViewCommand::from_json(message)?;

    let store = ChatLogStore::new(config.log_path(), config.log.read_policy);
    let mut view = ChatView::new(store, config.exports_dir());
    view.refresh();

    let mut host = TerminalHost::new(editor, output);
    let outcome = view.dispatch(&command, &mut host);
    tracing::info!(?outcome, "Command finished");

    Ok(match outcome {
        CommandOutcome::Failed(_) => ExitCode::FAILURE,
        CommandOutcome::NoReply => {
            eprintln!("{}", "No JEMAI reply in the log yet.".yellow());
            ExitCode::SUCCESS
        }
        CommandOutcome::NoEditor => {
            eprintln!("{}", "No editor to paste into (use --editor).".yellow());
            ExitCode::SUCCESS
        }
        _ => ExitCode::SUCCESS,
    })
}

/// Watch the log and re-render the sidebar on every change.
async fn cmd_watch(
    config: &AppConfig,
    debounce: Option<u64>,
    output: Option<PathBuf>,
) -> domain::Result<()> {
    let store = open_store(config)?;
    let output = output.unwrap_or_else(|| config.view_path());
    let debounce = Duration::from_millis(debounce.unwrap_or(config.watch.debounce_ms));
    let watcher = LogWatcher::new(store.path())?;

    let mut view = ChatView::new(store, config.exports_dir());
    let render = |view: &mut ChatView| {
        let html = view.refresh();
        if let Err(e) = write_export(&output, &html) {
            tracing::warn!(error = %e, "Failed to write rendered view");
        } else {
            tracing::info!(entries = view.rendered().len(), "View refreshed");
        }
    };

    render(&mut view);
    println!(
        "{} Watching {} → {}",
        "👀".bold(),
        watcher.path().display(),
        output.display()
    );

    watcher.run(debounce, || render(&mut view)).await;

    Ok(())
}

/// Decide whether the clipboard (or stdin) text should be offered as a paste.
fn cmd_check_clipboard(config: &AppConfig, stdin: bool) -> domain::Result<ExitCode> {
    let text = if stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| AppError::io("Failed to read stdin", e))?;
        text
    } else {
        SystemClipboard::new().read_text()?
    };

    if looks_like_ai_reply(&text, &config.clipboard) {
        println!("Clipboard looks like an AI chat reply. Paste into editor?");
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Read the clipboard on an interval until Ctrl-C, printing each new reply.
async fn cmd_follow_clipboard(config: &AppConfig) -> domain::Result<ExitCode> {
    let mut clipboard = SystemClipboard::new();
    let mut detector = ReplyDetector::new(config.clipboard.clone());
    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.clipboard.interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    println!(
        "{} Checking the clipboard every {}s",
        "📋".bold(),
        config.clipboard.interval_secs.max(1)
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match clipboard.read_text() {
                    Ok(text) if detector.offer(&text) => {
                        let prompt = "Clipboard looks like an AI chat reply. Paste into editor?";
                        println!("{}", prompt.cyan());
                        println!("{text}");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "Clipboard read skipped"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping clipboard check");
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Write the default config file.
fn cmd_init(config: &AppConfig) -> domain::Result<()> {
    let (path, created) = ensure_config_exists(&config.data_dir())?;
    if created {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("Config already exists: {}", path.display());
    }
    open_store(config)?;
    Ok(())
}

/// Show resolved paths.
fn cmd_paths(config: &AppConfig) {
    println!("{}", "📂 JEMAI Paths".bold());
    println!();
    println!("  Data dir: {}", config.data_dir().display());
    println!("  Config:   {}", config.config_file_path().display());
    println!("  Chat log: {}", config.log_path().display());
    println!("  Exports:  {}", config.exports_dir().display());
    println!("  View:     {}", config.view_path().display());
}

/// Formats log statistics for display.
fn format_stats(stats: &LogStats) -> String {
    format!(
        "{}\n  Turns: {}\n  You: {}\n  JEMAI: {}",
        "📊 Statistics".bold(),
        stats.entries.to_string().cyan(),
        stats.user_messages.to_string().green(),
        stats.ai_messages.to_string().blue()
    )
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_incoming_reply_ignores_extra_fields() {
        let reply: IncomingReply =
            serde_json::from_str(r#"{"content":"hi","time":"t","role":"user","url":"x"}"#)
                .unwrap();
        assert_eq!(reply.content, "hi");
        assert_eq!(reply.time.as_deref(), Some("t"));
    }
}
