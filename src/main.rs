//! vulnscope - headless console over the UI state core
//!
//! # Overview
//!
//! This binary wires the stores the way the desktop shell does and drives them from
//! stdin, one command per line. It initializes:
//! - Configuration loading ([`ConfigManager`]) from the directory given as the first
//!   argument (default `vulnscope-data/`)
//! - Logging infrastructure (file rotation + console output on stderr)
//! - Tokio runtime (toast expiry timers)
//! - The [`AppContext`] with file-backed preferences and an in-memory document root
//!
//! Every store change is printed by a subscriber, so the output shows exactly what a
//! view would observe.
//!
//! # Commands
//!
//! - `file <path>` / `folder <path>`: queue an analysis target
//! - `take`: consume the pending target
//! - `clear`: clear the pending target
//! - `theme [dark|light|toggle]`: show or change the theme
//! - `toast <success|error|info> <message>`: post a toast
//! - `dismiss <id>`: remove a toast before it expires
//! - `status`: print every store
//! - `sources [root]`: list files the style scanner would read
//! - `quit`

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use vulnscope::ports::{ClassList, DocumentRoot, MemoryStore, PreferenceStore};
use vulnscope::{APP_NAME, AppContext, ConfigManager, Theme, ToastId, ToastKind, TokioScheduler, VERSION};

const DEFAULT_CONFIG_DIR: &str = "vulnscope-data";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    File(Utf8PathBuf),
    Folder(Utf8PathBuf),
    Take,
    Clear,
    Theme(Option<ThemeAction>),
    Toast(ToastKind, String),
    Dismiss(ToastId),
    Status,
    Sources(Utf8PathBuf),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeAction {
    Set(Theme),
    Toggle,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "file" | "folder" if rest.is_empty() => bail!("Usage: {} <path>", word),
            "file" => Command::File(rest.into()),
            "folder" => Command::Folder(rest.into()),
            "take" => Command::Take,
            "clear" => Command::Clear,
            "theme" => Command::Theme(match rest {
                "" => None,
                "toggle" => Some(ThemeAction::Toggle),
                other => Some(ThemeAction::Set(other.parse()?)),
            }),
            "toast" => {
                let (kind, message) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let kind = match kind {
                    "success" => ToastKind::Success,
                    "error" => ToastKind::Error,
                    "info" => ToastKind::Info,
                    _ => bail!("Usage: toast <success|error|info> <message>"),
                };
                Command::Toast(kind, message.trim().to_string())
            }
            "dismiss" => Command::Dismiss(
                rest.parse()
                    .with_context(|| format!("Invalid toast id: {:?}", rest))?,
            ),
            "status" => Command::Status,
            "sources" => Command::Sources(if rest.is_empty() { ".".into() } else { rest.into() }),
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command: {}", other),
        };

        Ok(Some(command))
    }
}

/// Main entry point for the headless console
///
/// # Errors
///
/// This function can fail if:
/// - The configuration directory cannot be created or a config file is invalid YAML
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - Reading stdin fails
fn main() -> Result<()> {
    let config_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());
    let config_manager = ConfigManager::new(&config_dir)?;
    let settings = config_manager.load_settings()?;

    let _log_guard = vulnscope::logging::setup_logging(&settings)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("vulnscope-timer")
        .build()?;
    tracing::info!("Tokio runtime initialized with {} worker threads", 2);

    // Preferences are best effort: an unreadable file must not stop the application
    let storage: Arc<dyn PreferenceStore> = match config_manager.open_preferences() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("{:#}; theme preference will not survive a restart", e);
            Arc::new(MemoryStore::new())
        }
    };
    let root = Arc::new(ClassList::new());

    let context = AppContext::builder(Arc::new(TokioScheduler::new(runtime.handle().clone())))
        .storage(storage)
        .document_root(root.clone())
        .settings(settings)
        .style(config_manager.load_style()?)
        .build();

    let _selection_sub = context.selection.subscribe(|pending| match pending {
        Some(pending) => println!("[selection] {}", pending),
        None => println!("[selection] none"),
    });
    let theme_root = Arc::clone(&root);
    let _theme_sub = context.theme.subscribe(move |theme| {
        println!("[theme] {} (root classes: {:?})", theme, theme_root.classes());
    });
    let _toast_sub = context.toasts.subscribe(|toasts| {
        let rendered: Vec<String> = toasts
            .iter()
            .map(|t| format!("#{} {}: {}", t.id, t.kind, t.message))
            .collect();
        println!("[toasts] [{}]", rendered.join(", "));
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => run_command(&context, &root, command),
            Ok(None) => {}
            Err(e) => eprintln!("error: {:#}", e),
        }
        io::stdout().flush().ok();
    }

    tracing::info!("Console closed, shutting down");
    context.toasts.clear();
    context.metrics().log_summary();
    runtime.shutdown_timeout(std::time::Duration::from_secs(1));

    tracing::info!("Application shutdown complete");
    Ok(())
}

fn run_command(context: &AppContext, root: &ClassList, command: Command) {
    match command {
        Command::File(path) => context.selection.select_file(path),
        Command::Folder(path) => context.selection.select_folder(path),
        Command::Take => match context.selection.take() {
            Some(pending) => println!("analyzing {}", pending),
            None => println!("nothing pending"),
        },
        Command::Clear => context.selection.clear(),
        Command::Theme(None) => println!("theme: {}", context.theme.get()),
        Command::Theme(Some(ThemeAction::Toggle)) => {
            context.theme.toggle();
        }
        Command::Theme(Some(ThemeAction::Set(theme))) => {
            if !context.theme.set(theme) {
                println!("theme already {}", theme);
            }
        }
        Command::Toast(kind, message) => {
            context.toasts.toast(message, kind);
        }
        Command::Dismiss(id) => {
            if !context.toasts.dismiss(id) {
                println!("no active toast #{}", id);
            }
        }
        Command::Status => {
            match context.selection.get() {
                Some(pending) => println!("selection: {}", pending),
                None => println!("selection: none"),
            }
            println!(
                "theme: {} (dark class present: {})",
                context.theme.get(),
                root.has_class(&context.style.dark_class)
            );
            println!("toasts: {}", context.toasts.len());
        }
        Command::Sources(dir) => match context.style.collect_sources(&dir) {
            Ok(sources) => {
                println!("{} style sources under {}", sources.len(), dir);
                for source in sources {
                    println!("  {}", source);
                }
            }
            Err(e) => eprintln!("error: {}", e),
        },
        Command::Quit => {}
    }
}
