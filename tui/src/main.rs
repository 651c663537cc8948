//! Chat Widget TUI Entry Point
//!
//! Launches the chat widget over a placeholder host screen.
//!
//! Usage:
//!   chat-widget [OPTIONS]
//!
//! Options:
//!   --base-url <URL>       Question-answering API base URL
//!   --config <PATH>        Config file (default: ~/.config/chat-widget/widget.toml)
//!   --speed <MS>           Milliseconds per revealed character
//!   --welcome <TEXT>       Welcome message shown on first open
//!   --storage-key <KEY>    Key the session ID is stored under
//!   --no-mouse             Do not capture the mouse

use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_widget_core::config::load_config_from_path;
use chat_widget_core::storage::default_storage_path;
use chat_widget_core::{
    ConfigOverrides, FileSessionStore, HttpBackend, SessionManager, WidgetConfig,
};
use chat_widget_tui::App;

/// Log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "chat_widget=info,chat_widget_core=info,chat_widget_tui=info";

/// Terminal chat widget
#[derive(Parser, Debug)]
#[command(name = "chat-widget", version, about)]
struct Args {
    /// Question-answering API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Config file path
    #[arg(long, env = "CHAT_WIDGET_CONFIG")]
    config: Option<PathBuf>,

    /// Milliseconds per revealed character (0 disables the animation)
    #[arg(long)]
    speed: Option<u64>,

    /// Welcome message shown on first open
    #[arg(long)]
    welcome: Option<String>,

    /// Key the session ID is stored under
    #[arg(long)]
    storage_key: Option<String>,

    /// Do not capture the mouse (follow-ups stay reachable with Tab)
    #[arg(long)]
    no_mouse: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = &self.base_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if let Some(key) = &self.storage_key {
            overrides = overrides.with_storage_key(key.clone());
        }
        if let Some(welcome) = &self.welcome {
            overrides = overrides.with_welcome_message(welcome.clone());
        }
        if let Some(speed) = self.speed {
            overrides = overrides.with_typewriter_speed_ms(speed);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The screen belongs to the UI, so logs go to a file
    init_logging()?;

    let mut config = load_config_from_path(
        args.config
            .clone()
            .or_else(chat_widget_core::config::default_config_path),
    )
    .context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command line options")?;
    tracing::info!(source = %config.source(), "Configuration loaded");

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: chat-widget requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    let session = build_session(config)?;
    let mouse = !args.no_mouse;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let size = terminal.size()?;
    let mut app = App::new(session, (size.width, size.height));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

/// Wire the HTTP backend and the file store into a session manager
fn build_session(
    config: WidgetConfig,
) -> anyhow::Result<SessionManager<HttpBackend, FileSessionStore>> {
    // A missing base URL is reported by the session manager itself
    let base_url = config.effective_base_url().unwrap_or_default().to_string();
    let backend = HttpBackend::with_timeout(base_url, config.request_timeout)
        .context("Failed to build HTTP client")?;

    let storage_path = config
        .storage_path
        .clone()
        .or_else(default_storage_path)
        .context("No data directory for session storage; set storage.path")?;
    let store = FileSessionStore::new(storage_path);

    let mut session = SessionManager::new(config, Arc::new(backend), store)
        .with_on_init(|| tracing::info!("Chat widget ready"));
    session.initialize();

    Ok(session)
}

/// Log to `<state dir>/chat-widget/tui.log`, filtered by `RUST_LOG`
fn init_logging() -> anyhow::Result<()> {
    let Some(dir) = dirs::state_dir()
        .or_else(dirs::data_dir)
        .map(|p| p.join("chat-widget"))
    else {
        return Ok(());
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file = File::create(dir.join("tui.log")).context("Failed to create log file")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();

    Ok(())
}
