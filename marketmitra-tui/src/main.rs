//! `marketmitra-tui`: five-panel dashboard with a sector filter sidebar.

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marketmitra_core::{DashboardConfig, SourceKind};
use marketmitra_tui::app::AppState;
use marketmitra_tui::worker::{self, WorkerCommand};
use marketmitra_tui::{input, persistence, ui};

#[derive(Parser)]
#[command(name = "marketmitra-tui", version, about = "Union Budget vs. sector market returns dashboard")]
struct Cli {
    /// TOML configuration file. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured price source (yahoo, csv, synthetic).
    #[arg(long)]
    source: Option<SourceKind>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    let config = resolve_config(&cli)?;

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketmitra")
        .join("state.json");
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx).context("spawning worker thread")?;

    let mut app = AppState::new(config, cmd_tx.clone(), resp_rx, state_path.clone());
    persistence::apply(&mut app, persisted);
    app.request_load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        warn!("failed to save state to {}: {e}", state_path.display());
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

/// Config file (or defaults), then environment, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default_onehorn(),
    };
    config.apply_env_overrides()?;
    if let Some(source) = cli.source {
        config.source.kind = source;
    }
    config.validate()?;
    info!(source = %config.source.kind, window = %config.window.label(), "configuration resolved");
    Ok(config)
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() {
    let dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketmitra");
    let Ok(file) = open_log(&dir) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn open_log(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("marketmitra-tui.log"))
}
