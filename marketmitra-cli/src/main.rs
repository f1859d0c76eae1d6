//! MarketMitra CLI: budget allocations vs. sector market performance.
//!
//! Commands:
//! - `budget`: print the budget table with per-sector change %
//! - `performance`: fetch and print the sector index returns
//! - `compare`: print the merged view, optionally filtered by sector
//! - `export`: write the merged view to a CSV file
//! - `config init` / `config show`: write or print the configuration

mod output;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use marketmitra_core::{
    filter_sectors, load_dashboard_with, produce_budget_table, produce_sector_performance_with,
    DashboardConfig, DashboardError, DataError, FetchMode, FetchProgress, NoProgress, SourceKind,
};
use output::{render_budget, render_merged, render_performance, Labels, OutputFormat};

#[derive(Parser)]
#[command(
    name = "marketmitra",
    version,
    about = "MarketMitra CLI: Union Budget allocations vs. NSE sector performance"
)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Price source, overriding the config file and MARKETMITRA_SOURCE.
    #[arg(long, global = true, value_enum)]
    source: Option<SourceArg>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Fetch tickers concurrently.
    #[arg(long, global = true, default_value_t = false)]
    parallel: bool,

    /// Suppress per-ticker progress on stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Yahoo,
    Csv,
    Synthetic,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Yahoo => SourceKind::Yahoo,
            SourceArg::Csv => SourceKind::Csv,
            SourceArg::Synthetic => SourceKind::Synthetic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the budget table.
    Budget,
    /// Fetch and print the market performance table.
    Performance,
    /// Print budget change next to market performance per sector.
    Compare {
        /// Comma-separated sectors to keep (e.g. IT,Auto). All when omitted.
        #[arg(long, value_delimiter = ',')]
        sectors: Option<Vec<String>>,
    },
    /// Write the merged view as CSV.
    Export {
        /// Destination file.
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated sectors to keep. All when omitted.
        #[arg(long, value_delimiter = ',')]
        sectors: Option<Vec<String>>,
    },
    /// Configuration file commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration as TOML.
    Init {
        /// Destination file.
        #[arg(short, long, default_value = "marketmitra.toml")]
        output: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective configuration (file + environment + flags).
    Show,
}

/// Per-ticker progress on stderr, so stdout stays machine-readable.
struct StderrProgress;

impl FetchProgress for StderrProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        eprintln!("[{}/{}] Fetching {ticker}...", index + 1, total);
    }

    fn on_complete(&self, ticker: &str, _index: usize, _total: usize, result: &Result<usize, DataError>) {
        match result {
            Ok(0) => eprintln!("  NO DATA: {ticker}"),
            Ok(n) => eprintln!("  OK: {ticker} ({n} bars)"),
            Err(e) => eprintln!("  FAIL: {ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, with_data: usize, missing: usize, total: usize) {
        eprintln!("Fetch complete: {with_data}/{total} with data, {missing} missing");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Config {
        action: ConfigAction::Init { output, force },
    } = &cli.command
    {
        return run_config_init(output, *force);
    }

    let config = resolve_config(&cli)?;
    let progress: &dyn FetchProgress = if cli.quiet { &NoProgress } else { &StderrProgress };

    match &cli.command {
        Commands::Budget => run_budget(&config, cli.format),
        Commands::Performance => run_performance(&config, cli.format, progress),
        Commands::Compare { sectors } => {
            let sectors = sectors.as_deref().map(trim_sectors);
            run_compare(&config, sectors.as_deref(), cli.format, progress)
        }
        Commands::Export { output, sectors } => {
            let sectors = sectors.as_deref().map(trim_sectors);
            run_export(&config, sectors.as_deref(), output, progress)
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Config {
            action: ConfigAction::Init { .. },
        } => Ok(()),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
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
        config.source.kind = source.into();
    }
    if cli.parallel {
        config.source.fetch_mode = FetchMode::Parallel;
    }
    config.validate()?;
    info!(source = %config.source.kind, window = %config.window.label(), "configuration resolved");
    Ok(config)
}

fn labels(config: &DashboardConfig) -> Labels<'_> {
    Labels {
        year1: config.budget.year1_label(),
        year2: config.budget.year2_label(),
    }
}

fn run_budget(config: &DashboardConfig, format: OutputFormat) -> Result<()> {
    let records = produce_budget_table(&config.budget);
    if records.is_empty() {
        return Err(DashboardError::EmptyBudgetTable.into());
    }
    print!("{}", render_budget(&records, &labels(config), format)?);
    if format == OutputFormat::Table {
        println!("Unit: {}", config.budget.unit());
    }
    Ok(())
}

fn run_performance(
    config: &DashboardConfig,
    format: OutputFormat,
    progress: &dyn FetchProgress,
) -> Result<()> {
    let source = config.build_source()?;
    let records = produce_sector_performance_with(
        &source,
        &config.tickers,
        &config.window,
        config.source.fetch_mode,
        progress,
    );
    if records.is_empty() {
        return Err(DashboardError::EmptyPerformanceTable.into());
    }
    print!("{}", render_performance(&records, format)?);
    if format == OutputFormat::Table {
        println!("Window: {} ({})", config.window.label(), source.name());
    }
    Ok(())
}

/// `--sectors "IT, Auto"` names the same sectors as `--sectors IT,Auto`.
fn trim_sectors(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn run_compare(
    config: &DashboardConfig,
    sectors: Option<&[String]>,
    format: OutputFormat,
    progress: &dyn FetchProgress,
) -> Result<()> {
    let source = config.build_source()?;
    let data = load_dashboard_with(config, &source, progress)?;
    let rows = match sectors {
        Some(selected) => filter_sectors(&data.merged, selected),
        None => data.merged.clone(),
    };

    if format == OutputFormat::Table {
        for warning in &data.warnings {
            eprintln!("WARNING: {warning}");
        }
        if rows.is_empty() {
            println!("No sectors selected.");
            return Ok(());
        }
    }
    print!("{}", render_merged(&rows, &labels(config), format)?);
    Ok(())
}

fn run_export(
    config: &DashboardConfig,
    sectors: Option<&[String]>,
    output: &Path,
    progress: &dyn FetchProgress,
) -> Result<()> {
    let source = config.build_source()?;
    let data = load_dashboard_with(config, &source, progress)?;
    let rows = match sectors {
        Some(selected) => filter_sectors(&data.merged, selected),
        None => data.merged,
    };
    let csv = render_merged(&rows, &labels(config), OutputFormat::Csv)?;
    std::fs::write(output, csv).with_context(|| format!("writing {}", output.display()))?;
    println!("Exported {} rows to {}", rows.len(), output.display());
    Ok(())
}

fn run_config_init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            output.display()
        );
    }
    let text = DashboardConfig::default_onehorn().to_toml()?;
    std::fs::write(output, text).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}
