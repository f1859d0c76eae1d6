//! Dashboard configuration.
//!
//! Everything the loader needs (date window, budget table, ticker mapping,
//! price source selection) lives in one TOML file. Every section is
//! optional and falls back to the Onehorn dashboard defaults, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::budget::BudgetTable;
use crate::market::{
    CsvSource, DataError, PriceSource, SyntheticSource, TickerMap, YahooConfig, YahooSource,
};
use crate::window::DateWindow;

/// Environment variable overriding `[source] kind`.
pub const ENV_SOURCE: &str = "MARKETMITRA_SOURCE";
/// Environment variable overriding `[yahoo] base_url`.
pub const ENV_YAHOO_BASE_URL: &str = "MARKETMITRA_YAHOO_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which price source backs the market performance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Yahoo, SourceKind::Csv, SourceKind::Synthetic];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Yahoo => "yahoo",
            SourceKind::Csv => "csv",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "unknown source kind '{wanted}' (expected yahoo, csv or synthetic)"
                ))
            })
    }
}

/// How tickers are fetched within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// One ticker after another.
    #[default]
    Sequential,
    /// Tickers fetched concurrently on the rayon pool.
    Parallel,
}

/// `[source]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory of `<TICKER>.csv` files, for `kind = "csv"`.
    pub csv_dir: PathBuf,
    /// Seed for `kind = "synthetic"`.
    pub seed: u64,
    pub fetch_mode: FetchMode,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            csv_dir: PathBuf::from("prices"),
            seed: 42,
            fetch_mode: FetchMode::Sequential,
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub window: DateWindow,
    pub source: SourceConfig,
    pub yahoo: YahooConfig,
    pub budget: BudgetTable,
    pub tickers: TickerMap,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::default_onehorn()
    }
}

impl DashboardConfig {
    /// The Onehorn dashboard constants: Feb 2023/2024 budget shares, NSE
    /// sector indices and the Jan–Jun 2024 window, fetched from Yahoo.
    pub fn default_onehorn() -> Self {
        Self {
            window: DateWindow::default_post_budget(),
            source: SourceConfig::default(),
            yahoo: YahooConfig::default(),
            budget: BudgetTable::default_union_budget(),
            tickers: TickerMap::default_nse(),
        }
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `MARKETMITRA_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Blank values are ignored.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(kind) = get(ENV_SOURCE) {
            self.source.kind = kind.parse()?;
            debug!(kind = %self.source.kind, "source kind overridden from environment");
        }
        if let Some(url) = get(ENV_YAHOO_BASE_URL) {
            self.yahoo.base_url = url.trim().to_string();
            debug!(url = %self.yahoo.base_url, "Yahoo base URL overridden from environment");
        }
        Ok(())
    }

    /// Structural checks that do not involve fetching anything.
    ///
    /// An empty budget table or ticker mapping is not a config error: the
    /// loader reports those as empty tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.window.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "date window {} .. {} is empty",
                self.window.start, self.window.end
            )));
        }
        for entry in &self.tickers {
            if entry.sector.trim().is_empty() {
                return Err(ConfigError::Invalid("ticker mapping has an empty sector name".into()));
            }
            if entry.ticker.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "sector '{}' is mapped to an empty ticker",
                    entry.sector
                )));
            }
        }
        if self.source.kind == SourceKind::Yahoo && self.yahoo.timeout_secs == 0 {
            return Err(ConfigError::Invalid("yahoo.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Construct the configured price source.
    pub fn build_source(&self) -> Result<Box<dyn PriceSource>, DataError> {
        let source: Box<dyn PriceSource> = match self.source.kind {
            SourceKind::Yahoo => Box::new(YahooSource::new(self.yahoo.clone())?),
            SourceKind::Csv => Box::new(CsvSource::new(self.source.csv_dir.clone())),
            SourceKind::Synthetic => Box::new(SyntheticSource::new(self.source.seed)),
        };
        debug!(source = source.name(), "price source ready");
        Ok(source)
    }
}
