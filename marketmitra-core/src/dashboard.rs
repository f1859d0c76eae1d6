//! Dashboard loader: both tables, the merged view and config warnings.
//!
//! Shared by the CLI and the TUI worker. A missing table is the only hard
//! failure; everything else degrades to absent values plus a warning.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::budget::{produce_budget_table, SectorRecord};
use crate::config::DashboardConfig;
use crate::market::{
    produce_sector_performance_with, FetchProgress, NoProgress, PriceSource,
    SectorPerformanceRecord,
};
use crate::merge::{merge, MergedRow};

/// Whole-table absence. Dashboards show the message and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("No budget data found!")]
    EmptyBudgetTable,

    #[error("No stock performance data found!")]
    EmptyPerformanceTable,
}

/// Non-fatal configuration problems noticed while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadWarning {
    /// Several sectors are mapped to one ticker, so they will report the
    /// same market figure.
    SharedTicker { ticker: String, sectors: Vec<String> },
    /// A budget sector has no ticker, so its market figure is always absent.
    UnmappedSector { sector: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::SharedTicker { ticker, sectors } => {
                write!(f, "ticker {ticker} is shared by {}", sectors.join(", "))
            }
            LoadWarning::UnmappedSector { sector } => {
                write!(f, "sector {sector} has no ticker mapping")
            }
        }
    }
}

/// Everything a dashboard renders after one load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub budget: Vec<SectorRecord>,
    pub performance: Vec<SectorPerformanceRecord>,
    pub merged: Vec<MergedRow>,
    pub warnings: Vec<LoadWarning>,
    pub source_name: String,
    pub year1_label: String,
    pub year2_label: String,
    pub unit: String,
    pub window_label: String,
}

impl DashboardData {
    /// Sector names for the filter, in budget order.
    pub fn sectors(&self) -> Vec<String> {
        self.merged.iter().map(|r| r.sector.clone()).collect()
    }

    /// Performance records without a figure.
    pub fn absent_performance(&self) -> usize {
        self.performance
            .iter()
            .filter(|r| r.performance_pct.is_none())
            .count()
    }

    /// Merged rows without a market figure, including unmapped sectors.
    pub fn absent_merged(&self) -> usize {
        self.merged
            .iter()
            .filter(|r| r.performance_pct.is_none())
            .count()
    }
}

/// Load the dashboard without progress reporting.
pub fn load_dashboard<S>(config: &DashboardConfig, source: &S) -> Result<DashboardData, DashboardError>
where
    S: PriceSource + ?Sized,
{
    load_dashboard_with(config, source, &NoProgress)
}

/// Load the dashboard, reporting per-ticker progress.
pub fn load_dashboard_with<S>(
    config: &DashboardConfig,
    source: &S,
    progress: &dyn FetchProgress,
) -> Result<DashboardData, DashboardError>
where
    S: PriceSource + ?Sized,
{
    let budget = produce_budget_table(&config.budget);
    if budget.is_empty() {
        warn!("budget table is empty");
        return Err(DashboardError::EmptyBudgetTable);
    }

    let performance = produce_sector_performance_with(
        source,
        &config.tickers,
        &config.window,
        config.source.fetch_mode,
        progress,
    );
    if performance.is_empty() {
        warn!("performance table is empty");
        return Err(DashboardError::EmptyPerformanceTable);
    }

    let merged = merge(&budget, &performance);
    let warnings = collect_warnings(config);
    for w in &warnings {
        warn!("{w}");
    }

    let data = DashboardData {
        budget,
        performance,
        merged,
        warnings,
        source_name: source.name().to_string(),
        year1_label: config.budget.year1_label().to_string(),
        year2_label: config.budget.year2_label().to_string(),
        unit: config.budget.unit().to_string(),
        window_label: config.window.label(),
    };
    info!(
        sectors = data.merged.len(),
        absent = data.absent_merged(),
        warnings = data.warnings.len(),
        "dashboard loaded"
    );
    Ok(data)
}

fn collect_warnings(config: &DashboardConfig) -> Vec<LoadWarning> {
    let mut warnings: Vec<LoadWarning> = config
        .tickers
        .shared_tickers()
        .into_iter()
        .map(|(ticker, sectors)| LoadWarning::SharedTicker { ticker, sectors })
        .collect();

    for entry in config.budget.entries() {
        if config.tickers.ticker_for(&entry.sector).is_none() {
            warnings.push(LoadWarning::UnmappedSector {
                sector: entry.sector.clone(),
            });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetEntry, BudgetTable};
    use crate::market::{StaticSource, TickerMap};
    use chrono::NaiveDate;

    fn source() -> StaticSource {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        StaticSource::new()
            .with_closes("^CNXIT", start, &[100.0, 105.0, 98.0, 110.0])
            .with_closes("^CNXAUTO", start, &[200.0, 150.0])
    }

    #[test]
    fn default_config_loads_with_absent_values() {
        let config = DashboardConfig::default_onehorn();
        let data = load_dashboard(&config, &source()).unwrap();
        assert_eq!(data.sectors().len(), 7);
        assert_eq!(data.performance.len(), 7);
        assert_eq!(data.absent_performance(), 5);
        assert!(data.warnings.is_empty());
        assert_eq!(data.source_name, "static");

        let it = data.merged.iter().find(|r| r.sector == "IT").unwrap();
        assert_eq!(it.performance_pct, Some(10.0));
        let auto = data.merged.iter().find(|r| r.sector == "Auto").unwrap();
        assert_eq!(auto.performance_pct, Some(-25.0));
    }

    #[test]
    fn all_absent_is_not_an_error() {
        let config = DashboardConfig::default_onehorn();
        let data = load_dashboard(&config, &StaticSource::new()).unwrap();
        assert_eq!(data.absent_performance(), 7);
    }

    #[test]
    fn empty_budget_is_blocking() {
        let mut config = DashboardConfig::default_onehorn();
        config.budget = BudgetTable::new(Vec::new()).unwrap();
        let err = load_dashboard(&config, &source()).unwrap_err();
        assert_eq!(err, DashboardError::EmptyBudgetTable);
        assert_eq!(err.to_string(), "No budget data found!");
    }

    #[test]
    fn empty_mapping_is_blocking() {
        let mut config = DashboardConfig::default_onehorn();
        config.tickers = TickerMap::new();
        let err = load_dashboard(&config, &source()).unwrap_err();
        assert_eq!(err, DashboardError::EmptyPerformanceTable);
        assert_eq!(err.to_string(), "No stock performance data found!");
    }

    #[test]
    fn warns_about_shared_and_unmapped() {
        let mut config = DashboardConfig::default_onehorn();
        config.budget = BudgetTable::new(vec![
            BudgetEntry::new("Agriculture", 1.6, 1.9),
            BudgetEntry::new("Healthcare", 1.2, 1.4),
            BudgetEntry::new("Defence", 5.9, 6.2),
        ])
        .unwrap();
        config.tickers =
            TickerMap::from_pairs([("Agriculture", "^CNXPHARMA"), ("Healthcare", "^CNXPHARMA")]);
        let data = load_dashboard(&config, &source()).unwrap();
        assert_eq!(
            data.warnings,
            vec![
                LoadWarning::SharedTicker {
                    ticker: "^CNXPHARMA".into(),
                    sectors: vec!["Agriculture".into(), "Healthcare".into()],
                },
                LoadWarning::UnmappedSector {
                    sector: "Defence".into()
                },
            ]
        );
        assert_eq!(data.absent_merged(), 3);
    }
}
