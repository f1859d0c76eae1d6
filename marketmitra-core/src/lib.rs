//! MarketMitra Core: budget allocations vs. sector market performance.
//!
//! This crate holds everything the dashboards need apart from rendering:
//! - Budget table provider (two fiscal years, derived change %)
//! - Market performance provider over an injectable `PriceSource`
//! - Price sources: Yahoo Finance, CSV directory, synthetic, in-memory
//! - Left join of the two tables on sector, sector filter, long-form melt
//! - TOML configuration with the Onehorn dashboard defaults
//! - Dashboard loader with whole-table validation and config warnings

pub mod budget;
pub mod coerce;
pub mod config;
pub mod dashboard;
pub mod market;
pub mod merge;
pub mod window;

pub use budget::{produce_budget_table, BudgetEntry, BudgetTable, SectorRecord};
pub use config::{ConfigError, DashboardConfig, FetchMode, SourceConfig, SourceKind};
pub use dashboard::{load_dashboard, load_dashboard_with, DashboardData, DashboardError, LoadWarning};
pub use market::performance::{
    produce_sector_performance, produce_sector_performance_with, FetchProgress, NoProgress,
    SectorPerformanceRecord,
};
pub use market::provider::{DataError, PriceBar, PriceSource};
pub use market::tickers::{SectorTicker, TickerMap};
pub use merge::{filter_sectors, melt, merge, MergedRow, Metric, MetricPoint};
pub use window::DateWindow;
