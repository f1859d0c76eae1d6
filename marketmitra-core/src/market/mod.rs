//! Market data: price sources and the sector performance provider.

pub mod csv_source;
pub mod memory;
pub mod performance;
pub mod provider;
pub mod synthetic;
pub mod tickers;
pub mod yahoo;

pub use csv_source::CsvSource;
pub use memory::StaticSource;
pub use performance::{
    performance_pct, produce_sector_performance, produce_sector_performance_with,
    FetchProgress, NoProgress, SectorPerformanceRecord,
};
pub use provider::{DataError, PriceBar, PriceSource};
pub use synthetic::SyntheticSource;
pub use tickers::{SectorTicker, TickerMap};
pub use yahoo::{YahooConfig, YahooSource};
