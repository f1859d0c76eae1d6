//! Sector performance provider.
//!
//! Fetches a daily series per mapped ticker and reduces it to a single
//! first-to-last close return over the window. Fetch failures and empty
//! series are soft: the sector keeps its row with an absent figure.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::provider::{DataError, PriceBar, PriceSource};
use super::tickers::{SectorTicker, TickerMap};
use crate::coerce::{finite, round2};
use crate::config::FetchMode;
use crate::window::DateWindow;

/// Market return of one sector's index over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPerformanceRecord {
    pub sector: String,
    pub ticker: String,
    /// Percent change first close → last close, two decimals. `None` when
    /// the source returned no usable data.
    pub performance_pct: Option<f64>,
}

/// Progress callback for a performance batch.
///
/// Implementations must be `Sync`: in parallel mode callbacks arrive from
/// worker threads in no particular order.
pub trait FetchProgress: Send + Sync {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a fetch completes. `Ok` carries the number of bars received.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<usize, DataError>);

    /// Called once the whole batch is done. `missing` counts absent figures.
    fn on_batch_complete(&self, with_data: usize, missing: usize, total: usize);
}

/// Progress observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        _result: &Result<usize, DataError>,
    ) {
    }

    fn on_batch_complete(&self, _with_data: usize, _missing: usize, _total: usize) {}
}

/// Percent change from the first to the last finite close, by date.
///
/// Returns `None` for an empty series, a series without finite closes, or a
/// zero first close.
pub fn performance_pct(bars: &[PriceBar]) -> Option<f64> {
    let mut closes: Vec<&PriceBar> = bars.iter().filter(|b| b.close.is_finite()).collect();
    if closes.is_empty() {
        return None;
    }
    closes.sort_by_key(|b| b.date);
    let first = closes.first()?.close;
    let last = closes.last()?.close;
    if first == 0.0 {
        return None;
    }
    finite((last - first) / first * 100.0).map(round2)
}

/// Compute performance for every mapped sector, sequentially, without
/// progress reporting.
pub fn produce_sector_performance<S>(
    source: &S,
    tickers: &TickerMap,
    window: &DateWindow,
) -> Vec<SectorPerformanceRecord>
where
    S: PriceSource + ?Sized,
{
    produce_sector_performance_with(source, tickers, window, FetchMode::Sequential, &NoProgress)
}

/// Compute performance for every mapped sector.
///
/// Output order equals the mapping's order in both modes.
pub fn produce_sector_performance_with<S>(
    source: &S,
    tickers: &TickerMap,
    window: &DateWindow,
    mode: FetchMode,
    progress: &dyn FetchProgress,
) -> Vec<SectorPerformanceRecord>
where
    S: PriceSource + ?Sized,
{
    let total = tickers.len();
    debug!(source = source.name(), total, ?mode, "fetching sector performance");

    let records: Vec<SectorPerformanceRecord> = match mode {
        FetchMode::Sequential => tickers
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| fetch_one(source, entry, window, i, total, progress))
            .collect(),
        FetchMode::Parallel => tickers
            .entries()
            .par_iter()
            .enumerate()
            .map(|(i, entry)| fetch_one(source, entry, window, i, total, progress))
            .collect(),
    };

    let missing = records.iter().filter(|r| r.performance_pct.is_none()).count();
    progress.on_batch_complete(total - missing, missing, total);
    info!(
        source = source.name(),
        total,
        missing,
        "sector performance batch complete"
    );
    records
}

fn fetch_one<S>(
    source: &S,
    entry: &SectorTicker,
    window: &DateWindow,
    index: usize,
    total: usize,
    progress: &dyn FetchProgress,
) -> SectorPerformanceRecord
where
    S: PriceSource + ?Sized,
{
    progress.on_start(&entry.ticker, index, total);

    let result = source.fetch(&entry.ticker, window);
    let performance_pct = match &result {
        Ok(bars) if bars.is_empty() => {
            warn!(sector = %entry.sector, ticker = %entry.ticker, "no price data returned");
            None
        }
        Ok(bars) => {
            let pct = performance_pct(bars);
            if pct.is_none() {
                warn!(sector = %entry.sector, ticker = %entry.ticker, "price series has no usable closes");
            } else {
                debug!(sector = %entry.sector, ticker = %entry.ticker, bars = bars.len(), ?pct, "fetched");
            }
            pct
        }
        Err(e) => {
            warn!(sector = %entry.sector, ticker = %entry.ticker, error = %e, "price fetch failed");
            None
        }
    };

    let outcome = result.map(|bars| bars.len());
    progress.on_complete(&entry.ticker, index, total, &outcome);

    SectorPerformanceRecord {
        sector: entry.sector.clone(),
        ticker: entry.ticker.clone(),
        performance_pct,
    }
}
