//! Price source trait and structured error types.
//!
//! The PriceSource trait abstracts over where daily prices come from
//! (Yahoo Finance, a CSV directory, a synthetic generator, an in-memory map)
//! so the performance provider can be driven by a deterministic fake in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::window::DateWindow;

/// Daily OHLC bar. Only `close` is used for performance figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// A bar where every price equals the close.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
        }
    }
}

/// Structured error types for price fetching.
///
/// These are displayable in both CLI and TUI contexts. None of them abort a
/// performance batch: the affected sector just gets an absent figure.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("invalid date window: {0}")]
    InvalidWindow(String),

    #[error("CSV error in {path}: {message}")]
    Csv { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for daily price sources.
///
/// `fetch` returns bars inside the window. An empty vector means the source
/// had no data for the symbol (unknown, delisted, nothing in range); an
/// error means the request itself failed.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over a date window.
    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError>;
}

impl<T: PriceSource + ?Sized> PriceSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        (**self).fetch(symbol, window)
    }
}
