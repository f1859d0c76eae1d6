//! In-memory price source for tests and embedding callers.

use std::collections::HashMap;

use super::provider::{DataError, PriceBar, PriceSource};
use crate::window::DateWindow;

/// Serves fixed series from a map; unknown symbols have no data.
///
/// Symbols registered with [`StaticSource::with_failure`] return an error
/// instead, to exercise soft-failure paths.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    series: HashMap<String, Vec<PriceBar>>,
    failing: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        self.series.insert(symbol.into(), bars);
        self
    }

    /// Register a symbol whose closes fall on consecutive days from `start`.
    pub fn with_closes(
        self,
        symbol: impl Into<String>,
        start: chrono::NaiveDate,
        closes: &[f64],
    ) -> Self {
        let bars = start
            .iter_days()
            .zip(closes)
            .map(|(date, &close)| PriceBar::from_close(date, close))
            .collect();
        self.with_series(symbol, bars)
    }

    pub fn with_failure(mut self, symbol: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing.insert(symbol.into(), message.into());
        self
    }
}

impl PriceSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, symbol: &str, window: &DateWindow) -> Result<Vec<PriceBar>, DataError> {
        if let Some(message) = self.failing.get(symbol) {
            return Err(DataError::NetworkUnreachable(message.clone()));
        }
        Ok(self
            .series
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| window.contains(b.date))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unknown_symbol_is_empty_and_failures_error() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let source = StaticSource::new()
            .with_closes("A", start, &[1.0, 2.0])
            .with_failure("B", "boom");
        let w = DateWindow::default();
        assert_eq!(source.fetch("A", &w).unwrap().len(), 2);
        assert!(source.fetch("C", &w).unwrap().is_empty());
        assert!(source.fetch("B", &w).is_err());
    }

    #[test]
    fn filters_to_window() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        let source = StaticSource::new().with_closes("A", start, &[1.0, 2.0, 3.0, 4.0]);
        let bars = source.fetch("A", &DateWindow::default()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 3.0);
    }
}
