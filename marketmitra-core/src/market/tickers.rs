//! Sector → ticker mapping.
//!
//! Stored as an ordered list rather than a map: the order the caller gives
//! is the order of the performance table.

use serde::{Deserialize, Serialize};

/// One sector and the index ticker that represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorTicker {
    pub sector: String,
    pub ticker: String,
}

/// Ordered sector → ticker mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerMap {
    entries: Vec<SectorTicker>,
}

impl TickerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(sector, ticker)` pairs, keeping their order.
    pub fn from_pairs<S, T>(pairs: impl IntoIterator<Item = (S, T)>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(sector, ticker)| SectorTicker {
                    sector: sector.into(),
                    ticker: ticker.into(),
                })
                .collect(),
        }
    }

    /// NSE sector indices on Yahoo Finance for the default budget sectors.
    ///
    /// Agriculture has no dedicated NSE index; Nifty Commodities stands in.
    pub fn default_nse() -> Self {
        Self::from_pairs([
            ("Infrastructure", "^CNXINFRA"),
            ("Energy", "^CNXENERGY"),
            ("Agriculture", "^CNXCMDT"),
            ("FMCG", "^CNXFMCG"),
            ("IT", "^CNXIT"),
            ("Healthcare", "^CNXPHARMA"),
            ("Auto", "^CNXAUTO"),
        ])
    }

    pub fn push(&mut self, sector: impl Into<String>, ticker: impl Into<String>) {
        self.entries.push(SectorTicker {
            sector: sector.into(),
            ticker: ticker.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectorTicker> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SectorTicker] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First ticker mapped to a sector.
    pub fn ticker_for(&self, sector: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.sector == sector)
            .map(|e| e.ticker.as_str())
    }

    /// Tickers used by more than one sector, with the sectors sharing them.
    ///
    /// Ordered by first appearance of the ticker.
    pub fn shared_tickers(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for entry in &self.entries {
            let ticker = entry.ticker.trim();
            match groups.iter_mut().find(|(t, _)| t.eq_ignore_ascii_case(ticker)) {
                Some((_, sectors)) => sectors.push(entry.sector.clone()),
                None => groups.push((ticker.to_string(), vec![entry.sector.clone()])),
            }
        }
        groups.retain(|(_, sectors)| sectors.len() > 1);
        groups
    }
}

impl<'a> IntoIterator for &'a TickerMap {
    type Item = &'a SectorTicker;
    type IntoIter = std::slice::Iter<'a, SectorTicker>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
