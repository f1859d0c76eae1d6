//! Joining the budget and performance tables.
//!
//! - `merge`: left join on sector, one row per budget sector
//! - `filter_sectors`: the sidebar / `--sectors` selection
//! - `melt`: long form feeding the grouped comparison chart

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::budget::SectorRecord;
use crate::coerce::finite;
use crate::market::SectorPerformanceRecord;

/// One budget sector with its market figure, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub sector: String,
    pub budget_year1: f64,
    pub budget_year2: f64,
    pub change_pct: Option<f64>,
    pub ticker: Option<String>,
    pub performance_pct: Option<f64>,
}

/// The two series compared per sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Change_%")]
    BudgetChange,
    #[serde(rename = "Stock_Performance_%")]
    StockPerformance,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::BudgetChange, Metric::StockPerformance];

    /// Column name used in exports and chart legends.
    pub fn column(self) -> &'static str {
        match self {
            Metric::BudgetChange => "Change_%",
            Metric::StockPerformance => "Stock_Performance_%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single (sector, metric, value) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub sector: String,
    pub metric: Metric,
    pub value: Option<f64>,
}

impl MergedRow {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::BudgetChange => self.change_pct,
            Metric::StockPerformance => self.performance_pct,
        }
    }
}

/// Left join on `sector`. Output follows budget order; when several
/// performance records name the same sector the first one wins.
pub fn merge(budget: &[SectorRecord], performance: &[SectorPerformanceRecord]) -> Vec<MergedRow> {
    let mut by_sector: HashMap<&str, &SectorPerformanceRecord> = HashMap::new();
    for record in performance {
        by_sector.entry(record.sector.as_str()).or_insert(record);
    }

    budget
        .iter()
        .map(|b| {
            let perf = by_sector.get(b.sector.as_str());
            MergedRow {
                sector: b.sector.clone(),
                budget_year1: b.budget_year1,
                budget_year2: b.budget_year2,
                change_pct: finite(b.change_pct),
                ticker: perf.map(|p| p.ticker.clone()),
                performance_pct: perf.and_then(|p| p.performance_pct).and_then(finite),
            }
        })
        .collect()
}

/// Rows whose sector is in `selected`, in input order.
pub fn filter_sectors<S: AsRef<str>>(rows: &[MergedRow], selected: &[S]) -> Vec<MergedRow> {
    rows.iter()
        .filter(|r| selected.iter().any(|s| s.as_ref() == r.sector))
        .cloned()
        .collect()
}

/// Two points per row, budget change first, in row order.
pub fn melt(rows: &[MergedRow]) -> Vec<MetricPoint> {
    rows.iter()
        .flat_map(|row| {
            Metric::ALL.into_iter().map(move |metric| MetricPoint {
                sector: row.sector.clone(),
                metric,
                value: row.value(metric),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(sector: &str, y1: f64, y2: f64) -> SectorRecord {
        SectorRecord {
            sector: sector.into(),
            budget_year1: y1,
            budget_year2: y2,
            change_pct: crate::budget::change_pct(y1, y2),
        }
    }

    fn perf(sector: &str, ticker: &str, pct: Option<f64>) -> SectorPerformanceRecord {
        SectorPerformanceRecord {
            sector: sector.into(),
            ticker: ticker.into(),
            performance_pct: pct,
        }
    }

    fn sample() -> Vec<MergedRow> {
        merge(
            &[budget("IT", 0.6, 0.7), budget("Auto", 0.9, 1.1), budget("Defence", 2.0, 2.0)],
            &[
                perf("Auto", "^CNXAUTO", Some(12.5)),
                perf("IT", "^CNXIT", None),
                perf("Auto", "DUPLICATE", Some(99.0)),
                perf("Metals", "^CNXMETAL", Some(3.0)),
            ],
        )
    }

    #[test]
    fn left_join_keeps_budget_order() {
        let rows = sample();
        let sectors: Vec<&str> = rows.iter().map(|r| r.sector.as_str()).collect();
        assert_eq!(sectors, vec!["IT", "Auto", "Defence"]);

        assert_eq!(rows[0].ticker.as_deref(), Some("^CNXIT"));
        assert_eq!(rows[0].performance_pct, None);

        assert_eq!(rows[1].ticker.as_deref(), Some("^CNXAUTO"));
        assert_eq!(rows[1].performance_pct, Some(12.5));

        assert_eq!(rows[2].ticker, None);
        assert_eq!(rows[2].performance_pct, None);
        assert_eq!(rows[2].change_pct, Some(0.0));
    }

    #[test]
    fn non_finite_values_become_absent() {
        let rows = merge(
            &[budget("X", 1.0, 2.0)],
            &[perf("X", "X", Some(f64::NAN))],
        );
        assert_eq!(rows[0].performance_pct, None);
        assert_eq!(rows[0].ticker.as_deref(), Some("X"));
    }

    #[test]
    fn filter_preserves_order() {
        let rows = sample();
        let view = filter_sectors(&rows, &["Defence", "IT"]);
        let sectors: Vec<&str> = view.iter().map(|r| r.sector.as_str()).collect();
        assert_eq!(sectors, vec!["IT", "Defence"]);
    }

    #[test]
    fn empty_selection_is_empty_view() {
        let rows = sample();
        let none: [&str; 0] = [];
        assert!(filter_sectors(&rows, &none).is_empty());
    }

    #[test]
    fn melt_gives_two_points_per_row() {
        let rows = sample();
        let points = melt(&rows);
        assert_eq!(points.len(), 6);
        assert_eq!(points[2].sector, "Auto");
        assert_eq!(points[2].metric, Metric::BudgetChange);
        assert_eq!(points[3].metric, Metric::StockPerformance);
        assert_eq!(points[3].value, Some(12.5));
        assert_eq!(points[1].value, None);
    }

    #[test]
    fn metric_serializes_as_column_name() {
        let json = serde_json::to_string(&Metric::StockPerformance).unwrap();
        assert_eq!(json, "\"Stock_Performance_%\"");
        assert_eq!(Metric::BudgetChange.to_string(), "Change_%");
    }
}
