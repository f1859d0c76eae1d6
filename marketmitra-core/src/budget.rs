//! Budget table provider: per-sector allocations for two fiscal years.
//!
//! The figures are placeholder configuration, not ingested budget data.
//! A `BudgetTable` can only be built through `BudgetTable::new` (or
//! deserialized, which goes through the same checks), so every table that
//! reaches `produce_budget_table` has a non-zero year-1 figure per sector.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// One configured budget line: a sector and its allocation in both years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub sector: String,
    pub year1: f64,
    pub year2: f64,
}

impl BudgetEntry {
    pub fn new(sector: impl Into<String>, year1: f64, year2: f64) -> Self {
        Self {
            sector: sector.into(),
            year1,
            year2,
        }
    }
}

/// Validated budget table with display labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBudgetTable")]
pub struct BudgetTable {
    year1_label: String,
    year2_label: String,
    unit: String,
    sectors: Vec<BudgetEntry>,
}

#[derive(Deserialize)]
struct RawBudgetTable {
    #[serde(default = "default_year1_label")]
    year1_label: String,
    #[serde(default = "default_year2_label")]
    year2_label: String,
    #[serde(default = "default_unit")]
    unit: String,
    sectors: Vec<BudgetEntry>,
}

fn default_year1_label() -> String {
    "Feb 2023".into()
}

fn default_year2_label() -> String {
    "Feb 2024".into()
}

fn default_unit() -> String {
    "₹ Lakh Crores".into()
}

impl TryFrom<RawBudgetTable> for BudgetTable {
    type Error = ConfigError;

    fn try_from(raw: RawBudgetTable) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.sectors)?.with_labels(raw.year1_label, raw.year2_label, raw.unit))
    }
}

impl BudgetTable {
    /// Build a table, rejecting entries that would make `change_pct` undefined.
    pub fn new(sectors: Vec<BudgetEntry>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for entry in &sectors {
            let name = entry.sector.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid("budget sector name is empty".into()));
            }
            if !seen.insert(name.to_string()) {
                return Err(ConfigError::Invalid(format!(
                    "budget sector '{name}' is listed more than once"
                )));
            }
            if !entry.year1.is_finite() || entry.year1 == 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "budget for '{name}': year-1 allocation must be finite and non-zero, got {}",
                    entry.year1
                )));
            }
            if !entry.year2.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "budget for '{name}': year-2 allocation must be finite, got {}",
                    entry.year2
                )));
            }
        }

        Ok(Self {
            year1_label: default_year1_label(),
            year2_label: default_year2_label(),
            unit: default_unit(),
            sectors,
        })
    }

    /// Set the column labels and unit shown by the dashboards.
    pub fn with_labels(
        mut self,
        year1_label: impl Into<String>,
        year2_label: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        self.year1_label = year1_label.into();
        self.year2_label = year2_label.into();
        self.unit = unit.into();
        self
    }

    /// Placeholder Union Budget shares, Feb 2023 vs Feb 2024.
    pub fn default_union_budget() -> Self {
        let sectors = [
            ("Infrastructure", 2.4, 2.7),
            ("Energy", 1.1, 1.3),
            ("Agriculture", 1.6, 1.9),
            ("FMCG", 0.8, 0.9),
            ("IT", 0.6, 0.7),
            ("Healthcare", 1.2, 1.4),
            ("Auto", 0.9, 1.1),
        ]
        .into_iter()
        .map(|(sector, y1, y2)| BudgetEntry::new(sector, y1, y2))
        .collect();

        Self {
            year1_label: default_year1_label(),
            year2_label: default_year2_label(),
            unit: default_unit(),
            sectors,
        }
    }

    pub fn entries(&self) -> &[BudgetEntry] {
        &self.sectors
    }

    pub fn year1_label(&self) -> &str {
        &self.year1_label
    }

    pub fn year2_label(&self) -> &str {
        &self.year2_label
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.iter().map(|e| e.sector.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl Default for BudgetTable {
    fn default() -> Self {
        Self::default_union_budget()
    }
}

/// A budget row with its derived percentage change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    pub sector: String,
    pub budget_year1: f64,
    pub budget_year2: f64,
    pub change_pct: f64,
}

/// `(year2 - year1) / year1 * 100`, unrounded.
pub fn change_pct(year1: f64, year2: f64) -> f64 {
    (year2 - year1) / year1 * 100.0
}

/// Produce the budget table in configured order. Pure and deterministic.
pub fn produce_budget_table(table: &BudgetTable) -> Vec<SectorRecord> {
    table
        .entries()
        .iter()
        .map(|e| SectorRecord {
            sector: e.sector.clone(),
            budget_year1: e.year1,
            budget_year2: e.year2,
            change_pct: change_pct(e.year1, e.year2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_sector_growth_is_22_22() {
        let records = produce_budget_table(&BudgetTable::default_union_budget());
        let auto = records.iter().find(|r| r.sector == "Auto").unwrap();
        assert!((auto.change_pct - 22.222_222_222).abs() < 1e-6);
    }

    #[test]
    fn default_table_has_seven_sectors_in_order() {
        let table = BudgetTable::default_union_budget();
        assert_eq!(
            table.sector_names(),
            vec!["Infrastructure", "Energy", "Agriculture", "FMCG", "IT", "Healthcare", "Auto"]
        );
        assert_eq!(table.year1_label(), "Feb 2023");
        assert_eq!(table.year2_label(), "Feb 2024");
        assert_eq!(table.unit(), "₹ Lakh Crores");
    }

    #[test]
    fn produce_is_idempotent() {
        let table = BudgetTable::default_union_budget();
        assert_eq!(produce_budget_table(&table), produce_budget_table(&table));
    }

    #[test]
    fn negative_change_is_kept() {
        let table = BudgetTable::new(vec![BudgetEntry::new("Defence", 2.0, 1.5)]).unwrap();
        let records = produce_budget_table(&table);
        assert!((records[0].change_pct + 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_base_is_rejected() {
        let err = BudgetTable::new(vec![BudgetEntry::new("Space", 0.0, 0.4)]).unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn duplicate_and_blank_sectors_are_rejected() {
        assert!(BudgetTable::new(vec![
            BudgetEntry::new("IT", 0.6, 0.7),
            BudgetEntry::new("IT", 0.6, 0.8),
        ])
        .is_err());
        assert!(BudgetTable::new(vec![BudgetEntry::new("  ", 1.0, 1.0)]).is_err());
    }

    #[test]
    fn non_finite_figures_are_rejected() {
        assert!(BudgetTable::new(vec![BudgetEntry::new("IT", f64::NAN, 0.7)]).is_err());
        assert!(BudgetTable::new(vec![BudgetEntry::new("IT", 0.6, f64::INFINITY)]).is_err());
    }

    #[test]
    fn deserialization_runs_validation() {
        let ok: Result<BudgetTable, _> = toml::from_str(
            r#"
            year1_label = "FY23"
            unit = "Crores"
            [[sectors]]
            sector = "IT"
            year1 = 0.6
            year2 = 0.7
            "#,
        );
        let table = ok.unwrap();
        assert_eq!(table.year1_label(), "FY23");
        assert_eq!(table.year2_label(), "Feb 2024");
        assert_eq!(table.unit(), "Crores");

        let bad: Result<BudgetTable, _> = toml::from_str(
            r#"
            [[sectors]]
            sector = "IT"
            year1 = 0.0
            year2 = 0.7
            "#,
        );
        assert!(bad.is_err());
    }
}
