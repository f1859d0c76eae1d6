//! Rendering of the three tables as text, JSON or CSV.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use marketmitra_core::{MergedRow, SectorPerformanceRecord, SectorRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Column labels that depend on the loaded budget.
pub struct Labels<'a> {
    pub year1: &'a str,
    pub year2: &'a str,
}

/// Rectangular text view of a table, shared by the text and CSV renderers.
struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Columns rendered right-aligned in text mode.
    numeric: Vec<bool>,
}

fn pct(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn amount(value: f64) -> String {
    format!("{value:.2}")
}

fn budget_grid(records: &[SectorRecord], labels: &Labels) -> Grid {
    Grid {
        headers: vec![
            "Sector".into(),
            format!("Budget_{}", labels.year1),
            format!("Budget_{}", labels.year2),
            "Change_%".into(),
        ],
        rows: records
            .iter()
            .map(|r| {
                vec![
                    r.sector.clone(),
                    amount(r.budget_year1),
                    amount(r.budget_year2),
                    pct(Some(r.change_pct)),
                ]
            })
            .collect(),
        numeric: vec![false, true, true, true],
    }
}

fn performance_grid(records: &[SectorPerformanceRecord]) -> Grid {
    Grid {
        headers: vec!["Sector".into(), "Ticker".into(), "Stock_Performance_%".into()],
        rows: records
            .iter()
            .map(|r| vec![r.sector.clone(), r.ticker.clone(), pct(r.performance_pct)])
            .collect(),
        numeric: vec![false, false, true],
    }
}

fn merged_grid(rows: &[MergedRow], labels: &Labels) -> Grid {
    Grid {
        headers: vec![
            "Sector".into(),
            format!("Budget_{}", labels.year1),
            format!("Budget_{}", labels.year2),
            "Change_%".into(),
            "Ticker".into(),
            "Stock_Performance_%".into(),
        ],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.sector.clone(),
                    amount(r.budget_year1),
                    amount(r.budget_year2),
                    pct(r.change_pct),
                    r.ticker.clone().unwrap_or_default(),
                    pct(r.performance_pct),
                ]
            })
            .collect(),
        numeric: vec![false, true, true, true, false, true],
    }
}

impl Grid {
    fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String], absent: &str| -> String {
            cells
                .iter()
                .zip(&widths)
                .zip(&self.numeric)
                .map(|((cell, &w), &numeric)| {
                    let cell = if cell.is_empty() { absent } else { cell.as_str() };
                    if numeric {
                        format!("{cell:>w$}")
                    } else {
                        format!("{cell:<w$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers, "");
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row, "-"));
            out.push('\n');
        }
        out
    }

    fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(vec![]);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        Ok(String::from_utf8(wtr.into_inner()?)?)
    }
}

fn render<T: Serialize + ?Sized>(grid: Grid, records: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(grid.to_text()),
        OutputFormat::Csv => grid.to_csv(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)?;
            json.push('\n');
            Ok(json)
        }
    }
}

pub fn render_budget(records: &[SectorRecord], labels: &Labels, format: OutputFormat) -> Result<String> {
    render(budget_grid(records, labels), records, format)
}

pub fn render_performance(records: &[SectorPerformanceRecord], format: OutputFormat) -> Result<String> {
    render(performance_grid(records), records, format)
}

pub fn render_merged(rows: &[MergedRow], labels: &Labels, format: OutputFormat) -> Result<String> {
    render(merged_grid(rows, labels), rows, format)
}
