//! Property tests for the table invariants.
//!
//! Uses proptest to verify:
//! 1. Budget change formula holds for every valid row
//! 2. Performance is first-to-last close, rounded to two decimals
//! 3. Merge is a left join: each budget sector exactly once, in order
//! 4. Fetch mode never changes the performance table

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashSet;

use marketmitra_core::coerce::round2;
use marketmitra_core::market::{performance_pct, StaticSource};
use marketmitra_core::{
    merge, produce_budget_table, produce_sector_performance,
    produce_sector_performance_with, BudgetEntry, BudgetTable, DateWindow, FetchMode, NoProgress,
    PriceBar, SectorPerformanceRecord, TickerMap,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_allocation() -> impl Strategy<Value = f64> {
    prop_oneof![0.01..100.0_f64, -100.0..-0.01_f64]
}

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..5000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_budget() -> impl Strategy<Value = Vec<BudgetEntry>> {
    prop::collection::vec((arb_allocation(), arb_allocation()), 1..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (y1, y2))| BudgetEntry::new(format!("Sector{i}"), y1, y2))
            .collect()
    })
}

fn window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

// ── 1. Budget formula ────────────────────────────────────────────────

proptest! {
    #[test]
    fn change_pct_matches_formula(entries in arb_budget()) {
        let table = BudgetTable::new(entries.clone()).unwrap();
        let records = produce_budget_table(&table);
        prop_assert_eq!(records.len(), entries.len());
        for (record, entry) in records.iter().zip(&entries) {
            prop_assert_eq!(&record.sector, &entry.sector);
            let expected = (entry.year2 - entry.year1) / entry.year1 * 100.0;
            prop_assert!((record.change_pct - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn produce_is_idempotent(entries in arb_budget()) {
        let table = BudgetTable::new(entries).unwrap();
        prop_assert_eq!(produce_budget_table(&table), produce_budget_table(&table));
    }
}

// ── 2. Performance formula ───────────────────────────────────────────

proptest! {
    #[test]
    fn performance_is_first_to_last(closes in prop::collection::vec(arb_close(), 1..120)) {
        let bars: Vec<PriceBar> = window_start()
            .iter_days()
            .zip(&closes)
            .map(|(d, &c)| PriceBar::from_close(d, c))
            .collect();
        let first = closes[0];
        let last = closes[closes.len() - 1];
        let expected = round2((last - first) / first * 100.0);
        prop_assert_eq!(performance_pct(&bars), Some(expected));
    }

    #[test]
    fn performance_ignores_input_order(closes in prop::collection::vec(arb_close(), 2..60)) {
        let mut bars: Vec<PriceBar> = window_start()
            .iter_days()
            .zip(&closes)
            .map(|(d, &c)| PriceBar::from_close(d, c))
            .collect();
        let sorted = performance_pct(&bars);
        bars.reverse();
        prop_assert_eq!(performance_pct(&bars), sorted);
    }
}

// ── 3. Left join ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn merge_is_left_join(
        entries in arb_budget(),
        mapped in prop::collection::vec(any::<bool>(), 12),
        extra in 0usize..4,
    ) {
        let table = BudgetTable::new(entries).unwrap();
        let budget = produce_budget_table(&table);

        let mut performance: Vec<SectorPerformanceRecord> = budget
            .iter()
            .zip(&mapped)
            .filter(|(_, keep)| **keep)
            .map(|(b, _)| SectorPerformanceRecord {
                sector: b.sector.clone(),
                ticker: format!("T-{}", b.sector),
                performance_pct: Some(1.0),
            })
            .collect();
        for i in 0..extra {
            performance.push(SectorPerformanceRecord {
                sector: format!("Unbudgeted{i}"),
                ticker: format!("U{i}"),
                performance_pct: Some(2.0),
            });
        }

        let rows = merge(&budget, &performance);
        prop_assert_eq!(rows.len(), budget.len());
        let unique: HashSet<&str> = rows.iter().map(|r| r.sector.as_str()).collect();
        prop_assert_eq!(unique.len(), rows.len());
        for ((row, b), keep) in rows.iter().zip(&budget).zip(&mapped) {
            prop_assert_eq!(&row.sector, &b.sector);
            if *keep {
                prop_assert_eq!(row.performance_pct, Some(1.0));
                prop_assert!(row.ticker.is_some());
            } else {
                prop_assert_eq!(row.performance_pct, None);
                prop_assert!(row.ticker.is_none());
            }
        }
    }
}

// ── 4. Fetch modes ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fetch_modes_agree(outcomes in prop::collection::vec(0u8..3, 1..16)) {
        let mut source = StaticSource::new();
        let mut tickers = TickerMap::new();
        for (i, outcome) in outcomes.iter().enumerate() {
            let ticker = format!("TK{i}");
            source = match outcome {
                0 => source.with_closes(ticker.clone(), window_start(), &[100.0, 100.0 + i as f64]),
                1 => source.with_failure(ticker.clone(), "timeout"),
                _ => source,
            };
            tickers.push(format!("S{i}"), ticker);
        }

        let window = DateWindow::default();
        let seq = produce_sector_performance(&source, &tickers, &window);
        let par = produce_sector_performance_with(
            &source, &tickers, &window, FetchMode::Parallel, &NoProgress,
        );
        prop_assert_eq!(&seq, &par);
        prop_assert_eq!(seq.len(), outcomes.len());
        for (record, outcome) in seq.iter().zip(&outcomes) {
            prop_assert_eq!(record.performance_pct.is_some(), *outcome == 0);
        }
    }
}
