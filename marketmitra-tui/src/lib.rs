//! MarketMitra TUI: budget vs. market dashboard in the terminal.
//!
//! Panels:
//! 1. Budget: Union Budget comparison table
//! 2. Market: sector index performance table
//! 3. Comparison: budget change vs stock return, grouped bars
//! 4. Returns: stock returns only
//! 5. About: notes and data sources

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, Panel};
