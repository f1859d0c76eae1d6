//! Reusable widgets shared by the chart panels.

pub mod bar_chart;

pub use bar_chart::{BarSeries, DivergingBarChart};
