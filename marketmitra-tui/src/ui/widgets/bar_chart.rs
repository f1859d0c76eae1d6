//! Horizontal grouped bar chart with a zero axis.
//!
//! One group of rows per category, one row per series. Positive values grow
//! right of the axis and negative values grow left, so budget cuts and market
//! losses read at a glance. Absent values print `n/a` and draw no bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
};

use crate::theme;

const VALUE_WIDTH: u16 = 9;
const ABSENT: &str = "n/a";

/// One metric drawn across every category.
#[derive(Debug, Clone)]
pub struct BarSeries<'a> {
    pub label: &'a str,
    pub color: Color,
    /// Indexed like the chart's categories.
    pub values: Vec<Option<f64>>,
}

pub struct DivergingBarChart<'a> {
    categories: Vec<&'a str>,
    series: Vec<BarSeries<'a>>,
    block: Option<Block<'a>>,
}

impl<'a> DivergingBarChart<'a> {
    pub fn new(categories: Vec<&'a str>) -> Self {
        Self {
            categories,
            series: Vec::new(),
            block: None,
        }
    }

    pub fn series(mut self, series: BarSeries<'a>) -> Self {
        self.series.push(series);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn value(&self, series: usize, category: usize) -> Option<f64> {
        self.series
            .get(series)
            .and_then(|s| s.values.get(category).copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// Value range, always including zero.
    fn range(&self) -> (f64, f64) {
        let mut lo = 0.0_f64;
        let mut hi = 0.0_f64;
        for s in &self.series {
            for v in s.values.iter().flatten().filter(|v| v.is_finite()) {
                lo = lo.min(*v);
                hi = hi.max(*v);
            }
        }
        (lo, hi)
    }
}

impl Widget for DivergingBarChart<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width < 12 || inner.height < 2 {
            return;
        }
        if self.categories.is_empty() || self.series.is_empty() {
            buf.set_string(inner.x, inner.y, "No sectors selected", theme::muted());
            return;
        }

        // Row 0: legend
        let mut x = inner.x;
        for s in &self.series {
            let remaining = inner.right().saturating_sub(x) as usize;
            let (after_swatch, _) =
                buf.set_stringn(x, inner.y, "■ ", remaining, Style::default().fg(s.color));
            let remaining = inner.right().saturating_sub(after_swatch) as usize;
            let label = format!("{}   ", s.label);
            let (next, _) = buf.set_stringn(after_swatch, inner.y, label, remaining, theme::muted());
            x = next;
        }

        let label_width = self
            .categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0)
            .min(inner.width as usize / 3) as u16;
        let plot_x = inner.x + label_width + 1;
        let plot_width = inner.width.saturating_sub(label_width + 1 + VALUE_WIDTH);
        if plot_width < 3 {
            return;
        }
        let plot_right = plot_x + plot_width;

        let (lo, hi) = self.range();
        let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };
        let to_col = |v: f64| -> u16 {
            let frac = ((v - lo) / span).clamp(0.0, 1.0);
            plot_x + (frac * (plot_width - 1) as f64).round() as u16
        };
        let zero_x = to_col(0.0);

        let mut y = inner.y + 1;
        for (ci, category) in self.categories.iter().enumerate() {
            for (si, s) in self.series.iter().enumerate() {
                if y >= inner.bottom() {
                    return;
                }
                if si == 0 {
                    buf.set_stringn(inner.x, y, category, label_width as usize, theme::text());
                }
                buf.set_string(zero_x, y, "│", theme::muted());

                let bar_style = Style::default().fg(s.color);
                let text = match self.value(si, ci) {
                    Some(v) => {
                        let mut end = to_col(v);
                        // Non-zero values always get at least one cell.
                        if v > 0.0 && end == zero_x && zero_x + 1 < plot_right {
                            end = zero_x + 1;
                        } else if v < 0.0 && end == zero_x && zero_x > plot_x {
                            end = zero_x - 1;
                        }
                        let cols = if end > zero_x {
                            (zero_x + 1)..(end + 1)
                        } else {
                            end..zero_x
                        };
                        for col in cols {
                            buf.set_string(col, y, "█", bar_style);
                        }
                        format!("{v:.2}")
                    }
                    None => ABSENT.to_string(),
                };
                let text_style = if text == ABSENT { theme::muted() } else { bar_style };
                buf.set_stringn(
                    plot_right,
                    y,
                    format!("{text:>width$}", width = VALUE_WIDTH as usize),
                    VALUE_WIDTH as usize,
                    text_style,
                );
                y += 1;
            }
            if self.series.len() > 1 {
                y += 1;
            }
        }
    }
}
