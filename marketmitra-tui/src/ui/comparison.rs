//! Panel 3: budget change vs stock return, grouped by sector.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use marketmitra_core::{melt, DashboardData, Metric, MetricPoint};

use crate::app::AppState;
use crate::theme::{self, Theme};
use crate::ui::widgets::{BarSeries, DivergingBarChart};

pub fn render(f: &mut Frame, area: Rect, app: &AppState, data: &DashboardData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let title = Line::from(Span::styled(
        format!(
            "Budget Allocation Change ({} → {}) vs Stock Return ({})",
            data.year1_label, data.year2_label, data.window_label
        ),
        theme::accent_bold(),
    ));
    f.render_widget(Paragraph::new(title), chunks[0]);

    let rows = app.filtered_rows();
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No sectors selected. Press a to select all.",
                theme::muted(),
            )),
            chunks[1],
        );
        return;
    }

    let points = melt(&rows);
    let palette = Theme::default();
    let chart = DivergingBarChart::new(rows.iter().map(|r| r.sector.as_str()).collect())
        .series(series(&points, Metric::BudgetChange, palette.budget))
        .series(series(&points, Metric::StockPerformance, palette.market));
    f.render_widget(chart, chunks[1]);
}

fn series(points: &[MetricPoint], metric: Metric, color: ratatui::style::Color) -> BarSeries<'static> {
    BarSeries {
        label: metric.column(),
        color,
        values: points
            .iter()
            .filter(|p| p.metric == metric)
            .map(|p| p.value)
            .collect(),
    }
}
