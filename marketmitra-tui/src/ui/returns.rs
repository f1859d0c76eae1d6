//! Panel 4: stock market returns only.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use marketmitra_core::{DashboardData, Metric};

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
            "Sector Stock Market Returns After Budget {} ({}, post budget)",
            data.year2_label, data.window_label
        ),
        theme::accent_bold(),
    ));
    f.render_widget(Paragraph::new(title), chunks[0]);

    let rows = app.filtered_rows();
    let chart = DivergingBarChart::new(rows.iter().map(|r| r.sector.as_str()).collect()).series(
        BarSeries {
            label: Metric::StockPerformance.column(),
            color: Theme::default().returns,
            values: rows.iter().map(|r| r.value(Metric::StockPerformance)).collect(),
        },
    );
    f.render_widget(chart, chunks[1]);
}
