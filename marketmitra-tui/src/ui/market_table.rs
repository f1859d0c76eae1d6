//! Panel 2: sector index performance over the post-budget window.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use marketmitra_core::DashboardData;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect, data: &DashboardData) {
    let sector_w = data
        .performance
        .iter()
        .map(|r| r.sector.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sector".len());
    let ticker_w = data
        .performance
        .iter()
        .map(|r| r.ticker.chars().count())
        .max()
        .unwrap_or(0)
        .max("Ticker".len());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("Sector-wise Market Performance ({})", data.window_label),
                theme::accent_bold(),
            ),
            Span::styled(format!("  source: {}", data.source_name), theme::muted()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{:<sector_w$}  {:<ticker_w$}  {:>19}",
                "Sector", "Ticker", "Stock_Performance_%"
            ),
            theme::accent_bold(),
        )),
    ];

    for record in &data.performance {
        let value = match record.performance_pct {
            Some(v) => format!("{v:>19.2}"),
            None => format!("{:>19}", "n/a"),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<sector_w$}  ", record.sector), theme::text()),
            Span::styled(format!("{:<ticker_w$}  ", record.ticker), theme::muted()),
            Span::styled(value, theme::value_style(record.performance_pct)),
        ]));
    }

    let absent = data.absent_performance();
    if absent > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{absent} of {} tickers returned no data for this window",
                data.performance.len()
            ),
            theme::warning(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}
