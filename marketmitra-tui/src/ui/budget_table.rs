//! Panel 1: Union Budget comparison table (all sectors, unfiltered).

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use marketmitra_core::DashboardData;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect, data: &DashboardData) {
    let budget1 = format!("Budget_{}", data.year1_label);
    let budget2 = format!("Budget_{}", data.year2_label);
    let sector_w = data
        .budget
        .iter()
        .map(|r| r.sector.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sector".len());
    let w1 = budget1.chars().count().max(8);
    let w2 = budget2.chars().count().max(8);

    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "Union Budget Comparison ({}): {} vs {}",
                data.unit, data.year1_label, data.year2_label
            ),
            theme::accent_bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{:<sector_w$}  {:>w1$}  {:>w2$}  {:>9}",
                "Sector", budget1, budget2, "Change_%"
            ),
            theme::accent_bold(),
        )),
    ];

    for record in &data.budget {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<sector_w$}  ", record.sector), theme::text()),
            Span::styled(
                format!("{:>w1$.2}  {:>w2$.2}  ", record.budget_year1, record.budget_year2),
                theme::muted(),
            ),
            Span::styled(
                format!("{:>9.2}", record.change_pct),
                theme::value_style(Some(record.change_pct)),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}
