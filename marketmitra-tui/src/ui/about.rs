//! Panel 5: notes, the percentage-growth explainer and data sources.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use marketmitra_core::budget::change_pct;

use crate::app::AppState;
use crate::theme;

const AUTO_YEAR1: f64 = 0.9;
const AUTO_YEAR2: f64 = 1.1;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let budget = &app.config.budget;
    let (y1, y2) = (budget.year1_label(), budget.year2_label());
    let window = app.config.window.label();
    let growth = change_pct(AUTO_YEAR1, AUTO_YEAR2);

    let bullet = |text: String| Line::from(Span::styled(format!("  - {text}"), theme::text()));

    let lines = vec![
        Line::from(Span::styled("Note", theme::accent_bold())),
        bullet("The Union Budget is presented every February.".into()),
        bullet(format!(
            "This dashboard compares {y1} vs {y2} allocations and market reactions over {window}."
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Why does a small % change look big?",
            theme::accent_bold(),
        )),
        bullet(format!(
            "Take the Auto sector: it got {AUTO_YEAR1}% of the total budget in {y1} and {AUTO_YEAR2}% in {y2}."
        )),
        bullet(format!(
            "The increase is only {:.1} points, but compared to the old value ({AUTO_YEAR1}%) it is {growth:.2}% growth.",
            AUTO_YEAR2 - AUTO_YEAR1
        )),
        bullet("Always check both the actual allocation and the % growth to see which sectors got the biggest push.".into()),
        Line::from(""),
        Line::from(Span::styled("Data sources", theme::accent_bold())),
        bullet("Union Budget Portal (Feb budgets), https://www.indiabudget.gov.in (simulated data)".into()),
        bullet("Yahoo Finance (NSE sector indices), https://finance.yahoo.com".into()),
        bullet("Prototype by Mrityunjoy Sarmah (MBA Finance, IMT Ghaziabad)".into()),
    ];

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
