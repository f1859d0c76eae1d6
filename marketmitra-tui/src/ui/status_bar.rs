//! Bottom status bar: fetch progress or last status message, key hints.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " 1-5:panels r:reload e:errors q:quit",
        theme::muted(),
    ));
    spans.push(Span::raw(" | "));

    if app.loading {
        let fetch = &app.fetch;
        let text = match &fetch.current {
            Some(ticker) => format!(
                "Fetching {ticker} ({}/{})",
                (fetch.done + 1).min(fetch.total),
                fetch.total
            ),
            None => "Loading budget and market data...".to_string(),
        };
        spans.push(Span::styled(text, theme::neutral()));
        if fetch.failed > 0 {
            spans.push(Span::styled(
                format!("  {} failed", fetch.failed),
                theme::warning(),
            ));
        }
    } else if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
