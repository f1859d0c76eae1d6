//! Sector filter sidebar: checkbox list over the loaded sectors.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let filter = &app.filter;
    let focused = app.active_panel != Panel::About;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" Filter Sectors ")
        .title_style(theme::panel_title(focused));

    let mut lines = vec![
        Line::from(Span::styled("Select sectors to compare:", theme::muted())),
        Line::from(""),
    ];

    for (i, sector) in filter.sectors().iter().enumerate() {
        let checked = filter.is_selected(i);
        let at_cursor = i == filter.cursor();
        let marker = if at_cursor { "> " } else { "  " };
        let check = if checked { "[x] " } else { "[ ] " };
        let style = match (at_cursor, checked) {
            (true, _) => theme::accent_bold(),
            (false, true) => theme::text(),
            (false, false) => theme::muted(),
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme::accent()),
            Span::styled(check, if checked { theme::accent() } else { theme::muted() }),
            Span::styled(sector.as_str(), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{}/{} selected", filter.selected_count(), filter.sectors().len()),
        theme::neutral().add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(Span::styled(
        "Space toggle  a all  d none",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
