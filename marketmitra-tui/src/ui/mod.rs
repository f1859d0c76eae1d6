//! Top-level UI layout: header, sidebar + panel body, status bar.

pub mod about;
pub mod budget_table;
pub mod comparison;
pub mod market_table;
pub mod overlays;
pub mod returns;
pub mod sidebar;
pub mod status_bar;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use marketmitra_core::DashboardData;

use crate::app::{AppState, LoadState, Overlay, Panel};
use crate::theme;

const SIDEBAR_WIDTH: u16 = 28;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: header + body + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_body(f, chunks[1], app);
    status_bar::render(f, chunks[2], app);

    if app.overlay == Overlay::ErrorHistory {
        overlays::render_error_history(f, chunks[1], app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &AppState) {
    let budget = &app.config.budget;
    let lines = vec![
        Line::from(vec![
            Span::styled("Onehorn MarketMitra", theme::accent_bold()),
            Span::styled(
                "  Policy Results Vs Market Returns",
                theme::muted(),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "Union Budget {} vs {} | NSE sector indices {} | source: {}",
                budget.year1_label(),
                budget.year2_label(),
                app.config.window.label(),
                app.config.source.kind,
            ),
            theme::text(),
        )),
    ];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme::muted());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_body(f: &mut Frame, area: Rect, app: &AppState) {
    // About needs no data.
    if app.active_panel == Panel::About {
        draw_panel(f, area, app, None);
        return;
    }

    match &app.load {
        LoadState::Pending => {
            let msg = if app.loading {
                "Loading budget and market data..."
            } else {
                "No data loaded. Press r to load."
            };
            render_message(f, area, msg, theme::muted());
        }
        LoadState::Blocked(e) => render_message(f, area, &e.to_string(), theme::negative()),
        LoadState::Failed(msg) => render_message(f, area, msg, theme::negative()),
        LoadState::Ready(data) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .split(area);
            sidebar::render(f, cols[0], app);
            draw_panel(f, cols[1], app, Some(&**data));
        }
    }
}

/// Draw a single panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, data: Option<&DashboardData>) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match (panel, data) {
        (Panel::About, _) => about::render(f, inner, app),
        (Panel::Budget, Some(data)) => budget_table::render(f, inner, data),
        (Panel::Market, Some(data)) => market_table::render(f, inner, data),
        (Panel::Comparison, Some(data)) => comparison::render(f, inner, app, data),
        (Panel::Returns, Some(data)) => returns::render(f, inner, app, data),
        (_, None) => {}
    }
}

/// Full-width message shown instead of any table or chart.
fn render_message(f: &mut Frame, area: Rect, msg: &str, style: ratatui::style::Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted());
    let para = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(msg, style))])
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketmitra_core::market::StaticSource;
    use marketmitra_core::{load_dashboard, DashboardConfig, DashboardError};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn new_app() -> AppState {
        let (tx, _rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        AppState::new(DashboardConfig::default(), tx, resp_rx, PathBuf::from("."))
    }

    fn loaded_app() -> AppState {
        let mut app = new_app();
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let source = StaticSource::new()
            .with_closes("^CNXIT", start, &[100.0, 105.0, 98.0, 110.0])
            .with_closes("^CNXAUTO", start, &[200.0, 150.0]);
        let data = load_dashboard(&app.config, &source).unwrap();
        app.apply_loaded(data);
        app
    }

    fn screen(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn budget_panel_shows_table_and_sidebar() {
        let app = loaded_app();
        let text = screen(&app);
        assert!(text.contains("Onehorn MarketMitra"));
        assert!(text.contains("Filter Sectors"));
        assert!(text.contains("Budget [1]"));
        assert!(text.contains("Budget_Feb 2023"));
        assert!(text.contains("22.22"));
        assert!(text.contains("Dashboard loaded successfully"));
    }

    #[test]
    fn market_panel_marks_absent_values() {
        let mut app = loaded_app();
        app.active_panel = Panel::Market;
        let text = screen(&app);
        assert!(text.contains("^CNXIT"));
        assert!(text.contains("10.00"));
        assert!(text.contains("-25.00"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn comparison_with_empty_selection_shows_hint() {
        let mut app = loaded_app();
        app.active_panel = Panel::Comparison;
        app.filter.deselect_all();
        let text = screen(&app);
        assert!(text.contains("No sectors selected"));
        assert!(!text.contains('█'));
    }

    #[test]
    fn comparison_draws_both_series() {
        let mut app = loaded_app();
        app.active_panel = Panel::Comparison;
        let text = screen(&app);
        assert!(text.contains("Change_%"));
        assert!(text.contains("Stock_Performance_%"));
        assert!(text.contains('█'));
    }

    #[test]
    fn blocked_state_renders_only_the_message() {
        let mut app = new_app();
        app.apply_blocked(DashboardError::EmptyBudgetTable);
        let text = screen(&app);
        assert!(text.contains("No budget data found!"));
        assert!(!text.contains("Filter Sectors"));
        assert!(!text.contains("Change_%"));
    }

    #[test]
    fn about_is_available_before_loading() {
        let mut app = new_app();
        app.active_panel = Panel::About;
        let text = screen(&app);
        assert!(text.contains("22.22%"));
        assert!(text.contains("indiabudget.gov.in"));
    }

    #[test]
    fn error_overlay_lists_history() {
        let mut app = new_app();
        app.apply_blocked(DashboardError::EmptyPerformanceTable);
        app.overlay = Overlay::ErrorHistory;
        let text = screen(&app);
        assert!(text.contains("Error History (1)"));
        assert!(text.contains("[DATA]"));
    }
}
