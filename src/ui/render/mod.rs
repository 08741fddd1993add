mod assistant;
mod editor;
mod footer;
mod header;
mod overlays;
mod result;
mod sidebar;
mod toast;

use crate::route::Route;
use crate::ui::theme::Theme;
use crate::ui::{App, Focus, Overlay};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use assistant::render_assistant;
use editor::render_editor;
use footer::render_footer;
use header::render_header;
use overlays::{render_help, render_history};
use result::render_result;
use sidebar::render_sidebar;
use toast::render_toast;

const SIDEBAR_WIDTH: u16 = 28;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(Theme::BG)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header (logo + tabs)
            Constraint::Min(6),    // Sidebar + view
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(layout[1]);

    render_header(frame, layout[0], app);
    render_sidebar(frame, columns[0], app);

    let body = panel(frame, columns[1], app.focus == Focus::Body);
    match &app.route {
        Route::Editor => render_editor(frame, body, app),
        Route::Assistant => render_assistant(frame, body, app),
        Route::Result { .. } => render_result(frame, body, app),
    }

    render_footer(frame, layout[2], app);

    match &app.overlay {
        Overlay::Help { scroll } => render_help(frame, *scroll),
        Overlay::History { entries, selected } => render_history(frame, entries, *selected),
        Overlay::None => {}
    }

    if let Some(toast) = &app.toast {
        render_toast(frame, toast);
    }
}

/// Draw a bordered panel and return its inner area
fn panel(frame: &mut Frame, area: Rect, focused: bool) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_active()
        } else {
            Theme::border()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}
