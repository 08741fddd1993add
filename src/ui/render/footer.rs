use crate::route::Route;
use crate::ui::theme::Theme;
use crate::ui::{App, Focus, InputMode, Overlay};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Key hints for the current mode, focus and view
fn hints(app: &App) -> &'static [(&'static str, &'static str)] {
    if !matches!(app.overlay, Overlay::None) {
        return match app.overlay {
            Overlay::History { .. } => &[("↑↓", "move"), ("↵", "open"), ("Esc", "close")],
            _ => &[("↑↓", "scroll"), ("Esc", "close")],
        };
    }
    match app.input_mode {
        InputMode::Naming => return &[("↵", "save name"), ("Esc", "cancel")],
        InputMode::Note => return &[("↵", "save note"), ("Esc", "cancel")],
        InputMode::Normal => {}
    }
    match (app.focus, &app.route) {
        (Focus::Sidebar, _) => &[
            ("a", "add"),
            ("r", "rename"),
            ("d", "delete"),
            ("↵", "open"),
            ("1-3", "view"),
            ("?", "help"),
            ("q", "quit"),
        ],
        (Focus::Body, Route::Editor) => &[("Esc", "files"), ("^S", "save")],
        (Focus::Body, Route::Assistant) => &[
            ("␣", "reference"),
            ("←→", "task"),
            ("n", "note"),
            ("↵", "run"),
            ("Esc", "files"),
        ],
        (Focus::Body, Route::Result { .. }) => &[
            ("↑↓", "scroll"),
            ("h", "history"),
            ("Esc", "files"),
        ],
    }
}

pub(super) fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let file_count = app.files().files.len();
    let status = format!(
        "  {} file{} {} {}",
        file_count,
        if file_count == 1 { "" } else { "s" },
        Theme::DOT_SEPARATOR,
        if app.code.has_pending_save() {
            "unsaved"
        } else {
            "saved"
        }
    );
    let mut spans = vec![Span::styled(status, Theme::text_dim())];

    let hint_spans: Vec<Span> = hints(app)
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {} ", key), Theme::key()),
                Span::styled(format!(" {}  ", label), Style::default().fg(Theme::GREY_500)),
            ]
        })
        .collect();

    let status_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hints_len: usize = hint_spans.iter().map(|s| s.content.chars().count()).sum();
    let spacer = (area.width as usize).saturating_sub(status_len + hints_len);
    spans.push(Span::raw(" ".repeat(spacer)));
    spans.extend(hint_spans);

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Theme::bg()), area);
}
