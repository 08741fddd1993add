use crate::ui::theme::Theme;
use crate::ui::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let Some(file) = app.selected_file() else {
        let hint = vec![
            Line::from(""),
            Line::from(Span::styled("  No file selected", Theme::text_muted())),
            Line::from(Span::styled(
                "  Add a file in the sidebar, then press Enter to edit it",
                Theme::text_dim(),
            )),
        ];
        frame.render_widget(Paragraph::new(hint), area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let name = if file.name.is_empty() {
        "(unnamed)"
    } else {
        file.name.as_str()
    };
    let status = if app.code.has_pending_save() {
        "editing"
    } else {
        "saved"
    };
    let title = Line::from(vec![
        Span::styled(format!(" {}", name), Theme::title()),
        Span::styled(
            format!(" {} {}", Theme::DOT_SEPARATOR, app.editor_language()),
            Theme::text_muted(),
        ),
        Span::styled(
            format!(" {} {}", Theme::DOT_SEPARATOR, status),
            Theme::text_dim(),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), rows[0]);
    frame.render_widget(&app.editor, rows[1]);
}
