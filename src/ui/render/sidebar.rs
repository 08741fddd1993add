use crate::route::Route;
use crate::ui::helpers::{fit_width, scroll_offset};
use crate::ui::theme::Theme;
use crate::ui::{App, Focus, InputMode};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(super) fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(Span::styled(" FILES ", Theme::title()))
        .borders(Borders::ALL)
        .border_style(if app.focus == Focus::Sidebar {
            Theme::border_active()
        } else {
            Theme::border()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let files = &app.files().files;
    if files.is_empty() {
        let hint = vec![
            Line::from(""),
            Line::from(Span::styled(" No files yet", Theme::text_muted())),
            Line::from(vec![
                Span::styled(" a", Theme::selected()),
                Span::styled(" to add one", Theme::text_muted()),
            ]),
        ];
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    }

    let selected_id = app.files().selected_id.as_deref();
    let editing_id = app.workspace.editing_id();
    let show_refs = app.route == Route::Assistant;
    let name_width = (inner.width as usize).saturating_sub(6);

    let selected_row = selected_id
        .and_then(|id| app.files().position(id))
        .unwrap_or(0);
    let height = inner.height as usize;
    let offset = scroll_offset(selected_row, height);

    let lines: Vec<Line> = files
        .iter()
        .skip(offset)
        .take(height)
        .map(|file| {
            let is_selected = selected_id == Some(file.id.as_str());
            let marker = if is_selected {
                format!(" {} ", Theme::ARROW_RIGHT)
            } else {
                "   ".to_string()
            };

            let name_span = if editing_id == Some(file.id.as_str())
                && app.input_mode == InputMode::Naming
            {
                Span::styled(
                    format!("{}▏", fit_width(&app.input_buffer, name_width.saturating_sub(1))),
                    Style::default()
                        .fg(Theme::WHITE)
                        .bg(Theme::GREY_700),
                )
            } else if file.name.is_empty() {
                Span::styled("(unnamed)", Theme::text_dim().add_modifier(Modifier::ITALIC))
            } else if is_selected {
                Span::styled(fit_width(&file.name, name_width), Theme::selected())
            } else {
                Span::styled(fit_width(&file.name, name_width), Theme::text())
            };

            let mut spans = vec![Span::styled(marker, Theme::text_muted()), name_span];
            if show_refs && app.assistant.is_selected(&file.id) {
                spans.push(Span::styled(
                    format!(" {}", Theme::BULLET_FILLED),
                    Style::default().fg(Theme::GREEN),
                ));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
