use crate::assistant::MAX_REFERENCE_FILES;
use crate::dify::TaskType;
use crate::ui::helpers::{fit_width, scroll_offset};
use crate::ui::theme::Theme;
use crate::ui::{App, Focus, InputMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub(super) fn render_assistant(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Target
            Constraint::Min(3),    // Reference files
            Constraint::Length(3), // Task type
            Constraint::Length(3), // Note
            Constraint::Length(1), // Status
        ])
        .split(area);

    render_target(frame, rows[0], app);
    render_references(frame, rows[1], app);
    render_tasks(frame, rows[2], app);
    render_note(frame, rows[3], app);
    render_status(frame, rows[4], app);
}

fn section(title: &str, detail: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {}", title), Theme::title()),
        Span::styled(format!("  {}", detail), Theme::text_dim()),
    ])
}

fn render_target(frame: &mut Frame, area: Rect, app: &App) {
    let target = match app.selected_file() {
        Some(file) if !file.name.is_empty() => Span::styled(file.name.clone(), Theme::selected()),
        _ => Span::styled("select a file in the sidebar", Theme::text_dim()),
    };
    let line = Line::from(vec![Span::styled(" Run on  ", Theme::text_muted()), target]);
    frame.render_widget(Paragraph::new(vec![line]), area);
}

fn render_references(frame: &mut Frame, area: Rect, app: &App) {
    let files = &app.files().files;
    let mut lines = vec![section(
        "Reference files",
        format!(
            "{}/{}  space toggles",
            app.assistant.selected_ids().len(),
            MAX_REFERENCE_FILES
        ),
    )];

    if files.is_empty() {
        lines.push(Line::from(Span::styled("   no files", Theme::text_dim())));
    }

    let height = (area.height as usize).saturating_sub(1);
    let offset = scroll_offset(app.assistant_cursor, height);
    let body_focused = app.focus == Focus::Body;
    let name_width = (area.width as usize).saturating_sub(10);

    for (row, file) in files.iter().enumerate().skip(offset).take(height) {
        let checked = app.assistant.is_selected(&file.id);
        let cursor = if body_focused && row == app.assistant_cursor {
            format!(" {} ", Theme::ARROW_RIGHT)
        } else {
            "   ".to_string()
        };
        let name = if file.name.is_empty() {
            "(unnamed)".to_string()
        } else {
            fit_width(&file.name, name_width)
        };
        lines.push(Line::from(vec![
            Span::styled(cursor, Theme::text_muted()),
            Span::styled(
                if checked { Theme::CHECK_ON } else { Theme::CHECK_OFF },
                if checked {
                    Style::default().fg(Theme::GREEN)
                } else {
                    Theme::text_dim()
                },
            ),
            Span::styled(format!(" {}", name), Theme::text()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_tasks(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw("   ")];
    for task in TaskType::ALL {
        let active = task == app.assistant.task();
        let (bullet, style) = if active {
            (Theme::BULLET_FILLED, Theme::selected())
        } else {
            (Theme::BULLET_EMPTY, Theme::text_muted())
        };
        spans.push(Span::styled(format!("{} {}", bullet, task.label()), style));
        spans.push(Span::raw("   "));
    }
    let lines = vec![
        section("Task", "←/→ to change".to_string()),
        Line::from(spans),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_note(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Note;
    let body = if editing {
        Span::styled(
            format!("   {}▏", app.input_buffer),
            Style::default().fg(Theme::WHITE).bg(Theme::GREY_700),
        )
    } else if app.assistant.note().is_empty() {
        Span::styled(
            "   (optional)",
            Theme::text_dim().add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(format!("   {}", app.assistant.note()), Theme::text())
    };
    let lines = vec![
        section("Note", "n to edit".to_string()),
        Line::from(body),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = if app.assistant.is_loading() {
        let frame_char =
            Theme::SPINNER_BRAILLE[app.loading_frame % Theme::SPINNER_BRAILLE.len()];
        Line::from(Span::styled(
            format!(" {} Running workflow...", frame_char),
            Style::default().fg(Theme::YELLOW),
        ))
    } else if !app.api_ready {
        Line::from(Span::styled(
            " No API key configured. Run 'codedock --setup' or set DIFY_API_KEY.",
            Style::default().fg(Theme::YELLOW),
        ))
    } else {
        Line::from(vec![
            Span::styled(" ↵ ", Theme::key()),
            Span::styled(" run task", Theme::text_muted()),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}
