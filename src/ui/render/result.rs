use crate::dify::RunInfo;
use crate::ui::markdown::parse_markdown;
use crate::ui::theme::Theme;
use crate::ui::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(super) fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let display = &app.result;

    if display.rid.is_none() {
        let hint = vec![
            Line::from(""),
            Line::from(Span::styled("  No result to show", Theme::text_muted())),
            Line::from(Span::styled(
                "  Run a task from the Assistant view, or press h for history",
                Theme::text_dim(),
            )),
        ];
        frame.render_widget(Paragraph::new(hint), area);
        return;
    }

    let has_note = !display.note.is_empty();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Percentage(if has_note { 35 } else { 0 }),
        ])
        .split(area);

    let mut header = vec![Line::from(vec![
        Span::styled(format!(" {}", display.filename), Theme::title()),
        Span::styled(
            format!(" {} {}", Theme::DOT_SEPARATOR, display.language),
            Theme::text_muted(),
        ),
        Span::styled(
            format!(" {} read-only", Theme::DOT_SEPARATOR),
            Theme::text_dim(),
        ),
    ])];
    header.push(match (&display.problem, &display.run) {
        (Some(problem), _) => Line::from(Span::styled(
            format!(" {}", problem),
            Style::default().fg(Theme::YELLOW),
        )),
        (None, Some(run)) => run_line(run),
        (None, None) => Line::from(""),
    });
    frame.render_widget(Paragraph::new(header), rows[0]);

    let code_lines: Vec<Line> = app
        .result_lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::styled(format!("{:>4} ", i + 1), Theme::text_dim()));
            spans.extend(line.spans.iter().cloned());
            Line::from(spans)
        })
        .collect();
    let code = Paragraph::new(code_lines).scroll((app.result_scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(code, rows[1]);

    if has_note {
        let block = Block::default()
            .title(Span::styled(" Note ", Theme::title()))
            .borders(Borders::TOP)
            .border_style(Theme::border());
        let inner = block.inner(rows[2]);
        frame.render_widget(block, rows[2]);
        let note = parse_markdown(&display.note, inner.width.saturating_sub(1) as usize);
        frame.render_widget(Paragraph::new(note), inner);
    }
}

fn run_line(run: &RunInfo) -> Line<'static> {
    let mut parts = Vec::new();
    if let Some(status) = &run.status {
        parts.push(status.clone());
    }
    if let Some(secs) = run.elapsed_secs {
        parts.push(format!("{:.1}s", secs));
    }
    if let Some(tokens) = run.total_tokens {
        parts.push(format!("{} tokens", tokens));
    }
    if let Some(error) = &run.error {
        parts.push(error.clone());
    }
    let color = if run.failed() { Theme::RED } else { Theme::GREY_400 };
    let separator = format!(" {} ", Theme::DOT_SEPARATOR);
    Line::from(Span::styled(
        format!(" {}", parts.join(&separator)),
        Style::default().fg(color),
    ))
}
