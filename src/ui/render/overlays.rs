use crate::store::ResultEntry;
use crate::ui::helpers::{centered_rect, scroll_offset};
use crate::ui::theme::Theme;
use chrono::Local;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn section_start(title: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("    ╭─ ".to_string(), Style::default().fg(Theme::GREY_600)),
            Span::styled(
                title.to_string(),
                Style::default()
                    .fg(Theme::WHITE)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ]
}

fn key_row(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("    │  ".to_string(), Style::default().fg(Theme::GREY_600)),
        Span::styled(
            format!(" {:<7}", key),
            Style::default().fg(Theme::GREY_900).bg(Theme::GREY_300),
        ),
        Span::styled(format!("  {}", desc), Style::default().fg(Theme::GREY_200)),
    ])
}

fn help_lines() -> Vec<Line<'static>> {
    let sections: [(&str, &[(&str, &str)]); 5] = [
        (
            "Views",
            &[
                ("1 2 3", "Editor / Assistant / Result"),
                ("Tab", "Switch focus between files and view"),
                ("h", "Stored results"),
            ],
        ),
        (
            "Files",
            &[
                ("↑↓", "Select file"),
                ("a", "Add file"),
                ("r", "Rename file"),
                ("d", "Delete file"),
                ("↵", "Open the view"),
            ],
        ),
        (
            "Editor",
            &[("Ctrl+S", "Save now"), ("Esc", "Back to files")],
        ),
        (
            "Assistant",
            &[
                ("↑↓ ␣", "Pick up to 3 reference files"),
                ("←→", "Choose task"),
                ("n", "Edit note"),
                ("↵", "Run on the selected file"),
            ],
        ),
        ("General", &[("?", "Show help"), ("q", "Quit")]),
    ];

    let mut lines = Vec::new();
    for (title, rows) in sections {
        lines.extend(section_start(title));
        lines.extend(rows.iter().map(|(key, desc)| key_row(key, desc)));
    }
    lines
}

pub(super) fn render_help(frame: &mut Frame, scroll: usize) {
    let area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, area);

    let lines = help_lines();
    let max_scroll = lines.len().saturating_sub(area.height.saturating_sub(2) as usize);
    let scroll = scroll.min(max_scroll);

    let block = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(Style::default().fg(Theme::GREY_100))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::GREY_400))
                .style(Style::default().bg(Theme::GREY_900)),
        )
        .scroll((scroll as u16, 0));

    frame.render_widget(block, area);
}

pub(super) fn render_history(frame: &mut Frame, entries: &[ResultEntry], selected: usize) {
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Stored results ")
        .title_style(Style::default().fg(Theme::GREY_100))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::GREY_400))
        .style(Style::default().bg(Theme::GREY_900));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    let offset = scroll_offset(selected, height);
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, entry)| {
            let is_selected = i == selected;
            let marker = if is_selected {
                format!(" {} ", Theme::ARROW_RIGHT)
            } else {
                "   ".to_string()
            };
            let when = entry
                .saved_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string();
            Line::from(vec![
                Span::styled(marker, Theme::text_muted()),
                Span::styled(
                    entry.rid.clone(),
                    if is_selected {
                        Theme::selected()
                    } else {
                        Theme::text()
                    },
                ),
                Span::styled(format!("  {}", when), Theme::text_dim()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
