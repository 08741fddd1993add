//! Markdown to ratatui styled text converter
//!
//! Workflow notes are short markdown documents: headings, lists, quotes,
//! fenced code and inline emphasis. Anything else renders as wrapped text.

use super::theme::Theme;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

/// Parse markdown text and convert to styled lines no wider than `max_width`
pub fn parse_markdown(text: &str, max_width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut in_fence = false;

    for raw in text.lines() {
        if raw.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }

        if in_fence {
            lines.push(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(raw.to_string(), Style::default().fg(Theme::GREY_200)),
            ]));
            continue;
        }

        if raw.trim().is_empty() {
            lines.push(Line::from(""));
        } else if let Some((level, content)) = heading(raw) {
            lines.push(render_heading(level, content));
        } else if let Some(content) = raw.strip_prefix("- ").or_else(|| raw.strip_prefix("* ")) {
            push_prefixed(&mut lines, content, "  • ", max_width);
        } else if let Some((number, content)) = numbered_item(raw) {
            push_prefixed(&mut lines, content, &format!("  {}. ", number), max_width);
        } else if let Some(content) = raw.strip_prefix("> ") {
            push_prefixed(&mut lines, content, "  │ ", max_width);
        } else {
            lines.extend(
                wrap_words(raw, max_width)
                    .iter()
                    .map(|l| parse_inline_markdown(l)),
            );
        }
    }

    lines
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if (1..=3).contains(&hashes) {
        line[hashes..].strip_prefix(' ').map(|rest| (hashes, rest))
    } else {
        None
    }
}

fn numbered_item(line: &str) -> Option<(&str, &str)> {
    let (number, rest) = line.split_once(". ")?;
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        Some((number, rest))
    } else {
        None
    }
}

fn render_heading(level: usize, text: &str) -> Line<'static> {
    let (content, color) = match level {
        1 => (text.to_string(), Theme::WHITE),
        2 => (text.to_string(), Theme::GREY_100),
        _ => (format!("• {}", text), Theme::GREY_200),
    };
    Line::from(Span::styled(
        content,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Wrap `content` after a marker, indenting continuation lines to match
fn push_prefixed(lines: &mut Vec<Line<'static>>, content: &str, marker: &str, max_width: usize) {
    let indent = " ".repeat(marker.width());
    for (i, wrapped) in wrap_words(content, max_width.saturating_sub(marker.width()))
        .iter()
        .enumerate()
    {
        let prefix = if i == 0 { marker.to_string() } else { indent.clone() };
        let mut spans = vec![Span::styled(prefix, Style::default().fg(Theme::GREY_400))];
        spans.extend(parse_inline_markdown(wrapped).spans);
        lines.push(Line::from(spans));
    }
}

/// Greedy word wrap by display width
fn wrap_words(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.width() + 1 + word.width() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Parse inline markdown elements (bold, italic, code)
fn parse_inline_markdown(text: &str) -> Line<'static> {
    let plain = Style::default().fg(Theme::GREY_100);
    let bold = Style::default()
        .fg(Theme::WHITE)
        .add_modifier(Modifier::BOLD);
    let code = Style::default()
        .fg(Theme::GREY_200)
        .add_modifier(Modifier::BOLD);
    let italic = Style::default()
        .fg(Theme::GREY_200)
        .add_modifier(Modifier::ITALIC);

    let chars: Vec<char> = text.chars().collect();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    let find = |from: usize, marker: &[char]| -> Option<usize> {
        (from..chars.len()).find(|&j| chars[j..].starts_with(marker))
    };

    while i < chars.len() {
        let c = chars[i];
        let doubled = i + 1 < chars.len() && chars[i + 1] == c;

        let found = match c {
            '*' | '_' if doubled => find(i + 2, &[c, c][..]).map(|end| (i + 2, end, end + 2, bold)),
            '`' => find(i + 1, &['`'][..]).map(|end| (i + 1, end, end + 1, code)),
            '*' | '_' => find(i + 1, &[c][..])
                .filter(|&end| end > i + 1)
                .map(|end| (i + 1, end, end + 1, italic)),
            _ => None,
        };

        match found {
            Some((start, end, next, style)) => {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), plain));
                }
                spans.push(Span::styled(chars[start..end].iter().collect::<String>(), style));
                i = next;
            }
            None => {
                current.push(c);
                i += 1;
            }
        }
    }

    if !current.is_empty() || spans.is_empty() {
        spans.push(Span::styled(current, plain));
    }

    Line::from(spans)
}
