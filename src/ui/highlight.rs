//! Syntax highlighting for read-only code
//!
//! Languages arrive as editor ids from [`crate::language`] ("rust",
//! "typescript", "plaintext", ...). Ids syntect's default set doesn't know
//! render as plain text.

use crate::language::PLAIN_TEXT;
use crate::ui::theme::Theme;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const HIGHLIGHT_THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn highlight_theme() -> Option<&'static SyntectTheme> {
    THEME_SET
        .get_or_init(ThemeSet::load_defaults)
        .themes
        .get(HIGHLIGHT_THEME)
}

/// Editor id to a token syntect can look up by extension or name
fn syntax_token(language: &str) -> &str {
    match language {
        "javascript" | "typescript" => "js",
        "csharp" => "cs",
        "cpp" => "cpp",
        "shell" => "sh",
        "markdown" => "md",
        "objective-c" => "m",
        "restructuredtext" => "rst",
        "bat" => "bat",
        "perl" => "pl",
        other => other,
    }
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    if language.is_empty() || language == PLAIN_TEXT {
        return None;
    }
    syntax_set().find_syntax_by_token(syntax_token(language))
}

fn to_ratatui(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn plain_line(line: &str) -> Line<'static> {
    Line::from(Span::styled(
        line.trim_end_matches(['\n', '\r']).to_string(),
        Theme::text(),
    ))
}

/// Highlight `code` line by line. Yields one [`Line`] per `str::lines` entry.
pub fn highlight_code(code: &str, language: &str) -> Vec<Line<'static>> {
    let (Some(syntax), Some(theme)) = (find_syntax(language), highlight_theme()) else {
        return code.lines().map(plain_line).collect();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, syntax_set()) {
            Ok(ranges) => Line::from(
                ranges
                    .into_iter()
                    .filter_map(|(style, text)| {
                        let text = text.trim_end_matches(['\n', '\r']);
                        (!text.is_empty()).then(|| Span::styled(text.to_string(), to_ratatui(style)))
                    })
                    .collect::<Vec<_>>(),
            ),
            Err(_) => plain_line(line),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::language_for;
    use std::collections::HashSet;

    #[test]
    fn test_rust_source_gets_colored_spans() {
        let code = "fn main() {\n    let answer = 42;\n}\n";
        let lines = highlight_code(code, language_for(Some("example.rs")));

        assert_eq!(lines.len(), code.lines().count());
        let first = &lines[0];
        assert!(first.spans.len() > 1);
        let colors: HashSet<_> = lines
            .iter()
            .flat_map(|line| line.spans.iter().filter_map(|span| span.style.fg))
            .collect();
        assert!(colors.len() > 1);

        let text: String = first.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "fn main() {");
    }

    #[test]
    fn test_unknown_extension_stays_plain() {
        let lines = highlight_code("fn main() {}\nsecond", language_for(Some("example.unknownext")));

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.spans.len(), 1);
            assert_eq!(line.spans[0].style, Theme::text());
        }
        assert_eq!(lines[1].spans[0].content, "second");
    }

    #[test]
    fn test_editor_ids_map_to_known_syntaxes() {
        for language in ["typescript", "shell", "python", "json", "markdown"] {
            assert!(find_syntax(language).is_some(), "{} has no syntax", language);
        }
        assert!(find_syntax("plaintext").is_none());
    }
}
