use crate::ui::theme::Theme;
use crate::ui::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const TABS: [&str; 3] = ["Editor", "Assistant", "Result"];

pub(super) fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            format!("  {}", Theme::LOGO),
            Style::default()
                .fg(Theme::WHITE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("    "),
    ];

    let active = app.route.tab_index();
    for (i, tab) in TABS.iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(Theme::GREY_900)
                .bg(Theme::GREY_100)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::GREY_400)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, tab), style));
        spans.push(Span::raw(" "));
    }

    let header = Paragraph::new(vec![Line::from(spans), Line::from("")]).style(Theme::bg());
    frame.render_widget(header, area);
}
