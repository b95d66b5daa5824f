use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Paragraph, Wrap},
    Frame,
};
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::host::MessageLevel;

/// Renders queued messages, one per line, colored by level.
pub fn render_messages(
    f: &mut Frame,
    area: Rect,
    messages: &[(MessageLevel, String)],
    theme: &Theme,
) {
    let lines: Vec<Line> = messages
        .iter()
        .map(|(level, text)| {
            Line::styled(
                text.clone(),
                Style::default().fg(parse_color(theme.messages.color_for(*level))),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
