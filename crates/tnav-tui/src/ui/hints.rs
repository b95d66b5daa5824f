//! Key hint bar.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tnav_core::action::ActionStyle;
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::controller::Hint;

const SEPARATOR: &str = "   ";

/// Renders hints as `key description` pairs, wrapped to the area width.
pub fn render_hints(f: &mut Frame, area: Rect, hints: &[Hint], theme: &Theme) {
    let key_style = Style::default()
        .fg(parse_color(&theme.hints.key_fg))
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(SEPARATOR));
        }
        spans.push(Span::styled(hint.keys.clone(), key_style));
        spans.push(Span::styled(
            format!(" {}", hint.description),
            Style::default().fg(parse_color(description_color(hint.style, theme))),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
        area,
    );
}

fn description_color(style: ActionStyle, theme: &Theme) -> &str {
    match style {
        ActionStyle::Normal => &theme.hints.description_fg,
        ActionStyle::Entry => &theme.hints.entry_fg,
        ActionStyle::Filter => &theme.hints.filter_fg,
        ActionStyle::Danger => &theme.hints.danger_fg,
    }
}

/// Number of rows the hints occupy when wrapped at `width` columns.
pub fn hints_height(hints: &[Hint], width: u16) -> u16 {
    if hints.is_empty() || width == 0 {
        return 0;
    }
    let width = usize::from(width);
    let mut rows = 1;
    let mut used = 0;
    for hint in hints {
        let len = Span::raw(format!("{} {}", hint.keys, hint.description)).width();
        let needed = if used == 0 { len } else { used + SEPARATOR.len() + len };
        if needed <= width || used == 0 {
            used = needed;
        } else {
            rows += 1;
            used = len;
        }
    }
    rows
}
