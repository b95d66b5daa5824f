//! Title line and command line.

use std::path::MAIN_SEPARATOR;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::nav::state::{InputMode, State};

/// Renders the directory with the filter typed after it, like a path being
/// completed. In debug mode the last key event is shown on the right.
pub fn render_title(f: &mut Frame, area: Rect, state: &State, debug: bool, theme: &Theme) {
    let mut directory = state.directory().display().to_string();
    if !directory.ends_with(MAIN_SEPARATOR) {
        directory.push(MAIN_SEPARATOR);
    }

    let mut spans = vec![
        Span::styled(
            directory,
            Style::default()
                .fg(parse_color(&theme.title.directory_fg))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            state.filter().to_string(),
            Style::default().fg(parse_color(&theme.title.filter_fg)),
        ),
    ];
    if state.input_mode() == InputMode::QuickMacro {
        spans.push(Span::styled(
            "  [quick]",
            Style::default().fg(parse_color(&theme.title.command_fg)),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    if debug {
        if let Some(event) = state.last_event() {
            let debug_line = Line::from(Span::styled(
                format!("{event} "),
                Style::default().fg(parse_color(&theme.title.debug_fg)),
            ));
            f.render_widget(
                Paragraph::new(debug_line).alignment(Alignment::Right),
                area,
            );
        }
    }
}

/// Renders the command being typed, prefixed with the shell that will run it.
pub fn render_command_line(f: &mut Frame, area: Rect, shell: &str, command: &str, theme: &Theme) {
    let command_fg = parse_color(&theme.title.command_fg);
    let line = Line::from(vec![
        Span::styled(format!("{shell}> "), Style::default().fg(command_fg)),
        Span::styled(
            command.to_string(),
            Style::default().fg(command_fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled("█", Style::default().fg(command_fg)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
