//! Entry list rendering.
//!
//! One row per filtered entry: the name on the left, and on the right
//! either the entry's details (permissions, size, modification date) or the
//! error that prevented reading them.

use std::fmt::Write as _;
use std::time::SystemTime;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::fs::entry::{Entry, EntryType};
use tnav_core::nav::state::State;

/// Renders the entry list with the cursor row highlighted.
pub fn render_entries(f: &mut Frame, area: Rect, state: &State, date_format: &str, theme: &Theme) {
    let entries = state.entries();
    if entries.is_empty() {
        let text = if state.filter().is_empty() {
            "(empty directory)".to_string()
        } else {
            format!("(nothing matches \"{}\")", state.filter())
        };
        let placeholder = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default()
                .fg(parse_color(&theme.entries.details_fg))
                .add_modifier(Modifier::ITALIC),
        )));
        f.render_widget(placeholder, area);
        return;
    }

    let rows: Vec<(Line<'static>, Line<'static>)> = entries
        .filtered()
        .map(|entry| (name_line(entry, theme), details_line(entry, date_format, theme)))
        .collect();
    let details_width = rows
        .iter()
        .map(|(_, details)| details.width())
        .max()
        .unwrap_or(0)
        .min(usize::from(area.width / 2)) as u16;

    let table = Table::new(
        rows.into_iter()
            .map(|(name, details)| Row::new([Cell::from(name), Cell::from(details)])),
        [Constraint::Fill(1), Constraint::Length(details_width)],
    )
    .column_spacing(2)
    .row_highlight_style(Style::default().bg(parse_color(&theme.entries.cursor_bg)));

    let mut table_state = TableState::default().with_selected(Some(state.cursor()));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn name_line(entry: &Entry, theme: &Theme) -> Line<'static> {
    let style = entry_style(entry, theme);
    let mut name = entry.name().to_string();
    if entry.resolved_type() == EntryType::Directory {
        name.push('/');
    }
    let mut spans = vec![Span::styled(name, style)];
    if let Some(last) = entry.link_chain().last() {
        spans.push(Span::styled(
            format!(" → {}", last.path.display()),
            Style::default().fg(parse_color(&theme.entries.details_fg)),
        ));
    }
    Line::from(spans)
}

fn entry_style(entry: &Entry, theme: &Theme) -> Style {
    if entry.error().is_some() {
        Style::default().fg(parse_color(&theme.entries.error_fg))
    } else if entry.is_symlink() {
        Style::default().fg(parse_color(&theme.entries.symlink_fg))
    } else if entry.is_dir() {
        Style::default()
            .fg(parse_color(&theme.entries.dir_fg))
            .add_modifier(Modifier::BOLD)
    } else if entry.is_hidden() {
        Style::default().fg(parse_color(&theme.entries.hidden_fg))
    } else {
        Style::default().fg(parse_color(&theme.entries.file_fg))
    }
}

fn details_line(entry: &Entry, date_format: &str, theme: &Theme) -> Line<'static> {
    if let Some(error) = entry.error() {
        return Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(parse_color(&theme.entries.error_fg)),
        ));
    }
    let permissions = entry
        .permissions()
        .map(|p| p.to_string())
        .unwrap_or_default();
    let size = entry.size().map(format_size).unwrap_or_default();
    let modified = entry
        .modified()
        .map(|time| format_time(time, date_format))
        .unwrap_or_default();
    Line::from(Span::styled(
        format!("{permissions:<9}  {size:>9}  {modified}"),
        Style::default().fg(parse_color(&theme.entries.details_fg)),
    ))
}

/// Formats a byte count using binary units.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Formats `time` in local time. An invalid `format` falls back to RFC 3339.
pub fn format_time(time: SystemTime, format: &str) -> String {
    let local = chrono::DateTime::<chrono::Local>::from(time);
    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_err() {
        tracing::warn!(format, "invalid date format");
        return local.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }

    #[test]
    fn format_time_uses_format() {
        let time = UNIX_EPOCH + Duration::from_secs(86_400 * 365);
        assert_eq!(format_time(time, "%Y").len(), 4);
    }

    #[test]
    fn invalid_format_falls_back() {
        let formatted = format_time(UNIX_EPOCH, "%Q");
        assert!(formatted.contains('T'));
    }
}
