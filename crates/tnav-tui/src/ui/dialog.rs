//! Modal prompt rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::dialog::{ChoiceDialog, Dialog, TextDialog};

use crate::ui::popup::centered_rect;

const MAX_CHOICE_ROWS: u16 = 12;

/// Renders `dialog` centered over whatever is already in the frame.
pub fn render_dialog(f: &mut Frame, dialog: &Dialog, theme: &Theme) {
    let area = f.area();
    let width = (area.width / 5 * 3).max(30);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", dialog.message()),
            Style::default()
                .fg(parse_color(&theme.dialog.title_fg))
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(parse_color(&theme.dialog.border_fg)));

    match dialog {
        Dialog::Text(text) => {
            let rect = centered_rect(width, 3, area);
            f.render_widget(Clear, rect);
            let inner = block.inner(rect);
            f.render_widget(block, rect);
            render_text_input(f, inner, text, theme);
        }
        Dialog::Choice(choice) => {
            let rows = (choice.choices().filtered_len() as u16).clamp(1, MAX_CHOICE_ROWS);
            let rect = centered_rect(width, rows + 3, area);
            f.render_widget(Clear, rect);
            let inner = block.inner(rect);
            f.render_widget(block, rect);
            render_choices(f, inner, choice, theme);
        }
    }
}

fn render_text_input(f: &mut Frame, area: Rect, dialog: &TextDialog, theme: &Theme) {
    let input_fg = parse_color(&theme.dialog.input_fg);
    let line = Line::from(vec![
        Span::styled(dialog.buffer().to_string(), Style::default().fg(input_fg)),
        Span::styled("█", Style::default().fg(input_fg)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_choices(f: &mut Frame, area: Rect, dialog: &ChoiceDialog, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let choices = dialog.choices();
    let input_fg = parse_color(&theme.dialog.input_fg);
    let filter = Line::from(vec![
        Span::raw("> "),
        Span::styled(choices.filter().to_string(), Style::default().fg(input_fg)),
        Span::styled("█", Style::default().fg(input_fg)),
    ]);
    f.render_widget(Paragraph::new(filter), chunks[0]);

    let items: Vec<ListItem> = choices
        .filtered()
        .map(|choice| ListItem::new(choice.as_str()))
        .collect();
    let list = List::new(items).highlight_style(
        Style::default()
            .fg(parse_color(&theme.dialog.selected_fg))
            .add_modifier(Modifier::REVERSED),
    );
    let mut state = ListState::default();
    if !choices.is_empty() {
        state.select(Some(choices.cursor()));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);
}
