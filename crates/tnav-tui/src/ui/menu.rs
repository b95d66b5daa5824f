use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};
use tnav_core::config::theme::{parse_color, Theme};
use tnav_core::controller::MenuItem;

use crate::ui::popup::bottom_rect;

/// Renders the action menu as a box at the bottom of `area`.
pub fn render_menu(f: &mut Frame, area: Rect, items: &[MenuItem], theme: &Theme) {
    if items.is_empty() {
        return;
    }
    let widest = items
        .iter()
        .map(|item| Span::raw(item.description.as_str()).width())
        .max()
        .unwrap_or(0);
    let width = (widest + 6).min(usize::from(u16::MAX)) as u16;
    let height = (items.len() + 2).min(usize::from(u16::MAX)) as u16;
    let rect = bottom_rect(width.max(20), height, area);

    let item_style = Style::default().fg(parse_color(&theme.menu.item_fg));
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| ListItem::new(Line::from(item.description.clone())).style(item_style))
        .collect();
    let list = List::new(list_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Menu ")
                .border_style(Style::default().fg(parse_color(&theme.menu.border_fg))),
        )
        .highlight_style(
            Style::default()
                .fg(parse_color(&theme.menu.selected_fg))
                .bg(parse_color(&theme.menu.selected_bg)),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(items.iter().position(|item| item.selected));

    f.render_widget(Clear, rect);
    f.render_stateful_widget(list, rect, &mut state);
}
