use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tnav_core::config::theme::Theme;
use tnav_core::controller::{Controller, Hint, MenuItem};
use tnav_core::dialog::Dialog;
use tnav_core::host::{Host, MessageLevel};
use tnav_core::nav::state::State;

use crate::ui::dialog::render_dialog;
use crate::ui::entries::render_entries;
use crate::ui::hints::{hints_height, render_hints};
use crate::ui::menu::render_menu;
use crate::ui::messages::render_messages;
use crate::ui::title::{render_command_line, render_title};

/// Everything a frame shows, captured from the controller so that drawing
/// does not borrow it.
#[derive(Debug, Clone)]
pub struct View {
    pub state: State,
    pub hints: Vec<Hint>,
    pub menu: Vec<MenuItem>,
    pub shell: String,
    pub debug: bool,
    pub date_format: String,
}

impl View {
    pub fn capture<H: Host>(controller: &Controller<H>) -> Self {
        Self {
            state: controller.state().clone(),
            hints: controller.hints(),
            menu: controller.menu_items(),
            shell: controller.session().shell.to_string(),
            debug: controller.session().debug,
            date_format: controller.config().general.date_format.clone(),
        }
    }
}

/// Main render function: title, entries, messages, command line and hints
/// from top to bottom, with the menu drawn over the entries.
pub fn render(f: &mut Frame, view: &View, messages: &[(MessageLevel, String)], theme: &Theme) {
    let area = f.area();
    let command_height = u16::from(view.state.command().is_some());
    let messages_height = (messages.len().min(usize::from(area.height / 3))) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(messages_height),
            Constraint::Length(command_height),
            Constraint::Length(hints_height(&view.hints, area.width)),
        ])
        .split(area);

    render_title(f, chunks[0], &view.state, view.debug, theme);
    render_entries(f, chunks[1], &view.state, &view.date_format, theme);
    render_messages(f, chunks[2], messages, theme);
    if let Some(command) = view.state.command() {
        render_command_line(f, chunks[3], &view.shell, command, theme);
    }
    render_hints(f, chunks[4], &view.hints, theme);
    render_menu(f, chunks[1], &view.menu, theme);
}

/// Draws `dialog` over a copy of the last full frame.
pub fn render_dialog_over(f: &mut Frame, backdrop: Option<&Buffer>, dialog: &Dialog, theme: &Theme) {
    if let Some(backdrop) = backdrop {
        let buffer = f.buffer_mut();
        let area = buffer.area.intersection(backdrop.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let (Some(cell), Some(source)) = (buffer.cell_mut((x, y)), backdrop.cell((x, y))) {
                    *cell = source.clone();
                }
            }
        }
    }
    render_dialog(f, dialog, theme);
}
