//! The built-in key and menu actions, plus one action per macro.
//!
//! Registration order is priority: when two actions share a key, the one
//! listed first wins whenever it is available.

use std::sync::Arc;

use crate::action::{Action, ActionCategory, ActionEnv, ActionRegistry, ActionStyle, Effect, Trigger};
use crate::config::keymap::Keymap;
use crate::error::CoreResult;
use crate::fs::entry::{Entry, EntryType};
use crate::macros::{Macro, MacroRegistry};
use crate::nav::list::Completion;
use crate::nav::state::{InputMode, State};

/// Built-in action ids and their default keys, in registration order.
pub const DEFAULT_BINDINGS: &[(&str, &[&str])] = &[
    ("menu_up", &["up"]),
    ("menu_down", &["down"]),
    ("menu_submit", &["enter"]),
    ("menu_close", &["esc"]),
    ("command_run", &["enter"]),
    ("command_cancel", &["esc"]),
    ("cursor_up", &["up"]),
    ("cursor_down", &["down"]),
    ("page_up", &["pageup"]),
    ("page_down", &["pagedown"]),
    ("cursor_home", &["home"]),
    ("cursor_end", &["end"]),
    ("autocomplete", &["tab"]),
    ("autocomplete_reverse", &["shift+tab"]),
    ("clear_filter", &["esc"]),
    ("navigate_into", &["enter", "right"]),
    ("open_file", &["enter"]),
    ("navigate_up", &["left"]),
    ("navigate_up_on_empty_filter", &["backspace"]),
    ("exit_here", &["esc"]),
    ("start_command", &[":"]),
    ("open_menu", &["space"]),
    ("delete_entry", &["delete"]),
    ("refresh", &["f5"]),
    ("toggle_hidden", &["alt+h"]),
    ("leave_quick_mode", &["esc"]),
];

impl ActionRegistry {
    /// Registers every built-in action with the keys from `keymap`, then
    /// one action per macro binding and per visible macro.
    pub fn builtin(keymap: &Keymap, macros: &MacroRegistry) -> Self {
        let mut registry = Self::new();
        let trigger = |action: &Action| Trigger::Keys(keymap.keys(action.id()).to_vec());

        for action in normal_actions() {
            let trigger = trigger(&action);
            registry.register(ActionCategory::Normal, action.bound_to(trigger));
        }
        for m in macros.iter() {
            if let Some(key) = m.key {
                let action = macro_action(m).when(|env| env.state.command().is_none()).and_available(m);
                registry.register(ActionCategory::Normal, action.bound_to(Trigger::Keys(vec![key])));
            }
        }

        let leave = Action::new("leave_quick_mode", |env| {
            Ok(Effect::State(env.state.clone().with_input_mode(InputMode::Normal)))
        })
        .described("leave quick mode");
        let leave_trigger = trigger(&leave);
        registry.register(ActionCategory::QuickMacro, leave.bound_to(leave_trigger));
        for m in macros.iter() {
            if let Some(key) = m.quick_key {
                let action = macro_action(m).and_available(m);
                registry.register(
                    ActionCategory::QuickMacro,
                    action.bound_to(Trigger::Keys(vec![key])),
                );
            }
        }

        for action in menu_actions() {
            registry.register_menu(action);
        }
        for m in macros.iter().filter(|m| !m.hidden) {
            registry.register_menu(macro_action(m).and_available(m));
        }

        tracing::debug!(
            normal = registry.actions(ActionCategory::Normal).len(),
            quick = registry.actions(ActionCategory::QuickMacro).len(),
            "action registry built"
        );
        registry
    }
}

impl Action {
    /// Adds the macro's own condition to this action's.
    fn and_available(self, m: &Arc<Macro>) -> Self {
        let own = Arc::clone(&self.condition);
        let m = Arc::clone(m);
        self.when(move |env| own(env) && m.is_available(&env.scope()))
    }
}

/// An action running `m`, described and styled after it.
fn macro_action(m: &Arc<Macro>) -> Action {
    let style = if m.depends_on_entry() {
        ActionStyle::Entry
    } else if m.depends_on_filter() {
        ActionStyle::Filter
    } else {
        ActionStyle::Normal
    };
    let describe = Arc::clone(m);
    let run = Arc::clone(m);
    let action = Action::new(format!("macro:{}", m.label()), move |_| {
        Ok(Effect::RunMacro(Arc::clone(&run)))
    })
    .described_by(move |env| describe.describe(&env.scope()))
    .styled(style);
    if m.hidden {
        action.hidden()
    } else {
        action
    }
}

fn menu_open(env: &ActionEnv<'_>) -> bool {
    env.state.is_menu_open()
}

fn typing_command(env: &ActionEnv<'_>) -> bool {
    env.state.command().is_some()
}

/// Neither the menu nor the command line has the keyboard.
fn browsing(env: &ActionEnv<'_>) -> bool {
    !menu_open(env) && !typing_command(env)
}

fn current_is(env: &ActionEnv<'_>, kind: EntryType) -> bool {
    env.state
        .current_entry()
        .is_some_and(|entry| entry.resolved_type() == kind)
}

fn current_name(env: &ActionEnv<'_>) -> String {
    env.state
        .current_entry()
        .map(|entry| entry.name().to_string())
        .unwrap_or_default()
}

fn next(state: State) -> CoreResult<Effect> {
    Ok(Effect::State(state))
}

/// Descends into a directory or opens a file.
fn enter(state: &State, entry: &Entry) -> CoreResult<Effect> {
    match entry.resolved_type() {
        EntryType::Directory => next(state.navigate_to(Some(entry.path()))?),
        EntryType::RegularFile => Ok(Effect::OpenFile(entry.path().to_path_buf())),
        _ => Ok(Effect::None),
    }
}

fn autocomplete(env: &ActionEnv<'_>, invert: bool) -> CoreResult<Effect> {
    let settings = &env.config.autocomplete;
    let Completion { list, navigate } = env.state.entries().clone().autocomplete(
        settings.style,
        settings.auto_navigation,
        invert,
    );
    let state = env.state.clone().with_entries(list);
    if navigate {
        if let Some(entry) = state.current_entry() {
            return enter(&state, entry);
        }
    }
    next(state)
}

/// Exits into the current directory, unless that is where we started.
fn exit_target(env: &ActionEnv<'_>) -> Option<std::path::PathBuf> {
    let directory = env.state.directory();
    (directory != env.session.working_directory).then(|| directory.to_path_buf())
}

fn normal_actions() -> Vec<Action> {
    vec![
        Action::new("menu_up", |_| Ok(Effect::MenuCursor(-1)))
            .when(menu_open)
            .described("menu up")
            .hidden(),
        Action::new("menu_down", |_| Ok(Effect::MenuCursor(1)))
            .when(menu_open)
            .described("menu down")
            .hidden(),
        Action::new("menu_submit", |_| Ok(Effect::MenuSubmit))
            .when(menu_open)
            .described("select"),
        Action::new("menu_close", |env| next(env.state.clone().with_menu_closed()))
            .when(menu_open)
            .described("close menu"),
        Action::new("command_run", |env| {
            Ok(match env.state.command() {
                Some(command) if !command.trim().is_empty() => {
                    Effect::RunCommand(command.to_string())
                }
                _ => Effect::State(env.state.clone().with_command(None)),
            })
        })
        .when(typing_command)
        .described_by(|env| format!("run in {}", env.session.shell)),
        Action::new("command_cancel", |env| next(env.state.clone().with_command(None)))
            .when(typing_command)
            .described("cancel"),
        Action::new("cursor_up", |env| next(env.state.clone().with_cursor_shifted(-1)))
            .when(|env| !env.state.entries().is_empty())
            .described("up")
            .hidden(),
        Action::new("cursor_down", |env| next(env.state.clone().with_cursor_shifted(1)))
            .when(|env| !env.state.entries().is_empty())
            .described("down")
            .hidden(),
        Action::new("page_up", |env| {
            let cursor = env.state.cursor().saturating_sub(env.config.general.page_size);
            next(env.state.clone().with_cursor_coerced(cursor))
        })
        .when(|env| !env.state.entries().is_empty())
        .described("page up")
        .hidden(),
        Action::new("page_down", |env| {
            let cursor = env.state.cursor() + env.config.general.page_size;
            next(env.state.clone().with_cursor_coerced(cursor))
        })
        .when(|env| !env.state.entries().is_empty())
        .described("page down")
        .hidden(),
        Action::new("cursor_home", |env| next(env.state.clone().with_cursor_coerced(0)))
            .when(|env| !env.state.entries().is_empty())
            .described("first")
            .hidden(),
        Action::new("cursor_end", |env| {
            let last = env.state.entries().filtered_len().saturating_sub(1);
            next(env.state.clone().with_cursor_coerced(last))
        })
        .when(|env| !env.state.entries().is_empty())
        .described("last")
        .hidden(),
        Action::new("autocomplete", |env| autocomplete(env, false))
            .when(|env| browsing(env) && !env.state.entries().is_empty())
            .described("complete")
            .styled(ActionStyle::Filter),
        Action::new("autocomplete_reverse", |env| autocomplete(env, true))
            .when(|env| browsing(env) && !env.state.entries().is_empty())
            .described("complete backwards")
            .styled(ActionStyle::Filter)
            .hidden(),
        Action::new("clear_filter", |env| next(env.state.clone().with_filter("")))
            .when(|env| !typing_command(env) && !env.state.filter().is_empty())
            .described("clear filter")
            .styled(ActionStyle::Filter),
        Action::new("navigate_into", |env| match env.state.current_entry() {
            Some(entry) => enter(env.state, entry),
            None => Ok(Effect::None),
        })
        .when(|env| browsing(env) && current_is(env, EntryType::Directory))
        .described_by(|env| format!("open {}/", current_name(env)))
        .styled(ActionStyle::Entry),
        Action::new("open_file", |env| match env.state.current_entry() {
            Some(entry) => Ok(Effect::OpenFile(entry.path().to_path_buf())),
            None => Ok(Effect::None),
        })
        .when(|env| browsing(env) && current_is(env, EntryType::RegularFile))
        .described_by(|env| format!("open in {}", env.session.editor_name()))
        .styled(ActionStyle::Entry),
        Action::new("navigate_up", |env| next(env.state.navigated_up()?))
            .when(|env| browsing(env) && env.state.has_parent())
            .described("parent"),
        Action::new("navigate_up_on_empty_filter", |env| next(env.state.navigated_up()?))
            .when(|env| browsing(env) && env.state.filter().is_empty() && env.state.has_parent())
            .described("parent")
            .hidden(),
        Action::new("exit_here", |env| Ok(Effect::Exit(exit_target(env))))
            .when(|env| !typing_command(env))
            .described_by(|env| {
                if exit_target(env).is_some() {
                    "exit here".to_string()
                } else {
                    "quit".to_string()
                }
            }),
        Action::new("start_command", |env| {
            next(env.state.clone().with_command(Some(String::new())))
        })
        .when(|env| browsing(env) && env.state.filter().is_empty())
        .described("command"),
        Action::new("open_menu", |env| next(env.state.clone().with_menu_opened()))
            .when(|env| browsing(env) && env.state.filter().is_empty())
            .described("menu"),
        Action::new("delete_entry", |env| match env.state.current_entry() {
            Some(entry) => Ok(Effect::Delete(entry.path().to_path_buf())),
            None => Ok(Effect::None),
        })
        .when(|env| browsing(env) && env.state.current_entry().is_some())
        .described_by(|env| format!("delete {}", current_name(env)))
        .styled(ActionStyle::Danger),
        Action::new("refresh", |env| next(env.state.updated_entries(None)?))
            .described("refresh")
            .hidden(),
        Action::new("toggle_hidden", |env| {
            let show = !env.state.show_hidden();
            next(env.state.clone().with_show_hidden(show))
        })
        .when(|env| !typing_command(env))
        .described_by(|env| {
            if env.state.show_hidden() {
                "hide dotfiles".to_string()
            } else {
                "show dotfiles".to_string()
            }
        })
        .hidden(),
    ]
}

fn menu_actions() -> Vec<Action> {
    vec![
        Action::new("create_file", |_| Ok(Effect::CreateFile)).described("New file"),
        Action::new("create_directory", |_| Ok(Effect::CreateDirectory))
            .described("New directory"),
        Action::new("delete_entry", |env| match env.state.current_entry() {
            Some(entry) => Ok(Effect::Delete(entry.path().to_path_buf())),
            None => Ok(Effect::None),
        })
        .when(|env| env.state.current_entry().is_some())
        .described_by(|env| format!("Delete {}", current_name(env)))
        .styled(ActionStyle::Danger),
        Action::new("toggle_hidden", |env| {
            let show = !env.state.show_hidden();
            next(env.state.clone().with_show_hidden(show))
        })
        .described_by(|env| {
            if env.state.show_hidden() {
                "Hide hidden files".to_string()
            } else {
                "Show hidden files".to_string()
            }
        }),
        Action::new("go_to_starting_directory", |env| {
            next(env.state.navigate_to(Some(env.session.starting_directory.as_path()))?)
        })
        .when(|env| env.state.directory() != env.session.starting_directory)
        .described("Go to starting directory"),
        Action::new("run_command", |env| {
            next(env.state.clone().with_command(Some(String::new())))
        })
        .described("Run shell command"),
    ]
}
