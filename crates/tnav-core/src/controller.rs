//! The dispatch loop body.
//!
//! [`Controller::handle_event`] takes one key event through the dispatch
//! order (cancel, quick-macro mode, normal actions, text editing) and
//! applies the resulting [`Effect`]. I/O-class failures are reported through
//! the [`Host`] and the session continues; anything else is returned to the
//! caller, which treats it as fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::action::{ActionCategory, ActionEnv, ActionRegistry, ActionStyle, Effect};
use crate::config::keymap::Keymap;
use crate::config::settings::Config;
use crate::error::CoreResult;
use crate::fs::entry::Entry;
use crate::fs::ops::{create_directory, create_file, delete_entry};
use crate::host::{Host, MessageLevel, ProcessOutput, ProcessRequest, Prompt};
use crate::key::{Key, KeyEvent};
use crate::macros::{execute, Macro, MacroBridge, MacroRegistry};
use crate::nav::state::{InputMode, State};
use crate::session::Session;

/// Set once the session should end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    /// Directory handed to the parent shell, if any.
    pub target: Option<PathBuf>,
}

/// One entry of the key hint bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub keys: String,
    pub description: String,
    pub style: ActionStyle,
}

/// One row of the open menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub description: String,
    pub style: ActionStyle,
    pub selected: bool,
}

/// Owns the state and applies actions to it.
pub struct Controller<H: Host> {
    state: State,
    session: Session,
    config: Config,
    registry: ActionRegistry,
    macros: MacroRegistry,
    host: H,
    exit: Option<ExitRequest>,
    last_action: Option<String>,
}

impl<H: Host> Controller<H> {
    pub fn new(
        state: State,
        session: Session,
        config: Config,
        keymap: &Keymap,
        macros: MacroRegistry,
        host: H,
    ) -> Self {
        let registry = ActionRegistry::builtin(keymap, &macros);
        Self {
            state,
            session,
            config,
            registry,
            macros,
            host,
            exit: None,
            last_action: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn exit_request(&self) -> Option<&ExitRequest> {
        self.exit.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    fn env(&self) -> ActionEnv<'_> {
        ActionEnv::new(&self.state, &self.session, &self.config)
    }

    fn category(&self) -> ActionCategory {
        match self.state.input_mode() {
            InputMode::Normal => ActionCategory::Normal,
            InputMode::QuickMacro => ActionCategory::QuickMacro,
        }
    }

    /// Hints for the active input mode.
    pub fn hints(&self) -> Vec<Hint> {
        if !self.config.hints.show_hints {
            return Vec::new();
        }
        let env = self.env();
        let show_hidden = self.config.hints.show_hidden_hints;
        self.registry
            .available(self.category(), &env)
            .into_iter()
            .filter(|key_action| show_hidden || !key_action.action().is_hidden())
            .map(|key_action| Hint {
                keys: key_action.trigger.to_string(),
                description: key_action.action().describe(&env),
                style: key_action.action().style(),
            })
            .collect()
    }

    /// Rows of the menu, empty while it is closed.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let Some(cursor) = self.state.menu_cursor() else {
            return Vec::new();
        };
        let env = self.env();
        self.registry
            .menu(&env)
            .into_iter()
            .enumerate()
            .map(|(i, action)| MenuItem {
                description: action.describe(&env),
                style: action.style(),
                selected: i == cursor,
            })
            .collect()
    }

    fn menu_len(&self) -> usize {
        self.registry.menu(&self.env()).len()
    }

    /// Handles one input event.
    ///
    /// # Errors
    ///
    /// Only non-recoverable errors (see [`CoreError::is_recoverable`]).
    /// Recoverable ones are shown as an error message plus a hint.
    ///
    /// [`CoreError::is_recoverable`]: crate::CoreError::is_recoverable
    pub fn handle_event(&mut self, event: KeyEvent) -> CoreResult<()> {
        self.state = self.state.clone().with_last_event(event);
        if event.is_cancel() {
            tracing::info!("cancelled");
            self.exit = Some(ExitRequest { target: None });
            return Ok(());
        }

        self.last_action = None;
        match self.dispatch(&event) {
            Ok(()) => Ok(()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, action = ?self.last_action, "action failed");
                self.host.message(MessageLevel::Error, &e.to_string());
                let hint = match &self.last_action {
                    Some(id) => format!("`{id}` did not complete"),
                    None => "the action did not complete".to_string(),
                };
                self.host.message(MessageLevel::Info, &hint);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn dispatch(&mut self, event: &KeyEvent) -> CoreResult<()> {
        if self.state.input_mode() == InputMode::QuickMacro {
            if let Some(effect) = self.perform_matching(ActionCategory::QuickMacro, event)? {
                return self.apply(effect);
            }
            if event.is_modifier_only() {
                return Ok(());
            }
            tracing::debug!(%event, "leaving quick macro mode");
            self.state = self.state.clone().with_input_mode(InputMode::Normal);
        } else if event.ctrl {
            tracing::debug!(%event, "entering quick macro mode");
            self.state = self.state.clone().with_input_mode(InputMode::QuickMacro);
            return Ok(());
        }

        if let Some(effect) = self.perform_matching(ActionCategory::Normal, event)? {
            return self.apply(effect);
        }
        self.edit_text(event);
        Ok(())
    }

    fn perform_matching(
        &mut self,
        category: ActionCategory,
        event: &KeyEvent,
    ) -> CoreResult<Option<Effect>> {
        let env = self.env();
        let Some(key_action) = self.registry.find(category, event, &env) else {
            return Ok(None);
        };
        let id = key_action.action().id().to_string();
        tracing::debug!(action = %id, %event, "dispatching");
        let effect = key_action.action().perform(&env);
        self.last_action = Some(id);
        effect.map(Some)
    }

    /// Routes an unbound key to the command line or the filter.
    fn edit_text(&mut self, event: &KeyEvent) {
        if let Some(command) = self.state.command() {
            if let Some(command) = edited(command, event) {
                self.state = self.state.clone().with_command(Some(command));
            }
        } else if let Some(filter) = edited(self.state.filter(), event) {
            self.state = self.state.clone().with_filter(&filter);
        }
    }

    fn apply(&mut self, effect: Effect) -> CoreResult<()> {
        match effect {
            Effect::None => {}
            Effect::State(state) => self.state = state,
            Effect::MenuCursor(offset) => {
                let len = self.menu_len();
                self.state = self.state.clone().with_menu_cursor_shifted(offset, len);
            }
            Effect::MenuSubmit => return self.submit_menu(),
            Effect::OpenFile(path) => self.open_file(&path)?,
            Effect::RunCommand(command) => {
                self.state = self.state.clone().with_command(None);
                self.run_command(&command)?;
            }
            Effect::RunMacro(m) => self.run_macro(&m)?,
            Effect::CreateFile => self.create(false)?,
            Effect::CreateDirectory => self.create(true)?,
            Effect::Delete(path) => self.delete(&path)?,
            Effect::Exit(target) => self.request_exit(target),
        }
        if self.state.is_menu_open() {
            let len = self.menu_len();
            self.state = self.state.clone().with_menu_cursor_coerced(len);
        }
        Ok(())
    }

    fn submit_menu(&mut self) -> CoreResult<()> {
        let (id, effect) = {
            let env = self.env();
            let menu = self.registry.menu(&env);
            match self.state.menu_cursor().and_then(|i| menu.get(i)) {
                Some(action) => {
                    tracing::debug!(action = action.id(), "menu action");
                    (Some(action.id().to_string()), action.perform(&env))
                }
                None => (None, Ok(Effect::None)),
            }
        };
        if id.is_some() {
            self.last_action = id;
        }
        let effect = effect?;
        self.state = self.state.clone().with_menu_closed();
        let effect = match effect {
            Effect::State(state) => Effect::State(state.with_menu_closed()),
            other => other,
        };
        self.apply(effect)
    }

    fn refresh(&mut self, preferred: Option<&dyn Fn(&Entry) -> bool>) -> CoreResult<()> {
        self.state = self.state.updated_entries(preferred)?;
        Ok(())
    }

    /// The child may have removed the directory; keep the old listing then.
    fn refresh_after_process(&mut self) {
        match self.state.updated_entries(None) {
            Ok(state) => self.state = state,
            Err(e) => tracing::warn!(error = %e, "could not refresh entries"),
        }
    }

    fn open_file(&mut self, path: &Path) -> CoreResult<()> {
        let request = ProcessRequest::editor(
            &self.session.editor,
            path.to_path_buf(),
            self.state.directory().to_path_buf(),
        );
        tracing::info!(file = %path.display(), editor = %self.session.editor, "opening file");
        let output = self.host.run_process(&request)?;
        self.session.exit_code = Some(output.exit_code);
        self.refresh_after_process();
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> CoreResult<()> {
        let request = ProcessRequest::shell(
            self.session.shell,
            command,
            self.state.directory().to_path_buf(),
            false,
        );
        tracing::info!(command, "running command");
        let output = self.host.run_process(&request)?;
        self.session.exit_code = Some(output.exit_code);
        if output.exit_code != 0 {
            self.host.message(
                MessageLevel::Warning,
                &format!("`{command}` exited with status {}", output.exit_code),
            );
        }
        self.refresh_after_process();
        Ok(())
    }

    fn run_macro(&mut self, m: &Arc<Macro>) -> CoreResult<()> {
        execute(self, m)?;
        Ok(())
    }

    fn create(&mut self, directory: bool) -> CoreResult<()> {
        let message = if directory {
            "New directory name"
        } else {
            "New file name"
        };
        let prompt = Prompt::Text {
            message: message.to_string(),
            default: String::new(),
        };
        let Some(name) = self.host.prompt(&prompt)? else {
            return Ok(());
        };
        let parent = self.state.directory().to_path_buf();
        let path = if directory {
            create_directory(&parent, &name)?
        } else {
            create_file(&parent, &name)?
        };
        self.refresh(Some(&|entry: &Entry| entry.path() == path))?;
        self.host
            .message(MessageLevel::Success, &format!("Created {name}"));
        Ok(())
    }

    fn delete(&mut self, path: &Path) -> CoreResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let prompt = Prompt::Choice {
            message: format!("Delete {name}?"),
            choices: vec!["No".to_string(), "Yes".to_string()],
        };
        if self.host.prompt(&prompt)?.as_deref() != Some("Yes") {
            return Ok(());
        }
        delete_entry(path)?;
        self.refresh(None)?;
        self.host
            .message(MessageLevel::Success, &format!("Deleted {name}"));
        Ok(())
    }
}

/// `text` after applying `event` as a text edit, or `None` if the event
/// does not edit text.
fn edited(text: &str, event: &KeyEvent) -> Option<String> {
    if event.key == Key::Backspace && !event.ctrl && !event.alt {
        let mut text = text.to_string();
        return text.pop().map(|_| text);
    }
    event.typed_char().map(|c| format!("{text}{c}"))
}

impl<H: Host> MacroBridge for Controller<H> {
    fn state(&self) -> &State {
        &self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn find_macro(&self, id: &str) -> Option<Arc<Macro>> {
        self.macros.find(id).cloned()
    }

    fn run_process(&mut self, request: &ProcessRequest) -> CoreResult<ProcessOutput> {
        self.host.run_process(request)
    }

    fn prompt(&mut self, prompt: &Prompt) -> CoreResult<Option<String>> {
        self.host.prompt(prompt)
    }

    fn message(&mut self, level: MessageLevel, text: &str) {
        self.host.message(level, text);
    }

    fn request_exit(&mut self, target: Option<PathBuf>) {
        tracing::info!(target = ?target, "exit requested");
        self.exit = Some(ExitRequest { target });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::host::testing::ScriptedHost;
    use crate::macros::raw::parse_macros;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Documents")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "x".repeat(1200)).unwrap();
        tmp
    }

    fn controller_with(tmp: &TempDir, macros: &str, host: ScriptedHost) -> Controller<ScriptedHost> {
        let state = State::new(tmp.path(), false).unwrap();
        let session = Session::new(state.directory().to_path_buf(), state.directory().to_path_buf())
            .with_editor("vi".to_string());
        let macros = MacroRegistry::new(parse_macros(macros).unwrap()).unwrap();
        Controller::new(state, session, Config::default(), &Keymap::default(), macros, host)
    }

    fn controller(tmp: &TempDir, host: ScriptedHost) -> Controller<ScriptedHost> {
        controller_with(tmp, "", host)
    }

    fn press(c: &mut Controller<ScriptedHost>, events: &[KeyEvent]) {
        for event in events {
            c.handle_event(*event).unwrap();
        }
    }

    fn key(key: Key) -> KeyEvent {
        KeyEvent::plain(key)
    }

    fn names(c: &Controller<ScriptedHost>) -> Vec<String> {
        c.state()
            .entries()
            .filtered()
            .map(|e| e.name().to_string())
            .collect()
    }

    #[test]
    fn typing_filters_and_autocomplete_opens_single_match() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());

        press(&mut c, &[KeyEvent::char('n'), KeyEvent::char('o')]);
        assert_eq!(c.state().filter(), "no");
        assert_eq!(names(&c), vec!["notes.txt"]);
        assert_eq!(c.state().cursor(), 0);

        press(&mut c, &[key(Key::Tab)]);
        assert_eq!(c.state().filter(), "notes.txt");
        assert!(c.host().processes.is_empty());

        press(&mut c, &[key(Key::Tab)]);
        let request = &c.host().processes[0];
        assert_eq!(request.program, "vi");
        assert!(request.args[0].ends_with("notes.txt"));
    }

    #[test]
    fn backspace_edits_filter_before_going_up() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());
        let start = c.state().directory().to_path_buf();

        press(&mut c, &[KeyEvent::char('d'), key(Key::Backspace)]);
        assert_eq!(c.state().filter(), "");
        assert_eq!(c.state().directory(), start);

        press(&mut c, &[key(Key::Backspace)]);
        assert_eq!(c.state().directory(), start.parent().unwrap());
    }

    #[test]
    fn exit_here_after_navigating_targets_directory() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());

        press(&mut c, &[key(Key::Enter)]);
        let documents = c.state().directory().to_path_buf();
        assert!(documents.ends_with("Documents"));

        press(&mut c, &[key(Key::Escape)]);
        assert_eq!(
            c.exit_request(),
            Some(&ExitRequest {
                target: Some(documents)
            })
        );
    }

    #[test]
    fn exit_in_working_directory_has_no_target() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());
        press(&mut c, &[key(Key::Escape)]);
        assert_eq!(c.exit_request(), Some(&ExitRequest { target: None }));
    }

    #[test]
    fn ctrl_c_cancels_from_anywhere() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());
        press(
            &mut c,
            &[key(Key::Enter), KeyEvent::char(':'), KeyEvent::char('c').with_ctrl()],
        );
        assert_eq!(c.exit_request(), Some(&ExitRequest { target: None }));
    }

    #[test]
    fn command_line_runs_through_shell() {
        let tmp = fixture();
        let host = ScriptedHost::default().with_output(2, "", "");
        let mut c = controller(&tmp, host);

        press(&mut c, &[KeyEvent::char(':'), KeyEvent::char('l'), KeyEvent::char('s')]);
        assert_eq!(c.state().command(), Some("ls"));
        assert_eq!(c.state().filter(), "");

        press(&mut c, &[key(Key::Enter)]);
        assert_eq!(c.state().command(), None);
        let request = &c.host().processes[0];
        assert_eq!(request.args.last().map(String::as_str), Some("ls"));
        assert!(!request.capture);
        assert_eq!(c.session().exit_code, Some(2));
        assert_eq!(c.host().texts(MessageLevel::Warning).len(), 1);
    }

    #[test]
    fn menu_creates_file_and_selects_it() {
        let tmp = fixture();
        let host = ScriptedHost::answering(&[Some("fresh.txt")]);
        let mut c = controller(&tmp, host);

        press(&mut c, &[KeyEvent::char(' ')]);
        assert!(c.state().is_menu_open());
        assert_eq!(c.menu_items()[0].description, "New file");
        assert!(c.menu_items()[0].selected);

        press(&mut c, &[key(Key::Enter)]);
        assert!(!c.state().is_menu_open());
        assert!(tmp.path().join("fresh.txt").is_file());
        assert_eq!(c.state().current_entry().unwrap().name(), "fresh.txt");
        assert_eq!(c.host().texts(MessageLevel::Success), vec!["Created fresh.txt"]);
    }

    #[test]
    fn menu_cursor_wraps() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());
        press(&mut c, &[KeyEvent::char(' '), key(Key::Up)]);
        let items = c.menu_items();
        assert!(items.last().unwrap().selected);
        assert_eq!(c.state().cursor(), 0);
    }

    #[test]
    fn delete_requires_confirmation() {
        let tmp = fixture();
        let host = ScriptedHost::answering(&[Some("No"), Some("Yes")]);
        let mut c = controller(&tmp, host);

        press(&mut c, &[key(Key::Down), key(Key::Delete)]);
        assert!(tmp.path().join("notes.txt").exists());

        press(&mut c, &[key(Key::Delete)]);
        assert!(!tmp.path().join("notes.txt").exists());
        assert_eq!(names(&c), vec!["Documents"]);
    }

    #[test]
    fn recoverable_errors_become_messages() {
        let tmp = fixture();
        let host = ScriptedHost::answering(&[Some("notes.txt")]);
        let mut c = controller(&tmp, host);

        press(&mut c, &[KeyEvent::char(' '), key(Key::Enter)]);
        assert!(!c.is_finished());
        let errors = c.host().texts(MessageLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("already exists"));
        assert_eq!(c.host().texts(MessageLevel::Info).len(), 1);
    }

    #[test]
    fn interpreter_errors_are_fatal() {
        let tmp = fixture();
        let macros = r#"
[[macros]]
id = "loop"
key = "l"
actions = [{ run_macro = { id = "loop" } }]
"#;
        let mut c = controller_with(&tmp, macros, ScriptedHost::default());
        let err = c.handle_event(KeyEvent::char('l')).unwrap_err();
        assert!(matches!(err, CoreError::MacroDepth(_)));
    }

    #[test]
    fn quick_mode_runs_macros_and_falls_through() {
        let tmp = fixture();
        let macros = r#"
[[macros]]
id = "hello"
quick_key = "g"
actions = [{ print = { message = "hi from {{entryName}}", style = "info" } }]
"#;
        let mut c = controller_with(&tmp, macros, ScriptedHost::default());

        press(&mut c, &[KeyEvent::char('x').with_ctrl()]);
        assert_eq!(c.state().input_mode(), InputMode::QuickMacro);
        assert_eq!(c.state().filter(), "");

        press(&mut c, &[KeyEvent::char('g').with_ctrl()]);
        assert_eq!(c.host().texts(MessageLevel::Info), vec!["hi from Documents"]);
        assert_eq!(c.state().input_mode(), InputMode::QuickMacro);

        press(&mut c, &[KeyEvent::plain(Key::Modifier(crate::key::ModifierKey::Ctrl))]);
        assert_eq!(c.state().input_mode(), InputMode::QuickMacro);

        press(&mut c, &[KeyEvent::char('n')]);
        assert_eq!(c.state().input_mode(), InputMode::Normal);
        assert_eq!(c.state().filter(), "n");
    }

    #[test]
    fn macro_exit_sets_exit_request() {
        let tmp = fixture();
        let macros = r#"
[[macros]]
id = "leave"
key = "q"
actions = [{ exit = { directory = "{{entryPath}}" } }]
"#;
        let mut c = controller_with(&tmp, macros, ScriptedHost::default());
        press(&mut c, &[KeyEvent::char('q')]);
        let target = c.exit_request().unwrap().target.clone().unwrap();
        assert!(target.ends_with("Documents"));
    }

    #[test]
    fn hints_follow_state() {
        let tmp = fixture();
        let mut c = controller(&tmp, ScriptedHost::default());

        let hints = c.hints();
        assert!(hints.iter().any(|h| h.description == "open Documents/" && h.keys == "enter/→"));
        assert!(hints.iter().any(|h| h.description == "quit"));
        assert!(!hints.iter().any(|h| h.description == "up"));

        press(&mut c, &[key(Key::Down)]);
        let hints = c.hints();
        let open = hints.iter().find(|h| h.description == "open in vi").unwrap();
        assert_eq!(open.style, ActionStyle::Entry);
    }
}
