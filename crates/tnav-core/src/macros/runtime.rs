//! The macro interpreter.
//!
//! A [`MacroRuntimeContext`] runs [`MacroActions`] against a local variable
//! map layered over the live navigator, reached through a [`MacroBridge`].
//! `return` and `exit` travel back up the call stack as [`Flow`] values;
//! only real failures are `Err`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::fs::ops::{is_directory, normalize};
use crate::host::{MessageLevel, ProcessOutput, ProcessRequest, Prompt};
use crate::macros::action::{MacroAction, MacroActions, PromptKind, RunMacro};
use crate::macros::model::Macro;
use crate::macros::symbol::{BuiltinSymbol, MacroSymbol, Scope, SymbolLookup};
use crate::macros::template::MacroString;
use crate::nav::state::State;
use crate::session::Session;

/// Deepest allowed chain of `run_macro` calls.
pub const MAX_CALL_DEPTH: usize = 64;

/// What the interpreter needs from the running application.
pub trait MacroBridge {
    fn state(&self) -> &State;
    fn set_state(&mut self, state: State);
    fn session(&self) -> &Session;
    fn session_mut(&mut self) -> &mut Session;
    fn find_macro(&self, id: &str) -> Option<Arc<Macro>>;
    fn run_process(&mut self, request: &ProcessRequest) -> CoreResult<ProcessOutput>;
    /// `Ok(None)` when the user cancelled.
    fn prompt(&mut self, prompt: &Prompt) -> CoreResult<Option<String>>;
    fn message(&mut self, level: MessageLevel, text: &str);
    /// Ends the session once the current dispatch completes.
    fn request_exit(&mut self, target: Option<PathBuf>);
}

/// How a sequence of actions finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A `return` (or a cancelled prompt) unwinding to the nearest call
    /// boundary.
    Return,
    /// An `exit` was requested; nothing else runs.
    Exit,
}

/// One stack frame of the interpreter.
pub struct MacroRuntimeContext<'b, B: MacroBridge + ?Sized> {
    bridge: &'b mut B,
    variables: BTreeMap<String, String>,
    depth: usize,
}

/// Runs `m` as a top-level macro.
///
/// A `return` at the top level simply ends the macro.
pub fn execute<B: MacroBridge + ?Sized>(bridge: &mut B, m: &Macro) -> CoreResult<Flow> {
    tracing::info!(r#macro = m.label(), "running macro");
    let mut context = MacroRuntimeContext::new(bridge);
    match context.run(&m.actions)? {
        Flow::Exit => Ok(Flow::Exit),
        Flow::Continue | Flow::Return => Ok(Flow::Continue),
    }
}

impl<'b, B: MacroBridge + ?Sized> MacroRuntimeContext<'b, B> {
    pub fn new(bridge: &'b mut B) -> Self {
        Self {
            bridge,
            variables: BTreeMap::new(),
            depth: 0,
        }
    }

    /// The local (non built-in, non env) variables of this frame.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    fn scope(&self) -> Scope<'_> {
        Scope {
            state: self.bridge.state(),
            session: self.bridge.session(),
            variables: &self.variables,
        }
    }

    pub fn evaluate(&self, template: &MacroString) -> String {
        template.evaluate(&self.scope())
    }

    pub fn get(&self, symbol: &MacroSymbol) -> String {
        self.scope().lookup(symbol)
    }

    /// Assigns `symbol`. Environment symbols write the process
    /// environment, mutable built-ins update the navigator, read-only
    /// built-ins are left alone with a warning.
    pub fn set(&mut self, symbol: &MacroSymbol, value: String) -> CoreResult<()> {
        match symbol {
            MacroSymbol::Env(name) => {
                std::env::set_var(name, value);
                Ok(())
            }
            MacroSymbol::Generic(name) => match BuiltinSymbol::from_name(name) {
                Some(builtin) => self.set_builtin(builtin, value),
                None => {
                    self.variables.insert(name.clone(), value);
                    Ok(())
                }
            },
        }
    }

    fn set_builtin(&mut self, builtin: BuiltinSymbol, value: String) -> CoreResult<()> {
        if !builtin.is_mutable() {
            tracing::warn!(symbol = builtin.name(), "write to read-only variable ignored");
            self.bridge.message(
                MessageLevel::Warning,
                &format!("`{}` is read-only", builtin.name()),
            );
            return Ok(());
        }
        let state = self.bridge.state();
        let next = match builtin {
            BuiltinSymbol::Directory => {
                let target = resolve_path(state.directory(), &value);
                state.navigate_to(Some(&target))?
            }
            BuiltinSymbol::Filter => state.clone().with_filter(&value),
            BuiltinSymbol::Cursor => match value.trim().parse::<usize>() {
                Ok(index) => state.clone().with_cursor_coerced(index),
                Err(_) => {
                    tracing::warn!(value = %value, "ignoring non-numeric cursor");
                    return Ok(());
                }
            },
            BuiltinSymbol::Command => {
                let command = (!value.is_empty()).then_some(value);
                state.clone().with_command(command)
            }
            BuiltinSymbol::ExitCode => {
                self.bridge.session_mut().exit_code = value.trim().parse().ok();
                return Ok(());
            }
            _ => return Ok(()),
        };
        self.bridge.set_state(next);
        Ok(())
    }

    /// Runs `actions` in order, stopping at the first `return` or `exit`.
    pub fn run(&mut self, actions: &MacroActions) -> CoreResult<Flow> {
        for action in actions.iter() {
            match self.run_action(action)? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Continue)
    }

    fn run_action(&mut self, action: &MacroAction) -> CoreResult<Flow> {
        match action {
            MacroAction::RunCommand {
                command,
                directory,
                exit_code,
                stdout,
                stderr,
                trim,
            } => {
                let command = self.evaluate(command);
                let working_dir = match directory {
                    Some(dir) => resolve_path(self.bridge.state().directory(), &self.evaluate(dir)),
                    None => self.bridge.state().directory().to_path_buf(),
                };
                let capture = stdout.is_some() || stderr.is_some();
                let request =
                    ProcessRequest::shell(self.bridge.session().shell, &command, working_dir, capture);
                tracing::debug!(command = %command, "macro command");

                let output = self.bridge.run_process(&request)?;
                self.record_exit_code(output.exit_code, exit_code.as_ref())?;
                if let Some(symbol) = stdout {
                    self.set(symbol, captured(output.stdout, *trim))?;
                }
                if let Some(symbol) = stderr {
                    self.set(symbol, captured(output.stderr, *trim))?;
                }
                self.refresh();
                Ok(Flow::Continue)
            }
            MacroAction::Prompt {
                message,
                kind,
                output,
            } => {
                let message = self.evaluate(message);
                let prompt = match kind {
                    PromptKind::Text { default } => Prompt::Text {
                        message,
                        default: self.evaluate(default),
                    },
                    PromptKind::Choice { choices } => Prompt::Choice {
                        message,
                        choices: choices.iter().map(|c| self.evaluate(c)).collect(),
                    },
                };
                match self.bridge.prompt(&prompt)? {
                    Some(answer) => {
                        self.set(output, answer)?;
                        Ok(Flow::Continue)
                    }
                    None => {
                        tracing::debug!("prompt cancelled, returning");
                        Ok(Flow::Return)
                    }
                }
            }
            MacroAction::RunMacro(call) => self.call(call),
            MacroAction::Match {
                value,
                regex,
                groups,
            } => {
                let value = self.evaluate(value);
                let values: Vec<String> = match regex.captures(&value) {
                    Some(caps) => (1..=groups.len())
                        .map(|i| caps.get(i).map_or("", |m| m.as_str()).to_string())
                        .collect(),
                    None => vec![String::new(); groups.len()],
                };
                for (symbol, value) in groups.iter().zip(values) {
                    self.set(symbol, value)?;
                }
                Ok(Flow::Continue)
            }
            MacroAction::OpenFile { path, exit_code } => {
                let directory = self.bridge.state().directory().to_path_buf();
                let file = resolve_path(&directory, &self.evaluate(path));
                let request = ProcessRequest::editor(&self.bridge.session().editor, file, directory);
                let output = self.bridge.run_process(&request)?;
                self.record_exit_code(output.exit_code, exit_code.as_ref())?;
                self.refresh();
                Ok(Flow::Continue)
            }
            MacroAction::Set(assignments) => {
                let values: Vec<(MacroSymbol, String)> = assignments
                    .iter()
                    .map(|(symbol, template)| (symbol.clone(), self.evaluate(template)))
                    .collect();
                for (symbol, value) in values {
                    self.set(&symbol, value)?;
                }
                Ok(Flow::Continue)
            }
            MacroAction::If {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate(&self.scope()) {
                    self.run(then)
                } else {
                    self.run(otherwise)
                }
            }
            MacroAction::Print {
                message,
                level,
                debug_only,
            } => {
                if !*debug_only || self.bridge.session().debug {
                    let text = self.evaluate(message);
                    self.bridge.message(*level, &text);
                }
                Ok(Flow::Continue)
            }
            MacroAction::Return => Ok(Flow::Return),
            MacroAction::Exit { directory } => {
                let target = directory.as_ref().and_then(|template| {
                    let raw = self.evaluate(template);
                    if raw.trim().is_empty() {
                        return None;
                    }
                    let path = resolve_path(self.bridge.state().directory(), &raw);
                    if is_directory(&path) {
                        Some(path)
                    } else {
                        tracing::warn!(target = %path.display(), "exit target is not a directory");
                        None
                    }
                });
                self.bridge.request_exit(target);
                Ok(Flow::Exit)
            }
        }
    }

    /// Runs another macro in a nested frame.
    ///
    /// Inputs come from `parameters` (evaluated here) or a copy of all our
    /// variables; outputs come back through `captures` (evaluated in the
    /// callee) or as a copy of all the callee's variables.
    pub fn call(&mut self, call: &RunMacro) -> CoreResult<Flow> {
        let target = self
            .bridge
            .find_macro(&call.id)
            .ok_or_else(|| CoreError::UnknownMacro(call.id.clone()))?;
        if self.depth + 1 > MAX_CALL_DEPTH {
            return Err(CoreError::MacroDepth(MAX_CALL_DEPTH));
        }

        let inputs: Option<Vec<(MacroSymbol, String)>> = call.parameters.as_ref().map(|params| {
            params
                .iter()
                .map(|(symbol, template)| (symbol.clone(), self.evaluate(template)))
                .collect()
        });
        let initial = match inputs {
            Some(_) => BTreeMap::new(),
            None => self.variables.clone(),
        };

        let mut callee = MacroRuntimeContext {
            bridge: &mut *self.bridge,
            variables: initial,
            depth: self.depth + 1,
        };
        for (symbol, value) in inputs.into_iter().flatten() {
            callee.set(&symbol, value)?;
        }

        if !call.ignore_condition && !target.is_available(&callee.scope()) {
            tracing::debug!(r#macro = %call.id, "condition not met, skipping call");
            if callee.bridge.session().debug {
                callee.bridge.message(
                    MessageLevel::Info,
                    &format!("skipped `{}`: condition not met", call.id),
                );
            }
            return Ok(Flow::Continue);
        }

        tracing::debug!(r#macro = %call.id, depth = callee.depth, "calling macro");
        let flow = callee.run(&target.actions)?;

        let outputs: Vec<(MacroSymbol, String)> = match &call.captures {
            Some(captures) => captures
                .iter()
                .map(|(symbol, template)| (symbol.clone(), callee.evaluate(template)))
                .collect(),
            None => callee
                .variables
                .into_iter()
                .map(|(name, value)| (MacroSymbol::Generic(name), value))
                .collect(),
        };
        for (symbol, value) in outputs {
            self.set(&symbol, value)?;
        }

        Ok(match flow {
            Flow::Exit => Flow::Exit,
            Flow::Return if !call.continue_on_return => Flow::Return,
            Flow::Return | Flow::Continue => Flow::Continue,
        })
    }

    fn record_exit_code(&mut self, code: i32, symbol: Option<&MacroSymbol>) -> CoreResult<()> {
        self.bridge.session_mut().exit_code = Some(code);
        match symbol {
            Some(symbol) => self.set(symbol, code.to_string()),
            None => Ok(()),
        }
    }

    /// Re-lists the directory after an external process may have changed it.
    fn refresh(&mut self) {
        match self.bridge.state().updated_entries(None) {
            Ok(next) => self.bridge.set_state(next),
            Err(e) => tracing::warn!(error = %e, "could not refresh entries"),
        }
    }
}

fn captured(output: String, trim: bool) -> String {
    if trim {
        output.trim_end_matches(['\n', '\r']).to_string()
    } else {
        output
    }
}

/// Resolves `raw` against `base` unless it is already absolute.
fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    normalize(&base.join(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::ScriptedHost;
    use crate::host::Host;
    use crate::macros::model::MacroRegistry;
    use crate::macros::raw::parse_macros;
    use std::fs;
    use tempfile::TempDir;

    struct TestBridge {
        state: State,
        session: Session,
        macros: MacroRegistry,
        host: ScriptedHost,
        exit: Option<Option<PathBuf>>,
    }

    impl TestBridge {
        fn new(tmp: &TempDir, macros_toml: &str, host: ScriptedHost) -> Self {
            let state = State::new(tmp.path(), false).unwrap();
            let session = Session::new(PathBuf::from("/work"), state.directory().to_path_buf());
            Self {
                state,
                session,
                macros: MacroRegistry::new(parse_macros(macros_toml).unwrap()).unwrap(),
                host,
                exit: None,
            }
        }

        fn run(&mut self, id: &str) -> CoreResult<Flow> {
            let m = self.macros.find(id).cloned().unwrap();
            execute(self, &m)
        }

        fn printed(&self) -> Vec<&str> {
            self.host.messages.iter().map(|(_, t)| t.as_str()).collect()
        }
    }

    impl MacroBridge for TestBridge {
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
            self.exit = Some(target);
        }
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        tmp
    }

    #[test]
    fn set_then_print_substitutes() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { set = { greeting = "hello", who = "{{entryName}}" } },
  { print = { message = "{{greeting}} {{who}}", style = "info" } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert_eq!(bridge.host.texts(MessageLevel::Info), vec!["hello src"]);
    }

    #[test]
    fn if_runs_exactly_one_branch() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { if = { condition = { equal = { values = ["{{entryType}}", "directory"] } }, then = [
    { print = { message = "dir" } },
  ], else = [
    { print = { message = "file" } },
  ] } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert_eq!(bridge.printed(), vec!["dir"]);
    }

    #[test]
    fn run_command_captures_output_and_exit_code() {
        let tmp = fixture();
        let host = ScriptedHost::default().with_output(3, "line one\n\n", "oops\n");
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { run_command = { command = "ls {{entryName}}", exit_code = "code", stdout = "out", stderr = "err" } },
  { print = { message = "{{code}}|{{out}}|{{err}}|{{exitCode}}" } },
]
"#,
            host,
        );
        bridge.run("m").unwrap();

        let request = &bridge.host.processes[0];
        assert_eq!(request.args.last().unwrap(), "ls src");
        assert!(request.capture);
        assert_eq!(bridge.printed(), vec!["3|line one|oops|3"]);
        assert_eq!(bridge.session.exit_code, Some(3));
    }

    #[test]
    fn cancelled_prompt_returns() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { prompt = { message = "Name?", output = "name" } },
  { print = { message = "unreachable" } },
]
"#,
            ScriptedHost::answering(&[None]),
        );
        assert_eq!(bridge.run("m").unwrap(), Flow::Continue);
        assert!(bridge.printed().is_empty());
        assert_eq!(bridge.host.prompts.len(), 1);
    }

    #[test]
    fn prompt_answer_is_stored() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { prompt = { message = "Pick", choices = ["{{entryName}}", "other"], output = "pick" } },
  { print = { message = "picked {{pick}}" } },
]
"#,
            ScriptedHost::answering(&[Some("other")]),
        );
        bridge.run("m").unwrap();
        assert_eq!(
            bridge.host.prompts[0],
            Prompt::Choice {
                message: "Pick".to_string(),
                choices: vec!["src".to_string(), "other".to_string()],
            }
        );
        assert_eq!(bridge.printed(), vec!["picked other"]);
    }

    #[test]
    fn match_assigns_groups_or_empty() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { match = { value = "v1.22", regex = "v(\\d+)\\.(\\d+)", groups = ["major", "minor"] } },
  { print = { message = "{{major}}/{{minor}}" } },
  { match = { value = "none", regex = "(\\d+)", groups = ["major"] } },
  { print = { message = "[{{major}}]" } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert_eq!(bridge.printed(), vec!["1/22", "[]"]);
    }

    #[test]
    fn explicit_parameters_and_captures_isolate_scopes() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "caller"
actions = [
  { set = { secret = "s3cr3t", a = "input" } },
  { run_macro = { id = "callee", parameters = { x = "{{a}}" }, captures = { got = "{{y}}" } } },
  { print = { message = "got={{got}} y={{y}} x={{x}}" } },
]

[[macros]]
id = "callee"
actions = [
  { print = { message = "x={{x}} secret={{secret}}" } },
  { set = { y = "from-callee" } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("caller").unwrap();
        assert_eq!(
            bridge.printed(),
            vec!["x=input secret=", "got=from-callee y= x="]
        );
    }

    #[test]
    fn implicit_call_shares_whole_variable_set() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "caller"
actions = [
  { set = { count = "1" } },
  { run_macro = { id = "bump" } },
  { print = { message = "{{count}}" } },
]

[[macros]]
id = "bump"
actions = [ { set = { count = "{{count}}+1" } } ]
"#,
            ScriptedHost::default(),
        );
        bridge.run("caller").unwrap();
        assert_eq!(bridge.printed(), vec!["1+1"]);
    }

    #[test]
    fn return_is_absorbed_unless_asked_to_propagate() {
        let tmp = fixture();
        let toml = r#"
[[macros]]
id = "absorbing"
actions = [
  { run_macro = { id = "early" } },
  { print = { message = "after" } },
]

[[macros]]
id = "propagating"
actions = [
  { run_macro = { id = "early", continue_on_return = false } },
  { print = { message = "after" } },
]

[[macros]]
id = "early"
actions = [ { set = { flag = "set" } }, "return", { print = { message = "never" } } ]
"#;
        let mut bridge = TestBridge::new(&tmp, toml, ScriptedHost::default());
        bridge.run("absorbing").unwrap();
        assert_eq!(bridge.printed(), vec!["after"]);

        let mut bridge = TestBridge::new(&tmp, toml, ScriptedHost::default());
        assert_eq!(bridge.run("propagating").unwrap(), Flow::Continue);
        assert!(bridge.printed().is_empty());
    }

    #[test]
    fn unavailable_callee_is_skipped_unless_ignored() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "caller"
actions = [
  { run_macro = { id = "guarded" } },
  { run_macro = { id = "guarded", ignore_condition = true } },
]

[[macros]]
id = "guarded"
condition = { not_empty = "{{filter}}" }
actions = [ { print = { message = "ran" } } ]
"#,
            ScriptedHost::default(),
        );
        bridge.run("caller").unwrap();
        assert_eq!(bridge.printed(), vec!["ran"]);
    }

    #[test]
    fn runaway_recursion_hits_depth_limit() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "loop"
actions = [ { run_macro = { id = "loop" } } ]
"#,
            ScriptedHost::default(),
        );
        assert!(matches!(
            bridge.run("loop"),
            Err(CoreError::MacroDepth(MAX_CALL_DEPTH))
        ));
    }

    #[test]
    fn builtin_writes_update_state_or_warn() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { set = { filter = "note" } },
  { set = { entryName = "nope" } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert_eq!(bridge.state.filter(), "note");
        assert_eq!(bridge.state.current_entry().unwrap().name(), "notes.txt");
        assert_eq!(
            bridge.host.texts(MessageLevel::Warning),
            vec!["`entryName` is read-only"]
        );
    }

    #[test]
    fn only_read_only_builtins_refuse_writes() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(&tmp, "", ScriptedHost::default());
        let mut context = MacroRuntimeContext::new(&mut bridge);
        for builtin in BuiltinSymbol::ALL {
            context
                .set(&MacroSymbol::Generic(builtin.name().to_string()), "x".to_string())
                .unwrap();
        }
        assert!(context.variables().is_empty());

        let refused: Vec<String> = BuiltinSymbol::ALL
            .into_iter()
            .filter(|b| !b.is_mutable())
            .map(|b| format!("`{}` is read-only", b.name()))
            .collect();
        assert_eq!(bridge.host.texts(MessageLevel::Warning), refused);
        assert_eq!(bridge.state.command(), Some("x"));
        assert_eq!(bridge.state.filter(), "x");
    }

    #[test]
    fn setting_directory_navigates() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [ { set = { directory = "src" } } ]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert!(bridge.state.directory().ends_with("src"));
    }

    #[test]
    fn exit_validates_target() {
        let tmp = fixture();
        let toml = r#"
[[macros]]
id = "good"
actions = [ { exit = { directory = "{{entryPath}}" } }, { print = { message = "never" } } ]

[[macros]]
id = "bad"
actions = [ { exit = { directory = "does-not-exist" } } ]
"#;
        let mut bridge = TestBridge::new(&tmp, toml, ScriptedHost::default());
        assert_eq!(bridge.run("good").unwrap(), Flow::Exit);
        assert_eq!(bridge.exit, Some(Some(bridge.state.directory().join("src"))));
        assert!(bridge.printed().is_empty());

        let mut bridge = TestBridge::new(&tmp, toml, ScriptedHost::default());
        bridge.run("bad").unwrap();
        assert_eq!(bridge.exit, Some(None));
    }

    #[test]
    fn env_symbols_write_process_environment() {
        let tmp = fixture();
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [
  { set = { "env:TNAV_RUNTIME_TEST" = "on" } },
  { print = { message = "{{env:TNAV_RUNTIME_TEST}}" } },
]
"#,
            ScriptedHost::default(),
        );
        bridge.run("m").unwrap();
        assert_eq!(bridge.printed(), vec!["on"]);
        assert_eq!(std::env::var("TNAV_RUNTIME_TEST").unwrap(), "on");
    }

    #[test]
    fn open_file_uses_editor_and_records_exit_code() {
        let tmp = fixture();
        let host = ScriptedHost::default().with_output(0, "", "");
        let mut bridge = TestBridge::new(
            &tmp,
            r#"
[[macros]]
id = "m"
actions = [ { open_file = { path = "notes.txt", exit_code = "rc" } }, { print = { message = "rc={{rc}}" } } ]
"#,
            host,
        );
        bridge.session.editor = "hx".to_string();
        bridge.run("m").unwrap();

        let request = &bridge.host.processes[0];
        assert_eq!(request.program, "hx");
        assert!(request.args[0].ends_with("notes.txt"));
        assert_eq!(bridge.printed(), vec!["rc=0"]);
    }

    #[test]
    fn debug_prints_only_in_debug_mode() {
        let tmp = fixture();
        let toml = r#"
[[macros]]
id = "m"
actions = [ { print = { message = "trace", debug = true } } ]
"#;
        let mut bridge = TestBridge::new(&tmp, toml, ScriptedHost::default());
        bridge.run("m").unwrap();
        assert!(bridge.printed().is_empty());

        bridge.session.debug = true;
        bridge.run("m").unwrap();
        assert_eq!(bridge.printed(), vec!["trace"]);
    }
}
