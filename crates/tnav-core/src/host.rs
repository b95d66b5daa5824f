//! Side-effect capabilities the engine borrows from its frontend.
//!
//! The core never spawns processes or draws dialogs itself. The frontend
//! implements [`Host`]; tests use a scripted implementation.

use std::path::PathBuf;

use crate::error::CoreResult;
use crate::shell::Shell;

/// An external process to run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Capture stdout/stderr instead of handing the terminal to the child.
    pub capture: bool,
}

impl ProcessRequest {
    /// Runs `command` through `shell`.
    pub fn shell(shell: Shell, command: &str, working_dir: PathBuf, capture: bool) -> Self {
        Self {
            program: shell.program().to_string(),
            args: shell.command_args(command),
            working_dir,
            capture,
        }
    }

    /// Opens `file` with `editor`, which may carry its own arguments.
    pub fn editor(editor: &str, file: PathBuf, working_dir: PathBuf) -> Self {
        let mut parts = editor.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| editor.to_string());
        let mut args: Vec<String> = parts.collect();
        args.push(file.to_string_lossy().into_owned());
        Self {
            program,
            args,
            working_dir,
            capture: false,
        }
    }
}

/// What a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    /// Empty unless the request asked for capture.
    pub stdout: String,
    pub stderr: String,
}

/// A modal question for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text { message: String, default: String },
    Choice { message: String, choices: Vec<String> },
}

/// Severity/style of a message shown below the entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    #[default]
    Plain,
    Info,
    Success,
    Warning,
    Error,
}

/// Frontend capabilities used by actions and macros.
pub trait Host {
    /// Runs a process and blocks until it exits.
    ///
    /// # Errors
    ///
    /// [`CoreError::Process`](crate::CoreError::Process) if it cannot be
    /// started.
    fn run_process(&mut self, request: &ProcessRequest) -> CoreResult<ProcessOutput>;

    /// Shows a modal prompt. `Ok(None)` means the user cancelled.
    fn prompt(&mut self, prompt: &Prompt) -> CoreResult<Option<String>>;

    /// Queues a message for display.
    fn message(&mut self, level: MessageLevel, text: &str);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_request_uses_shell_convention() {
        let req = ProcessRequest::shell(Shell::Bash, "make test", PathBuf::from("/src"), true);
        assert_eq!(req.program, "bash");
        assert_eq!(req.args, vec!["-c", "make test"]);
        assert!(req.capture);
    }

    #[test]
    fn editor_request_splits_arguments() {
        let req = ProcessRequest::editor("code -w", PathBuf::from("/a/b.txt"), PathBuf::from("/a"));
        assert_eq!(req.program, "code");
        assert_eq!(req.args, vec!["-w", "/a/b.txt"]);
        assert!(!req.capture);
    }
}
