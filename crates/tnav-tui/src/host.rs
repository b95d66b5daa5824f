//! The terminal implementation of [`Host`].
//!
//! Owns the ratatui terminal. Prompts run a nested blocking input loop on
//! top of the last drawn frame; foreground processes get the real terminal
//! while the UI is suspended.

use std::io::{self, Stdout};
use std::process::Command;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, Terminal};
use tnav_core::config::theme::Theme;
use tnav_core::dialog::{Dialog, DialogOutcome};
use tnav_core::error::{CoreError, CoreResult};
use tnav_core::host::{Host, MessageLevel, ProcessOutput, ProcessRequest, Prompt};
use tnav_core::key::KeyEvent;

use crate::keys;
use crate::render::{render, render_dialog_over, View};

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Keyboard flags that make lone modifier presses visible. Alternate keys
/// let the terminal report Shift+key as the shifted character.
pub fn enhancement_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
}

pub struct TuiHost {
    terminal: Term,
    theme: Theme,
    poll_timeout: Duration,
    keyboard_enhanced: bool,
    messages: Vec<(MessageLevel, String)>,
    backdrop: Option<Buffer>,
}

impl TuiHost {
    pub fn new(terminal: Term, theme: Theme, poll_timeout: Duration, keyboard_enhanced: bool) -> Self {
        Self {
            terminal,
            theme,
            poll_timeout,
            keyboard_enhanced,
            messages: Vec::new(),
            backdrop: None,
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Draws the main screen and remembers it as the backdrop for dialogs.
    pub fn draw(&mut self, view: &View) -> io::Result<()> {
        let theme = &self.theme;
        let messages = &self.messages;
        let frame = self.terminal.draw(|f| render(f, view, messages, theme))?;
        self.backdrop = Some(frame.buffer.clone());
        Ok(())
    }

    /// Waits up to the poll timeout for a key. `None` on timeout and for
    /// events that are not keys.
    pub fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }
        Ok(match event::read()? {
            Event::Key(key) => keys::convert(&key),
            _ => None,
        })
    }

    /// Gives the terminal back to the shell.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }

    fn resume(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        enable_raw_mode()?;
        if self.keyboard_enhanced {
            execute!(
                self.terminal.backend_mut(),
                PushKeyboardEnhancementFlags(enhancement_flags())
            )?;
        }
        self.terminal.hide_cursor()?;
        self.terminal.clear()
    }
}

fn launch_error(program: &str, err: io::Error) -> CoreError {
    CoreError::Process(format!("failed to launch {program}: {err}"))
}

impl Host for TuiHost {
    fn run_process(&mut self, request: &ProcessRequest) -> CoreResult<ProcessOutput> {
        let mut command = Command::new(&request.program);
        command.args(&request.args).current_dir(&request.working_dir);
        tracing::debug!(program = %request.program, args = ?request.args, capture = request.capture, "spawning");

        if request.capture {
            let output = command
                .output()
                .map_err(|e| launch_error(&request.program, e))?;
            return Ok(ProcessOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        self.restore()?;
        let status = command.status();
        self.resume()?;
        let status = status.map_err(|e| launch_error(&request.program, e))?;
        Ok(ProcessOutput {
            exit_code: status.code().unwrap_or(-1),
            ..ProcessOutput::default()
        })
    }

    fn prompt(&mut self, prompt: &Prompt) -> CoreResult<Option<String>> {
        let mut dialog = Dialog::from_prompt(prompt);
        loop {
            let theme = &self.theme;
            let backdrop = self.backdrop.as_ref();
            self.terminal
                .draw(|f| render_dialog_over(f, backdrop, &dialog, theme))?;

            let Some(event) = self.next_key()? else {
                continue;
            };
            dialog = match dialog.handle(&event) {
                DialogOutcome::Pending(dialog) => dialog,
                DialogOutcome::Submitted(value) => return Ok(Some(value)),
                DialogOutcome::Cancelled => return Ok(None),
            };
        }
    }

    fn message(&mut self, level: MessageLevel, text: &str) {
        self.messages.push((level, text.to_string()));
    }
}
