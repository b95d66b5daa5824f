//! tnav: a terminal directory navigator built with ratatui.
//!
//! This binary loads the configuration, initialises the terminal, runs the
//! main event loop and restores the terminal on exit or panic. When the
//! session ends with a target directory it is written to the handoff file
//! for the shell wrapper to `cd` into.

mod host;
mod keys;
mod render;
mod ui;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tnav_core::config::ConfigSet;
use tnav_core::controller::Controller;
use tnav_core::fs::ops::normalize;
use tnav_core::handoff::{clear_handoff, handoff_path, write_handoff};
use tnav_core::nav::state::State;
use tnav_core::session::{resolve_editor, Session};
use tnav_core::shell::Shell;

use crate::host::{enhancement_flags, Term, TuiHost};
use crate::render::View;

const LOG_FILE: &str = "tnav.log";

fn setup_terminal() -> anyhow::Result<(Term, bool)> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(stdout, PushKeyboardEnhancementFlags(enhancement_flags()))?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok((terminal, enhanced))
}

/// Installs a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
        original_hook(panic_info);
    }));
}

/// `$TNAV_CONFIG_DIR`, else the platform config directory.
fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("TNAV_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("", "", "tnav").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Logs go to a file so they never interfere with the terminal. `TNAV_LOG`
/// overrides the level (`EnvFilter` syntax).
fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let Some(dirs) = directories::ProjectDirs::from("", "", "tnav") else {
        return Ok(());
    };
    let log_dir = dirs.cache_dir();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
        .context("opening log file")?;

    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("TNAV_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let configs = match config_dir() {
        Some(dir) => ConfigSet::load(&dir)
            .with_context(|| format!("loading configuration from {}", dir.display()))?,
        None => ConfigSet::default(),
    };
    let general = &configs.config.general;
    let debug = general.debug;
    init_tracing(debug)?;

    let handoff = directories::BaseDirs::new().map(|dirs| handoff_path(dirs.home_dir()));
    if let Some(handoff) = &handoff {
        clear_handoff(handoff)?;
    }

    let working_directory = normalize(&std::env::current_dir().context("reading current directory")?);
    let start = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| working_directory.clone());
    let state = State::new(&start, general.show_hidden)
        .with_context(|| format!("opening {}", start.display()))?;
    let session = Session::new(working_directory, state.directory().to_path_buf())
        .with_shell(Shell::detect(&general.shell))
        .with_editor(resolve_editor(&general.editor))
        .with_debug(debug);
    let poll_timeout = Duration::from_millis(general.input_timeout_ms);
    tracing::info!(directory = %state.directory().display(), shell = %session.shell, "starting");

    install_panic_hook();
    let (terminal, enhanced) = setup_terminal()?;
    let host = TuiHost::new(terminal, configs.theme, poll_timeout, enhanced);
    let mut controller = Controller::new(
        state,
        session,
        configs.config,
        &configs.keymap,
        configs.macros,
        host,
    );

    let result = run_app(&mut controller);
    let restored = controller.host_mut().restore();

    if let Err(e) = session_outcome(result, restored) {
        tracing::error!(error = ?e, "fatal error");
        if debug {
            eprintln!("Error: {e:?}");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }

    let target = controller.exit_request().and_then(|exit| exit.target.as_deref());
    if let (Some(handoff), Some(target)) = (&handoff, target) {
        write_handoff(handoff, target)?;
    }
    tracing::info!(target = ?target, "exiting");
    Ok(())
}

/// Combines the loop result with terminal restoration. A loop error wins;
/// a restore failure next to it is only logged.
fn session_outcome(result: anyhow::Result<()>, restored: io::Result<()>) -> anyhow::Result<()> {
    match (result, restored) {
        (Err(e), Err(restore)) => {
            tracing::warn!(error = %restore, "could not restore terminal");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), restored) => restored.context("restoring terminal"),
    }
}

fn run_app(controller: &mut Controller<TuiHost>) -> anyhow::Result<()> {
    while !controller.is_finished() {
        let view = View::capture(controller);
        controller.host_mut().draw(&view)?;

        let Some(event) = controller.host_mut().next_key()? else {
            continue;
        };
        controller.host_mut().clear_messages();
        controller.handle_event(event)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_terminal() -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
    }

    #[test]
    fn loop_error_survives_a_failed_restore() {
        let failed = Err(anyhow::anyhow!("macro depth exceeded"));
        let outcome = session_outcome(failed, broken_terminal());
        assert_eq!(outcome.unwrap_err().to_string(), "macro depth exceeded");
    }

    #[test]
    fn restore_failure_alone_is_reported() {
        let outcome = session_outcome(Ok(()), broken_terminal());
        let message = format!("{:#}", outcome.unwrap_err());
        assert!(message.starts_with("restoring terminal"));
        assert!(message.contains("terminal gone"));
    }

    #[test]
    fn clean_session_is_ok() {
        assert!(session_outcome(Ok(()), Ok(())).is_ok());
    }
}
