//! tnav core library: UI-agnostic navigator logic.
//!
//! `tnav-core` holds everything except drawing and terminal I/O. A frontend
//! converts its input into [`KeyEvent`]s, implements [`Host`] for
//! processes, prompts and messages, and feeds events to a [`Controller`].
//!
//! # Modules
//!
//! - [`fs`]: entries with lazily fetched metadata, directory listing and mutations.
//! - [`nav`]: the filterable [`ItemList`] and the immutable [`State`].
//! - [`action`]: key-bound actions with priority-based conflict resolution.
//! - [`macros`]: the user macro language and its interpreter.
//! - [`controller`]: event dispatch and effect application.
//! - [`config`]: settings, key bindings, colors and macros from TOML.
//! - [`dialog`]: text and choice prompt models.
//! - [`handoff`]: the file through which the shell wrapper learns the exit directory.
//! - [`error`]: [`CoreError`] and [`CoreResult`].

pub mod action;
pub mod config;
pub mod controller;
pub mod dialog;
pub mod error;
pub mod fs;
pub mod handoff;
pub mod host;
pub mod key;
pub mod macros;
pub mod nav;
pub mod session;
pub mod shell;

pub use action::{Action, ActionCategory, ActionRegistry, ActionStyle, Effect, KeyAction, Trigger};
pub use config::keymap::Keymap;
pub use config::settings::Config;
pub use config::theme::{parse_color, Theme};
pub use config::ConfigSet;
pub use controller::{Controller, ExitRequest, Hint, MenuItem};
pub use dialog::{Dialog, DialogOutcome};
pub use error::{CoreError, CoreResult};
pub use fs::entry::{Entry, EntryType};
pub use handoff::{clear_handoff, handoff_path, write_handoff};
pub use host::{Host, MessageLevel, ProcessOutput, ProcessRequest, Prompt};
pub use key::{Key, KeyEvent, ModifierKey};
pub use macros::{Macro, MacroRegistry};
pub use nav::list::ItemList;
pub use nav::state::{InputMode, State};
pub use session::Session;
pub use shell::Shell;
