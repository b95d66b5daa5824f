//! Macro variables and the built-in symbols bound to live state.

use std::collections::BTreeMap;
use std::fmt;

use crate::nav::state::State;
use crate::session::Session;

/// A name a macro can read or assign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MacroSymbol {
    /// A built-in or local variable.
    Generic(String),
    /// A process environment variable, written `env:NAME`.
    Env(String),
}

impl MacroSymbol {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name.strip_prefix("env:") {
            Some(var) => Self::Env(var.to_string()),
            None => Self::Generic(name.to_string()),
        }
    }

    /// The built-in this symbol refers to, if any.
    pub fn builtin(&self) -> Option<BuiltinSymbol> {
        match self {
            Self::Generic(name) => BuiltinSymbol::from_name(name),
            Self::Env(_) => None,
        }
    }
}

impl fmt::Display for MacroSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(name) => f.write_str(name),
            Self::Env(name) => write!(f, "env:{name}"),
        }
    }
}

/// Variables that read from (and some that write to) the running navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSymbol {
    Directory,
    Filter,
    Cursor,
    Command,
    ExitCode,
    EntryName,
    EntryPath,
    EntryType,
    FilteredCount,
    WorkingDirectory,
    StartingDirectory,
    Debug,
    Shell,
}

impl BuiltinSymbol {
    pub const ALL: [Self; 13] = [
        Self::Directory,
        Self::Filter,
        Self::Cursor,
        Self::Command,
        Self::ExitCode,
        Self::EntryName,
        Self::EntryPath,
        Self::EntryType,
        Self::FilteredCount,
        Self::WorkingDirectory,
        Self::StartingDirectory,
        Self::Debug,
        Self::Shell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Filter => "filter",
            Self::Cursor => "cursor",
            Self::Command => "command",
            Self::ExitCode => "exitCode",
            Self::EntryName => "entryName",
            Self::EntryPath => "entryPath",
            Self::EntryType => "entryType",
            Self::FilteredCount => "filteredCount",
            Self::WorkingDirectory => "workingDirectory",
            Self::StartingDirectory => "startingDirectory",
            Self::Debug => "debug",
            Self::Shell => "shell",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Whether assigning this symbol changes the navigator.
    pub fn is_mutable(self) -> bool {
        matches!(
            self,
            Self::Directory | Self::Filter | Self::Cursor | Self::Command | Self::ExitCode
        )
    }

    pub fn depends_on_entry(self) -> bool {
        matches!(self, Self::EntryName | Self::EntryPath | Self::EntryType)
    }

    pub fn depends_on_filter(self) -> bool {
        matches!(self, Self::Filter | Self::FilteredCount)
    }

    /// Current value as a string. Missing values read as `""`.
    pub fn read(self, state: &State, session: &Session) -> String {
        let entry = state.current_entry();
        match self {
            Self::Directory => state.directory().display().to_string(),
            Self::Filter => state.filter().to_string(),
            Self::Cursor => state.cursor().to_string(),
            Self::Command => state.command().unwrap_or_default().to_string(),
            Self::ExitCode => session
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            Self::EntryName => entry.map(|e| e.name().to_string()).unwrap_or_default(),
            Self::EntryPath => entry
                .map(|e| e.path().display().to_string())
                .unwrap_or_default(),
            Self::EntryType => entry
                .map(|e| e.resolved_type().as_str().to_string())
                .unwrap_or_default(),
            Self::FilteredCount => state.entries().filtered_len().to_string(),
            Self::WorkingDirectory => session.working_directory.display().to_string(),
            Self::StartingDirectory => session.starting_directory.display().to_string(),
            Self::Debug => session.debug.to_string(),
            Self::Shell => session.shell.to_string(),
        }
    }
}

/// Resolves a symbol to its current string value.
pub trait SymbolLookup {
    fn lookup(&self, symbol: &MacroSymbol) -> String;
}

/// Resolution over live state plus a set of local variables.
///
/// Order: environment variables, then built-ins, then locals. Unknown names
/// read as `""`.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub state: &'a State,
    pub session: &'a Session,
    pub variables: &'a BTreeMap<String, String>,
}

impl SymbolLookup for Scope<'_> {
    fn lookup(&self, symbol: &MacroSymbol) -> String {
        match symbol {
            MacroSymbol::Env(name) => std::env::var(name).unwrap_or_default(),
            MacroSymbol::Generic(name) => match BuiltinSymbol::from_name(name) {
                Some(builtin) => builtin.read(self.state, self.session),
                None => self.variables.get(name).cloned().unwrap_or_default(),
            },
        }
    }
}

impl SymbolLookup for BTreeMap<String, String> {
    fn lookup(&self, symbol: &MacroSymbol) -> String {
        match symbol {
            MacroSymbol::Env(name) => std::env::var(name).unwrap_or_default(),
            MacroSymbol::Generic(name) => self.get(name).cloned().unwrap_or_default(),
        }
    }
}
