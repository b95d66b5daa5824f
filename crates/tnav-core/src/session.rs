//! Per-run context that is not part of the navigation [`State`](crate::nav::state::State).

use std::path::PathBuf;

use crate::shell::Shell;

/// Facts about the running session, exposed to macros as built-in symbols.
#[derive(Debug, Clone)]
pub struct Session {
    /// The process working directory at launch. Exiting here hands off no
    /// target since the parent shell is already there.
    pub working_directory: PathBuf,
    /// The directory the navigator opened first.
    pub starting_directory: PathBuf,
    pub shell: Shell,
    /// Command used to open files, possibly with arguments (`"code -w"`).
    pub editor: String,
    pub debug: bool,
    /// Exit code of the last command or editor run.
    pub exit_code: Option<i32>,
}

impl Session {
    pub fn new(working_directory: PathBuf, starting_directory: PathBuf) -> Self {
        Self {
            working_directory,
            starting_directory,
            shell: Shell::platform_default(),
            editor: default_editor(),
            debug: false,
            exit_code: None,
        }
    }

    pub fn with_shell(self, shell: Shell) -> Self {
        Self { shell, ..self }
    }

    pub fn with_editor(self, editor: String) -> Self {
        Self { editor, ..self }
    }

    pub fn with_debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    /// The editor's program name, without arguments or directories.
    pub fn editor_name(&self) -> &str {
        let program = self.editor.split_whitespace().next().unwrap_or(&self.editor);
        program.rsplit(['/', '\\']).next().unwrap_or(program)
    }
}

/// `$VISUAL`, then `$EDITOR`, then a platform fallback.
pub fn resolve_editor(configured: &str) -> String {
    if !configured.is_empty() && configured != "auto" {
        return configured.to_string();
    }
    default_editor()
}

fn default_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_name_strips_path_and_args() {
        let session = Session::new(PathBuf::from("/"), PathBuf::from("/"))
            .with_editor("/usr/local/bin/code -w".to_string());
        assert_eq!(session.editor_name(), "code");
    }

    #[test]
    fn configured_editor_wins() {
        assert_eq!(resolve_editor("hx"), "hx");
        assert!(!resolve_editor("auto").is_empty());
    }
}
