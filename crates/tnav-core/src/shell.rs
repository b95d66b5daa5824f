//! Conventions for running a command string through the user's shell.

use std::fmt;

/// A shell that can run a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Sh,
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Pwsh,
    Cmd,
}

impl Shell {
    /// Recognises a shell from a name or path such as `"zsh"`,
    /// `"/usr/bin/fish"` or `"pwsh.exe"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(name)
            .trim_end_matches(".exe")
            .to_ascii_lowercase();
        match base.as_str() {
            "sh" | "dash" | "ash" => Some(Self::Sh),
            "bash" => Some(Self::Bash),
            "zsh" => Some(Self::Zsh),
            "fish" => Some(Self::Fish),
            "powershell" => Some(Self::PowerShell),
            "pwsh" => Some(Self::Pwsh),
            "cmd" => Some(Self::Cmd),
            _ => None,
        }
    }

    /// Picks the shell: the configured one unless it is `"auto"`, then
    /// `$SHELL`, then the platform default.
    pub fn detect(configured: &str) -> Self {
        if configured != "auto" {
            if let Some(shell) = Self::from_name(configured) {
                return shell;
            }
            tracing::warn!(shell = configured, "unknown shell in config, detecting instead");
        }
        std::env::var("SHELL")
            .ok()
            .and_then(|s| Self::from_name(&s))
            .unwrap_or_else(Self::platform_default)
    }

    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Cmd
        } else {
            Self::Sh
        }
    }

    /// The executable to launch.
    pub fn program(self) -> &'static str {
        match self {
            Self::Sh => "sh",
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::PowerShell => "powershell",
            Self::Pwsh => "pwsh",
            Self::Cmd => "cmd",
        }
    }

    /// Arguments that make the shell run `command` and exit.
    pub fn command_args(self, command: &str) -> Vec<String> {
        let flag = match self {
            Self::Sh | Self::Bash | Self::Zsh | Self::Fish => "-c",
            Self::PowerShell | Self::Pwsh => "-Command",
            Self::Cmd => "/C",
        };
        vec![flag.to_string(), command.to_string()]
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_paths_and_exe() {
        assert_eq!(Shell::from_name("/usr/bin/zsh"), Some(Shell::Zsh));
        assert_eq!(Shell::from_name("C:\\Tools\\pwsh.exe"), Some(Shell::Pwsh));
        assert_eq!(Shell::from_name("FISH"), Some(Shell::Fish));
        assert_eq!(Shell::from_name("tcsh"), None);
    }

    #[test]
    fn explicit_config_wins() {
        assert_eq!(Shell::detect("bash"), Shell::Bash);
    }

    #[test]
    fn command_args_follow_shell_convention() {
        assert_eq!(Shell::Sh.command_args("ls -la"), vec!["-c", "ls -la"]);
        assert_eq!(Shell::Pwsh.command_args("dir"), vec!["-Command", "dir"]);
        assert_eq!(Shell::Cmd.command_args("dir"), vec!["/C", "dir"]);
    }

    #[test]
    fn display_is_program_name() {
        assert_eq!(Shell::PowerShell.to_string(), "powershell");
    }
}
