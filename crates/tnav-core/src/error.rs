//! Error types for `tnav-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::{Path, PathBuf};

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to something else.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A file or directory with that name is already present.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// A file or directory name is invalid (empty, contains path separators, etc.).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Failed to parse or validate a configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A key binding string could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A regular expression in a macro failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    /// A macro referenced an id that no loaded macro carries.
    #[error("unknown macro: {0}")]
    UnknownMacro(String),

    /// Two macros were loaded with the same id.
    #[error("duplicate macro id: {0}")]
    DuplicateMacro(String),

    /// A `set` action assigns a variable whose value reads another
    /// variable assigned in the same action.
    #[error("circular dependency: `{variable}` depends on `{dependency}` in the same set")]
    CircularDependency {
        /// The variable being assigned.
        variable: String,
        /// The variable it reads that is assigned alongside it.
        dependency: String,
    },

    /// Macro calls nested deeper than the interpreter allows.
    #[error("macro call depth exceeded ({0})")]
    MacroDepth(usize),

    /// An external process could not be started.
    #[error("process error: {0}")]
    Process(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Returns `true` for I/O-class errors that the dispatch boundary
    /// reports inline and recovers from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::PermissionDenied(_)
                | Self::NotADirectory(_)
                | Self::AlreadyExists(_)
                | Self::InvalidName(_)
                | Self::Process(_)
                | Self::Io(_)
        )
    }

    /// Maps an `std::io::Error` raised while touching `path` to the most
    /// specific variant.
    pub fn from_io(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}

/// Convenience alias used throughout `tnav-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "path not found: /missing/file");
    }

    #[test]
    fn permission_denied_displays_path() {
        let err = CoreError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "permission denied: /secret");
    }

    #[test]
    fn circular_dependency_names_both_variables() {
        let err = CoreError::CircularDependency {
            variable: "a".to_string(),
            dependency: "b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "circular dependency: `a` depends on `b` in the same set"
        );
    }

    #[test]
    fn unknown_macro_displays_id() {
        let err = CoreError::UnknownMacro("build".to_string());
        assert_eq!(err.to_string(), "unknown macro: build");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "gone");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("gone"));
    }

    #[test]
    fn from_io_maps_kind_to_variant() {
        let path = Path::new("/x");
        let err = CoreError::from_io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no"),
            path,
        );
        assert!(matches!(err, CoreError::PermissionDenied(_)));

        let err = CoreError::from_io(std::io::Error::new(std::io::ErrorKind::NotFound, "no"), path);
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn io_class_errors_are_recoverable() {
        assert!(CoreError::PermissionDenied(PathBuf::from("/x")).is_recoverable());
        assert!(CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x")).is_recoverable());
        assert!(CoreError::Process("spawn failed".to_string()).is_recoverable());
    }

    #[test]
    fn interpreter_errors_are_fatal() {
        assert!(!CoreError::UnknownMacro("x".to_string()).is_recoverable());
        assert!(!CoreError::MacroDepth(64).is_recoverable());
        assert!(!CoreError::ConfigParse("bad".to_string()).is_recoverable());
    }
}
