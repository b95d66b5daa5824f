//! Configuration management for tnav.
//!
//! Settings ([`settings::Config`]), key bindings ([`keymap::Keymap`]),
//! colors ([`theme::Theme`]) and macros are separate TOML files in one
//! directory. Each file is optional.

pub mod keymap;
pub mod settings;
pub mod theme;

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::macros::MacroRegistry;

pub const CONFIG_FILE: &str = "config.toml";
pub const KEYMAP_FILE: &str = "keymap.toml";
pub const THEME_FILE: &str = "theme.toml";
pub const MACROS_FILE: &str = "macros.toml";

/// Turns a [`CoreError::NotFound`] from a loader into the default value.
pub fn or_default<T: Default>(result: CoreResult<T>) -> CoreResult<T> {
    match result {
        Err(CoreError::NotFound(path)) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(T::default())
        }
        other => other,
    }
}

/// Everything loaded from the config directory.
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    pub config: settings::Config,
    pub keymap: keymap::Keymap,
    pub theme: theme::Theme,
    pub macros: MacroRegistry,
}

impl ConfigSet {
    /// Loads every file in `dir`, falling back to defaults for missing ones.
    ///
    /// # Errors
    ///
    /// The first malformed or unreadable file.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        Ok(Self {
            config: or_default(settings::Config::load(&dir.join(CONFIG_FILE)))?,
            keymap: or_default(keymap::Keymap::load(&dir.join(KEYMAP_FILE)))?,
            theme: or_default(theme::Theme::load(&dir.join(THEME_FILE)))?,
            macros: MacroRegistry::load(&dir.join(MACROS_FILE))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn empty_directory_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let set = ConfigSet::load(tmp.path()).unwrap();
        assert_eq!(set.config.general.page_size, 10);
        assert!(set.macros.is_empty());
        assert!(!set.keymap.keys("refresh").is_empty());
    }

    #[test]
    fn files_are_picked_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[general]\ndebug = true\n").unwrap();
        fs::write(
            tmp.path().join(MACROS_FILE),
            "[[macros]]\nid = \"hello\"\ndescription = \"Hello\"\nactions = [{ print = { message = \"hi\" } }]\n",
        )
        .unwrap();

        let set = ConfigSet::load(tmp.path()).unwrap();
        assert!(set.config.general.debug);
        assert!(set.macros.find("hello").is_some());
    }

    #[test]
    fn malformed_file_fails_fast() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(THEME_FILE), "not = [valid").unwrap();
        assert!(matches!(
            ConfigSet::load(tmp.path()).unwrap_err(),
            CoreError::ConfigParse(_)
        ));
    }

    #[test]
    fn or_default_only_swallows_not_found() {
        let missing: CoreResult<u32> = Err(CoreError::NotFound(PathBuf::from("/x")));
        assert_eq!(or_default(missing).unwrap(), 0);

        let denied: CoreResult<u32> = Err(CoreError::PermissionDenied(PathBuf::from("/x")));
        assert!(or_default(denied).is_err());
    }
}
