//! Key binding configuration.
//!
//! `keymap.toml` maps built-in action ids (e.g. `"cursor_down"`) to one key
//! string or a list of them:
//!
//! ```toml
//! [bindings]
//! exit_here = "q"
//! navigate_into = ["enter", "right", "l"]
//! ```
//!
//! Ids come from [`DEFAULT_BINDINGS`]; unknown ids are ignored. A listed id
//! replaces that action's default keys, every other action keeps its
//! defaults. Macro keys live in `macros.toml`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::action::builtin::DEFAULT_BINDINGS;
use crate::error::{CoreError, CoreResult};
use crate::key::KeyEvent;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawKeys {
    One(String),
    Many(Vec<String>),
}

/// Raw TOML representation, deserialized first and then resolved.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawKeymap {
    #[serde(default)]
    bindings: HashMap<String, RawKeys>,
}

/// Keys for every built-in action.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Vec<KeyEvent>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|(id, keys)| {
                let keys = keys
                    .iter()
                    .filter_map(|key| KeyEvent::parse(key).ok())
                    .collect();
                (id.to_string(), keys)
            })
            .collect();
        Self { bindings }
    }
}

impl Keymap {
    /// Loads key bindings from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    /// - [`CoreError::InvalidKey`] if a key string cannot be parsed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        let raw: RawKeymap =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Layers the raw (string-based) bindings over the defaults.
    fn from_raw(raw: RawKeymap) -> CoreResult<Self> {
        let mut keymap = Self::default();
        for (id, keys) in raw.bindings {
            if !keymap.bindings.contains_key(&id) {
                tracing::warn!(action = %id, "ignoring binding for unknown action");
                continue;
            }
            let keys = match keys {
                RawKeys::One(key) => vec![key],
                RawKeys::Many(keys) => keys,
            };
            let parsed = keys
                .iter()
                .map(|key| KeyEvent::parse(key))
                .collect::<CoreResult<Vec<_>>>()?;
            keymap.bindings.insert(id, parsed);
        }
        Ok(keymap)
    }

    /// Keys bound to the action `id`. Empty for unknown ids.
    pub fn keys(&self, id: &str) -> &[KeyEvent] {
        self.bindings.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Display form of the keys bound to `id`, e.g. `"enter/→"`.
    pub fn display(&self, id: &str) -> String {
        self.keys(id)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}
