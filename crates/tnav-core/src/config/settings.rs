//! Behavioural settings loaded from `config.toml`.
//!
//! Every field has a default, so tnav runs without a config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::nav::list::{AutoNavigation, AutocompleteStyle};

/// Top-level configuration.
///
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    #[serde(default)]
    pub hints: HintsConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// General navigator behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub show_hidden: bool,
    /// `"auto"` resolves `$VISUAL`, then `$EDITOR`.
    #[serde(default = "default_auto")]
    pub editor: String,
    /// `"auto"` resolves `$SHELL`, then the platform shell.
    #[serde(default = "default_auto")]
    pub shell: String,
    #[serde(default)]
    pub debug: bool,
    /// Rows moved by Page Up / Page Down.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Upper bound on a blocking input read before the screen is redrawn.
    #[serde(default = "default_input_timeout_ms")]
    pub input_timeout_ms: u64,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            editor: default_auto(),
            shell: default_auto(),
            debug: false,
            page_size: default_page_size(),
            input_timeout_ms: default_input_timeout_ms(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default)]
    pub style: AutocompleteStyle,
    #[serde(default)]
    pub auto_navigation: AutoNavigation,
}

/// The key hint bar below the entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintsConfig {
    #[serde(default = "default_true")]
    pub show_hints: bool,
    /// Also list actions that are normally kept out of the hint bar.
    #[serde(default)]
    pub show_hidden_hints: bool,
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            show_hints: true,
            show_hidden_hints: false,
        }
    }
}

fn default_auto() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    10
}

fn default_input_timeout_ms() -> u64 {
    250
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}
