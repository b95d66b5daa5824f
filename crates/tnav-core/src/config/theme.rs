//! Colors loaded from `theme.toml`.
//!
//! Colors are stored as strings (e.g. `"blue"`, `"#ff5500"`) and converted
//! to [`ratatui::style::Color`] at render time via [`parse_color`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::host::MessageLevel;

/// Complete theme with per-component color groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub entries: EntriesTheme,
    #[serde(default)]
    pub title: TitleTheme,
    #[serde(default)]
    pub hints: HintsTheme,
    #[serde(default)]
    pub menu: MenuTheme,
    #[serde(default)]
    pub messages: MessagesTheme,
    #[serde(default)]
    pub dialog: DialogTheme,
}

impl Theme {
    /// Loads a theme from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`](crate::config::settings::Config::load).
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Entry list colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntriesTheme {
    pub dir_fg: String,
    pub file_fg: String,
    pub symlink_fg: String,
    pub hidden_fg: String,
    pub error_fg: String,
    pub cursor_bg: String,
    pub details_fg: String,
}

impl Default for EntriesTheme {
    fn default() -> Self {
        Self {
            dir_fg: "blue".to_string(),
            file_fg: "reset".to_string(),
            symlink_fg: "cyan".to_string(),
            hidden_fg: "dark_gray".to_string(),
            error_fg: "red".to_string(),
            cursor_bg: "dark_gray".to_string(),
            details_fg: "gray".to_string(),
        }
    }
}

/// Title line: current directory, filter and command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleTheme {
    pub directory_fg: String,
    pub filter_fg: String,
    pub command_fg: String,
    pub debug_fg: String,
}

impl Default for TitleTheme {
    fn default() -> Self {
        Self {
            directory_fg: "light_blue".to_string(),
            filter_fg: "yellow".to_string(),
            command_fg: "green".to_string(),
            debug_fg: "dark_gray".to_string(),
        }
    }
}

/// Key hint bar. Actions whose text depends on the selected entry or the
/// filter get their own color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HintsTheme {
    pub key_fg: String,
    pub description_fg: String,
    pub entry_fg: String,
    pub filter_fg: String,
    pub danger_fg: String,
}

impl Default for HintsTheme {
    fn default() -> Self {
        Self {
            key_fg: "white".to_string(),
            description_fg: "gray".to_string(),
            entry_fg: "cyan".to_string(),
            filter_fg: "yellow".to_string(),
            danger_fg: "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuTheme {
    pub border_fg: String,
    pub item_fg: String,
    pub selected_fg: String,
    pub selected_bg: String,
}

impl Default for MenuTheme {
    fn default() -> Self {
        Self {
            border_fg: "dark_gray".to_string(),
            item_fg: "white".to_string(),
            selected_fg: "black".to_string(),
            selected_bg: "cyan".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesTheme {
    pub plain_fg: String,
    pub info_fg: String,
    pub success_fg: String,
    pub warning_fg: String,
    pub error_fg: String,
}

impl MessagesTheme {
    /// The color string for a message of `level`.
    pub fn color_for(&self, level: MessageLevel) -> &str {
        match level {
            MessageLevel::Plain => &self.plain_fg,
            MessageLevel::Info => &self.info_fg,
            MessageLevel::Success => &self.success_fg,
            MessageLevel::Warning => &self.warning_fg,
            MessageLevel::Error => &self.error_fg,
        }
    }
}

impl Default for MessagesTheme {
    fn default() -> Self {
        Self {
            plain_fg: "reset".to_string(),
            info_fg: "light_blue".to_string(),
            success_fg: "green".to_string(),
            warning_fg: "yellow".to_string(),
            error_fg: "red".to_string(),
        }
    }
}

/// Prompt and choice dialogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogTheme {
    pub border_fg: String,
    pub title_fg: String,
    pub input_fg: String,
    pub selected_fg: String,
}

impl Default for DialogTheme {
    fn default() -> Self {
        Self {
            border_fg: "cyan".to_string(),
            title_fg: "white".to_string(),
            input_fg: "yellow".to_string(),
            selected_fg: "cyan".to_string(),
        }
    }
}

/// Parses a color string into a [`ratatui::style::Color`].
///
/// Named colors are case-insensitive; `#rrggbb` gives an RGB color.
/// Anything else falls back to [`Color::Reset`](ratatui::style::Color::Reset).
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
        "light_red" | "lightred" => Color::LightRed,
        "light_green" | "lightgreen" => Color::LightGreen,
        "light_yellow" | "lightyellow" => Color::LightYellow,
        "light_blue" | "lightblue" => Color::LightBlue,
        "light_magenta" | "lightmagenta" => Color::LightMagenta,
        "light_cyan" | "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" => Color::Reset,
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let channel = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
            Color::Rgb(channel(1..3), channel(3..5), channel(5..7))
        }
        _ => Color::Reset,
    }
}
