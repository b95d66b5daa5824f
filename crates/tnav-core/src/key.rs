//! Frontend-independent keyboard events.
//!
//! The frontend converts its terminal events into [`KeyEvent`]s; the core
//! never sees crossterm types. Key strings used in configuration files
//! (`"ctrl+h"`, `"shift+tab"`, `"enter"`) are parsed with [`KeyEvent::parse`].

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A modifier key reported on its own (key-down without another key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Ctrl,
    Shift,
    Alt,
    Super,
}

/// A single logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Modifier(ModifierKey),
}

/// A key together with the modifiers held while it was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    /// An unmodified key press.
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    /// An unmodified character key press.
    pub const fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    pub const fn with_ctrl(self) -> Self {
        Self { ctrl: true, ..self }
    }

    pub const fn with_shift(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }

    pub const fn with_alt(self) -> Self {
        Self { alt: true, ..self }
    }

    /// The universal cancel combination (Ctrl+C).
    pub fn is_cancel(&self) -> bool {
        self.ctrl && matches!(self.key, Key::Char('c') | Key::Char('C'))
    }

    /// Returns `true` when only a modifier key went down.
    pub fn is_modifier_only(&self) -> bool {
        matches!(self.key, Key::Modifier(_))
    }

    /// Returns the printable character this event types, if any.
    ///
    /// Ctrl- and Alt-modified keys never type text.
    pub fn typed_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.ctrl && !self.alt && !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if `other` (an incoming event) triggers a binding for
    /// `self`.
    ///
    /// Shift is ignored for character keys since the character already
    /// carries it. With `ignore_ctrl` the Ctrl flag is ignored as well, which
    /// is how quick-macro bindings are matched while Ctrl is held.
    pub fn matches(&self, other: &KeyEvent, ignore_ctrl: bool) -> bool {
        let same_key = self.key == other.key;
        let shift_ok = matches!(self.key, Key::Char(_)) || self.shift == other.shift;
        let ctrl_ok = ignore_ctrl || self.ctrl == other.ctrl;
        same_key && shift_ok && ctrl_ok && self.alt == other.alt
    }

    /// Parses a key string such as `"j"`, `"ctrl+h"`, `"shift+tab"`, `"f5"`.
    ///
    /// Modifier names and named keys are case-insensitive; a single
    /// character is taken literally.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidKey(s.to_string());
        if s.is_empty() {
            return Err(invalid());
        }
        // "+" alone (or a trailing "++") binds the plus key itself.
        let (mods, key_part) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None if s == "+" => ("", "+"),
            None => match s.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", s),
            },
        };

        let mut event = KeyEvent::plain(parse_key(key_part).ok_or_else(invalid)?);
        for modifier in mods.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "c" => event.ctrl = true,
                "shift" | "s" => event.shift = true,
                "alt" | "meta" | "option" | "a" | "m" => event.alt = true,
                _ => return Err(invalid()),
            }
        }
        Ok(event)
    }
}

fn parse_key(s: &str) -> Option<Key> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Char(c));
    }
    let key = match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => Key::Enter,
        "esc" | "escape" => Key::Escape,
        "backspace" | "bs" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "tab" => Key::Tab,
        "space" => Key::Char(' '),
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "pgup" => Key::PageUp,
        "pagedown" | "pgdown" | "pgdn" => Key::PageDown,
        "insert" | "ins" => Key::Insert,
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=24).contains(&n) {
                Key::F(n)
            } else {
                return None;
            }
        }
    };
    Some(key)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Enter => write!(f, "enter"),
            Key::Escape => write!(f, "esc"),
            Key::Backspace => write!(f, "backspace"),
            Key::Delete => write!(f, "del"),
            Key::Tab => write!(f, "tab"),
            Key::Up => write!(f, "↑"),
            Key::Down => write!(f, "↓"),
            Key::Left => write!(f, "←"),
            Key::Right => write!(f, "→"),
            Key::Home => write!(f, "home"),
            Key::End => write!(f, "end"),
            Key::PageUp => write!(f, "pgup"),
            Key::PageDown => write!(f, "pgdn"),
            Key::Insert => write!(f, "ins"),
            Key::F(n) => write!(f, "f{n}"),
            Key::Modifier(ModifierKey::Ctrl) => write!(f, "ctrl"),
            Key::Modifier(ModifierKey::Shift) => write!(f, "shift"),
            Key::Modifier(ModifierKey::Alt) => write!(f, "alt"),
            Key::Modifier(ModifierKey::Super) => write!(f, "super"),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift && !matches!(self.key, Key::Char(_)) {
            write!(f, "shift+")?;
        }
        write!(f, "{}", self.key)
    }
}
