//! Conversion from crossterm key events to core [`KeyEvent`]s.

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tnav_core::key::{Key, KeyEvent, ModifierKey};

/// Converts a crossterm key event. Releases and keys the core has no name
/// for yield `None`.
pub fn convert(event: &crossterm::event::KeyEvent) -> Option<KeyEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let mut shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let chorded = event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    let key = match event.code {
        KeyCode::Char(c) if shift && !chorded => Key::Char(shifted(c)),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            shift = true;
            Key::Tab
        }
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Insert => Key::Insert,
        KeyCode::F(n) => Key::F(n),
        KeyCode::Modifier(code) => Key::Modifier(modifier(code)?),
        _ => return None,
    };
    Some(KeyEvent {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL)
            || key == Key::Modifier(ModifierKey::Ctrl),
        shift,
        alt: event.modifiers.contains(KeyModifiers::ALT),
    })
}

/// The character Shift turns `c` into.
///
/// Terminals speaking the kitty keyboard protocol may report the base key
/// plus SHIFT when they send no alternate key. Letters follow Unicode case
/// mapping; other keys assume a US layout. Already shifted characters are
/// returned unchanged.
fn shifted(c: char) -> char {
    if c.is_lowercase() {
        let mut upper = c.to_uppercase();
        return match (upper.next(), upper.next()) {
            (Some(u), None) => u,
            _ => c,
        };
    }
    match c {
        '`' => '~',
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        other => other,
    }
}

fn modifier(code: ModifierKeyCode) -> Option<ModifierKey> {
    match code {
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some(ModifierKey::Ctrl),
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some(ModifierKey::Shift),
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => Some(ModifierKey::Alt),
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta
        | ModifierKeyCode::LeftHyper
        | ModifierKeyCode::RightHyper => Some(ModifierKey::Super),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use tempfile::TempDir;
    use tnav_core::action::{ActionCategory, ActionEnv, ActionRegistry};
    use tnav_core::config::keymap::Keymap;
    use tnav_core::config::settings::Config;
    use tnav_core::macros::MacroRegistry;
    use tnav_core::nav::state::State;
    use tnav_core::session::Session;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> crossterm::event::KeyEvent {
        crossterm::event::KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_keys() {
        assert_eq!(
            convert(&press(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(KeyEvent::char('a'))
        );
        assert_eq!(
            convert(&press(KeyCode::Esc, KeyModifiers::NONE)),
            Some(KeyEvent::plain(Key::Escape))
        );
        assert_eq!(
            convert(&press(KeyCode::F(5), KeyModifiers::NONE)),
            Some(KeyEvent::plain(Key::F(5)))
        );
    }

    #[test]
    fn modifiers_carry_over() {
        let event = convert(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(event.is_cancel());

        let event = convert(&press(KeyCode::Char('h'), KeyModifiers::ALT)).unwrap();
        assert_eq!(event, KeyEvent::char('h').with_alt());
    }

    #[test]
    fn shifted_base_keys_become_shifted_characters() {
        let colon = convert(&press(KeyCode::Char(';'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(colon.typed_char(), Some(':'));
        let upper = convert(&press(KeyCode::Char('a'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(upper.typed_char(), Some('A'));
        let pipe = convert(&press(KeyCode::Char('\\'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(pipe.typed_char(), Some('|'));
    }

    #[test]
    fn already_shifted_characters_are_kept() {
        let colon = convert(&press(KeyCode::Char(':'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(colon.typed_char(), Some(':'));
        let upper = convert(&press(KeyCode::Char('A'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(upper.typed_char(), Some('A'));
    }

    #[test]
    fn chorded_characters_keep_their_base_key() {
        let event = convert(&press(
            KeyCode::Char('e'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ))
        .unwrap();
        assert_eq!(event.key, Key::Char('e'));
        assert!(event.ctrl && event.shift);
    }

    #[test]
    fn shifted_semicolon_starts_a_command() {
        let tmp = TempDir::new().unwrap();
        let state = State::new(tmp.path(), false).unwrap();
        let session = Session::new(tmp.path().to_path_buf(), tmp.path().to_path_buf());
        let config = Config::default();
        let registry = ActionRegistry::builtin(&Keymap::default(), &MacroRegistry::default());
        let env = ActionEnv::new(&state, &session, &config);

        let event = convert(&press(KeyCode::Char(';'), KeyModifiers::SHIFT)).unwrap();
        let fired = registry
            .find(ActionCategory::Normal, &event, &env)
            .map(|a| a.action().id().to_string());
        assert_eq!(fired.as_deref(), Some("start_command"));
    }

    #[test]
    fn back_tab_is_shift_tab() {
        assert_eq!(
            convert(&press(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(KeyEvent::plain(Key::Tab).with_shift())
        );
    }

    #[test]
    fn lone_ctrl_press_sets_ctrl() {
        let event = convert(&press(
            KeyCode::Modifier(ModifierKeyCode::LeftControl),
            KeyModifiers::NONE,
        ))
        .unwrap();
        assert!(event.ctrl);
        assert!(event.is_modifier_only());
    }

    #[test]
    fn releases_and_unknown_keys_are_dropped() {
        let release = crossterm::event::KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(convert(&release), None);
        assert_eq!(convert(&press(KeyCode::CapsLock, KeyModifiers::NONE)), None);
    }
}
