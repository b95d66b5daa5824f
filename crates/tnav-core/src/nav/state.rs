//! The navigator's immutable application state.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::Entry;
use crate::fs::ops::{is_directory, list_directory, normalize};
use crate::key::KeyEvent;
use crate::nav::list::ItemList;

/// Which family of key bindings is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Entered while Ctrl is held; exposes single-key macro shortcuts.
    QuickMacro,
}

/// A snapshot of where the user is and what they are looking at.
///
/// Every transition returns a new `State`; the controller swaps the whole
/// value after each accepted action. Fallible transitions (those that list
/// a directory) borrow `self` so a failure leaves the old state usable.
#[derive(Debug, Clone)]
pub struct State {
    directory: PathBuf,
    entries: ItemList<Entry>,
    show_hidden: bool,
    menu_cursor: Option<usize>,
    command: Option<String>,
    input_mode: InputMode,
    last_event: Option<KeyEvent>,
}

fn hidden_hook(show_hidden: bool) -> Option<fn(&Entry) -> bool> {
    if show_hidden {
        None
    } else {
        Some(Entry::is_hidden)
    }
}

impl State {
    /// Lists `directory` and puts the cursor on its first entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotADirectory`] if `directory` is not a directory,
    /// or any error from listing it.
    pub fn new(directory: &Path, show_hidden: bool) -> CoreResult<Self> {
        let directory = normalize(directory);
        if !is_directory(&directory) {
            return Err(CoreError::NotADirectory(directory));
        }
        let entries =
            ItemList::new(list_directory(&directory)?).hiding_unfiltered(hidden_hook(show_hidden));
        Ok(Self {
            directory,
            entries,
            show_hidden,
            menu_cursor: None,
            command: None,
            input_mode: InputMode::Normal,
            last_event: None,
        })
    }

    // --- accessors ---

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn entries(&self) -> &ItemList<Entry> {
        &self.entries
    }

    /// The entry under the cursor.
    pub fn current_entry(&self) -> Option<&Entry> {
        self.entries.current()
    }

    pub fn cursor(&self) -> usize {
        self.entries.cursor()
    }

    pub fn filter(&self) -> &str {
        self.entries.filter()
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn menu_cursor(&self) -> Option<usize> {
        self.menu_cursor
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_cursor.is_some()
    }

    /// The shell command being typed, if command-line mode is active.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn last_event(&self) -> Option<&KeyEvent> {
        self.last_event.as_ref()
    }

    pub fn has_parent(&self) -> bool {
        self.directory.parent().is_some()
    }

    // --- navigation ---

    /// Moves to `path`.
    ///
    /// No-op when `path` is `None`, the current directory, or not a
    /// directory. When `path` is an ancestor, the cursor lands on the child
    /// leading back to where we came from. The filter is always cleared.
    pub fn navigate_to(&self, path: Option<&Path>) -> CoreResult<Self> {
        let Some(path) = path else {
            return Ok(self.clone());
        };
        let target = normalize(path);
        if target == self.directory || !is_directory(&target) {
            return Ok(self.clone());
        }

        let list = ItemList::new(list_directory(&target)?)
            .hiding_unfiltered(hidden_hook(self.show_hidden));
        let list = match nearest_child(&target, &self.directory) {
            Some(child) => list.with_cursor_on_first(0, |entry| entry.path() == child),
            None => list,
        };

        tracing::info!(from = %self.directory.display(), to = %target.display(), "navigated");
        Ok(Self {
            directory: target,
            entries: list,
            ..self.clone()
        })
    }

    /// Moves to the parent directory, if any.
    pub fn navigated_up(&self) -> CoreResult<Self> {
        self.navigate_to(self.directory.parent())
    }

    /// Re-lists the current directory, keeping the filter.
    ///
    /// The cursor moves to the first entry matching `preferred`, or by
    /// default to the entry with the same name as the one selected before.
    pub fn updated_entries(&self, preferred: Option<&dyn Fn(&Entry) -> bool>) -> CoreResult<Self> {
        let items = list_directory(&self.directory)?;
        let previous_name = self.current_entry().map(|e| e.name().to_string());
        let cursor = self.cursor();
        let list = self.entries.clone().with_items(items);

        let list = match preferred {
            Some(predicate) => list.with_cursor_on_first(cursor, predicate),
            None => list.with_cursor_on_first(cursor, |entry| {
                previous_name.as_deref() == Some(entry.name())
            }),
        };
        Ok(Self {
            entries: list,
            ..self.clone()
        })
    }

    // --- simple transitions ---

    pub fn with_entries(self, entries: ItemList<Entry>) -> Self {
        Self { entries, ..self }
    }

    pub fn with_filter(self, filter: &str) -> Self {
        Self {
            entries: self.entries.with_filter(filter),
            ..self
        }
    }

    pub fn with_cursor_shifted(self, offset: isize) -> Self {
        Self {
            entries: self.entries.with_cursor_shifted(offset),
            ..self
        }
    }

    pub fn with_cursor_coerced(self, index: usize) -> Self {
        Self {
            entries: self.entries.with_cursor_coerced(index),
            ..self
        }
    }

    /// Shows or hides dotfiles while no filter is active.
    pub fn with_show_hidden(self, show_hidden: bool) -> Self {
        Self {
            entries: self.entries.hiding_unfiltered(hidden_hook(show_hidden)),
            show_hidden,
            ..self
        }
    }

    pub fn with_command(self, command: Option<String>) -> Self {
        Self { command, ..self }
    }

    pub fn with_input_mode(self, input_mode: InputMode) -> Self {
        Self { input_mode, ..self }
    }

    pub fn with_last_event(self, event: KeyEvent) -> Self {
        Self {
            last_event: Some(event),
            ..self
        }
    }

    pub fn with_menu_opened(self) -> Self {
        Self {
            menu_cursor: Some(0),
            ..self
        }
    }

    pub fn with_menu_closed(self) -> Self {
        Self {
            menu_cursor: None,
            ..self
        }
    }

    /// Clamps the open menu's cursor to `len` available items.
    pub fn with_menu_cursor_coerced(self, len: usize) -> Self {
        let menu_cursor = self
            .menu_cursor
            .map(|cursor| cursor.min(len.saturating_sub(1)));
        Self {
            menu_cursor,
            ..self
        }
    }

    /// Moves the open menu's cursor by `offset`, wrapping within `len` items.
    pub fn with_menu_cursor_shifted(self, offset: isize, len: usize) -> Self {
        let menu_cursor = match (self.menu_cursor, len) {
            (None, _) => None,
            (Some(_), 0) => Some(0),
            (Some(cursor), len) => Some((cursor as isize + offset).rem_euclid(len as isize) as usize),
        };
        Self {
            menu_cursor,
            ..self
        }
    }
}

/// The immediate child of `ancestor` on the way down to `descendant`.
fn nearest_child(ancestor: &Path, descendant: &Path) -> Option<PathBuf> {
    let rest = descendant.strip_prefix(ancestor).ok()?;
    let first = rest.components().next()?;
    Some(ancestor.join(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("alpha")).unwrap();
        fs::create_dir(tmp.path().join("beta")).unwrap();
        fs::create_dir(tmp.path().join("gamma")).unwrap();
        fs::create_dir(tmp.path().join(".hidden")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "x".repeat(1200)).unwrap();
        tmp
    }

    fn names(state: &State) -> Vec<String> {
        state
            .entries()
            .filtered()
            .map(|e| e.name().to_string())
            .collect()
    }

    #[test]
    fn new_lists_directories_first() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap();
        assert_eq!(names(&state), vec!["alpha", "beta", "gamma", "notes.txt"]);
        assert_eq!(state.cursor(), 0);
        assert!(!state.is_menu_open());
        assert!(state.command().is_none());
    }

    #[test]
    fn new_rejects_files() {
        let tmp = fixture();
        let result = State::new(&tmp.path().join("notes.txt"), false);
        assert!(matches!(result, Err(CoreError::NotADirectory(_))));
    }

    #[test]
    fn show_hidden_reveals_dotfiles() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap().with_show_hidden(true);
        assert_eq!(
            names(&state),
            vec![".hidden", "alpha", "beta", "gamma", "notes.txt"]
        );
    }

    #[test]
    fn navigate_to_none_or_file_is_noop() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap().with_cursor_coerced(2);

        let same = state.navigate_to(None).unwrap();
        assert_eq!(same.directory(), state.directory());
        assert_eq!(same.cursor(), 2);

        let same = state
            .navigate_to(Some(&tmp.path().join("notes.txt")))
            .unwrap();
        assert_eq!(same.directory(), state.directory());
    }

    #[test]
    fn navigate_into_child_resets_cursor_and_filter() {
        let tmp = fixture();
        fs::write(tmp.path().join("beta").join("inner.txt"), "").unwrap();
        let state = State::new(tmp.path(), false).unwrap().with_filter("bet");

        let state = state
            .navigate_to(Some(&tmp.path().join("beta")))
            .unwrap();
        assert!(state.directory().ends_with("beta"));
        assert_eq!(state.filter(), "");
        assert_eq!(state.cursor(), 0);
        assert_eq!(names(&state), vec!["inner.txt"]);
    }

    #[test]
    fn navigate_round_trip_selects_previous_child() {
        let tmp = fixture();
        let start = State::new(tmp.path(), false).unwrap();

        let inside = start
            .navigate_to(Some(&tmp.path().join("gamma")))
            .unwrap();
        let back = inside.navigated_up().unwrap();

        assert_eq!(back.directory(), start.directory());
        assert_eq!(back.current_entry().unwrap().name(), "gamma");
    }

    #[test]
    fn navigate_to_distant_ancestor_selects_nearest_child() {
        let tmp = fixture();
        let deep = tmp.path().join("beta").join("x").join("y");
        fs::create_dir_all(&deep).unwrap();

        let state = State::new(&deep, false).unwrap();
        let state = state.navigate_to(Some(tmp.path())).unwrap();
        assert_eq!(state.current_entry().unwrap().name(), "beta");
    }

    #[test]
    fn updated_entries_keeps_selection_by_name() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap().with_cursor_coerced(1);
        assert_eq!(state.current_entry().unwrap().name(), "beta");

        fs::create_dir(tmp.path().join("aardvark")).unwrap();
        let state = state.updated_entries(None).unwrap();
        assert_eq!(state.current_entry().unwrap().name(), "beta");
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn updated_entries_prefers_predicate() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap();
        fs::write(tmp.path().join("new.txt"), "").unwrap();

        let state = state
            .updated_entries(Some(&|e: &Entry| e.name() == "new.txt"))
            .unwrap();
        assert_eq!(state.current_entry().unwrap().name(), "new.txt");
    }

    #[test]
    fn cursor_stays_in_range_after_transitions() {
        let tmp = fixture();
        let mut state = State::new(tmp.path(), false).unwrap();
        for step in [5isize, -7, 3, 11] {
            state = state.with_cursor_shifted(step);
            assert!(state.cursor() < state.entries().filtered_len());
        }
        let state = state.with_filter("zzz");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn menu_cursor_wraps_and_clamps() {
        let tmp = fixture();
        let state = State::new(tmp.path(), false).unwrap();
        assert_eq!(state.clone().with_menu_cursor_shifted(1, 3).menu_cursor(), None);

        let state = state.with_menu_opened().with_menu_cursor_shifted(-1, 3);
        assert_eq!(state.menu_cursor(), Some(2));
        let state = state.with_menu_cursor_coerced(2);
        assert_eq!(state.menu_cursor(), Some(1));
        assert!(state.with_menu_closed().menu_cursor().is_none());
    }

    #[test]
    fn filter_example_from_home_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Documents")).unwrap();
        fs::write(tmp.path().join("notes.txt"), "x".repeat(1200)).unwrap();

        let state = State::new(tmp.path(), false).unwrap();
        assert_eq!(state.current_entry().unwrap().name(), "Documents");

        let state = state.with_filter("no");
        assert_eq!(names(&state), vec!["notes.txt"]);
        assert_eq!(state.cursor(), 0);
    }
}
