//! Filtering and cursor movement over any list of nameable items.
//!
//! [`ItemList`] is shared by the entry browser and by choice dialogs. All
//! transitions consume `self` and return a new list; the filtered view is
//! always recomputed from the unfiltered items and the filter string.

/// An item that can be matched against a filter string.
pub trait Filterable {
    /// The text the filter is matched against (usually a display name).
    fn filter_key(&self) -> &str;
}

impl Filterable for String {
    fn filter_key(&self) -> &str {
        self
    }
}

/// How repeated autocompletion moves the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocompleteStyle {
    /// Jump to the first match of the completed prefix and stay there.
    #[default]
    CommonPrefixStop,
    /// Like `CommonPrefixStop`, but cycle through the matches once the
    /// prefix can no longer grow.
    CommonPrefixCycle,
}

/// When autocompletion navigates into a single remaining match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoNavigation {
    Never,
    /// As soon as exactly one item matches.
    OnSingle,
    /// When exactly one item matches and the call did not extend the filter.
    #[default]
    OnSingleAfterCompletion,
}

/// Result of [`ItemList::autocomplete`].
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub list: ItemList<T>,
    /// `true` when the caller should navigate into (or open) the item under
    /// the cursor instead of just showing the updated list.
    pub navigate: bool,
}

/// A list of items with a text filter and a cursor into the filtered view.
#[derive(Clone)]
pub struct ItemList<T> {
    items: Vec<T>,
    /// Indices into `items`, in display order.
    filtered: Vec<usize>,
    cursor: usize,
    filter: String,
    hide_unfiltered: Option<fn(&T) -> bool>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ItemList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemList")
            .field("items", &self.items)
            .field("filtered", &self.filtered)
            .field("cursor", &self.cursor)
            .field("filter", &self.filter)
            .finish()
    }
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            cursor: 0,
            filter: String::new(),
            hide_unfiltered: None,
        }
    }
}

impl<T: Filterable + Clone> ItemList<T> {
    /// Creates an unfiltered list with the cursor on the first item.
    pub fn new(items: Vec<T>) -> Self {
        let filtered = (0..items.len()).collect();
        Self {
            items,
            filtered,
            ..Self::default()
        }
    }

    /// Installs a predicate that hides items while the filter is empty.
    pub fn hiding_unfiltered(self, hook: Option<fn(&T) -> bool>) -> Self {
        let filter = self.filter.clone();
        Self {
            hide_unfiltered: hook,
            ..self
        }
        .refiltered(&filter)
    }

    /// All items, ignoring the filter.
    pub fn unfiltered(&self) -> &[T] {
        &self.items
    }

    /// The visible items in display order.
    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(move |&i| &self.items[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// The visible item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.filtered.get(index).map(|&i| &self.items[i])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The item under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.get(self.cursor)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Replaces the items, keeping the filter and, where possible, the
    /// cursor's index.
    pub fn with_items(self, items: Vec<T>) -> Self {
        let filter = self.filter.clone();
        let cursor = self.cursor;
        let list = Self { items, ..self };
        let filtered = list.compute_filtered(&filter);
        Self { filtered, ..list }.with_cursor_coerced(cursor)
    }

    /// Applies a new filter.
    ///
    /// Items are visible when their key contains the filter
    /// (case-insensitively); items starting with it are ranked first, the
    /// rest keep their relative order. If fewer items are visible than
    /// before, the cursor moves to the top. Otherwise it stays on the item
    /// it was on, or on its old index if that item disappeared.
    pub fn with_filter(self, filter: &str) -> Self {
        self.refiltered(filter)
    }

    fn refiltered(self, filter: &str) -> Self {
        let previous_len = self.filtered.len();
        let previous_key = self.current().map(|item| item.filter_key().to_string());
        let previous_cursor = self.cursor;

        let filtered = self.compute_filtered(filter);
        let cursor = if filtered.len() < previous_len {
            0
        } else {
            previous_key
                .and_then(|key| {
                    filtered
                        .iter()
                        .position(|&i| self.items[i].filter_key() == key)
                })
                .unwrap_or(previous_cursor)
        };

        Self {
            filtered,
            filter: filter.to_string(),
            ..self
        }
        .with_cursor_coerced(cursor)
    }

    fn compute_filtered(&self, filter: &str) -> Vec<usize> {
        if filter.is_empty() {
            return (0..self.items.len())
                .filter(|&i| !self.hide_unfiltered.is_some_and(|hide| hide(&self.items[i])))
                .collect();
        }

        let needle = filter.to_lowercase();
        let mut scored: Vec<(usize, u8)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let key = item.filter_key().to_lowercase();
                if key.starts_with(&needle) {
                    Some((i, 2))
                } else if key.contains(&needle) {
                    Some((i, 1))
                } else {
                    None
                }
            })
            .collect();
        // `sort_by` is stable, so equal scores keep their original order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(i, _)| i).collect()
    }

    /// Moves the cursor by `offset`, wrapping around at both ends.
    pub fn with_cursor_shifted(self, offset: isize) -> Self {
        let len = self.filtered.len();
        let cursor = if len == 0 {
            0
        } else {
            (self.cursor as isize + offset).rem_euclid(len as isize) as usize
        };
        Self { cursor, ..self }
    }

    /// Moves the cursor to `index`, clamped to the visible range.
    pub fn with_cursor_coerced(self, index: usize) -> Self {
        let cursor = index.min(self.filtered.len().saturating_sub(1));
        if cursor == self.cursor {
            return self;
        }
        Self { cursor, ..self }
    }

    /// Moves the cursor to the first visible item matching `predicate`, or
    /// to `default` when none does.
    pub fn with_cursor_on_first(self, default: usize, predicate: impl Fn(&T) -> bool) -> Self {
        let index = self.filtered().position(predicate).unwrap_or(default);
        self.with_cursor_coerced(index)
    }

    /// Moves the cursor forward to the next item matching `predicate`,
    /// wrapping around and skipping the current item. No-op without a match.
    pub fn with_cursor_on_next(self, predicate: impl Fn(&T) -> bool) -> Self {
        self.with_cursor_on_next_by(1, predicate)
    }

    /// Like [`with_cursor_on_next`](Self::with_cursor_on_next), searching
    /// backwards.
    pub fn with_cursor_on_next_reverse(self, predicate: impl Fn(&T) -> bool) -> Self {
        self.with_cursor_on_next_by(-1, predicate)
    }

    fn with_cursor_on_next_by(self, step: isize, predicate: impl Fn(&T) -> bool) -> Self {
        let len = self.filtered.len() as isize;
        if len == 0 {
            return self;
        }
        let found = (1..len)
            .map(|k| (self.cursor as isize + k * step).rem_euclid(len) as usize)
            .find(|&i| self.get(i).is_some_and(&predicate));
        match found {
            Some(cursor) => Self { cursor, ..self },
            None => self,
        }
    }

    /// Extends the filter to the longest common prefix of all items whose
    /// key starts with the current filter.
    ///
    /// No-op when nothing starts with the filter. `invert` reverses the
    /// cycling direction of [`AutocompleteStyle::CommonPrefixCycle`].
    pub fn autocomplete(
        self,
        style: AutocompleteStyle,
        auto_navigation: AutoNavigation,
        invert: bool,
    ) -> Completion<T> {
        let needle = self.filter.to_lowercase();
        let candidates: Vec<&str> = self
            .items
            .iter()
            .map(Filterable::filter_key)
            .filter(|key| key.to_lowercase().starts_with(&needle))
            .collect();
        if candidates.is_empty() {
            return Completion {
                list: self,
                navigate: false,
            };
        }

        let prefix = common_prefix(&candidates).to_string();
        let lower_prefix = prefix.to_lowercase();
        let changed = lower_prefix != needle;
        let matches_prefix = |item: &T| item.filter_key().to_lowercase().starts_with(&lower_prefix);

        let list = self.with_filter(&prefix);
        let cursor = list.cursor;
        let list = match style {
            AutocompleteStyle::CommonPrefixCycle if !changed => {
                if invert {
                    list.with_cursor_on_next_reverse(matches_prefix)
                } else {
                    list.with_cursor_on_next(matches_prefix)
                }
            }
            _ => list.with_cursor_on_first(cursor, matches_prefix),
        };

        let single = list.filtered().filter(|item| matches_prefix(item)).count() == 1;
        let navigate = single
            && match auto_navigation {
                AutoNavigation::Never => false,
                AutoNavigation::OnSingle => true,
                AutoNavigation::OnSingleAfterCompletion => !changed,
            };

        Completion { list, navigate }
    }
}

/// Longest case-insensitive common prefix, spelled as in the first candidate.
fn common_prefix<'a>(candidates: &[&'a str]) -> &'a str {
    let first = candidates[0];
    let mut end = first.len();
    for other in &candidates[1..] {
        let mut matched = 0;
        for ((i, a), b) in first.char_indices().zip(other.chars()) {
            if i >= end || !a.to_lowercase().eq(b.to_lowercase()) {
                break;
            }
            matched = i + a.len_utf8();
        }
        end = end.min(matched);
    }
    &first[..end]
}
