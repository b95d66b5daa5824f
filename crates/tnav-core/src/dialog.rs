//! Modal dialog models.
//!
//! The frontend answers a [`Prompt`] by running a nested input loop: it
//! feeds key events to [`Dialog::handle`] and redraws until the outcome is
//! no longer [`DialogOutcome::Pending`].

use crate::host::Prompt;
use crate::key::{Key, KeyEvent};
use crate::nav::list::{AutoNavigation, AutocompleteStyle, ItemList};

/// Result of feeding one key event to a dialog.
#[derive(Debug, Clone)]
pub enum DialogOutcome<D> {
    Pending(D),
    Submitted(String),
    Cancelled,
}

impl<D> DialogOutcome<D> {
    fn map<E>(self, f: impl FnOnce(D) -> E) -> DialogOutcome<E> {
        match self {
            Self::Pending(d) => DialogOutcome::Pending(f(d)),
            Self::Submitted(value) => DialogOutcome::Submitted(value),
            Self::Cancelled => DialogOutcome::Cancelled,
        }
    }
}

/// Free text input with an editable buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDialog {
    message: String,
    buffer: String,
}

impl TextDialog {
    pub fn new(message: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            buffer: default.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle(mut self, event: &KeyEvent) -> DialogOutcome<Self> {
        if event.is_cancel() {
            return DialogOutcome::Cancelled;
        }
        match event.key {
            Key::Enter => DialogOutcome::Submitted(self.buffer),
            Key::Escape => DialogOutcome::Cancelled,
            Key::Backspace => {
                self.buffer.pop();
                DialogOutcome::Pending(self)
            }
            _ => {
                if let Some(c) = event.typed_char() {
                    self.buffer.push(c);
                }
                DialogOutcome::Pending(self)
            }
        }
    }
}

/// Pick one of a fixed set of strings. Typing filters the list.
#[derive(Debug, Clone)]
pub struct ChoiceDialog {
    message: String,
    choices: ItemList<String>,
}

impl ChoiceDialog {
    pub fn new(message: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            message: message.into(),
            choices: ItemList::new(choices),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn choices(&self) -> &ItemList<String> {
        &self.choices
    }

    pub fn handle(self, event: &KeyEvent) -> DialogOutcome<Self> {
        if event.is_cancel() {
            return DialogOutcome::Cancelled;
        }
        let Self { message, choices } = self;
        let choices = match event.key {
            Key::Enter => {
                return match choices.current() {
                    Some(choice) => DialogOutcome::Submitted(choice.clone()),
                    None => DialogOutcome::Pending(Self { message, choices }),
                };
            }
            Key::Escape if choices.filter().is_empty() => return DialogOutcome::Cancelled,
            Key::Escape => choices.with_filter(""),
            Key::Up => choices.with_cursor_shifted(-1),
            Key::Down => choices.with_cursor_shifted(1),
            Key::Tab => {
                choices
                    .autocomplete(
                        AutocompleteStyle::CommonPrefixCycle,
                        AutoNavigation::Never,
                        event.shift,
                    )
                    .list
            }
            Key::Backspace => {
                let mut filter = choices.filter().to_string();
                filter.pop();
                choices.with_filter(&filter)
            }
            _ => match event.typed_char() {
                Some(c) => {
                    let filter = format!("{}{c}", choices.filter());
                    choices.with_filter(&filter)
                }
                None => choices,
            },
        };
        DialogOutcome::Pending(Self { message, choices })
    }
}

/// Either kind of dialog, built from a [`Prompt`].
#[derive(Debug, Clone)]
pub enum Dialog {
    Text(TextDialog),
    Choice(ChoiceDialog),
}

impl Dialog {
    pub fn from_prompt(prompt: &Prompt) -> Self {
        match prompt {
            Prompt::Text { message, default } => Self::Text(TextDialog::new(message, default)),
            Prompt::Choice { message, choices } => {
                Self::Choice(ChoiceDialog::new(message, choices.clone()))
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Text(dialog) => dialog.message(),
            Self::Choice(dialog) => dialog.message(),
        }
    }

    pub fn handle(self, event: &KeyEvent) -> DialogOutcome<Self> {
        match self {
            Self::Text(dialog) => dialog.handle(event).map(Self::Text),
            Self::Choice(dialog) => dialog.handle(event).map(Self::Choice),
        }
    }
}
