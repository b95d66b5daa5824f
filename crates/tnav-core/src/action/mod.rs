//! Key- and menu-triggered actions.
//!
//! Every user-triggerable behaviour is an [`Action`]: a description, a
//! style for hint rendering, an availability condition over the live
//! [`ActionEnv`] and an effect. Key actions add a [`Trigger`]; menu actions
//! are plain [`Action`]s listed in the menu.
//!
//! [`ActionRegistry`] keeps key actions in per-category lists whose order is
//! their priority. Registering an action rewrites its condition to also
//! require that no earlier action in the same category sharing one of its
//! keys is available, so the first registered available action wins a key.

pub mod builtin;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::settings::Config;
use crate::error::CoreResult;
use crate::key::KeyEvent;
use crate::macros::{Macro, Scope};
use crate::nav::state::State;
use crate::session::Session;

static NO_VARIABLES: BTreeMap<String, String> = BTreeMap::new();

/// What conditions, descriptions and effects are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ActionEnv<'a> {
    pub state: &'a State,
    pub session: &'a Session,
    pub config: &'a Config,
}

impl<'a> ActionEnv<'a> {
    pub fn new(state: &'a State, session: &'a Session, config: &'a Config) -> Self {
        Self {
            state,
            session,
            config,
        }
    }

    /// Built-in macro symbols over the live state, without local variables.
    pub fn scope(&self) -> Scope<'a> {
        Scope {
            state: self.state,
            session: self.session,
            variables: &NO_VARIABLES,
        }
    }
}

/// The result of performing an action.
///
/// Pure navigation returns the next [`State`]; everything that needs the
/// host or the registry is left to the controller.
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    State(State),
    /// Move the open menu's cursor over the available menu actions.
    MenuCursor(isize),
    /// Perform the highlighted menu action.
    MenuSubmit,
    OpenFile(PathBuf),
    RunCommand(String),
    RunMacro(Arc<Macro>),
    CreateFile,
    CreateDirectory,
    Delete(PathBuf),
    Exit(Option<PathBuf>),
}

/// Hint and menu color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStyle {
    #[default]
    Normal,
    /// The text depends on the selected entry.
    Entry,
    /// The text depends on the filter.
    Filter,
    Danger,
}

pub type Condition = Arc<dyn Fn(&ActionEnv<'_>) -> bool + Send + Sync>;
pub type Describe = Arc<dyn Fn(&ActionEnv<'_>) -> String + Send + Sync>;
pub type Perform = Arc<dyn Fn(&ActionEnv<'_>) -> CoreResult<Effect> + Send + Sync>;

/// A described, conditionally available effect.
#[derive(Clone)]
pub struct Action {
    id: String,
    description: Describe,
    style: ActionStyle,
    hidden: bool,
    condition: Condition,
    perform: Perform,
}

/// Menu entries are actions without a trigger.
pub type MenuAction = Action;

impl Action {
    /// An always-available action with an empty description.
    pub fn new(
        id: impl Into<String>,
        perform: impl Fn(&ActionEnv<'_>) -> CoreResult<Effect> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: Arc::new(|_: &ActionEnv<'_>| String::new()),
            style: ActionStyle::Normal,
            hidden: false,
            condition: Arc::new(|_: &ActionEnv<'_>| true),
            perform: Arc::new(perform),
        }
    }

    pub fn when(self, condition: impl Fn(&ActionEnv<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            condition: Arc::new(condition),
            ..self
        }
    }

    pub fn described(self, description: &'static str) -> Self {
        self.described_by(move |_| description.to_string())
    }

    pub fn described_by(
        self,
        describe: impl Fn(&ActionEnv<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: Arc::new(describe),
            ..self
        }
    }

    pub fn styled(self, style: ActionStyle) -> Self {
        Self { style, ..self }
    }

    pub fn hidden(self) -> Self {
        Self {
            hidden: true,
            ..self
        }
    }

    pub fn bound_to(self, trigger: Trigger) -> KeyAction {
        KeyAction {
            trigger,
            action: self,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn style(&self) -> ActionStyle {
        self.style
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_available(&self, env: &ActionEnv<'_>) -> bool {
        (self.condition)(env)
    }

    pub fn describe(&self, env: &ActionEnv<'_>) -> String {
        (self.description)(env)
    }

    pub fn perform(&self, env: &ActionEnv<'_>) -> CoreResult<Effect> {
        (self.perform)(env)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("style", &self.style)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// The keys that fire a [`KeyAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Keys(Vec<KeyEvent>),
    AnyKey,
}

impl Trigger {
    pub fn matches(&self, event: &KeyEvent, ignore_ctrl: bool) -> bool {
        match self {
            Self::AnyKey => true,
            Self::Keys(keys) => keys.iter().any(|key| key.matches(event, ignore_ctrl)),
        }
    }

    /// Whether some key would fire both triggers.
    pub fn overlaps(&self, other: &Trigger, ignore_ctrl: bool) -> bool {
        match (self, other) {
            (Self::AnyKey, _) | (_, Self::AnyKey) => true,
            (Self::Keys(ours), Self::Keys(theirs)) => ours.iter().any(|a| {
                theirs
                    .iter()
                    .any(|b| a.matches(b, ignore_ctrl) || b.matches(a, ignore_ctrl))
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Keys(keys) if keys.is_empty())
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyKey => write!(f, "any"),
            Self::Keys(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{key}")?;
                }
                Ok(())
            }
        }
    }
}

/// An [`Action`] fired by a key.
#[derive(Debug, Clone)]
pub struct KeyAction {
    pub trigger: Trigger,
    action: Action,
}

impl KeyAction {
    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Independent priority lists of key actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Normal,
    /// Matched while quick-macro mode is active, ignoring Ctrl.
    QuickMacro,
}

impl ActionCategory {
    pub fn ignores_ctrl(self) -> bool {
        matches!(self, Self::QuickMacro)
    }
}

/// All registered actions, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    normal: Vec<KeyAction>,
    quick: Vec<KeyAction>,
    menu: Vec<MenuAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, category: ActionCategory) -> &[KeyAction] {
        match category {
            ActionCategory::Normal => &self.normal,
            ActionCategory::QuickMacro => &self.quick,
        }
    }

    /// Appends `key_action` to `category`, yielding its keys to every
    /// earlier overlapping action that is available.
    pub fn register(&mut self, category: ActionCategory, mut key_action: KeyAction) {
        let ignore_ctrl = category.ignores_ctrl();
        let earlier: Vec<Condition> = self
            .list(category)
            .iter()
            .filter(|other| other.trigger.overlaps(&key_action.trigger, ignore_ctrl))
            .map(|other| Arc::clone(&other.action.condition))
            .collect();

        if !earlier.is_empty() {
            tracing::debug!(
                action = %key_action.action.id,
                conflicts = earlier.len(),
                "registered with key conflicts"
            );
            let own = Arc::clone(&key_action.action.condition);
            key_action.action.condition = Arc::new(move |env: &ActionEnv<'_>| {
                own(env) && !earlier.iter().any(|condition| condition(env))
            });
        }

        match category {
            ActionCategory::Normal => self.normal.push(key_action),
            ActionCategory::QuickMacro => self.quick.push(key_action),
        }
    }

    pub fn register_menu(&mut self, action: MenuAction) {
        self.menu.push(action);
    }

    pub fn actions(&self, category: ActionCategory) -> &[KeyAction] {
        self.list(category)
    }

    /// The first action in `category` triggered by `event` and available.
    pub fn find(
        &self,
        category: ActionCategory,
        event: &KeyEvent,
        env: &ActionEnv<'_>,
    ) -> Option<&KeyAction> {
        let ignore_ctrl = category.ignores_ctrl();
        self.list(category).iter().find(|key_action| {
            key_action.trigger.matches(event, ignore_ctrl) && key_action.action.is_available(env)
        })
    }

    /// Available actions of `category` with at least one key, for hints.
    pub fn available(&self, category: ActionCategory, env: &ActionEnv<'_>) -> Vec<&KeyAction> {
        self.list(category)
            .iter()
            .filter(|key_action| {
                !key_action.trigger.is_empty() && key_action.action.is_available(env)
            })
            .collect()
    }

    /// Menu actions available right now, in menu order.
    pub fn menu(&self, env: &ActionEnv<'_>) -> Vec<&MenuAction> {
        self.menu
            .iter()
            .filter(|action| action.is_available(env))
            .collect()
    }
}
