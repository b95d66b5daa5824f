//! The statements a macro is made of.

use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::host::MessageLevel;
use crate::macros::condition::MacroCondition;
use crate::macros::symbol::MacroSymbol;
use crate::macros::template::MacroString;

/// Ordered `symbol = template` pairs.
pub type Assignments = Vec<(MacroSymbol, MacroString)>;

#[derive(Debug, Clone)]
pub enum PromptKind {
    Text { default: MacroString },
    Choice { choices: Vec<MacroString> },
}

/// A call to another macro.
#[derive(Debug, Clone)]
pub struct RunMacro {
    pub id: String,
    /// Callee variables seeded from caller templates. `None` copies the
    /// caller's whole variable set.
    pub parameters: Option<Assignments>,
    /// Caller variables filled from callee templates after the call.
    /// `None` copies the callee's whole variable set back.
    pub captures: Option<Assignments>,
    pub ignore_condition: bool,
    /// Absorb a `return` inside the callee. When false the return continues
    /// up through the caller.
    pub continue_on_return: bool,
}

#[derive(Debug, Clone)]
pub enum MacroAction {
    RunCommand {
        command: MacroString,
        directory: Option<MacroString>,
        exit_code: Option<MacroSymbol>,
        stdout: Option<MacroSymbol>,
        stderr: Option<MacroSymbol>,
        /// Strip trailing newlines from captured output.
        trim: bool,
    },
    Prompt {
        message: MacroString,
        kind: PromptKind,
        output: MacroSymbol,
    },
    RunMacro(RunMacro),
    /// Stores capture group `n` in `groups[n - 1]`.
    Match {
        value: MacroString,
        regex: Regex,
        groups: Vec<MacroSymbol>,
    },
    OpenFile {
        path: MacroString,
        exit_code: Option<MacroSymbol>,
    },
    Set(Assignments),
    If {
        condition: MacroCondition,
        then: MacroActions,
        otherwise: MacroActions,
    },
    Print {
        message: MacroString,
        level: MessageLevel,
        debug_only: bool,
    },
    Return,
    Exit {
        directory: Option<MacroString>,
    },
}

impl MacroAction {
    /// Builds a `set` action, rejecting a value that reads another variable
    /// assigned by the same action.
    pub fn set(assignments: Assignments) -> CoreResult<Self> {
        for (variable, value) in &assignments {
            for (other, _) in &assignments {
                if other != variable && value.references(other) {
                    return Err(CoreError::CircularDependency {
                        variable: variable.to_string(),
                        dependency: other.to_string(),
                    });
                }
            }
        }
        Ok(Self::Set(assignments))
    }

    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::RunMacro(call) => out.push(&call.id),
            Self::If {
                then, otherwise, ..
            } => {
                then.collect_calls(out);
                otherwise.collect_calls(out);
            }
            _ => {}
        }
    }
}

/// A sequence of actions run in order.
#[derive(Debug, Clone, Default)]
pub struct MacroActions(pub Vec<MacroAction>);

impl MacroActions {
    pub fn iter(&self) -> std::slice::Iter<'_, MacroAction> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids of every macro called anywhere in the tree.
    pub fn called_macros(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_calls(&mut out);
        out
    }

    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a str>) {
        for action in &self.0 {
            action.collect_calls(out);
        }
    }
}

impl From<Vec<MacroAction>> for MacroActions {
    fn from(actions: Vec<MacroAction>) -> Self {
        Self(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(pairs: &[(&str, &str)]) -> Assignments {
        pairs
            .iter()
            .map(|(k, v)| (MacroSymbol::parse(k), MacroString::parse(v)))
            .collect()
    }

    #[test]
    fn set_accepts_self_reference() {
        assert!(MacroAction::set(assign(&[("count", "{{count}}1"), ("b", "x")])).is_ok());
    }

    #[test]
    fn set_rejects_sibling_reference() {
        let err = MacroAction::set(assign(&[("a", "{{b}}"), ("b", "1")])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CircularDependency { ref variable, ref dependency }
                if variable == "a" && dependency == "b"
        ));
    }

    #[test]
    fn called_macros_walks_branches() {
        let call = |id: &str| {
            MacroAction::RunMacro(RunMacro {
                id: id.to_string(),
                parameters: None,
                captures: None,
                ignore_condition: false,
                continue_on_return: true,
            })
        };
        let actions = MacroActions(vec![
            call("first"),
            MacroAction::If {
                condition: MacroCondition::All(vec![]),
                then: MacroActions(vec![call("then")]),
                otherwise: MacroActions(vec![call("else")]),
            },
        ]);
        assert_eq!(actions.called_macros(), vec!["first", "then", "else"]);
    }
}
