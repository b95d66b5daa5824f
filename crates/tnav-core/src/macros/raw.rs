//! The TOML form of `macros.toml` and its conversion into [`Macro`]s.
//!
//! ```toml
//! [[macros]]
//! id = "git-status"
//! description = "git status in {{directory}}"
//! quick_key = "g"
//! condition = { not_blank = "{{directory}}" }
//! actions = [
//!   { run_command = { command = "git status", exit_code = "status" } },
//!   { if = { condition = { not_equal = { values = ["{{status}}", "0"] } }, then = [
//!     { print = { message = "git failed ({{status}})", style = "error" } },
//!   ] } },
//! ]
//! ```

use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::host::MessageLevel;
use crate::key::KeyEvent;
use crate::macros::action::{Assignments, MacroAction, MacroActions, PromptKind, RunMacro};
use crate::macros::condition::MacroCondition;
use crate::macros::model::Macro;
use crate::macros::symbol::MacroSymbol;
use crate::macros::template::MacroString;

#[derive(Debug, Deserialize)]
struct RawMacroFile {
    #[serde(default)]
    macros: Vec<RawMacro>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMacro {
    id: Option<String>,
    #[serde(default)]
    description: String,
    condition: Option<RawCondition>,
    key: Option<String>,
    quick_key: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawCondition {
    Any(Vec<RawCondition>),
    All(Vec<RawCondition>),
    Not(Box<RawCondition>),
    Equal(RawEqual),
    NotEqual(RawEqual),
    Match(RawMatch),
    NotMatch(RawMatch),
    Empty(String),
    NotEmpty(String),
    Blank(String),
    NotBlank(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEqual {
    values: Vec<String>,
    #[serde(default)]
    ignore_case: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMatch {
    value: String,
    regex: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawAction {
    RunCommand(RawRunCommand),
    Prompt(RawPrompt),
    RunMacro(RawRunMacro),
    Match(RawMatchAction),
    OpenFile(RawOpenFile),
    Set(BTreeMap<String, String>),
    If(RawIf),
    Print(RawPrint),
    Return,
    Exit(RawExit),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunCommand {
    command: String,
    directory: Option<String>,
    exit_code: Option<String>,
    stdout: Option<String>,
    stderr: Option<String>,
    #[serde(default = "default_true")]
    trim: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrompt {
    message: String,
    #[serde(default)]
    default: String,
    choices: Option<Vec<String>>,
    output: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunMacro {
    id: String,
    parameters: Option<BTreeMap<String, String>>,
    captures: Option<BTreeMap<String, String>>,
    #[serde(default)]
    ignore_condition: bool,
    #[serde(default = "default_true")]
    continue_on_return: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMatchAction {
    value: String,
    regex: String,
    groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOpenFile {
    path: String,
    exit_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIf {
    condition: RawCondition,
    #[serde(default)]
    then: Vec<RawAction>,
    #[serde(default, rename = "else")]
    otherwise: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrint {
    message: String,
    #[serde(default)]
    style: MessageLevel,
    #[serde(default)]
    debug: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawExit {
    directory: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Parses the contents of `macros.toml`.
///
/// # Errors
///
/// [`CoreError::ConfigParse`] for malformed TOML, plus the validation
/// errors of individual actions (invalid keys, regexes or `set` cycles).
pub fn parse_macros(content: &str) -> CoreResult<Vec<Macro>> {
    let file: RawMacroFile =
        toml::from_str(content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
    file.macros.into_iter().map(convert_macro).collect()
}

fn convert_macro(raw: RawMacro) -> CoreResult<Macro> {
    Ok(Macro {
        id: raw.id,
        description: MacroString::parse(&raw.description),
        condition: raw.condition.map(convert_condition).transpose()?,
        key: raw.key.as_deref().map(KeyEvent::parse).transpose()?,
        quick_key: raw.quick_key.as_deref().map(KeyEvent::parse).transpose()?,
        hidden: raw.hidden,
        actions: convert_actions(raw.actions)?,
    })
}

fn compile(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern).map_err(|e| CoreError::InvalidRegex(e.to_string()))
}

fn convert_condition(raw: RawCondition) -> CoreResult<MacroCondition> {
    let convert_all = |children: Vec<RawCondition>| -> CoreResult<Vec<MacroCondition>> {
        children.into_iter().map(convert_condition).collect()
    };
    let values = |v: Vec<String>| -> Vec<MacroString> {
        v.iter().map(|s| MacroString::parse(s)).collect()
    };

    Ok(match raw {
        RawCondition::Any(children) => MacroCondition::Any(convert_all(children)?),
        RawCondition::All(children) => MacroCondition::All(convert_all(children)?),
        RawCondition::Not(child) => MacroCondition::Not(Box::new(convert_condition(*child)?)),
        RawCondition::Equal(eq) => MacroCondition::Equal {
            values: values(eq.values),
            ignore_case: eq.ignore_case,
        },
        RawCondition::NotEqual(eq) => MacroCondition::NotEqual {
            values: values(eq.values),
            ignore_case: eq.ignore_case,
        },
        RawCondition::Match(m) => MacroCondition::Match {
            value: MacroString::parse(&m.value),
            regex: compile(&m.regex)?,
        },
        RawCondition::NotMatch(m) => MacroCondition::NotMatch {
            value: MacroString::parse(&m.value),
            regex: compile(&m.regex)?,
        },
        RawCondition::Empty(v) => MacroCondition::Empty(MacroString::parse(&v)),
        RawCondition::NotEmpty(v) => MacroCondition::NotEmpty(MacroString::parse(&v)),
        RawCondition::Blank(v) => MacroCondition::Blank(MacroString::parse(&v)),
        RawCondition::NotBlank(v) => MacroCondition::NotBlank(MacroString::parse(&v)),
    })
}

fn convert_actions(raw: Vec<RawAction>) -> CoreResult<MacroActions> {
    raw.into_iter()
        .map(convert_action)
        .collect::<CoreResult<Vec<_>>>()
        .map(MacroActions)
}

fn assignments(map: BTreeMap<String, String>) -> Assignments {
    map.iter()
        .map(|(k, v)| (MacroSymbol::parse(k), MacroString::parse(v)))
        .collect()
}

fn symbol(name: Option<String>) -> Option<MacroSymbol> {
    name.map(|n| MacroSymbol::parse(&n))
}

fn convert_action(raw: RawAction) -> CoreResult<MacroAction> {
    Ok(match raw {
        RawAction::RunCommand(r) => MacroAction::RunCommand {
            command: MacroString::parse(&r.command),
            directory: r.directory.as_deref().map(MacroString::parse),
            exit_code: symbol(r.exit_code),
            stdout: symbol(r.stdout),
            stderr: symbol(r.stderr),
            trim: r.trim,
        },
        RawAction::Prompt(p) => MacroAction::Prompt {
            message: MacroString::parse(&p.message),
            kind: match p.choices {
                Some(choices) => PromptKind::Choice {
                    choices: choices.iter().map(|c| MacroString::parse(c)).collect(),
                },
                None => PromptKind::Text {
                    default: MacroString::parse(&p.default),
                },
            },
            output: MacroSymbol::parse(&p.output),
        },
        RawAction::RunMacro(r) => MacroAction::RunMacro(RunMacro {
            id: r.id,
            parameters: r.parameters.map(assignments),
            captures: r.captures.map(assignments),
            ignore_condition: r.ignore_condition,
            continue_on_return: r.continue_on_return,
        }),
        RawAction::Match(m) => MacroAction::Match {
            value: MacroString::parse(&m.value),
            regex: compile(&m.regex)?,
            groups: m.groups.iter().map(|g| MacroSymbol::parse(g)).collect(),
        },
        RawAction::OpenFile(o) => MacroAction::OpenFile {
            path: MacroString::parse(&o.path),
            exit_code: symbol(o.exit_code),
        },
        RawAction::Set(map) => MacroAction::set(assignments(map))?,
        RawAction::If(i) => MacroAction::If {
            condition: convert_condition(i.condition)?,
            then: convert_actions(i.then)?,
            otherwise: convert_actions(i.otherwise)?,
        },
        RawAction::Print(p) => MacroAction::Print {
            message: MacroString::parse(&p.message),
            level: p.style,
            debug_only: p.debug,
        },
        RawAction::Return => MacroAction::Return,
        RawAction::Exit(e) => MacroAction::Exit {
            directory: e.directory.as_deref().map(MacroString::parse),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_macro() {
        let toml = r#"
[[macros]]
id = "build"
description = "Build {{entryName}}"
key = "f9"
quick_key = "b"
condition = { all = [
  { equal = { values = ["{{entryType}}", "directory"] } },
  { not_blank = "{{entryName}}" },
] }
actions = [
  { run_command = { command = "make -C {{entryPath}}", exit_code = "status", stdout = "out" } },
  { if = { condition = { equal = { values = ["{{status}}", "0"] } }, then = [
      { print = { message = "ok", style = "success" } },
    ], else = [ "return" ] } },
  { set = { a = "1", b = "2" } },
  { match = { value = "{{out}}", regex = "(\\d+) warnings", groups = ["warnings"] } },
  { exit = { directory = "{{entryPath}}" } },
]
"#;
        let macros = parse_macros(toml).unwrap();
        assert_eq!(macros.len(), 1);
        let m = &macros[0];
        assert_eq!(m.id.as_deref(), Some("build"));
        assert_eq!(m.key, Some(KeyEvent::parse("f9").unwrap()));
        assert_eq!(m.quick_key, Some(KeyEvent::char('b')));
        assert!(m.depends_on_entry());
        assert_eq!(m.actions.0.len(), 5);
        assert!(matches!(
            &m.actions.0[1],
            MacroAction::If { otherwise, .. } if matches!(otherwise.0[..], [MacroAction::Return])
        ));
    }

    #[test]
    fn prompt_with_choices_is_choice_kind() {
        let toml = r#"
[[macros]]
actions = [ { prompt = { message = "Pick", choices = ["a", "b"], output = "picked" } } ]
"#;
        let macros = parse_macros(toml).unwrap();
        assert!(matches!(
            &macros[0].actions.0[0],
            MacroAction::Prompt { kind: PromptKind::Choice { choices }, .. } if choices.len() == 2
        ));
    }

    #[test]
    fn run_macro_defaults() {
        let toml = r#"
[[macros]]
actions = [ { run_macro = { id = "other", parameters = { x = "{{y}}" } } } ]
"#;
        let macros = parse_macros(toml).unwrap();
        let MacroAction::RunMacro(call) = &macros[0].actions.0[0] else {
            panic!("expected run_macro");
        };
        assert!(call.continue_on_return);
        assert!(!call.ignore_condition);
        assert_eq!(call.parameters.as_ref().map(Vec::len), Some(1));
        assert!(call.captures.is_none());
    }

    #[test]
    fn circular_set_is_rejected() {
        let toml = r#"
[[macros]]
actions = [ { set = { a = "{{b}}", b = "{{a}}" } } ]
"#;
        assert!(matches!(
            parse_macros(toml),
            Err(CoreError::CircularDependency { .. })
        ));
    }

    #[test]
    fn bad_regex_and_key_are_rejected() {
        let bad_regex = r#"
[[macros]]
condition = { match = { value = "x", regex = "(" } }
"#;
        assert!(matches!(parse_macros(bad_regex), Err(CoreError::InvalidRegex(_))));

        let bad_key = r#"
[[macros]]
key = "hyper+q"
"#;
        assert!(matches!(parse_macros(bad_key), Err(CoreError::InvalidKey(_))));
    }

    #[test]
    fn unknown_fields_are_config_errors() {
        let toml = r#"
[[macros]]
descriptoin = "typo"
"#;
        assert!(matches!(parse_macros(toml), Err(CoreError::ConfigParse(_))));
    }

    #[test]
    fn empty_file_has_no_macros() {
        assert!(parse_macros("").unwrap().is_empty());
    }
}
