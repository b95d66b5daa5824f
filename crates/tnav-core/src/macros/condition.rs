//! Boolean condition trees deciding macro availability and `if` branches.

use regex::Regex;

use crate::macros::symbol::{MacroSymbol, SymbolLookup};
use crate::macros::template::MacroString;

#[derive(Debug, Clone)]
pub enum MacroCondition {
    /// True if any child is true (false when empty).
    Any(Vec<MacroCondition>),
    /// True if every child is true (true when empty).
    All(Vec<MacroCondition>),
    Not(Box<MacroCondition>),
    /// True if all values evaluate to the same string.
    Equal {
        values: Vec<MacroString>,
        ignore_case: bool,
    },
    NotEqual {
        values: Vec<MacroString>,
        ignore_case: bool,
    },
    Match {
        value: MacroString,
        regex: Regex,
    },
    NotMatch {
        value: MacroString,
        regex: Regex,
    },
    Empty(MacroString),
    NotEmpty(MacroString),
    /// Empty or only whitespace.
    Blank(MacroString),
    NotBlank(MacroString),
}

impl MacroCondition {
    pub fn evaluate(&self, lookup: &impl SymbolLookup) -> bool {
        match self {
            Self::Any(children) => children.iter().any(|c| c.evaluate(lookup)),
            Self::All(children) => children.iter().all(|c| c.evaluate(lookup)),
            Self::Not(child) => !child.evaluate(lookup),
            Self::Equal {
                values,
                ignore_case,
            } => all_equal(values, *ignore_case, lookup),
            Self::NotEqual {
                values,
                ignore_case,
            } => !all_equal(values, *ignore_case, lookup),
            Self::Match { value, regex } => regex.is_match(&value.evaluate(lookup)),
            Self::NotMatch { value, regex } => !regex.is_match(&value.evaluate(lookup)),
            Self::Empty(value) => value.evaluate(lookup).is_empty(),
            Self::NotEmpty(value) => !value.evaluate(lookup).is_empty(),
            Self::Blank(value) => value.evaluate(lookup).trim().is_empty(),
            Self::NotBlank(value) => !value.evaluate(lookup).trim().is_empty(),
        }
    }

    /// Every symbol the condition reads.
    pub fn symbols(&self) -> Vec<&MacroSymbol> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a MacroSymbol>) {
        match self {
            Self::Any(children) | Self::All(children) => {
                for child in children {
                    child.collect_symbols(out);
                }
            }
            Self::Not(child) => child.collect_symbols(out),
            Self::Equal { values, .. } | Self::NotEqual { values, .. } => {
                out.extend(values.iter().flat_map(MacroString::symbols));
            }
            Self::Match { value, .. }
            | Self::NotMatch { value, .. }
            | Self::Empty(value)
            | Self::NotEmpty(value)
            | Self::Blank(value)
            | Self::NotBlank(value) => out.extend(value.symbols()),
        }
    }
}

fn all_equal(values: &[MacroString], ignore_case: bool, lookup: &impl SymbolLookup) -> bool {
    let mut evaluated = values.iter().map(|v| {
        let s = v.evaluate(lookup);
        if ignore_case {
            s.to_lowercase()
        } else {
            s
        }
    });
    match evaluated.next() {
        Some(first) => evaluated.all(|s| s == first),
        None => true,
    }
}
