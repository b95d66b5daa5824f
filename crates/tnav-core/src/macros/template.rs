//! Strings with `{{name}}` placeholders.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::macros::symbol::{MacroSymbol, SymbolLookup};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Symbol(MacroSymbol),
}

/// A template parsed once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacroString {
    raw: String,
    parts: Vec<Part>,
}

impl MacroString {
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(raw) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                parts.push(Part::Text(raw[last..whole.start()].to_string()));
            }
            parts.push(Part::Symbol(MacroSymbol::parse(name.as_str())));
            last = whole.end();
        }
        if last < raw.len() {
            parts.push(Part::Text(raw[last..].to_string()));
        }
        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    /// The template as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Symbols referenced by placeholders, in order of appearance.
    pub fn symbols(&self) -> impl Iterator<Item = &MacroSymbol> {
        self.parts.iter().filter_map(|part| match part {
            Part::Symbol(symbol) => Some(symbol),
            Part::Text(_) => None,
        })
    }

    pub fn references(&self, symbol: &MacroSymbol) -> bool {
        self.symbols().any(|s| s == symbol)
    }

    /// Substitutes every placeholder with its current value.
    pub fn evaluate(&self, lookup: &impl SymbolLookup) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => text.clone(),
                Part::Symbol(symbol) => lookup.lookup(symbol),
            })
            .collect()
    }
}

impl From<&str> for MacroString {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
