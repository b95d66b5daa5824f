//! Loaded macros and the registry that validates them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::key::KeyEvent;
use crate::macros::action::MacroActions;
use crate::macros::condition::MacroCondition;
use crate::macros::symbol::{MacroSymbol, SymbolLookup};
use crate::macros::template::MacroString;

/// A user-defined, optionally key-bound sequence of actions.
#[derive(Debug, Clone, Default)]
pub struct Macro {
    /// Required for macros called from other macros.
    pub id: Option<String>,
    pub description: MacroString,
    pub condition: Option<MacroCondition>,
    /// Binding in normal mode.
    pub key: Option<KeyEvent>,
    /// Binding in quick-macro mode (matched while Ctrl is held).
    pub quick_key: Option<KeyEvent>,
    /// Kept out of the menu and the hint bar.
    pub hidden: bool,
    pub actions: MacroActions,
}

impl Macro {
    pub fn is_available(&self, lookup: &impl SymbolLookup) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition.evaluate(lookup))
    }

    pub fn describe(&self, lookup: &impl SymbolLookup) -> String {
        self.description.evaluate(lookup)
    }

    /// A label for logs and messages.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or_else(|| self.description.raw())
    }

    fn displayed_symbols(&self) -> impl Iterator<Item = &MacroSymbol> {
        self.description.symbols().chain(
            self.condition
                .iter()
                .flat_map(|condition| condition.symbols()),
        )
    }

    /// Whether the description or condition reads the selected entry.
    pub fn depends_on_entry(&self) -> bool {
        self.displayed_symbols()
            .any(|s| s.builtin().is_some_and(|b| b.depends_on_entry()))
    }

    /// Whether the description or condition reads the filter.
    pub fn depends_on_filter(&self) -> bool {
        self.displayed_symbols()
            .any(|s| s.builtin().is_some_and(|b| b.depends_on_filter()))
    }
}

/// All loaded macros, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: Vec<Arc<Macro>>,
}

impl MacroRegistry {
    /// Validates `macros`: ids are unique and every called id exists.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateMacro`] or [`CoreError::UnknownMacro`].
    pub fn new(macros: Vec<Macro>) -> CoreResult<Self> {
        let mut ids = HashSet::new();
        for m in &macros {
            if let Some(id) = &m.id {
                if !ids.insert(id.as_str()) {
                    return Err(CoreError::DuplicateMacro(id.clone()));
                }
            }
        }
        for m in &macros {
            if let Some(unknown) = m
                .actions
                .called_macros()
                .into_iter()
                .find(|called| !ids.contains(called))
            {
                return Err(CoreError::UnknownMacro(unknown.to_string()));
            }
        }
        tracing::debug!(count = macros.len(), "loaded macros");
        Ok(Self {
            macros: macros.into_iter().map(Arc::new).collect(),
        })
    }

    /// Reads `macros.toml`. A missing file yields an empty registry.
    ///
    /// # Errors
    ///
    /// [`CoreError::ConfigParse`] for malformed TOML or invalid macros.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CoreError::from_io(e, path)),
        };
        let macros = crate::macros::raw::parse_macros(&content)
            .map_err(|e| CoreError::ConfigParse(format!("{}: {e}", path.display())))?;
        Self::new(macros)
    }

    pub fn find(&self, id: &str) -> Option<&Arc<Macro>> {
        self.macros.iter().find(|m| m.id.as_deref() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Macro>> {
        self.macros.iter()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::action::{MacroAction, RunMacro};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn with_id(id: &str) -> Macro {
        Macro {
            id: Some(id.to_string()),
            ..Macro::default()
        }
    }

    fn calling(id: &str, target: &str) -> Macro {
        Macro {
            actions: MacroActions(vec![MacroAction::RunMacro(RunMacro {
                id: target.to_string(),
                parameters: None,
                captures: None,
                ignore_condition: false,
                continue_on_return: true,
            })]),
            ..with_id(id)
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = MacroRegistry::new(vec![with_id("a"), with_id("a")]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateMacro(id) if id == "a"));
    }

    #[test]
    fn unknown_call_targets_are_rejected() {
        let err = MacroRegistry::new(vec![calling("a", "ghost")]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownMacro(id) if id == "ghost"));
    }

    #[test]
    fn find_by_id() {
        let registry = MacroRegistry::new(vec![with_id("a"), calling("b", "a")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.find("a").is_some());
        assert!(registry.find("zzz").is_none());
    }

    #[test]
    fn missing_file_is_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = MacroRegistry::load(&tmp.path().join("macros.toml")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn dependency_analysis_reads_description_and_condition() {
        let m = Macro {
            description: MacroString::parse("Open {{entryName}}"),
            ..Macro::default()
        };
        assert!(m.depends_on_entry());
        assert!(!m.depends_on_filter());

        let m = Macro {
            condition: Some(MacroCondition::NotEmpty(MacroString::parse("{{filter}}"))),
            ..Macro::default()
        };
        assert!(m.depends_on_filter());
    }

    #[test]
    fn availability_defaults_to_true() {
        let vars = BTreeMap::new();
        assert!(Macro::default().is_available(&vars));
    }
}
