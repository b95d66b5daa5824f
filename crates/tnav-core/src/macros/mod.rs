//! User-defined macros: a small interpreted language loaded from
//! `macros.toml`.
//!
//! - [`template`]: strings with `{{name}}` placeholders.
//! - [`symbol`]: variables, built-ins bound to live state, and lookup.
//! - [`condition`]: boolean trees for availability and `if`.
//! - [`action`]: the statements a macro runs.
//! - [`model`]: [`Macro`] and the validating [`MacroRegistry`].
//! - [`raw`]: the TOML representation.
//! - [`runtime`]: the interpreter.

pub mod action;
pub mod condition;
pub mod model;
pub mod raw;
pub mod runtime;
pub mod symbol;
pub mod template;

pub use action::{MacroAction, MacroActions, RunMacro};
pub use condition::MacroCondition;
pub use model::{Macro, MacroRegistry};
pub use runtime::{execute, Flow, MacroBridge, MacroRuntimeContext, MAX_CALL_DEPTH};
pub use symbol::{BuiltinSymbol, MacroSymbol, Scope, SymbolLookup};
pub use template::MacroString;
