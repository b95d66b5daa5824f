//! UI widget modules for the TUI frontend.
//!
//! Each sub-module renders a single UI component using ratatui.

pub mod dialog;
pub mod entries;
pub mod hints;
pub mod menu;
pub mod messages;
pub mod popup;
pub mod title;
