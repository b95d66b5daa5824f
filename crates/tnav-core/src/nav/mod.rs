//! Navigation state: the generic filterable list and the application
//! [`state::State`] built on it.

pub mod list;
pub mod state;
