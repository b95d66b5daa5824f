//! Filesystem abstractions for tnav.
//!
//! [`entry::Entry`] represents one filesystem item with lazily fetched
//! metadata; [`ops`] lists directories and performs the few mutations the
//! navigator offers (create file, create directory, delete).

pub mod entry;
pub mod ops;
#[cfg(unix)]
mod unix;

pub use entry::{Entry, EntryType, LinkTarget, Metadata, PermissionSet, Permissions};
