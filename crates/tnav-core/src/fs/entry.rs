//! Filesystem entry representation.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use once_cell::sync::OnceCell;
use unicode_normalization::UnicodeNormalization;

use crate::nav::list::Filterable;

/// Maximum number of symlink hops followed when rendering a link chain.
pub const MAX_LINK_DEPTH: usize = 8;

/// Kind of filesystem object, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Directory,
    RegularFile,
    SymbolicLink,
    Unknown,
}

impl EntryType {
    /// Identifier exposed to macros through the `entryType` symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::RegularFile => "file",
            Self::SymbolicLink => "symlink",
            Self::Unknown => "unknown",
        }
    }

    fn of(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::SymbolicLink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::RegularFile
        } else {
            Self::Unknown
        }
    }
}

/// Read/write/execute bits for one class of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

/// Permission bits for user, group and others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    pub user: PermissionSet,
    pub group: PermissionSet,
    pub others: PermissionSet,
}

impl Permissions {
    /// Decodes the lower nine bits of a POSIX mode.
    pub fn from_mode(mode: u32) -> Self {
        let set = |shift: u32| PermissionSet {
            read: mode >> shift & 0o4 != 0,
            write: mode >> shift & 0o2 != 0,
            execute: mode >> shift & 0o1 != 0,
        };
        Self {
            user: set(6),
            group: set(3),
            others: set(0),
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for set in [self.user, self.group, self.others] {
            write!(
                f,
                "{}{}{}",
                if set.read { 'r' } else { '-' },
                if set.write { 'w' } else { '-' },
                if set.execute { 'x' } else { '-' },
            )?;
        }
        Ok(())
    }
}

/// Lazily fetched OS metadata of an [`Entry`].
#[derive(Debug, Clone)]
pub struct Metadata {
    pub entry_type: EntryType,
    /// Type of the final link target; equals `entry_type` for non-links.
    pub resolved_type: EntryType,
    pub permissions: Option<Permissions>,
    pub hard_links: Option<u64>,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Size in bytes. `None` for directories.
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
    /// Set when the entry is a symlink whose target cannot be stat'ed.
    pub link_error: Option<String>,
    attributes_hidden: bool,
}

/// The target of a symbolic link: the path as stored in the link (possibly
/// relative) and the entry it resolves to.
#[derive(Debug, Clone)]
pub struct LinkTarget {
    pub path: PathBuf,
    pub entry: Entry,
}

struct EntryInner {
    path: PathBuf,
    name: String,
    metadata: OnceCell<Result<Metadata, String>>,
    link_target: OnceCell<Option<LinkTarget>>,
}

/// A single filesystem item.
///
/// Entries are immutable and cheap to clone. Metadata is fetched from the
/// OS the first time it is needed and cached for the lifetime of the
/// instance; refreshing a directory produces new `Entry` values.
#[derive(Clone)]
pub struct Entry(Arc<EntryInner>);

impl Entry {
    /// Creates an entry for `path` without touching the filesystem.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().nfc().collect::<String>())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self(Arc::new(EntryInner {
            path,
            name,
            metadata: OnceCell::new(),
            link_target: OnceCell::new(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }

    /// The last path component, NFC-normalised.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the metadata, fetching it on first use.
    pub fn metadata(&self) -> Result<&Metadata, &str> {
        self.0
            .metadata
            .get_or_init(|| fetch_metadata(&self.0.path))
            .as_ref()
            .map_err(String::as_str)
    }

    /// The entry's own type; `Unknown` when metadata could not be read.
    pub fn entry_type(&self) -> EntryType {
        self.metadata()
            .map(|m| m.entry_type)
            .unwrap_or(EntryType::Unknown)
    }

    /// The type after following symlinks.
    pub fn resolved_type(&self) -> EntryType {
        self.metadata()
            .map(|m| m.resolved_type)
            .unwrap_or(EntryType::Unknown)
    }

    /// `true` for directories and links that resolve to a directory.
    pub fn is_dir(&self) -> bool {
        self.resolved_type() == EntryType::Directory
    }

    /// `true` for regular files and links that resolve to one.
    pub fn is_file(&self) -> bool {
        self.resolved_type() == EntryType::RegularFile
    }

    pub fn is_symlink(&self) -> bool {
        self.entry_type() == EntryType::SymbolicLink
    }

    /// The metadata error or the broken-link error, if any.
    pub fn error(&self) -> Option<&str> {
        match self.metadata() {
            Err(e) => Some(e),
            Ok(m) => m.link_error.as_deref(),
        }
    }

    /// Dot-prefixed names on POSIX; the hidden attribute on Windows.
    pub fn is_hidden(&self) -> bool {
        if cfg!(windows) {
            self.metadata().map(|m| m.attributes_hidden).unwrap_or(false)
        } else {
            self.name().starts_with('.')
        }
    }

    pub fn size(&self) -> Option<u64> {
        self.metadata().ok().and_then(|m| m.size)
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.metadata().ok().and_then(|m| m.modified)
    }

    pub fn permissions(&self) -> Option<Permissions> {
        self.metadata().ok().and_then(|m| m.permissions)
    }

    /// The link target, read lazily. `None` for non-links and unreadable links.
    pub fn link_target(&self) -> Option<&LinkTarget> {
        self.0
            .link_target
            .get_or_init(|| {
                if !self.is_symlink() {
                    return None;
                }
                let target = std::fs::read_link(&self.0.path).ok()?;
                let absolute = match self.0.path.parent() {
                    Some(parent) => crate::fs::ops::normalize(&parent.join(&target)),
                    None => target.clone(),
                };
                Some(LinkTarget {
                    path: target,
                    entry: Entry::new(absolute),
                })
            })
            .as_ref()
    }

    /// Follows the link chain for display, stopping after
    /// [`MAX_LINK_DEPTH`] hops or when a path repeats.
    pub fn link_chain(&self) -> Vec<&LinkTarget> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&Path> = HashSet::from([self.path()]);
        let mut current = self;
        while let Some(target) = current.link_target() {
            if chain.len() >= MAX_LINK_DEPTH || !seen.insert(target.entry.path()) {
                break;
            }
            chain.push(target);
            current = &target.entry;
        }
        chain
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.0.path == other.0.path
    }
}

impl Eq for Entry {}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.0.path)
            .field("metadata", &self.0.metadata.get())
            .finish()
    }
}

impl Filterable for Entry {
    fn filter_key(&self) -> &str {
        self.name()
    }
}

fn fetch_metadata(path: &Path) -> Result<Metadata, String> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| e.to_string())?;
    let entry_type = EntryType::of(meta.file_type());

    let (resolved_type, link_error) = if entry_type == EntryType::SymbolicLink {
        // The OS bounds the hop count here (ELOOP), so cycles end up as errors.
        match std::fs::metadata(path) {
            Ok(target) => (EntryType::of(target.file_type()), None),
            Err(e) => (EntryType::Unknown, Some(format!("broken link: {e}"))),
        }
    } else {
        (entry_type, None)
    };

    let platform = platform_metadata(&meta);

    Ok(Metadata {
        entry_type,
        resolved_type,
        permissions: platform.permissions,
        hard_links: platform.hard_links,
        owner: platform.owner,
        group: platform.group,
        size: if meta.is_dir() { None } else { Some(meta.len()) },
        modified: meta.modified().ok(),
        link_error,
        attributes_hidden: platform.hidden,
    })
}

#[derive(Default)]
struct PlatformMetadata {
    permissions: Option<Permissions>,
    hard_links: Option<u64>,
    owner: Option<String>,
    group: Option<String>,
    hidden: bool,
}

#[cfg(unix)]
fn platform_metadata(meta: &std::fs::Metadata) -> PlatformMetadata {
    use std::os::unix::fs::MetadataExt;

    PlatformMetadata {
        permissions: Some(Permissions::from_mode(meta.mode())),
        hard_links: Some(meta.nlink()),
        owner: crate::fs::unix::user_name(meta.uid()),
        group: crate::fs::unix::group_name(meta.gid()),
        hidden: false,
    }
}

#[cfg(windows)]
fn platform_metadata(meta: &std::fs::Metadata) -> PlatformMetadata {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    PlatformMetadata {
        hidden: meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0,
        ..PlatformMetadata::default()
    }
}

#[cfg(not(any(unix, windows)))]
fn platform_metadata(_meta: &std::fs::Metadata) -> PlatformMetadata {
    PlatformMetadata::default()
}
