/*!
 * Core types and data structures for ctxpack
 */

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Kind of filesystem node discovered by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(tag = "type")]
pub enum EntryKind {
    /// Directory that was listed (and descended into when not a symlink)
    Directory,
    /// Regular file, or a symlink that does not resolve to a directory
    File,
    /// Directory whose contents could not be read
    ErrorDirectory {
        /// Underlying access failure
        error: String,
    },
}

/// One node of a scan result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Root-relative path with `/` separators, `""` for the root
    pub path: String,
    /// Display name
    pub name: String,
    /// Number of path segments below the root
    pub depth: usize,
    /// Node kind
    pub kind: EntryKind,
    /// Selection flag, only changed through the selection module
    included: bool,
}

impl Entry {
    /// Synthetic root entry
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(String::new(), name, 0, EntryKind::Directory)
    }

    /// Create an entry; everything except error directories starts included
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        depth: usize,
        kind: EntryKind,
    ) -> Self {
        let included = !matches!(kind, EntryKind::ErrorDirectory { .. });
        Self {
            path: path.into(),
            name: name.into(),
            depth,
            kind,
            included,
        }
    }

    pub fn included(&self) -> bool {
        self.included
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Directories and the root; error directories are not counted
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self.kind, EntryKind::ErrorDirectory { .. })
    }

    /// Access failure text for error directories
    pub fn error_detail(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::ErrorDirectory { error } => Some(error),
            _ => None,
        }
    }

    /// Path of the containing entry, `None` for the root
    pub fn parent_path(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(self.path.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    /// Whether `self` lies strictly below the entry at `ancestor`
    pub fn is_descendant_of(&self, ancestor: &str) -> bool {
        if ancestor.is_empty() {
            return !self.is_root();
        }
        self.path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Returns true if the flag actually changed. Error directories never change.
    pub(crate) fn set_included(&mut self, value: bool) -> bool {
        if !self.is_selectable() || self.included == value {
            return false;
        }
        self.included = value;
        true
    }

    /// Turn a listed directory into an unreadable one
    pub(crate) fn mark_unreadable(&mut self, error: String) {
        self.kind = EntryKind::ErrorDirectory { error };
        self.included = false;
    }
}

/// How a scan ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    /// At least one item below the root was found
    Complete {
        /// Entries excluding the root
        items: usize,
        /// Directories recorded as unreadable
        unreadable: usize,
    },
    /// The root has no children at all
    Empty,
    /// The root has children but every one was excluded
    Filtered,
    /// Traversal stopped on an unexpected failure; entries are partial
    Aborted {
        /// Failure category
        kind: String,
        /// Failure message
        message: String,
    },
}

impl ScanStatus {
    /// User-facing summary line
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Complete { items, unreadable } => {
                let mut line = format!("Found {} items (excluding root). Scan complete.", items);
                match unreadable {
                    0 => {}
                    1 => line.push_str(" 1 unreadable directory."),
                    n => line.push_str(&format!(" {} unreadable directories.", n)),
                }
                line
            }
            Self::Empty => "Project directory appears to be empty or inaccessible.".to_string(),
            Self::Filtered => "No displayable files or sub-directories found (all might be excluded or filtered).".to_string(),
            Self::Aborted { kind, message } => format!(
                "An unexpected error occurred while scanning: {}: {}",
                kind, message
            ),
        }
    }
}

/// Result of one scan invocation
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Entries in scan order, root first
    pub entries: Vec<Entry>,
    /// Human-readable summary
    pub diagnostic: String,
    /// Machine-readable outcome
    pub status: ScanStatus,
}

impl ScanResult {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, ScanStatus::Complete { .. })
    }
}
