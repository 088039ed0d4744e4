/*!
 * Directory scanning and filtering
 *
 * Produces a flat, depth-first entry list: the root first, then at every
 * level all directories before all files, each group ordered by
 * case-insensitive name.
 */

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob_match::glob_match;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{CtxError, Result};
use crate::types::{Entry, EntryKind, ScanResult, ScanStatus};
use crate::utils::is_excluded;

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self { config, progress }
    }

    /// Scan the target directory into an ordered entry list
    pub fn scan(&self) -> Result<ScanResult> {
        let root = resolve_root(&self.config.target_dir)?;
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        let output_dir = fs::canonicalize(&self.config.output_dir).ok();

        let mut entries = vec![Entry::root(root_name)];
        let mut unreadable = 0;

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by(sibling_order)
            .into_iter()
            // min_depth still runs the predicate on the root
            .filter_entry(|e| e.depth() == 0 || !self.should_ignore(e, output_dir.as_deref()));

        for item in walker {
            match item {
                Ok(dir_entry) => {
                    let entry = to_entry(&root, &dir_entry);
                    debug!(path = %entry.path, kind = %entry.kind, "scanned");
                    self.progress.inc(1);
                    self.progress.set_message(format!("Scanning: {}", entry.path));
                    entries.push(entry);
                }
                Err(err) if is_permission_denied(&err) => {
                    if record_unreadable(&root, &mut entries, &err) {
                        unreadable += 1;
                    }
                }
                Err(err) => {
                    let kind = failure_kind(&err);
                    let message = err.to_string();
                    warn!(%kind, %message, "scan aborted");
                    let status = ScanStatus::Aborted { kind, message };
                    return Ok(ScanResult {
                        diagnostic: status.diagnostic(),
                        entries,
                        status,
                    });
                }
            }
        }

        let items = entries.len() - 1;
        let status = if items > 0 {
            ScanStatus::Complete { items, unreadable }
        } else if root_has_children(&root) {
            ScanStatus::Filtered
        } else {
            ScanStatus::Empty
        };

        info!(root = %root.display(), items, unreadable, "scan finished");

        Ok(ScanResult {
            diagnostic: status.diagnostic(),
            entries,
            status,
        })
    }

    /// Check if an entry is dropped by the fixed rules, custom patterns or
    /// because it is the output directory
    pub fn should_ignore(&self, entry: &DirEntry, output_dir: Option<&Path>) -> bool {
        let name = entry.file_name().to_string_lossy();
        let is_dir = is_dir_like(entry);

        if is_excluded(&name, is_dir) {
            return true;
        }

        if self
            .config
            .ignore_patterns
            .iter()
            .any(|pattern| glob_match(pattern, &name))
        {
            return true;
        }

        is_dir && output_dir.is_some_and(|out| entry.path() == out)
    }
}

/// Canonicalize the root and make sure it can be listed
fn resolve_root(target: &Path) -> Result<PathBuf> {
    let invalid = |e: io::Error| CtxError::InvalidRoot(format!("{}: {}", target.display(), e));

    let root = fs::canonicalize(target).map_err(invalid)?;
    if !root.is_dir() {
        return Err(CtxError::InvalidRoot(target.display().to_string()));
    }
    fs::read_dir(&root).map_err(invalid)?;

    Ok(root)
}

/// Directories first, then case-insensitive name
fn sibling_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    is_dir_like(b).cmp(&is_dir_like(a)).then_with(|| {
        let a_name = a.file_name().to_string_lossy();
        let b_name = b.file_name().to_string_lossy();
        a_name
            .to_lowercase()
            .cmp(&b_name.to_lowercase())
            .then_with(|| a_name.cmp(&b_name))
    })
}

/// Directories, including symlinks that resolve to one
fn is_dir_like(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn to_entry(root: &Path, dir_entry: &DirEntry) -> Entry {
    let kind = if is_dir_like(dir_entry) {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    Entry::new(
        relative_path(root, dir_entry.path()),
        dir_entry.file_name().to_string_lossy(),
        dir_entry.depth(),
        kind,
    )
}

/// Root-relative path joined with `/` on every platform
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_permission_denied(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied)
}

/// Turn the directory behind `err` into an error entry. Returns false when
/// nothing new was recorded.
fn record_unreadable(root: &Path, entries: &mut Vec<Entry>, err: &walkdir::Error) -> bool {
    let detail = err
        .io_error()
        .map(ToString::to_string)
        .unwrap_or_else(|| err.to_string());
    let Some(path) = err.path() else {
        warn!(error = %detail, "permission denied on unknown path");
        return false;
    };
    let rel = relative_path(root, path);
    warn!(path = %rel, error = %detail, "permission denied, recorded as error entry");

    // walkdir reports the failure right after yielding the directory itself
    match entries.iter().rposition(|e| e.path == rel) {
        Some(index) if entries[index].is_dir() => {
            entries[index].mark_unreadable(detail);
            true
        }
        Some(_) => false,
        None => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "Access Denied".to_string());
            let depth = rel.split('/').count();
            entries.push(Entry::new(
                rel,
                name,
                depth,
                EntryKind::ErrorDirectory { error: detail },
            ));
            true
        }
    }
}

fn failure_kind(err: &walkdir::Error) -> String {
    if err.loop_ancestor().is_some() {
        return "FilesystemLoop".to_string();
    }
    err.io_error()
        .map(|e| format!("{:?}", e.kind()))
        .unwrap_or_else(|| "WalkError".to_string())
}

/// Raw listing probe used to tell "empty" from "everything filtered"
fn root_has_children(root: &Path) -> bool {
    fs::read_dir(root)
        .map(|mut listing| listing.next().is_some())
        .unwrap_or(false)
}
