/*!
 * Hierarchical include/exclude selection over a scan result
 *
 * The hierarchy is implied by entry paths. Changes cascade downward only:
 * a directory's own flag is never recomputed from its children.
 */

use std::fmt;

use tracing::debug;

use crate::error::{CtxError, Result};
use crate::types::Entry;

/// Set `included` on the entry at `path`, cascading into every descendant
/// when that entry is a directory. Returns how many flags changed.
pub fn toggle(entries: &mut [Entry], path: &str, value: bool) -> Result<usize> {
    let index = entries
        .iter()
        .position(|e| e.path == path)
        .ok_or_else(|| CtxError::UnknownPath(path.to_string()))?;

    let target = &mut entries[index];
    if !target.is_selectable() {
        return Err(CtxError::NotSelectable(path.to_string()));
    }

    let mut changed = usize::from(target.set_included(value));

    if target.is_dir() {
        changed += entries
            .iter_mut()
            .filter(|e| e.is_descendant_of(path))
            .map(|e| usize::from(e.set_included(value)))
            .sum::<usize>();
    }

    debug!(path, value, changed, "toggled");
    Ok(changed)
}

/// Set `included` on every selectable entry. Returns how many flags changed.
pub fn set_all(entries: &mut [Entry], value: bool) -> usize {
    let changed: usize = entries
        .iter_mut()
        .map(|e| usize::from(e.set_included(value)))
        .sum();

    debug!(value, changed, "set all");
    changed
}

/// A selection change requested by a collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    /// Set one entry, cascading into directories
    Toggle { path: String, value: bool },
    /// Set every selectable entry
    SetAll(bool),
}

impl fmt::Display for SelectionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle { path, value } => write!(f, "toggle {:?} -> {}", path, value),
            Self::SetAll(value) => write!(f, "set all -> {}", value),
        }
    }
}

/// Notification emitted once per applied command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// The command that was applied
    pub command: SelectionCommand,
    /// Number of flags that actually flipped
    pub changed: usize,
}

type Observer = Box<dyn FnMut(&SelectionChange, &[Entry])>;

/// Owns a scan's entries and applies selection commands as whole units
pub struct SelectionModel {
    entries: Vec<Entry>,
    observers: Vec<Observer>,
}

impl SelectionModel {
    /// Take ownership of a fresh scan result
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            observers: Vec::new(),
        }
    }

    /// Register a callback that sees the list after each completed command
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SelectionChange, &[Entry]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Apply a command; observers are notified only after the whole
    /// cascade has been written
    pub fn apply(&mut self, command: SelectionCommand) -> Result<SelectionChange> {
        let changed = match &command {
            SelectionCommand::Toggle { path, value } => toggle(&mut self.entries, path, *value)?,
            SelectionCommand::SetAll(value) => set_all(&mut self.entries, *value),
        };

        let change = SelectionChange { command, changed };
        for observer in &mut self.observers {
            observer(&change, &self.entries);
        }

        Ok(change)
    }

    pub fn toggle(&mut self, path: &str, value: bool) -> Result<SelectionChange> {
        self.apply(SelectionCommand::Toggle {
            path: path.to_string(),
            value,
        })
    }

    pub fn set_all(&mut self, value: bool) -> Result<SelectionChange> {
        self.apply(SelectionCommand::SetAll(value))
    }

    /// Keep only `paths` (and whatever they cascade into). Every path is
    /// checked first; on error nothing is changed and nobody is notified.
    pub fn select_only<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<usize> {
        for path in paths {
            let path = path.as_ref();
            let entry = self
                .entries
                .iter()
                .find(|e| e.path == path)
                .ok_or_else(|| CtxError::UnknownPath(path.to_string()))?;
            if !entry.is_selectable() {
                return Err(CtxError::NotSelectable(path.to_string()));
            }
        }

        let mut changed = self.set_all(false)?.changed;
        for path in paths {
            changed += self.toggle(path.as_ref(), true)?.changed;
        }
        Ok(changed)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Included files, in scan order
    pub fn included_files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file() && e.included())
    }

    /// Included paths in scan order, the root shown as the project name
    pub fn selected_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.included())
            .map(|e| {
                if e.is_root() {
                    e.name.clone()
                } else {
                    e.path.clone()
                }
            })
            .collect()
    }
}

impl fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::types::EntryKind;

    fn sample() -> Vec<Entry> {
        vec![
            Entry::root("proj"),
            Entry::new("src", "src", 1, EntryKind::Directory),
            Entry::new("src/core", "core", 2, EntryKind::Directory),
            Entry::new("src/core/lib.rs", "lib.rs", 3, EntryKind::File),
            Entry::new(
                "src/locked",
                "locked",
                2,
                EntryKind::ErrorDirectory {
                    error: "Permission denied".to_string(),
                },
            ),
            Entry::new("src/main.rs", "main.rs", 2, EntryKind::File),
            Entry::new("srcgen.rs", "srcgen.rs", 1, EntryKind::File),
        ]
    }

    fn flags(entries: &[Entry]) -> Vec<bool> {
        entries.iter().map(Entry::included).collect()
    }

    #[test]
    fn cascade_reaches_every_descendant() {
        let mut entries = sample();
        let changed = toggle(&mut entries, "src", false).unwrap();

        assert_eq!(changed, 4);
        assert_eq!(
            flags(&entries),
            vec![true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn sibling_with_shared_prefix_is_untouched() {
        let mut entries = sample();
        toggle(&mut entries, "src", false).unwrap();
        assert!(entries[6].included(), "srcgen.rs is not under src/");
    }

    #[test]
    fn child_toggle_never_touches_ancestors() {
        let mut entries = sample();
        toggle(&mut entries, "src", false).unwrap();
        toggle(&mut entries, "src/main.rs", true).unwrap();

        assert!(!entries[1].included());
        assert!(entries[5].included());

        toggle(&mut entries, "src/core/lib.rs", false).unwrap();
        assert!(entries[0].included());
    }

    #[test]
    fn error_directories_stay_excluded() {
        let mut entries = sample();
        set_all(&mut entries, true);
        toggle(&mut entries, "", true).unwrap();
        assert!(!entries[4].included());

        let err = toggle(&mut entries, "src/locked", true).unwrap_err();
        assert!(matches!(err, CtxError::NotSelectable(_)));
        assert!(!entries[4].included());
    }

    #[test]
    fn unknown_path_is_rejected() {
        let mut entries = sample();
        let err = toggle(&mut entries, "nope", false).unwrap_err();
        assert!(matches!(err, CtxError::UnknownPath(_)));
        assert!(entries.iter().all(|e| e.included() || !e.is_selectable()));
    }

    #[test]
    fn root_toggle_covers_everything() {
        let mut entries = sample();
        toggle(&mut entries, "", false).unwrap();
        assert!(entries.iter().all(|e| !e.included()));

        assert_eq!(set_all(&mut entries, true), 6);
    }

    #[test]
    fn observers_see_only_finished_batches() {
        let mut model = SelectionModel::new(sample());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        model.subscribe(move |change, entries| {
            let subtree_consistent = entries
                .iter()
                .filter(|e| e.path == "src" || e.is_descendant_of("src"))
                .filter(|e| e.is_selectable())
                .all(|e| !e.included());
            log.borrow_mut().push((change.changed, subtree_consistent));
        });

        model.toggle("src", false).unwrap();

        assert_eq!(*seen.borrow(), vec![(4, true)]);
    }

    #[test]
    fn select_only_and_selected_paths() {
        let mut model = SelectionModel::new(sample());
        model.select_only(&["src/core"]).unwrap();

        assert_eq!(model.selected_paths(), vec!["src/core", "src/core/lib.rs"]);
        assert_eq!(
            model.included_files().map(|e| e.path.as_str()).collect::<Vec<_>>(),
            vec!["src/core/lib.rs"]
        );

        model.set_all(true).unwrap();
        assert_eq!(model.selected_paths()[0], "proj");
    }

    #[test]
    fn select_only_with_bad_path_changes_nothing() {
        let mut model = SelectionModel::new(sample());
        let notified = Rc::new(RefCell::new(0));
        let count = Rc::clone(&notified);
        model.subscribe(move |_, _| *count.borrow_mut() += 1);
        let before = flags(model.entries());

        let err = model.select_only(&["src/main.rs", "missing"]).unwrap_err();
        assert!(matches!(err, CtxError::UnknownPath(_)));

        let err = model.select_only(&["src/locked"]).unwrap_err();
        assert!(matches!(err, CtxError::NotSelectable(_)));

        assert_eq!(flags(model.entries()), before);
        assert_eq!(*notified.borrow(), 0);
    }
}
