//! File registry backing the sidebar
//!
//! Holds the ordered file list and the current selection. The registry is
//! plain state; [`crate::workspace::Workspace`] persists and publishes it
//! after every change.

use crate::util::short_id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A user-created named slot holding code text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub id: String,
    pub name: String,
}

/// The persisted file list record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesState {
    #[serde(default)]
    pub files: Vec<FileItem>,
    #[serde(default, rename = "selectedId")]
    pub selected_id: Option<String>,
}

impl FilesState {
    pub fn get(&self, id: &str) -> Option<&FileItem> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<&FileItem> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.id.as_str())
    }

    /// Clear a selection that points at a file no longer in the list.
    pub fn normalized(mut self) -> Self {
        if let Some(id) = self.selected_id.as_deref() {
            if !self.contains(id) {
                self.selected_id = None;
            }
        }
        self
    }

    fn select_first(&mut self) {
        self.selected_id = self.files.first().map(|f| f.id.clone());
    }
}

/// Pick a name that does not collide with `taken`: `name`, `name(1)`, `name(2)`, ...
pub fn dedupe_name(base: &str, taken: &HashSet<&str>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while taken.contains(candidate.as_str()) {
        candidate = format!("{}({})", base, n);
        n += 1;
    }
    candidate
}

/// What a name confirmation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    /// The name was committed (possibly with a suffix)
    Named(String),
    /// The pending file was dropped because the name was empty
    Removed,
    /// A rename of an existing file was abandoned
    Unchanged,
    /// No file with that id
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    state: FilesState,
    editing_id: Option<String>,
}

impl FileRegistry {
    pub fn new(state: FilesState) -> Self {
        Self {
            state: state.normalized(),
            editing_id: None,
        }
    }

    pub fn state(&self) -> &FilesState {
        &self.state
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Append an unnamed file, select it and enter edit mode. Returns the new id.
    pub fn add_file(&mut self) -> String {
        let id = loop {
            let candidate = short_id();
            if !self.state.contains(&candidate) {
                break candidate;
            }
        };
        self.state.files.push(FileItem {
            id: id.clone(),
            name: String::new(),
        });
        self.state.selected_id = Some(id.clone());
        self.editing_id = Some(id.clone());
        id
    }

    /// Re-enter edit mode for an existing file.
    pub fn begin_rename(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            return false;
        }
        self.editing_id = Some(id.to_string());
        true
    }

    /// Commit the name typed for `id`.
    pub fn confirm_name(&mut self, id: &str, raw: &str) -> NameOutcome {
        let Some(current) = self.state.get(id) else {
            if self.editing_id.as_deref() == Some(id) {
                self.editing_id = None;
            }
            return NameOutcome::Unknown;
        };
        let pending = current.name.is_empty();
        self.editing_id = None;

        let name = raw.trim();
        if name.is_empty() {
            if !pending {
                return NameOutcome::Unchanged;
            }
            self.state.files.retain(|f| f.id != id);
            if self.state.selected_id.as_deref() == Some(id) {
                self.state.select_first();
            }
            return NameOutcome::Removed;
        }

        let taken: HashSet<&str> = self
            .state
            .files
            .iter()
            .filter(|f| f.id != id)
            .map(|f| f.name.as_str())
            .collect();
        let final_name = dedupe_name(name, &taken);

        if let Some(file) = self.state.files.iter_mut().find(|f| f.id == id) {
            file.name = final_name.clone();
        }
        self.state.selected_id = Some(id.to_string());
        NameOutcome::Named(final_name)
    }

    /// Leave the name editor without typing anything.
    pub fn cancel_edit(&mut self, id: &str) -> NameOutcome {
        self.confirm_name(id, "")
    }

    /// Remove a file. When it was selected, the new first file (or nothing) is selected.
    pub fn delete_file(&mut self, id: &str) -> bool {
        let before = self.state.files.len();
        self.state.files.retain(|f| f.id != id);
        if self.state.files.len() == before {
            return false;
        }
        if self.state.selected_id.as_deref() == Some(id) {
            self.state.select_first();
        }
        if self.editing_id.as_deref() == Some(id) {
            self.editing_id = None;
        }
        true
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.state.contains(id) || self.state.selected_id.as_deref() == Some(id) {
            return false;
        }
        self.state.selected_id = Some(id.to_string());
        true
    }

    /// Select the file `offset` positions away from the current one, clamped to the list.
    pub fn select_relative(&mut self, offset: isize) -> bool {
        if self.state.files.is_empty() {
            return false;
        }
        let current = self
            .state
            .selected_id
            .as_deref()
            .and_then(|id| self.state.position(id))
            .unwrap_or(0) as isize;
        let last = self.state.files.len() as isize - 1;
        let next = (current + offset).clamp(0, last) as usize;
        let id = self.state.files[next].id.clone();
        self.select(&id)
    }

    /// Adopt a state written by another process. Edit mode survives only if
    /// the file being edited still exists.
    pub fn replace_state(&mut self, state: FilesState) {
        self.state = state.normalized();
        if let Some(id) = self.editing_id.as_deref() {
            if !self.state.contains(id) {
                self.editing_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(registry: &mut FileRegistry, name: &str) -> String {
        let id = registry.add_file();
        registry.confirm_name(&id, name);
        id
    }

    fn assert_selection_valid(registry: &FileRegistry) {
        let state = registry.state();
        if let Some(id) = state.selected_id.as_deref() {
            assert!(state.contains(id), "selection {} dangles", id);
        }
    }

    #[test]
    fn test_add_file_selects_and_edits() {
        let mut registry = FileRegistry::default();
        let id = registry.add_file();
        assert_eq!(registry.state().selected_id.as_deref(), Some(id.as_str()));
        assert_eq!(registry.editing_id(), Some(id.as_str()));
        assert_eq!(registry.state().get(&id).unwrap().name, "");
    }

    #[test]
    fn test_confirm_trims_and_selects() {
        let mut registry = FileRegistry::default();
        let first = named(&mut registry, "a.rs");
        let id = registry.add_file();
        registry.select(&first);

        let outcome = registry.confirm_name(&id, "  b.rs  ");
        assert_eq!(outcome, NameOutcome::Named("b.rs".into()));
        assert_eq!(registry.state().selected_id.as_deref(), Some(id.as_str()));
        assert!(!registry.is_editing());
    }

    #[test]
    fn test_duplicate_names_get_numeric_suffixes() {
        let mut registry = FileRegistry::default();
        named(&mut registry, "main.rs");
        let second = named(&mut registry, "main.rs");
        let third = named(&mut registry, "main.rs");

        let state = registry.state();
        assert_eq!(state.get(&second).unwrap().name, "main.rs(1)");
        assert_eq!(state.get(&third).unwrap().name, "main.rs(2)");
    }

    #[test]
    fn test_renaming_to_own_name_keeps_it() {
        let mut registry = FileRegistry::default();
        let id = named(&mut registry, "lib.rs");
        registry.begin_rename(&id);
        assert_eq!(
            registry.confirm_name(&id, "lib.rs"),
            NameOutcome::Named("lib.rs".into())
        );
    }

    #[test]
    fn test_dedupe_name_skips_taken_suffixes() {
        let taken: HashSet<&str> = ["x", "x(1)", "x(3)"].into_iter().collect();
        assert_eq!(dedupe_name("x", &taken), "x(2)");
        assert_eq!(dedupe_name("y", &taken), "y");
    }

    #[test]
    fn test_empty_name_removes_pending_file() {
        let mut registry = FileRegistry::default();
        let first = named(&mut registry, "a.rs");
        let pending = registry.add_file();

        assert_eq!(registry.confirm_name(&pending, "   "), NameOutcome::Removed);
        assert!(!registry.state().contains(&pending));
        assert_eq!(registry.state().selected_id.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_empty_name_on_only_file_clears_selection() {
        let mut registry = FileRegistry::default();
        let pending = registry.add_file();
        registry.cancel_edit(&pending);
        assert!(registry.state().files.is_empty());
        assert_eq!(registry.state().selected_id, None);
    }

    #[test]
    fn test_empty_rename_keeps_existing_name() {
        let mut registry = FileRegistry::default();
        let id = named(&mut registry, "keep.rs");
        registry.begin_rename(&id);
        assert_eq!(registry.confirm_name(&id, ""), NameOutcome::Unchanged);
        assert_eq!(registry.state().get(&id).unwrap().name, "keep.rs");
    }

    #[test]
    fn test_delete_selected_selects_new_first() {
        let mut registry = FileRegistry::default();
        let a = named(&mut registry, "a");
        let b = named(&mut registry, "b");
        let c = named(&mut registry, "c");

        registry.select(&a);
        assert!(registry.delete_file(&a));
        assert_eq!(registry.state().selected_id.as_deref(), Some(b.as_str()));

        registry.select(&c);
        assert!(registry.delete_file(&b));
        assert_eq!(registry.state().selected_id.as_deref(), Some(c.as_str()));

        assert!(registry.delete_file(&c));
        assert_eq!(registry.state().selected_id, None);
        assert!(!registry.delete_file(&c));
    }

    #[test]
    fn test_select_relative_clamps() {
        let mut registry = FileRegistry::default();
        let a = named(&mut registry, "a");
        let b = named(&mut registry, "b");
        registry.select(&a);
        assert!(registry.select_relative(5));
        assert_eq!(registry.state().selected_id.as_deref(), Some(b.as_str()));
        assert!(!registry.select_relative(1));
        assert!(registry.select_relative(-1));
        assert_eq!(registry.state().selected_id.as_deref(), Some(a.as_str()));
    }

    #[test]
    fn test_selection_always_valid_across_operation_sequences() {
        let mut registry = FileRegistry::default();
        let mut ids = Vec::new();
        // Deterministic mix of adds, renames, cancellations, selections and deletes.
        for step in 0..60usize {
            match step % 6 {
                0 | 1 => {
                    let id = registry.add_file();
                    let name = if step % 4 == 0 { "" } else { "dup.rs" };
                    registry.confirm_name(&id, name);
                    ids.push(id);
                }
                2 => {
                    if let Some(id) = ids.get(step % ids.len().max(1)) {
                        registry.select(&id.clone());
                    }
                }
                3 => {
                    if !ids.is_empty() {
                        let id = ids.remove(step % ids.len());
                        registry.delete_file(&id);
                    }
                }
                4 => {
                    let id = registry.add_file();
                    registry.cancel_edit(&id);
                }
                _ => {
                    registry.select_relative(-1);
                }
            }
            assert_selection_valid(&registry);

            let names: Vec<&str> = registry.state().files.iter().map(|f| f.name.as_str()).collect();
            let unique: HashSet<&str> = names.iter().copied().collect();
            assert_eq!(names.len(), unique.len(), "names collide: {:?}", names);
        }
    }

    #[test]
    fn test_replace_state_drops_vanished_edit() {
        let mut registry = FileRegistry::default();
        let id = registry.add_file();
        registry.replace_state(FilesState::default());
        assert!(!registry.is_editing());
        assert!(!registry.state().contains(&id));
    }
}
