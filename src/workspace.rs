//! Shared file-list state with change notification
//!
//! The workspace owns the [`FileRegistry`], writes the file list record on
//! every change and publishes the new [`FilesState`] on a watch channel.
//! Views hold a receiver and react when it changes instead of polling the
//! store themselves. Changes made by another process on the same data
//! directory are picked up by [`Workspace::refresh_from_disk`].

use crate::files::{FileRegistry, FilesState, NameOutcome};
use crate::store::Store;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct Workspace {
    store: Store,
    registry: FileRegistry,
    tx: watch::Sender<FilesState>,
}

impl Workspace {
    pub fn open(store: Store) -> Self {
        let registry = FileRegistry::new(store.load_files_state());
        let (tx, _rx) = watch::channel(registry.state().clone());
        info!(
            dir = %store.dir().display(),
            files = registry.state().files.len(),
            "workspace opened"
        );
        Self {
            store,
            registry,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FilesState> {
        self.tx.subscribe()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> &FilesState {
        self.registry.state()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.registry.editing_id()
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        let state = self.registry.state().clone();
        self.tx.send_replace(state.clone());
        self.store.save_files_state(&state)
    }

    pub fn add_file(&mut self) -> anyhow::Result<String> {
        let id = self.registry.add_file();
        debug!(id = %id, "file added");
        self.commit()?;
        Ok(id)
    }

    pub fn begin_rename(&mut self, id: &str) -> bool {
        self.registry.begin_rename(id)
    }

    pub fn confirm_name(&mut self, id: &str, raw: &str) -> anyhow::Result<NameOutcome> {
        let outcome = self.registry.confirm_name(id, raw);
        if matches!(outcome, NameOutcome::Named(_) | NameOutcome::Removed) {
            debug!(id, ?outcome, "file name confirmed");
            self.commit()?;
        }
        Ok(outcome)
    }

    pub fn cancel_edit(&mut self, id: &str) -> anyhow::Result<NameOutcome> {
        self.confirm_name(id, "")
    }

    pub fn delete_file(&mut self, id: &str) -> anyhow::Result<bool> {
        if !self.registry.delete_file(id) {
            return Ok(false);
        }
        debug!(id, "file deleted");
        self.commit()?;
        Ok(true)
    }

    pub fn select(&mut self, id: &str) -> anyhow::Result<bool> {
        if !self.registry.select(id) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    pub fn select_relative(&mut self, offset: isize) -> anyhow::Result<bool> {
        if !self.registry.select_relative(offset) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Adopt the on-disk record when another writer changed it. Returns
    /// whether anything was published.
    pub fn refresh_from_disk(&mut self) -> bool {
        let on_disk = self.store.load_files_state();
        if &on_disk == self.registry.state() {
            return false;
        }
        debug!(files = on_disk.files.len(), "file list changed on disk");
        self.registry.replace_state(on_disk);
        self.tx.send_replace(self.registry.state().clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(Store::new(dir.path()));
        (dir, ws)
    }

    #[test]
    fn test_changes_are_persisted_and_published() {
        let (_dir, mut ws) = workspace();
        let mut rx = ws.subscribe();

        let id = ws.add_file().unwrap();
        ws.confirm_name(&id, "main.rs").unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.get(&id).unwrap().name, "main.rs");
        assert_eq!(ws.store().load_files_state(), seen);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_unchanged_rename_does_not_publish() {
        let (_dir, mut ws) = workspace();
        let id = ws.add_file().unwrap();
        ws.confirm_name(&id, "a.rs").unwrap();
        let mut rx = ws.subscribe();
        rx.borrow_and_update();

        ws.begin_rename(&id);
        assert_eq!(ws.confirm_name(&id, " ").unwrap(), NameOutcome::Unchanged);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_refresh_picks_up_other_writers() {
        let dir = tempfile::tempdir().unwrap();
        let mut ours = Workspace::open(Store::new(dir.path()));
        let mut theirs = Workspace::open(Store::new(dir.path()));
        let mut rx = ours.subscribe();
        rx.borrow_and_update();

        let id = theirs.add_file().unwrap();
        theirs.confirm_name(&id, "shared.rs").unwrap();

        assert!(ours.refresh_from_disk());
        assert!(rx.has_changed().unwrap());
        assert_eq!(ours.state().get(&id).unwrap().name, "shared.rs");
        assert!(!ours.refresh_from_disk());
    }

    #[test]
    fn test_reopen_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut ws = Workspace::open(Store::new(dir.path()));
            let id = ws.add_file().unwrap();
            ws.confirm_name(&id, "kept.rs").unwrap();
            id
        };
        let ws = Workspace::open(Store::new(dir.path()));
        assert_eq!(ws.state().selected().unwrap().id, id);
    }
}
