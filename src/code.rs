//! Per-file code text with debounced persistence

use crate::files::FilesState;
use crate::store::Store;
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};
use tracing::debug;

/// File id -> code text
pub type CodeMap = BTreeMap<String, String>;

/// Default debounce window for persisting edits
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Make the map's keys match the file list exactly: drop orphaned entries
/// and add an empty entry for each new file. Returns whether anything changed.
pub fn reconcile(map: &mut CodeMap, state: &FilesState) -> bool {
    let ids: HashSet<&str> = state.ids().collect();
    let before = map.len();
    map.retain(|id, _| ids.contains(id.as_str()));
    let mut changed = map.len() != before;

    for id in ids {
        if !map.contains_key(id) {
            map.insert(id.to_string(), String::new());
            changed = true;
        }
    }
    changed
}

pub struct CodeStore {
    map: CodeMap,
    debounce: Duration,
    save_deadline: Option<Instant>,
}

impl CodeStore {
    pub fn new(map: CodeMap, debounce: Duration) -> Self {
        Self {
            map,
            debounce,
            save_deadline: None,
        }
    }

    pub fn load(store: &Store, debounce: Duration) -> Self {
        Self::new(store.load_code_map(), debounce)
    }

    pub fn map(&self) -> &CodeMap {
        &self.map
    }

    pub fn code(&self, id: &str) -> &str {
        self.map.get(id).map(String::as_str).unwrap_or_default()
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_deadline.is_some()
    }

    /// Run a reconciliation pass against the current file list, persisting if it changed.
    pub fn reconcile(&mut self, state: &FilesState, store: &Store) -> anyhow::Result<bool> {
        if !reconcile(&mut self.map, state) {
            return Ok(false);
        }
        debug!(files = self.map.len(), "code map reconciled");
        store.save_code_map(&self.map)?;
        // The save above already carries any pending edit.
        self.save_deadline = None;
        Ok(true)
    }

    /// Record an edit. The text is visible immediately; the map is written
    /// once `debounce` passes without another edit.
    pub fn edit(&mut self, id: &str, text: String, now: Instant) -> bool {
        let Some(slot) = self.map.get_mut(id) else {
            return false;
        };
        if *slot == text {
            return false;
        }
        *slot = text;
        self.save_deadline = Some(now + self.debounce);
        true
    }

    /// Persist if the debounce window has elapsed. Returns whether a save happened.
    pub fn flush_due(&mut self, now: Instant, store: &Store) -> anyhow::Result<bool> {
        match self.save_deadline {
            Some(deadline) if now >= deadline => {
                self.flush(store)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Persist any pending edit right away.
    pub fn flush(&mut self, store: &Store) -> anyhow::Result<()> {
        if self.save_deadline.take().is_some() {
            store.save_code_map(&self.map)?;
        }
        Ok(())
    }
}
