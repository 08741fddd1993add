//! Local persistence store
//!
//! Key/value records kept as JSON files in the data directory:
//!
//! ```text
//! <data_dir>/
//!   files_state.json      file list + selection
//!   code_map.json         file id -> code text
//!   results/<rid>.json    raw workflow responses (write-once)
//! ```
//!
//! # Error Handling
//!
//! Reads degrade to empty defaults: a missing or corrupt record is never an
//! error for the caller, only a `warn!` in the log. Writes return
//! `anyhow::Result` so callers can decide whether a failed save matters.
//!
//! Writers take an advisory lock on `<data_dir>/.lock` and replace files
//! atomically, so a reader never sees a half-written record. There is no
//! merge: when two processes write the same record the last one wins.

use crate::code::CodeMap;
use crate::files::FilesState;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const FILES_STATE_FILE: &str = "files_state.json";
const CODE_MAP_FILE: &str = "code_map.json";
const RESULTS_DIR: &str = "results";
const LOCK_FILE: &str = ".lock";
const STORE_LOCK_TIMEOUT_SECS: u64 = 5;
const STORE_LOCK_RETRY_MS: u64 = 20;

/// A stored workflow result, as listed in the history overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub rid: String,
    pub saved_at: DateTime<Utc>,
}

/// The store handle. Cheap to clone; every operation goes to disk.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory (`~/.local/share/codedock` on Linux).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("codedock"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn results_dir(&self) -> PathBuf {
        self.dir.join(RESULTS_DIR)
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.results_dir())?;
        Ok(())
    }

    fn lock(&self, exclusive: bool) -> anyhow::Result<StoreLock> {
        if exclusive {
            self.ensure_dir()?;
        } else if !self.dir.exists() {
            return Err(anyhow::anyhow!("Store directory missing"));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;

        let start = Instant::now();
        loop {
            let result = if exclusive {
                FileExt::try_lock_exclusive(&file)
            } else {
                FileExt::try_lock_shared(&file)
            };
            match result {
                Ok(()) => break,
                Err(err) => {
                    if err.kind() != ErrorKind::WouldBlock {
                        return Err(err.into());
                    }
                    if start.elapsed() >= Duration::from_secs(STORE_LOCK_TIMEOUT_SECS) {
                        return Err(anyhow::anyhow!(
                            "Timed out waiting for store lock ({}s)",
                            STORE_LOCK_TIMEOUT_SECS
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(STORE_LOCK_RETRY_MS));
                }
            }
        }

        Ok(StoreLock { file })
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }
        let content = match self.read_locked(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable store record");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable store record");
                None
            }
        }
    }

    fn read_locked(&self, path: &Path) -> anyhow::Result<String> {
        let _lock = self.lock(false)?;
        Ok(fs::read_to_string(path)?)
    }

    fn write_record<T: Serialize>(&self, path: &Path, value: &T) -> anyhow::Result<()> {
        let _lock = self.lock(true)?;
        let content = serde_json::to_string(value)?;
        write_atomic(path, &content)
    }

    /// Load the file list record. Absent or corrupt records read as empty.
    pub fn load_files_state(&self) -> FilesState {
        self.read_record::<FilesState>(&self.dir.join(FILES_STATE_FILE))
            .map(FilesState::normalized)
            .unwrap_or_default()
    }

    pub fn save_files_state(&self, state: &FilesState) -> anyhow::Result<()> {
        self.write_record(&self.dir.join(FILES_STATE_FILE), state)
    }

    /// Load the code map record. Absent or corrupt records read as empty.
    pub fn load_code_map(&self) -> CodeMap {
        self.read_record(&self.dir.join(CODE_MAP_FILE))
            .unwrap_or_default()
    }

    pub fn save_code_map(&self, map: &CodeMap) -> anyhow::Result<()> {
        self.write_record(&self.dir.join(CODE_MAP_FILE), map)
    }

    /// Code text for one file, empty when unknown.
    pub fn code_for(&self, file_id: &str) -> String {
        self.load_code_map().get(file_id).cloned().unwrap_or_default()
    }

    /// Store a raw workflow response. Result records are write-once.
    pub fn save_result(&self, rid: &str, raw: &serde_json::Value) -> anyhow::Result<()> {
        if !is_valid_rid(rid) {
            return Err(anyhow::anyhow!("Invalid result id: {:?}", rid));
        }
        let _lock = self.lock(true)?;
        let path = self.results_dir().join(format!("{}.json", rid));
        if path.exists() {
            return Err(anyhow::anyhow!("Result {} already exists", rid));
        }
        let content = serde_json::to_string(raw)?;
        write_atomic(&path, &content)?;
        debug!(rid, "stored workflow result");
        Ok(())
    }

    /// Raw text of a stored result, if any.
    pub fn load_result_raw(&self, rid: &str) -> Option<String> {
        if !is_valid_rid(rid) {
            return None;
        }
        let path = self.results_dir().join(format!("{}.json", rid));
        if !path.exists() {
            return None;
        }
        match self.read_locked(&path) {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(rid, error = %err, "ignoring unreadable result record");
                None
            }
        }
    }

    /// Stored results, newest first.
    pub fn list_results(&self) -> Vec<ResultEntry> {
        let Ok(read_dir) = fs::read_dir(self.results_dir()) else {
            return Vec::new();
        };

        let mut entries: Vec<ResultEntry> = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                let rid = path.file_stem()?.to_str()?.to_string();
                if !is_valid_rid(&rid) {
                    return None;
                }
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some(ResultEntry {
                    rid,
                    saved_at: DateTime::<Utc>::from(modified),
                })
            })
            .collect();

        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.rid.cmp(&b.rid)));
        entries
    }
}

/// Result ids become file names, so only plain tokens are accepted.
pub fn is_valid_rid(rid: &str) -> bool {
    !rid.is_empty()
        && rid.len() <= 64
        && rid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600));
    }

    #[cfg(windows)]
    {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileItem;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn test_missing_records_read_as_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_files_state(), FilesState::default());
        assert!(store.load_code_map().is_empty());
        assert!(store.load_result_raw("abc").is_none());
        assert!(store.list_results().is_empty());
    }

    #[test]
    fn test_files_state_round_trip_uses_web_field_names() {
        let (_dir, store) = store();
        let state = FilesState {
            files: vec![FileItem {
                id: "a1".into(),
                name: "main.rs".into(),
            }],
            selected_id: Some("a1".into()),
        };
        store.save_files_state(&state).unwrap();

        let raw = fs::read_to_string(store.dir().join(FILES_STATE_FILE)).unwrap();
        assert!(raw.contains("\"selectedId\":\"a1\""));
        assert_eq!(store.load_files_state(), state);
    }

    #[test]
    fn test_corrupt_records_degrade_to_empty() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join(FILES_STATE_FILE), "{not json").unwrap();
        fs::write(store.dir().join(CODE_MAP_FILE), "[1,2,3]").unwrap();

        assert_eq!(store.load_files_state(), FilesState::default());
        assert!(store.load_code_map().is_empty());
    }

    #[test]
    fn test_dangling_selection_is_cleared_on_load() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.dir().join(FILES_STATE_FILE),
            r#"{"files":[{"id":"a","name":"a.rs"}],"selectedId":"gone"}"#,
        )
        .unwrap();
        let state = store.load_files_state();
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.selected_id, None);
    }

    #[test]
    fn test_code_for_unknown_file_is_empty() {
        let (_dir, store) = store();
        let mut map = CodeMap::new();
        map.insert("a".into(), "fn main() {}".into());
        store.save_code_map(&map).unwrap();
        assert_eq!(store.code_for("a"), "fn main() {}");
        assert_eq!(store.code_for("b"), "");
    }

    #[test]
    fn test_results_are_write_once() {
        let (_dir, store) = store();
        let raw = json!({"outputs": {"summary": "ok"}});
        store.save_result("r1", &raw).unwrap();
        assert!(store.save_result("r1", &json!({})).is_err());

        let loaded: serde_json::Value =
            serde_json::from_str(&store.load_result_raw("r1").unwrap()).unwrap();
        assert_eq!(loaded, raw);
    }

    #[test]
    fn test_result_ids_cannot_escape_the_store() {
        let (_dir, store) = store();
        assert!(store.save_result("../evil", &json!({})).is_err());
        assert!(store.load_result_raw("../files_state").is_none());
        assert!(!is_valid_rid(""));
        assert!(is_valid_rid("a1b2c3d4"));
    }

    #[test]
    fn test_list_results_contains_saved_ids() {
        let (_dir, store) = store();
        store.save_result("one", &json!({})).unwrap();
        store.save_result("two", &json!({})).unwrap();
        fs::write(store.results_dir().join("notes.txt"), "ignored").unwrap();

        let mut rids: Vec<String> = store.list_results().into_iter().map(|e| e.rid).collect();
        rids.sort();
        assert_eq!(rids, vec!["one".to_string(), "two".to_string()]);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_utf8_records_degrade_with_a_warning() {
        let (_dir, store) = store();
        store.save_files_state(&FilesState::default()).unwrap();
        store.save_result("bad", &json!({})).unwrap();
        fs::write(store.dir().join(FILES_STATE_FILE), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(store.results_dir().join("bad.json"), [0xc3, 0x28]).unwrap();

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let log = log.clone();
                move || log.clone()
            })
            .with_ansi(false)
            .finish();
        let (state, raw) = tracing::subscriber::with_default(subscriber, || {
            (store.load_files_state(), store.load_result_raw("bad"))
        });

        assert_eq!(state, FilesState::default());
        assert!(raw.is_none());
        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ignoring unreadable store record"));
        assert!(output.contains("ignoring unreadable result record"));
    }
}
