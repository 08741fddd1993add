//! Assistant view state and task submission
//!
//! The view collects up to [`MAX_REFERENCE_FILES`] reference files, one
//! [`TaskType`] and an optional note. Submitting runs the workflow for the
//! sidebar-selected file, stores the raw response under a fresh id and
//! hands back the route of the result view.

use crate::dify::{DifyError, TaskType, WorkflowRequest, WorkflowRunner};
use crate::files::FilesState;
use crate::route::Route;
use crate::store::Store;
use crate::util::{pseudo_user, short_id};
use thiserror::Error;
use tracing::{error, info};

pub const MAX_REFERENCE_FILES: usize = 3;

/// What toggling a reference file did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Already at [`MAX_REFERENCE_FILES`]; nothing changed
    Full,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantState {
    selected_ids: Vec<String>,
    task: TaskType,
    loading: bool,
    note: String,
}

impl AssistantState {
    pub fn selected_ids(&self) -> &[String] {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }

    pub fn toggle_file(&mut self, id: &str) -> Toggle {
        if let Some(pos) = self.selected_ids.iter().position(|s| s == id) {
            self.selected_ids.remove(pos);
            return Toggle::Removed;
        }
        if self.selected_ids.len() >= MAX_REFERENCE_FILES {
            return Toggle::Full;
        }
        self.selected_ids.push(id.to_string());
        Toggle::Added
    }

    /// Forget reference files that were deleted from the sidebar.
    pub fn prune(&mut self, state: &FilesState) {
        self.selected_ids.retain(|id| state.contains(id));
    }

    pub fn task(&self) -> TaskType {
        self.task
    }

    /// Move the task selection, wrapping at both ends.
    pub fn cycle_task(&mut self, offset: isize) {
        let len = TaskType::ALL.len() as isize;
        let next = (self.task.index() as isize + offset).rem_euclid(len) as usize;
        if let Some(task) = TaskType::from_index(next) {
            self.task = task;
        }
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: String) {
        self.note = note;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Enter the submitting state. Returns false if a request is already running.
    pub fn begin_submit(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_submit(&mut self) {
        self.loading = false;
    }
}

/// Everything a background submission needs, captured at submit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub file_id: String,
    pub filename: String,
    pub task: TaskType,
    pub note: String,
    pub user_prefix: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Workflow(#[from] DifyError),
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    #[error("store task did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Workflow(err) => err.user_message(),
            SubmitError::Encode(_) => "Could not build the workflow request".to_string(),
            SubmitError::Store(err) => format!("Could not save the result: {}", err),
            SubmitError::Join(_) => "Could not access the data directory".to_string(),
        }
    }
}

/// Run the workflow for one file and store the response.
///
/// On success the raw JSON is written under a new result id and the result
/// route is returned. On failure nothing is written.
pub async fn run_task<R>(
    runner: &R,
    store: &Store,
    submission: &Submission,
) -> Result<Route, SubmitError>
where
    R: WorkflowRunner + ?Sized,
{
    let result = submit(runner, store, submission).await;
    if let Err(err) = &result {
        error!(file = %submission.filename, error = %err, "workflow task failed");
    }
    result
}

async fn submit<R>(runner: &R, store: &Store, submission: &Submission) -> Result<Route, SubmitError>
where
    R: WorkflowRunner + ?Sized,
{
    // Store access takes a file lock that may wait; keep it off the runtime workers.
    let code = {
        let store = store.clone();
        let file_id = submission.file_id.clone();
        tokio::task::spawn_blocking(move || store.code_for(&file_id)).await?
    };
    let request = WorkflowRequest::single_file(
        &submission.filename,
        &code,
        submission.task,
        &submission.note,
        pseudo_user(&submission.user_prefix),
    )?;

    let raw = runner.run(&request).await?;

    let rid = short_id();
    {
        let store = store.clone();
        let rid = rid.clone();
        tokio::task::spawn_blocking(move || store.save_result(&rid, &raw)).await??;
    }
    info!(rid = %rid, task = submission.task.label(), "workflow result stored");
    Ok(Route::result(rid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeMap;
    use crate::dify::parse_outcome;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FakeRunner {
        response: Option<Value>,
        seen: Mutex<Vec<WorkflowRequest>>,
    }

    impl FakeRunner {
        fn new(response: Option<Value>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WorkflowRunner for FakeRunner {
        async fn run(&self, request: &WorkflowRequest) -> Result<Value, DifyError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone().ok_or(DifyError::Http {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    fn submission() -> Submission {
        Submission {
            file_id: "f1".into(),
            filename: "main.rs".into(),
            task: TaskType::AddComments,
            note: "keep it short".into(),
            user_prefix: "test".into(),
        }
    }

    fn store_with_code() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let mut map = CodeMap::new();
        map.insert("f1".into(), "fn main() {}".into());
        store.save_code_map(&map).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_success_stores_result_and_routes_to_it() {
        let (_dir, store) = store_with_code();
        let response = json!({ "data": { "status": "succeeded", "outputs": {
            "structured_output_1": { "files": [{ "name": "main.rs", "code": "// hi\nfn main() {}" }] }
        }}});
        let runner = FakeRunner::new(Some(response.clone()));

        let route = run_task(&runner, &store, &submission()).await.unwrap();
        let rid = route.rid().unwrap().to_string();
        assert_eq!(route.to_string(), format!("/result?rid={}", rid));

        let raw = store.load_result_raw(&rid).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), response);
        assert_eq!(
            parse_outcome(&raw).unwrap().code.as_deref(),
            Some("// hi\nfn main() {}")
        );

        let seen = runner.seen.lock().unwrap();
        let body = serde_json::to_value(&seen[0]).unwrap();
        assert_eq!(body["inputs"]["task_type"], "コメントアウトの追加");
        assert_eq!(body["inputs"]["note"], "keep it short");
        assert!(body["inputs"]["files"].as_str().unwrap().contains("fn main() {}"));
        assert!(body["user"].as_str().unwrap().starts_with("test-"));
    }

    #[tokio::test]
    async fn test_failure_stores_nothing() {
        let (_dir, store) = store_with_code();
        let runner = FakeRunner::new(None);

        let err = run_task(&runner, &store, &submission()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Workflow(DifyError::Http { status: 500, .. })));
        assert!(store.list_results().is_empty());
    }

    #[tokio::test]
    async fn test_missing_code_is_sent_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let runner = FakeRunner::new(Some(json!({ "outputs": { "summary": "empty file" } })));

        run_task(&runner, &store, &submission()).await.unwrap();
        let seen = runner.seen.lock().unwrap();
        let files: Value = serde_json::from_str(&seen[0].inputs.files).unwrap();
        assert_eq!(files, json!([{ "name": "main.rs", "content": "" }]));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_waiting_for_the_store_lock_does_not_stall_the_runtime() {
        use fs2::FileExt;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use std::time::Duration;

        let (_dir, store) = store_with_code();
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(store.dir().join(".lock"))
            .unwrap();
        FileExt::lock_exclusive(&lock_file).unwrap();
        let holder = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            FileExt::unlock(&lock_file).unwrap();
        });

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let runner = FakeRunner::new(Some(json!({ "outputs": { "summary": "ok" } })));
        run_task(&runner, &store, &submission()).await.unwrap();
        let ticked = ticks.load(Ordering::SeqCst);
        ticker.abort();
        holder.join().unwrap();

        assert!(ticked >= 5, "runtime only ticked {} times", ticked);
    }

    #[test]
    fn test_fourth_reference_file_is_rejected() {
        let mut state = AssistantState::default();
        for id in ["a", "b", "c"] {
            assert_eq!(state.toggle_file(id), Toggle::Added);
        }
        assert_eq!(state.toggle_file("d"), Toggle::Full);
        assert_eq!(state.selected_ids(), ["a", "b", "c"]);

        assert_eq!(state.toggle_file("b"), Toggle::Removed);
        assert_eq!(state.toggle_file("d"), Toggle::Added);
        assert_eq!(state.selected_ids(), ["a", "c", "d"]);
    }

    #[test]
    fn test_prune_drops_deleted_files() {
        let mut state = AssistantState::default();
        state.toggle_file("a");
        state.toggle_file("gone");
        let files: FilesState = serde_json::from_value(json!({
            "files": [{ "id": "a", "name": "a.rs" }],
            "selectedId": "a"
        }))
        .unwrap();
        state.prune(&files);
        assert_eq!(state.selected_ids(), ["a"]);
    }

    #[test]
    fn test_submit_is_ignored_while_loading() {
        let mut state = AssistantState::default();
        assert!(state.begin_submit());
        assert!(!state.begin_submit());
        state.finish_submit();
        assert!(state.begin_submit());
    }

    #[test]
    fn test_cycle_task_wraps() {
        let mut state = AssistantState::default();
        state.cycle_task(-1);
        assert_eq!(state.task(), TaskType::AddComments);
        state.cycle_task(1);
        assert_eq!(state.task(), TaskType::FixErrors);
    }
}
