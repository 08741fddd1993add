//! codedock UI - file sidebar plus three views
//!
//! Layout:
//! ╔══════════════════════════════════════════════════════════════╗
//! ║  c o d e d o c k      Editor   Assistant   Result            ║
//! ╠════════════════╦═════════════════════════════════════════════╣
//! ║  FILES         ║  main.rs · rust                             ║
//! ║  ▸ main.rs     ║   1 fn main() {                             ║
//! ║    util.py     ║   2     println!("hi");                     ║
//! ║                ║   3 }                                       ║
//! ╠════════════════╩═════════════════════════════════════════════╣
//! ║  2 files · saved │ a add  r rename  d delete  ? help  q quit  ║
//! ╚══════════════════════════════════════════════════════════════╝
//!
//! All state lives on [`App`]. The runtime feeds it key events and
//! background messages; the renderer only reads it.

pub mod helpers;
pub mod highlight;
pub mod markdown;
pub mod render;
pub mod theme;

pub use render::render;

use crate::assistant::{AssistantState, Submission, Toggle, MAX_REFERENCE_FILES};
use crate::code::CodeStore;
use crate::files::{FileItem, FilesState, NameOutcome};
use crate::language::language_for;
use crate::result::ResultDisplay;
use crate::route::Route;
use crate::store::ResultEntry;
use crate::workspace::Workspace;
use ratatui::style::Style;
use ratatui::text::Line;
use std::time::Instant;
use theme::Theme;
use tokio::sync::watch;
use tracing::warn;
use tui_textarea::{Input, TextArea};

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sidebar,
    Body,
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a file name in the sidebar
    Naming,
    /// Typing the assistant note
    Note,
}

/// Overlay state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    /// Stored results, newest first
    History {
        entries: Vec<ResultEntry>,
        selected: usize,
    },
}

/// Toast notification kind - affects duration and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    /// Duration in seconds before toast expires
    pub fn duration_secs(&self) -> u64 {
        match self {
            ToastKind::Info => 3,
            ToastKind::Success => 3,
            ToastKind::Error => 10,
        }
    }
}

/// Toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created_at: Instant,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(message: &str) -> Self {
        let kind = if message.starts_with('+') {
            ToastKind::Success
        } else if message.contains("failed") || message.contains("error") {
            ToastKind::Error
        } else {
            ToastKind::Info
        };
        Self::with_kind(message, kind)
    }

    pub fn with_kind(message: &str, kind: ToastKind) -> Self {
        Self {
            message: message.to_string(),
            created_at: Instant::now(),
            kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= self.kind.duration_secs()
    }
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    files_rx: watch::Receiver<FilesState>,
    pub code: CodeStore,
    pub editor: TextArea<'static>,
    /// File whose code is loaded in `editor`
    editor_file: Option<String>,
    pub assistant: AssistantState,
    /// Highlighted row of the reference file list
    pub assistant_cursor: usize,
    pub route: Route,
    pub result: ResultDisplay,
    /// `result.code` highlighted once per load
    pub result_lines: Vec<Line<'static>>,
    pub result_scroll: usize,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub overlay: Overlay,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    pub user_prefix: String,
    pub api_ready: bool,
    pub loading_frame: usize,
}

fn build_editor(text: &str) -> TextArea<'static> {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let mut editor = TextArea::new(lines);
    editor.set_cursor_line_style(Style::default());
    editor.set_line_number_style(Theme::text_dim());
    editor.set_style(Theme::text());
    editor
}

impl App {
    pub fn new(workspace: Workspace, code: CodeStore, route: Route) -> Self {
        let files_rx = workspace.subscribe();
        let mut app = Self {
            workspace,
            files_rx,
            code,
            editor: build_editor(""),
            editor_file: None,
            assistant: AssistantState::default(),
            assistant_cursor: 0,
            route: Route::Editor,
            result: ResultDisplay::empty(None),
            result_lines: Vec::new(),
            result_scroll: 0,
            focus: Focus::Sidebar,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            overlay: Overlay::None,
            toast: None,
            should_quit: false,
            user_prefix: String::new(),
            api_ready: false,
            loading_frame: 0,
        };
        let state = app.files().clone();
        app.apply_files_state(&state);
        app.navigate(route);
        app
    }

    pub fn files(&self) -> &FilesState {
        self.workspace.state()
    }

    pub fn selected_file(&self) -> Option<&FileItem> {
        self.files().selected()
    }

    /// Language of the file open in the editor
    pub fn editor_language(&self) -> &'static str {
        language_for(self.selected_file().map(|f| f.name.as_str()))
    }

    pub fn editor_file(&self) -> Option<&str> {
        self.editor_file.as_deref()
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  FILE LIST SUBSCRIPTION
    // ═══════════════════════════════════════════════════════════════════════

    /// React to a published file list. Returns whether anything changed.
    pub fn poll_files(&mut self) -> bool {
        if !self.files_rx.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.files_rx.borrow_and_update().clone();
        self.apply_files_state(&state);
        true
    }

    fn apply_files_state(&mut self, state: &FilesState) {
        let reconciled = self.code.reconcile(state, self.workspace.store());
        self.report(reconciled);
        self.assistant.prune(state);
        self.assistant_cursor = self
            .assistant_cursor
            .min(state.files.len().saturating_sub(1));
        if self.input_mode == InputMode::Naming && self.workspace.editing_id().is_none() {
            self.input_mode = InputMode::Normal;
            self.input_buffer.clear();
        }
        self.sync_editor();
    }

    /// Load the selected file into the editor when the selection moved.
    fn sync_editor(&mut self) {
        let selected = self.files().selected_id.clone();
        if selected == self.editor_file {
            return;
        }
        let text = selected
            .as_deref()
            .map(|id| self.code.code(id))
            .unwrap_or_default();
        self.editor = build_editor(text);
        self.editor_file = selected;
    }

    /// Feed a key to the editor; changed text is saved after the debounce window.
    pub fn editor_input(&mut self, input: impl Into<Input>) {
        let Some(id) = self.editor_file.clone() else {
            return;
        };
        if self.editor.input(input) {
            let text = self.editor.lines().join("\n");
            self.code.edit(&id, text, Instant::now());
        }
    }

    /// Per-iteration housekeeping: debounced saves and the spinner.
    pub fn tick(&mut self, now: Instant) {
        let flushed = self.code.flush_due(now, self.workspace.store());
        self.report(flushed);
        if self.assistant.is_loading() {
            self.loading_frame = self.loading_frame.wrapping_add(1);
        }
    }

    /// Write anything still pending. Called on shutdown.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.code.flush(self.workspace.store())
    }

    fn report<T>(&mut self, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "store write failed");
                self.show_error(&format!("Save failed: {}", err));
                None
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  SIDEBAR
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_file(&mut self) {
        let added = self.workspace.add_file();
        if self.report(added).is_some() {
            self.focus = Focus::Sidebar;
            self.input_mode = InputMode::Naming;
            self.input_buffer.clear();
        }
        self.poll_files();
    }

    pub fn begin_rename(&mut self) {
        let Some(file) = self.selected_file().cloned() else {
            return;
        };
        if self.workspace.begin_rename(&file.id) {
            self.input_mode = InputMode::Naming;
            self.input_buffer = file.name;
        }
    }

    pub fn confirm_naming(&mut self) {
        let Some(id) = self.workspace.editing_id().map(str::to_string) else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let typed = std::mem::take(&mut self.input_buffer);
        self.input_mode = InputMode::Normal;
        let confirmed = self.workspace.confirm_name(&id, &typed);
        if let Some(NameOutcome::Named(name)) = self.report(confirmed) {
            if name != typed.trim() {
                self.show_toast(&format!("Name taken, saved as {}", name));
            }
        }
        self.poll_files();
    }

    pub fn cancel_naming(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::Normal;
        if let Some(id) = self.workspace.editing_id().map(str::to_string) {
            let cancelled = self.workspace.cancel_edit(&id);
            self.report(cancelled);
        }
        self.poll_files();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.files().selected_id.clone() else {
            return;
        };
        let deleted = self.workspace.delete_file(&id);
        self.report(deleted);
        self.poll_files();
    }

    pub fn select_relative(&mut self, offset: isize) {
        let moved = self.workspace.select_relative(offset);
        self.report(moved);
        self.poll_files();
    }

    /// Adopt file list changes written by another process.
    pub fn refresh_from_disk(&mut self) {
        if self.workspace.refresh_from_disk() {
            self.poll_files();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  NAVIGATION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn navigate(&mut self, route: Route) {
        if let Route::Result { rid } = &route {
            let fallback = self.selected_file().map(|f| f.name.clone());
            self.result = ResultDisplay::load(
                self.workspace.store(),
                rid.as_deref(),
                fallback.as_deref(),
            );
            self.result_lines = highlight::highlight_code(&self.result.code, self.result.language);
            self.result_scroll = 0;
        }
        self.route = route;
    }

    /// Switch header tab; the result tab reopens the last shown result.
    pub fn switch_tab(&mut self, index: usize) {
        let route = match index {
            0 => Route::Editor,
            1 => Route::Assistant,
            _ => Route::Result {
                rid: self.result.rid.clone(),
            },
        };
        self.navigate(route);
    }

    pub fn open_history(&mut self) {
        let entries = self.workspace.store().list_results();
        if entries.is_empty() {
            self.show_toast("No stored results yet");
            return;
        }
        self.overlay = Overlay::History {
            entries,
            selected: 0,
        };
    }

    pub fn open_help(&mut self) {
        self.overlay = Overlay::Help { scroll: 0 };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  ASSISTANT
    // ═══════════════════════════════════════════════════════════════════════

    pub fn assistant_move(&mut self, delta: isize) {
        let len = self.files().files.len();
        if len == 0 {
            return;
        }
        let next = (self.assistant_cursor as isize + delta).clamp(0, len as isize - 1);
        self.assistant_cursor = next as usize;
    }

    pub fn toggle_reference(&mut self) {
        let Some(id) = self
            .files()
            .files
            .get(self.assistant_cursor)
            .map(|f| f.id.clone())
        else {
            return;
        };
        if self.assistant.toggle_file(&id) == Toggle::Full {
            self.show_toast(&format!(
                "At most {} reference files",
                MAX_REFERENCE_FILES
            ));
        }
    }

    pub fn begin_note(&mut self) {
        self.input_buffer = self.assistant.note().to_string();
        self.input_mode = InputMode::Note;
    }

    pub fn confirm_note(&mut self) {
        let note = std::mem::take(&mut self.input_buffer);
        self.assistant.set_note(note.trim().to_string());
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_note(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Capture a submission for the sidebar-selected file, entering the
    /// loading state. `None` when there is nothing to submit.
    pub fn prepare_submission(&mut self) -> Option<Submission> {
        if self.assistant.is_loading() {
            return None;
        }
        let Some(file) = self.selected_file().cloned() else {
            self.show_toast("Select a file in the sidebar first");
            return None;
        };
        // the request reads code from the store
        let flushed = self.flush();
        self.report(flushed)?;
        if !self.assistant.begin_submit() {
            return None;
        }
        Some(Submission {
            file_id: file.id,
            filename: file.name,
            task: self.assistant.task(),
            note: self.assistant.note().to_string(),
            user_prefix: self.user_prefix.clone(),
        })
    }

    /// Apply the outcome of a background submission.
    pub fn finish_task(&mut self, outcome: Result<Route, String>) {
        self.assistant.finish_submit();
        match outcome {
            Ok(route) => {
                self.navigate(route);
                self.focus = Focus::Body;
                self.show_toast("+ Result ready");
            }
            Err(message) => self.show_error(&message),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  TOASTS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn show_toast(&mut self, message: &str) {
        self.toast = Some(Toast::new(message));
    }

    pub fn show_error(&mut self, message: &str) {
        self.toast = Some(Toast::with_kind(message, ToastKind::Error));
    }
}
