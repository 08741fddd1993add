use crate::app::background;
use crate::app::RuntimeContext;
use crate::route::Route;
use crate::ui::{App, Focus};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle key events in normal mode (no overlay, no text entry)
pub(super) fn handle_normal_mode(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    match app.focus {
        Focus::Sidebar => handle_sidebar(app, key),
        Focus::Body => match app.route {
            Route::Editor => handle_editor(app, key),
            Route::Assistant => handle_assistant(app, key, ctx),
            Route::Result { .. } => handle_result(app, key),
        },
    }
    Ok(())
}

/// Keys shared by every pane except the editor, which takes text
fn handle_global(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.open_help(),
        KeyCode::Char('h') => app.open_history(),
        KeyCode::Char(c @ '1'..='3') => {
            app.switch_tab(c as usize - '1' as usize);
        }
        _ => return false,
    }
    true
}

fn handle_sidebar(app: &mut App, key: KeyEvent) {
    if handle_global(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_relative(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_relative(-1),
        KeyCode::Char('a') => app.add_file(),
        KeyCode::Char('r') => app.begin_rename(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Enter | KeyCode::Tab | KeyCode::Right => app.focus = Focus::Body,
        _ => {}
    }
}

fn handle_editor(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::BackTab => app.focus = Focus::Sidebar,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match app.flush() {
                Ok(()) => app.show_toast("+ Saved"),
                Err(e) => app.show_error(&format!("Save failed: {}", e)),
            }
        }
        _ => app.editor_input(key),
    }
}

fn handle_assistant(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) {
    if handle_global(app, key) {
        return;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => app.focus = Focus::Sidebar,
        KeyCode::Down | KeyCode::Char('j') => app.assistant_move(1),
        KeyCode::Up | KeyCode::Char('k') => app.assistant_move(-1),
        KeyCode::Char(' ') => app.toggle_reference(),
        KeyCode::Right | KeyCode::Char('l') => app.assistant.cycle_task(1),
        KeyCode::Left => app.assistant.cycle_task(-1),
        KeyCode::Char('n') => app.begin_note(),
        KeyCode::Enter => {
            if let Some(submission) = app.prepare_submission() {
                background::spawn_task(ctx, submission);
            }
        }
        _ => {}
    }
}

fn handle_result(app: &mut App, key: KeyEvent) {
    if handle_global(app, key) {
        return;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => app.focus = Focus::Sidebar,
        KeyCode::Down | KeyCode::Char('j') => app.result_scroll += 1,
        KeyCode::Up | KeyCode::Char('k') => {
            app.result_scroll = app.result_scroll.saturating_sub(1);
        }
        KeyCode::PageDown => app.result_scroll += 10,
        KeyCode::PageUp => app.result_scroll = app.result_scroll.saturating_sub(10),
        KeyCode::Home => app.result_scroll = 0,
        _ => {}
    }
    let last_line = app.result.code.lines().count().saturating_sub(1);
    app.result_scroll = app.result_scroll.min(last_line);
}
