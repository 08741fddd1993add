use crate::ui::App;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Handle key events while a file name is being typed
pub(super) fn handle_naming_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.cancel_naming(),
        KeyCode::Enter => app.confirm_naming(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
    Ok(())
}

/// Handle key events while the assistant note is being typed
pub(super) fn handle_note_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.cancel_note(),
        KeyCode::Enter => app.confirm_note(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
    Ok(())
}
