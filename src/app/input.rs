//! Input handling for codedock
//!
//! Keys go to the text mode first (file naming, note), then to an open
//! overlay, then to the focused pane.

use crate::app::RuntimeContext;
use crate::ui::{App, InputMode, Overlay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

mod normal;
mod overlay;
mod text;

use normal::handle_normal_mode;
use overlay::handle_overlay_input;
use text::{handle_naming_input, handle_note_input};

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN INPUT DISPATCHER
// ═══════════════════════════════════════════════════════════════════════════

/// Main key event handler - dispatches to mode-specific handlers
pub fn handle_key_event(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Naming => return handle_naming_input(app, key),
        InputMode::Note => return handle_note_input(app, key),
        InputMode::Normal => {}
    }

    if app.overlay != Overlay::None {
        return handle_overlay_input(app, key);
    }

    handle_normal_mode(app, key, ctx)
}
