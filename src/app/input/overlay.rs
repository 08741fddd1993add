use crate::route::Route;
use crate::ui::{App, Overlay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Handle key events when an overlay is active
pub(super) fn handle_overlay_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let closes = match app.overlay {
        Overlay::Help { .. } => matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | '?')),
        _ => matches!(key.code, KeyCode::Esc | KeyCode::Char('q')),
    };
    if closes {
        app.close_overlay();
        return Ok(());
    }

    let mut open = None;
    match &mut app.overlay {
        Overlay::Help { scroll } => match key.code {
            KeyCode::Down | KeyCode::Char('j') => *scroll += 1,
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            _ => {}
        },
        Overlay::History { entries, selected } => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                *selected = (*selected + 1).min(entries.len().saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
            KeyCode::Enter => open = entries.get(*selected).map(|e| e.rid.clone()),
            _ => {}
        },
        Overlay::None => {}
    }

    if let Some(rid) = open {
        app.close_overlay();
        app.navigate(Route::result(rid));
    }
    Ok(())
}
