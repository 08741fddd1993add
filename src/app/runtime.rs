//! TUI runtime for codedock
//!
//! One loop owns the [`App`]: housekeeping, background messages, draw, then
//! a short key poll. Workflow runs happen on the tokio runtime and report
//! back through the channel (see `background.rs`).

use crate::app::messages::BackgroundMessage;
use crate::app::{background, input, RuntimeContext};
use crate::dify::WorkflowRunner;
use crate::ui;
use crate::ui::App;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Run the TUI until the user quits
pub async fn run_tui(
    mut app: App,
    runner: Arc<dyn WorkflowRunner>,
    refresh_interval: Duration,
) -> Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel::<BackgroundMessage>();
    let ctx = RuntimeContext {
        tx: &tx,
        runner,
        store: app.workspace.store().clone(),
    };
    info!(data_dir = %ctx.store.dir().display(), "codedock started");

    let result = run_loop(&mut terminal, &mut app, &rx, &ctx, refresh_interval);

    // Pending edits must reach disk even when the loop errored
    if let Err(e) = app.flush() {
        warn!(error = %e, "final save failed");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mpsc::Receiver<BackgroundMessage>,
    ctx: &RuntimeContext,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    loop {
        // Clear expired toasts
        app.clear_expired_toast();

        // Debounced saves and spinner
        app.tick(Instant::now());

        // Pick up file list changes from other instances
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh_from_disk();
            last_refresh = Instant::now();
        }
        app.poll_files();

        // Check for background messages (non-blocking)
        background::drain_messages(app, rx);

        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Poll for events with fast timeout (snappy animations)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                input::handle_key_event(app, key, ctx)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
