//! Background task handling for codedock
//!
//! Network calls run on the tokio runtime and report back over an
//! `std::sync::mpsc` channel that the event loop drains every iteration.
//!
//! Channel sends use `let _ =`: the send only fails when the receiver is
//! gone, which means the app is shutting down and nobody is listening.

use crate::app::messages::BackgroundMessage;
use crate::app::RuntimeContext;
use crate::assistant::{run_task, Submission};
use crate::ui::App;
use crate::util::truncate;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use tracing::error;

pub fn drain_messages(app: &mut App, rx: &mpsc::Receiver<BackgroundMessage>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            BackgroundMessage::TaskCompleted(route) => app.finish_task(Ok(route)),
            BackgroundMessage::TaskFailed(message) => app.finish_task(Err(message)),
            BackgroundMessage::Error(e) => {
                app.assistant.finish_submit();
                app.show_error(&truncate(&e, 100));
            }
        }
    }
}

/// Run the workflow for `submission` off the UI thread.
pub fn spawn_task(ctx: &RuntimeContext, submission: Submission) {
    let runner = ctx.runner.clone();
    let store = ctx.store.clone();
    let tx = ctx.tx.clone();

    spawn_background(ctx.tx.clone(), "workflow_run", async move {
        let message = match run_task(runner.as_ref(), &store, &submission).await {
            Ok(route) => BackgroundMessage::TaskCompleted(route),
            Err(err) => BackgroundMessage::TaskFailed(err.user_message()),
        };
        let _ = tx.send(message);
    });
}

pub fn spawn_background<F>(tx: mpsc::Sender<BackgroundMessage>, task_name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            error!(task = task_name, %detail, "background task panicked");
            let _ = tx.send(BackgroundMessage::Error(format!(
                "Background task '{}' crashed unexpectedly: {}",
                task_name, detail
            )));
        }
    });
}
