pub mod background;
pub mod input;
pub mod messages;
pub mod runtime;

pub use messages::BackgroundMessage;
pub use runtime::run_tui;

use crate::dify::WorkflowRunner;
use crate::store::Store;
use std::sync::mpsc;
use std::sync::Arc;

/// Handles the input layer needs to start background work
pub struct RuntimeContext<'a> {
    pub tx: &'a mpsc::Sender<messages::BackgroundMessage>,
    pub runner: Arc<dyn WorkflowRunner>,
    pub store: Store,
}
