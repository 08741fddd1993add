use crate::route::Route;

/// Messages from background tasks to the main UI thread
pub enum BackgroundMessage {
    /// The workflow ran and its response was stored; open this route
    TaskCompleted(Route),
    /// The workflow failed; nothing was stored
    TaskFailed(String),
    /// A background task crashed
    Error(String),
}
