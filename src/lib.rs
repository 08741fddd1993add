//! codedock library crate
//!
//! A terminal code assistant: keep a set of named code files, run a Dify
//! workflow task on one of them and browse the stored results. The modules
//! are public so benchmarks can exercise rendering and lookups without going
//! through CLI startup.

pub mod app;
pub mod assistant;
pub mod code;
pub mod config;
pub mod dify;
pub mod files;
pub mod language;
pub mod result;
pub mod route;
pub mod store;
pub mod ui;
pub mod util;
pub mod workspace;
