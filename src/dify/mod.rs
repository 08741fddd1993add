//! Dify workflow API: request building, the HTTP runner and response parsing

pub mod client;
pub mod models;
pub mod response;

pub use client::{DifyClient, DifyError, WorkflowRunner, DEFAULT_ENDPOINT};
pub use models::{TaskType, WorkflowRequest};
pub use response::{parse_outcome, ResultError, RunInfo, TaskOutcome, WorkflowResponse};
