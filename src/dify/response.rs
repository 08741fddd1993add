//! Typed view of a stored workflow response
//!
//! Dify returns the run either wrapped (`{ "data": { "outputs": ... } }`,
//! the blocking API) or bare (`{ "outputs": ... }`, some proxies and older
//! exports). The raw JSON is validated once here; everything downstream
//! works with [`TaskOutcome`].

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("no stored result")]
    Missing,
    #[error("stored result is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response has no recognizable outputs")]
    Unrecognized,
}

/// Run metadata reported alongside the outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunInfo {
    pub run_id: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub elapsed_secs: Option<f64>,
    pub total_tokens: Option<u64>,
}

impl RunInfo {
    fn from_data(root: &Map<String, Value>, data: &Map<String, Value>) -> Self {
        let text = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            run_id: text(root.get("workflow_run_id")).or_else(|| text(data.get("id"))),
            status: text(data.get("status")),
            error: text(data.get("error")),
            elapsed_secs: data.get("elapsed_time").and_then(Value::as_f64),
            total_tokens: data.get("total_tokens").and_then(Value::as_u64),
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some() || matches!(self.status.as_deref(), Some("failed" | "stopped"))
    }
}

/// The two response shapes the workflow is known to produce
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResponse {
    /// `{ "data": { "outputs": {...}, "status": ..., ... } }`
    Nested {
        run: RunInfo,
        outputs: Option<Map<String, Value>>,
    },
    /// `{ "outputs": {...} }`
    TopLevel { outputs: Map<String, Value> },
}

impl WorkflowResponse {
    pub fn parse(raw: &str) -> Result<Self, ResultError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ResultError> {
        let Value::Object(root) = value else {
            return Err(ResultError::Unrecognized);
        };
        let top_outputs = root.get("outputs").and_then(Value::as_object).cloned();

        if let Some(data) = root.get("data").and_then(Value::as_object) {
            let outputs = data
                .get("outputs")
                .and_then(Value::as_object)
                .cloned()
                .or(top_outputs);
            return Ok(WorkflowResponse::Nested {
                run: RunInfo::from_data(&root, data),
                outputs,
            });
        }

        match top_outputs {
            Some(outputs) => Ok(WorkflowResponse::TopLevel { outputs }),
            None => Err(ResultError::Unrecognized),
        }
    }

    pub fn outputs(&self) -> Option<&Map<String, Value>> {
        match self {
            WorkflowResponse::Nested { outputs, .. } => outputs.as_ref(),
            WorkflowResponse::TopLevel { outputs } => Some(outputs),
        }
    }

    pub fn run(&self) -> Option<&RunInfo> {
        match self {
            WorkflowResponse::Nested { run, .. } => Some(run),
            WorkflowResponse::TopLevel { .. } => None,
        }
    }
}

/// What the result view shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskOutcome {
    pub filename: Option<String>,
    pub code: Option<String>,
    pub note: Option<String>,
    pub run: Option<RunInfo>,
}

impl TaskOutcome {
    fn is_empty(&self) -> bool {
        self.filename.is_none() && self.code.is_none() && self.note.is_none()
    }
}

/// String at `key` followed by a JSON pointer into it (`rest` may be empty).
fn string_at(outputs: &Map<String, Value>, key: &str, rest: &str) -> Option<String> {
    let value = outputs.get(key)?;
    let value = if rest.is_empty() {
        value
    } else {
        value.pointer(rest)?
    };
    value.as_str().map(str::to_string)
}

impl TryFrom<WorkflowResponse> for TaskOutcome {
    type Error = ResultError;

    fn try_from(response: WorkflowResponse) -> Result<Self, Self::Error> {
        let mut outcome = TaskOutcome {
            run: response.run().cloned(),
            ..TaskOutcome::default()
        };

        if let Some(outputs) = response.outputs() {
            outcome.filename = string_at(outputs, "structured_output_1", "/files/0/name");
            outcome.code = string_at(outputs, "structured_output_1", "/files/0/code");
            outcome.note = string_at(outputs, "structured_output", "/result/0/explanation")
                .or_else(|| string_at(outputs, "summary", ""));
        }

        let run_failed = outcome.run.as_ref().is_some_and(RunInfo::failed);
        if outcome.is_empty() && !run_failed {
            return Err(ResultError::Unrecognized);
        }
        Ok(outcome)
    }
}

/// Parse stored response text into an outcome.
pub fn parse_outcome(raw: &str) -> Result<TaskOutcome, ResultError> {
    TaskOutcome::try_from(WorkflowResponse::parse(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outputs() -> Value {
        json!({
            "structured_output_1": { "files": [
                { "name": "fixed.rs", "code": "fn main() {}" },
                { "name": "second.rs", "code": "ignored" }
            ]},
            "structured_output": { "result": [ { "explanation": "Removed the panic." } ] },
            "summary": "fallback summary"
        })
    }

    #[test]
    fn test_nested_shape() {
        let raw = json!({
            "workflow_run_id": "run-1",
            "data": {
                "status": "succeeded",
                "elapsed_time": 1.5,
                "total_tokens": 321,
                "outputs": outputs()
            }
        });
        let outcome = parse_outcome(&raw.to_string()).unwrap();
        assert_eq!(outcome.filename.as_deref(), Some("fixed.rs"));
        assert_eq!(outcome.code.as_deref(), Some("fn main() {}"));
        assert_eq!(outcome.note.as_deref(), Some("Removed the panic."));

        let run = outcome.run.unwrap();
        assert_eq!(run.run_id.as_deref(), Some("run-1"));
        assert_eq!(run.total_tokens, Some(321));
        assert!(!run.failed());
    }

    #[test]
    fn test_top_level_shape() {
        let raw = json!({ "outputs": outputs() });
        let response = WorkflowResponse::parse(&raw.to_string()).unwrap();
        assert!(matches!(response, WorkflowResponse::TopLevel { .. }));
        let outcome = TaskOutcome::try_from(response).unwrap();
        assert_eq!(outcome.filename.as_deref(), Some("fixed.rs"));
        assert!(outcome.run.is_none());
    }

    #[test]
    fn test_nested_without_outputs_falls_back_to_top_level() {
        let raw = json!({ "data": { "status": "succeeded" }, "outputs": { "summary": "top" } });
        let outcome = parse_outcome(&raw.to_string()).unwrap();
        assert_eq!(outcome.note.as_deref(), Some("top"));
    }

    #[test]
    fn test_note_falls_back_to_summary() {
        let raw = json!({ "outputs": { "summary": "just a summary" } });
        let outcome = parse_outcome(&raw.to_string()).unwrap();
        assert_eq!(outcome.note.as_deref(), Some("just a summary"));
        assert!(outcome.code.is_none());
    }

    #[test]
    fn test_failed_run_is_an_outcome() {
        let raw = json!({ "data": { "status": "failed", "error": "node timed out", "outputs": null } });
        let outcome = parse_outcome(&raw.to_string()).unwrap();
        let run = outcome.run.unwrap();
        assert!(run.failed());
        assert_eq!(run.error.as_deref(), Some("node timed out"));
    }

    #[test]
    fn test_unrecognized_outputs() {
        for raw in [
            json!({ "outputs": { "text": "free-form" } }),
            json!({ "answer": 42 }),
            json!([1, 2, 3]),
            json!({ "outputs": { "structured_output_1": { "files": [] } } }),
            json!({ "outputs": { "structured_output_1": { "files": "oops" } } }),
        ] {
            assert!(matches!(
                parse_outcome(&raw.to_string()),
                Err(ResultError::Unrecognized)
            ));
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_outcome("{oops"), Err(ResultError::Malformed(_))));
    }
}
