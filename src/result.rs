//! Result view model: what to show for a `/result?rid=...` location

use crate::dify::{parse_outcome, ResultError, RunInfo, TaskOutcome};
use crate::language::language_for;
use crate::store::Store;
use tracing::warn;

/// Code shown when the response carried no file
pub const NO_RESULT_CODE: &str = "// no result";
/// Name shown when neither the response nor the sidebar supplies one
pub const UNTITLED: &str = "untitled";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultDisplay {
    pub rid: Option<String>,
    pub filename: String,
    pub code: String,
    pub language: &'static str,
    pub note: String,
    pub run: Option<RunInfo>,
    /// Why the placeholder is shown, if it is
    pub problem: Option<String>,
}

impl ResultDisplay {
    /// Nothing requested: no `rid` in the location.
    pub fn empty(fallback_name: Option<&str>) -> Self {
        Self::from_outcome(None, TaskOutcome::default(), fallback_name)
    }

    fn from_outcome(rid: Option<String>, outcome: TaskOutcome, fallback_name: Option<&str>) -> Self {
        let filename = outcome
            .filename
            .or_else(|| fallback_name.filter(|n| !n.is_empty()).map(str::to_string))
            .unwrap_or_else(|| UNTITLED.to_string());
        let language = language_for(Some(filename.as_str()));
        Self {
            rid,
            language,
            filename,
            code: outcome.code.unwrap_or_else(|| NO_RESULT_CODE.to_string()),
            note: outcome.note.unwrap_or_default(),
            run: outcome.run,
            problem: None,
        }
    }

    /// Build the display for a parsed (or failed) outcome. Errors degrade to
    /// placeholder text and are kept in `problem`.
    pub fn resolve(
        rid: Option<String>,
        outcome: Result<TaskOutcome, ResultError>,
        fallback_name: Option<&str>,
    ) -> Self {
        match outcome {
            Ok(outcome) => Self::from_outcome(rid, outcome, fallback_name),
            Err(err) => {
                let mut display = Self::from_outcome(rid, TaskOutcome::default(), fallback_name);
                display.problem = Some(err.to_string());
                display
            }
        }
    }

    /// Load and resolve a stored result.
    pub fn load(store: &Store, rid: Option<&str>, fallback_name: Option<&str>) -> Self {
        let Some(rid) = rid else {
            return Self::empty(fallback_name);
        };
        let outcome = store
            .load_result_raw(rid)
            .ok_or(ResultError::Missing)
            .and_then(|raw| parse_outcome(&raw));
        if let Err(err) = &outcome {
            warn!(rid, error = %err, "result shown with placeholder");
        }
        Self::resolve(Some(rid.to_string()), outcome, fallback_name)
    }
}
