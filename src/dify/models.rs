use serde::Serialize;

/// What the user wants the workflow to do with the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskType {
    #[default]
    FixErrors,
    Explain,
    AddComments,
}

impl TaskType {
    /// All task types in display order
    pub const ALL: [TaskType; 3] = [TaskType::FixErrors, TaskType::Explain, TaskType::AddComments];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            TaskType::FixErrors => 0,
            TaskType::Explain => 1,
            TaskType::AddComments => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::FixErrors => "Fix errors",
            TaskType::Explain => "Explain the code",
            TaskType::AddComments => "Add comments",
        }
    }

    /// Value of the workflow's `task_type` input. The published workflow
    /// branches on these exact strings.
    pub fn wire_value(&self) -> &'static str {
        match self {
            TaskType::FixErrors => "エラー解決",
            TaskType::Explain => "コードの解説",
            TaskType::AddComments => "コメントアウトの追加",
        }
    }
}

/// One file as the workflow expects it inside the `files` input
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkflowInputs {
    /// JSON-encoded array of [`FilePayload`]; the workflow takes a string input
    pub files: String,
    pub task_type: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Blocking,
}

/// Body of `POST /workflows/run`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkflowRequest {
    pub inputs: WorkflowInputs,
    pub response_mode: ResponseMode,
    pub user: String,
}

impl WorkflowRequest {
    /// Build a blocking run for a single file.
    pub fn single_file(
        filename: &str,
        code: &str,
        task: TaskType,
        note: &str,
        user: String,
    ) -> serde_json::Result<Self> {
        let files = serde_json::to_string(&[FilePayload {
            name: filename.to_string(),
            content: code.to_string(),
        }])?;
        Ok(Self {
            inputs: WorkflowInputs {
                files,
                task_type: task.wire_value().to_string(),
                note: note.to_string(),
            },
            response_mode: ResponseMode::Blocking,
            user,
        })
    }
}
