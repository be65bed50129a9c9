//! A2A task types and lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{message::Message, Artifact};

/// A unit of remote work, owned by the remote agent
///
/// The client holds a read-only projection of the task, updated from
/// incoming stream events. Lifecycle: submitted → working →
/// completed/failed/canceled/rejected, with input-required and
/// auth-required as intermediate states awaiting client action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,

    /// Context token correlating this task into a conversation
    #[serde(rename = "contextId", default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Current status of the task
    pub status: TaskStatus,

    /// Ordered collection of completed artifacts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,

    /// Task metadata, including x402 payment extension entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Task {
    /// Create a new task projection in the submitted state
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context_id: None,
            status: TaskStatus::new(TaskState::Submitted),
            artifacts: Vec::new(),
            metadata: None,
        }
    }

    /// Set the task state
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.status = TaskStatus::new(state);
        self
    }

    /// Set the context id
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Add a metadata field
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.state.is_terminal()
    }

    /// Check if the task is still processing
    pub fn is_processing(&self) -> bool {
        matches!(
            self.status.state,
            TaskState::Submitted | TaskState::Working
        )
    }

    /// Check if the task awaits client action (input or authorization)
    pub fn requires_action(&self) -> bool {
        self.status.state.requires_action()
    }
}

/// Status of a task: its state plus an optional status message and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    /// Lifecycle state
    pub state: TaskState,

    /// Optional message accompanying the status (e.g. progress notes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// When this status was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TaskStatus {
    /// Create a status with only a state
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: None,
        }
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Task has been received and is queued for processing
    Submitted,

    /// Task is currently being processed
    Working,

    /// Task requires additional input from the client
    InputRequired,

    /// Task requires authentication or authorization (payment challenges
    /// surface in this state)
    AuthRequired,

    /// Task completed successfully
    Completed,

    /// Task failed with an error
    Failed,

    /// Task was canceled by the client
    Canceled,

    /// Task was rejected by the agent
    Rejected,
}

impl TaskState {
    /// Wire representation of the state, matching its serde form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::AuthRequired => "auth-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }

    /// Check if this state requires client action
    pub fn requires_action(&self) -> bool {
        matches!(self, TaskState::InputRequired | TaskState::AuthRequired)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("task-123");

        assert_eq!(task.id, "task-123");
        assert_eq!(task.status.state, TaskState::Submitted);
        assert!(!task.is_terminal());
        assert!(task.is_processing());
        assert!(task.artifacts.is_empty());
    }

    #[test]
    fn test_task_lifecycle() {
        let task = Task::new("task-123").with_state(TaskState::Working);
        assert!(task.is_processing());

        let task = task.with_state(TaskState::Completed);
        assert!(task.is_terminal());
        assert!(!task.is_processing());
    }

    #[test]
    fn test_task_state_predicates() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Canceled.is_terminal());
        assert!(!TaskState::Working.is_terminal());

        assert!(TaskState::InputRequired.requires_action());
        assert!(TaskState::AuthRequired.requires_action());
        assert!(!TaskState::Working.requires_action());
    }

    #[test]
    fn test_task_state_wire_names() {
        assert_eq!(
            serde_json::to_value(TaskState::InputRequired).unwrap(),
            "input-required"
        );
        assert_eq!(
            serde_json::to_value(TaskState::Canceled).unwrap(),
            "canceled"
        );
        assert_eq!(TaskState::AuthRequired.as_str(), "auth-required");
        assert_eq!(TaskState::Working.to_string(), "working");
    }

    #[test]
    fn test_task_serialization() {
        let task = Task::new("task-123")
            .with_state(TaskState::Working)
            .with_context_id("ctx-1");

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "task-123");
        assert_eq!(json["contextId"], "ctx-1");
        assert_eq!(json["status"]["state"], "working");

        let deserialized: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task, deserialized);
    }
}
