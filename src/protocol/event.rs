//! Streaming response elements
//!
//! A `message/stream` exchange yields a sequence of elements. Their shape is
//! decided once at the stream boundary and represented as [`StreamItem`], so
//! consumers match exhaustively instead of probing payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    message::Message,
    task::{Task, TaskStatus},
    Artifact,
};

/// One element of a response stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// A terminal message: the exchange is complete
    Message(Message),

    /// A protocol-level error reported by the remote agent
    Fault(RemoteFault),

    /// A task snapshot, paired with the event that produced it
    ///
    /// The event is `None` when the element is a full task snapshot. For
    /// status updates the snapshot already reflects the new status.
    Task(Box<Task>, Option<TaskEvent>),
}

/// An event describing an incremental change to a task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// The task's status changed
    StatusUpdate(TaskStatusUpdate),

    /// An artifact (or artifact chunk) was produced
    ArtifactUpdate(TaskArtifactUpdate),
}

/// Error object yielded inside a response stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteFault {
    /// Remote error code
    pub code: i64,

    /// Human-readable error message
    pub message: String,

    /// Optional structured error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A task status transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    /// Task the update applies to
    pub task_id: String,

    /// Context the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// The new status
    pub status: TaskStatus,

    /// Whether this is the last event of the stream
    #[serde(rename = "final", default)]
    pub is_final: bool,

    /// Event metadata, including x402 payment-status entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// An artifact produced by a task, whole or as one chunk of a stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdate {
    /// Task the artifact belongs to
    pub task_id: String,

    /// Context the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// The artifact content carried by this event
    pub artifact: Artifact,

    /// Whether the parts extend a previously started artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,

    /// Whether this is the final chunk of the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,
}

impl TaskArtifactUpdate {
    /// Whether this event extends an already-buffered artifact
    pub fn is_append(&self) -> bool {
        self.append.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::{message::MessagePart, task::TaskState};

    #[test]
    fn test_status_update_wire_format() {
        let json = json!({
            "taskId": "task-1",
            "contextId": "ctx-1",
            "status": {"state": "working"},
            "final": false
        });

        let update: TaskStatusUpdate = serde_json::from_value(json).unwrap();
        assert_eq!(update.task_id, "task-1");
        assert_eq!(update.status.state, TaskState::Working);
        assert!(!update.is_final);
    }

    #[test]
    fn test_artifact_update_chunk_flags() {
        let json = json!({
            "taskId": "task-1",
            "artifact": {
                "artifactId": "art-1",
                "parts": [{"text": "chunk"}]
            },
            "append": true,
            "lastChunk": false
        });

        let update: TaskArtifactUpdate = serde_json::from_value(json).unwrap();
        assert!(update.is_append());
        assert_eq!(update.last_chunk, Some(false));
        assert_eq!(update.artifact.parts, vec![MessagePart::text("chunk")]);
    }

    #[test]
    fn test_artifact_update_flags_default_absent() {
        let json = json!({
            "taskId": "task-1",
            "artifact": {"artifactId": "art-1", "parts": [{"text": "whole"}]}
        });

        let update: TaskArtifactUpdate = serde_json::from_value(json).unwrap();
        assert!(!update.is_append());
        assert_eq!(update.last_chunk, None);
    }

    #[test]
    fn test_fault_round_trip() {
        let fault = RemoteFault {
            code: -32000,
            message: "boom".into(),
            data: None,
        };

        let json = serde_json::to_value(&fault).unwrap();
        assert_eq!(json, json!({"code": -32000, "message": "boom"}));
    }
}
