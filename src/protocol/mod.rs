//! Core protocol types and definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod task;

pub use agent::{AgentCapabilities, AgentCard, AgentSkill};
pub use error::{ClientError, ClientResult};
pub use event::{RemoteFault, StreamItem, TaskArtifactUpdate, TaskEvent, TaskStatusUpdate};
pub use message::{Message, MessagePart, Role};
pub use task::{Task, TaskState, TaskStatus};

/// An identified, ordered result fragment produced by a task
///
/// Artifacts may arrive whole or in streamed chunks; parts within one
/// artifact are order-preserving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Unique identifier of the artifact
    pub artifact_id: String,

    /// A human readable name for the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A human readable description of the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Contents of the artifact, in emission order
    pub parts: Vec<MessagePart>,

    /// Optional artifact metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Artifact {
    /// Create an artifact with a single text part
    pub fn text(artifact_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            name: None,
            description: None,
            parts: vec![MessagePart::text(text)],
            metadata: None,
        }
    }
}
