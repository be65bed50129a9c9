//! Streaming artifact reassembly

use std::collections::HashMap;

use crate::protocol::{Artifact, Task, TaskArtifactUpdate};

/// Buffers chunked artifact events and attaches complete artifacts to a task
///
/// The buffer maps artifact identity to the in-progress artifact; an entry
/// exists only while reassembly of that identity is incomplete. An identity
/// is never simultaneously in the buffer and the task's collection.
#[derive(Debug, Default)]
pub struct ArtifactReassembler {
    chunks: HashMap<String, Artifact>,
}

impl ArtifactReassembler {
    /// Create a reassembler with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an artifact event to the task's artifact collection
    pub fn apply(&mut self, task: &mut Task, event: TaskArtifactUpdate) {
        let is_append = event.is_append();
        let last_chunk = event.last_chunk;
        let artifact = event.artifact;
        let artifact_id = artifact.artifact_id.clone();

        if !is_append {
            if last_chunk.unwrap_or(true) {
                // Complete artifact in one event, no buffering.
                Self::attach(task, artifact);
            } else {
                // First chunk of a streamed artifact.
                self.chunks.insert(artifact_id, artifact);
            }
            return;
        }

        let Some(buffered) = self.chunks.get_mut(&artifact_id) else {
            // An append with nothing to extend means the stream is corrupted;
            // skip the chunk rather than failing the whole exchange.
            tracing::warn!(
                task = %task.id,
                artifact = %artifact_id,
                "Dropping append chunk with no buffered artifact"
            );
            return;
        };

        buffered.parts.extend(artifact.parts);

        if last_chunk.unwrap_or(false) {
            if let Some(complete) = self.chunks.remove(&artifact_id) {
                Self::attach(task, complete);
            }
        }
    }

    /// Whether any artifact is still mid-reassembly
    pub fn has_pending(&self) -> bool {
        !self.chunks.is_empty()
    }

    fn attach(task: &mut Task, artifact: Artifact) {
        // Keep at most one artifact per identity on the task.
        if let Some(existing) = task
            .artifacts
            .iter_mut()
            .find(|a| a.artifact_id == artifact.artifact_id)
        {
            *existing = artifact;
        } else {
            task.artifacts.push(artifact);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MessagePart, TaskState};

    fn chunk(
        artifact_id: &str,
        texts: &[&str],
        append: Option<bool>,
        last_chunk: Option<bool>,
    ) -> TaskArtifactUpdate {
        TaskArtifactUpdate {
            task_id: "task-1".into(),
            context_id: None,
            artifact: Artifact {
                artifact_id: artifact_id.into(),
                name: None,
                description: None,
                parts: texts.iter().map(|t| MessagePart::text(*t)).collect(),
                metadata: None,
            },
            append,
            last_chunk,
        }
    }

    fn joined(task: &Task) -> Vec<String> {
        task.artifacts
            .iter()
            .map(|a| {
                a.parts
                    .iter()
                    .filter_map(|p| match p {
                        MessagePart::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect()
    }

    #[test]
    fn test_complete_artifact_attaches_directly() {
        let mut task = Task::new("task-1").with_state(TaskState::Working);
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["Result"], None, None));

        assert_eq!(joined(&task), vec!["Result"]);
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_explicit_last_chunk_attaches_directly() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["Whole"], Some(false), Some(true)));

        assert_eq!(joined(&task), vec!["Whole"]);
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_two_chunk_reassembly() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["Hel"], None, Some(false)));
        assert!(task.artifacts.is_empty(), "first chunk stays buffered");
        assert!(reassembler.has_pending());

        reassembler.apply(&mut task, chunk("art-1", &["lo"], Some(true), Some(true)));

        assert_eq!(joined(&task), vec!["Hello"]);
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_many_chunk_reassembly_preserves_order() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["a"], Some(false), Some(false)));
        for text in ["b", "c", "d"] {
            reassembler.apply(&mut task, chunk("art-1", &[text], Some(true), Some(false)));
        }
        reassembler.apply(&mut task, chunk("art-1", &["e"], Some(true), Some(true)));

        assert_eq!(joined(&task), vec!["abcde"]);
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_interleaved_identities_stay_separate() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["1a"], None, Some(false)));
        reassembler.apply(&mut task, chunk("art-2", &["2a"], None, Some(false)));
        reassembler.apply(&mut task, chunk("art-2", &["2b"], Some(true), Some(true)));
        reassembler.apply(&mut task, chunk("art-1", &["1b"], Some(true), Some(true)));

        assert_eq!(joined(&task), vec!["2a2b", "1a1b"]);
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_orphan_append_is_skipped() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("ghost", &["lost"], Some(true), Some(true)));

        assert!(task.artifacts.is_empty());
        assert!(!reassembler.has_pending());
    }

    #[test]
    fn test_append_without_last_chunk_keeps_buffering() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["x"], None, Some(false)));
        reassembler.apply(&mut task, chunk("art-1", &["y"], Some(true), None));

        assert!(task.artifacts.is_empty());
        assert!(reassembler.has_pending());
    }

    #[test]
    fn test_repeated_complete_artifact_replaces() {
        let mut task = Task::new("task-1");
        let mut reassembler = ArtifactReassembler::new();

        reassembler.apply(&mut task, chunk("art-1", &["old"], None, None));
        reassembler.apply(&mut task, chunk("art-1", &["new"], None, None));

        assert_eq!(joined(&task), vec!["new"]);
    }
}
