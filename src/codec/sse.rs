//! Server-Sent Events decoding for streaming exchanges
//!
//! Each SSE data line carries one JSON-RPC frame whose result is a protocol
//! element discriminated by its `kind` field.

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use serde_json::Value;

use super::jsonrpc::{parse_frame, JsonRpcFrame};
use crate::protocol::{
    ClientError, Message, RemoteFault, Task, TaskArtifactUpdate, TaskStatusUpdate,
};

/// One decoded frame of a response stream, before task-state folding
#[derive(Debug, Clone, PartialEq)]
pub enum SseFrame {
    /// A terminal message
    Message(Message),

    /// A remote-reported error
    Fault(RemoteFault),

    /// A full task snapshot
    Task(Task),

    /// An incremental status update
    StatusUpdate(TaskStatusUpdate),

    /// An artifact or artifact chunk
    ArtifactUpdate(TaskArtifactUpdate),
}

/// Decoder for SSE byte streams
#[derive(Debug, Clone, Default)]
pub struct SseDecoder;

impl SseDecoder {
    /// Create a new SSE decoder
    pub fn new() -> Self {
        Self
    }

    /// Parse an SSE byte stream into a stream of protocol frames
    pub fn decode<S>(
        &self,
        byte_stream: S,
    ) -> impl Stream<Item = Result<SseFrame, ClientError>>
    where
        S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    {
        byte_stream.eventsource().map(|result| match result {
            Ok(event) => match parse_frame(&event.data)? {
                JsonRpcFrame::Error(fault) => Ok(SseFrame::Fault(fault)),
                JsonRpcFrame::Result(result) => Self::decode_result(result),
            },
            Err(e) => Err(ClientError::Transport(format!("SSE stream error: {e}"))),
        })
    }

    fn decode_result(result: Value) -> Result<SseFrame, ClientError> {
        let kind = result
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| ClientError::Protocol("Stream element missing 'kind' field".into()))?;

        let frame = match kind {
            "message" => SseFrame::Message(serde_json::from_value(result)?),
            "task" => SseFrame::Task(serde_json::from_value(result)?),
            "status-update" => SseFrame::StatusUpdate(serde_json::from_value(result)?),
            "artifact-update" => SseFrame::ArtifactUpdate(serde_json::from_value(result)?),
            other => {
                return Err(ClientError::Protocol(format!(
                    "Unknown stream element kind: {other}"
                )))
            }
        };

        Ok(frame)
    }
}
