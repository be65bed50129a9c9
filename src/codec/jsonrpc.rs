//! JSON-RPC 2.0 framing for streaming exchanges

use bytes::Bytes;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::protocol::{ClientError, Message, RemoteFault};

/// Encode a `message/stream` request envelope
///
/// The message is tagged with its wire kind inside the params object.
pub fn encode_stream_request(message: &Message) -> Result<Bytes, ClientError> {
    let mut message_value = serde_json::to_value(message)?;
    message_value["kind"] = json!("message");

    let envelope = json!({
        "jsonrpc": "2.0",
        "id": Uuid::new_v4().to_string(),
        "method": "message/stream",
        "params": {
            "message": message_value,
        },
    });

    Ok(Bytes::from(serde_json::to_vec(&envelope)?))
}

/// One parsed JSON-RPC response frame
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcFrame {
    /// The frame's `result` payload
    Result(Value),

    /// The frame's `error` object
    Error(RemoteFault),
}

/// Parse a single JSON-RPC response frame
pub fn parse_frame(data: &str) -> Result<JsonRpcFrame, ClientError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| ClientError::Protocol(format!("Failed to parse response frame: {e}")))?;

    if let Some(error) = value.get("error") {
        let fault: RemoteFault = serde_json::from_value(error.clone())
            .map_err(|e| ClientError::Protocol(format!("Malformed error object: {e}")))?;
        return Ok(JsonRpcFrame::Error(fault));
    }

    let result = value
        .get("result")
        .cloned()
        .ok_or_else(|| ClientError::Protocol("Response frame missing 'result' field".into()))?;

    Ok(JsonRpcFrame::Result(result))
}
