//! Wire codecs for the streaming exchange path

pub mod jsonrpc;
pub mod sse;

pub use jsonrpc::{encode_stream_request, parse_frame, JsonRpcFrame};
pub use sse::{SseDecoder, SseFrame};
