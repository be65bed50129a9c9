//! Streaming connections to remote agents

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use url::Url;

use crate::{
    codec::{encode_stream_request, SseDecoder, SseFrame},
    payment::X402_EXTENSION_URI,
    protocol::{ClientError, ClientResult, Message, StreamItem, Task, TaskEvent},
    transport::{HttpTransport, TransportRequest},
};

/// Stream of response elements for one exchange
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamItem, ClientError>> + Send>>;

/// One streaming connection to one remote agent
#[async_trait]
pub trait AgentConnection: Send + Sync {
    /// Send a message and return the response stream
    async fn send_message(&self, message: Message) -> ClientResult<EventStream>;
}

/// Creates connections for discovered agents
pub trait ConnectionFactory: Send + Sync {
    /// Build a connection from an agent's card
    fn connect(&self, card: &crate::protocol::AgentCard) -> ClientResult<Arc<dyn AgentConnection>>;
}

/// Folds raw stream frames into `(Task, Event)` pairs
///
/// Incremental updates carry only the task id; the folder keeps the latest
/// task snapshot so every yielded element pairs the event with a task whose
/// status already reflects it.
#[derive(Debug, Default)]
struct TaskFolder {
    task: Option<Task>,
}

impl TaskFolder {
    fn fold(&mut self, frame: SseFrame) -> StreamItem {
        match frame {
            SseFrame::Message(message) => StreamItem::Message(message),
            SseFrame::Fault(fault) => StreamItem::Fault(fault),
            SseFrame::Task(task) => {
                self.task = Some(task.clone());
                StreamItem::Task(Box::new(task), None)
            }
            SseFrame::StatusUpdate(update) => {
                let mut task = self
                    .task
                    .take()
                    .unwrap_or_else(|| Task::new(update.task_id.clone()));

                task.status = update.status.clone();
                if task.context_id.is_none() {
                    task.context_id = update.context_id.clone();
                }
                // Event metadata (e.g. payment status) accumulates on the
                // task so consumers have one place to look.
                if let Some(metadata) = &update.metadata {
                    let target = task.metadata.get_or_insert_with(Default::default);
                    for (key, value) in metadata {
                        target.insert(key.clone(), value.clone());
                    }
                }

                self.task = Some(task.clone());
                StreamItem::Task(Box::new(task), Some(TaskEvent::StatusUpdate(update)))
            }
            SseFrame::ArtifactUpdate(update) => {
                let task = self
                    .task
                    .clone()
                    .unwrap_or_else(|| Task::new(update.task_id.clone()));
                StreamItem::Task(Box::new(task), Some(TaskEvent::ArtifactUpdate(update)))
            }
        }
    }
}

/// HTTP connection speaking JSON-RPC over Server-Sent Events
pub struct HttpAgentConnection {
    transport: HttpTransport,
}

impl HttpAgentConnection {
    /// Create a connection to an agent served at `url`
    pub fn new(url: Url) -> Self {
        Self {
            transport: HttpTransport::new(url),
        }
    }

    /// Create a connection over a custom reqwest client
    pub fn with_client(url: Url, client: reqwest::Client) -> Self {
        Self {
            transport: HttpTransport::with_client(url, client),
        }
    }
}

#[async_trait]
impl AgentConnection for HttpAgentConnection {
    async fn send_message(&self, message: Message) -> ClientResult<EventStream> {
        let body = encode_stream_request(&message)?;
        let request = TransportRequest::new("", "POST")
            .header("Content-Type", "application/json")
            .header("X-A2A-Extensions", X402_EXTENSION_URI)
            .body(body);

        let bytes = self.transport.execute_streaming(request).await?;

        let mut folder = TaskFolder::default();
        let stream = SseDecoder::new()
            .decode(bytes)
            .map(move |frame| frame.map(|f| folder.fold(f)));

        Ok(Box::pin(stream))
    }
}

/// Default factory producing HTTP connections from card URLs
#[derive(Debug, Clone)]
pub struct HttpConnectionFactory {
    client: reqwest::Client,
}

impl HttpConnectionFactory {
    /// Create a factory with a default HTTP client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a factory whose connections honor the configured timeout
    pub fn with_config(config: &super::config::ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Default for HttpConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFactory for HttpConnectionFactory {
    fn connect(&self, card: &crate::protocol::AgentCard) -> ClientResult<Arc<dyn AgentConnection>> {
        let url = Url::parse(&card.url)
            .map_err(|e| ClientError::Protocol(format!("Invalid agent URL '{}': {e}", card.url)))?;
        Ok(Arc::new(HttpAgentConnection::with_client(
            url,
            self.client.clone(),
        )))
    }
}
