//! Remote agent sessions
//!
//! One call to [`RemoteAgentSession::send`] drives one logical exchange:
//! compose the outgoing message, consume the response stream, reassemble
//! streamed artifacts, mediate payment challenges through the treasurer, and
//! finalize a textual result.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{json, Map, Value};

use super::{
    config::{ClientConfig, DefaultMessageFactory, MessageFactory},
    connection::AgentConnection,
    context::ContextStore,
    reassembler::ArtifactReassembler,
    registry::RemoteAgentRegistry,
};
use crate::{
    payment::{
        Authorization, PaymentChallenge, PaymentStatus, Treasurer, ERROR_KEY, PAYLOAD_KEY,
    },
    protocol::{ClientError, ClientResult, StreamItem, Task, TaskEvent, TaskState},
};

/// Callback invoked with every task snapshot observed during an exchange
pub type TaskObserver = Arc<dyn Fn(&Task) + Send + Sync>;

/// Drives message exchanges against discovered remote agents
///
/// Sessions against different agents may run concurrently; callers must not
/// issue two concurrent exchanges against the same agent and context pair.
pub struct RemoteAgentSession {
    registry: Arc<RemoteAgentRegistry>,
    contexts: Arc<ContextStore>,
    treasurer: Arc<dyn Treasurer>,
    factory: Arc<dyn MessageFactory>,
    config: ClientConfig,
    observer: Option<TaskObserver>,
}

impl RemoteAgentSession {
    /// Create a session over a discovered registry and a treasurer
    pub fn new(registry: Arc<RemoteAgentRegistry>, treasurer: Arc<dyn Treasurer>) -> Self {
        Self {
            registry,
            contexts: Arc::new(ContextStore::new()),
            treasurer,
            factory: Arc::new(DefaultMessageFactory),
            config: ClientConfig::default(),
            observer: None,
        }
    }

    /// Use a custom configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom message factory
    pub fn with_message_factory(mut self, factory: Arc<dyn MessageFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Observe task snapshots as they stream in (e.g. for progress display)
    pub fn with_task_observer(mut self, observer: TaskObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Share an existing context store
    pub fn with_context_store(mut self, contexts: Arc<ContextStore>) -> Self {
        self.contexts = contexts;
        self
    }

    /// The per-agent conversation context store
    pub fn contexts(&self) -> &Arc<ContextStore> {
        &self.contexts
    }

    /// Send a message to a named remote agent and return its response text
    ///
    /// Payment challenges embedded in the stream are authorized and retried
    /// transparently; a declined payment surfaces as
    /// [`ClientError::PaymentDeclined`].
    pub async fn send(&self, agent_name: &str, text: &str) -> ClientResult<String> {
        let connection = self.registry.connection(agent_name)?;
        let context_id = self.contexts.get(agent_name);
        let request = self
            .factory
            .compose(text, context_id.as_deref(), &self.config);

        tracing::debug!(agent = agent_name, "Starting exchange");

        // Per-exchange state lives here so an abandoned stream leaves no
        // partial artifacts or stale context behind.
        let mut exchange = Exchange::default();
        let mut stream = connection.send_message(request).await?;

        while let Some(item) = stream.next().await {
            match item? {
                StreamItem::Message(message) => {
                    // A terminal message completes the exchange; no context
                    // token travels on this path.
                    return Ok(message.joined_text());
                }
                StreamItem::Fault(fault) => {
                    return Err(ClientError::RemoteAgent {
                        code: fault.code,
                        message: fault.message,
                    });
                }
                StreamItem::Task(task, event) => {
                    exchange.absorb(*task);

                    match event {
                        Some(TaskEvent::ArtifactUpdate(update)) => {
                            if let Some(task) = exchange.task.as_mut() {
                                exchange.reassembler.apply(task, update);
                            }
                        }
                        Some(TaskEvent::StatusUpdate(update)) => {
                            // The snapshot already reflects the new status;
                            // only the embedded payment signal needs work.
                            let status = PaymentStatus::from_metadata(update.metadata.as_ref());
                            if let (Some(status), Some(authorization)) =
                                (status, exchange.authorization.as_ref())
                            {
                                let context = reason_context(update.metadata.as_ref());
                                self.treasurer
                                    .on_status(status, authorization, context.as_ref())
                                    .await?;
                            }
                        }
                        None => {}
                    }

                    if let Some(observer) = &self.observer {
                        if let Some(task) = &exchange.task {
                            observer(task);
                        }
                    }

                    if let Some(challenge) = exchange.pending_challenge() {
                        let authorization = self
                            .authorize_challenge(agent_name, &challenge.challenge)
                            .await?;
                        stream = self
                            .resubmit_paid(agent_name, text, &connection, &authorization, challenge)
                            .await?;
                        exchange.authorization = Some(authorization);
                    }
                }
            }
        }

        let Some(task) = exchange.task else {
            // An empty stream is a protocol violation, not an empty answer.
            return Err(ClientError::NoResponse {
                agent: agent_name.to_string(),
            });
        };

        if let Some(context_id) = &task.context_id {
            self.contexts.insert(agent_name, context_id.clone());
        }

        Ok(extract_text(&task))
    }

    /// Ask the treasurer to settle a challenge
    async fn authorize_challenge(
        &self,
        agent_name: &str,
        challenge: &PaymentChallenge,
    ) -> ClientResult<Authorization> {
        tracing::info!(
            agent = agent_name,
            options = challenge.accepts.len(),
            "Remote agent requires payment"
        );

        match self.treasurer.on_payment_required(challenge, None).await? {
            Some(authorization) => Ok(authorization),
            None => Err(ClientError::PaymentDeclined {
                agent: agent_name.to_string(),
            }),
        }
    }

    /// Resubmit the original request augmented with the signed payment
    async fn resubmit_paid(
        &self,
        agent_name: &str,
        text: &str,
        connection: &Arc<dyn AgentConnection>,
        authorization: &Authorization,
        challenge: PendingChallenge,
    ) -> ClientResult<super::connection::EventStream> {
        let context_id = challenge
            .context_id
            .or_else(|| self.contexts.get(agent_name));

        let retry = self
            .factory
            .compose(text, context_id.as_deref(), &self.config)
            .with_task_id(challenge.task_id)
            .with_metadata(PAYLOAD_KEY, serde_json::to_value(&authorization.payment)?);

        connection.send_message(retry).await
    }
}

/// A challenge extracted from the current task, with its correlation ids
struct PendingChallenge {
    challenge: PaymentChallenge,
    task_id: String,
    context_id: Option<String>,
}

/// State scoped to one logical exchange
#[derive(Default)]
struct Exchange {
    task: Option<Task>,
    reassembler: ArtifactReassembler,
    authorization: Option<Authorization>,
}

impl Exchange {
    /// Replace the task projection with an incoming snapshot
    ///
    /// Snapshots after the first rarely carry artifacts; reassembled ones
    /// are carried forward so they survive status updates.
    fn absorb(&mut self, mut incoming: Task) {
        if let Some(previous) = self.task.take() {
            if incoming.artifacts.is_empty() {
                incoming.artifacts = previous.artifacts;
            }
        }
        self.task = Some(incoming);
    }

    /// A payment challenge awaiting settlement, if the task carries one
    fn pending_challenge(&self) -> Option<PendingChallenge> {
        let task = self.task.as_ref()?;
        if !task.requires_action() {
            return None;
        }
        let challenge = PaymentChallenge::from_task(task)?;
        Some(PendingChallenge {
            challenge,
            task_id: task.id.clone(),
            context_id: task.context_id.clone(),
        })
    }
}

/// Build an `on_status` context from event metadata, if it names a reason
fn reason_context(metadata: Option<&Map<String, Value>>) -> Option<Map<String, Value>> {
    let reason = metadata?.get(ERROR_KEY)?.as_str()?;
    let mut context = Map::new();
    context.insert("reason".into(), json!(reason));
    Some(context)
}

/// Derive the textual result from the final task projection
fn extract_text(task: &Task) -> String {
    if matches!(task.status.state, TaskState::Completed | TaskState::Failed) {
        let texts: Vec<String> = task
            .artifacts
            .iter()
            .flat_map(|artifact| artifact.parts.iter())
            .filter_map(|part| match part {
                crate::protocol::MessagePart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect();

        if !texts.is_empty() {
            return texts.join(" ");
        }

        // No textual artifacts to show.
        return format!("Task {}", task.status.state);
    }

    // Stream ended with the task still in progress.
    format!("Task status: {}", task.status.state)
}
