//! End-to-end exchange scenarios against scripted collaborators
//!
//! These tests drive the whole pipeline: discovery, the session state
//! machine, artifact reassembly, and the payment loop with a real treasurer
//! talking to a scripted authorization backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use a2a_x402_client::api::ApiClient;
use a2a_x402_client::client::{
    AgentConnection, CardResolver, ConnectionFactory, EventStream, RemoteAgentRegistry,
    RemoteAgentSession,
};
use a2a_x402_client::payment::{
    ApiTreasurer, PaymentChallenge, PaymentPayload, PaymentRequirement, Wallet, PAYLOAD_KEY,
    REQUIRED_KEY,
};
use a2a_x402_client::protocol::{
    Artifact, ClientError, ClientResult, Message, RemoteFault, StreamItem, Task, TaskState,
};
use a2a_x402_client::transport::{Transport, TransportRequest, TransportResponse};

const AGENT: &str = "test_agent";

/// Connection replaying scripted streams, one per send
struct ScriptedConnection {
    streams: Mutex<VecDeque<Vec<Result<StreamItem, ClientError>>>>,
    sent: Mutex<Vec<Message>>,
}

impl ScriptedConnection {
    fn new(streams: Vec<Vec<Result<StreamItem, ClientError>>>) -> Arc<Self> {
        Arc::new(Self {
            streams: Mutex::new(streams.into()),
            sent: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AgentConnection for ScriptedConnection {
    async fn send_message(&self, message: Message) -> ClientResult<EventStream> {
        self.sent.lock().unwrap().push(message);
        let items = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

struct FixedFactory(Arc<ScriptedConnection>);

impl ConnectionFactory for FixedFactory {
    fn connect(
        &self,
        _card: &a2a_x402_client::protocol::AgentCard,
    ) -> ClientResult<Arc<dyn AgentConnection>> {
        Ok(self.0.clone())
    }
}

struct FixedResolver;

#[async_trait]
impl CardResolver for FixedResolver {
    async fn resolve(&self, url: &Url) -> ClientResult<a2a_x402_client::protocol::AgentCard> {
        Ok(a2a_x402_client::protocol::AgentCard::new(
            AGENT,
            "A test agent",
            url.as_str(),
        ))
    }
}

/// Backend transport scripting the authorization service
struct ScriptedBackend {
    requests: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl ScriptedBackend {
    fn new() -> (Self, Arc<Mutex<Vec<(String, serde_json::Value)>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                requests: requests.clone(),
            },
            requests,
        )
    }
}

#[async_trait]
impl Transport for ScriptedBackend {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let body: serde_json::Value = if request.body.is_empty() {
            json!(null)
        } else {
            serde_json::from_slice(&request.body).unwrap()
        };
        self.requests
            .lock()
            .unwrap()
            .push((request.endpoint.clone(), body));

        let response = match request.endpoint.as_str() {
            e if e.starts_with("/api/v1/auth/nonce") => {
                json!({"nonce": "n-1", "sessionId": "s-1"})
            }
            "/api/v1/auth/login" => json!({
                "token": "tok-1",
                "agentAddress": "0x1111111111111111111111111111111111111111",
                "expiresAt": "2099-01-01T00:00:00Z"
            }),
            "/api/v1/agent/payments/authorize" => json!({
                "authorized": {
                    "recommended": 0,
                    "requirements": [{
                        "requirement": requirement_json(),
                        "limits": {
                            "dailyRemaining": "900000000",
                            "monthlyRemaining": "9900000000"
                        }
                    }]
                },
                "rejected": []
            }),
            "/api/v1/agent/payments/events" => json!({"received": true, "paymentId": "p-1"}),
            other => panic!("Unexpected backend endpoint: {other}"),
        };

        Ok(TransportResponse::new(200).body(bytes::Bytes::from(response.to_string())))
    }
}

struct StubWallet;

#[async_trait]
impl Wallet for StubWallet {
    fn address(&self) -> &str {
        "0x1111111111111111111111111111111111111111"
    }

    async fn sign_message(&self, _message: &str) -> ClientResult<String> {
        Ok("0xsigned".into())
    }

    async fn create_payment(
        &self,
        requirement: &PaymentRequirement,
    ) -> ClientResult<PaymentPayload> {
        Ok(PaymentPayload {
            x402_version: 1,
            scheme: requirement.scheme.clone(),
            network: requirement.network.clone(),
            payload: json!({"signature": "0xsigned"}),
        })
    }
}

fn requirement_json() -> serde_json::Value {
    json!({
        "scheme": "exact",
        "network": "base",
        "maxAmountRequired": "1000000",
        "resource": "test-resource",
        "description": "Test payment",
        "mimeType": "application/json",
        "payTo": "0x9876543210987654321098765432109876543210",
        "maxTimeoutSeconds": 3600,
        "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
    })
}

async fn registry_with(connection: Arc<ScriptedConnection>) -> Arc<RemoteAgentRegistry> {
    let mut registry =
        RemoteAgentRegistry::new(Arc::new(FixedResolver), Arc::new(FixedFactory(connection)));
    registry
        .discover(&[Url::parse("https://agent.example.com").unwrap()])
        .await
        .unwrap();
    Arc::new(registry)
}

fn api_treasurer() -> (Arc<ApiTreasurer>, Arc<Mutex<Vec<(String, serde_json::Value)>>>) {
    let (backend, requests) = ScriptedBackend::new();
    let api = Arc::new(ApiClient::with_transport(
        Url::parse("https://backend.example.com").unwrap(),
        backend,
        Arc::new(StubWallet),
    ));
    (Arc::new(ApiTreasurer::new(api, Arc::new(StubWallet))), requests)
}

fn task_item(task: Task) -> Result<StreamItem, ClientError> {
    Ok(StreamItem::Task(Box::new(task), None))
}

#[tokio::test]
async fn test_message_only_exchange() {
    let connection =
        ScriptedConnection::new(vec![vec![Ok(StreamItem::Message(Message::agent("ok")))]]);
    let registry = registry_with(connection).await;
    let (treasurer, _) = api_treasurer();
    let session = RemoteAgentSession::new(registry, treasurer);

    let result = session.send(AGENT, "Query X").await.unwrap();

    assert_eq!(result, "ok");
    assert_eq!(session.contexts().get(AGENT), None);
}

#[tokio::test]
async fn test_completed_task_with_artifact() {
    let mut task = Task::new("task-1")
        .with_state(TaskState::Completed)
        .with_context_id("ctx-1");
    task.artifacts.push(Artifact::text("art-1", "Result"));

    let connection = ScriptedConnection::new(vec![vec![task_item(task)]]);
    let registry = registry_with(connection).await;
    let (treasurer, _) = api_treasurer();
    let session = RemoteAgentSession::new(registry, treasurer);

    let result = session.send(AGENT, "Query X").await.unwrap();

    assert_eq!(result, "Result");
    assert_eq!(session.contexts().get(AGENT).as_deref(), Some("ctx-1"));
}

#[tokio::test]
async fn test_remote_error_surfaces() {
    let connection = ScriptedConnection::new(vec![vec![Ok(StreamItem::Fault(RemoteFault {
        code: -32000,
        message: "boom".into(),
        data: None,
    }))]]);
    let registry = registry_with(connection).await;
    let (treasurer, _) = api_treasurer();
    let session = RemoteAgentSession::new(registry, treasurer);

    match session.send(AGENT, "Query X").await.unwrap_err() {
        ClientError::RemoteAgent { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "boom");
        }
        other => panic!("Expected RemoteAgent error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_stream_raises_no_response() {
    let connection = ScriptedConnection::new(vec![vec![]]);
    let registry = registry_with(connection).await;
    let (treasurer, _) = api_treasurer();
    let session = RemoteAgentSession::new(registry, treasurer);

    let err = session.send(AGENT, "Query X").await.unwrap_err();
    assert!(matches!(err, ClientError::NoResponse { agent } if agent == AGENT));
}

#[tokio::test]
async fn test_full_payment_loop() {
    let requirement: PaymentRequirement = serde_json::from_value(requirement_json()).unwrap();
    let challenge = PaymentChallenge {
        x402_version: 1,
        accepts: vec![requirement],
        error: None,
    };
    let challenge_task = Task::new("task-1")
        .with_state(TaskState::AuthRequired)
        .with_context_id("ctx-1")
        .with_metadata(REQUIRED_KEY, serde_json::to_value(&challenge).unwrap());

    let mut paid_task = Task::new("task-1")
        .with_state(TaskState::Completed)
        .with_context_id("ctx-1");
    paid_task.artifacts.push(Artifact::text("art-1", "Paid result"));

    let connection = ScriptedConnection::new(vec![
        vec![task_item(challenge_task)],
        vec![task_item(paid_task)],
    ]);
    let registry = registry_with(connection.clone()).await;
    let (treasurer, backend_requests) = api_treasurer();
    let session = RemoteAgentSession::new(registry, treasurer);

    let result = session.send(AGENT, "Query X").await.unwrap();
    assert_eq!(result, "Paid result");
    assert_eq!(session.contexts().get(AGENT).as_deref(), Some("ctx-1"));

    // The retry carried the signed payload, bound to the challenge task.
    let sent = connection.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].task_id.as_deref(), Some("task-1"));
    let payload = &sent[1].metadata.as_ref().unwrap()[PAYLOAD_KEY];
    assert_eq!(payload["scheme"], "exact");

    // The backend saw login, the authorization request, and a sending event.
    let requests = backend_requests.lock().unwrap().clone();
    let endpoints: Vec<&str> = requests.iter().map(|(e, _)| e.as_str()).collect();
    assert!(endpoints.iter().any(|e| e.starts_with("/api/v1/auth/nonce")));
    assert!(endpoints.contains(&"/api/v1/auth/login"));
    assert!(endpoints.contains(&"/api/v1/agent/payments/authorize"));

    let (_, event_body) = requests
        .iter()
        .find(|(e, _)| e == "/api/v1/agent/payments/events")
        .expect("a payment event must be reported");
    assert_eq!(event_body["event"]["type"], "sending");
    assert_eq!(event_body["id"].as_str().unwrap().len(), 32);
}
