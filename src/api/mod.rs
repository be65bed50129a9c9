//! Authorization backend client
//!
//! Payment decisions and lifecycle reports go to a remote authorization
//! service. The client establishes a session lazily: a nonce handshake, a
//! wallet-signed login message, then a bearer token injected into every
//! authenticated call by [`auth::SessionAuthLayer`].

pub mod auth;
pub mod operation;
pub mod service;
pub mod types;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_layer::Layer;
use tower_service::Service;
use url::Url;

use self::{
    auth::{AuthenticationState, SessionAuthLayer, SessionAuthService, SharedAuthState},
    operation::ApiOperation,
    service::{ApiRequest, ApiService},
    types::{
        AuthorizationRequest, AuthorizationResponse, LoginRequest, LoginResponse, NonceResponse,
        PaymentEventRequest, PaymentEventResponse,
    },
};
use crate::{
    payment::{PaymentEvent, PaymentPayload, PaymentRequirement, Wallet},
    protocol::{ClientError, ClientResult},
    transport::{HttpTransport, Transport},
};

/// Authorization decisions and event reporting, as the treasurer sees them
///
/// Split out as a trait so the treasurer can run against a scripted backend
/// in tests.
#[async_trait]
pub trait AuthorizationApi: Send + Sync {
    /// Submit candidate requirements for an authorization decision
    async fn authorize_payment(
        &self,
        requirements: &[PaymentRequirement],
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<AuthorizationResponse>;

    /// Report one payment lifecycle event under its correlation id
    async fn report_payment_event(
        &self,
        id: &str,
        payment: &PaymentPayload,
        event: PaymentEvent,
    ) -> ClientResult<PaymentEventResponse>;
}

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct ApiClientOptions {
    /// Base URL of the authorization backend
    pub base_url: Url,

    /// Request timeout
    pub timeout: std::time::Duration,
}

impl ApiClientOptions {
    /// Create options with the default 30 second timeout
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: std::time::Duration::from_secs(30),
        }
    }
}

/// High-level client for the authorization backend
pub struct ApiClient<T = HttpTransport> {
    service: SessionAuthService<ApiService<T>>,
    state: SharedAuthState,
    wallet: Arc<dyn Wallet>,
    base_url: Url,
    login_lock: tokio::sync::Mutex<()>,
}

impl ApiClient<HttpTransport> {
    /// Create a client over HTTP
    pub fn new(options: ApiClientOptions, wallet: Arc<dyn Wallet>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let transport = HttpTransport::with_client(options.base_url.clone(), http);
        Ok(Self::with_transport(options.base_url, transport, wallet))
    }
}

impl<T> ApiClient<T>
where
    T: Transport,
{
    /// Create a client over a custom transport
    pub fn with_transport(base_url: Url, transport: T, wallet: Arc<dyn Wallet>) -> Self {
        let state: SharedAuthState = Arc::new(RwLock::new(AuthenticationState::default()));
        let service = SessionAuthLayer::new(state.clone()).layer(ApiService::new(transport));

        Self {
            service,
            state,
            wallet,
            base_url,
            login_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current authentication state snapshot
    pub fn authentication_state(&self) -> AuthenticationState {
        self.state
            .read()
            .expect("authentication state lock poisoned")
            .clone()
    }

    /// Execute an operation without touching the session state
    async fn raw_call(&self, operation: ApiOperation) -> ClientResult<Bytes> {
        let mut service = self.service.clone();
        service.call(ApiRequest::new(operation)).await
    }

    async fn call(&self, operation: ApiOperation) -> ClientResult<Bytes> {
        if operation.requires_auth() {
            self.ensure_session().await?;
        }
        self.raw_call(operation).await
    }

    fn decode<R: DeserializeOwned>(body: &Bytes) -> ClientResult<R> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Establish a backend session if the current token is missing or stale
    pub async fn ensure_session(&self) -> ClientResult<()> {
        if self.authentication_state().is_valid() {
            return Ok(());
        }

        let _guard = self.login_lock.lock().await;
        // Another caller may have logged in while we waited on the lock.
        if self.authentication_state().is_valid() {
            return Ok(());
        }

        let address = self.wallet.address().to_string();
        let body = self
            .raw_call(ApiOperation::GetNonce {
                address: address.clone(),
            })
            .await?;
        let nonce: NonceResponse = Self::decode(&body)?;

        let message = login_message(&self.base_url, &address, &nonce.nonce);
        let signature = self.wallet.sign_message(&message).await?;

        let body = self
            .raw_call(ApiOperation::Login(LoginRequest {
                message,
                signature,
                session_id: nonce.session_id,
            }))
            .await?;
        let login: LoginResponse = Self::decode(&body)?;

        tracing::debug!(address = %login.agent_address, "Backend session established");

        let mut state = self
            .state
            .write()
            .expect("authentication state lock poisoned");
        state.token = Some(login.token);
        state.agent_address = Some(login.agent_address);
        state.expires_at = Some(login.expires_at);

        Ok(())
    }
}

#[async_trait]
impl<T> AuthorizationApi for ApiClient<T>
where
    T: Transport,
{
    async fn authorize_payment(
        &self,
        requirements: &[PaymentRequirement],
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<AuthorizationResponse> {
        let body = self
            .call(ApiOperation::AuthorizePayment(AuthorizationRequest {
                requirements: requirements.to_vec(),
                context: context.cloned(),
            }))
            .await?;

        Self::decode(&body)
    }

    async fn report_payment_event(
        &self,
        id: &str,
        payment: &PaymentPayload,
        event: PaymentEvent,
    ) -> ClientResult<PaymentEventResponse> {
        tracing::debug!(id, kind = event.kind(), "Reporting payment event");

        let body = self
            .call(ApiOperation::ReportPaymentEvent(PaymentEventRequest {
                id: id.to_string(),
                payment: payment.clone(),
                event,
            }))
            .await?;

        Self::decode(&body)
    }
}

/// Build the sign-in message the wallet signs during login
fn login_message(base_url: &Url, address: &str, nonce: &str) -> String {
    let domain = base_url.host_str().unwrap_or("localhost");
    format!(
        "{domain} wants you to sign in with your account:\n{address}\n\n\
         URI: {base_url}\nVersion: 1\nNonce: {nonce}\nIssued At: {}",
        Utc::now().to_rfc3339()
    )
}
