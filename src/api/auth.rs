//! Session authentication layer for backend calls

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
    task::{Context, Poll},
};

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tower_layer::Layer;
use tower_service::Service;

use super::service::ApiRequest;
use crate::protocol::ClientError;

/// Current backend authentication state
#[derive(Debug, Default, Clone)]
pub struct AuthenticationState {
    /// Bearer session token, if logged in
    pub token: Option<String>,

    /// Address the session was established for
    pub agent_address: Option<String>,

    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthenticationState {
    /// Whether the session token is present and not about to expire
    ///
    /// A 30 second margin avoids racing the expiry with an in-flight call.
    pub fn is_valid(&self) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        self.token.is_some() && expires_at > Utc::now() + Duration::seconds(30)
    }
}

/// Shared, lock-guarded authentication state
pub type SharedAuthState = Arc<RwLock<AuthenticationState>>;

/// Layer injecting the current session token into authenticated operations
#[derive(Clone)]
pub struct SessionAuthLayer {
    state: SharedAuthState,
}

impl SessionAuthLayer {
    /// Create a layer reading tokens from shared state
    pub fn new(state: SharedAuthState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for SessionAuthLayer {
    type Service = SessionAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionAuthService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Service wrapper applying [`SessionAuthLayer`]
#[derive(Clone)]
pub struct SessionAuthService<S> {
    inner: S,
    state: SharedAuthState,
}

impl<S> Service<ApiRequest> for SessionAuthService<S>
where
    S: Service<ApiRequest, Response = Bytes, Error = ClientError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Bytes;
    type Error = ClientError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: ApiRequest) -> Self::Future {
        if req.operation.requires_auth() && req.token.is_none() {
            req.token = self
                .state
                .read()
                .expect("authentication state lock poisoned")
                .token
                .clone();
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}
