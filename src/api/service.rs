//! Core backend RPC service

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use bytes::Bytes;
use tower_service::Service;

use super::operation::ApiOperation;
use crate::{
    protocol::ClientError,
    transport::{Transport, TransportRequest, TransportResponse},
};

/// A backend request: an operation plus the session token attached to it
///
/// The token is normally injected by the auth layer wrapping this service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// The operation to execute
    pub operation: ApiOperation,

    /// Bearer session token, if one is attached
    pub token: Option<String>,
}

impl ApiRequest {
    /// Create a request with no token attached
    pub fn new(operation: ApiOperation) -> Self {
        Self {
            operation,
            token: None,
        }
    }
}

/// Core service translating backend operations into transport calls
pub struct ApiService<T> {
    transport: Arc<T>,
}

impl<T> ApiService<T>
where
    T: Transport,
{
    /// Create a new backend service over a transport
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    fn build_transport_request(req: &ApiRequest) -> Result<TransportRequest, ClientError> {
        let mut transport_req =
            TransportRequest::new(req.operation.endpoint(), req.operation.method())
                .header("Content-Type", "application/json")
                .header("Accept", "application/json");

        if let Some(token) = &req.token {
            transport_req = transport_req.header("Authorization", format!("Bearer {token}"));
        }

        let body = req.operation.encode_body()?;
        if !body.is_empty() {
            transport_req = transport_req.body(body);
        }

        Ok(transport_req)
    }

    fn handle_error_response(response: &TransportResponse) -> ClientError {
        let message = serde_json::from_slice::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP error: {}", response.status));

        match response.status {
            401 | 403 => ClientError::Auth(message),
            status => ClientError::Api {
                status: Some(status),
                message,
            },
        }
    }
}

impl<T> Service<ApiRequest> for ApiService<T>
where
    T: Transport,
{
    type Response = Bytes;
    type Error = ClientError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ApiRequest) -> Self::Future {
        let transport = self.transport.clone();

        Box::pin(async move {
            let transport_req = Self::build_transport_request(&req)?;
            let response = transport.execute(transport_req).await?;

            if !response.is_success() {
                return Err(Self::handle_error_response(&response));
            }

            Ok(response.body)
        })
    }
}

impl<T> Clone for ApiService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::types::AuthorizationRequest, transport::mock::MockTransport};

    #[tokio::test]
    async fn test_service_attaches_token_and_body() {
        let transport = MockTransport::new(|req| {
            assert_eq!(req.endpoint, "/api/v1/agent/payments/authorize");
            assert_eq!(
                req.headers.get("Authorization").map(String::as_str),
                Some("Bearer tok-1")
            );
            assert!(!req.body.is_empty());
            TransportResponse::new(200).body(Bytes::from_static(b"{}"))
        });

        let mut service = ApiService::new(transport);
        let mut request = ApiRequest::new(ApiOperation::AuthorizePayment(AuthorizationRequest {
            requirements: vec![],
            context: None,
        }));
        request.token = Some("tok-1".into());

        let body = service.call(request).await.unwrap();
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn test_service_maps_auth_errors() {
        let transport = MockTransport::new(|_req| {
            TransportResponse::new(401).body(Bytes::from_static(br#"{"message": "Unauthorized"}"#))
        });

        let mut service = ApiService::new(transport);
        let request = ApiRequest::new(ApiOperation::GetNonce {
            address: "0xabc".into(),
        });

        let err = service.call(request).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(message) if message == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_service_maps_api_errors_with_status() {
        let transport = MockTransport::new(|_req| {
            TransportResponse::new(422).body(Bytes::from_static(br#"{"error": "bad payload"}"#))
        });

        let mut service = ApiService::new(transport);
        let request = ApiRequest::new(ApiOperation::GetNonce {
            address: "0xabc".into(),
        });

        match service.call(request).await.unwrap_err() {
            ClientError::Api { status, message } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "bad payload");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
