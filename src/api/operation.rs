//! Authorization backend operations

use bytes::Bytes;

use super::types::{AuthorizationRequest, LoginRequest, PaymentEventRequest};
use crate::protocol::ClientError;

/// Abstract operations against the authorization backend
///
/// Each operation maps to one REST endpoint; encoding is independent of the
/// transport executing it.
#[derive(Debug, Clone)]
pub enum ApiOperation {
    /// Fetch a login nonce for a payer address
    GetNonce {
        /// The payer address requesting the nonce
        address: String,
    },

    /// Establish a session from a wallet-signed login message
    Login(LoginRequest),

    /// Submit payment requirements for an authorization decision
    AuthorizePayment(AuthorizationRequest),

    /// Report a payment lifecycle event
    ReportPaymentEvent(PaymentEventRequest),
}

impl ApiOperation {
    /// The endpoint path for this operation
    pub fn endpoint(&self) -> String {
        match self {
            ApiOperation::GetNonce { address } => {
                format!("/api/v1/auth/nonce?address={address}")
            }
            ApiOperation::Login(_) => "/api/v1/auth/login".to_string(),
            ApiOperation::AuthorizePayment(_) => "/api/v1/agent/payments/authorize".to_string(),
            ApiOperation::ReportPaymentEvent(_) => "/api/v1/agent/payments/events".to_string(),
        }
    }

    /// The HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            ApiOperation::GetNonce { .. } => "GET",
            ApiOperation::Login(_)
            | ApiOperation::AuthorizePayment(_)
            | ApiOperation::ReportPaymentEvent(_) => "POST",
        }
    }

    /// Whether this operation requires an established session token
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            ApiOperation::GetNonce { .. } | ApiOperation::Login(_)
        )
    }

    /// Encode the request body
    pub fn encode_body(&self) -> Result<Bytes, ClientError> {
        let bytes = match self {
            ApiOperation::GetNonce { .. } => Vec::new(),
            ApiOperation::Login(request) => serde_json::to_vec(request)?,
            ApiOperation::AuthorizePayment(request) => serde_json::to_vec(request)?,
            ApiOperation::ReportPaymentEvent(request) => serde_json::to_vec(request)?,
        };
        Ok(Bytes::from(bytes))
    }
}
