//! Authorization backend wire models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payment::{PaymentEvent, PaymentPayload, PaymentRequirement};

/// Payment authorization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Candidate requirements from the challenge, in challenge order
    pub requirements: Vec<PaymentRequirement>,

    /// Free-form call context forwarded to the policy backend
    pub context: Option<Map<String, Value>>,
}

/// Single authorized requirement with remaining spend limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizedRequirement {
    /// The authorized payment requirement
    pub requirement: PaymentRequirement,

    /// Remaining spend limits after this requirement
    pub limits: SpendLimits,
}

/// Remaining spend limits, in the asset's smallest unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendLimits {
    pub daily_remaining: String,
    pub monthly_remaining: String,
}

/// Single rejected requirement with the backend's reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedRequirement {
    /// The rejected payment requirement
    pub requirement: PaymentRequirement,

    /// Why this requirement was rejected
    pub reason: String,
}

/// Authorized requirements with an optional recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizedSet {
    /// Index of the recommended requirement within `requirements`
    ///
    /// Ordering policy (e.g. cheapest-first) is the backend's responsibility.
    #[serde(default)]
    pub recommended: Option<usize>,

    /// Authorized payment requirements; empty if none were authorized
    #[serde(default)]
    pub requirements: Vec<AuthorizedRequirement>,
}

/// Payment authorization response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationResponse {
    /// Authorized requirements with recommendation
    pub authorized: AuthorizedSet,

    /// Rejected requirements with reasons
    #[serde(default)]
    pub rejected: Vec<RejectedRequirement>,
}

/// Payment lifecycle event report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEventRequest {
    /// Correlation id minted when the payment was authorized
    pub id: String,

    /// The signed payment the event refers to
    pub payment: PaymentPayload,

    /// The lifecycle transition being reported
    pub event: PaymentEvent,
}

/// Acknowledgement of a reported payment event
///
/// The backend's record id may arrive under either a camel-case or
/// snake-case key; both normalize into `payment_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentEventResponse {
    /// Whether the backend accepted the event
    pub received: bool,

    /// Internal payment record id, if one was created
    #[serde(default, alias = "paymentId")]
    pub payment_id: Option<String>,
}

/// Nonce handshake response preceding login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NonceResponse {
    pub nonce: String,

    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
}

/// Wallet-signed login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The signed-in message text
    pub message: String,

    /// Hex signature over `message`
    pub signature: String,

    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Login response establishing a backend session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Bearer token for subsequent authenticated calls
    pub token: String,

    #[serde(rename = "agentAddress", alias = "agent_address")]
    pub agent_address: String,

    #[serde(rename = "expiresAt", alias = "expires_at")]
    pub expires_at: DateTime<Utc>,
}
