//! x402 payment wire model
//!
//! Requirements and challenges are supplied by the remote side and travel in
//! task metadata under the extension keys below. Payloads are produced by a
//! wallet collaborator and attached to the retried message.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::Task;

/// URI identifying the x402 payment extension
pub const X402_EXTENSION_URI: &str = "https://github.com/google-a2a/a2a-x402/v0.1";

/// Task/event metadata key carrying a [`PaymentStatus`]
pub const STATUS_KEY: &str = "x402.payment.status";

/// Task metadata key carrying a [`PaymentChallenge`]
pub const REQUIRED_KEY: &str = "x402.payment.required";

/// Message metadata key carrying a signed [`PaymentPayload`]
pub const PAYLOAD_KEY: &str = "x402.payment.payload";

/// Task/event metadata key carrying a failure reason
pub const ERROR_KEY: &str = "x402.payment.error";

/// One accepted way to pay for a resource
///
/// Immutable, supplied by the remote agent inside a challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirement {
    /// Payment scheme (e.g. "exact")
    pub scheme: String,

    /// Settlement network (e.g. "base", "base-sepolia")
    pub network: String,

    /// Required amount in the asset's smallest unit, as a decimal string
    pub max_amount_required: String,

    /// Identifier of the resource being paid for
    pub resource: String,

    /// Human-readable description of the charge
    pub description: String,

    /// MIME type of the paid resource
    pub mime_type: String,

    /// Address of the payee
    pub pay_to: String,

    /// Seconds the requirement stays payable
    pub max_timeout_seconds: u64,

    /// Asset contract address
    pub asset: String,

    /// Scheme-specific metadata (e.g. EIP-712 domain fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// A signed payment bound to exactly one requirement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentPayload {
    /// x402 protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,

    /// Scheme of the requirement this payment satisfies
    pub scheme: String,

    /// Network of the requirement this payment satisfies
    pub network: String,

    /// Scheme-specific signed payload
    pub payload: Value,
}

impl PaymentPayload {
    /// Encode the payload in its base64 header form (the `X-PAYMENT` shape)
    pub fn to_header(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }
}

/// A payment-required challenge naming acceptable requirements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentChallenge {
    /// x402 protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,

    /// Acceptable payment requirements, in server preference order
    pub accepts: Vec<PaymentRequirement>,

    /// Optional error text explaining why payment is required again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentChallenge {
    /// Extract a challenge from a task's metadata, if one is embedded
    ///
    /// Malformed challenge payloads are logged and treated as absent.
    pub fn from_task(task: &Task) -> Option<Self> {
        let value = task.metadata.as_ref()?.get(REQUIRED_KEY)?;
        match serde_json::from_value(value.clone()) {
            Ok(challenge) => Some(challenge),
            Err(e) => {
                tracing::warn!(task = %task.id, "Discarding malformed payment challenge: {e}");
                None
            }
        }
    }
}

/// Remote payment-status signal carried in task metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    PaymentRequired,
    PaymentSubmitted,
    PaymentVerified,
    PaymentCompleted,
    PaymentFailed,
    PaymentRejected,
}

impl PaymentStatus {
    /// Read a status signal out of a metadata map, if present
    pub fn from_metadata(metadata: Option<&Map<String, Value>>) -> Option<Self> {
        let value = metadata?.get(STATUS_KEY)?;
        serde_json::from_value(value.clone()).ok()
    }
}

/// A point-in-time payment lifecycle transition
///
/// Append-only log semantics: each event is reported once and never
/// corrected retroactively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaymentEvent {
    /// Payment is being sent
    Sending,

    /// Payment was accepted
    Accepted,

    /// Payment was rejected
    Rejected { reason: String },

    /// Payment encountered an error
    Error { reason: String },
}

impl PaymentEvent {
    /// The wire tag of this event
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentEvent::Sending => "sending",
            PaymentEvent::Accepted => "accepted",
            PaymentEvent::Rejected { .. } => "rejected",
            PaymentEvent::Error { .. } => "error",
        }
    }
}

/// A client-held record binding a correlation id to a signed payment
///
/// Created once per payment decision; never mutated. Later lifecycle events
/// reference it via the correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorization {
    /// Correlation identifier threading the event history for this payment
    pub authorization_id: String,

    /// The signed payment payload
    pub payment: PaymentPayload,
}
