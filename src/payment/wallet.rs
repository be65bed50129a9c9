//! Wallet collaborator boundary

use async_trait::async_trait;

use super::types::{PaymentPayload, PaymentRequirement};
use crate::protocol::ClientResult;

/// Signs payment payloads and login messages
///
/// The wire-level cryptography lives behind this trait; the client core only
/// sees opaque signed values. Implementations cover EOA keys as well as
/// smart-account signers.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The payer address this wallet signs for
    fn address(&self) -> &str;

    /// Sign an arbitrary login message, returning the hex signature
    async fn sign_message(&self, message: &str) -> ClientResult<String>;

    /// Produce a signed payment payload for exactly one requirement
    async fn create_payment(
        &self,
        requirement: &PaymentRequirement,
    ) -> ClientResult<PaymentPayload>;
}
