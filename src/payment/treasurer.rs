//! Payment authorization state machine

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    types::{Authorization, PaymentChallenge, PaymentEvent, PaymentStatus},
    wallet::Wallet,
};
use crate::{
    api::AuthorizationApi,
    protocol::{ClientError, ClientResult},
};

/// Decides whether and how to pay, and reports payment lifecycle events
#[async_trait]
pub trait Treasurer: Send + Sync {
    /// Decide how to satisfy a payment challenge
    ///
    /// Returns `Ok(None)` when no requirement is authorized — a valid
    /// outcome, not an error. On success the returned authorization carries
    /// the correlation id under which a `Sending` event has already been
    /// reported.
    async fn on_payment_required(
        &self,
        challenge: &PaymentChallenge,
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<Option<Authorization>>;

    /// Map a remote payment-status signal to at most one lifecycle event
    /// and report it
    ///
    /// Statuses without a reportable event are filtered out silently. Every
    /// event for one payment attempt reuses the authorization's correlation
    /// id so the backend can thread the event history.
    async fn on_status(
        &self,
        status: PaymentStatus,
        authorization: &Authorization,
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<()>;
}

/// Treasurer backed by the authorization service, with wallet signing
///
/// Works with any payer the [`Wallet`] trait covers.
pub struct ApiTreasurer {
    api: Arc<dyn AuthorizationApi>,
    wallet: Arc<dyn Wallet>,
}

impl ApiTreasurer {
    /// Create a treasurer over an authorization backend and a wallet
    pub fn new(api: Arc<dyn AuthorizationApi>, wallet: Arc<dyn Wallet>) -> Self {
        Self { api, wallet }
    }

    fn reason_from(context: Option<&Map<String, Value>>, default: &str) -> String {
        context
            .and_then(|ctx| ctx.get("reason"))
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    }
}

#[async_trait]
impl Treasurer for ApiTreasurer {
    async fn on_payment_required(
        &self,
        challenge: &PaymentChallenge,
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<Option<Authorization>> {
        let decision = self
            .api
            .authorize_payment(&challenge.accepts, context)
            .await?;

        if decision.authorized.requirements.is_empty() {
            let reasons = decision
                .rejected
                .iter()
                .map(|r| format!("{}: {}", r.requirement.resource, r.reason))
                .collect::<Vec<_>>()
                .join(", ");
            tracing::info!("No requirements authorized. Reasons: {reasons}");
            return Ok(None);
        }

        // The backend orders the accepted list; falling back to the first
        // entry is deliberate, not an affordability judgement.
        let recommended = decision.authorized.recommended.unwrap_or(0);
        let authorized = decision.authorized.requirements.len();
        if recommended >= authorized {
            return Err(ClientError::InvalidRecommendation {
                index: recommended,
                authorized,
            });
        }

        let selected = &decision.authorized.requirements[recommended];
        tracing::debug!(
            resource = %selected.requirement.resource,
            amount = %selected.requirement.max_amount_required,
            daily_remaining = %selected.limits.daily_remaining,
            "Paying requirement {recommended} of {authorized}"
        );

        let payment = self.wallet.create_payment(&selected.requirement).await?;
        let authorization_id = Uuid::new_v4().simple().to_string();

        self.api
            .report_payment_event(&authorization_id, &payment, PaymentEvent::Sending)
            .await?;

        Ok(Some(Authorization {
            authorization_id,
            payment,
        }))
    }

    async fn on_status(
        &self,
        status: PaymentStatus,
        authorization: &Authorization,
        context: Option<&Map<String, Value>>,
    ) -> ClientResult<()> {
        let event = match status {
            PaymentStatus::PaymentSubmitted => Some(PaymentEvent::Sending),
            PaymentStatus::PaymentFailed => Some(PaymentEvent::Error {
                reason: Self::reason_from(context, "Payment processing failed"),
            }),
            PaymentStatus::PaymentRejected => Some(PaymentEvent::Rejected {
                reason: Self::reason_from(context, "Payment rejected by server"),
            }),
            PaymentStatus::PaymentVerified | PaymentStatus::PaymentCompleted => {
                Some(PaymentEvent::Accepted)
            }
            _ => None,
        };

        // Not every status transition is reportable.
        let Some(event) = event else {
            return Ok(());
        };

        self.api
            .report_payment_event(&authorization.authorization_id, &authorization.payment, event)
            .await?;

        Ok(())
    }
}
