//! x402 payment handling: wire types, wallet seam, and the treasurer

pub mod treasurer;
pub mod types;
pub mod wallet;

pub use treasurer::{ApiTreasurer, Treasurer};
pub use types::{
    Authorization, PaymentChallenge, PaymentEvent, PaymentPayload, PaymentRequirement,
    PaymentStatus, ERROR_KEY, PAYLOAD_KEY, REQUIRED_KEY, STATUS_KEY, X402_EXTENSION_URI,
};
pub use wallet::Wallet;
