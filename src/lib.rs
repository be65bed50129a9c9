//! # a2a-x402-client
//!
//! An A2A protocol client with transparent x402 payment handling.
//!
//! A local orchestrating agent exchanges messages with remote agents over a
//! streaming RPC protocol. Remote agents may reject a request with a set of
//! acceptable payment requirements; the client authorizes, constructs, and
//! attaches a payment proof before retrying, then reports the outcome back
//! to an authorization service.
//!
//! ## Features
//!
//! - **Discovery**: resolve and cache remote agent cards once per process
//! - **Streaming exchanges**: one logical response per call, folded from a
//!   stream of task, status, and artifact events
//! - **Chunked artifacts**: partial results reassemble in emission order,
//!   regardless of arrival pattern
//! - **Transparent payments**: payment-required challenges are authorized,
//!   signed, attached, and reported without caller involvement
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_x402_client::prelude::*;
//! use a2a_x402_client::api::{ApiClient, ApiClientOptions};
//! use a2a_x402_client::client::{HttpCardResolver, HttpConnectionFactory};
//!
//! # async fn example(wallet: Arc<dyn a2a_x402_client::payment::Wallet>) -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(ApiClient::new(
//!     ApiClientOptions::new("https://backend.example.com".parse()?),
//!     wallet.clone(),
//! )?);
//! let treasurer = Arc::new(ApiTreasurer::new(api, wallet));
//!
//! let mut registry = RemoteAgentRegistry::new(
//!     Arc::new(HttpCardResolver::new()),
//!     Arc::new(HttpConnectionFactory::new()),
//! );
//! registry.discover(&["https://agent.example.com".parse()?]).await?;
//!
//! let session = RemoteAgentSession::new(Arc::new(registry), treasurer);
//! let answer = session.send("subgraph_agent", "Query Uniswap V3 pools").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod codec;
pub mod payment;
pub mod protocol;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        client::{ClientConfig, RemoteAgentRegistry, RemoteAgentSession},
        payment::{ApiTreasurer, Treasurer},
        protocol::{
            AgentCard, ClientError, ClientResult, Message, MessagePart, Role, Task, TaskState,
        },
    };
}
