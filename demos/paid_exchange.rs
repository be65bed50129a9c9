use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use a2a_x402_client::api::{ApiClient, ApiClientOptions};
use a2a_x402_client::client::{HttpCardResolver, HttpConnectionFactory};
use a2a_x402_client::payment::{PaymentPayload, PaymentRequirement, Wallet};
use a2a_x402_client::prelude::*;
use a2a_x402_client::protocol::ClientResult;

// Configuration - update these to match your deployment
const BACKEND_URL: &str = "https://your-backend-url";
const AGENT_URL: &str = "https://your-agent-url";
const PAYER_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Placeholder wallet. Plug in a real signer before paying anything.
struct DevWallet;

#[async_trait]
impl Wallet for DevWallet {
    fn address(&self) -> &str {
        PAYER_ADDRESS
    }

    async fn sign_message(&self, _message: &str) -> ClientResult<String> {
        Ok("0xdeadbeef".to_string())
    }

    async fn create_payment(
        &self,
        requirement: &PaymentRequirement,
    ) -> ClientResult<PaymentPayload> {
        Ok(PaymentPayload {
            x402_version: 1,
            scheme: requirement.scheme.clone(),
            network: requirement.network.clone(),
            payload: json!({"signature": "0xdeadbeef"}),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("🚀 Paid Exchange Example\n");

    let wallet: Arc<dyn Wallet> = Arc::new(DevWallet);

    // Step 1: Wire up the treasurer against the authorization backend
    let api = Arc::new(ApiClient::new(
        ApiClientOptions::new(BACKEND_URL.parse()?),
        wallet.clone(),
    )?);
    let treasurer = Arc::new(ApiTreasurer::new(api, wallet));
    println!("✓ Treasurer configured for: {BACKEND_URL}\n");

    // Step 2: Discover remote agents
    println!("📋 Discovering remote agents...");
    let mut registry = RemoteAgentRegistry::new(
        Arc::new(HttpCardResolver::new()),
        Arc::new(HttpConnectionFactory::new()),
    );
    registry.discover(&[AGENT_URL.parse()?]).await?;

    for agent in registry.list_agents() {
        println!("  - {} — {}", agent.name, agent.description);
    }

    // Step 3: Run an exchange; payment challenges settle transparently
    let session = RemoteAgentSession::new(Arc::new(registry), treasurer)
        .with_task_observer(Arc::new(|task: &Task| {
            println!("  … task {} is {}", task.id, task.status.state);
        }));

    let answer = session
        .send("subgraph_agent", "Query Uniswap V3 pools on Base")
        .await?;

    println!("\n💬 Agent answered:\n{answer}");

    Ok(())
}
