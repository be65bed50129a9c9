//! Remote agent discovery and caching

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use url::Url;

use super::connection::{AgentConnection, ConnectionFactory};
use crate::protocol::{AgentCard, ClientError, ClientResult};

/// Resolves an agent card from a base URL
#[async_trait]
pub trait CardResolver: Send + Sync {
    /// Fetch the agent's card
    async fn resolve(&self, url: &Url) -> ClientResult<AgentCard>;
}

/// Resolver fetching cards from the well-known HTTP location
#[derive(Debug, Clone)]
pub struct HttpCardResolver {
    client: reqwest::Client,
}

impl HttpCardResolver {
    /// Create a resolver with a default HTTP client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a resolver over a custom reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpCardResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardResolver for HttpCardResolver {
    async fn resolve(&self, url: &Url) -> ClientResult<AgentCard> {
        let card_url = format!(
            "{}/.well-known/agent-card.json",
            url.as_str().trim_end_matches('/')
        );

        let response = self.client.get(&card_url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "Card fetch failed with status {} for {card_url}",
                response.status()
            )));
        }

        Ok(response.json::<AgentCard>().await?)
    }
}

/// Name and description pair for listing available agents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSummary {
    pub name: String,
    pub description: String,
}

/// Discovers remote agents once per process lifetime and caches their
/// descriptors and connections, keyed by agent name
pub struct RemoteAgentRegistry {
    resolver: Arc<dyn CardResolver>,
    factory: Arc<dyn ConnectionFactory>,
    cards: HashMap<String, AgentCard>,
    connections: HashMap<String, Arc<dyn AgentConnection>>,
    initialized: bool,
}

impl RemoteAgentRegistry {
    /// Create an empty registry
    pub fn new(resolver: Arc<dyn CardResolver>, factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            resolver,
            factory,
            cards: HashMap::new(),
            connections: HashMap::new(),
            initialized: false,
        }
    }

    /// Discover all agents at the given URLs
    ///
    /// Idempotent: once initialized, further calls are no-ops and perform no
    /// network calls. Two resolved cards sharing a name abort discovery with
    /// [`ClientError::DuplicateAgent`]; the registry must then be treated as
    /// unusable.
    pub async fn discover(&mut self, urls: &[Url]) -> ClientResult<()> {
        if self.initialized {
            return Ok(());
        }

        for url in urls {
            let card = self.resolver.resolve(url).await?;

            if self.cards.contains_key(&card.name) {
                return Err(ClientError::DuplicateAgent { name: card.name });
            }

            let connection = self.factory.connect(&card)?;
            tracing::info!(agent = %card.name, url = %url, "Discovered remote agent");

            self.connections.insert(card.name.clone(), connection);
            self.cards.insert(card.name.clone(), card);
        }

        self.initialized = true;
        Ok(())
    }

    /// Whether discovery has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// List available agents with their descriptions
    pub fn list_agents(&self) -> Vec<AgentSummary> {
        let mut agents: Vec<AgentSummary> = self
            .cards
            .values()
            .map(|card| AgentSummary {
                name: card.name.clone(),
                description: card.description.clone(),
            })
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        agents
    }

    /// Full card for one agent
    pub fn agent_details(&self, name: &str) -> ClientResult<&AgentCard> {
        self.cards.get(name).ok_or_else(|| self.not_found(name))
    }

    /// Connection for one agent
    pub fn connection(&self, name: &str) -> ClientResult<Arc<dyn AgentConnection>> {
        self.connections
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    fn not_found(&self, name: &str) -> ClientError {
        let mut available: Vec<String> = self.cards.keys().cloned().collect();
        available.sort();
        ClientError::AgentNotFound {
            name: name.to_string(),
            available,
        }
    }
}
