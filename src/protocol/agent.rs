//! Remote agent descriptors

use serde::{Deserialize, Serialize};

/// Descriptor of a remote agent, published at its well-known card endpoint
///
/// Immutable once discovered; owned exclusively by the registry and looked
/// up by name elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Unique name of the agent
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Base URL the agent is served from
    pub url: String,

    /// Agent version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Capability flags
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Declared skills
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<AgentSkill>,

    /// URL to agent documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl AgentCard {
    /// Create a new agent card
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            version: None,
            capabilities: AgentCapabilities::default(),
            skills: Vec::new(),
            documentation_url: None,
        }
    }

    /// Set the capabilities
    pub fn with_capabilities(mut self, capabilities: AgentCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the agent version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a skill
    pub fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }
}

/// Capability flags declared by an agent
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Supports streaming responses
    #[serde(default)]
    pub streaming: bool,

    /// Supports push notifications via webhooks
    #[serde(default)]
    pub push_notifications: bool,

    /// Protocol extensions the agent understands (e.g. the x402 payment
    /// extension)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<AgentExtension>,
}

impl AgentCapabilities {
    /// Enable streaming
    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    /// Declare a supported extension by URI
    pub fn with_extension(mut self, uri: impl Into<String>) -> Self {
        self.extensions.push(AgentExtension {
            uri: uri.into(),
            required: false,
        });
        self
    }
}

/// A protocol extension declared in an agent card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentExtension {
    /// Extension URI
    pub uri: String,

    /// Whether clients must understand the extension to talk to the agent
    #[serde(default)]
    pub required: bool,
}

/// A skill declared by an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Skill identifier
    pub id: String,

    /// Skill name
    pub name: String,

    /// What the skill does
    pub description: String,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
