//! Client-side exchange machinery: registry, sessions, and exchange state

pub mod config;
pub mod connection;
pub mod context;
pub mod reassembler;
pub mod registry;
pub mod session;

pub use config::{ClientConfig, DefaultMessageFactory, MessageFactory};
pub use connection::{AgentConnection, ConnectionFactory, EventStream, HttpConnectionFactory};
pub use context::ContextStore;
pub use reassembler::ArtifactReassembler;
pub use registry::{AgentSummary, CardResolver, HttpCardResolver, RemoteAgentRegistry};
pub use session::{RemoteAgentSession, TaskObserver};
