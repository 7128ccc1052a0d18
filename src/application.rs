//! Application layer
//!
//! The search use case and the node adapter that exposes it to a flow host.

pub mod node;
pub mod search_service;

pub use node::{
    CompletionCallbacks, HostProtocol, MercariSearchNode, NODE_TYPE, NodeConfig, NodeContext, NodeError,
    NodeRegistry, register,
};
pub use search_service::SearchService;
