//! Flow host adapter for the search use case
//!
//! The host owns the message bus. A node receives one [`Message`] per input,
//! runs a search for its payload and reports back. Hosts come in two
//! flavours: newer ones hand out `send`/`done` completion callbacks, older
//! ones only offer the node's own `send` and `error`. The flavour is detected
//! once when the node is built and fixed for its lifetime.

use crate::application::search_service::SearchService;
use crate::domain::message::Message;
use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::search_error::{SearchError, SearchResult};
use crate::infrastructure::search_page_fetcher::{PageSource, SearchPageFetcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Type name the node is registered under
pub const NODE_TYPE: &str = "mercari-search";

/// Node settings as supplied by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Failure of one input, tagged with the message it came from
#[derive(Error, Debug, Clone)]
#[error("mercari-search failed: {source}")]
pub struct NodeError {
    #[source]
    pub source: SearchError,
    pub message: Message,
}

/// Facilities every host provides to a node
pub trait NodeContext: Send + Sync {
    /// Forward a message to the next stage
    fn send(&self, message: Message);

    /// Raise an error event on the node
    fn error(&self, error: &NodeError, message: &Message);

    /// Completion callbacks, on hosts that support them
    fn completion(&self) -> Option<Arc<dyn CompletionCallbacks>> {
        None
    }
}

/// Explicit send/done callbacks offered by newer hosts
pub trait CompletionCallbacks: Send + Sync {
    fn send(&self, message: Message);

    /// Signal that one input has been handled
    fn done(&self, error: Option<NodeError>);
}

/// Completion convention in use for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProtocol {
    CompletionCallbacks,
    NodeEvents,
}

/// How a node hands results back to the host
trait Reporter: Send + Sync {
    fn protocol(&self) -> HostProtocol;
    fn forward(&self, message: Message);
    fn complete(&self);
    fn fail(&self, error: NodeError);
}

struct CallbackReporter {
    callbacks: Arc<dyn CompletionCallbacks>,
}

impl Reporter for CallbackReporter {
    fn protocol(&self) -> HostProtocol {
        HostProtocol::CompletionCallbacks
    }

    fn forward(&self, message: Message) {
        self.callbacks.send(message);
    }

    fn complete(&self) {
        self.callbacks.done(None);
    }

    fn fail(&self, error: NodeError) {
        self.callbacks.done(Some(error));
    }
}

struct NodeEventReporter {
    context: Arc<dyn NodeContext>,
}

impl Reporter for NodeEventReporter {
    fn protocol(&self) -> HostProtocol {
        HostProtocol::NodeEvents
    }

    fn forward(&self, message: Message) {
        self.context.send(message);
    }

    // Legacy hosts have no completion signal
    fn complete(&self) {}

    fn fail(&self, error: NodeError) {
        self.context.error(&error, &error.message);
    }
}

fn select_reporter(context: Arc<dyn NodeContext>) -> Box<dyn Reporter> {
    match context.completion() {
        Some(callbacks) => Box::new(CallbackReporter { callbacks }),
        None => Box::new(NodeEventReporter { context }),
    }
}

/// Search node: keyword payload in, listing records payload out
pub struct MercariSearchNode {
    config: NodeConfig,
    service: SearchService,
    reporter: Box<dyn Reporter>,
}

impl MercariSearchNode {
    pub fn new(config: NodeConfig, context: Arc<dyn NodeContext>, source: Arc<dyn PageSource>) -> SearchResult<Self> {
        let reporter = select_reporter(context);
        info!(
            "Created {} node '{}' using {:?}",
            NODE_TYPE,
            config.id,
            reporter.protocol()
        );

        Ok(Self {
            config,
            service: SearchService::new(source)?,
            reporter,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn protocol(&self) -> HostProtocol {
        self.reporter.protocol()
    }

    /// Handle one input message.
    ///
    /// On success exactly one output message is forwarded; on failure nothing
    /// is forwarded and exactly one error is reported.
    pub async fn on_input(&self, message: Message) {
        debug!(node = %self.config.id, msg_id = %message.id, "Input received");

        let result = self.process(&message).await;
        match result {
            Ok(output) => {
                self.reporter.forward(output);
                self.reporter.complete();
            }
            Err(source) => {
                error!(node = %self.config.id, msg_id = %message.id, "Search failed: {}", source);
                self.reporter.fail(NodeError { source, message });
            }
        }
    }

    /// Handle `message` on its own task
    pub fn spawn_input(self: &Arc<Self>, message: Message) -> JoinHandle<()> {
        let node = Arc::clone(self);
        tokio::spawn(async move { node.on_input(message).await })
    }

    async fn process(&self, message: &Message) -> SearchResult<Message> {
        let keyword = message
            .keyword()
            .ok_or_else(|| SearchError::invalid_keyword("payload is not a string, number or boolean"))?;

        let records = self.service.search(&keyword).await?;
        let payload = serde_json::to_value(&records).map_err(|e| SearchError::Serialization {
            message: e.to_string(),
        })?;

        Ok(message.clone().with_payload(payload))
    }
}

/// Node constructor handed to the host
pub type NodeConstructor =
    Box<dyn Fn(NodeConfig, Arc<dyn NodeContext>) -> SearchResult<MercariSearchNode> + Send + Sync>;

/// Host registry of node types
pub trait NodeRegistry {
    fn register_type(&mut self, type_name: &str, constructor: NodeConstructor);
}

/// Register the search node type.
///
/// All nodes built through the registry share one HTTP client.
pub fn register(registry: &mut dyn NodeRegistry, http: HttpClientConfig) -> SearchResult<()> {
    let source: Arc<dyn PageSource> = Arc::new(SearchPageFetcher::from_config(http)?);

    registry.register_type(
        NODE_TYPE,
        Box::new(move |config, context| MercariSearchNode::new(config, context, Arc::clone(&source))),
    );

    info!("Registered node type {}", NODE_TYPE);
    Ok(())
}
