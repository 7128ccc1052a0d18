//! Run one search through the node from the command line.
//!
//! Usage: `mercari-search <keyword>`. The output message is printed to stdout
//! as JSON; logs go to stderr and the log file.

use anyhow::{Context, Result, anyhow};
use mercari_search_lib::application::{MercariSearchNode, NodeConfig, NodeContext, NodeError};
use mercari_search_lib::domain::Message;
use mercari_search_lib::infrastructure::{ConfigManager, SearchPageFetcher, init_logging_with_config};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Host that prints forwarded messages and records errors
#[derive(Default)]
struct StdoutHost {
    failure: Mutex<Option<String>>,
}

impl NodeContext for StdoutHost {
    fn send(&self, message: Message) {
        match serde_json::to_string_pretty(&message) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("Failed to render output message: {}", e),
        }
    }

    fn error(&self, error: &NodeError, message: &Message) {
        error!("Message {} failed: {}", message.id, error);
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error.to_string());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let keyword = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: mercari-search <keyword>"))?;

    let config = ConfigManager::new()?.load_config().await?;
    init_logging_with_config(&config.logging)?;
    info!("mercari-search {}", env!("CARGO_PKG_VERSION"));

    let host = Arc::new(StdoutHost::default());
    let source = Arc::new(SearchPageFetcher::from_config(config.http)?);
    let node = MercariSearchNode::new(
        NodeConfig {
            id: "cli".to_string(),
            name: "command line".to_string(),
        },
        host.clone(),
        source,
    )
    .context("Failed to create search node")?;

    node.on_input(Message::new(keyword)).await;

    let failure = host
        .failure
        .lock()
        .map_err(|_| anyhow!("host state poisoned"))?
        .take();
    match failure {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}
