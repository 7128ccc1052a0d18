//! Message flow through the search node for both host protocols

use async_trait::async_trait;
use mercari_search_lib::application::{
    CompletionCallbacks, HostProtocol, MercariSearchNode, NodeConfig, NodeContext, NodeError,
};
use mercari_search_lib::domain::Message;
use mercari_search_lib::infrastructure::{
    FetchedPage, HttpClient, HttpClientConfig, PageSource, SearchError, SearchPageFetcher, SearchResult,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use url::Url;

const TWO_LISTINGS: &str = r#"<html><body>
  <section class="items-box">
    <a href="/jp/items/m100/">
      <div class="items-box-photo"><img src="https://static.mercdn.net/m100.jpg"><div class="item-sold-out-badge">SOLD</div></div>
      <h3 class="items-box-name">スニーカー</h3>
      <div class="items-box-price">¥5,000</div>
    </a>
  </section>
  <section class="items-box">
    <a href="/jp/items/m200/">
      <div class="items-box-photo"><img src="https://static.mercdn.net/m200.jpg"></div>
      <h3 class="items-box-name">ブーツ</h3>
      <div class="items-box-price">¥7,500</div>
    </a>
  </section>
</body></html>"#;

/// Legacy host: node-level send and error only
#[derive(Default)]
struct LegacyHost {
    sent: Mutex<Vec<Message>>,
    errors: Mutex<Vec<(String, Message)>>,
}

impl NodeContext for LegacyHost {
    fn send(&self, message: Message) {
        self.sent.lock().unwrap().push(message);
    }

    fn error(&self, error: &NodeError, message: &Message) {
        self.errors.lock().unwrap().push((error.to_string(), message.clone()));
    }
}

#[derive(Default)]
struct RecordingCallbacks {
    sent: Mutex<Vec<Message>>,
    done: Mutex<Vec<Option<NodeError>>>,
}

impl CompletionCallbacks for RecordingCallbacks {
    fn send(&self, message: Message) {
        self.sent.lock().unwrap().push(message);
    }

    fn done(&self, error: Option<NodeError>) {
        self.done.lock().unwrap().push(error);
    }
}

/// Newer host: completion callbacks; node-level facilities must stay unused
#[derive(Default)]
struct ModernHost {
    callbacks: Arc<RecordingCallbacks>,
    legacy: LegacyHost,
}

impl NodeContext for ModernHost {
    fn send(&self, message: Message) {
        self.legacy.send(message);
    }

    fn error(&self, error: &NodeError, message: &Message) {
        self.legacy.error(error, message);
    }

    fn completion(&self) -> Option<Arc<dyn CompletionCallbacks>> {
        let callbacks: Arc<dyn CompletionCallbacks> = self.callbacks.clone();
        Some(callbacks)
    }
}

struct StaticSource(&'static str);

#[async_trait]
impl PageSource for StaticSource {
    async fn fetch_page(&self, keyword: &str) -> SearchResult<FetchedPage> {
        let mut url = Url::parse("https://www.mercari.com/jp/search/").unwrap();
        url.query_pairs_mut().append_pair("keyword", keyword);
        Ok(FetchedPage {
            url,
            body: self.0.to_string(),
        })
    }
}

struct UnreachableSource;

#[async_trait]
impl PageSource for UnreachableSource {
    async fn fetch_page(&self, keyword: &str) -> SearchResult<FetchedPage> {
        Err(SearchError::RequestFailed {
            url: format!("https://www.mercari.com/jp/search/?keyword={keyword}"),
            message: "error trying to connect: connection refused".to_string(),
        })
    }
}

fn node_config() -> NodeConfig {
    NodeConfig {
        id: "node-1".to_string(),
        name: "search".to_string(),
    }
}

fn unlimited_client() -> Arc<HttpClient> {
    let config = HttpClientConfig {
        max_requests_per_second: 0,
        ..Default::default()
    };
    Arc::new(HttpClient::new(config).unwrap())
}

#[tokio::test]
async fn end_to_end_search_with_completion_callbacks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/jp/search/")
        .match_query(mockito::Matcher::UrlEncoded("keyword".into(), "shoes".into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(TWO_LISTINGS)
        .expect(1)
        .create_async()
        .await;

    let base = Url::parse(&format!("{}/jp/search/", server.url())).unwrap();
    let fetcher = SearchPageFetcher::with_search_base(unlimited_client(), base);
    assert!(fetcher.search_url("shoes").as_str().ends_with("/jp/search/?keyword=shoes"));

    let host = Arc::new(ModernHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(fetcher)).unwrap();
    assert_eq!(node.protocol(), HostProtocol::CompletionCallbacks);

    let input = Message::new("shoes").with_property("topic", "sneakers");
    node.on_input(input.clone()).await;
    mock.assert_async().await;

    let sent = host.callbacks.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, input.id);
    assert_eq!(sent[0].properties["topic"], "sneakers");

    let payload = sent[0].payload.as_array().unwrap();
    assert_eq!(payload.len(), 2);
    assert_eq!(payload[0]["soldOut"], true);
    assert_eq!(payload[1]["soldOut"], false);
    assert_eq!(payload[0]["name"], "スニーカー");
    assert_eq!(payload[1]["price"], "¥7,500");
    assert_eq!(payload[1]["href"], "/jp/items/m200/");
    assert_eq!(
        payload[1]["url"].as_str().unwrap(),
        format!("{}/jp/items/m200/", server.url())
    );

    let done = host.callbacks.done.lock().unwrap();
    assert_eq!(done.len(), 1);
    assert!(done[0].is_none());

    assert!(host.legacy.sent.lock().unwrap().is_empty());
    assert!(host.legacy.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn legacy_host_receives_direct_forward() {
    let host = Arc::new(LegacyHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(StaticSource(TWO_LISTINGS))).unwrap();
    assert_eq!(node.protocol(), HostProtocol::NodeEvents);

    node.on_input(Message::new("shoes")).await;

    let sent = host.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].payload[0]["url"],
        json!("https://www.mercari.com/jp/items/m100/")
    );
    assert!(host.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn network_failure_reports_one_error_with_completion_callbacks() {
    let host = Arc::new(ModernHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(UnreachableSource)).unwrap();

    let input = Message::new("shoes");
    node.on_input(input.clone()).await;

    assert!(host.callbacks.sent.lock().unwrap().is_empty());
    let done = host.callbacks.done.lock().unwrap();
    assert_eq!(done.len(), 1);

    let error = done[0].as_ref().unwrap();
    assert_eq!(error.message, input);
    assert!(error.source.is_fetch_failure());
    assert!(host.legacy.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn network_failure_raises_node_error_on_legacy_host() {
    let host = Arc::new(LegacyHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(UnreachableSource)).unwrap();

    let input = Message::new("shoes");
    node.on_input(input.clone()).await;

    assert!(host.sent.lock().unwrap().is_empty());
    let errors = host.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, input);
    assert!(errors[0].0.contains("connection refused"));
}

#[tokio::test]
async fn server_error_status_is_a_failure() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/jp/search/")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let base = Url::parse(&format!("{}/jp/search/", server.url())).unwrap();
    let fetcher = SearchPageFetcher::with_search_base(unlimited_client(), base);
    let host = Arc::new(ModernHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(fetcher)).unwrap();

    node.on_input(Message::new("shoes")).await;
    mock.assert_async().await;

    assert!(host.callbacks.sent.lock().unwrap().is_empty());
    let done = host.callbacks.done.lock().unwrap();
    assert!(matches!(
        done[0].as_ref().map(|e| &e.source),
        Some(SearchError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn non_keyword_payload_is_rejected() {
    let host = Arc::new(LegacyHost::default());
    let node = MercariSearchNode::new(node_config(), host.clone(), Arc::new(StaticSource(TWO_LISTINGS))).unwrap();

    let input = Message::new(json!({"keyword": "shoes"}));
    node.on_input(input.clone()).await;

    assert!(host.sent.lock().unwrap().is_empty());
    let errors = host.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, input);
}

#[tokio::test]
async fn concurrent_inputs_are_independent() {
    let host = Arc::new(ModernHost::default());
    let node = Arc::new(
        MercariSearchNode::new(node_config(), host.clone(), Arc::new(StaticSource(TWO_LISTINGS))).unwrap(),
    );

    let inputs: Vec<Message> = ["shoes", "boots", "bag", "hat"].into_iter().map(Message::new).collect();
    let handles: Vec<_> = inputs.iter().cloned().map(|m| node.spawn_input(m)).collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap();
    }

    let sent = host.callbacks.sent.lock().unwrap();
    assert_eq!(sent.len(), inputs.len());
    for input in &inputs {
        let output = sent.iter().find(|m| m.id == input.id).unwrap();
        assert_eq!(output.payload.as_array().unwrap().len(), 2);
    }
    assert_eq!(host.callbacks.done.lock().unwrap().len(), inputs.len());
}
