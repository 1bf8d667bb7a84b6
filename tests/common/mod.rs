use std::sync::Arc;

use reqwest::Client;
use viewer_server::config::Config;
use viewer_server::store::GameStore;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Spawn the router in the background with default config.
pub async fn spawn_server() -> TestServer {
    spawn_with(Config::default()).await
}

pub async fn spawn_with(config: Config) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let app = viewer_server::build_router(Arc::new(GameStore::new()), config);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    TestServer {
        base_url: format!("http://{addr}"),
    }
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

#[allow(dead_code)]
pub const RUY_LOPEZ: &str = r#"[Event "Casual"]
[White "Alice"]
[Black "Bob"]
[WhiteElo "2100"]
[Result "1/2-1/2"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 1/2-1/2
"#;

#[allow(dead_code)]
pub const SCHOLARS_MATE: &str = "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7#";
