#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tempfile::TempDir;

use user_api_rust::config::AppConfig;
use user_api_rust::database::MemoryUserRepository;
use user_api_rust::state::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub repository: Arc<MemoryUserRepository>,
    pub upload_dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the router in-process on a free port, backed by the memory store
/// and a throwaway upload directory. The server lives as long as the test runtime.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let upload_dir = tempfile::tempdir().context("failed to create upload dir")?;

    let mut config = AppConfig::development();
    config.port = port;
    config.api.enable_request_logging = false;
    // Nested path so the handler has to create it
    config.uploads.dir = upload_dir.path().join("uploads").join("users");

    let repository = Arc::new(MemoryUserRepository::new());
    let state = AppState::new(repository.clone(), &config);
    let app = user_api_rust::app(state, &config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer { port, base_url, repository, upload_dir };
    wait_ready(&server, Duration::from_secs(5)).await?;
    Ok(server)
}

async fn wait_ready(server: &TestServer, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if let Ok(resp) = client.get(server.url("/health")).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", server.base_url, timeout)
}

/// Registration payload with one seed post
pub fn user_payload(email: &str) -> Value {
    json!({
        "email": email,
        "user_name": format!("user {}", email),
        "address": {
            "street": "742 Evergreen Terrace",
            "city": "Springfield",
            "state": "OR",
            "zip_code": "97403"
        },
        "posts": {
            "slug": "hello-world",
            "title": "Hello world",
            "description": "first post"
        }
    })
}

/// Create a user and return the response body
pub async fn create_user(server: &TestServer, payload: &Value) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.url("/users/create"))
        .json(payload)
        .send()
        .await?;
    anyhow::ensure!(res.status().is_success(), "create failed: {}", res.status());
    Ok(res.json().await?)
}
