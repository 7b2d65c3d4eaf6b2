#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use farm_api::app::{app, AppState};
use farm_api::auth::{generate_jwt, Claims};
use farm_api::database::InMemoryFarmStore;

pub const SECRET: &str = "integration-test-secret";

/// A server on its own port with a fresh in-memory store.
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let state = AppState::new(InMemoryFarmStore::new(), SECRET);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app(state)).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            task,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /farms and return the created body
    pub async fn create_farm(&self, token: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/farms/"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create failed with {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn get_farm(&self, token: &str, id: i64) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(&format!("/farms/{}", id)))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn token_for(user_id: i32, is_superuser: bool) -> String {
    let claims = Claims::new(user_id, is_superuser, 1).expect("claims");
    generate_jwt(&claims, SECRET).expect("token")
}

pub fn user_token(user_id: i32) -> String {
    token_for(user_id, false)
}

pub fn superuser_token() -> String {
    token_for(1, true)
}
