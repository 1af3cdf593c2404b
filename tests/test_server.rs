//! Local chat backend for tests
//!
//! This module provides a simple HTTP server that stands in for the chat
//! service (`/api/chat`, `/api/agents`, `/api/health`) so the widget can be
//! exercised over real HTTP without an external backend.
//!
//! Each server instance runs on a random available port for perfect test isolation,
//! and records every `/api/chat` body it receives.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use warp::Filter;

/// How the server answers `POST /api/chat`
#[derive(Clone)]
#[allow(dead_code)]
pub enum ChatBehavior {
    /// `{"response": "echo: <message>"}`
    Echo,
    /// Fixed JSON body with status 200
    Reply(Value),
    /// Empty-bodied answer with this status
    Status(u16),
    /// Raw, possibly non-JSON body with status 200
    Raw(&'static str),
}

/// Test server that plays the chat backend
pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

fn respond(status: u16, body: String) -> warp::http::Response<String> {
    warp::http::Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(body)
        .expect("valid response")
}

impl TestServer {
    /// Start an echoing server on a random available port
    #[allow(dead_code)]
    pub async fn start() -> Self {
        Self::with_behavior(ChatBehavior::Echo).await
    }

    /// Start a server whose `/api/chat` answers according to `behavior`
    pub async fn with_behavior(behavior: ChatBehavior) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Routes
        let health = warp::path!("api" / "health")
            .map(|| warp::reply::json(&json!({ "status": "healthy" })));

        let recorded = requests.clone();
        let chat = warp::path!("api" / "chat")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |body: Value| {
                recorded.lock().unwrap().push(body.clone());
                match &behavior {
                    ChatBehavior::Echo => {
                        let message = body["message"].as_str().unwrap_or_default();
                        respond(
                            200,
                            json!({ "response": format!("echo: {}", message) }).to_string(),
                        )
                    }
                    ChatBehavior::Reply(value) => respond(200, value.to_string()),
                    ChatBehavior::Status(status) => respond(*status, String::new()),
                    ChatBehavior::Raw(raw) => respond(200, raw.to_string()),
                }
            });

        let agents = warp::path!("api" / "agents").and(warp::get()).map(|| {
            warp::reply::json(&json!({
                "agents": [
                    {
                        "type": "admission",
                        "name": "Агент по поступлению",
                        "description": "Вопросы поступления и документов"
                    },
                    {
                        "type": "scholarship",
                        "name": "Агент по стипендиям",
                        "description": "Гранты и стипендии"
                    }
                ],
                "total_agents": 2
            }))
        });

        let routes = health.or(chat).or(agents);

        // Bind to random port
        let (addr, server) =
            warp::serve(routes).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                shutdown_rx.await.ok();
            });

        // Spawn server in background
        tokio::spawn(server);

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            requests,
        }
    }

    /// Get the base URL for this server (e.g., "http://127.0.0.1:12345")
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address (for meta tests)
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bodies received on `/api/chat`, oldest first
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait for the server to be ready by making a test request
    pub async fn wait_ready(&self) -> anyhow::Result<()> {
        let url = format!("{}/api/health", self.url());
        let max_attempts = 10;

        for attempt in 1..=max_attempts {
            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    println!("✅ Test server ready on: {}", self.url());
                    return Ok(());
                }
                Ok(response) => {
                    println!(
                        "⚠️ Attempt {}: Server returned status {}",
                        attempt,
                        response.status()
                    );
                }
                Err(e) => {
                    println!("⚠️ Attempt {}: Server not ready - {}", attempt, e);
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            }
        }

        anyhow::bail!(
            "Server did not become ready after {} attempts",
            max_attempts
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Signal server to shutdown
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Base URL of a port nothing is listening on
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scratch listener");
    let addr = listener.local_addr().expect("scratch listener address");
    drop(listener);
    format!("http://{}", addr)
}
