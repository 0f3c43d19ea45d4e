//! Shared test utilities for control-api integration tests.

use control_api::rest::{AppState, create_router};
use control_api::{AddressConfig, GateConfig, OperationGate, ToolCommand};
use reqwest::{Client, Method, Response as ReqwestResponse};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Gate config whose orchestration tool is the shell `script`.
///
/// The route arguments arrive as `$1..`. Address discovery always falls back
/// to loopback.
pub fn script_config(script: &str, command_timeout: Duration) -> GateConfig {
    GateConfig {
        compose: ToolCommand::new("sh", ["-c", script, "compose"]),
        command_timeout,
        address: AddressConfig {
            env_var: "CONTROL_API_TEST_REST_ADDR".to_string(),
            discovery: ToolCommand::new("control-api-no-such-tool", Vec::<String>::new()),
            timeout: Duration::from_millis(200),
        },
    }
}

/// Test server wrapper serving the router on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub gate: Arc<OperationGate>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    /// Spawn a server whose orchestration tool runs `script`.
    pub async fn spawn(script: &str) -> Self {
        Self::spawn_with(script_config(script, Duration::from_secs(10))).await
    }

    pub async fn spawn_with(config: GateConfig) -> Self {
        let gate = Arc::new(OperationGate::new(config));
        let app_state = Arc::new(AppState { gate: gate.clone() });
        let router = create_router(app_state);

        // Bind to port 0 to let OS choose available port
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
        let actual_addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr: actual_addr,
            client: Client::new(),
            gate,
            shutdown_tx,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Perform a GET request.
    pub async fn get(&self, path: &str) -> ReqwestResponse {
        self.request(Method::GET, path).await
    }

    /// Perform a POST request without a body.
    pub async fn post(&self, path: &str) -> ReqwestResponse {
        self.request(Method::POST, path).await
    }

    pub async fn request(&self, method: Method, path: &str) -> ReqwestResponse {
        self.client
            .request(method, self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Assert the three CORS headers every response carries.
pub fn assert_cors(response: &ReqwestResponse) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}
