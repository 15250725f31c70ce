/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for hydro-sdk tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use hydro_sdk::{ClientConfig, HydroClient, MockWalletSigner};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use wiremock::{MockServer, ResponseTemplate};

/// Hardhat/Anvil default account #0
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const MOCK_ADDRESS: &str = "0x1234567890abcdef";
pub const MOCK_SIGNATURE: &str = "0xmock_signature";

pub const WAIT: Duration = Duration::from_secs(5);
pub const QUIET: Duration = Duration::from_millis(200);

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default().with_api_url(server.uri())
}

/// Client without a signer pointed at the mock server
pub fn public_client(server: &MockServer) -> HydroClient {
    HydroClient::with_config(config_for(server)).expect("client init")
}

/// Client with a fixed-signature signer pointed at the mock server
pub fn signed_client(server: &MockServer) -> HydroClient {
    HydroClient::with_signer(
        Arc::new(MockWalletSigner::new(MOCK_ADDRESS, MOCK_SIGNATURE)),
        config_for(server),
    )
    .expect("client init")
}

/// 200 response wrapping `data` in a success envelope
pub fn envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": 0,
        "desc": "success",
        "data": data
    }))
}

/// Local WebSocket endpoint for watcher tests
pub struct WsTestServer {
    listener: TcpListener,
    pub url: String,
}

impl WsTestServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("ws://{}", listener.local_addr().expect("local addr"));
        Self { listener, url }
    }

    /// Accept the next client and complete the WebSocket handshake
    pub async fn accept(&self) -> WebSocketStream<TcpStream> {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .expect("client did not connect")
            .expect("accept");
        accept_async(stream).await.expect("handshake")
    }

    /// True if a client connects within `within`
    pub async fn connects_within(&self, within: Duration) -> bool {
        tokio::time::timeout(within, self.listener.accept())
            .await
            .is_ok()
    }
}

/// Next text frame from the client, skipping control frames
pub async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        let message = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("no frame from client")
            .expect("stream ended")
            .expect("read frame");
        if let Message::Text(text) = message {
            return text.as_str().to_string();
        }
    }
}

/// Wait until `condition` holds or panic after `WAIT`
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
