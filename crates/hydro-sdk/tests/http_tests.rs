/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use std::sync::Arc;

use common::{
    MOCK_ADDRESS, MOCK_SIGNATURE, config_for, envelope, public_client, setup_mock_server,
    signed_client,
};
use hydro_sdk::http::AUTH_HEADER;
use hydro_sdk::{
    Access, ClientConfig, CustomSigner, HydroClient, HydroError, OrderbookLevel, Status,
};
use tokio_test::assert_ok;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let client = assert_ok!(HydroClient::without_auth());
    assert_eq!(client.base_url().as_str(), "https://api.ddex.io/v3/");
    assert!(client.address().is_none());
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default().with_api_url("http://localhost:8080/v3");
    let client = assert_ok!(HydroClient::with_config(config));
    assert_eq!(client.base_url().as_str(), "http://localhost:8080/v3/");
}

#[test]
fn test_client_with_private_key() {
    let client = assert_ok!(HydroClient::with_private_key(
        common::TEST_PRIVATE_KEY,
        ClientConfig::default()
    ));
    assert_eq!(client.address(), Some(common::TEST_ADDRESS));
}

#[tokio::test]
async fn test_success_envelope_returns_data() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(envelope(serde_json::json!({
            "markets": [{
                "id": "HOT-WETH",
                "baseToken": "HOT",
                "quoteToken": "WETH",
                "baseTokenDecimals": 18,
                "quoteTokenDecimals": 18,
                "minOrderSize": "0.001",
                "pricePrecision": 5
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let markets = assert_ok!(public_client(&server).list_markets().await);
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].id, "HOT-WETH");
    assert_eq!(markets[0].base_token, "HOT");
    assert_eq!(markets[0].price_precision, 5);
}

#[tokio::test]
async fn test_rejected_envelope_is_api_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/markets/NOPE-WETH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 1,
            "desc": "bad"
        })))
        .mount(&server)
        .await;

    let err = public_client(&server)
        .get_market("NOPE-WETH")
        .await
        .unwrap_err();
    assert!(err.is_api_error());
    assert!(err.to_string().contains("bad"));
}

#[tokio::test]
async fn test_http_error_is_server_error_even_with_envelope_body() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/markets/tickers"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "status": 0,
            "data": {"tickers": []}
        })))
        .mount(&server)
        .await;

    let err = public_client(&server).list_tickers().await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_unreachable_host_is_server_error() {
    let client = HydroClient::with_config(
        ClientConfig::default().with_api_url("http://127.0.0.1:9/v3/"),
    )
    .unwrap();

    let err = client.list_markets().await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_private_call_without_auth_never_hits_network() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(envelope(serde_json::json!({"orders": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = public_client(&server);
    let err = client
        .list_orders(None, Some(Status::All), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, HydroError::Auth { .. }));
    assert_eq!(
        err.to_string(),
        "Auth Error: Cannot authenticate without a private key!"
    );

    let err = client.cancel_order("0x1").await.unwrap_err();
    assert!(err.is_auth_error());

    let err = client.sign("hello").await.unwrap_err();
    assert!(err.is_auth_error());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signer_failure_propagates_before_network() {
    let server = setup_mock_server().await;
    let signer = CustomSigner::new(MOCK_ADDRESS, |_message: String| async move {
        Err(HydroError::auth("device disconnected"))
    });
    let client = HydroClient::with_signer(Arc::new(signer), config_for(&server)).unwrap();

    let err = client.list_locked_balances().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.to_string().contains("device disconnected"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_public_call_without_auth_succeeds() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/markets/HOT-WETH/orderbook"))
        .respond_with(envelope(serde_json::json!({
            "orderBook": {"marketId": "HOT-WETH", "bids": [], "asks": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let book = assert_ok!(
        public_client(&server)
            .get_orderbook("HOT-WETH", OrderbookLevel::One)
            .await
    );
    assert_eq!(book.market_id, "HOT-WETH");
}

#[tokio::test]
async fn test_identical_headers_are_both_sent() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/orders/0x1"))
        .and(header_exists(AUTH_HEADER))
        .respond_with(envelope(serde_json::json!({"order": {"id": "0x1"}})))
        .expect(2)
        .mount(&server)
        .await;

    let client = signed_client(&server);
    let (first, second) = tokio::join!(client.get_order("0x1"), client.get_order("0x1"));
    assert_ok!(first);
    assert_ok!(second);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let header = request.headers.get(AUTH_HEADER).unwrap().to_str().unwrap();
        let parts: Vec<&str> = header.split('#').collect();
        assert_eq!(parts[0], MOCK_ADDRESS);
        assert!(parts[1].starts_with("HYDRO-AUTHENTICATION@"));
        assert_eq!(parts[2], MOCK_SIGNATURE);
    }
}

#[tokio::test]
async fn test_generic_get_with_access() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/custom"))
        .respond_with(envelope(serde_json::json!({"value": 42})))
        .expect(2)
        .mount(&server)
        .await;

    let client = signed_client(&server);
    let public: serde_json::Value = assert_ok!(client.get("custom", &[], Access::Public).await);
    let private: serde_json::Value = assert_ok!(client.get("/custom", &[], Access::Private).await);
    assert_eq!(public["value"], 42);
    assert_eq!(private, public);

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key(AUTH_HEADER));
    assert!(requests[1].headers.contains_key(AUTH_HEADER));
}
