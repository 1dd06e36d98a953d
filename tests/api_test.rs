//! Router tests for the ICM Bridge API
//!
//! Drives the axum app through `tower::ServiceExt::oneshot` against an
//! in-memory [`BridgeContract`], plus a few client round trips over a real
//! listener.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, TxHash, B256, U256};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use icm_bridge_api::api::{create_router, start_server, AppState};
use icm_bridge_api::bridge::{
    BridgeCall, BridgeContract, BridgeInfo, ContractError, PendingTransaction, TokenBalances,
    TokenConfig,
};
use icm_bridge_api::client::BridgeApiClient;
use icm_bridge_api::dto::{LockRequest, WhitelistTokenRequest};
use icm_bridge_api::units::format_bytes32_string;

const BRIDGE: Address = address!("68F7B6b2c9776F97Ff08584d79fBf2296a3C5328");
const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const COUNTERPART: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const USER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn tx_hash() -> TxHash {
    B256::repeat_byte(0xab)
}

/// In-memory bridge that records submitted calls
struct MockBridge {
    signer: bool,
    calls: Mutex<Vec<BridgeCall>>,
    view_error: Option<ContractError>,
    submit_error: Option<ContractError>,
}

impl MockBridge {
    fn new() -> Self {
        Self {
            signer: true,
            calls: Mutex::new(Vec::new()),
            view_error: None,
            submit_error: None,
        }
    }

    fn without_signer() -> Self {
        Self {
            signer: false,
            ..Self::new()
        }
    }

    fn failing_view(error: ContractError) -> Self {
        Self {
            view_error: Some(error),
            ..Self::new()
        }
    }

    fn failing_submit(error: ContractError) -> Self {
        Self {
            submit_error: Some(error),
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check_view(&self) -> Result<(), ContractError> {
        match &self.view_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BridgeContract for MockBridge {
    fn address(&self) -> Address {
        BRIDGE
    }

    fn has_signer(&self) -> bool {
        self.signer
    }

    async fn chain_id(&self) -> Result<B256, ContractError> {
        self.check_view()?;
        Ok(format_bytes32_string("fuji-c").unwrap())
    }

    async fn bridge_fee(&self) -> Result<U256, ContractError> {
        self.check_view()?;
        Ok(U256::from(1_000_000_000_000_000u64))
    }

    async fn bridge_info(&self) -> Result<BridgeInfo, ContractError> {
        self.check_view()?;
        Ok(BridgeInfo {
            bridge_fee: U256::from(1_000_000_000_000_000u64),
            total_fees_collected: U256::from(2_500_000_000_000_000_000u128),
            fee_recipient: Address::from_str(USER).unwrap(),
            chain_id: format_bytes32_string("fuji-c").unwrap(),
            owner: Address::from_str(USER).unwrap(),
            paused: false,
        })
    }

    async fn token_config(&self, _token: Address) -> Result<TokenConfig, ContractError> {
        self.check_view()?;
        Ok(TokenConfig {
            is_whitelisted: true,
            is_native: true,
            counterpart_token: Address::from_str(COUNTERPART).unwrap(),
            min_bridge_amount: U256::from(100u64),
            max_bridge_amount: U256::from(1_000_000u64),
        })
    }

    async fn token_balances(&self, _token: Address) -> Result<TokenBalances, ContractError> {
        self.check_view()?;
        Ok(TokenBalances {
            locked: U256::from(42u64),
            minted: U256::ZERO,
        })
    }

    async fn is_chain_enabled(&self, chain_id: B256) -> Result<bool, ContractError> {
        self.check_view()?;
        Ok(chain_id == format_bytes32_string("fuji-c").unwrap())
    }

    async fn pending_transaction(&self, _tx_id: B256) -> Result<PendingTransaction, ContractError> {
        self.check_view()?;
        Ok(PendingTransaction {
            user: Address::from_str(USER).unwrap(),
            amount: U256::from(7u64),
            destination_chain: format_bytes32_string("dispatch").unwrap(),
            timestamp: U256::from(1_700_000_000u64),
            completed: false,
            token: Address::from_str(TOKEN).unwrap(),
            message_type: "LOCK".to_string(),
        })
    }

    async fn is_message_processed(&self, _message_hash: B256) -> Result<bool, ContractError> {
        self.check_view()?;
        Ok(true)
    }

    async fn user_nonce(&self, _user: Address) -> Result<U256, ContractError> {
        self.check_view()?;
        Ok(U256::from(3u64))
    }

    async fn submit(&self, call: BridgeCall) -> Result<TxHash, ContractError> {
        if let Some(e) = &self.submit_error {
            return Err(e.clone());
        }
        self.calls.lock().unwrap().push(call);
        Ok(tx_hash())
    }
}

fn app(bridge: Arc<MockBridge>) -> Router {
    create_router(AppState::new(bridge))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

// ============================================================================
// Health & reads
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(Arc::new(MockBridge::new())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "ICM Bridge API is running");
    assert_eq!(
        body["contractAddress"],
        "0x68F7B6b2c9776F97Ff08584d79fBf2296a3C5328"
    );
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app(Arc::new(MockBridge::new()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_bridge_info() {
    let (status, body) = get(app(Arc::new(MockBridge::new())), "/bridge/info").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["bridgeFee"], "0.001");
    assert_eq!(data["totalFeesCollected"], "2.5");
    assert_eq!(data["feeRecipient"], USER);
    assert_eq!(data["chainLabel"], "fuji-c");
    assert!(data["chainId"].as_str().unwrap().starts_with("0x66756a692d63"));
    assert_eq!(data["paused"], false);
    assert_eq!(
        data["contractAddress"],
        "0x68F7B6b2c9776F97Ff08584d79fBf2296a3C5328"
    );
}

#[tokio::test]
async fn test_token_config() {
    let uri = format!("/token/{}/config", TOKEN);
    let (status, body) = get(app(Arc::new(MockBridge::new())), &uri).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["tokenAddress"], TOKEN);
    assert_eq!(data["isWhitelisted"], true);
    assert_eq!(data["counterpartToken"], COUNTERPART);
    assert_eq!(data["minBridgeAmount"], "100");
    assert_eq!(data["maxBridgeAmount"], "1000000");
}

#[tokio::test]
async fn test_invalid_addresses_rejected() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = get(app(bridge.clone()), "/token/0x1234/config").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Invalid token address"}));

    let (status, body) = get(app(bridge.clone()), "/token/not-an-address/balances").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token address");

    // Mixed case with a bad checksum
    let (status, body) = get(
        app(bridge),
        "/user/0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266/nonce",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user address");
}

#[tokio::test]
async fn test_token_balances_and_user_nonce() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = get(app(bridge.clone()), &format!("/token/{}/balances", TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lockedBalance"], "42");
    assert_eq!(body["data"]["mintedBalance"], "0");

    let lower = USER.to_lowercase();
    let (status, body) = get(app(bridge), &format!("/user/{}/nonce", lower)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userAddress"], lower);
    assert_eq!(body["data"]["nonce"], "3");
}

#[tokio::test]
async fn test_chain_enabled_encodes_chain_id() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = get(app(bridge.clone()), "/chain/fuji-c/enabled").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"chainId": "fuji-c", "isEnabled": true}));

    let (_, body) = get(app(bridge.clone()), "/chain/dispatch/enabled").await;
    assert_eq!(body["data"]["isEnabled"], false);

    let long = "x".repeat(32);
    let (status, body) = get(app(bridge), &format!("/chain/{}/enabled", long)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid chain ID"));
}

#[tokio::test]
async fn test_pending_transaction() {
    let bridge = Arc::new(MockBridge::new());
    let tx_id = format!("0x{}", "11".repeat(32));

    let (status, body) = get(app(bridge.clone()), &format!("/transaction/{}", tx_id)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["txId"], tx_id);
    assert_eq!(data["user"], USER);
    assert_eq!(data["amount"], "7");
    assert_eq!(data["timestamp"], "1700000000");
    assert_eq!(data["completed"], false);
    assert_eq!(data["messageType"], "LOCK");

    let (status, body) = get(app(bridge), "/transaction/0xabc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid transaction ID");
}

#[tokio::test]
async fn test_message_processed() {
    let bridge = Arc::new(MockBridge::new());
    let hash = format!("0x{}", "22".repeat(32));

    let (status, body) = get(app(bridge.clone()), &format!("/message/{}/processed", hash)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isProcessed"], true);

    let (status, body) = get(app(bridge), "/message/zzz/processed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid message hash");
}

#[tokio::test]
async fn test_rpc_failure_is_internal_error() {
    let bridge = Arc::new(MockBridge::failing_view(ContractError::Rpc(
        "connection refused".to_string(),
    )));

    let (status, body) = get(app(bridge), "/bridge/info").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["details"], "connection refused");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(app(Arc::new(MockBridge::new())), "/does/not/exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Bridge transfers
// ============================================================================

#[tokio::test]
async fn test_lock_and_bridge() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/bridge/lock",
        json!({"destinationChain": "dispatch", "amount": "1.5", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["transactionHash"], tx_hash().to_string());
    assert_eq!(data["destinationChain"], "dispatch");
    assert_eq!(data["amount"], "1.5");
    assert_eq!(data["tokenAddress"], TOKEN);
    assert_eq!(data["bridgeFee"], "0.001");

    let calls = bridge.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        BridgeCall::LockAndBridge {
            destination_chain: format_bytes32_string("dispatch").unwrap(),
            amount: U256::from(1_500_000_000_000_000_000u128),
            token: Address::from_str(TOKEN).unwrap(),
            fee: U256::from(1_000_000_000_000_000u64),
        }
    );
    assert_eq!(calls[0].value(), U256::from(1_000_000_000_000_000u64));
}

#[tokio::test]
async fn test_lock_accepts_numeric_amount() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/bridge/lock",
        json!({"destinationChain": "dispatch", "amount": 2, "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], "2");
    match &bridge.calls()[0] {
        BridgeCall::LockAndBridge { amount, .. } => {
            assert_eq!(*amount, U256::from(2_000_000_000_000_000_000u128))
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_lock_requires_wallet() {
    let bridge = Arc::new(MockBridge::without_signer());

    let (status, body) = post(
        app(bridge.clone()),
        "/bridge/lock",
        json!({"destinationChain": "dispatch", "amount": "1", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Admin wallet not configured");
    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn test_lock_rejects_missing_parameters() {
    let bridge = Arc::new(MockBridge::new());

    for body in [
        json!({"amount": "1", "tokenAddress": TOKEN}),
        json!({"destinationChain": "dispatch", "tokenAddress": TOKEN}),
        json!({"destinationChain": "dispatch", "amount": "", "tokenAddress": TOKEN}),
        json!({"destinationChain": "dispatch", "amount": 0, "tokenAddress": TOKEN}),
        json!({"destinationChain": "dispatch", "amount": "1"}),
        json!({"destinationChain": "dispatch", "amount": "1", "tokenAddress": "0x12"}),
    ] {
        let (status, response) = post(app(bridge.clone()), "/bridge/lock", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Invalid parameters");
    }

    let (status, response) = post_raw(app(bridge.clone()), "/bridge/lock", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid parameters");

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn test_lock_rejects_bad_amount() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge),
        "/bridge/lock",
        json!({"destinationChain": "dispatch", "amount": "abc", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid amount");
}

#[tokio::test]
async fn test_zero_amounts_rejected() {
    let bridge = Arc::new(MockBridge::new());

    for amount in ["0", "0.0", "0.000"] {
        let (status, body) = post(
            app(bridge.clone()),
            "/bridge/lock",
            json!({"destinationChain": "dispatch", "amount": amount, "tokenAddress": TOKEN}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", amount);
        assert_eq!(body["error"], "Invalid amount");

        let (status, body) = post(
            app(bridge.clone()),
            "/bridge/burn",
            json!({"sourceChain": "fuji-c", "amount": amount, "tokenAddress": TOKEN}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", amount);
        assert_eq!(body["error"], "Invalid amount");
    }

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn test_chain_ids_encoded_verbatim() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/chain/enable",
        json!({"chainId": " fuji ", "bridgeAddress": COUNTERPART}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chainId"], " fuji ");

    let (status, _) = post(
        app(bridge.clone()),
        "/admin/chain/disable",
        json!({"chainId": "  "}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        app(bridge.clone()),
        "/bridge/lock",
        json!({"destinationChain": " dispatch", "amount": "1", "tokenAddress": TOKEN}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let calls = bridge.calls();
    assert_eq!(
        calls[0],
        BridgeCall::EnableChain {
            chain_id: format_bytes32_string(" fuji ").unwrap(),
            bridge_address: Address::from_str(COUNTERPART).unwrap(),
        }
    );
    assert_eq!(
        calls[1],
        BridgeCall::DisableChain {
            chain_id: format_bytes32_string("  ").unwrap(),
        }
    );
    match &calls[2] {
        BridgeCall::LockAndBridge {
            destination_chain, ..
        } => assert_eq!(*destination_chain, format_bytes32_string(" dispatch").unwrap()),
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_lock_revert_reason_surfaced() {
    let bridge = Arc::new(MockBridge::failing_submit(ContractError::Reverted {
        reason: "Token not whitelisted".to_string(),
        details: "execution reverted: Token not whitelisted".to_string(),
    }));

    let (status, body) = post(
        app(bridge),
        "/bridge/lock",
        json!({"destinationChain": "dispatch", "amount": "1", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Contract call failed: Token not whitelisted");
    assert_eq!(body["details"], "execution reverted: Token not whitelisted");
}

#[tokio::test]
async fn test_burn_gas_estimation_failure() {
    let bridge = Arc::new(MockBridge::failing_submit(ContractError::GasEstimation(
        "gas required exceeds allowance".to_string(),
    )));

    let (status, body) = post(
        app(bridge),
        "/bridge/burn",
        json!({"sourceChain": "fuji-c", "amount": "0.5", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transaction would fail - check parameters");
    assert_eq!(body["details"], "gas required exceeds allowance");
}

#[tokio::test]
async fn test_burn_insufficient_funds() {
    let bridge = Arc::new(MockBridge::failing_submit(ContractError::InsufficientFunds(
        "insufficient funds for gas * price + value".to_string(),
    )));

    let (status, body) = post(
        app(bridge),
        "/bridge/burn",
        json!({"sourceChain": "fuji-c", "amount": "0.5", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient funds for transaction");
}

#[tokio::test]
async fn test_burn_and_bridge() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/bridge/burn",
        json!({"sourceChain": "fuji-c", "amount": "0.5", "tokenAddress": TOKEN}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sourceChain"], "fuji-c");
    assert_eq!(body["data"]["bridgeFee"], "0.001");
    assert!(matches!(
        bridge.calls()[0],
        BridgeCall::BurnAndBridge { .. }
    ));
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_requires_signer() {
    let bridge = Arc::new(MockBridge::without_signer());

    for uri in [
        "/admin/pause",
        "/admin/unpause",
        "/admin/fees/withdraw",
        "/admin/emergency/withdraw-eth",
    ] {
        let (status, body) = post(app(bridge.clone()), uri, json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "Admin access not configured");
    }

    // Checked before the body is parsed
    let (status, _) = post_raw(app(bridge.clone()), "/admin/fee/set", "{bad".to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn test_whitelist_token() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/token/whitelist",
        json!({
            "tokenAddress": TOKEN,
            "isNative": true,
            "counterpartToken": COUNTERPART,
            "minAmount": "100",
            "maxAmount": 5000
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isNative"], true);
    assert_eq!(body["data"]["counterpartToken"], COUNTERPART);
    assert_eq!(
        bridge.calls(),
        vec![BridgeCall::WhitelistToken {
            token: Address::from_str(TOKEN).unwrap(),
            is_native: true,
            counterpart_token: Address::from_str(COUNTERPART).unwrap(),
            min_amount: U256::from(100u64),
            max_amount: U256::from(5000u64),
        }]
    );
}

#[tokio::test]
async fn test_whitelist_token_validation() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/token/whitelist",
        json!({"tokenAddress": TOKEN}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token addresses");

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/token/whitelist",
        json!({"tokenAddress": TOKEN, "counterpartToken": COUNTERPART, "minAmount": "1.5"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid amount limits");

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn test_blacklist_token() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/token/blacklist",
        json!({"tokenAddress": TOKEN}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tokenAddress"], TOKEN);

    let (status, body) = post(app(bridge.clone()), "/admin/token/blacklist", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token address");

    assert_eq!(bridge.calls().len(), 1);
}

#[tokio::test]
async fn test_enable_and_disable_chain() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/chain/enable",
        json!({"chainId": "dispatch", "bridgeAddress": COUNTERPART}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chainId"], "dispatch");
    assert_eq!(body["data"]["bridgeAddress"], COUNTERPART);

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/chain/disable",
        json!({"chainId": "dispatch"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chainId"], "dispatch");

    let (status, body) = post(app(bridge.clone()), "/admin/chain/disable", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chain ID required");

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/chain/enable",
        json!({"chainId": "dispatch"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid parameters");

    let chain = format_bytes32_string("dispatch").unwrap();
    assert_eq!(
        bridge.calls(),
        vec![
            BridgeCall::EnableChain {
                chain_id: chain,
                bridge_address: Address::from_str(COUNTERPART).unwrap(),
            },
            BridgeCall::DisableChain { chain_id: chain },
        ]
    );
}

#[tokio::test]
async fn test_set_bridge_fee() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(app(bridge.clone()), "/admin/fee/set", json!({"fee": "0.002"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["newFee"], "0.002");
    assert_eq!(
        bridge.calls(),
        vec![BridgeCall::SetBridgeFee {
            fee: U256::from(2_000_000_000_000_000u64)
        }]
    );

    for bad in [
        json!({}),
        json!({"fee": "free"}),
        json!({"fee": "0"}),
        json!({"fee": "0.0"}),
        json!({"fee": 0}),
    ] {
        let (status, body) = post(app(bridge.clone()), "/admin/fee/set", bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid fee amount");
    }
}

#[tokio::test]
async fn test_set_fee_recipient() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/fee/recipient",
        json!({"recipient": USER}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recipient"], USER);

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/fee/recipient",
        json!({"recipient": "nobody"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid recipient address");
}

#[tokio::test]
async fn test_argumentless_admin_calls() {
    let bridge = Arc::new(MockBridge::new());

    for uri in [
        "/admin/pause",
        "/admin/unpause",
        "/admin/fees/withdraw",
        "/admin/emergency/withdraw-eth",
    ] {
        let (status, body) = post(app(bridge.clone()), uri, json!({})).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["data"]["transactionHash"], tx_hash().to_string());
    }

    assert_eq!(
        bridge.calls(),
        vec![
            BridgeCall::Pause,
            BridgeCall::Unpause,
            BridgeCall::WithdrawFees,
            BridgeCall::EmergencyWithdrawEth,
        ]
    );
}

#[tokio::test]
async fn test_emergency_withdraw() {
    let bridge = Arc::new(MockBridge::new());

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/emergency/withdraw",
        json!({"tokenAddress": TOKEN, "amount": "250"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], "250");

    let (status, body) = post(
        app(bridge.clone()),
        "/admin/emergency/withdraw",
        json!({"tokenAddress": TOKEN}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid amount");

    assert_eq!(
        bridge.calls(),
        vec![BridgeCall::EmergencyWithdraw {
            token: Address::from_str(TOKEN).unwrap(),
            amount: U256::from(250u64),
        }]
    );
}

// ============================================================================
// Client against a live listener
// ============================================================================

async fn spawn_server(bridge: Arc<MockBridge>) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        start_server(listener, AppState::new(bridge), async move {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    (format!("http://{}", addr), tx)
}

#[tokio::test]
async fn test_client_reads_and_connection() {
    let (base_url, shutdown) = spawn_server(Arc::new(MockBridge::new())).await;
    let client = BridgeApiClient::new(base_url).unwrap();

    assert!(client.test_connection().await);

    let info = client.bridge_info().await.unwrap();
    assert_eq!(info.bridge_fee, "0.001");
    assert_eq!(info.chain_label.as_deref(), Some("fuji-c"));

    let nonce = client.user_nonce(USER).await.unwrap();
    assert_eq!(nonce.nonce, "3");

    let status = client.chain_enabled("fuji-c").await.unwrap();
    assert!(status.is_enabled);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_transactions() {
    let bridge = Arc::new(MockBridge::new());
    let (base_url, shutdown) = spawn_server(bridge.clone()).await;
    let client = BridgeApiClient::new(base_url).unwrap();

    let lock = client
        .lock_and_bridge(&LockRequest {
            destination_chain: Some("dispatch".to_string()),
            amount: Some("1".into()),
            token_address: Some(TOKEN.to_string()),
            user_address: None,
        })
        .await
        .unwrap();
    assert_eq!(lock.transaction_hash, tx_hash().to_string());

    let whitelisted = client
        .whitelist_token(&WhitelistTokenRequest {
            token_address: Some(TOKEN.to_string()),
            counterpart_token: Some(COUNTERPART.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!whitelisted.is_native);

    client.pause().await.unwrap();
    client.set_bridge_fee("0.01").await.unwrap();

    assert_eq!(bridge.calls().len(), 4);
    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_surfaces_http_errors() {
    let (base_url, shutdown) = spawn_server(Arc::new(MockBridge::without_signer())).await;
    let client = BridgeApiClient::new(base_url).unwrap();

    let err = client.pause().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 401");
    assert_eq!(
        err.error_response().map(|e| e.error).as_deref(),
        Some("Admin access not configured")
    );

    let err = client.token_config("0x1234").await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 400");

    let _ = shutdown.send(());
}
