//! HTTP routes
//!
//! Each route validates its input, makes one logical contract call through
//! [`BridgeContract`], and wraps the result in the JSON envelope:
//! - GET  /health, /metrics
//! - GET  /bridge/info, /token/{address}/config, /token/{address}/balances
//! - GET  /chain/{chainId}/enabled, /transaction/{txId}
//! - GET  /message/{messageHash}/processed, /user/{address}/nonce
//! - POST /bridge/lock, /bridge/burn
//! - POST /admin/... (requires a configured signer)

use std::future::Future;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::bridge::{BridgeCall, BridgeContract};
use crate::dto::*;
use crate::error::ApiError;
use crate::metrics;
use crate::units::{
    format_bytes32_string, format_ether, parse_address, parse_b256, parse_bytes32_string,
    AmountInput,
};

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<dyn BridgeContract>,
}

impl AppState {
    pub fn new(bridge: Arc<dyn BridgeContract>) -> Self {
        Self { bridge }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::new(data)))
}

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/token/whitelist", post(whitelist_token))
        .route("/token/blacklist", post(blacklist_token))
        .route("/chain/enable", post(enable_chain))
        .route("/chain/disable", post(disable_chain))
        .route("/fee/set", post(set_bridge_fee))
        .route("/fee/recipient", post(set_fee_recipient))
        .route("/fees/withdraw", post(withdraw_fees))
        .route("/pause", post(pause))
        .route("/unpause", post(unpause))
        .route("/emergency/withdraw", post(emergency_withdraw))
        .route("/emergency/withdraw-eth", post(emergency_withdraw_eth))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        .route("/bridge/info", get(bridge_info))
        .route("/token/{address}/config", get(token_config))
        .route("/token/{address}/balances", get(token_balances))
        .route("/chain/{chain_id}/enabled", get(chain_enabled))
        .route("/transaction/{tx_id}", get(pending_transaction))
        .route("/message/{message_hash}/processed", get(message_processed))
        .route("/user/{address}/nonce", get(user_nonce))
        .route("/bridge/lock", post(lock_and_bridge))
        .route("/bridge/burn", post(burn_and_bridge))
        .nest("/admin", admin)
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn start_server<F>(listener: TcpListener, state: AppState, shutdown: F) -> eyre::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "ICM Bridge API listening");
    info!(contract = %checksum(state.bridge.address()), "Bridge contract");

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("ICM Bridge API stopped");
    Ok(())
}

/// Reject admin calls when no signer is loaded
async fn require_admin(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    if !state.bridge.has_signer() {
        return ApiError::AdminNotConfigured.into_response();
    }
    next.run(request).await
}

/// Unwrap a JSON body, treating malformed input as invalid parameters
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| {
        debug!(rejection = %e.body_text(), "Malformed request body");
        ApiError::bad_request("Invalid parameters")
    })
}

/// Non-empty trimmed string, if present
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Non-empty string, if present, left exactly as sent.
///
/// Chain IDs are encoded byte for byte into bytes32, so whitespace is significant.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn checksum(address: Address) -> String {
    address.to_checksum(None)
}

// ============================================================================
// Health & metrics
// ============================================================================

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "ICM Bridge API is running".to_string(),
        contract_address: checksum(state.bridge.address()),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// GET /metrics
async fn prometheus_metrics() -> Result<Response, ApiError> {
    let (content_type, buffer) =
        metrics::encode().map_err(|e| ApiError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, content_type)], buffer).into_response())
}

// ============================================================================
// Reads
// ============================================================================

/// GET /bridge/info
async fn bridge_info(State(state): State<AppState>) -> ApiResult<BridgeInfoData> {
    let info = state
        .bridge
        .bridge_info()
        .await
        .map_err(ApiError::contract("fetching bridge info"))?;

    ok(BridgeInfoData {
        bridge_fee: format_ether(info.bridge_fee),
        total_fees_collected: format_ether(info.total_fees_collected),
        fee_recipient: checksum(info.fee_recipient),
        chain_id: info.chain_id.to_string(),
        chain_label: parse_bytes32_string(&info.chain_id)
            .ok()
            .filter(|label| !label.is_empty()),
        owner: checksum(info.owner),
        paused: info.paused,
        contract_address: checksum(state.bridge.address()),
    })
}

/// GET /token/{address}/config
async fn token_config(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<TokenConfigData> {
    let token = parse_address(&address).ok_or_else(|| ApiError::bad_request("Invalid token address"))?;

    let config = state
        .bridge
        .token_config(token)
        .await
        .map_err(ApiError::contract("fetching token config"))?;

    ok(TokenConfigData {
        token_address: address,
        is_whitelisted: config.is_whitelisted,
        is_native: config.is_native,
        counterpart_token: checksum(config.counterpart_token),
        min_bridge_amount: config.min_bridge_amount.to_string(),
        max_bridge_amount: config.max_bridge_amount.to_string(),
    })
}

/// GET /token/{address}/balances
async fn token_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<TokenBalancesData> {
    let token = parse_address(&address).ok_or_else(|| ApiError::bad_request("Invalid token address"))?;

    let balances = state
        .bridge
        .token_balances(token)
        .await
        .map_err(ApiError::contract("fetching token balances"))?;

    ok(TokenBalancesData {
        token_address: address,
        locked_balance: balances.locked.to_string(),
        minted_balance: balances.minted.to_string(),
    })
}

/// GET /chain/{chainId}/enabled
async fn chain_enabled(
    State(state): State<AppState>,
    Path(chain_id): Path<String>,
) -> ApiResult<ChainStatusData> {
    let encoded = format_bytes32_string(&chain_id)
        .map_err(|e| ApiError::bad_request(format!("Invalid chain ID: {}", e)))?;

    let is_enabled = state
        .bridge
        .is_chain_enabled(encoded)
        .await
        .map_err(ApiError::contract("checking chain status"))?;

    ok(ChainStatusData {
        chain_id,
        is_enabled,
    })
}

/// GET /transaction/{txId}
async fn pending_transaction(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> ApiResult<PendingTransactionData> {
    let id = parse_b256(&tx_id).ok_or_else(|| ApiError::bad_request("Invalid transaction ID"))?;

    let tx = state
        .bridge
        .pending_transaction(id)
        .await
        .map_err(ApiError::contract("fetching pending transaction"))?;

    ok(PendingTransactionData {
        tx_id,
        user: checksum(tx.user),
        amount: tx.amount.to_string(),
        destination_chain: tx.destination_chain.to_string(),
        timestamp: tx.timestamp.to_string(),
        completed: tx.completed,
        token: checksum(tx.token),
        message_type: tx.message_type,
    })
}

/// GET /message/{messageHash}/processed
async fn message_processed(
    State(state): State<AppState>,
    Path(message_hash): Path<String>,
) -> ApiResult<MessageStatusData> {
    let hash =
        parse_b256(&message_hash).ok_or_else(|| ApiError::bad_request("Invalid message hash"))?;

    let is_processed = state
        .bridge
        .is_message_processed(hash)
        .await
        .map_err(ApiError::contract("checking message status"))?;

    ok(MessageStatusData {
        message_hash,
        is_processed,
    })
}

/// GET /user/{address}/nonce
async fn user_nonce(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<UserNonceData> {
    let user = parse_address(&address).ok_or_else(|| ApiError::bad_request("Invalid user address"))?;

    let nonce = state
        .bridge
        .user_nonce(user)
        .await
        .map_err(ApiError::contract("fetching user nonce"))?;

    ok(UserNonceData {
        user_address: address,
        nonce: nonce.to_string(),
    })
}

// ============================================================================
// Bridge transfers
// ============================================================================

/// Validated lock/burn parameters
struct TransferParams {
    chain: String,
    amount: AmountInput,
    token_address: String,
    token: Address,
}

impl TransferParams {
    fn parse(
        chain: &Option<String>,
        amount: Option<AmountInput>,
        token_address: &Option<String>,
    ) -> Result<Self, ApiError> {
        let invalid = || ApiError::bad_request("Invalid parameters");

        let chain = non_empty(chain).ok_or_else(invalid)?;
        let amount = amount.filter(|a| !a.is_blank()).ok_or_else(invalid)?;
        let token_address = present(token_address).ok_or_else(invalid)?;
        let token = parse_address(token_address).ok_or_else(invalid)?;

        Ok(Self {
            chain: chain.to_string(),
            amount,
            token_address: token_address.to_string(),
            token,
        })
    }

    /// Amount in wei; zero is rejected
    fn wei(&self) -> Result<U256, ApiError> {
        self.amount
            .to_ether()
            .ok()
            .filter(|wei| !wei.is_zero())
            .ok_or_else(|| ApiError::bad_request("Invalid amount"))
    }
}

/// POST /bridge/lock
async fn lock_and_bridge(
    State(state): State<AppState>,
    payload: Result<Json<LockRequest>, JsonRejection>,
) -> ApiResult<LockResponseData> {
    if !state.bridge.has_signer() {
        return Err(ApiError::WalletNotConfigured);
    }

    let request = json_body(payload)?;
    let params = TransferParams::parse(
        &request.destination_chain,
        request.amount,
        &request.token_address,
    )?;

    let amount = params.wei()?;
    let destination_chain = format_bytes32_string(&params.chain)
        .map_err(|e| ApiError::bad_request(format!("Invalid destination chain: {}", e)))?;

    let fee = state
        .bridge
        .bridge_fee()
        .await
        .map_err(ApiError::contract("locking tokens"))?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::LockAndBridge {
            destination_chain,
            amount,
            token: params.token,
            fee,
        })
        .await
        .map_err(ApiError::contract("locking tokens"))?;

    ok(LockResponseData {
        transaction_hash: tx_hash.to_string(),
        destination_chain: params.chain,
        amount: params.amount.to_string(),
        token_address: params.token_address,
        bridge_fee: format_ether(fee),
    })
}

/// POST /bridge/burn
async fn burn_and_bridge(
    State(state): State<AppState>,
    payload: Result<Json<BurnRequest>, JsonRejection>,
) -> ApiResult<BurnResponseData> {
    if !state.bridge.has_signer() {
        return Err(ApiError::WalletNotConfigured);
    }

    let request = json_body(payload)?;
    let params = TransferParams::parse(&request.source_chain, request.amount, &request.token_address)?;

    let amount = params.wei()?;
    let source_chain = format_bytes32_string(&params.chain)
        .map_err(|e| ApiError::bad_request(format!("Invalid source chain: {}", e)))?;

    let fee = state
        .bridge
        .bridge_fee()
        .await
        .map_err(ApiError::contract("burning tokens"))?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::BurnAndBridge {
            source_chain,
            amount,
            token: params.token,
            fee,
        })
        .await
        .map_err(ApiError::contract("burning tokens"))?;

    ok(BurnResponseData {
        transaction_hash: tx_hash.to_string(),
        source_chain: params.chain,
        amount: params.amount.to_string(),
        token_address: params.token_address,
        bridge_fee: format_ether(fee),
    })
}

// ============================================================================
// Admin
// ============================================================================

/// POST /admin/token/whitelist
async fn whitelist_token(
    State(state): State<AppState>,
    payload: Result<Json<WhitelistTokenRequest>, JsonRejection>,
) -> ApiResult<WhitelistTokenData> {
    let request = json_body(payload)?;

    let invalid_addresses = || ApiError::bad_request("Invalid token addresses");
    let token_address = present(&request.token_address).ok_or_else(invalid_addresses)?;
    let counterpart_address = present(&request.counterpart_token).ok_or_else(invalid_addresses)?;
    let token = parse_address(token_address).ok_or_else(invalid_addresses)?;
    let counterpart_token = parse_address(counterpart_address).ok_or_else(invalid_addresses)?;

    let limit = |value: &Option<AmountInput>| -> Result<U256, ApiError> {
        match value {
            Some(v) if !v.is_blank() => v
                .to_integer()
                .map_err(|_| ApiError::bad_request("Invalid amount limits")),
            _ => Ok(U256::ZERO),
        }
    };
    let min_amount = limit(&request.min_amount)?;
    let max_amount = limit(&request.max_amount)?;
    let is_native = request.is_native.unwrap_or(false);

    let tx_hash = state
        .bridge
        .submit(BridgeCall::WhitelistToken {
            token,
            is_native,
            counterpart_token,
            min_amount,
            max_amount,
        })
        .await
        .map_err(ApiError::contract("whitelisting token"))?;

    ok(WhitelistTokenData {
        transaction_hash: tx_hash.to_string(),
        token_address: token_address.to_string(),
        is_native,
        counterpart_token: counterpart_address.to_string(),
    })
}

/// POST /admin/token/blacklist
async fn blacklist_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<TokenTxData> {
    let request = json_body(payload)?;

    let token_address = present(&request.token_address)
        .ok_or_else(|| ApiError::bad_request("Invalid token address"))?;
    let token =
        parse_address(token_address).ok_or_else(|| ApiError::bad_request("Invalid token address"))?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::BlacklistToken { token })
        .await
        .map_err(ApiError::contract("blacklisting token"))?;

    ok(TokenTxData {
        transaction_hash: tx_hash.to_string(),
        token_address: token_address.to_string(),
    })
}

/// POST /admin/chain/enable
async fn enable_chain(
    State(state): State<AppState>,
    payload: Result<Json<EnableChainRequest>, JsonRejection>,
) -> ApiResult<EnableChainData> {
    let request = json_body(payload)?;

    let invalid = || ApiError::bad_request("Invalid parameters");
    let chain_id = non_empty(&request.chain_id).ok_or_else(invalid)?;
    let bridge_address = present(&request.bridge_address).ok_or_else(invalid)?;
    let bridge = parse_address(bridge_address).ok_or_else(invalid)?;
    let encoded = format_bytes32_string(chain_id)
        .map_err(|e| ApiError::bad_request(format!("Invalid chain ID: {}", e)))?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::EnableChain {
            chain_id: encoded,
            bridge_address: bridge,
        })
        .await
        .map_err(ApiError::contract("enabling chain"))?;

    ok(EnableChainData {
        transaction_hash: tx_hash.to_string(),
        chain_id: chain_id.to_string(),
        bridge_address: bridge_address.to_string(),
    })
}

/// POST /admin/chain/disable
async fn disable_chain(
    State(state): State<AppState>,
    payload: Result<Json<ChainRequest>, JsonRejection>,
) -> ApiResult<ChainTxData> {
    let request = json_body(payload)?;

    let chain_id =
        non_empty(&request.chain_id).ok_or_else(|| ApiError::bad_request("Chain ID required"))?;
    let encoded = format_bytes32_string(chain_id)
        .map_err(|e| ApiError::bad_request(format!("Invalid chain ID: {}", e)))?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::DisableChain { chain_id: encoded })
        .await
        .map_err(ApiError::contract("disabling chain"))?;

    ok(ChainTxData {
        transaction_hash: tx_hash.to_string(),
        chain_id: chain_id.to_string(),
    })
}

/// POST /admin/fee/set
async fn set_bridge_fee(
    State(state): State<AppState>,
    payload: Result<Json<SetFeeRequest>, JsonRejection>,
) -> ApiResult<SetFeeData> {
    let request = json_body(payload)?;

    let invalid = || ApiError::bad_request("Invalid fee amount");
    let fee_input = request.fee.ok_or_else(invalid)?;
    let fee = fee_input
        .to_ether()
        .ok()
        .filter(|fee| !fee.is_zero())
        .ok_or_else(invalid)?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::SetBridgeFee { fee })
        .await
        .map_err(ApiError::contract("setting bridge fee"))?;

    ok(SetFeeData {
        transaction_hash: tx_hash.to_string(),
        new_fee: fee_input.to_string(),
    })
}

/// POST /admin/fee/recipient
async fn set_fee_recipient(
    State(state): State<AppState>,
    payload: Result<Json<SetFeeRecipientRequest>, JsonRejection>,
) -> ApiResult<FeeRecipientData> {
    let request = json_body(payload)?;

    let invalid = || ApiError::bad_request("Invalid recipient address");
    let recipient_address = present(&request.recipient).ok_or_else(invalid)?;
    let recipient = parse_address(recipient_address).ok_or_else(invalid)?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::SetFeeRecipient { recipient })
        .await
        .map_err(ApiError::contract("setting fee recipient"))?;

    ok(FeeRecipientData {
        transaction_hash: tx_hash.to_string(),
        recipient: recipient_address.to_string(),
    })
}

/// POST /admin/emergency/withdraw
async fn emergency_withdraw(
    State(state): State<AppState>,
    payload: Result<Json<EmergencyWithdrawRequest>, JsonRejection>,
) -> ApiResult<EmergencyWithdrawData> {
    let request = json_body(payload)?;

    let token_address = present(&request.token_address)
        .ok_or_else(|| ApiError::bad_request("Invalid token address"))?;
    let token =
        parse_address(token_address).ok_or_else(|| ApiError::bad_request("Invalid token address"))?;

    let invalid_amount = || ApiError::bad_request("Invalid amount");
    let amount_input = request
        .amount
        .filter(|a| !a.is_blank())
        .ok_or_else(invalid_amount)?;
    let amount = amount_input.to_integer().map_err(|_| invalid_amount())?;

    let tx_hash = state
        .bridge
        .submit(BridgeCall::EmergencyWithdraw { token, amount })
        .await
        .map_err(ApiError::contract("emergency withdrawing tokens"))?;

    ok(EmergencyWithdrawData {
        transaction_hash: tx_hash.to_string(),
        token_address: token_address.to_string(),
        amount: amount.to_string(),
    })
}

/// Submit an admin call that takes no arguments
async fn submit_simple(
    state: &AppState,
    call: BridgeCall,
    operation: &'static str,
) -> ApiResult<TransactionData> {
    let tx_hash = state
        .bridge
        .submit(call)
        .await
        .map_err(ApiError::contract(operation))?;

    ok(TransactionData {
        transaction_hash: tx_hash.to_string(),
    })
}

/// POST /admin/fees/withdraw
async fn withdraw_fees(State(state): State<AppState>) -> ApiResult<TransactionData> {
    submit_simple(&state, BridgeCall::WithdrawFees, "withdrawing fees").await
}

/// POST /admin/pause
async fn pause(State(state): State<AppState>) -> ApiResult<TransactionData> {
    submit_simple(&state, BridgeCall::Pause, "pausing contract").await
}

/// POST /admin/unpause
async fn unpause(State(state): State<AppState>) -> ApiResult<TransactionData> {
    submit_simple(&state, BridgeCall::Unpause, "unpausing contract").await
}

/// POST /admin/emergency/withdraw-eth
async fn emergency_withdraw_eth(State(state): State<AppState>) -> ApiResult<TransactionData> {
    submit_simple(
        &state,
        BridgeCall::EmergencyWithdrawEth,
        "emergency withdrawing native balance",
    )
    .await
}
