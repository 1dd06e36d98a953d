//! Typed HTTP client for the bridge API

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dto::*;

/// Base URL used when none is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-2xx status
    #[error("HTTP error! status: {}", .status.as_u16())]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status when the server rejected the request
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server error envelope, if the body carried one
    pub fn error_response(&self) -> Option<ErrorResponse> {
        match self {
            ClientError::Http { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Client for the bridge API routes
#[derive(Debug, Clone)]
pub struct BridgeApiClient {
    base_url: String,
    client: Client,
}

impl BridgeApiClient {
    /// Create a client for `base_url`. Fails only if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client for a server on [`DEFAULT_BASE_URL`]
    pub fn local() -> Result<Self, ClientError> {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "Bridge API request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "Bridge API request failed");
            return Err(ClientError::Http { status, body: text });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response: ApiResponse<T> = self.request::<(), _>(Method::GET, path, None).await?;
        Ok(response.data)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: ApiResponse<T> = self.request(Method::POST, path, Some(body)).await?;
        Ok(response.data)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.post(path, &serde_json::json!({})).await
    }

    // Health

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.request::<(), _>(Method::GET, "/health", None).await
    }

    /// `true` when `/health` answers successfully
    pub async fn test_connection(&self) -> bool {
        match self.health().await {
            Ok(health) => health.success,
            Err(e) => {
                warn!(error = %e, "Bridge API connection test failed");
                false
            }
        }
    }

    // Reads

    pub async fn bridge_info(&self) -> Result<BridgeInfoData, ClientError> {
        self.get("/bridge/info").await
    }

    pub async fn token_config(&self, token_address: &str) -> Result<TokenConfigData, ClientError> {
        self.get(&format!("/token/{}/config", token_address)).await
    }

    pub async fn token_balances(&self, token_address: &str) -> Result<TokenBalancesData, ClientError> {
        self.get(&format!("/token/{}/balances", token_address)).await
    }

    pub async fn chain_enabled(&self, chain_id: &str) -> Result<ChainStatusData, ClientError> {
        self.get(&format!("/chain/{}/enabled", chain_id)).await
    }

    pub async fn pending_transaction(&self, tx_id: &str) -> Result<PendingTransactionData, ClientError> {
        self.get(&format!("/transaction/{}", tx_id)).await
    }

    pub async fn message_processed(&self, message_hash: &str) -> Result<MessageStatusData, ClientError> {
        self.get(&format!("/message/{}/processed", message_hash)).await
    }

    pub async fn user_nonce(&self, user_address: &str) -> Result<UserNonceData, ClientError> {
        self.get(&format!("/user/{}/nonce", user_address)).await
    }

    // Bridge transfers

    pub async fn lock_and_bridge(&self, request: &LockRequest) -> Result<LockResponseData, ClientError> {
        self.post("/bridge/lock", request).await
    }

    pub async fn burn_and_bridge(&self, request: &BurnRequest) -> Result<BurnResponseData, ClientError> {
        self.post("/bridge/burn", request).await
    }

    // Admin

    pub async fn whitelist_token(
        &self,
        request: &WhitelistTokenRequest,
    ) -> Result<WhitelistTokenData, ClientError> {
        self.post("/admin/token/whitelist", request).await
    }

    pub async fn blacklist_token(&self, token_address: &str) -> Result<TokenTxData, ClientError> {
        let request = TokenRequest {
            token_address: Some(token_address.to_string()),
        };
        self.post("/admin/token/blacklist", &request).await
    }

    pub async fn enable_chain(
        &self,
        chain_id: &str,
        bridge_address: &str,
    ) -> Result<EnableChainData, ClientError> {
        let request = EnableChainRequest {
            chain_id: Some(chain_id.to_string()),
            bridge_address: Some(bridge_address.to_string()),
        };
        self.post("/admin/chain/enable", &request).await
    }

    pub async fn disable_chain(&self, chain_id: &str) -> Result<ChainTxData, ClientError> {
        let request = ChainRequest {
            chain_id: Some(chain_id.to_string()),
        };
        self.post("/admin/chain/disable", &request).await
    }

    /// Fee is in ether units, e.g. `"0.001"`
    pub async fn set_bridge_fee(&self, fee: &str) -> Result<SetFeeData, ClientError> {
        let request = SetFeeRequest {
            fee: Some(fee.into()),
        };
        self.post("/admin/fee/set", &request).await
    }

    pub async fn set_fee_recipient(&self, recipient: &str) -> Result<FeeRecipientData, ClientError> {
        let request = SetFeeRecipientRequest {
            recipient: Some(recipient.to_string()),
        };
        self.post("/admin/fee/recipient", &request).await
    }

    pub async fn withdraw_fees(&self) -> Result<TransactionData, ClientError> {
        self.post_empty("/admin/fees/withdraw").await
    }

    pub async fn pause(&self) -> Result<TransactionData, ClientError> {
        self.post_empty("/admin/pause").await
    }

    pub async fn unpause(&self) -> Result<TransactionData, ClientError> {
        self.post_empty("/admin/unpause").await
    }

    pub async fn emergency_withdraw(
        &self,
        request: &EmergencyWithdrawRequest,
    ) -> Result<EmergencyWithdrawData, ClientError> {
        self.post("/admin/emergency/withdraw", request).await
    }

    pub async fn emergency_withdraw_eth(&self) -> Result<TransactionData, ClientError> {
        self.post_empty("/admin/emergency/withdraw-eth").await
    }
}
