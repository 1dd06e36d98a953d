//! Data Transfer Objects for API requests and responses
//!
//! Field names are camelCase on the wire. Addresses, hashes and `uint256`
//! values travel as strings.

use serde::{Deserialize, Serialize};

use crate::units::AmountInput;

/// Success envelope: `{"success": true, "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error envelope: `{"success": false, "error": "...", "details": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub contract_address: String,
    pub timestamp: String,
}

// ============================================================================
// Read responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeInfoData {
    /// Ether units
    pub bridge_fee: String,
    /// Ether units
    pub total_fees_collected: String,
    pub fee_recipient: String,
    /// Raw bytes32 hex
    pub chain_id: String,
    /// `chain_id` decoded as a bytes32 string, when it is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_label: Option<String>,
    pub owner: String,
    pub paused: bool,
    pub contract_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfigData {
    pub token_address: String,
    pub is_whitelisted: bool,
    pub is_native: bool,
    pub counterpart_token: String,
    pub min_bridge_amount: String,
    pub max_bridge_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesData {
    pub token_address: String,
    pub locked_balance: String,
    pub minted_balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatusData {
    pub chain_id: String,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransactionData {
    pub tx_id: String,
    pub user: String,
    pub amount: String,
    pub destination_chain: String,
    pub timestamp: String,
    pub completed: bool,
    pub token: String,
    pub message_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatusData {
    pub message_hash: String,
    pub is_processed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNonceData {
    pub user_address: String,
    pub nonce: String,
}

// ============================================================================
// Bridge transfers
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    pub destination_chain: Option<String>,
    pub amount: Option<AmountInput>,
    pub token_address: Option<String>,
    /// Accepted for compatibility; the configured signer is always the sender
    pub user_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponseData {
    pub transaction_hash: String,
    pub destination_chain: String,
    pub amount: String,
    pub token_address: String,
    pub bridge_fee: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    pub source_chain: Option<String>,
    pub amount: Option<AmountInput>,
    pub token_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnResponseData {
    pub transaction_hash: String,
    pub source_chain: String,
    pub amount: String,
    pub token_address: String,
    pub bridge_fee: String,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistTokenRequest {
    pub token_address: Option<String>,
    pub is_native: Option<bool>,
    pub counterpart_token: Option<String>,
    /// Raw token units
    pub min_amount: Option<AmountInput>,
    /// Raw token units
    pub max_amount: Option<AmountInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistTokenData {
    pub transaction_hash: String,
    pub token_address: String,
    pub is_native: bool,
    pub counterpart_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub token_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTxData {
    pub transaction_hash: String,
    pub token_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableChainRequest {
    pub chain_id: Option<String>,
    pub bridge_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableChainData {
    pub transaction_hash: String,
    pub chain_id: String,
    pub bridge_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRequest {
    pub chain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTxData {
    pub transaction_hash: String,
    pub chain_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFeeRequest {
    /// Ether units
    pub fee: Option<AmountInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFeeData {
    pub transaction_hash: String,
    pub new_fee: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFeeRecipientRequest {
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecipientData {
    pub transaction_hash: String,
    pub recipient: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyWithdrawRequest {
    pub token_address: Option<String>,
    /// Raw token units
    pub amount: Option<AmountInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyWithdrawData {
    pub transaction_hash: String,
    pub token_address: String,
    pub amount: String,
}

/// Response for admin calls that take no arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub transaction_hash: String,
}
