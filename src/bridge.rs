//! Bridge contract adapter
//!
//! The HTTP layer talks to the bridge through the [`BridgeContract`] trait so
//! handlers can be exercised without a chain. [`EvmBridge`] is the alloy-backed
//! implementation used in production.
//!
//! # Transaction Building
//!
//! State-changing calls are ABI-encoded into a `TransactionRequest`, gas is
//! estimated from the signer's address and then padded by the configured
//! buffer. The provider is built with `with_recommended_fillers()` so nonce and
//! fee fields are populated automatically. Submission returns as soon as the
//! node accepts the transaction; receipts are not awaited.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::contracts::ICMBridge;
use crate::metrics;

/// Failures talking to the bridge contract, classified for HTTP mapping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The EVM reverted the call
    #[error("execution reverted: {reason}")]
    Reverted { reason: String, details: String },

    /// The signer cannot cover value + gas
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Gas estimation failed without a usable revert reason
    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    /// No signer configured for a state-changing call
    #[error("no signer configured")]
    SignerUnavailable,

    /// Transport or decoding failure
    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Where in the call lifecycle an error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    View,
    EstimateGas,
    Send,
}

impl ContractError {
    /// Classify a node/transport error message.
    pub fn classify(message: String, phase: CallPhase) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("insufficient funds") {
            return ContractError::InsufficientFunds(message);
        }

        if lower.contains("revert") {
            if let Some(reason) = extract_revert_reason(&message) {
                return ContractError::Reverted {
                    reason,
                    details: message,
                };
            }
            if phase != CallPhase::EstimateGas {
                return ContractError::Reverted {
                    reason: "execution reverted".to_string(),
                    details: message,
                };
            }
        }

        match phase {
            CallPhase::EstimateGas => ContractError::GasEstimation(message),
            CallPhase::View | CallPhase::Send => ContractError::Rpc(message),
        }
    }

    /// The underlying node message, if any
    pub fn details(&self) -> String {
        match self {
            ContractError::Reverted { details, .. } => details.clone(),
            ContractError::InsufficientFunds(m)
            | ContractError::GasEstimation(m)
            | ContractError::Rpc(m) => m.clone(),
            ContractError::SignerUnavailable => self.to_string(),
        }
    }
}

/// Pull the human-readable reason out of an `execution reverted: <reason>` message.
fn extract_revert_reason(message: &str) -> Option<String> {
    let marker = "execution reverted";
    let start = message.find(marker)? + marker.len();
    let rest = message[start..].trim_start_matches([':', ' ']);
    let reason = rest.split(", data").next().unwrap_or("").trim();

    if reason.is_empty() {
        None
    } else {
        Some(reason.trim_matches('"').to_string())
    }
}

/// Global bridge parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeInfo {
    pub bridge_fee: U256,
    pub total_fees_collected: U256,
    pub fee_recipient: Address,
    pub chain_id: B256,
    pub owner: Address,
    pub paused: bool,
}

/// Per-token bridging rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub is_whitelisted: bool,
    pub is_native: bool,
    pub counterpart_token: Address,
    pub min_bridge_amount: U256,
    pub max_bridge_amount: U256,
}

/// Locked and minted supply for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalances {
    pub locked: U256,
    pub minted: U256,
}

/// A bridge transfer recorded on-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub user: Address,
    pub amount: U256,
    pub destination_chain: B256,
    pub timestamp: U256,
    pub completed: bool,
    pub token: Address,
    pub message_type: String,
}

/// State-changing contract calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    LockAndBridge {
        destination_chain: B256,
        amount: U256,
        token: Address,
        fee: U256,
    },
    BurnAndBridge {
        source_chain: B256,
        amount: U256,
        token: Address,
        fee: U256,
    },
    WhitelistToken {
        token: Address,
        is_native: bool,
        counterpart_token: Address,
        min_amount: U256,
        max_amount: U256,
    },
    BlacklistToken {
        token: Address,
    },
    EnableChain {
        chain_id: B256,
        bridge_address: Address,
    },
    DisableChain {
        chain_id: B256,
    },
    SetBridgeFee {
        fee: U256,
    },
    SetFeeRecipient {
        recipient: Address,
    },
    Pause,
    Unpause,
    WithdrawFees,
    EmergencyWithdraw {
        token: Address,
        amount: U256,
    },
    EmergencyWithdrawEth,
}

impl BridgeCall {
    /// Contract method name, used for logs and metrics labels
    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::LockAndBridge { .. } => "lockAndBridge",
            BridgeCall::BurnAndBridge { .. } => "burnAndBridge",
            BridgeCall::WhitelistToken { .. } => "whitelistToken",
            BridgeCall::BlacklistToken { .. } => "blacklistToken",
            BridgeCall::EnableChain { .. } => "enableChain",
            BridgeCall::DisableChain { .. } => "disableChain",
            BridgeCall::SetBridgeFee { .. } => "setBridgeFee",
            BridgeCall::SetFeeRecipient { .. } => "setFeeRecipient",
            BridgeCall::Pause => "pause",
            BridgeCall::Unpause => "unpause",
            BridgeCall::WithdrawFees => "withdrawFees",
            BridgeCall::EmergencyWithdraw { .. } => "emergencyWithdraw",
            BridgeCall::EmergencyWithdrawEth => "emergencyWithdrawETH",
        }
    }

    /// Value attached to the transaction (bridge fee for lock/burn)
    pub fn value(&self) -> U256 {
        match self {
            BridgeCall::LockAndBridge { fee, .. } | BridgeCall::BurnAndBridge { fee, .. } => *fee,
            _ => U256::ZERO,
        }
    }

    /// ABI-encoded calldata
    pub fn calldata(&self) -> Bytes {
        let encoded = match self.clone() {
            BridgeCall::LockAndBridge {
                destination_chain,
                amount,
                token,
                ..
            } => ICMBridge::lockAndBridgeCall {
                destinationChain: destination_chain,
                amount,
                token,
            }
            .abi_encode(),
            BridgeCall::BurnAndBridge {
                source_chain,
                amount,
                token,
                ..
            } => ICMBridge::burnAndBridgeCall {
                sourceChain: source_chain,
                amount,
                token,
            }
            .abi_encode(),
            BridgeCall::WhitelistToken {
                token,
                is_native,
                counterpart_token,
                min_amount,
                max_amount,
            } => ICMBridge::whitelistTokenCall {
                token,
                isNative: is_native,
                counterpartToken: counterpart_token,
                minAmount: min_amount,
                maxAmount: max_amount,
            }
            .abi_encode(),
            BridgeCall::BlacklistToken { token } => {
                ICMBridge::blacklistTokenCall { token }.abi_encode()
            }
            BridgeCall::EnableChain {
                chain_id,
                bridge_address,
            } => ICMBridge::enableChainCall {
                chainId: chain_id,
                bridgeAddress: bridge_address,
            }
            .abi_encode(),
            BridgeCall::DisableChain { chain_id } => {
                ICMBridge::disableChainCall { chainId: chain_id }.abi_encode()
            }
            BridgeCall::SetBridgeFee { fee } => {
                ICMBridge::setBridgeFeeCall { newFee: fee }.abi_encode()
            }
            BridgeCall::SetFeeRecipient { recipient } => ICMBridge::setFeeRecipientCall {
                newRecipient: recipient,
            }
            .abi_encode(),
            BridgeCall::Pause => ICMBridge::pauseCall {}.abi_encode(),
            BridgeCall::Unpause => ICMBridge::unpauseCall {}.abi_encode(),
            BridgeCall::WithdrawFees => ICMBridge::withdrawFeesCall {}.abi_encode(),
            BridgeCall::EmergencyWithdraw { token, amount } => {
                ICMBridge::emergencyWithdrawCall { token, amount }.abi_encode()
            }
            BridgeCall::EmergencyWithdrawEth => ICMBridge::emergencyWithdrawETHCall {}.abi_encode(),
        };
        Bytes::from(encoded)
    }
}

/// Operations the HTTP layer needs from the bridge contract
#[async_trait]
pub trait BridgeContract: Send + Sync {
    /// Deployed contract address
    fn address(&self) -> Address;

    /// Whether state-changing calls can be signed
    fn has_signer(&self) -> bool;

    async fn chain_id(&self) -> Result<B256, ContractError>;

    async fn bridge_fee(&self) -> Result<U256, ContractError>;

    async fn bridge_info(&self) -> Result<BridgeInfo, ContractError>;

    async fn token_config(&self, token: Address) -> Result<TokenConfig, ContractError>;

    async fn token_balances(&self, token: Address) -> Result<TokenBalances, ContractError>;

    async fn is_chain_enabled(&self, chain_id: B256) -> Result<bool, ContractError>;

    async fn pending_transaction(&self, tx_id: B256) -> Result<PendingTransaction, ContractError>;

    async fn is_message_processed(&self, message_hash: B256) -> Result<bool, ContractError>;

    async fn user_nonce(&self, user: Address) -> Result<U256, ContractError>;

    /// Sign and broadcast a state-changing call, returning its hash
    async fn submit(&self, call: BridgeCall) -> Result<TxHash, ContractError>;
}

/// Bridge client backed by an alloy HTTP provider
pub struct EvmBridge {
    provider: RootProvider<Http<Client>>,
    rpc_url: Url,
    address: Address,
    signer: Option<PrivateKeySigner>,
    gas_buffer_percent: u64,
}

impl EvmBridge {
    /// Create a new bridge client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let rpc_url: Url = config.rpc_url.parse().wrap_err("Invalid RPC URL")?;
        let provider = ProviderBuilder::new().on_http(rpc_url.clone());

        let signer = match &config.private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse().wrap_err("Invalid private key")?;
                info!(signer = %signer.address(), "Admin wallet loaded");
                Some(signer)
            }
            None => {
                warn!("PRIVATE_KEY not set, bridge and admin routes are disabled");
                None
            }
        };

        Ok(Self {
            provider,
            rpc_url,
            address: config.contract_address,
            signer,
            gas_buffer_percent: config.gas_buffer_percent,
        })
    }

    /// Read-only provider, shared with the event watcher
    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }

    fn contract(&self) -> ICMBridge::ICMBridgeInstance<Http<Client>, &RootProvider<Http<Client>>> {
        ICMBridge::new(self.address, &self.provider)
    }
}

/// Map an alloy contract-call error into a [`ContractError`] and record it
fn view_error(method: &'static str) -> impl Fn(alloy::contract::Error) -> ContractError {
    move |e| {
        metrics::record_contract_call(method, false);
        ContractError::classify(e.to_string(), CallPhase::View)
    }
}

/// Apply the gas buffer to an estimate (`estimate * percent / 100`)
pub fn buffered_gas(estimate: u64, percent: u64) -> u64 {
    let padded = (estimate as u128) * (percent as u128) / 100;
    padded.min(u64::MAX as u128) as u64
}

#[async_trait]
impl BridgeContract for EvmBridge {
    fn address(&self) -> Address {
        self.address
    }

    fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    async fn chain_id(&self) -> Result<B256, ContractError> {
        let result = self
            .contract()
            .CHAIN_ID()
            .call()
            .await
            .map_err(view_error("CHAIN_ID"))?;
        metrics::record_contract_call("CHAIN_ID", true);
        Ok(result._0)
    }

    async fn bridge_fee(&self) -> Result<U256, ContractError> {
        let result = self
            .contract()
            .bridgeFee()
            .call()
            .await
            .map_err(view_error("bridgeFee"))?;
        metrics::record_contract_call("bridgeFee", true);
        Ok(result._0)
    }

    async fn bridge_info(&self) -> Result<BridgeInfo, ContractError> {
        let contract = self.contract();
        let fee_call = contract.bridgeFee();
        let total_call = contract.totalFeesCollected();
        let recipient_call = contract.feeRecipient();
        let chain_call = contract.CHAIN_ID();
        let owner_call = contract.owner();
        let paused_call = contract.paused();

        let (fee, total, recipient, chain_id, owner, paused) = tokio::try_join!(
            async { fee_call.call().await.map_err(view_error("bridgeFee")) },
            async {
                total_call
                    .call()
                    .await
                    .map_err(view_error("totalFeesCollected"))
            },
            async { recipient_call.call().await.map_err(view_error("feeRecipient")) },
            async { chain_call.call().await.map_err(view_error("CHAIN_ID")) },
            async { owner_call.call().await.map_err(view_error("owner")) },
            async { paused_call.call().await.map_err(view_error("paused")) },
        )?;
        metrics::record_contract_call("bridgeInfo", true);

        Ok(BridgeInfo {
            bridge_fee: fee._0,
            total_fees_collected: total._0,
            fee_recipient: recipient._0,
            chain_id: chain_id._0,
            owner: owner._0,
            paused: paused._0,
        })
    }

    async fn token_config(&self, token: Address) -> Result<TokenConfig, ContractError> {
        let result = self
            .contract()
            .getTokenConfig(token)
            .call()
            .await
            .map_err(view_error("getTokenConfig"))?;
        metrics::record_contract_call("getTokenConfig", true);

        let config = result._0;
        Ok(TokenConfig {
            is_whitelisted: config.isWhitelisted,
            is_native: config.isNative,
            counterpart_token: config.counterpartToken,
            min_bridge_amount: config.minBridgeAmount,
            max_bridge_amount: config.maxBridgeAmount,
        })
    }

    async fn token_balances(&self, token: Address) -> Result<TokenBalances, ContractError> {
        let contract = self.contract();
        let locked_call = contract.getLockedBalance(token);
        let minted_call = contract.getMintedBalance(token);

        let (locked, minted) = tokio::try_join!(
            async {
                locked_call
                    .call()
                    .await
                    .map_err(view_error("getLockedBalance"))
            },
            async {
                minted_call
                    .call()
                    .await
                    .map_err(view_error("getMintedBalance"))
            },
        )?;
        metrics::record_contract_call("tokenBalances", true);

        Ok(TokenBalances {
            locked: locked._0,
            minted: minted._0,
        })
    }

    async fn is_chain_enabled(&self, chain_id: B256) -> Result<bool, ContractError> {
        let result = self
            .contract()
            .isChainEnabled(chain_id)
            .call()
            .await
            .map_err(view_error("isChainEnabled"))?;
        metrics::record_contract_call("isChainEnabled", true);
        Ok(result._0)
    }

    async fn pending_transaction(&self, tx_id: B256) -> Result<PendingTransaction, ContractError> {
        let result = self
            .contract()
            .getPendingTransaction(tx_id)
            .call()
            .await
            .map_err(view_error("getPendingTransaction"))?;
        metrics::record_contract_call("getPendingTransaction", true);

        let tx = result._0;
        Ok(PendingTransaction {
            user: tx.user,
            amount: tx.amount,
            destination_chain: tx.destinationChain,
            timestamp: tx.timestamp,
            completed: tx.completed,
            token: tx.token,
            message_type: tx.messageType,
        })
    }

    async fn is_message_processed(&self, message_hash: B256) -> Result<bool, ContractError> {
        let result = self
            .contract()
            .isMessageProcessed(message_hash)
            .call()
            .await
            .map_err(view_error("isMessageProcessed"))?;
        metrics::record_contract_call("isMessageProcessed", true);
        Ok(result._0)
    }

    async fn user_nonce(&self, user: Address) -> Result<U256, ContractError> {
        let result = self
            .contract()
            .userNonces(user)
            .call()
            .await
            .map_err(view_error("userNonces"))?;
        metrics::record_contract_call("userNonces", true);
        Ok(result._0)
    }

    async fn submit(&self, call: BridgeCall) -> Result<TxHash, ContractError> {
        let signer = self
            .signer
            .clone()
            .ok_or(ContractError::SignerUnavailable)?;
        let from = signer.address();
        let method = call.method();

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.clone());

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(call.calldata())
            .with_value(call.value());

        let estimate = provider.estimate_gas(&tx).await.map_err(|e| {
            metrics::record_transaction(method, false);
            ContractError::classify(e.to_string(), CallPhase::EstimateGas)
        })?;
        let gas_limit = buffered_gas(estimate, self.gas_buffer_percent);

        debug!(method, estimate, gas_limit, "Submitting bridge transaction");

        let pending = provider
            .send_transaction(tx.with_gas_limit(gas_limit))
            .await
            .map_err(|e| {
                metrics::record_transaction(method, false);
                ContractError::classify(e.to_string(), CallPhase::Send)
            })?;

        let tx_hash = *pending.tx_hash();
        metrics::record_transaction(method, true);
        info!(method, tx_hash = %tx_hash, "Bridge transaction sent");

        Ok(tx_hash)
    }
}
