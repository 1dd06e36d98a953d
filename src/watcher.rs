//! Bridge event watcher
//!
//! Polls `eth_getLogs` on the bridge contract and logs lock/mint/burn/unlock
//! and ICM message events as they land. The cursor only advances past a block
//! range once its logs were fetched, so a failed poll is retried rather than
//! skipped.

use alloy::primitives::{Address, LogData, TxHash, B256, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use alloy::transports::http::{Client, Http};
use eyre::{eyre, Result, WrapErr};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::WatcherConfig;
use crate::contracts::ICMBridge;
use crate::metrics;

/// Decoded bridge contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    TokensLocked {
        user: Address,
        amount: U256,
        destination_chain: B256,
        tx_id: B256,
        token: Address,
    },
    TokensMinted {
        user: Address,
        amount: U256,
        source_chain: B256,
        tx_id: B256,
        token: Address,
    },
    TokensBurned {
        user: Address,
        amount: U256,
        destination_chain: B256,
        tx_id: B256,
        token: Address,
    },
    TokensUnlocked {
        user: Address,
        amount: U256,
        source_chain: B256,
        tx_id: B256,
        token: Address,
    },
    MessageSent {
        destination_chain: B256,
        message_id: B256,
        message_type: String,
    },
    MessageReceived {
        source_chain: B256,
        message_id: B256,
        message_type: String,
    },
}

impl BridgeEvent {
    /// Solidity event name
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::TokensLocked { .. } => "TokensLocked",
            BridgeEvent::TokensMinted { .. } => "TokensMinted",
            BridgeEvent::TokensBurned { .. } => "TokensBurned",
            BridgeEvent::TokensUnlocked { .. } => "TokensUnlocked",
            BridgeEvent::MessageSent { .. } => "ICMMessageSent",
            BridgeEvent::MessageReceived { .. } => "ICMMessageReceived",
        }
    }

    /// Decode raw log data. Returns `None` for foreign or malformed logs.
    pub fn decode(data: &LogData) -> Option<Self> {
        let topic0 = *data.topics().first()?;

        if topic0 == ICMBridge::TokensLocked::SIGNATURE_HASH {
            let e = ICMBridge::TokensLocked::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::TokensLocked {
                user: e.user,
                amount: e.amount,
                destination_chain: e.destinationChain,
                tx_id: e.txId,
                token: e.token,
            })
        } else if topic0 == ICMBridge::TokensMinted::SIGNATURE_HASH {
            let e = ICMBridge::TokensMinted::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::TokensMinted {
                user: e.user,
                amount: e.amount,
                source_chain: e.sourceChain,
                tx_id: e.txId,
                token: e.token,
            })
        } else if topic0 == ICMBridge::TokensBurned::SIGNATURE_HASH {
            let e = ICMBridge::TokensBurned::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::TokensBurned {
                user: e.user,
                amount: e.amount,
                destination_chain: e.destinationChain,
                tx_id: e.txId,
                token: e.token,
            })
        } else if topic0 == ICMBridge::TokensUnlocked::SIGNATURE_HASH {
            let e = ICMBridge::TokensUnlocked::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::TokensUnlocked {
                user: e.user,
                amount: e.amount,
                source_chain: e.sourceChain,
                tx_id: e.txId,
                token: e.token,
            })
        } else if topic0 == ICMBridge::ICMMessageSent::SIGNATURE_HASH {
            let e = ICMBridge::ICMMessageSent::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::MessageSent {
                destination_chain: e.destinationChain,
                message_id: e.messageId,
                message_type: e.messageType,
            })
        } else if topic0 == ICMBridge::ICMMessageReceived::SIGNATURE_HASH {
            let e = ICMBridge::ICMMessageReceived::decode_log_data(data, true).ok()?;
            Some(BridgeEvent::MessageReceived {
                source_chain: e.sourceChain,
                message_id: e.messageId,
                message_type: e.messageType,
            })
        } else {
            None
        }
    }

    /// Emit a structured log line for this event
    fn log(&self, block_number: Option<u64>, transaction_hash: Option<TxHash>) {
        let block = block_number.map(|b| b.to_string()).unwrap_or_default();
        let tx = transaction_hash.map(|h| h.to_string()).unwrap_or_default();

        match self {
            BridgeEvent::TokensLocked {
                user,
                amount,
                destination_chain,
                tx_id,
                token,
            }
            | BridgeEvent::TokensBurned {
                user,
                amount,
                destination_chain,
                tx_id,
                token,
            } => {
                info!(
                    event = self.name(),
                    user = %user,
                    amount = %amount,
                    destination_chain = %destination_chain,
                    tx_id = %tx_id,
                    token = %token,
                    block_number = %block,
                    transaction_hash = %tx,
                    "Bridge event"
                );
            }
            BridgeEvent::TokensMinted {
                user,
                amount,
                source_chain,
                tx_id,
                token,
            }
            | BridgeEvent::TokensUnlocked {
                user,
                amount,
                source_chain,
                tx_id,
                token,
            } => {
                info!(
                    event = self.name(),
                    user = %user,
                    amount = %amount,
                    source_chain = %source_chain,
                    tx_id = %tx_id,
                    token = %token,
                    block_number = %block,
                    transaction_hash = %tx,
                    "Bridge event"
                );
            }
            BridgeEvent::MessageSent {
                destination_chain,
                message_id,
                message_type,
            } => {
                info!(
                    event = self.name(),
                    destination_chain = %destination_chain,
                    message_id = %message_id,
                    message_type = %message_type,
                    block_number = %block,
                    transaction_hash = %tx,
                    "ICM message event"
                );
            }
            BridgeEvent::MessageReceived {
                source_chain,
                message_id,
                message_type,
            } => {
                info!(
                    event = self.name(),
                    source_chain = %source_chain,
                    message_id = %message_id,
                    message_type = %message_type,
                    block_number = %block,
                    transaction_hash = %tx,
                    "ICM message event"
                );
            }
        }
    }
}

/// Split `[from, to]` into inclusive chunks of at most `max_range` blocks
pub fn block_ranges(from: u64, to: u64, max_range: u64) -> Vec<(u64, u64)> {
    let mut ranges = Vec::new();
    if from > to || max_range == 0 {
        return ranges;
    }

    let mut start = from;
    loop {
        let end = start.saturating_add(max_range - 1).min(to);
        ranges.push((start, end));
        if end >= to {
            break;
        }
        start = end + 1;
    }
    ranges
}

/// Polling watcher for bridge contract events
pub struct EventWatcher {
    provider: RootProvider<Http<Client>>,
    bridge_address: Address,
    config: WatcherConfig,
    /// Next block to scan; `None` until the first poll pins it to the head
    next_block: Option<u64>,
}

impl EventWatcher {
    /// Create a new event watcher over an existing provider
    pub fn new(
        provider: RootProvider<Http<Client>>,
        bridge_address: Address,
        config: WatcherConfig,
    ) -> Self {
        Self {
            provider,
            bridge_address,
            config,
            next_block: None,
        }
    }

    /// Next block the watcher will scan, once the first poll has pinned it
    pub fn next_block(&self) -> Option<u64> {
        self.next_block
    }

    /// Main run loop
    pub async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        info!(
            bridge = %self.bridge_address,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Event watcher starting"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Event watcher shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {
                    if let Err(e) = self.poll().await {
                        metrics::record_watcher_error("poll");
                        error!(error = %e, "Error polling bridge events");
                    }
                }
            }
        }

        Ok(())
    }

    /// Scan any new blocks, returning the number of decoded events
    pub async fn poll(&mut self) -> Result<usize> {
        let head = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| eyre!("Failed to get block number: {}", e))?;

        let from = match self.next_block {
            Some(next) => next,
            None => {
                info!(head, "Event watcher starting from current head");
                self.next_block = Some(head + 1);
                metrics::record_polled_block(head);
                return Ok(0);
            }
        };

        if from > head {
            return Ok(0);
        }

        let mut decoded = 0;
        for (start, end) in block_ranges(from, head, self.config.max_block_range) {
            let filter = Filter::new()
                .address(self.bridge_address)
                .from_block(start)
                .to_block(end);

            let logs = self
                .provider
                .get_logs(&filter)
                .await
                .wrap_err_with(|| format!("Failed to get logs from block {} to {}", start, end))?;

            decoded += self.handle_logs(&logs);

            self.next_block = Some(end + 1);
            metrics::record_polled_block(end);
        }

        Ok(decoded)
    }

    fn handle_logs(&self, logs: &[Log]) -> usize {
        let mut decoded = 0;
        for log in logs {
            match BridgeEvent::decode(log.data()) {
                Some(event) => {
                    metrics::record_event(event.name());
                    event.log(log.block_number, log.transaction_hash);
                    decoded += 1;
                }
                None => {
                    debug!(
                        tx_hash = ?log.transaction_hash,
                        log_index = ?log.log_index,
                        "Skipping unrecognised log"
                    );
                }
            }
        }
        decoded
    }
}
