//! ICM Bridge API - Library interface
//!
//! HTTP gateway over the ICMBridge contract: read routes, signed bridge and
//! admin transactions, and a polling event watcher. Modules are public for
//! use in integration tests and by the typed [`client::BridgeApiClient`].

pub mod api;
pub mod bridge;
pub mod client;
pub mod config;
pub mod contracts;
pub mod dto;
pub mod error;
pub mod metrics;
pub mod units;
pub mod watcher;
