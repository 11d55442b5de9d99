//! Network gateway for rs-soroban-replay.
//!
//! This crate talks to the Stellar network on behalf of a replay session:
//!
//! - Horizon, to resolve a transaction hash into its recorded envelope,
//!   result and result-meta XDR
//! - Soroban RPC, to fetch the current values of a set of ledger entries
//!
//! All payloads are treated as opaque base64 XDR pass-through values; the
//! gateway performs no decoding beyond the JSON transport framing.

mod client;
mod network;

pub use client::{LedgerEntrySnapshot, RpcClient, TransactionRecord};
pub use network::{Network, NetworkConfig};

use thiserror::Error;

/// Errors produced by network gateway operations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The transaction hash is not known to Horizon.
    #[error("transaction {hash} not found")]
    NotFound { hash: String },

    /// Underlying HTTP failure, including timeouts and cancellations.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered, but not with the shape we expect.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A JSON-RPC level error reported by Soroban RPC.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The network did not return an entry for every requested key.
    #[error("ledger entries missing: requested {requested}, got {returned}")]
    MissingEntries { requested: usize, returned: usize },

    /// A configured endpoint URL could not be parsed.
    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The network name is not one of the known networks.
    #[error("unknown network: {0} (use testnet, mainnet, or futurenet)")]
    UnknownNetwork(String),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, RpcError>;
