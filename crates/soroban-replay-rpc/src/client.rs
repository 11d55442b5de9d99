//! HTTP client for Horizon and Soroban RPC.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use soroban_replay_keys::LedgerKeyRef;
use tracing::debug;
use url::Url;

use crate::network::{Network, NetworkConfig};
use crate::{Result, RpcError};

/// Default timeout for a single HTTP request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The raw serialized fields recorded for a transaction.
///
/// Each field is an opaque base64 XDR payload. Only `result_meta_xdr` is
/// decoded by this tool (by the key extractor); the rest pass through to the
/// simulation engine untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    /// The signed, submitted transaction envelope.
    pub envelope_xdr: String,
    /// The recorded execution result.
    pub result_xdr: String,
    /// The recorded result meta describing every state change.
    pub result_meta_xdr: String,
}

/// Current values of a set of ledger entries, base64 XDR encoded.
///
/// Each value is implicitly keyed by the [`LedgerKeyRef`] used to request it;
/// consumers must not read meaning into the ordering.
pub type LedgerEntrySnapshot = Vec<String>;

/// Client for one network's Horizon and Soroban RPC endpoints.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    config: NetworkConfig,
    horizon: Url,
}

impl RpcClient {
    /// Create a client with the default endpoints of a known network.
    pub fn new(network: Network) -> Result<Self> {
        Self::with_config(network.config())
    }

    /// Create a client for a known network with a custom Horizon URL.
    pub fn with_horizon_url(url: &str, network: Network) -> Result<Self> {
        Self::with_config(network.config().with_horizon_url(url))
    }

    /// Create a client from an explicit endpoint configuration.
    pub fn with_config(config: NetworkConfig) -> Result<Self> {
        // Normalize the Horizon URL (ensure trailing slash) so joins work.
        let mut horizon = Url::parse(&config.horizon_url)?;
        if !horizon.path().ends_with('/') {
            horizon.set_path(&format!("{}/", horizon.path()));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("rs-soroban-replay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            horizon,
        })
    }

    /// The network this client talks to.
    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Fetch the recorded envelope/result/meta for a transaction hash.
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionRecord> {
        let url = self.horizon.join(&format!("transactions/{hash}"))?;
        debug!(url = %url, "fetching transaction");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RpcError::NotFound {
                hash: hash.to_string(),
            });
        }
        let response = response.error_for_status()?;

        response
            .json::<TransactionRecord>()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("transaction record: {e}")))
    }

    /// Fetch the current values of a set of ledger entries.
    ///
    /// Fails with [`RpcError::MissingEntries`] unless the network returns
    /// one entry per requested key, so callers never observe a partial
    /// snapshot.
    pub async fn get_ledger_entries(&self, keys: &[LedgerKeyRef]) -> Result<LedgerEntrySnapshot> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getLedgerEntries",
            params: GetLedgerEntriesParams {
                keys: keys.iter().map(LedgerKeyRef::as_str).collect(),
            },
        };
        debug!(
            url = %self.config.soroban_rpc_url,
            keys = keys.len(),
            "fetching ledger entries"
        );

        let response = self
            .http
            .post(&self.config.soroban_rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: JsonRpcResponse<GetLedgerEntriesResult> = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("getLedgerEntries: {e}")))?;

        snapshot_from_response(body, keys.len())
    }
}

/// Validate a `getLedgerEntries` response body against the request size.
fn snapshot_from_response(
    body: JsonRpcResponse<GetLedgerEntriesResult>,
    requested: usize,
) -> Result<LedgerEntrySnapshot> {
    if let Some(error) = body.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    let result = body
        .result
        .ok_or_else(|| RpcError::InvalidResponse("missing result field".to_string()))?;

    if result.entries.len() != requested {
        return Err(RpcError::MissingEntries {
            requested,
            returned: result.entries.len(),
        });
    }

    Ok(result.entries.into_iter().map(|entry| entry.xdr).collect())
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: P,
}

#[derive(Debug, Serialize)]
struct GetLedgerEntriesParams<'a> {
    keys: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<R> {
    #[serde(default)]
    result: Option<R>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetLedgerEntriesResult {
    #[serde(default)]
    entries: Vec<LedgerEntryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerEntryResult {
    #[allow(dead_code)]
    #[serde(default)]
    key: Option<String>,
    xdr: String,
}
