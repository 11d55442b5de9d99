//! Debug session orchestration.

use async_trait::async_trait;
use soroban_replay_keys::{extract_ledger_keys, LedgerKeyRef};
use soroban_replay_rpc::{
    LedgerEntrySnapshot, Network, RpcClient, TransactionRecord,
};
use soroban_replay_sim::{wasm_guard, SimulationRequest, SimulationResponse, Simulator};
use tracing::{debug, info, warn};

use crate::diff::{diff_results, DiffReport};
use crate::{Result, SessionError};

/// Parameters of one debug session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Network the transaction was recorded on; also the primary replay
    /// network.
    pub network: Network,
    /// Second network to replay against and diff with, if any.
    pub compare_network: Option<Network>,
    /// Override for the primary network's Horizon endpoint.
    pub horizon_url: Option<String>,
}

impl SessionConfig {
    /// A single-network session with default endpoints.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            compare_network: None,
            horizon_url: None,
        }
    }
}

/// Source of current ledger entry values for one network.
///
/// [`RpcClient`] is the production implementation; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait EntryGateway: Send + Sync {
    /// The network this gateway serves.
    fn network(&self) -> Network;

    /// Fetch the current value of every requested entry.
    async fn fetch_entries(
        &self,
        keys: &[LedgerKeyRef],
    ) -> soroban_replay_rpc::Result<LedgerEntrySnapshot>;
}

#[async_trait]
impl EntryGateway for RpcClient {
    fn network(&self) -> Network {
        RpcClient::network(self)
    }

    async fn fetch_entries(
        &self,
        keys: &[LedgerKeyRef],
    ) -> soroban_replay_rpc::Result<LedgerEntrySnapshot> {
        self.get_ledger_entries(keys).await
    }
}

/// Everything a completed debug session produced.
#[derive(Debug)]
pub struct DebugOutcome {
    /// The recorded transaction as fetched from Horizon.
    pub record: TransactionRecord,
    /// The deduplicated, sorted ledger keys the transaction touched.
    pub keys: Vec<LedgerKeyRef>,
    /// One simulation result per network, primary first.
    pub results: Vec<(Network, SimulationResponse)>,
    /// Structural comparison of the two results, in dual-network mode.
    pub diff: Option<DiffReport>,
}

/// Run a full debug session for one transaction hash.
pub async fn debug(
    config: &SessionConfig,
    simulator: &dyn Simulator,
    tx_hash: &str,
) -> Result<DebugOutcome> {
    let primary = match &config.horizon_url {
        Some(url) => RpcClient::with_horizon_url(url, config.network),
        None => RpcClient::new(config.network),
    }
    .map_err(|source| SessionError::Rpc {
        network: config.network,
        source,
    })?;

    info!(network = %config.network, hash = tx_hash, "fetching transaction");
    let record = primary
        .get_transaction(tx_hash)
        .await
        .map_err(|source| SessionError::Rpc {
            network: config.network,
            source,
        })?;

    let mut keys: Vec<LedgerKeyRef> = extract_ledger_keys(&record.result_meta_xdr)?
        .into_iter()
        .collect();
    keys.sort();
    info!(keys = keys.len(), "extracted ledger keys");

    let compare = match config.compare_network {
        Some(network) => Some(RpcClient::new(network).map_err(|source| SessionError::Rpc {
            network,
            source,
        })?),
        None => None,
    };

    let results = run_simulations(
        &record,
        &keys,
        &primary,
        compare.as_ref().map(|c| c as &dyn EntryGateway),
        simulator,
    )
    .await?;

    let diff = match results.as_slice() {
        [(_, a), (_, b)] => Some(diff_results(a, b)),
        _ => None,
    };

    Ok(DebugOutcome {
        record,
        keys,
        results,
        diff,
    })
}

/// Fetch entries and replay the transaction on one or two networks.
///
/// In dual mode the two pipelines run concurrently and are joined before
/// either outcome is inspected. On failure the whole call fails with the
/// first error; when both pipelines fail, the primary network's error is
/// returned. Results are ordered primary first.
pub async fn run_simulations(
    record: &TransactionRecord,
    keys: &[LedgerKeyRef],
    primary: &dyn EntryGateway,
    compare: Option<&dyn EntryGateway>,
    simulator: &dyn Simulator,
) -> Result<Vec<(Network, SimulationResponse)>> {
    match compare {
        None => {
            let response = run_single(record, keys, primary, simulator).await?;
            Ok(vec![(primary.network(), response)])
        }
        Some(compare) => {
            let (primary_res, compare_res) = tokio::join!(
                run_single(record, keys, primary, simulator),
                run_single(record, keys, compare, simulator),
            );
            let primary_response = primary_res?;
            let compare_response = compare_res?;
            Ok(vec![
                (primary.network(), primary_response),
                (compare.network(), compare_response),
            ])
        }
    }
}

/// One network's pipeline: fetch the entry snapshot, then simulate.
async fn run_single(
    record: &TransactionRecord,
    keys: &[LedgerKeyRef],
    gateway: &dyn EntryGateway,
    simulator: &dyn Simulator,
) -> Result<SimulationResponse> {
    let network = gateway.network();
    debug!(network = %network, keys = keys.len(), "fetching entry snapshot");
    let entries = gateway
        .fetch_entries(keys)
        .await
        .map_err(|source| SessionError::Rpc { network, source })?;

    for incompatibility in wasm_guard::scan_entries(entries.iter().map(String::as_str)) {
        warn!(
            network = %network,
            contract = %incompatibility.contract_hash,
            reason = %incompatibility.reason,
            "contract code fails strict Soroban compatibility"
        );
    }

    let request = SimulationRequest {
        envelope_xdr: record.envelope_xdr.clone(),
        result_meta_xdr: record.result_meta_xdr.clone(),
        ledger_entries: entries,
    };

    debug!(network = %network, "simulating");
    simulator
        .simulate(&request)
        .await
        .map_err(|source| SessionError::Simulation { network, source })
}
