//! Replay session orchestration for rs-soroban-replay.
//!
//! This crate drives a full debug session for one transaction hash:
//!
//! 1. Fetch the recorded envelope/result/meta from the primary network
//! 2. Extract the set of ledger keys the transaction touched
//! 3. Fetch current entry values on one or two networks and replay the
//!    transaction through the simulation engine per network
//! 4. Diff the two outcomes when a comparison network was requested
//!
//! In dual-network mode the two fetch-and-simulate pipelines run as
//! independent concurrent tasks joined before any outcome is inspected;
//! either both results are produced or the session fails with the first
//! error (primary network's error wins ties). There is never a partial
//! report.

mod diff;
mod session;

pub use diff::{diff_results, DiffReport, EventComparison, EventSide, MISSING_EVENT};
pub use session::{debug, run_simulations, DebugOutcome, EntryGateway, SessionConfig};

use soroban_replay_keys::ExtractError;
use soroban_replay_rpc::{Network, RpcError};
use soroban_replay_sim::SimulationError;
use thiserror::Error;

/// Terminal error of a debug session, carrying the first underlying failure
/// and, where applicable, the network it occurred on.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The recorded result meta could not be decoded into ledger keys.
    #[error("failed to extract ledger keys: {0}")]
    Extract(#[from] ExtractError),

    /// A network gateway operation failed.
    #[error("rpc failure on {network}: {source}")]
    Rpc {
        network: Network,
        #[source]
        source: RpcError,
    },

    /// The simulation engine failed for one network's replay.
    #[error("simulation failed on {network}: {source}")]
    Simulation {
        network: Network,
        #[source]
        source: SimulationError,
    },
}

impl SessionError {
    /// The network the failure occurred on, if it is network-scoped.
    pub fn network(&self) -> Option<Network> {
        match self {
            SessionError::Extract(_) => None,
            SessionError::Rpc { network, .. } | SessionError::Simulation { network, .. } => {
                Some(*network)
            }
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
