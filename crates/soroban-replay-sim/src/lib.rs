//! Simulation gateway for rs-soroban-replay.
//!
//! The actual replay engine is an external collaborator with a fixed
//! request/response contract: it takes a transaction envelope, its recorded
//! result meta and a snapshot of ledger entries, and returns a status, an
//! optional error message and an ordered list of emitted events. This crate
//! owns that contract ([`SimulationRequest`], [`SimulationResponse`]), the
//! [`Simulator`] seam, and the process-based adapter that drives an engine
//! binary over JSON stdio.
//!
//! It also carries the strict-compatibility WASM guard used to flag contract
//! code that Soroban would reject (see [`wasm_guard`]).

mod process;
pub mod wasm_guard;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use process::ProcessSimulator;

/// Enumerated outcome of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimulationStatus {
    /// The transaction applied successfully.
    Success,
    /// The transaction applied but failed (e.g. a trapped contract call).
    Failure,
    /// The engine could not execute the transaction at all.
    Error,
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationStatus::Success => "SUCCESS",
            SimulationStatus::Failure => "FAILURE",
            SimulationStatus::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Fully self-contained input to one simulation invocation.
///
/// Carries no network identity; which network the snapshot came from is
/// tracked by the orchestrator, not the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Base64 XDR of the transaction envelope.
    pub envelope_xdr: String,
    /// Base64 XDR of the recorded result meta.
    pub result_meta_xdr: String,
    /// Base64 XDR of each ledger entry the transaction touches.
    #[serde(default)]
    pub ledger_entries: Vec<String>,
}

/// Outcome of one simulation invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Overall outcome.
    pub status: SimulationStatus,
    /// Engine-reported error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Events emitted during execution, in emission order.
    #[serde(default)]
    pub events: Vec<String>,
}

/// Errors produced while driving the simulation engine.
///
/// These are engine/transport failures, distinct from a simulation that ran
/// and reported `FAILURE` in its [`SimulationResponse`].
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The engine command could not be started.
    #[error("failed to launch simulation engine {command}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    /// I/O failure while exchanging data with the engine.
    #[error("i/o error talking to simulation engine: {0}")]
    Io(#[from] std::io::Error),

    /// The engine's output was not a valid response document.
    #[error("simulation engine produced invalid output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    /// The engine exited unsuccessfully.
    #[error("simulation engine exited with {status}: {stderr}")]
    EngineFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// A replay engine capable of simulating one transaction against a snapshot.
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Run one simulation to completion.
    async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&SimulationStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(SimulationStatus::Failure.to_string(), "FAILURE");
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let response: SimulationResponse = serde_json::from_str(r#"{"status":"ERROR"}"#).unwrap();
        assert_eq!(response.status, SimulationStatus::Error);
        assert!(response.error.is_none());
        assert!(response.events.is_empty());
    }

    #[test]
    fn request_round_trips() {
        let request = SimulationRequest {
            envelope_xdr: "AAAA".to_string(),
            result_meta_xdr: "BBBB".to_string(),
            ledger_entries: vec!["e1".to_string(), "e2".to_string()],
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: SimulationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ledger_entries, request.ledger_entries);
    }
}
