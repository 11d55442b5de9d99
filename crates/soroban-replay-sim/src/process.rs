//! Process-based simulation engine adapter.
//!
//! The engine is an external binary that reads one `SimulationRequest` JSON
//! document on stdin and writes one `SimulationResponse` JSON document on
//! stdout. Diagnostics go to stderr, which is surfaced when the engine exits
//! unsuccessfully.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{Result, SimulationError, SimulationRequest, SimulationResponse, Simulator};

/// Drives a replay engine binary over JSON stdio.
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessSimulator {
    /// Create a simulator that invokes `program` for each request.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add fixed arguments passed on every invocation.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl Simulator for ProcessSimulator {
    async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResponse> {
        debug!(engine = %self.program.display(), "launching simulation engine");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SimulationError::Launch {
                command: self.program.display().to_string(),
                source,
            })?;

        let payload = serde_json::to_vec(request)?;
        let mut stdin = child.stdin.take().ok_or_else(|| {
            SimulationError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine stdin unavailable",
            ))
        })?;
        stdin.write_all(&payload).await?;
        // Close stdin so the engine sees EOF and starts executing.
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SimulationError::EngineFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
