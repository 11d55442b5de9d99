//! Plain-text report rendering for debug sessions.

use soroban_replay_debug::{DebugOutcome, DiffReport};
use soroban_replay_rpc::Network;
use soroban_replay_sim::SimulationResponse;

/// Print the full report for a completed debug session.
pub fn print_outcome(outcome: &DebugOutcome) {
    println!("Ledger keys touched: {}", outcome.keys.len());
    for key in &outcome.keys {
        println!("  {}", key);
    }
    println!();

    for (network, response) in &outcome.results {
        print_simulation_result(*network, response);
    }

    if let Some(diff) = &outcome.diff {
        print_diff(diff, &outcome.results);
    }
}

fn print_simulation_result(network: Network, response: &SimulationResponse) {
    println!("Simulation on {}:", network);
    println!("  Status: {}", response.status);
    if let Some(error) = &response.error {
        println!("  Error:  {}", error);
    }
    println!("  Events: {}", response.events.len());
    for (index, event) in response.events.iter().enumerate() {
        println!("    [{}] {}", index, event);
    }
    println!();
}

fn print_diff(diff: &DiffReport, results: &[(Network, SimulationResponse)]) {
    let (left, right) = match results {
        [(left, _), (right, _)] => (left, right),
        _ => return,
    };

    println!("Comparison ({} vs {}):", left, right);

    if diff.status_match {
        println!("  Status: match ({})", diff.statuses.0);
    } else {
        println!(
            "  Status: MISMATCH ({} vs {})",
            diff.statuses.0, diff.statuses.1
        );
    }

    let mismatches: Vec<_> = diff.mismatches().collect();
    if mismatches.is_empty() {
        println!("  Events: all {} match", diff.events.len());
    } else {
        println!(
            "  Events: {} of {} differ",
            mismatches.len(),
            diff.events.len()
        );
        for cmp in mismatches {
            println!("    [{}] {} | {}", cmp.index, cmp.left, cmp.right);
        }
    }

    if diff.is_clean() {
        println!();
        println!("Results are identical.");
    }
}
