//! Structural comparison of two simulation results.
//!
//! The differ is a pure function: exact status equality plus an
//! index-aligned, value-exact comparison of the two event sequences. It
//! never reorders, deduplicates or interprets event contents.

use soroban_replay_sim::{SimulationResponse, SimulationStatus};

/// Sentinel displayed for an event index that one side does not have.
pub const MISSING_EVENT: &str = "<missing>";

/// One side's value at an event index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSide {
    /// The event emitted at this index.
    Present(String),
    /// The sequence ended before this index.
    Missing,
}

impl EventSide {
    /// The value to display, with the `<missing>` sentinel for short sides.
    pub fn as_str(&self) -> &str {
        match self {
            EventSide::Present(event) => event,
            EventSide::Missing => MISSING_EVENT,
        }
    }
}

impl std::fmt::Display for EventSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison outcome at one event index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventComparison {
    /// Position in the event sequences.
    pub index: usize,
    /// First result's value at this index.
    pub left: EventSide,
    /// Second result's value at this index.
    pub right: EventSide,
}

impl EventComparison {
    /// Whether both sides agree at this index.
    pub fn is_match(&self) -> bool {
        self.left == self.right
    }
}

/// Structural comparison of two simulation results.
///
/// Derived and transient: produced fresh per comparison, never persisted.
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// Whether the two statuses are exactly equal.
    pub status_match: bool,
    /// The two statuses, in (first, second) order.
    pub statuses: (SimulationStatus, SimulationStatus),
    /// Per-index event comparisons over the longer of the two sequences.
    pub events: Vec<EventComparison>,
}

impl DiffReport {
    /// Event indices where the two results disagree.
    pub fn mismatches(&self) -> impl Iterator<Item = &EventComparison> {
        self.events.iter().filter(|c| !c.is_match())
    }

    /// Whether the two results are structurally identical.
    pub fn is_clean(&self) -> bool {
        self.status_match && self.events.iter().all(EventComparison::is_match)
    }
}

/// Compare two simulation results structurally.
pub fn diff_results(a: &SimulationResponse, b: &SimulationResponse) -> DiffReport {
    let len = a.events.len().max(b.events.len());
    let events = (0..len)
        .map(|index| EventComparison {
            index,
            left: side(&a.events, index),
            right: side(&b.events, index),
        })
        .collect();

    DiffReport {
        status_match: a.status == b.status,
        statuses: (a.status, b.status),
        events,
    }
}

fn side(events: &[String], index: usize) -> EventSide {
    match events.get(index) {
        Some(event) => EventSide::Present(event.clone()),
        None => EventSide::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: SimulationStatus, events: &[&str]) -> SimulationResponse {
        SimulationResponse {
            status,
            error: None,
            events: events.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn identical_results_are_clean() {
        let a = response(SimulationStatus::Success, &["a", "b"]);
        let report = diff_results(&a, &a.clone());
        assert!(report.is_clean());
        assert_eq!(report.mismatches().count(), 0);
    }

    #[test]
    fn event_value_mismatch_is_reported_with_both_sides() {
        let a = response(SimulationStatus::Success, &["a", "b"]);
        let b = response(SimulationStatus::Success, &["a", "c"]);
        let report = diff_results(&a, &b);

        assert!(report.status_match);
        assert!(report.events[0].is_match());
        let mismatch = &report.events[1];
        assert!(!mismatch.is_match());
        assert_eq!(mismatch.left, EventSide::Present("b".to_string()));
        assert_eq!(mismatch.right, EventSide::Present("c".to_string()));
    }

    #[test]
    fn length_difference_reports_missing_on_the_short_side() {
        let a = response(SimulationStatus::Success, &["a", "b", "c"]);
        let b = response(SimulationStatus::Success, &["a", "b", "c", "d", "e"]);
        let report = diff_results(&a, &b);

        assert_eq!(report.events.len(), 5);
        for index in 0..3 {
            assert!(report.events[index].is_match());
        }
        for index in 3..5 {
            let cmp = &report.events[index];
            assert!(!cmp.is_match());
            assert_eq!(cmp.left, EventSide::Missing);
            assert_eq!(cmp.left.as_str(), MISSING_EVENT);
        }
    }

    #[test]
    fn status_difference_is_not_a_match() {
        let a = response(SimulationStatus::Success, &[]);
        let b = response(SimulationStatus::Failure, &[]);
        let report = diff_results(&a, &b);
        assert!(!report.status_match);
        assert!(!report.is_clean());
        assert_eq!(
            report.statuses,
            (SimulationStatus::Success, SimulationStatus::Failure)
        );
    }
}
