//! Serializable run reports.
//!
//! Reports are plain data for downstream analysis; circuits are embedded
//! in their textual form so a report stands alone without the binary
//! that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One evaluated candidate within an iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub value: f64,
    pub num_evaluations: u64,
    /// Serialized circuit text.
    pub circuit: String,
}

/// One generation of the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationReport {
    pub index: u64,
    /// Whether the best candidate beat the incumbent.
    pub improved: bool,
    /// Incumbent value after this iteration.
    pub best_value: f64,
    pub candidates: Vec<CandidateReport>,
    pub elapsed_ms: u64,
}

/// Full account of one evolutionary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub started_at: DateTime<Utc>,
    pub best_value: f64,
    pub best_circuit: String,
    pub num_iterations: u64,
    pub total_evaluations: u64,
    /// True when the run stopped on an external interrupt rather than
    /// on target convergence or budget exhaustion.
    pub interrupted: bool,
    pub elapsed_ms: u64,
    pub history: Vec<IterationReport>,
}
