//! Error types for the variational search crate.

use thiserror::Error;

/// Errors raised while configuring or running a search.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VqeError {
    /// Invalid circuit content.
    #[error(transparent)]
    Circuit(#[from] evoq_circuit::CircuitError),

    /// Simulation failure.
    #[error(transparent)]
    Sim(#[from] evoq_sim::SimError),

    /// The candidate worker pool could not be built.
    #[error("worker pool: {0}")]
    WorkerPool(String),

    /// Hamiltonian register does not match the seed circuit.
    #[error("hamiltonian acts on {hamiltonian} qubits but circuit has {circuit}")]
    QubitMismatch { hamiltonian: usize, circuit: usize },
}

/// Convenience alias used throughout the crate.
pub type VqeResult<T> = Result<T, VqeError>;
