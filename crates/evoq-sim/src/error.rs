//! Error types for the simulation crate.

use thiserror::Error;

/// Errors raised while building Hamiltonians or simulating circuits.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    /// State or operator size does not match the register.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Matrix dimension is not a power of two.
    #[error("dimension {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Operator matrix is not square.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Observable fails the Hermitian symmetry check.
    #[error("matrix is not Hermitian at ({row}, {col})")]
    NonHermitian { row: usize, col: usize },

    /// Requested ground basis state exceeds the register.
    #[error("ground state {state} out of range for {num_qubits} qubits")]
    GroundStateOutOfRange { state: u64, num_qubits: usize },

    /// Invalid circuit content surfaced during simulation.
    #[error(transparent)]
    Circuit(#[from] evoq_circuit::CircuitError),
}

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;
