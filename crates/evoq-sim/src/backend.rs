//! Backend abstraction for circuit simulation.

use num_complex::Complex64;

use evoq_circuit::Circuit;

use crate::error::SimResult;
use crate::hamiltonian::Hamiltonian;

/// A circuit simulator producing canonically ordered statevectors.
///
/// Implementations must agree bit for bit on the convention: entry `k` of
/// the returned vector is the amplitude of the basis state whose bit `q`
/// is the state of qubit `q`. Backends are shared across worker threads,
/// hence `Send + Sync`.
pub trait SimulationBackend: Send + Sync {
    /// Simulate `circuit` from its prepared basis state.
    fn statevector(&self, circuit: &Circuit) -> SimResult<Vec<Complex64>>;

    /// Energy ⟨ψ|H|ψ⟩ of the circuit output under `hamiltonian`.
    fn expectation(&self, circuit: &Circuit, hamiltonian: &Hamiltonian) -> SimResult<f64> {
        let state = self.statevector(circuit)?;
        hamiltonian.expectation(&state)
    }
}
