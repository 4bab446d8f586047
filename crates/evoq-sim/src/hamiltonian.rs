//! Hermitian observables over a qubit register.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};
use crate::state;

const HERMITIAN_TOL: f64 = 1e-9;

/// A dense Hermitian matrix acting on `num_qubits` qubits.
///
/// The matrix is validated once at construction; downstream code relies
/// on real expectation values without re-checking.
#[derive(Debug, Clone)]
pub struct Hamiltonian {
    matrix: Array2<Complex64>,
    num_qubits: usize,
    min_eigenvalue: Option<f64>,
    ground_basis_state: Option<u64>,
}

impl Hamiltonian {
    /// Build a Hamiltonian from a dense matrix.
    ///
    /// The matrix must be square, of power-of-two dimension and Hermitian
    /// within `1e-9` elementwise.
    pub fn new(matrix: Array2<Complex64>) -> SimResult<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(SimError::NotSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        let num_qubits = state::int_log2(matrix.nrows())?;
        for row in 0..matrix.nrows() {
            for col in row..matrix.ncols() {
                let delta = matrix[(row, col)] - matrix[(col, row)].conj();
                if delta.norm() > HERMITIAN_TOL {
                    return Err(SimError::NonHermitian { row, col });
                }
            }
        }
        Ok(Self {
            matrix,
            num_qubits,
            min_eigenvalue: None,
            ground_basis_state: None,
        })
    }

    /// Attach externally computed ground-state data.
    ///
    /// Eigendecomposition is the loader's job; the search only needs the
    /// minimal eigenvalue as a target and, optionally, the classical
    /// ground basis state for seeding.
    pub fn with_ground_state(
        mut self,
        min_eigenvalue: f64,
        ground_basis_state: u64,
    ) -> SimResult<Self> {
        if ground_basis_state >= (1u64 << self.num_qubits) {
            return Err(SimError::GroundStateOutOfRange {
                state: ground_basis_state,
                num_qubits: self.num_qubits,
            });
        }
        self.min_eigenvalue = Some(min_eigenvalue);
        self.ground_basis_state = Some(ground_basis_state);
        Ok(self)
    }

    /// Diagonal Hamiltonian from its basis-state energies.
    pub fn from_diagonal(diagonal: &[f64]) -> SimResult<Self> {
        let dim = diagonal.len();
        state::int_log2(dim)?;
        let mut matrix = Array2::zeros((dim, dim));
        for (i, &value) in diagonal.iter().enumerate() {
            matrix[(i, i)] = Complex64::new(value, 0.0);
        }
        Self::new(matrix)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Externally supplied minimal eigenvalue, if any.
    pub fn min_eigenvalue(&self) -> Option<f64> {
        self.min_eigenvalue
    }

    /// Externally supplied minimal-energy basis state, if any.
    pub fn ground_basis_state(&self) -> Option<u64> {
        self.ground_basis_state
    }

    /// Expectation value ⟨ψ|H|ψ⟩ for a canonically ordered statevector.
    pub fn expectation(&self, statevector: &[Complex64]) -> SimResult<f64> {
        state::expectation(statevector, &self.matrix)
    }

    /// Basis state with the smallest diagonal entry and that entry.
    ///
    /// For diagonal Hamiltonians this is the exact ground state; it is
    /// how search targets are usually derived in tests.
    pub fn min_diagonal_basis_state(&self) -> (u64, f64) {
        let mut best = (0u64, self.matrix[(0, 0)].re);
        for i in 1..self.dim() {
            let value = self.matrix[(i, i)].re;
            if value < best.1 {
                best = (i as u64, value);
            }
        }
        best
    }
}
