//! Statevector helpers shared by the simulation backends.
//!
//! All public functions operate on the canonical little-endian convention:
//! bit `q` of a basis index is the state of qubit `q`.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Number of qubits encoded by a statevector of length `len`.
pub fn int_log2(len: usize) -> SimResult<usize> {
    if len == 0 || !len.is_power_of_two() {
        return Err(SimError::NotPowerOfTwo(len));
    }
    Ok(len.trailing_zeros() as usize)
}

/// The computational basis state |index⟩ over `num_qubits` qubits.
pub fn basis_state(num_qubits: usize, index: u64) -> SimResult<Vec<Complex64>> {
    if num_qubits >= 64 || index >= (1u64 << num_qubits) {
        return Err(SimError::GroundStateOutOfRange {
            state: index,
            num_qubits,
        });
    }
    let mut state = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
    state[index as usize] = Complex64::new(1.0, 0.0);
    Ok(state)
}

/// Index permutation that reverses qubit order over `num_qubits` qubits.
///
/// Entry `i` holds the index whose bits are those of `i` reversed within
/// `num_qubits` positions.
pub fn reverse_qubits_permutation(num_qubits: usize) -> Vec<usize> {
    let len = 1usize << num_qubits;
    (0..len)
        .map(|i| i.reverse_bits() >> (usize::BITS as usize - num_qubits))
        .collect()
}

/// Reorder amplitudes so qubit `q` becomes qubit `num_qubits - 1 - q`.
pub fn reverse_qubits(state: &[Complex64], num_qubits: usize) -> Vec<Complex64> {
    let perm = reverse_qubits_permutation(num_qubits);
    let mut out = vec![Complex64::new(0.0, 0.0); state.len()];
    for (i, &j) in perm.iter().enumerate() {
        out[j] = state[i];
    }
    out
}

/// Expectation value ⟨ψ|M|ψ⟩ of a Hermitian matrix.
///
/// The imaginary part is discarded; for Hermitian `matrix` it is zero up
/// to rounding.
pub fn expectation(state: &[Complex64], matrix: &Array2<Complex64>) -> SimResult<f64> {
    let dim = state.len();
    if matrix.nrows() != dim || matrix.ncols() != dim {
        return Err(SimError::DimensionMismatch {
            expected: dim,
            got: matrix.nrows(),
        });
    }
    let mut acc = Complex64::new(0.0, 0.0);
    for row in 0..dim {
        let mut applied = Complex64::new(0.0, 0.0);
        for col in 0..dim {
            applied += matrix[(row, col)] * state[col];
        }
        acc += state[row].conj() * applied;
    }
    debug_assert!(acc.im.abs() < 1e-9, "non-real expectation: {}", acc.im);
    Ok(acc.re)
}

/// Largest elementwise amplitude deviation between two statevectors.
pub fn max_amplitude_deviation(a: &[Complex64], b: &[Complex64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}
