//! Dense-matrix reference backends.
//!
//! These trade speed for transparency: every gate becomes an explicit
//! 2^n × 2^n matrix via [`embed_unitary`], so the arithmetic is easy to
//! audit against the gate definitions. They exist to cross-check the
//! mask-kernel backend, not to run searches.
//!
//! The tensor workspace is big-endian (qubit 0 is the most significant
//! index bit); results are bit-reversed back to the canonical
//! little-endian order before returning.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use evoq_circuit::{Circuit, embed_unitary};

use crate::backend::SimulationBackend;
use crate::error::SimResult;
use crate::state;

/// Per-gate matrix-vector reference backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenseBackend;

impl DenseBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SimulationBackend for DenseBackend {
    fn statevector(&self, circuit: &Circuit) -> SimResult<Vec<Complex64>> {
        let mut psi = initial_vector(circuit)?;
        for gate in circuit.gates() {
            let block = gate.gate_type().unitary(gate.params())?;
            let full = embed_unitary(&block, gate.qubits(), circuit.num_qubits());
            psi = full.dot(&psi);
        }
        Ok(to_canonical(psi, circuit.num_qubits()))
    }
}

/// Whole-circuit matrix-product reference backend.
///
/// Accumulates one unitary for the full circuit before applying it, which
/// is the slowest but most literal reading of the gate sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitaryBackend;

impl UnitaryBackend {
    pub fn new() -> Self {
        Self
    }

    /// The full circuit unitary in the big-endian tensor order.
    pub fn circuit_unitary(&self, circuit: &Circuit) -> SimResult<Array2<Complex64>> {
        let dim = 1usize << circuit.num_qubits();
        let mut total = Array2::eye(dim);
        for gate in circuit.gates() {
            let block = gate.gate_type().unitary(gate.params())?;
            let full = embed_unitary(&block, gate.qubits(), circuit.num_qubits());
            total = full.dot(&total);
        }
        Ok(total)
    }
}

impl SimulationBackend for UnitaryBackend {
    fn statevector(&self, circuit: &Circuit) -> SimResult<Vec<Complex64>> {
        let total = self.circuit_unitary(circuit)?;
        let psi = total.dot(&initial_vector(circuit)?);
        Ok(to_canonical(psi, circuit.num_qubits()))
    }
}

/// Prepared basis state in the big-endian tensor order.
fn initial_vector(circuit: &Circuit) -> SimResult<Array1<Complex64>> {
    let n = circuit.num_qubits();
    let perm = state::reverse_qubits_permutation(n);
    let index = perm[circuit.initial_state() as usize];
    let mut psi = Array1::zeros(1 << n);
    psi[index] = Complex64::new(1.0, 0.0);
    Ok(psi)
}

fn to_canonical(psi: Array1<Complex64>, num_qubits: usize) -> Vec<Complex64> {
    state::reverse_qubits(&psi.to_vec(), num_qubits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statevector::StatevectorBackend;
    use approx::assert_abs_diff_eq;
    use evoq_circuit::{GateInstance, types};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn agreement(circuit: &Circuit) -> f64 {
        let fast = StatevectorBackend::new().statevector(circuit).unwrap();
        let dense = DenseBackend::new().statevector(circuit).unwrap();
        let unitary = UnitaryBackend::new().statevector(circuit).unwrap();
        state::max_amplitude_deviation(&fast, &dense)
            .max(state::max_amplitude_deviation(&fast, &unitary))
    }

    #[test]
    fn test_prepared_state_matches() {
        let circuit = Circuit::new(3, 0b011).unwrap();
        let dense = DenseBackend::new().statevector(&circuit).unwrap();
        assert_abs_diff_eq!(dense[0b011].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_scenario_matches_fast_backend() {
        let cnot = GateInstance::with_params(types::cnot(), vec![0, 1], vec![]).unwrap();
        let circuit = Circuit::with_gates(2, 0b01, vec![cnot]).unwrap();
        let dense = DenseBackend::new().statevector(&circuit).unwrap();
        assert_abs_diff_eq!(dense[0b11].norm(), 1.0, epsilon = 1e-12);
        assert!(agreement(&circuit) < 1e-12);
    }

    #[test]
    fn test_backends_agree_on_random_elementary_circuits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let n = 3;
            let mut gates = Vec::new();
            for _ in 0..6 {
                let q = rng.gen_range(0..n);
                let other = (q + 1 + rng.gen_range(0..n - 1)) % n;
                let gate = match rng.gen_range(0..5) {
                    0 => GateInstance::with_params(
                        types::rx(),
                        vec![q],
                        vec![rng.gen_range(0.01..3.0)],
                    ),
                    1 => GateInstance::with_params(
                        types::ry(),
                        vec![q],
                        vec![rng.gen_range(-3.0..3.0)],
                    ),
                    2 => GateInstance::with_params(
                        types::rz(),
                        vec![q],
                        vec![rng.gen_range(-3.0..3.0)],
                    ),
                    3 => GateInstance::with_params(types::cnot(), vec![q, other], vec![]),
                    _ => GateInstance::with_params(types::sqrtswap(), vec![q, other], vec![]),
                }
                .unwrap();
                gates.push(gate);
            }
            let circuit = Circuit::with_gates(n, rng.gen_range(0..8), gates).unwrap();
            assert!(agreement(&circuit) < 1e-6);
        }
    }

    #[test]
    fn test_backends_agree_on_composites() {
        let mut rng = StdRng::seed_from_u64(11);
        for name in ["block-cnot", "block-sqrtswap", "block-a"] {
            let gate_type = evoq_circuit::GateType::by_name(name).unwrap();
            let params: Vec<f64> = (0..gate_type.num_params())
                .map(|_| rng.gen_range(-1.5..1.5))
                .collect();
            let gate = GateInstance::with_params(gate_type, vec![2, 0], params).unwrap();
            let circuit = Circuit::with_gates(3, 0b010, vec![gate]).unwrap();
            assert!(agreement(&circuit) < 1e-6, "{name} disagrees");
        }
    }

    #[test]
    fn test_circuit_unitary_is_unitary() {
        let rx = GateInstance::with_params(types::rx(), vec![0], vec![0.9]).unwrap();
        let cnot = GateInstance::with_params(types::cnot(), vec![0, 1], vec![]).unwrap();
        let circuit = Circuit::with_gates(2, 0, vec![rx, cnot]).unwrap();
        let u = UnitaryBackend::new().circuit_unitary(&circuit).unwrap();
        let adjoint = u.t().mapv(|z| z.conj());
        let product = adjoint.dot(&u);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(product[(i, j)].re, expected, epsilon = 1e-10);
                assert_abs_diff_eq!(product[(i, j)].im, 0.0, epsilon = 1e-10);
            }
        }
    }
}
