//! Mask-kernel statevector backend.
//!
//! This is the hot path of the evaluator: every gate is applied in place
//! with bit-mask pair updates, never materializing a gate matrix.
//! Composite gates run through their elementary decomposition.

use num_complex::Complex64;
use tracing::trace;

use evoq_circuit::{Circuit, ElementaryGate, GateInstance};

use crate::backend::SimulationBackend;
use crate::error::SimResult;
use crate::state;

/// In-place statevector simulator over the canonical little-endian order.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatevectorBackend;

impl StatevectorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SimulationBackend for StatevectorBackend {
    fn statevector(&self, circuit: &Circuit) -> SimResult<Vec<Complex64>> {
        trace!(
            num_qubits = circuit.num_qubits(),
            gates = circuit.len(),
            "applying mask kernels"
        );
        let mut state = State {
            amplitudes: state::basis_state(circuit.num_qubits(), circuit.initial_state())?,
            num_qubits: circuit.num_qubits(),
        };
        for gate in circuit.gates() {
            state.apply(gate);
        }
        Ok(state.amplitudes)
    }
}

struct State {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl State {
    /// Apply a gate instance via its elementary decomposition.
    fn apply(&mut self, gate: &GateInstance) {
        let expanded = gate.gate_type().expand_params(gate.params());
        let mut cursor = 0;
        for placement in gate.gate_type().decomposition() {
            let params = &expanded[cursor..cursor + placement.gate.num_params()];
            cursor += placement.gate.num_params();
            // Placement qubits are slots into the instance's qubit list.
            let global: Vec<usize> = placement.qubits.iter().map(|&q| gate.qubits()[q]).collect();
            self.apply_elementary(placement.gate, &global, params);
        }
    }

    fn apply_elementary(&mut self, gate: ElementaryGate, qubits: &[usize], params: &[f64]) {
        match gate {
            ElementaryGate::Rx => self.apply_rx(qubits[0], params[0]),
            ElementaryGate::Ry => self.apply_ry(qubits[0], params[0]),
            ElementaryGate::Rz => self.apply_phase(qubits[0], params[0]),
            ElementaryGate::CNot => self.apply_cnot(qubits[0], qubits[1]),
            ElementaryGate::SqrtSwap => self.apply_sqrtswap(qubits[0], qubits[1]),
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    /// `rz` is the phase gate diag(1, e^{iθ}).
    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..(1 << self.num_qubits) {
            if i & mask != 0 {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_cnot(&mut self, control: usize, target: usize) {
        let control_mask = 1 << control;
        let target_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if i & control_mask != 0 && i & target_mask == 0 {
                let j = i | target_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_sqrtswap(&mut self, a: usize, b: usize) {
        let mask_a = 1 << a;
        let mask_b = 1 << b;
        let p = Complex64::new(0.5, 0.5);
        let q = Complex64::new(0.5, -0.5);
        for i in 0..(1 << self.num_qubits) {
            // Visit the |a=0, b=1⟩ member of each mixed pair once.
            if i & mask_a == 0 && i & mask_b != 0 {
                let j = (i | mask_a) & !mask_b;
                let x = self.amplitudes[i];
                let y = self.amplitudes[j];
                self.amplitudes[i] = p * x + q * y;
                self.amplitudes[j] = q * x + p * y;
            }
        }
    }
}
