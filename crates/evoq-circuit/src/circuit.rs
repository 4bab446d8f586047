//! Circuit container.

use std::sync::Arc;

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::error::{CircuitError, CircuitResult};
use crate::gate::{GateType, types};
use crate::instance::GateInstance;

/// An ordered gate sequence over a fixed qubit count and initial basis
/// state.
///
/// Gates apply sequentially, first to last. The initial state is a
/// computational-basis integer; bit `q` set means qubit `q` starts in |1⟩.
#[derive(Debug, Clone)]
pub struct Circuit {
    num_qubits: usize,
    initial_state: u64,
    gates: Vec<GateInstance>,
}

impl Circuit {
    /// Create an empty circuit.
    ///
    /// Fails if the initial state does not fit in `num_qubits` bits.
    pub fn new(num_qubits: usize, initial_state: u64) -> CircuitResult<Self> {
        if num_qubits == 0 || num_qubits < 64 && initial_state >= (1u64 << num_qubits) {
            return Err(CircuitError::InitialStateOutOfRange {
                state: initial_state,
                num_qubits,
            });
        }
        Ok(Self {
            num_qubits,
            initial_state,
            gates: Vec::new(),
        })
    }

    /// Create a pre-populated circuit.
    pub fn with_gates(
        num_qubits: usize,
        initial_state: u64,
        gates: Vec<GateInstance>,
    ) -> CircuitResult<Self> {
        let mut circuit = Self::new(num_qubits, initial_state)?;
        for gate in gates {
            let index = circuit.len();
            circuit.insert(index, gate)?;
        }
        Ok(circuit)
    }

    /// Get the qubit count.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the initial computational-basis state.
    #[inline]
    pub fn initial_state(&self) -> u64 {
        self.initial_state
    }

    /// Get the number of gates.
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True if the circuit has no gates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Get the gate sequence.
    #[inline]
    pub fn gates(&self) -> &[GateInstance] {
        &self.gates
    }

    /// Insert a gate at `index` (valid range `0..=len`).
    pub fn insert(&mut self, index: usize, gate: GateInstance) -> CircuitResult<()> {
        if index > self.gates.len() {
            return Err(CircuitError::IndexOutOfRange {
                index,
                len: self.gates.len(),
            });
        }
        if let Some(&q) = gate.qubits().iter().find(|&&q| q >= self.num_qubits) {
            return Err(CircuitError::QubitOutOfRange {
                gate_name: gate.gate_type().name().to_string(),
                qubit: q,
                num_qubits: self.num_qubits,
            });
        }
        self.gates.insert(index, gate);
        Ok(())
    }

    /// Remove and return the gate at `index` (valid range `0..len`).
    pub fn remove_at(&mut self, index: usize) -> CircuitResult<GateInstance> {
        if index >= self.gates.len() {
            return Err(CircuitError::IndexOutOfRange {
                index,
                len: self.gates.len(),
            });
        }
        Ok(self.gates.remove(index))
    }

    /// Total parameter count over all gates.
    pub fn num_parameters(&self) -> usize {
        self.gates.iter().map(GateInstance::num_params).sum()
    }

    /// Concatenated parameter vector, in gate order.
    pub fn parameters(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.num_parameters());
        for gate in &self.gates {
            out.extend_from_slice(gate.params());
        }
        out
    }

    /// Distribute a flat parameter vector to the gates in order.
    pub fn set_parameters(&mut self, params: &[f64]) -> CircuitResult<()> {
        let expected = self.num_parameters();
        if params.len() != expected {
            return Err(CircuitError::ParameterLengthMismatch {
                expected,
                got: params.len(),
            });
        }
        let mut offset = 0;
        for gate in &mut self.gates {
            let n = gate.num_params();
            gate.set_params(&params[offset..offset + n])?;
            offset += n;
        }
        Ok(())
    }

    /// Concatenated `[low, high]` ranges, matching
    /// [`parameters`](Self::parameters) order.
    pub fn parameter_bounds(&self) -> Vec<(f64, f64)> {
        let mut bounds = Vec::with_capacity(self.num_parameters());
        for gate in &self.gates {
            bounds.extend(gate.gate_type().param_ranges());
        }
        bounds
    }

    /// Redraw every gate's parameters via its type-specific reset policy.
    pub fn reset_parameters(&mut self, rng: &mut dyn RngCore) {
        for gate in &mut self.gates {
            gate.reset_params(rng);
        }
    }

    /// Append two brick-wall layers of a 2-qubit block over adjacent
    /// qubit pairs: (0,1), (2,3), ... then (1,2), (3,4), ...
    pub fn append_block_layers(&mut self, block: &Arc<GateType>) -> CircuitResult<()> {
        for start in [0usize, 1] {
            for i in (start..self.num_qubits.saturating_sub(1)).step_by(2) {
                let gate = GateInstance::new(block.clone(), vec![i, i + 1])?;
                let index = self.len();
                self.insert(index, gate)?;
            }
        }
        Ok(())
    }

    /// Hardware-efficient ansatz: a leading rx·rz layer, then `depth`
    /// repetitions of a CNOT entangler wall followed by rz·rx·rz rotations
    /// on every qubit. Control/target order within each CNOT pair is
    /// shuffled from the supplied random source.
    pub fn hardware_efficient(
        num_qubits: usize,
        initial_state: u64,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> CircuitResult<Self> {
        let mut circuit = Self::new(num_qubits, initial_state)?;
        circuit.append_rotation_layer(false)?;
        for _ in 0..depth {
            circuit.append_entangler_wall(rng)?;
            circuit.append_rotation_layer(true)?;
        }
        Ok(circuit)
    }

    fn append_rotation_layer(&mut self, full: bool) -> CircuitResult<()> {
        for q in 0..self.num_qubits {
            if full {
                self.push(GateInstance::new(types::rz(), vec![q])?)?;
            }
            self.push(GateInstance::new(types::rx(), vec![q])?)?;
            self.push(GateInstance::new(types::rz(), vec![q])?)?;
        }
        Ok(())
    }

    fn append_entangler_wall(&mut self, rng: &mut dyn RngCore) -> CircuitResult<()> {
        for start in [1usize, 2] {
            for i in (start..self.num_qubits).step_by(2) {
                let mut pair = [i - 1, i];
                pair.shuffle(rng);
                self.push(GateInstance::new(types::cnot(), pair.to_vec())?)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, gate: GateInstance) -> CircuitResult<()> {
        let index = self.len();
        self.insert(index, gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_circuit() -> Circuit {
        let mut c = Circuit::new(3, 0b101).unwrap();
        c.push(GateInstance::with_params(types::rx(), vec![0], vec![0.3]).unwrap())
            .unwrap();
        c.push(GateInstance::new(types::cnot(), vec![0, 2]).unwrap())
            .unwrap();
        c.push(GateInstance::with_params(types::rz(), vec![1], vec![1.1]).unwrap())
            .unwrap();
        c
    }

    #[test]
    fn test_initial_state_must_fit() {
        assert!(Circuit::new(2, 3).is_ok());
        let err = Circuit::new(2, 4).unwrap_err();
        assert!(matches!(err, CircuitError::InitialStateOutOfRange { .. }));
    }

    #[test]
    fn test_insert_bounds() {
        let mut c = sample_circuit();
        let g = GateInstance::new(types::rx(), vec![0]).unwrap();
        let err = c.insert(4, g).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::IndexOutOfRange { index: 4, len: 3 }
        ));
    }

    #[test]
    fn test_insert_rejects_out_of_range_qubit() {
        let mut c = sample_circuit();
        let g = GateInstance::new(types::rx(), vec![3]).unwrap();
        let err = c.insert(0, g).unwrap_err();
        assert!(matches!(err, CircuitError::QubitOutOfRange { qubit: 3, .. }));
    }

    #[test]
    fn test_remove_bounds() {
        let mut c = sample_circuit();
        assert!(c.remove_at(3).is_err());
        let removed = c.remove_at(1).unwrap();
        assert_eq!(removed.gate_type().name(), "cnot");
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_parameter_roundtrip() {
        let mut c = sample_circuit();
        assert_eq!(c.num_parameters(), 2);
        let params = c.parameters();
        assert_eq!(params, vec![0.3, 1.1]);
        c.set_parameters(&params).unwrap();
        assert_eq!(c.parameters(), params);
    }

    #[test]
    fn test_set_parameters_length_checked() {
        let mut c = sample_circuit();
        let err = c.set_parameters(&[0.1]).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::ParameterLengthMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_parameter_bounds_concatenation() {
        let c = sample_circuit();
        let bounds = c.parameter_bounds();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0], (0.0, std::f64::consts::PI)); // rx
        assert_eq!(bounds[1], (0.0, std::f64::consts::PI)); // rz
    }

    #[test]
    fn test_clone_independence() {
        let original = sample_circuit();
        let mut clone = original.clone();
        clone.remove_at(0).unwrap();
        clone.set_parameters(&[9.9]).unwrap();
        assert_eq!(original.len(), 3);
        assert_eq!(original.parameters(), vec![0.3, 1.1]);
    }

    #[test]
    fn test_block_layers_brick_wall() {
        let mut c = Circuit::new(4, 0).unwrap();
        c.append_block_layers(&types::block_cnot()).unwrap();
        let targets: Vec<_> = c.gates().iter().map(|g| g.qubits().to_vec()).collect();
        assert_eq!(targets, vec![vec![0, 1], vec![2, 3], vec![1, 2]]);
        assert_eq!(c.num_parameters(), 24);
    }

    #[test]
    fn test_hardware_efficient_layout() {
        let mut rng = StdRng::seed_from_u64(3);
        let c = Circuit::hardware_efficient(4, 0b0011, 2, &mut rng).unwrap();
        // Leading layer: 2 rotations per qubit; each repetition: 3 CNOTs
        // plus 3 rotations per qubit.
        assert_eq!(c.len(), 8 + 2 * (3 + 12));
        assert!(c.gates().iter().all(|g| g.qubits().len() <= 2));
    }

    proptest! {
        #[test]
        fn prop_set_get_parameters_identity(values in proptest::collection::vec(-3.0f64..3.0, 2)) {
            let mut c = sample_circuit();
            c.set_parameters(&values).unwrap();
            prop_assert_eq!(c.parameters(), values);
        }

        #[test]
        fn prop_clone_survives_mutation(values in proptest::collection::vec(-3.0f64..3.0, 2)) {
            let mut original = sample_circuit();
            original.set_parameters(&values).unwrap();
            let mut clone = original.clone();
            clone.set_parameters(&[0.0, 0.0]).unwrap();
            clone.remove_at(1).unwrap();
            prop_assert_eq!(original.parameters(), values);
            prop_assert_eq!(original.len(), 3);
        }
    }
}
