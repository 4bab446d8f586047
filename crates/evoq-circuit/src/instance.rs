//! Placed gates.

use std::sync::Arc;

use rand::RngCore;

use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateType;

/// A gate placed on concrete qubits with concrete parameter values.
///
/// The gate type is shared, the target qubits are fixed at construction,
/// and only the parameter vector is mutable afterwards.
#[derive(Debug, Clone)]
pub struct GateInstance {
    gate_type: Arc<GateType>,
    qubits: Vec<usize>,
    params: Vec<f64>,
}

impl GateInstance {
    /// Place a gate with zeroed parameters.
    ///
    /// Fails if the qubit list has the wrong length or repeats a qubit.
    pub fn new(gate_type: Arc<GateType>, qubits: Vec<usize>) -> CircuitResult<Self> {
        let params = vec![0.0; gate_type.num_params()];
        Self::with_params(gate_type, qubits, params)
    }

    /// Place a gate with explicit parameter values.
    pub fn with_params(
        gate_type: Arc<GateType>,
        qubits: Vec<usize>,
        params: Vec<f64>,
    ) -> CircuitResult<Self> {
        if qubits.len() != gate_type.num_qubits() {
            return Err(CircuitError::QubitCountMismatch {
                gate_name: gate_type.name().to_string(),
                expected: gate_type.num_qubits(),
                got: qubits.len(),
            });
        }
        for (i, &q) in qubits.iter().enumerate() {
            if qubits[..i].contains(&q) {
                return Err(CircuitError::DuplicateQubit {
                    gate_name: gate_type.name().to_string(),
                    qubit: q,
                });
            }
        }
        if params.len() != gate_type.num_params() {
            return Err(CircuitError::ParameterCountMismatch {
                gate_name: gate_type.name().to_string(),
                expected: gate_type.num_params(),
                got: params.len(),
            });
        }
        Ok(Self {
            gate_type,
            qubits,
            params,
        })
    }

    /// Get the gate type.
    #[inline]
    pub fn gate_type(&self) -> &Arc<GateType> {
        &self.gate_type
    }

    /// Get the target qubits.
    #[inline]
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// Get the parameter values.
    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Get the number of parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// Overwrite the parameter values.
    pub fn set_params(&mut self, params: &[f64]) -> CircuitResult<()> {
        if params.len() != self.params.len() {
            return Err(CircuitError::ParameterCountMismatch {
                gate_name: self.gate_type.name().to_string(),
                expected: self.params.len(),
                got: params.len(),
            });
        }
        self.params.copy_from_slice(params);
        Ok(())
    }

    /// Draw fresh parameters via the type's reset policy.
    pub fn reset_params(&mut self, rng: &mut dyn RngCore) {
        self.params = self.gate_type.reset_params(rng);
    }
}
