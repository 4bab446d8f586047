//! Error types for the circuit crate.

use thiserror::Error;

/// Errors that can occur while constructing or editing circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// No gate type registered under this name.
    #[error("Unknown gate type '{0}'")]
    UnknownGateType(String),

    /// The same qubit appears twice in a gate's target list.
    #[error("Duplicate qubit {qubit} in targets of gate '{gate_name}'")]
    DuplicateQubit {
        /// Name of the gate.
        gate_name: String,
        /// The repeated qubit index.
        qubit: usize,
    },

    /// Gate requires a different number of target qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Gate requires a different number of parameters.
    #[error("Gate '{gate_name}' requires {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Gate targets a qubit outside the circuit.
    #[error("Gate '{gate_name}' targets qubit {qubit} but circuit has {num_qubits} qubits")]
    QubitOutOfRange {
        /// Name of the gate.
        gate_name: String,
        /// The offending qubit index.
        qubit: usize,
        /// Number of qubits in the circuit.
        num_qubits: usize,
    },

    /// Insertion or removal index outside the valid range.
    #[error("Index {index} out of range for circuit of {len} gates")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Current number of gates.
        len: usize,
    },

    /// Bulk parameter vector has the wrong length.
    #[error("Bad parameters length: {expected} expected, {got} actual")]
    ParameterLengthMismatch {
        /// Total parameter count of the circuit.
        expected: usize,
        /// Length of the supplied vector.
        got: usize,
    },

    /// Initial basis state does not fit in the qubit count.
    #[error("Initial state {state} does not fit in {num_qubits} qubits")]
    InitialStateOutOfRange {
        /// The offending basis-state integer.
        state: u64,
        /// Number of qubits in the circuit.
        num_qubits: usize,
    },

    /// Malformed serialized circuit text.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending line.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A required statement never appeared in the serialized text.
    #[error("Missing '{0}' statement")]
    MissingStatement(&'static str),
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
