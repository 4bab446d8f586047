//! Evoq Circuit Data Model
//!
//! This crate provides the gate catalog and circuit representation used by the
//! Evoq variational search stack. Circuits are flat, ordered gate lists over a
//! fixed qubit register with a computational-basis preparation state.
//!
//! # Overview
//!
//! Gate *types* are immutable descriptors living in a process-wide registry;
//! gate *instances* bind a type to concrete qubits and parameter values. Every
//! composite type carries a decomposition into elementary gates with a
//! deterministic parameter expansion, so any consumer that understands the
//! five elementary gates can execute any circuit.
//!
//! # Core Components
//!
//! - **Gate catalog**: [`GateType`], [`ElementaryGate`], the [`registry`] and
//!   the [`types`] accessors
//! - **Instances**: [`GateInstance`] binding a type to qubits and parameters
//! - **Circuits**: [`Circuit`] with insertion, removal and flat parameter
//!   access for optimizers
//! - **Serialization**: [`to_text`] / [`from_text`] for the line-oriented
//!   circuit format
//!
//! # Bit ordering
//!
//! Basis states are little-endian: bit `q` of a basis index is the state of
//! qubit `q`, so `prepare 01` on two qubits places qubit 0 in |1⟩. The
//! textual `prepare` bitstring is written most-significant bit first, which
//! makes the string read qubit `n-1` down to qubit 0.
//!
//! # Example
//!
//! ```rust
//! use evoq_circuit::{Circuit, GateInstance, types};
//!
//! let mut circuit = Circuit::new(2, 0b01).unwrap();
//! let rx = GateInstance::with_params(types::rx(), vec![0], vec![1.5707963]).unwrap();
//! circuit.insert(0, rx).unwrap();
//! assert_eq!(circuit.num_parameters(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instance;
pub mod serializer;

pub use circuit::Circuit;
pub use error::{CircuitError, CircuitResult};
pub use gate::{
    CompositeSpec, ElementaryGate, GateType, ParamExpansion, Placement, embed_unitary, registry,
    types,
};
pub use instance::GateInstance;
pub use serializer::{from_text, to_text};
