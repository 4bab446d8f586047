//! Evoq Simulation Backends
//!
//! Statevector simulation of Evoq circuits and Hamiltonian expectation
//! values. The crate defines a single [`SimulationBackend`] trait and three
//! interchangeable implementations that agree on every amplitude:
//!
//! - [`StatevectorBackend`] — in-place bit-mask kernels, the hot path used
//!   by the search loop
//! - [`DenseBackend`] — per-gate dense matrix-vector products
//! - [`UnitaryBackend`] — a single accumulated circuit unitary
//!
//! # Conventions
//!
//! Statevectors are canonical little-endian: entry `k` is the amplitude of
//! the basis state whose bit `q` is the state of qubit `q`, and a circuit's
//! prepared integer is exactly the index of the initial unit amplitude.
//! [`Hamiltonian`] matrices index the same basis.
//!
//! # Example
//!
//! ```rust
//! use evoq_circuit::from_text;
//! use evoq_sim::{Hamiltonian, SimulationBackend, StatevectorBackend};
//!
//! let circuit = from_text("qubits 2\nprepare 01\ngate cnot [0, 1] []\n").unwrap();
//! let h = Hamiltonian::from_diagonal(&[2.0, 1.0, 1.0, -1.0]).unwrap();
//! let energy = StatevectorBackend::new().expectation(&circuit, &h).unwrap();
//! assert!((energy - (-1.0)).abs() < 1e-12);
//! ```

pub mod backend;
pub mod dense;
pub mod error;
pub mod hamiltonian;
pub mod state;
pub mod statevector;

pub use backend::SimulationBackend;
pub use dense::{DenseBackend, UnitaryBackend};
pub use error::{SimError, SimResult};
pub use hamiltonian::Hamiltonian;
pub use statevector::StatevectorBackend;
