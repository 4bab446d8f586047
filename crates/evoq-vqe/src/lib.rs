//! Evoq Variational Eigensolver
//!
//! The variational layer of Evoq: given a Hamiltonian and a simulation
//! backend, find a circuit whose output state minimizes the energy. The
//! search runs on two nested levels:
//!
//! - **Inner loop** — [`Vqe`] optimizes a fixed circuit structure's
//!   continuous parameters with an [`Optimizer`]
//! - **Outer loop** — [`OnePlusLambda`] mutates the structure itself,
//!   breeding λ candidates per iteration and evaluating them on a worker
//!   pool
//!
//! Runs are reproducible: all randomness flows from the master seed in
//! [`SearchConfig`], mutation happens sequentially on the coordinator and
//! every candidate gets its own derived generator, so results do not
//! depend on thread scheduling.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use evoq_circuit::Circuit;
//! use evoq_sim::{Hamiltonian, StatevectorBackend};
//! use evoq_vqe::{BfgsOptimizer, OnePlusLambda, SearchConfig, Vqe, mutation};
//!
//! let hamiltonian = Arc::new(Hamiltonian::from_diagonal(&[2.0, 1.0, 1.0, -1.0]).unwrap());
//! let vqe = Vqe::new(
//!     hamiltonian,
//!     Arc::new(StatevectorBackend::new()),
//!     Arc::new(BfgsOptimizer::new()),
//! );
//! let mut config = SearchConfig::new(-1.0, 42);
//! config.eval_budget = Some(5_000);
//! let search = OnePlusLambda::new(vqe, Box::new(mutation::block_mutation()), config).unwrap();
//! let result = search.run(Circuit::new(2, 0b01).unwrap(), None).unwrap();
//! assert!(result.best.value <= 1.0);
//! ```

pub mod error;
pub mod evaluator;
pub mod mutation;
pub mod optimizer;
pub mod report;
pub mod search;

pub use error::{VqeError, VqeResult};
pub use evaluator::{Evaluation, ParameterInit, Vqe};
pub use mutation::{InsertGate, Mutation, RemoveGate, Weighted};
pub use optimizer::{BfgsOptimizer, EvolutionOptimizer, OptimizationOutcome, Optimizer};
pub use report::{CandidateReport, EvolutionReport, IterationReport};
pub use search::{OnePlusLambda, SearchConfig, SearchResult};
