//! Variational evaluation of a single candidate circuit.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use rand::{Rng, RngCore};
use tracing::warn;

use evoq_circuit::Circuit;
use evoq_sim::{Hamiltonian, SimulationBackend};

use crate::optimizer::Optimizer;

/// How a candidate's starting parameters are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterInit {
    /// Uniform over each parameter's bound interval.
    #[default]
    UniformBounds,
    /// Per-gate reset, honoring structured resets of composite types.
    TypeReset,
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The circuit with its optimized parameters written back.
    pub circuit: Circuit,
    /// Minimized energy ⟨ψ|H|ψ⟩.
    pub value: f64,
    /// Optimized flat parameter vector.
    pub parameters: Vec<f64>,
    /// Objective evaluations spent, including the initial probe.
    pub num_evaluations: u64,
    pub elapsed: Duration,
}

/// The inner variational loop: energy of a circuit structure under a
/// Hamiltonian, minimized over its continuous parameters.
///
/// Evaluation never fails: simulation errors poison the objective with
/// `f64::INFINITY` so the surrounding search simply discards the
/// candidate.
#[derive(Clone)]
pub struct Vqe {
    hamiltonian: Arc<Hamiltonian>,
    backend: Arc<dyn SimulationBackend>,
    optimizer: Arc<dyn Optimizer>,
    init: ParameterInit,
}

impl Vqe {
    pub fn new(
        hamiltonian: Arc<Hamiltonian>,
        backend: Arc<dyn SimulationBackend>,
        optimizer: Arc<dyn Optimizer>,
    ) -> Self {
        Self {
            hamiltonian,
            backend,
            optimizer,
            init: ParameterInit::default(),
        }
    }

    pub fn with_parameter_init(mut self, init: ParameterInit) -> Self {
        self.init = init;
        self
    }

    pub fn hamiltonian(&self) -> &Arc<Hamiltonian> {
        &self.hamiltonian
    }

    /// Evaluate one candidate, consuming it and returning it with its
    /// optimized parameters.
    pub fn evaluate(
        &self,
        mut circuit: Circuit,
        rng: &mut dyn RngCore,
        interrupt: Option<&AtomicBool>,
    ) -> Evaluation {
        let started = Instant::now();

        // Parameter-free structures need exactly one simulation.
        if circuit.num_parameters() == 0 {
            let value = self.energy(&circuit);
            return Evaluation {
                value,
                parameters: Vec::new(),
                num_evaluations: 1,
                elapsed: started.elapsed(),
                circuit,
            };
        }

        let bounds = circuit.parameter_bounds();
        let x0 = match self.init {
            ParameterInit::UniformBounds => bounds
                .iter()
                .map(|&(low, high)| rng.gen_range(low..high))
                .collect::<Vec<f64>>(),
            ParameterInit::TypeReset => {
                circuit.reset_parameters(rng);
                circuit.parameters()
            }
        };

        let mut evals: u64 = 0;
        let mut scratch = circuit.clone();
        let backend = &self.backend;
        let hamiltonian = &self.hamiltonian;
        let mut objective = |x: &[f64]| {
            evals += 1;
            match scratch
                .set_parameters(x)
                .map_err(evoq_sim::SimError::from)
                .and_then(|()| backend.expectation(&scratch, hamiltonian))
            {
                Ok(value) => value,
                Err(error) => {
                    warn!(%error, "objective evaluation failed, poisoning candidate");
                    f64::INFINITY
                }
            }
        };

        let outcome = self
            .optimizer
            .optimize(&mut objective, &x0, &bounds, rng, interrupt);
        if let Some(diagnostic) = &outcome.diagnostic {
            warn!(
                %diagnostic,
                gates = circuit.len(),
                "optimizer ended abnormally"
            );
        }

        if let Err(error) = circuit.set_parameters(&outcome.x_opt) {
            // The optimizer returns vectors of the input length, so this
            // only trips on a broken Optimizer implementation.
            warn!(%error, "optimizer returned malformed parameters");
            return Evaluation {
                value: f64::INFINITY,
                parameters: Vec::new(),
                num_evaluations: evals,
                elapsed: started.elapsed(),
                circuit,
            };
        }

        Evaluation {
            value: outcome.f_opt,
            parameters: outcome.x_opt,
            num_evaluations: evals,
            elapsed: started.elapsed(),
            circuit,
        }
    }

    fn energy(&self, circuit: &Circuit) -> f64 {
        match self.backend.expectation(circuit, &self.hamiltonian) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "simulation failed, poisoning candidate");
                f64::INFINITY
            }
        }
    }
}
