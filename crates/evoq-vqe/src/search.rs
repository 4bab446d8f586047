//! 1+λ evolutionary circuit search.
//!
//! The coordinator keeps a single incumbent circuit. Each iteration it
//! breeds λ mutated candidates, evaluates them in parallel and replaces
//! the incumbent when a candidate is strictly better. Mutation stays on
//! the coordinator thread with the master generator, so a run is a pure
//! function of its seed regardless of worker count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use evoq_circuit::{Circuit, to_text};

use crate::error::{VqeError, VqeResult};
use crate::evaluator::{Evaluation, Vqe};
use crate::mutation::Mutation;
use crate::report::{CandidateReport, EvolutionReport, IterationReport};

/// Knobs of the evolutionary loop.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Energy at which the search is declared successful.
    pub target: f64,
    /// Acceptance slack above the target.
    pub target_eps: f64,
    /// Candidates bred per iteration.
    pub lambda: usize,
    /// Iterations without improvement before mutation escalates.
    pub stagnation_threshold: u32,
    /// Total objective-evaluation budget across all candidates.
    pub eval_budget: Option<u64>,
    /// Master seed; fixes the whole run.
    pub seed: u64,
    /// Worker threads for candidate evaluation; `None` uses all cores.
    pub num_threads: Option<usize>,
}

impl SearchConfig {
    pub fn new(target: f64, seed: u64) -> Self {
        Self {
            target,
            target_eps: 0.0016,
            lambda: 8,
            stagnation_threshold: 4,
            eval_budget: None,
            seed,
            num_threads: None,
        }
    }
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best: Evaluation,
    pub report: EvolutionReport,
}

/// The outer structural search.
pub struct OnePlusLambda {
    vqe: Vqe,
    mutation: Box<dyn Mutation>,
    config: SearchConfig,
    pool: rayon::ThreadPool,
}

impl OnePlusLambda {
    pub fn new(
        vqe: Vqe,
        mutation: Box<dyn Mutation>,
        config: SearchConfig,
    ) -> VqeResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads.unwrap_or(0))
            .build()
            .map_err(|e| VqeError::WorkerPool(e.to_string()))?;
        Ok(Self {
            vqe,
            mutation,
            config,
            pool,
        })
    }

    /// Run from `seed_circuit` until the target, the budget or an
    /// interrupt stops the search.
    pub fn run(
        &self,
        seed_circuit: Circuit,
        interrupt: Option<&AtomicBool>,
    ) -> VqeResult<SearchResult> {
        self.run_observed(seed_circuit, interrupt, |_| {})
    }

    /// Like [`run`](Self::run), invoking `observer` after every
    /// iteration with its report.
    pub fn run_observed(
        &self,
        seed_circuit: Circuit,
        interrupt: Option<&AtomicBool>,
        mut observer: impl FnMut(&IterationReport),
    ) -> VqeResult<SearchResult> {
        let hamiltonian_qubits = self.vqe.hamiltonian().num_qubits();
        if hamiltonian_qubits != seed_circuit.num_qubits() {
            return Err(VqeError::QubitMismatch {
                hamiltonian: hamiltonian_qubits,
                circuit: seed_circuit.num_qubits(),
            });
        }

        let started_at = Utc::now();
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut best = self.vqe.evaluate(seed_circuit, &mut rng, interrupt);
        let mut total_evaluations = best.num_evaluations;
        let mut stagnation: u32 = 0;
        let mut history = Vec::new();
        let mut interrupted = false;
        let threshold = self.config.target + self.config.target_eps;
        info!(
            seed = self.config.seed,
            lambda = self.config.lambda,
            target = self.config.target,
            initial_value = best.value,
            "search started"
        );

        while best.value > threshold {
            if interrupt.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                interrupted = true;
                break;
            }
            if self
                .config
                .eval_budget
                .is_some_and(|budget| total_evaluations >= budget)
            {
                info!(total_evaluations, "evaluation budget exhausted");
                break;
            }

            let iteration_start = Instant::now();
            // Stagnation escalates structural change: extra mutation
            // rounds grow with the square root of the dry spell.
            let rounds = 1 + if stagnation >= self.config.stagnation_threshold {
                (stagnation as f64).sqrt() as usize
            } else {
                0
            };

            // Breed sequentially on the master generator, then draw one
            // child seed per candidate so workers stay deterministic.
            let candidates: Vec<(Circuit, u64)> = (0..self.config.lambda)
                .map(|_| {
                    let mut child = best.circuit.clone();
                    for _ in 0..rounds {
                        self.mutation.apply(&mut child, &mut rng);
                    }
                    (child, rng.next_u64())
                })
                .collect();

            let evaluations: Vec<Evaluation> = self.pool.install(|| {
                candidates
                    .into_par_iter()
                    .map(|(circuit, child_seed)| {
                        let mut child_rng = StdRng::seed_from_u64(child_seed);
                        self.vqe.evaluate(circuit, &mut child_rng, interrupt)
                    })
                    .collect()
            });
            total_evaluations += evaluations.iter().map(|e| e.num_evaluations).sum::<u64>();

            let report_candidates: Vec<CandidateReport> = evaluations
                .iter()
                .map(|e| CandidateReport {
                    value: e.value,
                    num_evaluations: e.num_evaluations,
                    circuit: to_text(&e.circuit),
                })
                .collect();

            let mut improved = false;
            if let Some(winner) = evaluations
                .into_iter()
                .min_by(|a, b| a.value.total_cmp(&b.value))
                .filter(|w| w.value < best.value)
            {
                improved = true;
                best = winner;
            }
            if improved {
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            let iteration = IterationReport {
                index: history.len() as u64,
                improved,
                best_value: best.value,
                candidates: report_candidates,
                elapsed_ms: iteration_start.elapsed().as_millis() as u64,
            };
            debug!(
                iteration = iteration.index,
                improved,
                best_value = best.value,
                stagnation,
                rounds,
                "iteration finished"
            );
            observer(&iteration);
            history.push(iteration);
        }

        if !interrupted {
            interrupted = interrupt.is_some_and(|flag| flag.load(Ordering::Relaxed));
        }
        info!(
            best_value = best.value,
            iterations = history.len(),
            total_evaluations,
            interrupted,
            "search finished"
        );

        let report = EvolutionReport {
            started_at,
            best_value: best.value,
            best_circuit: to_text(&best.circuit),
            num_iterations: history.len() as u64,
            total_evaluations,
            interrupted,
            elapsed_ms: started.elapsed().as_millis() as u64,
            history,
        };
        Ok(SearchResult { best, report })
    }
}
