//! Continuous parameter optimizers.
//!
//! Both optimizers treat the objective as a black box over a bounded box
//! and never assume smoothness beyond what their own updates need. They
//! are stateless between calls so a single instance can serve many
//! candidates concurrently.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, RngCore};

/// Result of one optimizer run.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    /// Best parameters found.
    pub x_opt: Vec<f64>,
    /// Objective value at `x_opt`.
    pub f_opt: f64,
    /// Set only when the run ended abnormally (interrupt, iteration
    /// limit, failed line search). `None` means clean convergence.
    pub diagnostic: Option<String>,
}

/// A bounded local optimizer for candidate parameters.
pub trait Optimizer: Send + Sync {
    /// Minimize `f` from `x0` inside `bounds`.
    ///
    /// `rng` drives any stochastic choices; deterministic optimizers
    /// ignore it. The run polls `interrupt` between iterations and
    /// returns its best point so far when the flag is raised.
    fn optimize(
        &self,
        f: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        bounds: &[(f64, f64)],
        rng: &mut dyn RngCore,
        interrupt: Option<&AtomicBool>,
    ) -> OptimizationOutcome;
}

fn interrupted(interrupt: Option<&AtomicBool>) -> bool {
    interrupt.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn clamp_to(bounds: &[(f64, f64)], x: &mut [f64]) {
    for (value, &(low, high)) in x.iter_mut().zip(bounds) {
        *value = value.clamp(low, high);
    }
}

/// Quasi-Newton minimizer with finite-difference gradients.
///
/// Maintains an inverse-Hessian approximation with the standard rank-two
/// update and backtracks along each search direction until the Armijo
/// condition holds. Points are clamped to the bounds before evaluation.
#[derive(Debug, Clone)]
pub struct BfgsOptimizer {
    pub max_iterations: usize,
    /// Central-difference step for gradients.
    pub gradient_step: f64,
    /// Infinity-norm gradient threshold for convergence.
    pub tolerance: f64,
    /// Minimum objective decrease before declaring convergence.
    pub tol_fun: f64,
}

impl Default for BfgsOptimizer {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            gradient_step: 1e-6,
            tolerance: 1e-8,
            tol_fun: 1e-12,
        }
    }
}

impl BfgsOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn gradient(
        &self,
        f: &mut dyn FnMut(&[f64]) -> f64,
        bounds: &[(f64, f64)],
        x: &[f64],
    ) -> Vec<f64> {
        let h = self.gradient_step;
        let mut grad = vec![0.0; x.len()];
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            let original = probe[i];
            probe[i] = original + h;
            clamp_to(&bounds[i..=i], &mut probe[i..=i]);
            let hi = probe[i];
            let f_hi = f(&probe);
            probe[i] = original - h;
            clamp_to(&bounds[i..=i], &mut probe[i..=i]);
            let lo = probe[i];
            let f_lo = f(&probe);
            probe[i] = original;
            // At a clamped boundary the stencil degenerates to one side.
            grad[i] = if hi > lo { (f_hi - f_lo) / (hi - lo) } else { 0.0 };
        }
        grad
    }
}

impl Optimizer for BfgsOptimizer {
    fn optimize(
        &self,
        f: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        bounds: &[(f64, f64)],
        _rng: &mut dyn RngCore,
        interrupt: Option<&AtomicBool>,
    ) -> OptimizationOutcome {
        let n = x0.len();
        let mut x = x0.to_vec();
        clamp_to(bounds, &mut x);
        let mut fx = f(&x);
        if n == 0 {
            return OptimizationOutcome {
                x_opt: x,
                f_opt: fx,
                diagnostic: None,
            };
        }

        // Inverse Hessian approximation, row major.
        let mut h_inv: Vec<Vec<f64>> = identity(n);
        let mut grad = self.gradient(f, bounds, &x);
        let mut diagnostic = Some("reached iteration limit".to_string());

        for _ in 0..self.max_iterations {
            if interrupted(interrupt) {
                diagnostic = Some("interrupted".to_string());
                break;
            }
            if grad.iter().all(|g| g.abs() < self.tolerance) {
                diagnostic = None;
                break;
            }

            let mut direction = mat_vec(&h_inv, &grad);
            for d in &mut direction {
                *d = -*d;
            }
            let mut slope = dot(&direction, &grad);
            if slope >= 0.0 {
                // Stale curvature; restart from steepest descent.
                h_inv = identity(n);
                direction = grad.iter().map(|g| -g).collect();
                slope = dot(&direction, &grad);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..40 {
                let mut trial = x.clone();
                for (t, d) in trial.iter_mut().zip(&direction) {
                    *t += alpha * d;
                }
                clamp_to(bounds, &mut trial);
                let f_trial = f(&trial);
                if f_trial <= fx + 1e-4 * alpha * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                diagnostic = Some("line search failed".to_string());
                break;
            };

            let grad_new = self.gradient(f, bounds, &x_new);
            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > 1e-12 {
                bfgs_update(&mut h_inv, &s, &y, sy);
            }

            let decrease = fx - f_new;
            x = x_new;
            fx = f_new;
            grad = grad_new;
            if decrease.abs() < self.tol_fun {
                diagnostic = None;
                break;
            }
        }

        OptimizationOutcome {
            x_opt: x,
            f_opt: fx,
            diagnostic,
        }
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// H ← (I − ρsyᵀ) H (I − ρysᵀ) + ρssᵀ with ρ = 1/(sᵀy).
fn bfgs_update(h_inv: &mut [Vec<f64>], s: &[f64], y: &[f64], sy: f64) {
    let n = s.len();
    let rho = 1.0 / sy;
    let hy = mat_vec(h_inv, y);
    let yhy = dot(y, &hy);
    for i in 0..n {
        for j in 0..n {
            h_inv[i][j] += (1.0 + rho * yhy) * rho * s[i] * s[j]
                - rho * (s[i] * hy[j] + hy[i] * s[j]);
        }
    }
}

/// Bounded (μ/μ, λ) evolution strategy.
///
/// A derivative-free fallback for rugged landscapes: each generation
/// samples `population` Gaussian offspring around the running mean,
/// recombines the best quarter and adapts the step size on success.
#[derive(Debug, Clone)]
pub struct EvolutionOptimizer {
    pub population: usize,
    pub max_iterations: usize,
    /// Generation-to-generation best-value spread below which the run
    /// is considered converged.
    pub tol_fun: f64,
    /// Initial step size as a fraction of each bound's width.
    pub sigma0: f64,
}

impl Default for EvolutionOptimizer {
    fn default() -> Self {
        Self {
            population: 16,
            max_iterations: 300,
            tol_fun: 1e-11,
            sigma0: 0.5,
        }
    }
}

impl EvolutionOptimizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Optimizer for EvolutionOptimizer {
    fn optimize(
        &self,
        f: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        bounds: &[(f64, f64)],
        rng: &mut dyn RngCore,
        interrupt: Option<&AtomicBool>,
    ) -> OptimizationOutcome {
        let n = x0.len();
        let mut mean = x0.to_vec();
        clamp_to(bounds, &mut mean);
        let mut best_x = mean.clone();
        let mut best_f = f(&best_x);
        if n == 0 {
            return OptimizationOutcome {
                x_opt: best_x,
                f_opt: best_f,
                diagnostic: None,
            };
        }

        let widths: Vec<f64> = bounds.iter().map(|&(low, high)| high - low).collect();
        let mut sigma = self.sigma0;
        let parents = (self.population / 4).max(1);
        let mut diagnostic = Some("reached iteration limit".to_string());

        for _ in 0..self.max_iterations {
            if interrupted(interrupt) {
                diagnostic = Some("interrupted".to_string());
                break;
            }

            let mut offspring: Vec<(f64, Vec<f64>)> = (0..self.population)
                .map(|_| {
                    let mut x: Vec<f64> = mean
                        .iter()
                        .zip(&widths)
                        .map(|(&m, &w)| m + sigma * w * standard_normal(rng))
                        .collect();
                    clamp_to(bounds, &mut x);
                    (f(&x), x)
                })
                .collect();
            offspring.sort_by(|a, b| a.0.total_cmp(&b.0));

            let generation_best = offspring[0].0;
            for i in 0..n {
                mean[i] = offspring[..parents].iter().map(|(_, x)| x[i]).sum::<f64>()
                    / parents as f64;
            }

            if generation_best < best_f {
                let improvement = best_f - generation_best;
                best_f = generation_best;
                best_x = offspring[0].1.clone();
                sigma = (sigma * 1.1).min(1.0);
                if improvement < self.tol_fun {
                    diagnostic = None;
                    break;
                }
            } else {
                sigma *= 0.82;
                if sigma < 1e-9 {
                    diagnostic = None;
                    break;
                }
            }
        }

        OptimizationOutcome {
            x_opt: best_x,
            f_opt: best_f,
            diagnostic,
        }
    }
}

/// Standard normal deviate via the Box-Muller transform.
fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen_range(0.0..TAU);
    (-2.0 * u1.ln()).sqrt() * u2.cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn quadratic(center: Vec<f64>) -> impl FnMut(&[f64]) -> f64 {
        move |x: &[f64]| {
            x.iter()
                .zip(&center)
                .map(|(a, c)| (a - c) * (a - c))
                .sum()
        }
    }

    #[test]
    fn test_bfgs_minimizes_quadratic() {
        let mut f = quadratic(vec![0.7, -1.2]);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = BfgsOptimizer::new().optimize(
            &mut f,
            &[0.0, 0.0],
            &[(-3.0, 3.0), (-3.0, 3.0)],
            &mut rng,
            None,
        );
        assert!(outcome.diagnostic.is_none(), "{:?}", outcome.diagnostic);
        assert_abs_diff_eq!(outcome.x_opt[0], 0.7, epsilon = 1e-4);
        assert_abs_diff_eq!(outcome.x_opt[1], -1.2, epsilon = 1e-4);
        assert!(outcome.f_opt < 1e-7);
    }

    #[test]
    fn test_bfgs_respects_bounds() {
        let mut f = quadratic(vec![5.0]);
        let mut rng = StdRng::seed_from_u64(2);
        let outcome =
            BfgsOptimizer::new().optimize(&mut f, &[0.0], &[(-1.0, 1.0)], &mut rng, None);
        assert!(outcome.x_opt[0] <= 1.0 + 1e-12);
        assert_abs_diff_eq!(outcome.x_opt[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bfgs_zero_dimensional() {
        let mut calls = 0;
        let mut f = |_: &[f64]| {
            calls += 1;
            4.25
        };
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = BfgsOptimizer::new().optimize(&mut f, &[], &[], &mut rng, None);
        assert_eq!(calls, 1);
        assert_abs_diff_eq!(outcome.f_opt, 4.25);
        assert!(outcome.x_opt.is_empty());
    }

    #[test]
    fn test_bfgs_interrupt_reports_diagnostic() {
        let flag = AtomicBool::new(true);
        let mut f = quadratic(vec![0.5, 0.5, 0.5]);
        let mut rng = StdRng::seed_from_u64(4);
        let outcome = BfgsOptimizer::new().optimize(
            &mut f,
            &[0.0, 0.0, 0.0],
            &[(-1.0, 1.0); 3],
            &mut rng,
            Some(&flag),
        );
        assert_eq!(outcome.diagnostic.as_deref(), Some("interrupted"));
    }

    #[test]
    fn test_evolution_minimizes_quadratic() {
        let mut f = quadratic(vec![0.3, -0.9]);
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = EvolutionOptimizer::new().optimize(
            &mut f,
            &[1.0, 1.0],
            &[(-2.0, 2.0), (-2.0, 2.0)],
            &mut rng,
            None,
        );
        assert!(outcome.f_opt < 1e-3, "f_opt = {}", outcome.f_opt);
    }

    #[test]
    fn test_evolution_stays_in_bounds() {
        let mut seen_out_of_bounds = false;
        let mut f = |x: &[f64]| {
            if x.iter().any(|&v| !(-1.0..=1.0).contains(&v)) {
                seen_out_of_bounds = true;
            }
            x[0] * x[0]
        };
        let mut rng = StdRng::seed_from_u64(6);
        EvolutionOptimizer::new().optimize(&mut f, &[0.9], &[(-1.0, 1.0)], &mut rng, None);
        assert!(!seen_out_of_bounds);
    }

    #[test]
    fn test_evolution_reproducible_for_fixed_seed() {
        let run = |seed: u64| {
            let mut f = quadratic(vec![0.1, 0.2]);
            let mut rng = StdRng::seed_from_u64(seed);
            EvolutionOptimizer::new()
                .optimize(&mut f, &[0.0, 0.0], &[(-1.0, 1.0); 2], &mut rng, None)
                .x_opt
        };
        assert_eq!(run(9), run(9));
    }
}
