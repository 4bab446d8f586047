//! Gate type catalog.
//!
//! Gate kinds form a closed set: five elementary gates plus composite
//! "block" gates that decompose into a fixed sequence of elementary
//! placements. All types live in a process-wide immutable registry and are
//! looked up by name; instances hold a shared [`Arc<GateType>`] reference.

use std::f64::consts::PI;
use std::sync::{Arc, LazyLock};

use ndarray::Array2;
use num_complex::Complex64;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};

/// Elementary gates with a direct unitary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryGate {
    /// Rotation around X: exp(-iθX/2). One parameter in `[0, π]`.
    Rx,
    /// Rotation around Y: exp(-iθY/2). One parameter in `[-π, π]`.
    Ry,
    /// Phase rotation diag(1, e^{iθ}). One parameter in `[0, π]`.
    Rz,
    /// Controlled-NOT; first target is the control.
    CNot,
    /// Square root of SWAP.
    SqrtSwap,
}

impl ElementaryGate {
    /// Get the registry name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            ElementaryGate::Rx => "rx",
            ElementaryGate::Ry => "ry",
            ElementaryGate::Rz => "rz",
            ElementaryGate::CNot => "cnot",
            ElementaryGate::SqrtSwap => "sqrtswap",
        }
    }

    /// Get the number of target qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            ElementaryGate::Rx | ElementaryGate::Ry | ElementaryGate::Rz => 1,
            ElementaryGate::CNot | ElementaryGate::SqrtSwap => 2,
        }
    }

    /// Get the number of parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        match self {
            ElementaryGate::Rx | ElementaryGate::Ry | ElementaryGate::Rz => 1,
            ElementaryGate::CNot | ElementaryGate::SqrtSwap => 0,
        }
    }

    /// Declared `[low, high]` range of the single parameter, if any.
    pub fn param_range(&self) -> Option<(f64, f64)> {
        match self {
            ElementaryGate::Rx | ElementaryGate::Rz => Some((0.0, PI)),
            ElementaryGate::Ry => Some((-PI, PI)),
            ElementaryGate::CNot | ElementaryGate::SqrtSwap => None,
        }
    }

    /// Build the small (2×2 or 4×4) unitary for the given parameters.
    ///
    /// Two-qubit matrices are indexed with the first target as the more
    /// significant bit of the small-matrix index.
    pub fn unitary(&self, params: &[f64]) -> Array2<Complex64> {
        debug_assert_eq!(params.len(), self.num_params());
        let c = |re: f64, im: f64| Complex64::new(re, im);
        match self {
            ElementaryGate::Rx => {
                let h = params[0] / 2.0;
                let (cos, sin) = (h.cos(), h.sin());
                ndarray::arr2(&[
                    [c(cos, 0.0), c(0.0, -sin)],
                    [c(0.0, -sin), c(cos, 0.0)],
                ])
            }
            ElementaryGate::Ry => {
                let h = params[0] / 2.0;
                let (cos, sin) = (h.cos(), h.sin());
                ndarray::arr2(&[
                    [c(cos, 0.0), c(-sin, 0.0)],
                    [c(sin, 0.0), c(cos, 0.0)],
                ])
            }
            ElementaryGate::Rz => {
                let phase = Complex64::from_polar(1.0, params[0]);
                ndarray::arr2(&[[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), phase]])
            }
            ElementaryGate::CNot => {
                let mut m = Array2::zeros((4, 4));
                m[(0, 0)] = c(1.0, 0.0);
                m[(1, 1)] = c(1.0, 0.0);
                m[(2, 3)] = c(1.0, 0.0);
                m[(3, 2)] = c(1.0, 0.0);
                m
            }
            ElementaryGate::SqrtSwap => {
                let p = c(0.5, 0.5);
                let q = c(0.5, -0.5);
                let mut m = Array2::zeros((4, 4));
                m[(0, 0)] = c(1.0, 0.0);
                m[(3, 3)] = c(1.0, 0.0);
                m[(1, 1)] = p;
                m[(1, 2)] = q;
                m[(2, 1)] = q;
                m[(2, 2)] = p;
                m
            }
        }
    }
}

/// One elementary gate placed at relative qubit positions inside a
/// composite block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The elementary gate.
    pub gate: ElementaryGate,
    /// Relative qubit indices within the block.
    pub qubits: Vec<usize>,
}

impl Placement {
    fn new(gate: ElementaryGate, qubits: impl Into<Vec<usize>>) -> Self {
        Self {
            gate,
            qubits: qubits.into(),
        }
    }
}

/// Maps a composite's own parameter vector to the concatenated sub-gate
/// parameter vectors.
pub type ParamExpansion = fn(&[f64]) -> Vec<f64>;

/// Type-specific structured reset policy.
type ParamReset = fn(&mut dyn RngCore) -> Vec<f64>;

/// A composite gate type: an ordered list of elementary placements plus a
/// parameter-decomposition function.
#[derive(Clone)]
pub struct CompositeSpec {
    name: &'static str,
    num_qubits: usize,
    param_ranges: Vec<(f64, f64)>,
    placements: Vec<Placement>,
    expand: ParamExpansion,
    reset: Option<ParamReset>,
}

impl std::fmt::Debug for CompositeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSpec")
            .field("name", &self.name)
            .field("num_qubits", &self.num_qubits)
            .field("placements", &self.placements)
            .finish_non_exhaustive()
    }
}

/// A gate type: elementary or composite block.
#[derive(Debug, Clone)]
pub enum GateType {
    /// An elementary gate.
    Elementary(ElementaryGate),
    /// A composite block of elementary placements.
    Composite(CompositeSpec),
}

impl GateType {
    /// Get the registry name.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateType::Elementary(g) => g.name(),
            GateType::Composite(spec) => spec.name,
        }
    }

    /// Get the number of target qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            GateType::Elementary(g) => g.num_qubits(),
            GateType::Composite(spec) => spec.num_qubits,
        }
    }

    /// Get the number of parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        match self {
            GateType::Elementary(g) => g.num_params(),
            GateType::Composite(spec) => spec.param_ranges.len(),
        }
    }

    /// Declared `[low, high]` ranges, one per parameter.
    pub fn param_ranges(&self) -> Vec<(f64, f64)> {
        match self {
            GateType::Elementary(g) => g.param_range().into_iter().collect(),
            GateType::Composite(spec) => spec.param_ranges.clone(),
        }
    }

    /// Decompose into elementary placements.
    ///
    /// Elementary types decompose to themselves, so decomposing a
    /// decomposition always yields the same sequence.
    pub fn decomposition(&self) -> Vec<Placement> {
        match self {
            GateType::Elementary(g) => {
                vec![Placement::new(*g, (0..g.num_qubits()).collect::<Vec<_>>())]
            }
            GateType::Composite(spec) => spec.placements.clone(),
        }
    }

    /// Expand this type's parameter vector into the concatenated
    /// parameters of its [`decomposition`](Self::decomposition).
    pub fn expand_params(&self, params: &[f64]) -> Vec<f64> {
        match self {
            GateType::Elementary(_) => params.to_vec(),
            GateType::Composite(spec) => (spec.expand)(params),
        }
    }

    /// Build the full unitary of this type (dimension `2^num_qubits`) for
    /// the given parameters, in big-endian tensor ordering (first qubit of
    /// the gate is the most significant index bit).
    pub fn unitary(&self, params: &[f64]) -> CircuitResult<Array2<Complex64>> {
        if params.len() != self.num_params() {
            return Err(CircuitError::ParameterCountMismatch {
                gate_name: self.name().to_string(),
                expected: self.num_params(),
                got: params.len(),
            });
        }
        match self {
            GateType::Elementary(g) => Ok(g.unitary(params)),
            GateType::Composite(spec) => {
                let expanded = (spec.expand)(params);
                let dim = 1usize << spec.num_qubits;
                let mut op = Array2::eye(dim);
                let mut offset = 0;
                for placement in &spec.placements {
                    let np = placement.gate.num_params();
                    let sub = placement.gate.unitary(&expanded[offset..offset + np]);
                    let full = embed_unitary(&sub, &placement.qubits, spec.num_qubits);
                    op = full.dot(&op);
                    offset += np;
                }
                Ok(op)
            }
        }
    }

    /// Draw a fresh parameter vector.
    ///
    /// The default draws uniformly from each declared range; composite
    /// types may install a structured policy instead (see `block-a`).
    pub fn reset_params(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        if let GateType::Composite(spec) = self {
            if let Some(reset) = spec.reset {
                return reset(rng);
            }
        }
        self.param_ranges()
            .iter()
            .map(|&(low, high)| rng.gen_range(low..=high))
            .collect()
    }

    /// Look up a gate type by name in the registry.
    pub fn by_name(name: &str) -> CircuitResult<Arc<GateType>> {
        registry()
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| CircuitError::UnknownGateType(name.to_string()))
    }
}

/// Expand a small gate unitary to the full `2^n`-dimensional space.
///
/// Index convention is big-endian tensor ordering: qubit `q` corresponds to
/// bit `n - 1 - q` of the row/column index. `targets[0]` maps to the most
/// significant bit of the small-matrix index.
pub fn embed_unitary(
    small: &Array2<Complex64>,
    targets: &[usize],
    num_qubits: usize,
) -> Array2<Complex64> {
    let dim = 1usize << num_qubits;
    let target_mask: usize = targets
        .iter()
        .map(|&q| 1usize << (num_qubits - 1 - q))
        .sum();
    let small_index = |i: usize| -> usize {
        let mut s = 0;
        for &q in targets {
            s = (s << 1) | ((i >> (num_qubits - 1 - q)) & 1);
        }
        s
    };

    let mut full = Array2::zeros((dim, dim));
    for row in 0..dim {
        for col in 0..dim {
            if (row & !target_mask) != (col & !target_mask) {
                continue;
            }
            full[(row, col)] = small[(small_index(row), small_index(col))];
        }
    }
    full
}

fn block_placements(entangler: ElementaryGate) -> Vec<Placement> {
    use ElementaryGate::{Rx, Rz};
    vec![
        Placement::new(Rx, [0]),
        Placement::new(Rz, [0]),
        Placement::new(Rx, [1]),
        Placement::new(Rz, [1]),
        Placement::new(entangler, [0, 1]),
        Placement::new(Rx, [0]),
        Placement::new(Rz, [0]),
        Placement::new(Rx, [1]),
        Placement::new(Rz, [1]),
    ]
}

fn identity_expansion(params: &[f64]) -> Vec<f64> {
    params.to_vec()
}

// block-a: ps(c,p0) ry(c,p1) rx(t,p2) ry(t,p3) CNOT ry(c,-p1) ps(c,-p0)
// ry(t,-p3) rx(t,-p2) — the trailing rotations undo the leading ones.
fn block_a_expansion(params: &[f64]) -> Vec<f64> {
    vec![
        params[0], params[1], params[2], params[3], -params[1], -params[0], -params[3], -params[2],
    ]
}

// Structured reset: the phase is pinned to π and the two Ry angles are
// tied, preserving the block's conjugation symmetry.
fn block_a_reset(rng: &mut dyn RngCore) -> Vec<f64> {
    let ry = rng.gen_range(-PI..=PI);
    let rx = rng.gen_range(-PI..=PI);
    vec![PI, ry, rx, ry]
}

static RX: LazyLock<Arc<GateType>> =
    LazyLock::new(|| Arc::new(GateType::Elementary(ElementaryGate::Rx)));
static RY: LazyLock<Arc<GateType>> =
    LazyLock::new(|| Arc::new(GateType::Elementary(ElementaryGate::Ry)));
static RZ: LazyLock<Arc<GateType>> =
    LazyLock::new(|| Arc::new(GateType::Elementary(ElementaryGate::Rz)));
static CNOT: LazyLock<Arc<GateType>> =
    LazyLock::new(|| Arc::new(GateType::Elementary(ElementaryGate::CNot)));
static SQRTSWAP: LazyLock<Arc<GateType>> =
    LazyLock::new(|| Arc::new(GateType::Elementary(ElementaryGate::SqrtSwap)));

static BLOCK_CNOT: LazyLock<Arc<GateType>> = LazyLock::new(|| {
    Arc::new(GateType::Composite(CompositeSpec {
        name: "block-cnot",
        num_qubits: 2,
        param_ranges: vec![(0.0, PI); 8],
        placements: block_placements(ElementaryGate::CNot),
        expand: identity_expansion,
        reset: None,
    }))
});

static BLOCK_SQRTSWAP: LazyLock<Arc<GateType>> = LazyLock::new(|| {
    Arc::new(GateType::Composite(CompositeSpec {
        name: "block-sqrtswap",
        num_qubits: 2,
        param_ranges: vec![(0.0, PI); 8],
        placements: block_placements(ElementaryGate::SqrtSwap),
        expand: identity_expansion,
        reset: None,
    }))
});

static BLOCK_A: LazyLock<Arc<GateType>> = LazyLock::new(|| {
    use ElementaryGate::{CNot, Rx, Ry, Rz};
    Arc::new(GateType::Composite(CompositeSpec {
        name: "block-a",
        num_qubits: 2,
        param_ranges: vec![(-PI, PI); 4],
        placements: vec![
            Placement::new(Rz, [0]),
            Placement::new(Ry, [0]),
            Placement::new(Rx, [1]),
            Placement::new(Ry, [1]),
            Placement::new(CNot, [0, 1]),
            Placement::new(Ry, [0]),
            Placement::new(Rz, [0]),
            Placement::new(Ry, [1]),
            Placement::new(Rx, [1]),
        ],
        expand: block_a_expansion,
        reset: Some(block_a_reset),
    }))
});

static REGISTRY: LazyLock<Vec<Arc<GateType>>> = LazyLock::new(|| {
    vec![
        RX.clone(),
        RY.clone(),
        RZ.clone(),
        CNOT.clone(),
        SQRTSWAP.clone(),
        BLOCK_CNOT.clone(),
        BLOCK_SQRTSWAP.clone(),
        BLOCK_A.clone(),
    ]
});

/// All registered gate types.
pub fn registry() -> &'static [Arc<GateType>] {
    &REGISTRY
}

/// Shared handles to the registered gate types.
pub mod types {
    use super::*;

    /// X rotation.
    pub fn rx() -> Arc<GateType> {
        RX.clone()
    }

    /// Y rotation.
    pub fn ry() -> Arc<GateType> {
        RY.clone()
    }

    /// Phase rotation.
    pub fn rz() -> Arc<GateType> {
        RZ.clone()
    }

    /// Controlled-NOT.
    pub fn cnot() -> Arc<GateType> {
        CNOT.clone()
    }

    /// Square root of SWAP.
    pub fn sqrtswap() -> Arc<GateType> {
        SQRTSWAP.clone()
    }

    /// Rotation block around a CNOT entangler.
    pub fn block_cnot() -> Arc<GateType> {
        BLOCK_CNOT.clone()
    }

    /// Rotation block around a √SWAP entangler.
    pub fn block_sqrtswap() -> Arc<GateType> {
        BLOCK_SQRTSWAP.clone()
    }

    /// Symmetry-reduced block: 4 parameters expanding to 8 rotations
    /// around a CNOT with sign relations.
    pub fn block_a() -> Arc<GateType> {
        BLOCK_A.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_registry_lookup() {
        for name in [
            "rx",
            "ry",
            "rz",
            "cnot",
            "sqrtswap",
            "block-cnot",
            "block-sqrtswap",
            "block-a",
        ] {
            let t = GateType::by_name(name).unwrap();
            assert_eq!(t.name(), name);
        }
    }

    #[test]
    fn test_unknown_gate_type() {
        let err = GateType::by_name("hadamard").unwrap_err();
        assert!(matches!(err, CircuitError::UnknownGateType(_)));
    }

    #[test]
    fn test_arities_and_param_counts() {
        assert_eq!(types::rx().num_qubits(), 1);
        assert_eq!(types::rx().num_params(), 1);
        assert_eq!(types::cnot().num_qubits(), 2);
        assert_eq!(types::cnot().num_params(), 0);
        assert_eq!(types::block_cnot().num_params(), 8);
        assert_eq!(types::block_a().num_params(), 4);
        assert_eq!(types::block_a().param_ranges().len(), 4);
    }

    #[test]
    fn test_rx_unitary_at_pi() {
        // rx(π) = -i·X
        let u = ElementaryGate::Rx.unitary(&[PI]);
        assert_abs_diff_eq!(u[(0, 1)].im, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[(1, 0)].im, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[(0, 0)].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_unitary_flips_target_when_control_set() {
        let u = ElementaryGate::CNot.unitary(&[]);
        // |10⟩ → |11⟩ (first target is the control / high bit)
        assert_abs_diff_eq!(u[(3, 2)].re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[(2, 2)].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_block_a_expansion_signs() {
        let expanded = types::block_a().expand_params(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(expanded, vec![0.1, 0.2, 0.3, 0.4, -0.2, -0.1, -0.4, -0.3]);
    }

    #[test]
    fn test_decomposition_is_idempotent() {
        let block = types::block_cnot();
        let first = block.decomposition();
        // Every element is elementary, so re-decomposing each placement
        // yields itself.
        for p in &first {
            let again = GateType::Elementary(p.gate).decomposition();
            assert_eq!(again[0].gate, p.gate);
        }
        assert_eq!(first, block.decomposition());
    }

    #[test]
    fn test_block_param_counts_match_placements() {
        for block in [types::block_cnot(), types::block_sqrtswap(), types::block_a()] {
            let expanded = block.expand_params(&vec![0.5; block.num_params()]);
            let placed: usize = block
                .decomposition()
                .iter()
                .map(|p| p.gate.num_params())
                .sum();
            assert_eq!(expanded.len(), placed, "{}", block.name());
        }
    }

    #[test]
    fn test_uniform_reset_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let params = types::rx().reset_params(&mut rng);
            assert_eq!(params.len(), 1);
            assert!((0.0..=PI).contains(&params[0]));
        }
    }

    #[test]
    fn test_block_a_structured_reset() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let params = types::block_a().reset_params(&mut rng);
            assert_eq!(params.len(), 4);
            assert_eq!(params[0], PI);
            assert_eq!(params[1], params[3]);
        }
    }

    #[test]
    fn test_embed_unitary_identity_elsewhere() {
        let rz = ElementaryGate::Rz.unitary(&[1.0]);
        let full = embed_unitary(&rz, &[1], 3);
        // Acting on qubit 1 of 3: diagonal, phase only where bit 1 is set
        // (big-endian: index bit 1).
        for i in 0..8 {
            let expect = if (i >> 1) & 1 == 1 {
                Complex64::from_polar(1.0, 1.0)
            } else {
                Complex64::new(1.0, 0.0)
            };
            assert!((full[(i, i)] - expect).norm() < 1e-12);
        }
    }
}
