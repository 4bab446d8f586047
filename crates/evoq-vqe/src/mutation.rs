//! Structural mutations for the evolutionary search.

use std::sync::Arc;

use rand::{Rng, RngCore, seq::index};
use tracing::warn;

use evoq_circuit::{Circuit, GateInstance, GateType, types};

/// A random structural edit of a circuit.
///
/// Mutations are best-effort: an edit that cannot apply (for example an
/// insertion into a register smaller than every eligible gate) leaves
/// the circuit unchanged.
pub trait Mutation: Send + Sync {
    fn apply(&self, circuit: &mut Circuit, rng: &mut dyn RngCore);
}

/// Insert one gate of a randomly chosen type at a random position, on
/// random distinct qubits, with freshly reset parameters.
pub struct InsertGate {
    gate_types: Vec<Arc<GateType>>,
}

impl InsertGate {
    pub fn new(gate_types: Vec<Arc<GateType>>) -> Self {
        Self { gate_types }
    }
}

impl Mutation for InsertGate {
    fn apply(&self, circuit: &mut Circuit, rng: &mut dyn RngCore) {
        let eligible: Vec<&Arc<GateType>> = self
            .gate_types
            .iter()
            .filter(|t| t.num_qubits() <= circuit.num_qubits())
            .collect();
        if eligible.is_empty() {
            return;
        }
        let gate_type = Arc::clone(eligible[rng.gen_range(0..eligible.len())]);
        let qubits = index::sample(rng, circuit.num_qubits(), gate_type.num_qubits()).into_vec();
        let position = rng.gen_range(0..=circuit.len());
        match GateInstance::new(gate_type, qubits) {
            Ok(mut gate) => {
                gate.reset_params(rng);
                if let Err(error) = circuit.insert(position, gate) {
                    warn!(%error, "insertion mutation rejected");
                }
            }
            Err(error) => warn!(%error, "insertion mutation produced invalid gate"),
        }
    }
}

/// Remove one gate at a random position; a no-op on empty circuits.
pub struct RemoveGate;

impl Mutation for RemoveGate {
    fn apply(&self, circuit: &mut Circuit, rng: &mut dyn RngCore) {
        if circuit.is_empty() {
            return;
        }
        let position = rng.gen_range(0..circuit.len());
        if let Err(error) = circuit.remove_at(position) {
            warn!(%error, "removal mutation rejected");
        }
    }
}

/// Pick one of several mutations with the given relative weights.
pub struct Weighted {
    entries: Vec<(f64, Arc<dyn Mutation>)>,
    total: f64,
}

impl Weighted {
    pub fn new(entries: Vec<(f64, Arc<dyn Mutation>)>) -> Self {
        let total = entries.iter().map(|(w, _)| w.max(0.0)).sum();
        Self { entries, total }
    }
}

impl Mutation for Weighted {
    fn apply(&self, circuit: &mut Circuit, rng: &mut dyn RngCore) {
        if self.entries.is_empty() || self.total <= 0.0 {
            return;
        }
        let mut remaining = rng.gen_range(0.0..self.total);
        for (weight, mutation) in &self.entries {
            remaining -= weight.max(0.0);
            if remaining < 0.0 {
                mutation.apply(circuit, rng);
                return;
            }
        }
        // Floating point slack can exhaust the loop; fall back to last.
        if let Some((_, mutation)) = self.entries.last() {
            mutation.apply(circuit, rng);
        }
    }
}

/// The default structural move set: insert a CNOT block, insert a √SWAP
/// block or remove a gate, equally weighted.
pub fn block_mutation() -> Weighted {
    Weighted::new(vec![
        (
            1.0,
            Arc::new(InsertGate::new(vec![types::block_cnot()])) as Arc<dyn Mutation>,
        ),
        (
            1.0,
            Arc::new(InsertGate::new(vec![types::block_sqrtswap()])) as Arc<dyn Mutation>,
        ),
        (1.0, Arc::new(RemoveGate) as Arc<dyn Mutation>),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_insert_grows_by_one() {
        let mut circuit = Circuit::new(3, 0).unwrap();
        let mutation = InsertGate::new(vec![types::block_a()]);
        let mut rng = StdRng::seed_from_u64(1);
        mutation.apply(&mut circuit, &mut rng);
        assert_eq!(circuit.len(), 1);
        assert_eq!(circuit.gates()[0].gate_type().name(), "block-a");
        let qubits = circuit.gates()[0].qubits();
        assert_ne!(qubits[0], qubits[1]);
    }

    #[test]
    fn test_insert_skips_oversized_types() {
        let mut circuit = Circuit::new(1, 0).unwrap();
        let mutation = InsertGate::new(vec![types::cnot()]);
        let mut rng = StdRng::seed_from_u64(2);
        mutation.apply(&mut circuit, &mut rng);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_remove_on_empty_is_noop() {
        let mut circuit = Circuit::new(2, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        RemoveGate.apply(&mut circuit, &mut rng);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_remove_shrinks_by_one() {
        let mut circuit = Circuit::new(2, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        InsertGate::new(vec![types::rx()]).apply(&mut circuit, &mut rng);
        InsertGate::new(vec![types::ry()]).apply(&mut circuit, &mut rng);
        RemoveGate.apply(&mut circuit, &mut rng);
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn test_weighted_respects_zero_weight() {
        let mut circuit = Circuit::new(2, 0).unwrap();
        let mutation = Weighted::new(vec![
            (0.0, Arc::new(RemoveGate) as Arc<dyn Mutation>),
            (
                1.0,
                Arc::new(InsertGate::new(vec![types::rx()])) as Arc<dyn Mutation>,
            ),
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            mutation.apply(&mut circuit, &mut rng);
        }
        assert_eq!(circuit.len(), 20);
    }

    #[test]
    fn test_block_mutation_keeps_circuit_valid() {
        let mut circuit = Circuit::new(4, 0b1010).unwrap();
        let mutation = block_mutation();
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..64 {
            mutation.apply(&mut circuit, &mut rng);
            for gate in circuit.gates() {
                assert!(gate.qubits().iter().all(|&q| q < 4));
            }
        }
    }
}
