/// Peephole cancellation of self-inverse gate pairs.
///
/// Algorithm
/// ---------
/// One left-to-right scan with a read cursor. For every qubit the scan
/// remembers the last single-qubit gate that touched it (`pending`). When a
/// single-qubit gate G arrives on qubit q and `pending[q]` holds the same G,
/// and G is one of H, X, Y, Z, both are marked for removal and `pending[q]`
/// is cleared. A different single-qubit gate on q replaces `pending[q]`;
/// single-qubit gates on other qubits leave it alone, so `Y1 Z0 Y1` still
/// cancels. Two-qubit gates, measurements and `Unknown` instructions are
/// fences: they clear every pending entry, whichever qubits they touch.
///
/// Survivors are then compacted toward the front with a write cursor and the
/// vector is truncated. Only single-qubit gates are ever removed.
///
/// In [`OptimizeMode::SinglePass`] a pair that becomes adjacent only because
/// an inner pair was removed (`H X X H`) is left for a later call;
/// [`OptimizeMode::FixedPoint`] repeats the scan until it removes nothing.
use crate::compiler::ir::{Instruction, SingleGate};
use crate::config::OptimizeMode;
use std::collections::HashMap;
use tracing::debug;

// ── Public API ─────────────────────────────────────────────────────────────

/// Statistics reported after optimization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationStats {
    /// Gate count before optimization.
    pub gates_before: usize,
    /// Gate count after optimization.
    pub gates_after: usize,
    /// Total gates removed across all passes.
    pub gates_removed: usize,
    /// Scans performed, including the final one that found nothing in fixed-point mode.
    pub passes: usize,
}

impl OptimizationStats {
    /// Fraction of gates eliminated (0.0 – 1.0).
    pub fn reduction_ratio(&self) -> f64 {
        if self.gates_before == 0 {
            return 0.0;
        }
        self.gates_removed as f64 / self.gates_before as f64
    }

    /// Percentage of gates eliminated (0.0 – 100.0).
    pub fn reduction_percent(&self) -> f64 {
        self.reduction_ratio() * 100.0
    }
}

/// Remove cancelling gate pairs from `instructions` in place.
pub fn optimize(instructions: &mut Vec<Instruction>, mode: OptimizeMode) -> OptimizationStats {
    let gates_before = count_gates(instructions);
    let mut gates_removed = 0;
    let mut passes = 0;

    loop {
        let removed = run_pass(instructions);
        passes += 1;
        gates_removed += removed;
        if removed == 0 || mode == OptimizeMode::SinglePass {
            break;
        }
    }

    let stats = OptimizationStats {
        gates_before,
        gates_after: count_gates(instructions),
        gates_removed,
        passes,
    };
    debug!(?mode, gates_before, gates_removed, passes, "optimized");
    stats
}

// ── Single pass ────────────────────────────────────────────────────────────

/// One scan. Returns the number of instructions removed.
pub fn run_pass(instructions: &mut Vec<Instruction>) -> usize {
    let mut keep = vec![true; instructions.len()];
    let mut pending: HashMap<usize, usize> = HashMap::new();
    let mut removed = 0;

    for (read, instr) in instructions.iter().enumerate() {
        match instr {
            Instruction::Single { gate: SingleGate::Known(kind), qubit } => {
                let cancels = pending
                    .get(qubit)
                    .and_then(|&prev| instructions[prev].single_gate_kind())
                    .is_some_and(|(prev_kind, _)| prev_kind == *kind && kind.is_self_inverse());

                if cancels {
                    if let Some(prev) = pending.remove(qubit) {
                        keep[prev] = false;
                        keep[read] = false;
                        removed += 2;
                    }
                } else {
                    pending.insert(*qubit, read);
                }
            }
            Instruction::Single { qubit, .. } => {
                pending.remove(qubit);
            }
            Instruction::Two { .. } | Instruction::Measure { .. } | Instruction::Unknown { .. } => {
                pending.clear();
            }
        }
    }

    if removed > 0 {
        let mut write = 0;
        for read in 0..instructions.len() {
            if keep[read] {
                instructions.swap(write, read);
                write += 1;
            }
        }
        instructions.truncate(write);
    }
    removed
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn count_gates(instrs: &[Instruction]) -> usize {
    instrs.iter().filter(|i| i.is_gate()).count()
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GateKind::{self, H, S, T, X, Y, Z};

    fn g(kind: GateKind, q: usize) -> Instruction {
        Instruction::gate(kind, q)
    }

    fn opt(mut instrs: Vec<Instruction>) -> Vec<Instruction> {
        optimize(&mut instrs, OptimizeMode::SinglePass);
        instrs
    }

    fn opt_fixed(mut instrs: Vec<Instruction>) -> Vec<Instruction> {
        optimize(&mut instrs, OptimizeMode::FixedPoint);
        instrs
    }

    #[test]
    fn test_xx_cancels() {
        assert!(opt(vec![g(X, 0), g(X, 0)]).is_empty());
    }

    #[test]
    fn test_each_self_inverse_pair_cancels() {
        for kind in [H, X, Y, Z] {
            assert!(opt(vec![g(kind, 2), g(kind, 2)]).is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_gate_on_other_qubit_does_not_interrupt() {
        assert_eq!(opt(vec![g(Y, 1), g(Z, 0), g(Y, 1)]), vec![g(Z, 0)]);
    }

    #[test]
    fn test_different_qubits_not_cancelled() {
        let input = vec![g(H, 0), g(H, 1)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_different_gates_not_cancelled() {
        let input = vec![g(X, 0), g(Y, 0)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_s_and_t_pairs_kept() {
        let input = vec![g(S, 0), g(S, 0), g(T, 1), g(T, 1)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_cnot_blocks_cancellation_on_touched_qubit() {
        let input = vec![g(H, 0), Instruction::cnot(0, 1), g(H, 0)];
        assert_eq!(opt(input.clone()), input);
        let input = vec![g(H, 1), Instruction::cnot(0, 1), g(H, 1)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_cnot_on_other_qubits_blocks_cancellation() {
        let input = vec![g(X, 0), Instruction::cnot(1, 2), g(X, 0)];
        assert_eq!(opt(input.clone()), input);
        assert_eq!(opt_fixed(input.clone()), input);
    }

    #[test]
    fn test_measure_blocks_cancellation() {
        let input = vec![g(X, 0), Instruction::measure(0), g(X, 0)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_measure_on_other_qubit_blocks_cancellation() {
        let input = vec![g(X, 0), Instruction::measure(1), g(X, 0)];
        assert_eq!(opt(input.clone()), input);
        let input = vec![g(H, 2), g(Z, 0), Instruction::measure(1), g(Z, 0), g(H, 2)];
        assert_eq!(opt_fixed(input.clone()), input);
    }

    #[test]
    fn test_pair_after_fence_still_cancels() {
        let cx = Instruction::cnot(0, 1);
        assert_eq!(opt(vec![g(X, 0), cx.clone(), g(Y, 2), g(Y, 2)]), vec![g(X, 0), cx]);
    }

    #[test]
    fn test_unknown_is_an_opaque_fence() {
        let barrier = Instruction::Unknown { name: "BARRIER".into(), qubits: vec![] };
        let input = vec![g(H, 3), barrier, g(H, 3)];
        assert_eq!(opt(input.clone()), input);
    }

    #[test]
    fn test_unrecognized_gate_blocks_its_qubit() {
        let foo = Instruction::Single {
            gate: SingleGate::Unrecognized("FOO".into()),
            qubit: 0,
        };
        let input = vec![g(Z, 0), foo.clone(), g(Z, 0)];
        assert_eq!(opt(input.clone()), input);
        assert_eq!(opt(vec![g(Z, 1), foo.clone(), g(Z, 1)]), vec![foo]);
    }

    #[test]
    fn test_single_pass_does_not_rescan() {
        let input = vec![g(H, 0), g(X, 0), g(X, 0), g(H, 0)];
        assert_eq!(opt(input.clone()), vec![g(H, 0), g(H, 0)]);
        assert!(opt_fixed(input).is_empty());
    }

    #[test]
    fn test_odd_run_leaves_one() {
        assert_eq!(opt(vec![g(H, 0), g(H, 0), g(H, 0)]), vec![g(H, 0)]);
        assert!(opt(vec![g(Z, 0); 4]).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let input = vec![
            g(H, 0),
            g(X, 1),
            g(T, 2),
            g(X, 1),
            Instruction::cnot(0, 2),
            Instruction::measure(0),
        ];
        assert_eq!(
            opt(input),
            vec![g(H, 0), g(T, 2), Instruction::cnot(0, 2), Instruction::measure(0)]
        );
    }

    #[test]
    fn test_stats() {
        let mut instrs = vec![g(H, 0), g(X, 0), g(X, 0), g(H, 0), Instruction::measure(0)];
        let stats = optimize(&mut instrs, OptimizeMode::SinglePass);
        assert_eq!(
            stats,
            OptimizationStats { gates_before: 4, gates_after: 2, gates_removed: 2, passes: 1 }
        );
        assert!((stats.reduction_percent() - 50.0).abs() < 1e-9);

        let mut instrs = vec![g(H, 0), g(X, 0), g(X, 0), g(H, 0)];
        let stats = optimize(&mut instrs, OptimizeMode::FixedPoint);
        assert_eq!(stats.gates_removed, 4);
        assert_eq!(stats.passes, 3);
        assert_eq!(stats.reduction_ratio(), 1.0);
    }

    #[test]
    fn test_empty_sequence() {
        let mut instrs = Vec::new();
        let stats = optimize(&mut instrs, OptimizeMode::FixedPoint);
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.reduction_ratio(), 0.0);
    }
}
