/// Instruction scheduler.
///
/// Transforms a parsed `Program` before execution. Today that means one
/// thing: peephole cancellation of self-inverse gate pairs, in the requested
/// mode. The declared register width is carried through unchanged.
use crate::compiler::ir::Program;
use crate::config::{OptimizeMode, OptimizerConfig};
use crate::optimizer::peephole::{self, OptimizationStats};

/// A scheduled (and optimized) program ready for execution.
#[derive(Debug, Clone)]
pub struct ScheduledProgram {
    pub program: Program,
    pub metadata: SchedulerMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerMetadata {
    /// Gates removed by the optimizer.
    pub gates_removed: usize,
    /// Gate count after optimization.
    pub gates_remaining: usize,
    /// Optimizer scans performed (0 when optimization is disabled).
    pub optimizer_passes: usize,
}

impl From<&OptimizationStats> for SchedulerMetadata {
    fn from(stats: &OptimizationStats) -> Self {
        Self {
            gates_removed: stats.gates_removed,
            gates_remaining: stats.gates_after,
            optimizer_passes: stats.passes,
        }
    }
}

/// Optimize a copy of `program` in the given mode.
pub fn schedule(program: &Program, mode: OptimizeMode) -> ScheduledProgram {
    let mut program = program.clone();
    let stats = peephole::optimize(&mut program.instructions, mode);
    ScheduledProgram {
        program,
        metadata: SchedulerMetadata::from(&stats),
    }
}

/// Schedule according to the optimizer configuration; a disabled optimizer
/// passes the program through untouched.
pub fn schedule_with(program: &Program, config: &OptimizerConfig) -> ScheduledProgram {
    if config.enabled {
        return schedule(program, config.mode);
    }
    ScheduledProgram {
        program: program.clone(),
        metadata: SchedulerMetadata {
            gates_removed: 0,
            gates_remaining: program.gate_count(),
            optimizer_passes: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::Instruction;
    use crate::core::GateKind;

    fn bell() -> Program {
        Program::new(Some(2), vec![
            Instruction::gate(GateKind::H, 0),
            Instruction::cnot(0, 1),
            Instruction::measure(0),
            Instruction::measure(1),
        ])
    }

    #[test]
    fn test_schedule_passthrough_no_optimizable_gates() {
        let prog = bell();
        let scheduled = schedule(&prog, OptimizeMode::SinglePass);
        assert_eq!(scheduled.program, prog);
        assert_eq!(scheduled.metadata.gates_removed, 0);
        assert_eq!(scheduled.metadata.gates_remaining, prog.gate_count());
    }

    #[test]
    fn test_schedule_cancels_hh() {
        let prog = Program::new(Some(2), vec![
            Instruction::gate(GateKind::H, 0),
            Instruction::gate(GateKind::H, 0),
            Instruction::cnot(0, 1),
        ]);
        let scheduled = schedule(&prog, OptimizeMode::SinglePass);
        assert_eq!(scheduled.metadata.gates_removed, 2);
        assert_eq!(scheduled.program.instructions, vec![Instruction::cnot(0, 1)]);
        assert_eq!(scheduled.program.num_qubits, Some(2));
    }

    #[test]
    fn test_schedule_modes_differ() {
        let prog = Program::new(None, vec![
            Instruction::gate(GateKind::H, 0),
            Instruction::gate(GateKind::X, 0),
            Instruction::gate(GateKind::X, 0),
            Instruction::gate(GateKind::H, 0),
        ]);
        assert_eq!(schedule(&prog, OptimizeMode::SinglePass).program.instructions.len(), 2);
        assert!(schedule(&prog, OptimizeMode::FixedPoint).program.instructions.is_empty());
    }

    #[test]
    fn test_disabled_optimizer_passes_through() {
        let prog = Program::new(None, vec![
            Instruction::gate(GateKind::Z, 1),
            Instruction::gate(GateKind::Z, 1),
        ]);
        let config = OptimizerConfig { enabled: false, mode: OptimizeMode::FixedPoint };
        let scheduled = schedule_with(&prog, &config);
        assert_eq!(scheduled.program, prog);
        assert_eq!(
            scheduled.metadata,
            SchedulerMetadata { gates_removed: 0, gates_remaining: 2, optimizer_passes: 0 }
        );
    }
}
