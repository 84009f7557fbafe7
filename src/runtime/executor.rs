/// Circuit executor.
///
/// Walks an instruction sequence in order against one `Simulator`:
///
///   - every qubit operand is range-checked before the instruction runs, so a
///     rejected instruction never touches the state
///   - known single-qubit gates and CNOT are applied
///   - MEASURE records its outcome
///   - a single-qubit gate with an unrecognized name is fatal
///   - a two-qubit gate with an unrecognized name, or an `Unknown`
///     instruction, is logged, counted as skipped, and execution continues
///
/// The first fatal error stops the run; [`ExecError`] says which instruction.
use crate::compiler::ir::{Instruction, Program, SingleGate, TwoQubitGate};
use crate::config::EngineConfig;
use crate::core::Simulator;
use crate::error::{check_qubit, Error};
use thiserror::Error;
use tracing::{debug, info, warn};

// ── Result types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementRecord {
    pub qubit: usize,
    pub outcome: u8,
    /// Index of the MEASURE instruction in the executed sequence.
    pub step: usize,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub num_qubits: usize,
    /// All measurement outcomes in execution order.
    pub measurements: Vec<MeasurementRecord>,
    /// Probability snapshot taken before the first measurement (if any).
    pub pre_measurement_probs: Option<Vec<f64>>,
    /// Final probability distribution (post-collapse if measured).
    pub final_probabilities: Vec<f64>,
    /// Gates applied to the state.
    pub gate_count: usize,
    /// Instructions skipped as unsupported.
    pub skipped: usize,
}

impl ExecutionResult {
    /// Last measured outcome of `qubit`, or `None` if it was never measured.
    pub fn outcome(&self, qubit: usize) -> Option<u8> {
        self.measurements.iter().rfind(|m| m.qubit == qubit).map(|m| m.outcome)
    }

    /// True if every qubit has at least one measurement record.
    pub fn fully_collapsed(&self) -> bool {
        (0..self.num_qubits).all(|q| self.outcome(q).is_some())
    }

    /// Outcomes as a bit-string, qubit 0 first. `None` unless every qubit was measured.
    pub fn bitstring(&self) -> Option<String> {
        (0..self.num_qubits)
            .map(|q| self.outcome(q).map(|b| if b == 1 { '1' } else { '0' }))
            .collect()
    }

    /// Basis states of `probs` above `threshold` as `(ket_label, probability)`,
    /// in index order. Labels put qubit 0 rightmost.
    pub fn significant_states(&self, probs: &[f64], threshold: f64) -> Vec<(String, f64)> {
        let n = self.num_qubits;
        probs
            .iter()
            .enumerate()
            .filter(|(_, &p)| p > threshold)
            .map(|(i, &p)| (format!("{i:0>n$b}"), p))
            .collect()
    }
}

/// Why a run stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The simulator could not be created.
    #[error("setup failed: {0}")]
    Setup(#[from] Error),

    /// An instruction failed; nothing after it ran.
    #[error("instruction {index} `{instruction}`: {source}")]
    Instruction {
        index: usize,
        instruction: String,
        source: Error,
    },
}

impl ExecError {
    fn at(index: usize, instr: &Instruction, source: Error) -> Self {
        Self::Instruction {
            index,
            instruction: instr.to_string(),
            source,
        }
    }

    /// Index of the failing instruction, if the failure was tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Setup(_) => None,
            Self::Instruction { index, .. } => Some(*index),
        }
    }

    /// The underlying engine error.
    pub fn error(&self) -> &Error {
        match self {
            Self::Setup(e) | Self::Instruction { source: e, .. } => e,
        }
    }
}

// ── Execution ─────────────────────────────────────────────────────────────

/// Run `program` on a fresh simulator sized to its register width.
pub fn run(program: &Program, config: EngineConfig) -> Result<ExecutionResult, ExecError> {
    let mut sim = Simulator::with_config(program.register_width(), config)?;
    execute(&mut sim, &program.instructions)
}

/// Execute `instructions` against `sim`, stopping at the first fatal error.
pub fn execute(sim: &mut Simulator, instructions: &[Instruction]) -> Result<ExecutionResult, ExecError> {
    let num_qubits = sim.num_qubits();
    let mut measurements = Vec::new();
    let mut pre_measurement_probs = None;
    let mut gate_count = 0;
    let mut skipped = 0;

    for (index, instr) in instructions.iter().enumerate() {
        let fail = |e: Error| ExecError::at(index, instr, e);

        for q in instr.qubits() {
            check_qubit(q, num_qubits).map_err(fail)?;
        }

        match instr {
            // ── Gates ───────────────────────────────────────────────────
            Instruction::Single { gate: SingleGate::Known(kind), qubit } => {
                sim.apply(*kind, *qubit).map_err(fail)?;
                gate_count += 1;
            }
            Instruction::Single { gate: SingleGate::Unrecognized(name), .. } => {
                return Err(fail(Error::UnknownGate(name.clone())));
            }
            Instruction::Two { gate: TwoQubitGate::Cnot, control, target } => {
                sim.cnot(*control, *target).map_err(fail)?;
                gate_count += 1;
            }
            Instruction::Two { gate: TwoQubitGate::Unrecognized(name), .. } => {
                warn!(index, gate = %name, "unrecognized two-qubit gate, skipping");
                skipped += 1;
            }

            // ── Measurement ─────────────────────────────────────────────
            Instruction::Measure { qubit } => {
                if pre_measurement_probs.is_none() {
                    pre_measurement_probs = Some(sim.probabilities());
                }
                let outcome = sim.measure(*qubit).map_err(fail)?;
                debug!(index, qubit, outcome, "measured");
                measurements.push(MeasurementRecord { qubit: *qubit, outcome, step: index });
            }

            // ── Opaque ──────────────────────────────────────────────────
            Instruction::Unknown { name, .. } => {
                warn!(index, instruction = %name, "unknown instruction, skipping");
                skipped += 1;
            }
        }
    }

    info!(
        instructions = instructions.len(),
        gate_count,
        measurements = measurements.len(),
        skipped,
        "execution finished"
    );

    Ok(ExecutionResult {
        num_qubits,
        measurements,
        pre_measurement_probs,
        final_probabilities: sim.probabilities(),
        gate_count,
        skipped,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
