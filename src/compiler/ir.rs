/// Circuit intermediate representation.
///
/// A parsed circuit is a flat, ordered sequence of `Instruction`s. Gate names
/// are resolved to [`GateKind`] once, when the instruction is built, so
/// nothing downstream compares strings. Names the front-end does not know are
/// kept verbatim so the driver can report them.
///
/// `Display` produces source text that parses back to the same instruction.
use crate::core::gates::GateKind;
use std::fmt;

// ── Gate names ────────────────────────────────────────────────────────────

/// Gate of a single-qubit instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleGate {
    Known(GateKind),
    Unrecognized(String),
}

/// Gate of a two-qubit instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwoQubitGate {
    Cnot,
    Unrecognized(String),
}

impl SingleGate {
    pub fn name(&self) -> &str {
        match self {
            Self::Known(kind)        => kind.name(),
            Self::Unrecognized(name) => name,
        }
    }
}

impl TwoQubitGate {
    pub fn name(&self) -> &str {
        match self {
            Self::Cnot               => "CNOT",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<GateKind> for SingleGate {
    fn from(kind: GateKind) -> Self {
        Self::Known(kind)
    }
}

// ── Instruction ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Single  { gate: SingleGate, qubit: usize },
    /// `control` first, `target` second.
    Two     { gate: TwoQubitGate, control: usize, target: usize },
    Measure { qubit: usize },
    /// A line the front-end could not classify. Never executed.
    Unknown { name: String, qubits: Vec<usize> },
}

impl Instruction {
    /// Shorthand for a known single-qubit gate.
    pub fn gate(kind: GateKind, qubit: usize) -> Self {
        Self::Single { gate: SingleGate::Known(kind), qubit }
    }

    pub fn cnot(control: usize, target: usize) -> Self {
        Self::Two { gate: TwoQubitGate::Cnot, control, target }
    }

    pub fn measure(qubit: usize) -> Self {
        Self::Measure { qubit }
    }

    /// Mnemonic used in source text and diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Single { gate, .. } => gate.name(),
            Self::Two { gate, .. }    => gate.name(),
            Self::Measure { .. }      => "MEASURE",
            Self::Unknown { name, .. } => name,
        }
    }

    /// Qubit indices referenced, in operand order.
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Self::Single { qubit, .. } | Self::Measure { qubit } => vec![*qubit],
            Self::Two { control, target, .. }                    => vec![*control, *target],
            Self::Unknown { qubits, .. }                         => qubits.clone(),
        }
    }

    /// Number of qubit operands.
    pub fn qubit_count(&self) -> usize {
        match self {
            Self::Single { .. } | Self::Measure { .. } => 1,
            Self::Two { .. }                           => 2,
            Self::Unknown { qubits, .. }               => qubits.len(),
        }
    }

    /// The resolved gate, if this is a known single-qubit gate.
    pub fn single_gate_kind(&self) -> Option<(GateKind, usize)> {
        match self {
            Self::Single { gate: SingleGate::Known(kind), qubit } => Some((*kind, *qubit)),
            _ => None,
        }
    }

    /// True for anything that changes amplitudes (gates of either width).
    pub fn is_gate(&self) -> bool {
        matches!(self, Self::Single { .. } | Self::Two { .. })
    }

    pub fn is_measurement(&self) -> bool {
        matches!(self, Self::Measure { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { gate, qubit }           => write!(f, "{} {qubit}", gate.name()),
            Self::Two { gate, control, target }    => write!(f, "{} {control} {target}", gate.name()),
            Self::Measure { qubit }                => write!(f, "MEASURE {qubit}"),
            Self::Unknown { name, qubits } => {
                write!(f, "{name}")?;
                for q in qubits {
                    write!(f, " {q}")?;
                }
                Ok(())
            }
        }
    }
}

// ── Program ───────────────────────────────────────────────────────────────

/// A parsed circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Width from `QREG n`, if the source declared one.
    pub num_qubits: Option<usize>,
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(num_qubits: Option<usize>, instructions: Vec<Instruction>) -> Self {
        Self { num_qubits, instructions }
    }

    /// Smallest register that holds every referenced qubit.
    pub fn required_qubits(&self) -> usize {
        self.instructions
            .iter()
            .flat_map(|i| i.qubits())
            .max()
            .map_or(0, |q| q + 1)
    }

    /// Declared width, else the smallest width that fits.
    pub fn register_width(&self) -> usize {
        self.num_qubits.unwrap_or_else(|| self.required_qubits())
    }

    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    pub fn measure_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_measurement()).count()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.num_qubits {
            writeln!(f, "QREG {n}")?;
        }
        for instr in &self.instructions {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
