//! Error types shared by the engine, the front-end and the configuration layer.
//!
//! Validation errors are raised before any amplitude is touched, so a failed
//! operation leaves the state vector exactly as it was.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by qubitvec operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A qubit index is not below the register width.
    #[error("qubit index {qubit} out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange {
        /// Offending index.
        qubit: usize,
        /// Register width.
        num_qubits: usize,
    },

    /// An instruction carries the wrong number of qubit operands.
    #[error("'{instruction}' expects {expected} qubit operand(s), got {actual}")]
    OperandCount {
        /// Instruction mnemonic.
        instruction: String,
        /// Operands required.
        expected: usize,
        /// Operands supplied.
        actual: usize,
    },

    /// Alignment requests must be powers of two.
    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),

    /// CNOT with the same control and target qubit.
    #[error("control and target must differ (both are qubit {0})")]
    ControlEqualsTarget(usize),

    /// A single-qubit gate name that is not in the gate table.
    #[error("unrecognized gate '{0}'")]
    UnknownGate(String),

    /// Register wider than the configured limit.
    #[error("{requested} qubits requested, limit is {max}")]
    QubitLimit {
        /// Requested width.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The allocator could not satisfy a request.
    #[error("failed to allocate {size} bytes aligned to {alignment}")]
    Allocation {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        alignment: usize,
    },

    /// The worker pool for a parallel gate could not be started.
    #[error("worker pool: {0}")]
    WorkerPool(String),

    /// Source text contains a token the lexer cannot classify.
    #[error("lex error line {line}: {msg}")]
    Lex {
        /// 1-based source line.
        line: usize,
        /// Description.
        msg: String,
    },

    /// Source line is not a well-formed instruction.
    #[error("parse error line {line}: {msg}")]
    Parse {
        /// 1-based source line.
        line: usize,
        /// Description.
        msg: String,
    },

    /// Configuration could not be read or decoded.
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Create a qubit range error.
    pub fn out_of_range(qubit: usize, num_qubits: usize) -> Self {
        Self::QubitOutOfRange { qubit, num_qubits }
    }

    /// Create an operand count error.
    pub fn operand_count(instruction: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::OperandCount {
            instruction: instruction.into(),
            expected,
            actual,
        }
    }

    /// True for errors that reject an operation before it mutates anything.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::QubitOutOfRange { .. }
                | Self::OperandCount { .. }
                | Self::InvalidAlignment(_)
                | Self::ControlEqualsTarget(_)
                | Self::UnknownGate(_)
                | Self::QubitLimit { .. }
        )
    }
}

/// Check `qubit < num_qubits`.
#[inline]
pub(crate) fn check_qubit(qubit: usize, num_qubits: usize) -> Result<()> {
    if qubit < num_qubits {
        Ok(())
    } else {
        Err(Error::out_of_range(qubit, num_qubits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::out_of_range(5, 3);
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('3'));

        let err = Error::operand_count("CNOT", 2, 1);
        assert!(err.to_string().contains("CNOT"));

        let err = Error::ControlEqualsTarget(2);
        assert!(err.to_string().contains("qubit 2"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::InvalidAlignment(3).is_validation());
        assert!(Error::UnknownGate("FOO".into()).is_validation());
        assert!(!Error::Allocation { size: 8, alignment: 32 }.is_validation());
        assert!(!Error::WorkerPool("spawn".into()).is_validation());
    }

    #[test]
    fn test_check_qubit() {
        assert!(check_qubit(0, 1).is_ok());
        assert_eq!(check_qubit(1, 1), Err(Error::out_of_range(1, 1)));
        assert!(check_qubit(0, 0).is_err());
    }
}
