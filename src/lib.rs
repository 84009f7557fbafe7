//! # qubitvec
//!
//! Dense state-vector quantum circuit simulator.
//!
//! An n-qubit register is held as 2ⁿ complex amplitudes in two aligned `f32`
//! buffers (real and imaginary parts). Single-qubit gates and CNOT act on the
//! buffers in place, optionally split across a worker pool; measurement
//! samples the Born rule and collapses the state. A small text front-end,
//! a peephole optimizer and an executor turn circuit source into results.
//!
//! ## Quick Start
//!
//! ```rust
//! use qubitvec::core::Simulator;
//!
//! # fn main() -> qubitvec::Result<()> {
//! // Create a 2-qubit simulator with a fixed measurement seed
//! let mut sim = Simulator::with_seed(2, 7)?;
//!
//! // Build a Bell state: (|00⟩ + |11⟩) / √2
//! sim.h(0)?.cnot(0, 1)?;
//!
//! // Inspect probabilities (no collapse)
//! let probs = sim.probabilities();
//! assert!((probs[0] - 0.5).abs() < 1e-6);
//! assert!((probs[3] - 0.5).abs() < 1e-6);
//!
//! // Measure, which collapses the state; both qubits agree
//! let bits = sim.measure_all()?;
//! assert_eq!(bits[0], bits[1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running circuit source
//!
//! ```rust
//! use qubitvec::{compiler, config::EngineConfig, runtime};
//!
//! # fn main() -> anyhow::Result<()> {
//! let program = compiler::parse_source("QREG 1\nX 0\nX 0\nH 0\nMEASURE 0")?;
//! let scheduled = runtime::schedule_with(&program, &EngineConfig::default().optimizer);
//! assert_eq!(scheduled.metadata.gates_removed, 2);
//!
//! let result = runtime::run(&scheduled.program, EngineConfig::default())?;
//! assert!(result.outcome(0).is_some());
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod core;
pub mod error;
pub mod optimizer;
pub mod runtime;

pub use error::{Error, Result};
