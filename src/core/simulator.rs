/// High-level simulator interface.
///
/// `Simulator` owns one state vector together with everything needed to act
/// on it:
///   - the gate table used to resolve gate identifiers
///   - the measurement RNG (seedable for reproducible runs)
///   - the engine configuration, which decides serial vs parallel gates
///   - the last outcome recorded for each qubit
///
/// Gate methods return `Result<&mut Self>` so calls chain with `?`.
use super::gates::{apply_cnot, apply_single_qubit, GateDescriptor, GateKind, GateTable};
use super::measurement;
use super::parallel::apply_single_qubit_parallel;
use super::state::StateVector;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::trace;

pub struct Simulator {
    state: StateVector,
    table: GateTable,
    rng: StdRng,
    config: EngineConfig,
    /// Last outcome per qubit (None = not measured since the last reset)
    measurements: Vec<Option<u8>>,
}

impl Simulator {
    /// Create a simulator for `num_qubits` qubits with the default configuration.
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::with_config(num_qubits, EngineConfig::default())
    }

    /// Create a simulator whose measurements replay deterministically for a given seed.
    pub fn with_seed(num_qubits: usize, seed: u64) -> Result<Self> {
        let config = EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        };
        Self::with_config(num_qubits, config)
    }

    /// Create a simulator from an explicit configuration.
    ///
    /// Fails with [`Error::QubitLimit`] above `config.max_qubits`.
    pub fn with_config(num_qubits: usize, config: EngineConfig) -> Result<Self> {
        if num_qubits > config.max_qubits {
            return Err(Error::QubitLimit {
                requested: num_qubits,
                max: config.max_qubits,
            });
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            state: StateVector::new(num_qubits)?,
            table: GateTable::standard(),
            rng,
            config,
            measurements: vec![None; num_qubits],
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gate_table(&self) -> &GateTable {
        &self.table
    }

    /// Last recorded outcome of `qubit`.
    pub fn last_outcome(&self, qubit: usize) -> Option<u8> {
        self.measurements.get(qubit).copied().flatten()
    }

    // ── Single-Qubit Gates ────────────────────────────────────────────────

    pub fn h(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::H, qubit)
    }

    pub fn x(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::X, qubit)
    }

    pub fn y(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::Y, qubit)
    }

    pub fn z(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::Z, qubit)
    }

    pub fn s(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::S, qubit)
    }

    pub fn t(&mut self, qubit: usize) -> Result<&mut Self> {
        self.apply(GateKind::T, qubit)
    }

    /// Apply a gate from the table.
    pub fn apply(&mut self, kind: GateKind, qubit: usize) -> Result<&mut Self> {
        let gate = *self.table.descriptor(kind);
        trace!(gate = kind.name(), qubit, "apply");
        self.apply_descriptor(&gate, qubit)
    }

    /// Apply an arbitrary single-qubit descriptor.
    ///
    /// Takes the parallel path when the configuration asks for it at this width.
    pub fn apply_descriptor(&mut self, gate: &GateDescriptor, qubit: usize) -> Result<&mut Self> {
        let n = self.state.num_qubits();
        if self.config.use_parallel(n) {
            apply_single_qubit_parallel(&mut self.state, gate, qubit, self.config.parallel.workers)?;
        } else {
            apply_single_qubit(&mut self.state, gate, qubit)?;
        }
        Ok(self)
    }

    // ── Two-Qubit Gates ───────────────────────────────────────────────────

    pub fn cnot(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        trace!(control, target, "cnot");
        apply_cnot(&mut self.state, control, target)?;
        Ok(self)
    }

    // ── Measurement ───────────────────────────────────────────────────────

    /// Measure one qubit. Collapses the state vector.
    pub fn measure(&mut self, qubit: usize) -> Result<u8> {
        let outcome = measurement::measure(&mut self.state, qubit, &mut self.rng)?;
        self.measurements[qubit] = Some(outcome);
        Ok(outcome)
    }

    /// Measure every qubit, 0 first.
    pub fn measure_all(&mut self) -> Result<Vec<u8>> {
        (0..self.num_qubits()).map(|q| self.measure(q)).collect()
    }

    /// Measure every qubit and format the outcomes as a bit-string, qubit 0 first.
    pub fn measure_all_string(&mut self) -> Result<String> {
        Ok(self
            .measure_all()?
            .iter()
            .map(|&b| if b == 1 { '1' } else { '0' })
            .collect())
    }

    /// Probability of every basis state, without collapsing.
    pub fn probabilities(&self) -> Vec<f64> {
        self.state.probabilities()
    }

    pub fn qubit_probability_one(&self, qubit: usize) -> Result<f64> {
        self.state.marginal_probability_one(qubit)
    }

    // ── State Control ─────────────────────────────────────────────────────

    /// Restart the measurement RNG from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.config.seed = Some(seed);
    }

    /// Back to |0...0⟩ with no recorded outcomes. A seeded RNG restarts from its seed.
    pub fn reset(&mut self) {
        self.state.reset();
        self.measurements.fill(None);
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("measurements", &self.measurements)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        write!(f, "Measurements: [")?;
        for (i, m) in self.measurements.iter().enumerate() {
            match m {
                Some(bit) => write!(f, "q{i}={bit}")?,
                None => write!(f, "q{i}=?")?,
            }
            if i + 1 < self.measurements.len() {
                write!(f, ", ")?;
            }
        }
        writeln!(f, "]")
    }
}
