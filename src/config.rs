//! Engine configuration (`qubitvec.toml`).
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! max_qubits = 24
//! seed = 7
//!
//! [parallel]
//! workers = 8
//! min_qubits = 16
//!
//! [optimizer]
//! enabled = true
//! mode = "fixed_point"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration, passed to the simulator at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Widest register the simulator will allocate.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Seed for measurement sampling. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// When and how wide to run the parallel gate path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker threads per parallel gate (default: available parallelism)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Registers narrower than this always use the serial path.
    #[serde(default = "default_min_qubits")]
    pub min_qubits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub mode: OptimizeMode,
}

/// How many cancellation passes the peephole optimizer makes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMode {
    /// One pass. Pairs exposed by a cancellation are left alone.
    #[default]
    SinglePass,
    /// Repeat passes until a pass removes nothing.
    FixedPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            seed: None,
            parallel: ParallelConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            min_qubits: default_min_qubits(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: OptimizeMode::default(),
        }
    }
}

fn default_max_qubits() -> usize {
    28
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn default_min_qubits() -> usize {
    14
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("failed to serialize config: {e}")))
    }

    /// True if a register of `num_qubits` should take the parallel gate path.
    pub fn use_parallel(&self, num_qubits: usize) -> bool {
        self.parallel.workers > 1 && num_qubits >= self.parallel.min_qubits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.max_qubits, 28);
        assert_eq!(cfg.parallel.min_qubits, 14);
        assert!(cfg.parallel.workers >= 1);
        assert!(cfg.optimizer.enabled);
        assert_eq!(cfg.optimizer.mode, OptimizeMode::SinglePass);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn test_partial_config() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            seed = 42

            [parallel]
            workers = 3

            [optimizer]
            mode = "fixed_point"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.parallel.workers, 3);
        assert_eq!(cfg.parallel.min_qubits, 14);
        assert!(cfg.optimizer.enabled);
        assert_eq!(cfg.optimizer.mode, OptimizeMode::FixedPoint);
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let err = EngineConfig::from_toml_str("max_qubits = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = EngineConfig::from_toml_str("[optimizer]\nmode = \"twice\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/qubitvec.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("nonexistent")));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut cfg = EngineConfig::default();
        cfg.seed = Some(9);
        cfg.optimizer.mode = OptimizeMode::FixedPoint;
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_use_parallel() {
        let mut cfg = EngineConfig::default();
        cfg.parallel.workers = 4;
        cfg.parallel.min_qubits = 10;
        assert!(!cfg.use_parallel(9));
        assert!(cfg.use_parallel(10));
        cfg.parallel.workers = 1;
        assert!(!cfg.use_parallel(20));
    }
}
