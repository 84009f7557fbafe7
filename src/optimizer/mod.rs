/// Circuit optimizer.
///
/// Shortens an instruction sequence before execution by removing pairs of
/// identical self-inverse gates (H·H, X·X, Y·Y, Z·Z) that are adjacent on
/// their qubit's timeline. The resulting circuit is equivalent; measurement
/// statistics are unchanged.
///
/// The scan runs once by default or repeats to a fixed point, see
/// [`OptimizeMode`](crate::config::OptimizeMode).
pub mod peephole;

pub use peephole::{optimize, OptimizationStats};
