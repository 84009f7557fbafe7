pub mod aligned;
pub mod complex;
pub mod gates;
pub mod measurement;
pub mod parallel;
pub mod simulator;
pub mod state;

// Convenience re-exports for library users
pub use complex::Complex;
pub use gates::{GateDescriptor, GateKind, GateTable};
pub use simulator::Simulator;
pub use state::StateVector;
