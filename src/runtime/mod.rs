/// Circuit runtime.
///
/// Sits above the front-end and drives the engine:
///   - scheduling: optional peephole optimization of the parsed program
///   - execution: in-order dispatch against one simulator, with per-instruction
///     validation and skip-or-stop handling of unsupported operations
///
/// Architecture:
///   source → compiler (lexer + parser + IR) → scheduler → executor → result
pub mod executor;
pub mod scheduler;

pub use executor::{execute, run, ExecError, ExecutionResult, MeasurementRecord};
pub use scheduler::{schedule, schedule_with, ScheduledProgram, SchedulerMetadata};
