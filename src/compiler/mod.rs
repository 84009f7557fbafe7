/// Circuit front-end.
///
/// Pipeline: source text → lexer → parser → `Program` → scheduler → executor
///
/// Errors carry source line numbers.
pub mod ir;
pub mod lexer;
pub mod parser;

pub use ir::{Instruction, Program, SingleGate, TwoQubitGate};
pub use parser::parse;

use crate::error::Result;

/// Lex and parse a source string.
pub fn parse_source(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    parser::parse(tokens)
}
