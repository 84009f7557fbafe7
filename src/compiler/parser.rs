/// Circuit parser: statements of tokens → `Program`.
///
/// Grammar (one statement per line, keywords case-insensitive):
///   program      := qreg? instruction*
///   qreg         := 'QREG' INT
///   instruction  := single | cnot | measure | other
///   single       := ('H'|'X'|'Y'|'Z'|'S'|'T') INT
///   cnot         := ('CNOT'|'CX') INT INT
///   measure      := ('MEASURE'|'M') INT
///   other        := WORD INT*
///
/// An `other` line with one operand becomes a single-qubit instruction with an
/// unrecognized gate, two operands a two-qubit one, and any other count an
/// `Unknown` instruction. Whether those are fatal is the driver's decision.
///
/// Qubit indices are not range-checked here; the register width may be
/// overridden at execution time.
use super::ir::{Instruction, Program, SingleGate, TwoQubitGate};
use super::lexer::{Spanned, Token};
use crate::core::gates::GateKind;
use crate::error::{Error, Result};

enum Item {
    Qreg(usize),
    Instr(Instruction),
}

// ── Public API ────────────────────────────────────────────────────────────

/// Parse lexer output into a `Program`.
pub fn parse(statements: Vec<Vec<Spanned>>) -> Result<Program> {
    let mut num_qubits = None;
    let mut instructions = Vec::with_capacity(statements.len());

    for stmt in &statements {
        let Some(first) = stmt.first() else { continue };
        match parse_statement(stmt)? {
            Item::Qreg(n) => {
                if num_qubits.is_some() {
                    return Err(parse_error(first.line, "only one QREG declaration is allowed"));
                }
                if !instructions.is_empty() {
                    return Err(parse_error(first.line, "QREG must come before any instruction"));
                }
                num_qubits = Some(n);
            }
            Item::Instr(instr) => instructions.push(instr),
        }
    }

    Ok(Program::new(num_qubits, instructions))
}

// ── Statement parsing ─────────────────────────────────────────────────────

fn parse_statement(tokens: &[Spanned]) -> Result<Item> {
    debug_assert!(!tokens.is_empty());
    let line = tokens[0].line;

    let mnemonic = match &tokens[0].token {
        Token::Word(w) => w.as_str(),
        Token::Int(n) => {
            return Err(parse_error(line, format!("expected an instruction, got '{n}'")));
        }
    };
    let operands = tokens[1..].iter().map(int_arg).collect::<Result<Vec<_>>>()?;

    // Exact operand count for known mnemonics.
    let check_argc = |expected: usize| -> Result<()> {
        if operands.len() == expected {
            Ok(())
        } else {
            let err = Error::operand_count(mnemonic.to_ascii_uppercase(), expected, operands.len());
            Err(parse_error(line, err.to_string()))
        }
    };

    let upper = mnemonic.to_ascii_uppercase();
    let item = match upper.as_str() {
        "QREG" => {
            check_argc(1)?;
            Item::Qreg(operands[0])
        }
        "CNOT" | "CX" => {
            check_argc(2)?;
            Item::Instr(Instruction::cnot(operands[0], operands[1]))
        }
        "MEASURE" | "M" => {
            check_argc(1)?;
            Item::Instr(Instruction::measure(operands[0]))
        }
        _ => match upper.parse::<GateKind>() {
            Ok(kind) => {
                check_argc(1)?;
                Item::Instr(Instruction::gate(kind, operands[0]))
            }
            Err(_) => Item::Instr(unrecognized(mnemonic, operands)),
        },
    };
    Ok(item)
}

/// Classify an unknown mnemonic by its operand count.
fn unrecognized(name: &str, operands: Vec<usize>) -> Instruction {
    let name = name.to_string();
    match operands.len() {
        1 => Instruction::Single {
            gate: SingleGate::Unrecognized(name),
            qubit: operands[0],
        },
        2 => Instruction::Two {
            gate: TwoQubitGate::Unrecognized(name),
            control: operands[0],
            target: operands[1],
        },
        _ => Instruction::Unknown { name, qubits: operands },
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn int_arg(s: &Spanned) -> Result<usize> {
    match s.token {
        Token::Int(n) => Ok(n),
        Token::Word(_) => Err(parse_error(
            s.line,
            format!(
                "expected qubit index (non-negative integer), got '{}'",
                s.token.display()
            ),
        )),
    }
}

fn parse_error(line: usize, msg: impl Into<String>) -> Error {
    Error::Parse { line, msg: msg.into() }
}

// ── Tests ─────────────────────────────────────────────────────────────────
