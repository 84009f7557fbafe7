/// Circuit source lexer.
///
/// The language is line-oriented: one instruction per line, tokens separated
/// by whitespace. Comments begin with `//` or `#` and run to end of line.
///
/// Only two token shapes exist:
///   - words: a letter or `_`, then letters, digits or `_` (`H`, `cnot`, `my_gate`)
///   - non-negative integer literals (`0`, `17`)
///
/// Keyword recognition is the parser's job; anything else (`-1`, `1.5`, `q[0]`)
/// is a lex error.
use crate::error::{Error, Result};

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Int(usize),
}

impl Token {
    /// Source form, for error messages.
    pub fn display(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Int(n)  => n.to_string(),
        }
    }
}

// ── Spanned token ─────────────────────────────────────────────────────────

/// A token annotated with its source line number (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

// ── Public API ────────────────────────────────────────────────────────────

/// Tokenize source text into statements, one per non-empty line.
pub fn tokenize(source: &str) -> Result<Vec<Vec<Spanned>>> {
    let mut statements: Vec<Vec<Spanned>> = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_num = idx + 1;

        let content = strip_comment(line).trim();
        if content.is_empty() {
            continue;
        }

        let tokens = content
            .split_whitespace()
            .map(|word| {
                lex_word(word, line_num).map(|token| Spanned { token, line: line_num })
            })
            .collect::<Result<Vec<_>>>()?;
        statements.push(tokens);
    }

    Ok(statements)
}

// ── Internal helpers ──────────────────────────────────────────────────────

/// Cut the line at the earlier of `//` and `#`.
fn strip_comment(line: &str) -> &str {
    let line = line.find("//").map_or(line, |p| &line[..p]);
    line.find('#').map_or(line, |p| &line[..p])
}

fn lex_word(word: &str, line: usize) -> Result<Token> {
    if word.bytes().all(|b| b.is_ascii_digit()) {
        return word.parse::<usize>().map(Token::Int).map_err(|_| Error::Lex {
            line,
            msg: format!("integer '{word}' is too large"),
        });
    }

    let mut chars = word.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(Token::Word(word.to_string()));
    }

    Err(Error::Lex {
        line,
        msg: format!("unrecognized token '{word}'"),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
