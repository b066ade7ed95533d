// SPDX-License-Identifier: MIT

//! Pattern compilation and simulation for row-sequence matching.
//!
//! Implements a mini-regex language over single-character row-variables.
//! Pattern text compiles through a tokenizer, a recursive-descent parser,
//! and a Thompson-style NFA construction; the compiled automaton is then
//! simulated against a row stream with per-variable guard predicates.
//!
//! # Pattern Syntax
//!
//! ```text
//! X         — Match one row accepted by variable X's guard
//! AB        — Match A then B (concatenation, left-associative)
//! A|B       — Match A or B (alternation, lowest precedence)
//! A*        — Match zero or more occurrences of A
//! A+        — Match one or more occurrences of A
//! A?        — Match zero or one occurrence of A
//! (…)       — Grouping
//! {…}       — Reserved (bounded repetition); always rejected
//! ```
//!
//! Any character that is not one of `( ) { } * + ? |` is a variable name,
//! including whitespace. Quantifiers bind tighter than concatenation, which
//! binds tighter than alternation.

pub mod guard;
pub mod lexer;
pub mod nfa;
pub mod parser;
pub mod sim;

use std::fmt;

pub use guard::{GuardError, GuardSet};
pub use nfa::{ConstructionError, Nfa};
pub use parser::SyntaxError;
pub use sim::{Match, MatchMode, Simulation};

/// Error from the full text-to-automaton compilation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern text failed to parse.
    Syntax(SyntaxError),
    /// The AST failed to compile into an automaton.
    Construction(ConstructionError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => e.fmt(f),
            Self::Construction(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            Self::Construction(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<ConstructionError> for CompileError {
    fn from(e: ConstructionError) -> Self {
        Self::Construction(e)
    }
}

/// Compiles pattern text straight to an automaton.
///
/// Convenience over [`parser::parse`] followed by [`nfa::compile`].
///
/// # Errors
///
/// Returns [`CompileError`] if the text fails to parse or the automaton
/// construction violates an invariant.
///
/// # Example
///
/// ```
/// use rowpattern::pattern::compile_pattern;
///
/// let nfa = compile_pattern("RZ*BZ*M")?;
/// assert_eq!(nfa.start(), 0);
/// # Ok::<(), rowpattern::pattern::CompileError>(())
/// ```
pub fn compile_pattern(text: &str) -> Result<Nfa, CompileError> {
    let ast = parser::parse(text)?;
    Ok(nfa::compile(&ast)?)
}
