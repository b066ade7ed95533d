// SPDX-License-Identifier: MIT

//! Recursive descent parser for row-pattern strings.
//!
//! Parses patterns like `RZ*BZ*M` or `(A|B)+C?` into an owned AST under the
//! grammar:
//!
//! ```text
//! pattern ::= branch ('|' branch)*
//! branch  ::= piece+
//! piece   ::= atom quantifier?
//! atom    ::= VAR | '(' pattern ')'
//! quantifier ::= '*' | '+' | '?'
//! ```
//!
//! Alternation and concatenation are left-associative: a chain of N
//! branches or pieces builds a left-leaning binary tree. Bounded repetition
//! (`{m,n}`) is reserved syntax and always rejected. There is no recovering
//! parse mode: any error aborts compilation outright.

use std::fmt;

use super::lexer::{Lexer, Token, TokenKind};

/// A parsed pattern expression.
///
/// `Var` nodes are leaves; binary combinators own exactly two children and
/// quantifiers exactly one, so the tree shape mirrors the grammar directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// A single row-variable.
    Var(char),
    /// Two sub-patterns matched in sequence.
    Concat(Box<Ast>, Box<Ast>),
    /// Either of two sub-patterns.
    Alt(Box<Ast>, Box<Ast>),
    /// Zero or more repetitions.
    Star(Box<Ast>),
    /// One or more repetitions.
    Plus(Box<Ast>),
    /// Zero or one occurrence.
    Optional(Box<Ast>),
}

/// Error returned when a pattern string fails to parse.
///
/// Always fatal to compilation; no partial AST is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// `{` or `}` anywhere in the pattern — bounded repetition is reserved
    /// and unsupported.
    BoundedRepetition {
        /// Character offset of the brace.
        position: usize,
    },
    /// A `(` group was never closed.
    UnclosedGroup {
        /// Character offset where `)` was expected.
        position: usize,
    },
    /// A token that cannot begin an atom.
    UnexpectedToken {
        /// Character offset of the offending token.
        position: usize,
        /// The token kind found there.
        found: TokenKind,
    },
    /// The pattern ended where an atom was required.
    UnexpectedEnd {
        /// Character offset of the end of input.
        position: usize,
    },
    /// Input remained after a complete pattern (e.g. a stray `)`).
    TrailingInput {
        /// Character offset of the first unconsumed token.
        position: usize,
    },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundedRepetition { position } => write!(
                f,
                "syntax error at position {position}: bounded repetition {{m,n}} is not supported"
            ),
            Self::UnclosedGroup { position } => {
                write!(f, "syntax error at position {position}: expected ')'")
            }
            Self::UnexpectedToken { position, found } => write!(
                f,
                "syntax error at position {position}: unexpected {found:?} where a variable or group was expected"
            ),
            Self::UnexpectedEnd { position } => {
                write!(f, "syntax error at position {position}: unexpected end of pattern")
            }
            Self::TrailingInput { position } => {
                write!(f, "syntax error at position {position}: trailing input after pattern")
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Parses a full pattern string into an [`Ast`].
///
/// Consumes the entire token stream; anything left over after a complete
/// pattern is [`SyntaxError::TrailingInput`].
///
/// # Errors
///
/// Returns [`SyntaxError`] if the pattern is malformed.
///
/// # Examples
///
/// ```
/// use rowpattern::pattern::parser::{parse, Ast};
///
/// let ast = parse("A|B").unwrap();
/// assert!(matches!(ast, Ast::Alt(_, _)));
/// ```
pub fn parse(input: &str) -> Result<Ast, SyntaxError> {
    let mut parser = Parser::new(input);
    let ast = parser.parse_pattern()?;
    let tail = parser.peek();
    if tail.kind == TokenKind::End {
        Ok(ast)
    } else {
        Err(SyntaxError::TrailingInput {
            position: parser.position(),
        })
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: None,
        }
    }

    /// Offset of the token currently in the lookahead slot (or of the next
    /// unread character when the slot is empty).
    fn position(&self) -> usize {
        // The lexer has advanced past the buffered token, so back up by one.
        self.lexer
            .position()
            .saturating_sub(usize::from(self.lookahead.is_some()))
    }

    /// Fills the single lookahead slot without consuming it. Idempotent.
    fn peek(&mut self) -> Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lexer.next_token());
        }
        self.lookahead.unwrap_or(Token {
            kind: TokenKind::End,
            ch: '\0',
        })
    }

    /// Returns the next token, clearing the lookahead slot if it was filled.
    fn consume(&mut self) -> Token {
        self.lookahead
            .take()
            .unwrap_or_else(|| self.lexer.next_token())
    }

    // pattern ::= branch ('|' branch)*
    fn parse_pattern(&mut self) -> Result<Ast, SyntaxError> {
        let mut left = self.parse_branch()?;
        while self.peek().kind == TokenKind::Alternation {
            self.consume();
            let right = self.parse_branch()?;
            left = Ast::Alt(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // branch ::= piece+
    fn parse_branch(&mut self) -> Result<Ast, SyntaxError> {
        let mut left = self.parse_piece()?;
        loop {
            match self.peek().kind {
                TokenKind::Var | TokenKind::GroupOpen => {
                    let right = self.parse_piece()?;
                    left = Ast::Concat(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // piece ::= atom quantifier?
    fn parse_piece(&mut self) -> Result<Ast, SyntaxError> {
        let atom = self.parse_atom()?;
        match self.peek().kind {
            TokenKind::BraceOpen | TokenKind::BraceClose => Err(SyntaxError::BoundedRepetition {
                position: self.position(),
            }),
            TokenKind::Star => {
                self.consume();
                Ok(Ast::Star(Box::new(atom)))
            }
            TokenKind::Plus => {
                self.consume();
                Ok(Ast::Plus(Box::new(atom)))
            }
            TokenKind::Optional => {
                self.consume();
                Ok(Ast::Optional(Box::new(atom)))
            }
            _ => Ok(atom),
        }
    }

    // atom ::= VAR | '(' pattern ')'
    fn parse_atom(&mut self) -> Result<Ast, SyntaxError> {
        let position = self.position();
        let tok = self.consume();
        match tok.kind {
            TokenKind::Var => Ok(Ast::Var(tok.ch)),
            TokenKind::GroupOpen => {
                let inner = self.parse_pattern()?;
                let close = self.consume();
                if close.kind == TokenKind::GroupClose {
                    Ok(inner)
                } else {
                    Err(SyntaxError::UnclosedGroup {
                        position: self.position(),
                    })
                }
            }
            TokenKind::BraceOpen | TokenKind::BraceClose => {
                Err(SyntaxError::BoundedRepetition { position })
            }
            TokenKind::End => Err(SyntaxError::UnexpectedEnd { position }),
            found => Err(SyntaxError::UnexpectedToken { position, found }),
        }
    }
}
