// SPDX-License-Identifier: MIT

//! Tokenizer for row-pattern strings.
//!
//! Splits pattern text like `RZ*BZ*M` or `(A|B)+C?` into a flat token
//! stream. Symbols map one-to-one onto token kinds; every other character
//! is a one-character variable name. There is no escaping mechanism and no
//! multi-character identifiers, so whitespace inside a pattern is itself a
//! variable name — a deliberate, documented limitation of the language.

/// The kind of a pattern token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A single-character row-variable name.
    Var,
    /// `(`
    GroupOpen,
    /// `)`
    GroupClose,
    /// `{` — reserved; the parser always rejects it.
    BraceOpen,
    /// `}` — reserved; the parser always rejects it.
    BraceClose,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Optional,
    /// `|`
    Alternation,
    /// End of input.
    End,
}

/// One pattern token. `ch` is meaningful only for [`TokenKind::Var`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// The variable character for `Var` tokens, `'\0'` otherwise.
    pub ch: char,
}

impl Token {
    const fn symbol(kind: TokenKind) -> Self {
        Self { kind, ch: '\0' }
    }
}

/// Lazy tokenizer over pattern text.
///
/// Produces one token per [`next_token`](Self::next_token) call and an
/// endless supply of `End` tokens once the input is exhausted. There are no
/// error conditions: any character is classifiable.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: std::str::Chars<'a>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a tokenizer over the full pattern text.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars(),
            pos: 0,
        }
    }

    /// Character offset of the next unread character, for error reporting.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the next token, or an `End` token once the input is consumed.
    pub fn next_token(&mut self) -> Token {
        let Some(c) = self.input.next() else {
            return Token::symbol(TokenKind::End);
        };
        self.pos += 1;
        match c {
            '(' => Token::symbol(TokenKind::GroupOpen),
            ')' => Token::symbol(TokenKind::GroupClose),
            '{' => Token::symbol(TokenKind::BraceOpen),
            '}' => Token::symbol(TokenKind::BraceClose),
            '*' => Token::symbol(TokenKind::Star),
            '+' => Token::symbol(TokenKind::Plus),
            '?' => Token::symbol(TokenKind::Optional),
            '|' => Token::symbol(TokenKind::Alternation),
            ch => Token {
                kind: TokenKind::Var,
                ch,
            },
        }
    }
}
