//! Lexer for the metric definition language.
//!
//! Turns a definition string into an ordered sequence of typed lexemes.
//! Each token kind owns a regex matcher; at every position the matchers are
//! tried in declaration order and the first hit wins. Order matters: the
//! two-character filter operators (`&&`, `||`, `==`) must be recognized
//! before the single-character pipe, otherwise `||` would lex as two pipes.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Token matchers, in the priority order they are tried.
static MATCHERS: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    vec![
        (TokenKind::BinaryOperator, Regex::new(r"^[+\-*/]").unwrap()),
        (TokenKind::FilterOperator, Regex::new(r"^(?:&&|\|\||==)").unwrap()),
        (TokenKind::Pipe, Regex::new(r"^\|").unwrap()),
        (TokenKind::DoubleQuotedString, Regex::new(r#"^"([^"]*)""#).unwrap()),
        (TokenKind::SingleQuotedString, Regex::new(r"^'([^']*)'").unwrap()),
        (TokenKind::Comma, Regex::new(r"^,").unwrap()),
        (TokenKind::LeftParen, Regex::new(r"^\(").unwrap()),
        (TokenKind::RightParen, Regex::new(r"^\)").unwrap()),
        // Deliberately permissive: `100.` lexes as `100` and the stray dot
        // errors one character later.
        (TokenKind::Number, Regex::new(r"^[0-9]+(?:\.[0-9]+)?").unwrap()),
        (TokenKind::Identifier, Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap()),
    ]
});

/// The kind of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `+ - * /`
    BinaryOperator,
    /// `&& || ==`
    FilterOperator,
    /// `|` (apply a filter to a metric)
    Pipe,
    /// A double-quoted string literal (contents without quotes).
    DoubleQuotedString,
    /// A single-quoted string literal (contents without quotes).
    SingleQuotedString,
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// An integer or decimal number.
    Number,
    /// An identifier: metric, dimension, or maker name.
    Identifier,
}

impl TokenKind {
    /// True for string-literal kinds, whose `text` has the quotes stripped.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::DoubleQuotedString | TokenKind::SingleQuotedString
        )
    }
}

/// A single token produced by the lexer.
///
/// `text` carries the token's content with enclosing quotes stripped;
/// `consumed` is the number of source bytes the token covered, quotes
/// included, so position math stays consistent for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the definition string.
    pub offset: usize,
    /// Source bytes consumed, including stripped quotes.
    pub consumed: usize,
}

/// No viable token at a position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no token matches at byte {position}: '{remainder}'")]
pub struct LexError {
    /// Byte offset where lexing stopped.
    pub position: usize,
    /// The unconsumed tail of the input, for diagnostics.
    pub remainder: String,
}

pub type LexResult<T> = Result<T, LexError>;

/// Lex a metric definition into tokens.
///
/// Space and tab between tokens are skipped; any other unmatched character
/// (newlines included) fails with the offending position and suffix.
pub fn lex(input: &str) -> LexResult<Vec<Lexeme>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if trimmed.len() != rest.len() {
            pos += rest.len() - trimmed.len();
            continue;
        }

        match match_at(rest) {
            Some((kind, text, consumed)) => {
                tokens.push(Lexeme {
                    kind,
                    text,
                    offset: pos,
                    consumed,
                });
                pos += consumed;
            }
            None => {
                return Err(LexError {
                    position: pos,
                    remainder: rest.to_string(),
                })
            }
        }
    }

    Ok(tokens)
}

/// Try every matcher in priority order at the start of `rest`.
fn match_at(rest: &str) -> Option<(TokenKind, String, usize)> {
    for (kind, pattern) in MATCHERS.iter() {
        if let Some(caps) = pattern.captures(rest) {
            let whole = caps.get(0)?;
            let text = match caps.get(1) {
                Some(inner) => inner.as_str().to_string(),
                None => whole.as_str().to_string(),
            };
            return Some((*kind, text, whole.len()));
        }
    }
    None
}
