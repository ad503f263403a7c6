//! Logos-based lexer for client message lines.
//!
//! The lexer does not validate a line. It is used to look at the shape of a
//! line cheaply, for example to find the first field name inside the braces
//! and so tell the two message dialects apart before running the grammar.
//!
//! ```text
//! 1042 received {id:3 src:0 dest:2 demuxKey:1 key:[5] value:[] ok:true}
//! ```

use core::ops::Range;

/// All token kinds produced by the message lexer.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(::logos::Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    /// Field separator `:`.
    #[token(":")]
    Colon,

    /// A field name, event type or named demultiplex key.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// An integer literal: one or more ASCII digits.
    #[regex(r"[0-9]+")]
    Integer,

    /// A newline (`\n` or `\r\n`).
    #[regex(r"\r?\n")]
    Newline,

    /// Spaces or tabs.
    #[regex(r"[ \t]+")]
    Whitespace,
}

/// A single token with its kind and the byte-offset span in the source.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range `start..end` into the original input string.
    pub span: Range<usize>,
}

/// Tokenize `input` and return tokens paired with their source text slices.
///
/// Characters the lexer cannot recognise are silently skipped.
#[must_use]
pub fn tokenize_with_text(input: &str) -> Vec<(Token, &str)> {
    use logos::Logos as _;
    TokenKind::lexer(input)
        .spanned()
        .filter_map(|(result, span)| {
            result.ok().map(|kind| {
                let text = &input[span.clone()];
                (Token { kind, span }, text)
            })
        })
        .collect()
}

/// The name of the first field inside the braces of a message line:
/// the identifier following the first `{`, if it is followed by `:`.
#[must_use]
pub fn first_field_name(line: &str) -> Option<&str> {
    let tokens = tokenize_with_text(line);
    let brace = tokens
        .iter()
        .position(|(token, _)| token.kind == TokenKind::BraceOpen)?;
    match tokens.get(brace + 1..brace + 3)? {
        [(name, text), (colon, _)]
            if name.kind == TokenKind::Ident && colon.kind == TokenKind::Colon =>
        {
            Some(*text)
        }
        _ => None,
    }
}
