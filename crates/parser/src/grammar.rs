//! Leaf parsers shared by the message and record grammars.

use kvcheck_core::history::types::Bytes;
use winnow::ascii::dec_uint;
use winnow::combinator::{alt, separated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{literal, take_while};
use winnow::ModalResult;

use crate::error::{ParseError, ParseErrorKind};

/// Inline whitespace: spaces and tabs only (no newlines).
pub fn inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

/// Optional inline whitespace.
pub fn opt_inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

/// A non-negative decimal integer.
pub fn integer(input: &mut &str) -> ModalResult<u64> {
    dec_uint.parse_next(input)
}

/// One or more ASCII letters.
pub fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// `"[" (INTEGER (WS INTEGER)*)? "]"`
pub fn bytes(input: &mut &str) -> ModalResult<Bytes> {
    literal("[").parse_next(input)?;
    let words: Vec<u64> = separated(0.., integer, inline_ws).parse_next(input)?;
    literal("]").parse_next(input)?;
    Ok(Bytes(words))
}

/// `"[" INTEGER (WS INTEGER)* "]"`
pub fn key_bytes(input: &mut &str) -> ModalResult<Bytes> {
    literal("[").parse_next(input)?;
    let words: Vec<u64> = separated(1.., integer, inline_ws).parse_next(input)?;
    literal("]").parse_next(input)?;
    Ok(Bytes(words))
}

pub fn boolean(input: &mut &str) -> ModalResult<bool> {
    alt((literal("true").value(true), literal("false").value(false))).parse_next(input)
}

/// `name ":" value`, reporting the field name when it is missing.
pub fn field<'i, O>(
    input: &mut &'i str,
    name: &'static str,
    mut value: impl Parser<&'i str, O, ErrMode<ContextError>>,
) -> ModalResult<O> {
    literal(name)
        .context(StrContext::Expected(StrContextValue::StringLiteral(name)))
        .parse_next(input)?;
    literal(":").parse_next(input)?;
    value
        .context(StrContext::Label("field value"))
        .parse_next(input)
}

/// Run `parser` over the whole of `line`, allowing trailing whitespace.
///
/// The error column points at the first byte the parser could not consume.
pub fn parse_line<O>(
    line: &str,
    kind: ParseErrorKind,
    mut parser: impl FnMut(&mut &str) -> ModalResult<O>,
) -> Result<O, ParseError> {
    let mut stream: &str = line;
    let result = parser(&mut stream).and_then(|value| {
        opt_inline_ws.parse_next(&mut stream)?;
        if stream.is_empty() {
            Ok(value)
        } else {
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    });
    result.map_err(|e| {
        let consumed = line.len().saturating_sub(stream.len());
        ParseError::at(kind, describe(&e, stream), line, consumed)
    })
}

fn describe(error: &ErrMode<ContextError>, rest: &str) -> String {
    let detail = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string(),
        ErrMode::Incomplete(_) => String::new(),
    };
    if !detail.is_empty() {
        return detail.replace('\n', "; ");
    }
    rest.chars().next().map_or_else(
        || "unexpected end of line".to_string(),
        |c| format!("unexpected `{c}`"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        let mut input = "[1 2 3] rest";
        assert_eq!(bytes(&mut input).unwrap(), Bytes::from([1, 2, 3]));
        assert_eq!(input, " rest");
        assert_eq!(bytes(&mut "[]").unwrap(), Bytes::new());
        assert!(key_bytes(&mut "[]").is_err());
        assert!(bytes(&mut "[1,2]").is_err());
    }

    #[test]
    fn test_field() {
        let mut input = "id:42";
        assert_eq!(field(&mut input, "id", integer).unwrap(), 42);
        assert!(field(&mut "Id:42", "id", integer).is_err());
    }

    #[test]
    fn test_parse_line_rejects_trailing_input() {
        assert_eq!(
            parse_line("12  ", ParseErrorKind::Record, integer).unwrap(),
            12
        );
        let err = parse_line("12 x", ParseErrorKind::Record, integer).unwrap_err();
        assert_eq!(err.column, 4);
        assert_eq!(err.message, "unexpected `x`");
    }
}
