//! Winnow grammar for transaction-record lines written by the load
//! generator, one per completed (or abandoned) operation.
//!
//! ```text
//! record  = INTEGER WS INTEGER WS kind WS bytes WS bytes WS INTEGER WS result
//! kind    = "read" | "write"
//! result  = "true" | "success" | "false" | "error" | "unknown"
//! ```
//!
//! Fields are start time, end time, kind, key, value, version and result.

use kvcheck_core::history::types::{OpKind, Operation, Outcome};
use winnow::combinator::{alt, peek};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;
use winnow::ModalResult;

use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{bytes, inline_ws, integer, parse_line};

/// Parse one record line into an operation with the given id.
///
/// # Errors
///
/// Returns a [`ParseError`] of kind [`ParseErrorKind::Record`] when the line
/// is not a well-formed record.
pub fn parse_record(id: u64, line: &str) -> Result<Operation, ParseError> {
    parse_line(line, ParseErrorKind::Record, |input: &mut &str| {
        record(id, input)
    })
}

/// Whether `line` starts like a record: two integers separated by
/// whitespace. Such lines must parse as records.
#[must_use]
pub fn looks_like_record(line: &str) -> bool {
    let mut input = line;
    (integer, inline_ws, integer)
        .parse_next(&mut input)
        .is_ok()
}

fn op_kind(input: &mut &str) -> ModalResult<OpKind> {
    // followed by whitespace, so `reads` is not taken for `read`
    alt((
        (literal("read"), peek(inline_ws)).value(OpKind::Read),
        (literal("write"), peek(inline_ws)).value(OpKind::Write),
    ))
    .context(StrContext::Expected(StrContextValue::StringLiteral("read")))
    .context(StrContext::Expected(StrContextValue::StringLiteral("write")))
    .parse_next(input)
}

fn outcome(input: &mut &str) -> ModalResult<Outcome> {
    alt((
        literal("true").value(Outcome::Success),
        literal("success").value(Outcome::Success),
        literal("false").value(Outcome::Failure),
        literal("error").value(Outcome::Failure),
        literal("unknown").value(Outcome::Unknown),
    ))
    .context(StrContext::Label("result"))
    .parse_next(input)
}

fn record(id: u64, input: &mut &str) -> ModalResult<Operation> {
    let start = integer.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let end = integer.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let kind = op_kind.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let key = bytes.context(StrContext::Label("key")).parse_next(input)?;
    inline_ws.parse_next(input)?;
    let value = bytes.context(StrContext::Label("value")).parse_next(input)?;
    inline_ws.parse_next(input)?;
    let version = integer
        .context(StrContext::Label("version"))
        .parse_next(input)?;
    inline_ws.parse_next(input)?;
    let outcome = outcome.parse_next(input)?;

    Ok(Operation {
        id,
        kind,
        key,
        value,
        start,
        end,
        version: Some(version),
        outcome,
    })
}
