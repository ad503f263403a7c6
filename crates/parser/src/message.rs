//! Winnow grammar for client message lines.
//!
//! ```text
//! message   = INTEGER WS event_type WS "{" fields "}"
//! fields    = id WS src WS dest WS demux WS key WS value WS (timestamp WS)? ok
//! id        = ID_FIELD ":" INTEGER                 -- likewise src, dest, timestamp
//! demux     = DEMUX_FIELD ":" (INTEGER | IDENT)    -- per dialect encoding
//! key       = KEY_FIELD ":" "[" INTEGER (WS INTEGER)* "]"
//! value     = VALUE_FIELD ":" "[" (INTEGER (WS INTEGER)*)? "]"
//! ok        = OK_FIELD ":" ("true" | "false")
//! ```
//!
//! Field names come from the [`Dialect`]; the event type is parsed and
//! dropped.

use kvcheck_core::history::types::{ClientEvent, MessageKind};
use winnow::combinator::opt;
use winnow::prelude::*;
use winnow::token::{literal, take_while};
use winnow::ModalResult;

use crate::dialect::{DemuxEncoding, Dialect};
use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{boolean, bytes, field, inline_ws, integer, key_bytes, parse_line, word};

/// Parse one message line in the given dialect.
///
/// # Errors
///
/// Returns a [`ParseError`] of kind [`ParseErrorKind::Message`] when the
/// line does not follow the dialect's grammar. The error's line number is
/// always 1; readers set the real one.
pub fn parse_message(dialect: &Dialect, line: &str) -> Result<ClientEvent, ParseError> {
    parse_line(line, ParseErrorKind::Message, |input: &mut &str| {
        message(dialect, input)
    })
}

fn demux(dialect: &Dialect, input: &mut &str) -> ModalResult<MessageKind> {
    let text = match dialect.demux {
        DemuxEncoding::Numeric => {
            take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?
        }
        DemuxEncoding::Named => {
            take_while(1.., |c: char| c.is_ascii_alphanumeric()).parse_next(input)?
        }
    };
    Ok(dialect.decode_demux(text))
}

fn message(dialect: &Dialect, input: &mut &str) -> ModalResult<ClientEvent> {
    let time = integer.parse_next(input)?;
    inline_ws.parse_next(input)?;
    word.parse_next(input)?;
    inline_ws.parse_next(input)?;
    literal("{").parse_next(input)?;

    let id = field(input, dialect.id, integer)?;
    inline_ws.parse_next(input)?;
    let src = field(input, dialect.src, integer)?;
    inline_ws.parse_next(input)?;
    let dest = field(input, dialect.dest, integer)?;
    inline_ws.parse_next(input)?;
    let kind = field(input, dialect.demux_key, |i: &mut &str| demux(dialect, i))?;
    inline_ws.parse_next(input)?;
    let key = field(input, dialect.key, key_bytes)?;
    inline_ws.parse_next(input)?;
    let value = field(input, dialect.value, bytes)?;
    inline_ws.parse_next(input)?;
    let version = opt(|i: &mut &str| -> ModalResult<u64> {
        let version = field(i, dialect.timestamp, integer)?;
        inline_ws.parse_next(i)?;
        Ok(version)
    })
    .parse_next(input)?;
    let ok = field(input, dialect.ok, boolean)?;
    literal("}").parse_next(input)?;

    Ok(ClientEvent {
        time,
        id,
        src,
        dest,
        kind,
        key,
        value,
        version,
        ok,
    })
}
