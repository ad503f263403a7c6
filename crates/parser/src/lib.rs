//! Log grammars for `kvcheck`.
//!
//! Two kinds of log are understood:
//!
//! - **message logs**, one request or response per line, in one of two
//!   [`Dialect`]s; see [`message`];
//! - **transaction-record logs** written by the load generator, one
//!   completed operation per line; see [`record`].
//!
//! [`MessageReader`] and [`RecordReader`] classify whole logs line by line,
//! including the fault-injection annotations and monitor output both kinds
//! of log may contain.

pub mod dialect;
pub mod error;
mod grammar;
pub mod lexer;
pub mod line;
pub mod message;
pub mod record;

pub use dialect::{DemuxEncoding, Dialect, DialectMode};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{tokenize_with_text, Token, TokenKind};
pub use line::{parse_annotation, Line, MessageReader, Policy, RecordReader};
pub use message::parse_message;
pub use record::parse_record;
