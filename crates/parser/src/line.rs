//! Line classification and the per-run readers.
//!
//! Logs mix operation lines with fault-injection annotations, JSON lines
//! from the resource monitor and free-form output. A reader classifies each
//! line into a [`Line`], keeping the state a run needs: the line number, the
//! locked dialect for message logs and the next operation id for record
//! logs.

use kvcheck_core::history::types::{Annotation, ClientEvent, Operation};
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{literal, rest};
use winnow::ModalResult;

use crate::dialect::{Dialect, DialectMode};
use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{inline_ws, integer, parse_line};
use crate::message::parse_message;
use crate::record::{looks_like_record, parse_record};

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty or whitespace only.
    Blank,
    Event(ClientEvent),
    Record(Operation),
    Annotation(Annotation),
    /// A JSON object line from the resource monitor, kept verbatim.
    Monitor(&'a str),
    /// Anything else, kept verbatim.
    Passthrough(&'a str),
}

/// What a reader does with a line it cannot classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Return the first such line as an error.
    Strict,
    /// Return it as [`Line::Passthrough`].
    #[default]
    BestEffort,
}

fn node_annotation(input: &mut &str) -> ModalResult<Annotation> {
    literal("Node").parse_next(input)?;
    inline_ws.parse_next(input)?;
    let node = integer.parse_next(input)?;
    inline_ws.parse_next(input)?;
    alt((
        move |i: &mut &str| -> ModalResult<Annotation> {
            literal("failed while in mode").parse_next(i)?;
            inline_ws.parse_next(i)?;
            let mode = rest.parse_next(i)?;
            Ok(Annotation::NodeFailed {
                node,
                mode: mode.trim_end().to_string(),
            })
        },
        literal("recovered").value(Annotation::NodeRecovered { node }),
    ))
    .parse_next(input)
}

fn partition_annotation(input: &mut &str) -> ModalResult<Annotation> {
    literal("Partition").parse_next(input)?;
    inline_ws.parse_next(input)?;
    alt((
        literal("created").value(Annotation::PartitionCreated),
        literal("recovered").value(Annotation::PartitionRecovered),
    ))
    .parse_next(input)
}

/// Recognise a fault-injection annotation.
#[must_use]
pub fn parse_annotation(line: &str) -> Option<Annotation> {
    parse_line(line, ParseErrorKind::Message, |input: &mut &str| {
        alt((node_annotation, partition_annotation)).parse_next(input)
    })
    .ok()
}

/// Classify the lines every log may contain. Returns `None` for lines the
/// caller has to parse itself.
fn classify_common(text: &str) -> Option<Line<'_>> {
    if text.trim().is_empty() {
        return Some(Line::Blank);
    }
    if text.starts_with('{') {
        return Some(Line::Monitor(text));
    }
    parse_annotation(text).map(Line::Annotation)
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Reader for client message logs.
#[derive(Debug, Clone)]
pub struct MessageReader {
    mode: DialectMode,
    policy: Policy,
    line: usize,
}

impl MessageReader {
    #[must_use]
    pub const fn new(mode: DialectMode, policy: Policy) -> Self {
        Self {
            mode,
            policy,
            line: 0,
        }
    }

    /// The dialect in use, once fixed or detected.
    #[must_use]
    pub const fn dialect(&self) -> Option<Dialect> {
        match self.mode {
            DialectMode::Fixed(dialect) => Some(dialect),
            DialectMode::Auto => None,
        }
    }

    /// Number of lines read so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line
    }

    /// Classify the next line of the log.
    ///
    /// # Errors
    ///
    /// Under [`Policy::Strict`], a line that is neither a message in the
    /// reader's dialect nor one of the common line kinds.
    pub fn read<'a>(&mut self, line: &'a str) -> Result<Line<'a>, ParseError> {
        self.line += 1;
        let text = strip_line_ending(line);
        if let Some(common) = classify_common(text) {
            return Ok(common);
        }

        let mode = self.mode;
        let result = match mode {
            DialectMode::Fixed(dialect) => self.parse_fixed(dialect, text),
            DialectMode::Auto => self.parse_detected(text),
        };

        match result {
            Ok(event) => Ok(Line::Event(event)),
            Err(err) => self.reject(text, err.with_line(self.line)),
        }
    }

    fn parse_detected(&mut self, text: &str) -> Result<ClientEvent, ParseError> {
        let Some(dialect) = Dialect::detect(text) else {
            return Err(ParseError::at(
                ParseErrorKind::Message,
                "not a message line".to_string(),
                text,
                0,
            ));
        };
        let event = parse_message(&dialect, text)?;
        tracing::debug!(dialect = dialect.name, line = self.line, "dialect detected");
        self.mode = DialectMode::Fixed(dialect);
        Ok(event)
    }

    fn parse_fixed(&self, dialect: Dialect, text: &str) -> Result<ClientEvent, ParseError> {
        parse_message(&dialect, text).map_err(|err| match Dialect::detect(text) {
            Some(other) if other != dialect => ParseError {
                kind: ParseErrorKind::DialectMismatch,
                message: format!(
                    "{} dialect line in a {} dialect log",
                    other.name, dialect.name
                ),
                line: self.line,
                column: 1,
            },
            _ => err,
        })
    }

    fn reject<'a>(&self, text: &'a str, err: ParseError) -> Result<Line<'a>, ParseError> {
        if err.kind == ParseErrorKind::DialectMismatch {
            tracing::warn!(line = self.line, "{}", err.message);
        }
        match self.policy {
            Policy::Strict => Err(err),
            Policy::BestEffort => {
                tracing::trace!(line = self.line, "passing through unparsed line");
                Ok(Line::Passthrough(text))
            }
        }
    }
}

impl Default for MessageReader {
    fn default() -> Self {
        Self::new(DialectMode::Auto, Policy::BestEffort)
    }
}

/// Reader for transaction-record logs. Operation ids are the 0-based index
/// of the record among the record lines.
#[derive(Debug, Clone, Default)]
pub struct RecordReader {
    next_id: u64,
    line: usize,
}

impl RecordReader {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            line: 0,
        }
    }

    /// Number of lines read so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line
    }

    /// Classify the next line of the log.
    ///
    /// # Errors
    ///
    /// A line that starts with two integers but is not a well-formed record.
    pub fn read<'a>(&mut self, line: &'a str) -> Result<Line<'a>, ParseError> {
        self.line += 1;
        let text = strip_line_ending(line);
        if let Some(common) = classify_common(text) {
            return Ok(common);
        }
        if looks_like_record(text) {
            let op = parse_record(self.next_id, text).map_err(|err| err.with_line(self.line))?;
            self.next_id += 1;
            return Ok(Line::Record(op));
        }
        tracing::trace!(line = self.line, "skipping non-record line");
        Ok(Line::Passthrough(text))
    }
}
