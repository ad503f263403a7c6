//! Message-line dialects.
//!
//! The store under test has logged client messages in two spellings over
//! its lifetime. They share one grammar and differ only in field names and
//! in how the demultiplex key is written, so a [`Dialect`] is a plain
//! descriptor that the grammar in [`message`](crate::message) is
//! parameterised by.

use kvcheck_core::history::types::{ClientEvent, MessageKind};

use crate::lexer::first_field_name;

/// How the demultiplex key of a message is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxEncoding {
    /// `1` read request, `2` write request, `3` read response, `4` write response.
    Numeric,
    /// `clientReadRequest`, `clientWriteRequest`, `clientReadResponse`,
    /// `clientWriteResponse`.
    Named,
}

/// Field names and demultiplex encoding of one message dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    pub id: &'static str,
    pub src: &'static str,
    pub dest: &'static str,
    pub demux_key: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub timestamp: &'static str,
    pub ok: &'static str,
    pub demux: DemuxEncoding,
}

const NAMED_KINDS: [(&str, MessageKind); 4] = [
    ("clientReadRequest", MessageKind::ReadRequest),
    ("clientWriteRequest", MessageKind::WriteRequest),
    ("clientReadResponse", MessageKind::ReadResponse),
    ("clientWriteResponse", MessageKind::WriteResponse),
];

impl Dialect {
    /// Lower-case field names, numeric demultiplex keys.
    pub const NUMERIC: Self = Self {
        name: "numeric",
        id: "id",
        src: "src",
        dest: "dest",
        demux_key: "demuxKey",
        key: "key",
        value: "value",
        timestamp: "timestamp",
        ok: "ok",
        demux: DemuxEncoding::Numeric,
    };

    /// Capitalised field names, named demultiplex keys.
    pub const NAMED: Self = Self {
        name: "named",
        id: "Id",
        src: "Src",
        dest: "Dest",
        demux_key: "DemuxKey",
        key: "Key",
        value: "Value",
        timestamp: "Timestamp",
        ok: "Ok",
        demux: DemuxEncoding::Named,
    };

    /// Guess the dialect of a message line from its first field name.
    #[must_use]
    pub fn detect(line: &str) -> Option<Self> {
        match first_field_name(line)? {
            name if name == Self::NUMERIC.id => Some(Self::NUMERIC),
            name if name == Self::NAMED.id => Some(Self::NAMED),
            _ => None,
        }
    }

    /// Map the spelling of a demultiplex key to a message kind. Spellings
    /// this dialect does not know map to [`MessageKind::Other`].
    #[must_use]
    pub fn decode_demux(&self, text: &str) -> MessageKind {
        let known = match self.demux {
            DemuxEncoding::Numeric => match text {
                "1" => Some(MessageKind::ReadRequest),
                "2" => Some(MessageKind::WriteRequest),
                "3" => Some(MessageKind::ReadResponse),
                "4" => Some(MessageKind::WriteResponse),
                _ => None,
            },
            DemuxEncoding::Named => NAMED_KINDS
                .iter()
                .find(|(name, _)| *name == text)
                .map(|(_, kind)| kind.clone()),
        };
        known.unwrap_or_else(|| MessageKind::Other(text.to_string()))
    }

    #[must_use]
    pub fn encode_demux(&self, kind: &MessageKind) -> String {
        let index = match kind {
            MessageKind::ReadRequest => 0,
            MessageKind::WriteRequest => 1,
            MessageKind::ReadResponse => 2,
            MessageKind::WriteResponse => 3,
            MessageKind::Other(text) => return text.clone(),
        };
        match self.demux {
            DemuxEncoding::Numeric => (index + 1).to_string(),
            DemuxEncoding::Named => NAMED_KINDS[index].0.to_string(),
        }
    }

    /// Render `event` as a message line of this dialect, without a line
    /// terminator. The version is written only when the event has one.
    #[must_use]
    pub fn format_event(&self, event_type: &str, event: &ClientEvent) -> String {
        let timestamp = event
            .version
            .map(|version| format!("{}:{version} ", self.timestamp))
            .unwrap_or_default();
        format!(
            "{} {event_type} {{{}:{} {}:{} {}:{} {}:{} {}:{} {}:{} {timestamp}{}:{}}}",
            event.time,
            self.id,
            event.id,
            self.src,
            event.src,
            self.dest,
            event.dest,
            self.demux_key,
            self.encode_demux(&event.kind),
            self.key,
            event.key,
            self.value,
            event.value,
            self.ok,
            event.ok,
        )
    }
}

/// Which dialect a reader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialectMode {
    /// Detect the dialect from the first message line, then lock to it.
    #[default]
    Auto,
    Fixed(Dialect),
}
