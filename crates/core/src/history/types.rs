use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Result};

use derive_more::From;

/// The integer-array encoding the store uses for both keys and values.
///
/// Logged as space-separated integers in brackets, e.g. `[1 2 3]`. Equality,
/// ordering and hashing are element-wise, so a key read back from a log
/// always finds the history recorded under the same spelling.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, From)]
pub struct Bytes(pub Vec<u64>);

impl Bytes {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u64]> for Bytes {
    fn from(words: &[u64]) -> Self {
        Self(words.to_vec())
    }
}

impl<const N: usize> From<[u64; N]> for Bytes {
    fn from(words: [u64; N]) -> Self {
        Self(words.to_vec())
    }
}

impl Display for Bytes {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "[")?;
        for (i, word) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{word}")?;
        }
        write!(f, "]")
    }
}

impl Debug for Bytes {
    fn fmt(&self, f: &mut Formatter) -> Result {
        Display::fmt(self, f)
    }
}

#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    Read,
    Write,
}

/// How the store answered an operation.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Success,
    Failure,
    /// The client gave up before learning whether the write committed.
    Unknown,
}

/// One completed client operation.
///
/// `start` and `end` are wall-clock microseconds bounding the observed
/// duration. `version` is the logical timestamp the store attached to the
/// value: for writes the version committed at, for reads the version of the
/// value returned. Operations without a version are ignored by the conflict
/// and ordering checks.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub id: u64,
    pub kind: OpKind,
    pub key: Bytes,
    pub value: Bytes,
    pub start: u64,
    pub end: u64,
    pub version: Option<u64>,
    pub outcome: Outcome,
}

impl Operation {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    #[must_use]
    pub fn is_read(&self) -> bool {
        self.kind == OpKind::Read
    }

    #[must_use]
    pub fn is_write(&self) -> bool {
        self.kind == OpKind::Write
    }

    /// Observed response time in microseconds.
    #[must_use]
    pub const fn latency(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Real-time precedence: `self` completed before `other` started.
    #[must_use]
    pub const fn happens_before(&self, other: &Self) -> bool {
        self.end < other.start
    }
}

/// The demultiplex key of a client message line.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ReadRequest,
    WriteRequest,
    ReadResponse,
    WriteResponse,
    /// Any other message type, kept as spelled in the log.
    Other(String),
}

impl MessageKind {
    #[must_use]
    pub const fn op_kind(&self) -> Option<OpKind> {
        match self {
            Self::ReadRequest | Self::ReadResponse => Some(OpKind::Read),
            Self::WriteRequest | Self::WriteResponse => Some(OpKind::Write),
            Self::Other(_) => None,
        }
    }

    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::ReadRequest | Self::WriteRequest)
    }
}

/// One request or response line of a message log.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEvent {
    /// Wall-clock microseconds at which the line was logged.
    pub time: u64,
    pub id: u64,
    pub src: u64,
    pub dest: u64,
    pub kind: MessageKind,
    pub key: Bytes,
    pub value: Bytes,
    pub version: Option<u64>,
    pub ok: bool,
}

/// Well-known lines that mark a fault injected into the system under test.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    NodeFailed { node: u64, mode: String },
    NodeRecovered { node: u64 },
    PartitionCreated,
    PartitionRecovered,
}
