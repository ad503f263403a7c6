use crate::history::types::{Bytes, Operation};

/// A single piece of evidence against a consistency property.
///
/// Violations are analysis results, not processing errors: the oracle keeps
/// going after finding one and reports all of them.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two successful operations on one key carry the same version but
    /// different values. Falsifies both strong and eventual consistency.
    WriteConflict {
        key: Bytes,
        version: u64,
        first: Operation,
        second: Operation,
    },
    /// A successful read of a key that no acknowledged write ever touched.
    UnwrittenRead { read: Operation },
    /// A successful read whose value (and version, in the stricter variant)
    /// was never written to that key.
    UnknownValue { read: Operation },
    /// `earlier` completed before `later` started, yet `later` observed an
    /// older version. Falsifies strong consistency only.
    StaleOrder {
        key: Bytes,
        earlier: Operation,
        later: Operation,
    },
}

impl Violation {
    /// Whether the violation also rules out eventual consistency.
    #[must_use]
    pub const fn falsifies_eventual(&self) -> bool {
        !matches!(self, Self::StaleOrder { .. })
    }

    #[must_use]
    pub const fn key(&self) -> &Bytes {
        match self {
            Self::WriteConflict { key, .. } | Self::StaleOrder { key, .. } => key,
            Self::UnwrittenRead { read } | Self::UnknownValue { read } => &read.key,
        }
    }
}
