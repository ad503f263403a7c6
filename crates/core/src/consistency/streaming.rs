//! Single forward pass over a message log.
//!
//! The streaming checker sees each response once, in log order. It keeps
//! the write history built so far and compares every successful read
//! against it:
//!
//! - no write to the key yet: un-written read, both properties fail;
//! - value absent from the key's history: both properties fail;
//! - value present but not the latest write: strong consistency fails.
//!
//! Unlike [`check`](super::check) it has no notion of real-time overlap, so
//! a read concurrent with the write that superseded its value is counted as
//! stale.

use core::fmt::{Display, Formatter, Result};

use crate::consistency::Verdict;
use crate::history::types::{ClientEvent, MessageKind};
use crate::history::write_history::WriteHistory;

/// A diagnostic the checker prints inline, next to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    UnwrittenRead,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Self::UnwrittenRead => write!(f, "ERROR: Non-error value returned for un-written key"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamingCounts {
    pub reads_checked: u64,
    pub writes_recorded: u64,
    pub unwritten_reads: u64,
    pub unknown_values: u64,
    pub stale_reads: u64,
}

#[derive(Debug)]
pub struct StreamingChecker {
    history: WriteHistory,
    match_version: bool,
    strong: bool,
    eventual: bool,
    counts: StreamingCounts,
}

impl Default for StreamingChecker {
    fn default() -> Self {
        Self::new(false)
    }
}

impl StreamingChecker {
    #[must_use]
    pub fn new(match_version: bool) -> Self {
        Self {
            history: WriteHistory::new(),
            match_version,
            strong: true,
            eventual: true,
            counts: StreamingCounts::default(),
        }
    }

    /// Folds one event into the checker. Only successful responses matter;
    /// everything else is ignored.
    pub fn observe(&mut self, event: &ClientEvent) -> Option<Diagnostic> {
        if !event.ok {
            return None;
        }
        match event.kind {
            MessageKind::WriteResponse => {
                self.counts.writes_recorded += 1;
                self.history
                    .record(event.key.clone(), event.value.clone(), event.version);
                None
            }
            MessageKind::ReadResponse => self.check_read(event),
            _ => None,
        }
    }

    fn check_read(&mut self, event: &ClientEvent) -> Option<Diagnostic> {
        self.counts.reads_checked += 1;

        if !self.history.is_written(&event.key) {
            tracing::debug!(key = %event.key, id = event.id, "read of un-written key");
            self.counts.unwritten_reads += 1;
            self.strong = false;
            self.eventual = false;
            return Some(Diagnostic::UnwrittenRead);
        }

        let found = if self.match_version {
            self.history
                .contains_version(&event.key, &event.value, event.version)
        } else {
            self.history.contains(&event.key, &event.value)
        };
        if !found {
            tracing::debug!(key = %event.key, value = %event.value, "value never written");
            self.counts.unknown_values += 1;
            self.strong = false;
            self.eventual = false;
        } else if self.history.latest(&event.key) != Some(&event.value) {
            tracing::trace!(key = %event.key, value = %event.value, "stale read");
            self.counts.stale_reads += 1;
            self.strong = false;
        }
        None
    }

    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        if self.strong {
            Verdict::Strong
        } else if self.eventual {
            Verdict::Eventual
        } else {
            Verdict::Neither
        }
    }

    #[must_use]
    pub const fn counts(&self) -> StreamingCounts {
        self.counts
    }

    #[must_use]
    pub const fn history(&self) -> &WriteHistory {
        &self.history
    }
}
