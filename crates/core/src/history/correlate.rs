//! Pairs request and response lines of a message log into operations.
//!
//! Requests and responses are separate log events sharing an id. Read and
//! write ids live in separate spaces, so a read and a write may reuse the
//! same number without colliding.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::history::types::{Bytes, ClientEvent, MessageKind, OpKind, Operation, Outcome};
use crate::stats::MessageStats;

/// A recoverable irregularity in the request/response protocol.
///
/// Anomalies do not stop the run, but each one means the latency accounting
/// for that id is unreliable.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A request reused the id of a request that is still open. The first
    /// request's start time is kept.
    DuplicateRequest { kind: OpKind, id: u64, time: u64 },
    /// A response arrived with no matching open request.
    OrphanResponse { kind: OpKind, id: u64, time: u64 },
    /// A line in the client grammar whose demultiplex key is not a client
    /// read/write request or response.
    UnexpectedMessage { name: String, id: u64, time: u64 },
}

/// The warning line the statistics report prints for the anomaly. For an
/// unexpected message the offending line itself follows on the next line.
impl core::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateRequest { id, .. } => write!(f, "Unexpected duplicate request ID {id}"),
            Self::OrphanResponse { id, .. } => {
                write!(f, "Unexpected response before corresponding request {id}")
            }
            Self::UnexpectedMessage { .. } => write!(f, "Unexpected output:"),
        }
    }
}

#[derive(Debug, Clone)]
struct OpenRequest {
    start: u64,
    key: Bytes,
    value: Bytes,
}

/// Output of a finished correlation pass.
#[derive(Debug, Clone)]
pub struct Correlation {
    /// One operation per answered request in response order, followed by
    /// one [`Outcome::Unknown`] operation per request that never got an
    /// answer (ending at the last timestamp seen).
    pub operations: Vec<Operation>,
    pub anomalies: Vec<Anomaly>,
    pub stats: MessageStats,
    /// Requests still open when the log ended.
    pub unanswered: usize,
}

/// Request/response correlation state for one analysis run.
#[derive(Debug, Default)]
pub struct Correlator {
    open: HashMap<(OpKind, u64), OpenRequest>,
    operations: Vec<Operation>,
    anomalies: Vec<Anomaly>,
    stats: MessageStats,
}

impl Correlator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the correlation state.
    ///
    /// Returns the anomaly the event caused, if any; it is also logged and
    /// kept for [`Correlator::finish`].
    pub fn observe(&mut self, event: &ClientEvent) -> Option<Anomaly> {
        self.stats.observe(event);

        let anomaly = if let MessageKind::Other(name) = &event.kind {
            Some(Anomaly::UnexpectedMessage {
                name: name.clone(),
                id: event.id,
                time: event.time,
            })
        } else {
            event.kind.op_kind().and_then(|kind| {
                if event.kind.is_request() {
                    self.open_request(kind, event)
                } else {
                    self.close_request(kind, event)
                }
            })
        };

        if let Some(anomaly) = &anomaly {
            tracing::warn!(?anomaly, "protocol anomaly");
            self.anomalies.push(anomaly.clone());
        }
        anomaly
    }

    fn open_request(&mut self, kind: OpKind, event: &ClientEvent) -> Option<Anomaly> {
        if self.open.contains_key(&(kind, event.id)) {
            return Some(Anomaly::DuplicateRequest {
                kind,
                id: event.id,
                time: event.time,
            });
        }
        self.open.insert(
            (kind, event.id),
            OpenRequest {
                start: event.time,
                key: event.key.clone(),
                value: event.value.clone(),
            },
        );
        None
    }

    fn close_request(&mut self, kind: OpKind, event: &ClientEvent) -> Option<Anomaly> {
        let Some(request) = self.open.remove(&(kind, event.id)) else {
            return Some(Anomaly::OrphanResponse {
                kind,
                id: event.id,
                time: event.time,
            });
        };

        self.stats.observe_latency(kind, event.time.saturating_sub(request.start));

        // A write response may echo the written value or leave it out.
        let value = match kind {
            OpKind::Write if event.value.is_empty() => request.value,
            _ => event.value.clone(),
        };
        let key = if event.key.is_empty() {
            request.key
        } else {
            event.key.clone()
        };

        self.operations.push(Operation {
            id: event.id,
            kind,
            key,
            value,
            start: request.start,
            end: event.time,
            version: event.version,
            outcome: if event.ok {
                Outcome::Success
            } else {
                Outcome::Failure
            },
        });
        None
    }

    /// Number of requests currently waiting for a response.
    #[must_use]
    pub fn open_requests(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn finish(self) -> Correlation {
        let Self {
            open,
            mut operations,
            anomalies,
            stats,
        } = self;

        let unanswered = open.len();
        let mut pending: Vec<_> = open.into_iter().collect();
        pending.sort_unstable_by_key(|((kind, id), request)| (request.start, *kind, *id));
        let end = stats.last_time;
        operations.extend(pending.into_iter().map(|((kind, id), request)| Operation {
            id,
            kind,
            key: request.key,
            value: request.value,
            start: request.start,
            end: end.max(request.start),
            version: None,
            outcome: Outcome::Unknown,
        }));

        if unanswered > 0 {
            tracing::debug!(unanswered, "requests without a response");
        }

        Correlation {
            operations,
            anomalies,
            stats,
            unanswered,
        }
    }
}
