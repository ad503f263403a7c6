use alloc::vec::Vec;
use core::fmt::{Display, Formatter, Result};

use crate::history::types::{ClientEvent, MessageKind, OpKind};
use crate::stats::{Float, LatencySummary};

/// Request/response counters for a message log.
///
/// Latencies are only recorded for responses matched to an open request
/// (see [`Correlator`](crate::history::correlate::Correlator)).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageStats {
    pub read_requests: u64,
    pub write_requests: u64,
    pub read_responses: u64,
    pub write_responses: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    /// Latest timestamp of any client message, in microseconds.
    pub last_time: u64,
    pub read_latencies: Vec<u64>,
    pub write_latencies: Vec<u64>,
}

impl MessageStats {
    pub fn observe(&mut self, event: &ClientEvent) {
        self.last_time = self.last_time.max(event.time);
        match event.kind {
            MessageKind::ReadRequest => self.read_requests += 1,
            MessageKind::WriteRequest => self.write_requests += 1,
            MessageKind::ReadResponse => {
                self.read_responses += 1;
                if !event.ok {
                    self.read_errors += 1;
                }
            }
            MessageKind::WriteResponse => {
                self.write_responses += 1;
                if !event.ok {
                    self.write_errors += 1;
                }
            }
            MessageKind::Other(_) => {}
        }
    }

    pub fn observe_latency(&mut self, kind: OpKind, latency: u64) {
        match kind {
            OpKind::Read => self.read_latencies.push(latency),
            OpKind::Write => self.write_latencies.push(latency),
        }
    }

    #[must_use]
    pub const fn reads_balanced(&self) -> bool {
        self.read_requests == self.read_responses
    }

    #[must_use]
    pub const fn writes_balanced(&self) -> bool {
        self.write_requests == self.write_responses
    }

    #[must_use]
    pub fn read_latency(&self) -> Option<LatencySummary> {
        LatencySummary::from_latencies(&self.read_latencies)
    }

    #[must_use]
    pub fn write_latency(&self) -> Option<LatencySummary> {
        LatencySummary::from_latencies(&self.write_latencies)
    }
}

#[allow(clippy::cast_precision_loss)]
fn error_percentage(errors: u64, responses: u64) -> Float {
    Float((100 * errors) as f64 / responses as f64)
}

impl Display for MessageStats {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(
            f,
            "Time taken (milliseconds): {}",
            Float(self.last_time as f64 / 1000.0)
        )?;
        writeln!(
            f,
            "{} reads and {} writes responded to",
            self.read_responses, self.write_responses
        )?;

        if !self.reads_balanced() {
            writeln!(
                f,
                "ERROR: Number of read responses does not match number of requests"
            )?;
        }
        if !self.writes_balanced() {
            writeln!(
                f,
                "ERROR: Number of write responses does not match number of requests"
            )?;
        }

        if self.read_responses > 0 {
            writeln!(
                f,
                "{} responses to reads were errors ({}%)",
                self.read_errors,
                error_percentage(self.read_errors, self.read_responses)
            )?;
        }
        if self.write_responses > 0 {
            writeln!(
                f,
                "{} responses to writes were errors ({}%)",
                self.write_errors,
                error_percentage(self.write_errors, self.write_responses)
            )?;
        }

        if let Some(summary) = self.read_latency() {
            writeln!(
                f,
                "Mean read response time (microseconds): {}",
                Float(summary.mean)
            )?;
        }
        if let Some(summary) = self.write_latency() {
            writeln!(
                f,
                "Mean write response time (microseconds): {}",
                Float(summary.mean)
            )?;
        }
        Ok(())
    }
}
