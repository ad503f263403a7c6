use alloc::vec::Vec;
use core::fmt::{Display, Formatter, Result};

use crate::history::types::{OpKind, Operation, Outcome};
use crate::stats::{div_or_zero, LatencySummary};

/// Per-kind counts and response times over completed operations.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationStats {
    pub reads: u64,
    pub writes: u64,
    pub successful_reads: u64,
    pub successful_writes: u64,
    pub failed_writes: u64,
    /// Latest end time seen, in microseconds.
    pub total_time: u64,
    pub read_time: u64,
    pub write_time: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    read_latencies: Vec<u64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    write_latencies: Vec<u64>,
}

impl OperationStats {
    #[must_use]
    pub fn from_operations(operations: &[Operation]) -> Self {
        let mut stats = Self::default();
        for op in operations {
            stats.observe(op);
        }
        stats
    }

    pub fn observe(&mut self, op: &Operation) {
        self.total_time = self.total_time.max(op.end);
        let latency = op.latency();
        match op.kind {
            OpKind::Read => {
                self.reads += 1;
                self.read_time += latency;
                self.read_latencies.push(latency);
                if op.outcome == Outcome::Success {
                    self.successful_reads += 1;
                }
            }
            OpKind::Write => {
                self.writes += 1;
                self.write_time += latency;
                self.write_latencies.push(latency);
                match op.outcome {
                    Outcome::Success => self.successful_writes += 1,
                    Outcome::Failure => self.failed_writes += 1,
                    Outcome::Unknown => {}
                }
            }
        }
    }

    /// Writes that neither succeeded nor failed explicitly.
    #[must_use]
    pub const fn unknown_writes(&self) -> u64 {
        self.writes - self.successful_writes - self.failed_writes
    }

    /// Mean read response time in milliseconds, truncated.
    #[must_use]
    pub const fn mean_read_ms(&self) -> u64 {
        div_or_zero(self.read_time, 1000 * self.reads)
    }

    /// Mean write response time in milliseconds, truncated.
    #[must_use]
    pub const fn mean_write_ms(&self) -> u64 {
        div_or_zero(self.write_time, 1000 * self.writes)
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

impl Display for OperationStats {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Total time taken (milliseconds): {}", self.total_time / 1000)?;
        writeln!(
            f,
            "{} reads and {} writes processed",
            self.reads, self.writes
        )?;
        writeln!(f, "Average read response time (ms): {}", self.mean_read_ms())?;
        writeln!(f, "Average write response time (ms): {}", self.mean_write_ms())?;
        writeln!(
            f,
            "{} ({}%) reads were successful",
            self.successful_reads,
            div_or_zero(100 * self.successful_reads, self.reads)
        )?;
        writeln!(
            f,
            "{} ({}%) writes were successful",
            self.successful_writes,
            div_or_zero(100 * self.successful_writes, self.writes)
        )?;
        writeln!(f, "{} writes have unknown response", self.unknown_writes())
    }
}
