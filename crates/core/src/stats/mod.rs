//! Load-test summaries derived from parsed logs.
//!
//! Two report shapes exist, one per log format:
//!
//! - [`OperationStats`] summarises transaction-record logs (one line per
//!   completed operation).
//! - [`MessageStats`] summarises message logs (one line per request or
//!   response).
//!
//! Their `Display` output is line-for-line what downstream scripts parse, so
//! wording and number formatting must not change.

use alloc::format;
use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

use crate::history::types::Annotation;

pub mod message;
pub mod operation;

pub use message::MessageStats;
pub use operation::OperationStats;

/// Percentiles reported by [`LatencySummary`].
pub const PERCENTILES: [u32; 5] = [10, 50, 90, 95, 99];

/// Nearest-rank percentile of an ascending sample: the element at
/// `floor(n * p / 100)`, clamped to the last element.
#[must_use]
pub fn percentile(sorted: &[u64], p: u32) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (sorted.len() * p as usize / 100).min(sorted.len() - 1);
    Some(sorted[index])
}

/// Distribution of response times, in microseconds.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    pub max: u64,
    /// `(p, latency)` for every `p` in [`PERCENTILES`].
    pub percentiles: Vec<(u32, u64)>,
}

impl LatencySummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_latencies(latencies: &[u64]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();
        let total: u64 = sorted.iter().sum();
        let percentiles = PERCENTILES
            .iter()
            .filter_map(|&p| percentile(&sorted, p).map(|latency| (p, latency)))
            .collect();
        Some(Self {
            count: sorted.len(),
            mean: total as f64 / sorted.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            percentiles,
        })
    }
}

/// `10th 1.25 50th 3.00 ...`, latencies in milliseconds with two decimals.
impl Display for LatencySummary {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (i, (p, latency)) in self.percentiles.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}th {:.2}", *latency as f64 / 1000.0)?;
        }
        Ok(())
    }
}

/// Counts of the fault-injection markers and monitor snapshots in a log.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationCounts {
    pub node_failures: u64,
    pub node_recoveries: u64,
    pub partitions_created: u64,
    pub partitions_recovered: u64,
    pub monitor_lines: u64,
}

impl AnnotationCounts {
    pub fn observe(&mut self, annotation: &Annotation) {
        match annotation {
            Annotation::NodeFailed { .. } => self.node_failures += 1,
            Annotation::NodeRecovered { .. } => self.node_recoveries += 1,
            Annotation::PartitionCreated => self.partitions_created += 1,
            Annotation::PartitionRecovered => self.partitions_recovered += 1,
        }
    }
}

/// Formats a float the way the load-test scripts always have: shortest
/// round-trip digits, with `.0` kept on integral values. Values at or above
/// `1e16` or below `1e-4` use an exponent with an explicit sign and at least
/// two digits, e.g. `1e+16` and `5e-05`.
#[derive(Debug, Clone, Copy)]
pub struct Float(pub f64);

impl Display for Float {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.0.is_nan() {
            return write!(f, "nan");
        }
        let repr = format!("{:?}", self.0);
        let Some((mantissa, exponent)) = repr.split_once('e') else {
            return write!(f, "{repr}");
        };
        let (sign, digits) = exponent
            .strip_prefix('-')
            .map_or(("+", exponent), |digits| ("-", digits));
        write!(f, "{mantissa}e{sign}{digits:0>2}")
    }
}

/// `numerator / denominator`, or 0 when there is nothing to divide by.
#[must_use]
pub const fn div_or_zero(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        0
    } else {
        numerator / denominator
    }
}
