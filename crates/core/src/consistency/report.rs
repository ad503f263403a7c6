use alloc::vec::Vec;
use core::fmt::{Display, Formatter, Result};

use crate::consistency::error::Violation;
use crate::consistency::Verdict;

/// Outcome of a batch consistency check.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub verdict: Verdict,
    /// Ordered by key, then by the position of the operations in the history.
    pub violations: Vec<Violation>,
}

impl ConsistencyReport {
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            verdict: Verdict::classify(&violations),
            violations,
        }
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::WriteConflict { .. }))
    }

    pub fn missing_values(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| {
            matches!(
                v,
                Violation::UnwrittenRead { .. } | Violation::UnknownValue { .. }
            )
        })
    }

    pub fn stale_orders(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::StaleOrder { .. }))
    }
}

/// One `Write conflict detected.` line per conflict, then the summary line.
///
/// Conflicts are unordered pairs, so each prints once; the legacy analysis
/// script printed every conflicting pair twice.
impl Display for ConsistencyReport {
    fn fmt(&self, f: &mut Formatter) -> Result {
        for _ in self.conflicts() {
            writeln!(f, "Write conflict detected.")?;
        }
        writeln!(f, "{}", self.verdict.summary_line())
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Self::WriteConflict {
                key,
                version,
                first,
                second,
            } => write!(
                f,
                "write conflict on {key} at version {version}: {} vs {}",
                first.value, second.value
            ),
            Self::UnwrittenRead { read } => write!(
                f,
                "read of un-written key {} returned {} (id {})",
                read.key, read.value, read.id
            ),
            Self::UnknownValue { read } => write!(
                f,
                "read of {} returned {} which was never written (id {})",
                read.key, read.value, read.id
            ),
            Self::StaleOrder {
                key,
                earlier,
                later,
            } => write!(
                f,
                "stale order on {key}: {} at version {} ended at {}, {} started at {} saw version {}",
                earlier.kind,
                earlier.version.unwrap_or_default(),
                earlier.end,
                later.kind,
                later.start,
                later.version.unwrap_or_default()
            ),
        }
    }
}
