use alloc::vec::Vec;

use hashbrown::HashMap;

use self::conflict::check_write_conflicts;
use self::error::Violation;
use self::eventual::check_membership;
use self::report::ConsistencyReport;
use self::strong::check_real_time_order;
use crate::history::types::{Bytes, Operation};
use crate::history::write_history::WriteHistory;

pub mod conflict;
pub mod error;
pub mod eventual;
pub mod report;
pub mod streaming;
pub mod strong;

/// Classification of a history, ordered from weakest to strongest.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    /// A write conflict or a read of a never-written value was found.
    Neither,
    /// Only real-time ordering violations were found. The history might be
    /// eventually consistent.
    Eventual,
    /// No violation of any kind.
    Strong,
}

impl Verdict {
    /// Applies the precedence rules: conflicts and membership failures beat
    /// ordering failures.
    #[must_use]
    pub fn classify(violations: &[Violation]) -> Self {
        if violations.iter().any(Violation::falsifies_eventual) {
            Self::Neither
        } else if violations.is_empty() {
            Self::Strong
        } else {
            Self::Eventual
        }
    }

    /// Final line of the pass-through checker.
    #[must_use]
    pub const fn checker_line(self) -> &'static str {
        match self {
            Self::Strong => "Strong consistency test passed",
            Self::Eventual => "Strong consistency test failed, but eventual consistency test passed",
            Self::Neither => "All consistency tests failed!",
        }
    }

    /// Final line of the record-log analysis.
    #[must_use]
    pub const fn summary_line(self) -> &'static str {
        match self {
            Self::Strong => "Output appears to be strongly consistent.",
            Self::Eventual => "Output appears to be eventually consistent.",
            Self::Neither => {
                "Output appears to be neither strongly consistent nor eventually consistent."
            }
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Require a read's version, not just its value, to match a recorded
    /// write.
    pub match_version: bool,
}

/// Runs all three checks over a fully materialised history.
///
/// `history` must hold the successful writes of `operations` (see
/// [`WriteHistory::from_operations`]). Keys are checked independently and in
/// ascending order, so the result is deterministic and does not depend on
/// the order of `operations` beyond tie-breaking between operations with
/// equal start times.
#[must_use]
pub fn check(
    operations: &[Operation],
    history: &WriteHistory,
    options: CheckOptions,
) -> ConsistencyReport {
    tracing::debug!(
        operations = operations.len(),
        keys = history.len(),
        ?options,
        "checking consistency"
    );

    let mut by_key: HashMap<&Bytes, Vec<&Operation>> = HashMap::new();
    for op in operations {
        by_key.entry(&op.key).or_default().push(op);
    }
    let mut keys: Vec<_> = by_key.into_iter().collect();
    keys.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    let violations = keys
        .into_iter()
        .flat_map(|(key, ops)| check_key(key, ops, history, options))
        .collect();

    let report = ConsistencyReport::new(violations);
    tracing::debug!(verdict = ?report.verdict, violations = report.violations.len(), "checked");
    report
}

/// All checks for the operations on a single key.
///
/// Independent of every other key, so callers may partition a history by
/// key and reduce the results with [`Verdict::classify`].
#[must_use]
pub fn check_key(
    key: &Bytes,
    operations: Vec<&Operation>,
    history: &WriteHistory,
    options: CheckOptions,
) -> Vec<Violation> {
    let mut versioned: Vec<&Operation> = operations
        .iter()
        .copied()
        .filter(|op| op.is_success() && op.version.is_some())
        .collect();
    versioned.sort_by_key(|op| (op.start, op.end, op.id));

    let mut violations = check_write_conflicts(key, &versioned);
    violations.extend(check_membership(operations, history, options.match_version));
    violations.extend(check_real_time_order(key, &versioned));
    violations
}
