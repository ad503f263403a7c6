/// DSL macro for building test operations.
///
/// Produces a successful `kvcheck_core::history::types::Operation` on a
/// single-word key and value.
///
/// # Syntax
///
/// ```ignore
/// op!(7: w(1, 10, 5) @ 0..10)   // id 7 writes [10] to key [1] at version 5
/// op!(8: r(1, 10, 5) @ 11..20)  // id 8 reads [10] at version 5 from key [1]
/// ```
///
/// Use [`failed`] and [`unknown`] to change the outcome.
#[macro_export]
macro_rules! op {
    ($id:literal : w($key:expr, $value:expr, $version:expr) @ $start:literal .. $end:literal) => {
        kvcheck_core::history::types::Operation {
            id: $id,
            kind: kvcheck_core::history::types::OpKind::Write,
            key: kvcheck_core::history::types::Bytes::from([$key as u64]),
            value: kvcheck_core::history::types::Bytes::from([$value as u64]),
            start: $start,
            end: $end,
            version: Some($version),
            outcome: kvcheck_core::history::types::Outcome::Success,
        }
    };
    ($id:literal : r($key:expr, $value:expr, $version:expr) @ $start:literal .. $end:literal) => {
        kvcheck_core::history::types::Operation {
            id: $id,
            kind: kvcheck_core::history::types::OpKind::Read,
            key: kvcheck_core::history::types::Bytes::from([$key as u64]),
            value: kvcheck_core::history::types::Bytes::from([$value as u64]),
            start: $start,
            end: $end,
            version: Some($version),
            outcome: kvcheck_core::history::types::Outcome::Success,
        }
    };
}

use kvcheck_core::consistency::report::ConsistencyReport;
use kvcheck_core::history::types::{Operation, Outcome};
use kvcheck_core::history::write_history::WriteHistory;
use kvcheck_core::{check, CheckOptions};

#[allow(dead_code)]
pub fn failed(mut op: Operation) -> Operation {
    op.outcome = Outcome::Failure;
    op
}

#[allow(dead_code)]
pub fn unknown(mut op: Operation) -> Operation {
    op.outcome = Outcome::Unknown;
    op
}

/// Build the write history from `ops` and run the batch oracle.
#[allow(dead_code)]
pub fn run(ops: &[Operation]) -> ConsistencyReport {
    check(ops, &WriteHistory::from_operations(ops), CheckOptions::default())
}

#[allow(dead_code)]
pub fn run_strict(ops: &[Operation]) -> ConsistencyReport {
    check(
        ops,
        &WriteHistory::from_operations(ops),
        CheckOptions {
            match_version: true,
        },
    )
}
