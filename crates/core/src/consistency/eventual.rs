//! Checks that every successful read returned a value that was written.

use alloc::vec::Vec;

use crate::consistency::error::Violation;
use crate::history::types::Operation;
use crate::history::write_history::WriteHistory;

/// Checks every successful read among `operations` against `history`.
///
/// A read of a key with no recorded write is [`Violation::UnwrittenRead`];
/// a read of a written key whose value is not in the history is
/// [`Violation::UnknownValue`]. With `match_version`, the version the read
/// reports must also match the recorded write.
///
/// Only a forward pass is needed, so this is also usable on a prefix of the
/// log as long as `history` covers it.
#[must_use]
pub fn check_membership<'a, I>(
    operations: I,
    history: &WriteHistory,
    match_version: bool,
) -> Vec<Violation>
where
    I: IntoIterator<Item = &'a Operation>,
{
    operations
        .into_iter()
        .filter(|op| op.is_read() && op.is_success())
        .filter_map(|read| {
            if !history.is_written(&read.key) {
                return Some(Violation::UnwrittenRead { read: read.clone() });
            }
            let found = if match_version {
                history.contains_version(&read.key, &read.value, read.version)
            } else {
                history.contains(&read.key, &read.value)
            };
            (!found).then(|| Violation::UnknownValue { read: read.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::{Bytes, OpKind, Outcome};

    fn read(key: u64, value: u64, version: u64, outcome: Outcome) -> Operation {
        Operation {
            id: 1,
            kind: OpKind::Read,
            key: Bytes::from([key]),
            value: Bytes::from([value]),
            start: 10,
            end: 20,
            version: Some(version),
            outcome,
        }
    }

    fn history() -> WriteHistory {
        let mut history = WriteHistory::new();
        history.record(Bytes::from([1]), Bytes::from([10]), Some(5));
        history
    }

    #[test]
    fn test_read_of_written_value_passes() {
        let ops = [read(1, 10, 5, Outcome::Success)];
        assert!(check_membership(&ops, &history(), false).is_empty());
        assert!(check_membership(&ops, &history(), true).is_empty());
    }

    #[test]
    fn test_read_of_unwritten_key() {
        let ops = [read(2, 10, 5, Outcome::Success)];
        let violations = check_membership(&ops, &history(), false);
        assert!(matches!(violations[..], [Violation::UnwrittenRead { .. }]));
    }

    #[test]
    fn test_read_of_unknown_value() {
        let ops = [read(1, 7, 3, Outcome::Success)];
        let violations = check_membership(&ops, &history(), false);
        assert!(matches!(violations[..], [Violation::UnknownValue { .. }]));
    }

    #[test]
    fn test_version_mismatch_only_fails_strict_variant() {
        let ops = [read(1, 10, 4, Outcome::Success)];
        assert!(check_membership(&ops, &history(), false).is_empty());
        assert_eq!(check_membership(&ops, &history(), true).len(), 1);
    }

    #[test]
    fn test_failed_reads_are_ignored() {
        let ops = [read(2, 99, 1, Outcome::Failure), read(2, 99, 1, Outcome::Unknown)];
        assert!(check_membership(&ops, &history(), false).is_empty());
    }
}
