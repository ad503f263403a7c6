//! Per-key record of acknowledged writes.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::history::types::{Bytes, Operation};

/// Every successfully acknowledged write, per key, in the order the
/// acknowledgements were observed.
///
/// Entries are never deduplicated: writing the same value twice records it
/// twice, so the complete provenance stays available to membership queries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteHistory {
    writes: HashMap<Bytes, Vec<(Bytes, Option<u64>)>>,
}

impl WriteHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every successful write of `operations`, in slice order.
    #[must_use]
    pub fn from_operations(operations: &[Operation]) -> Self {
        let mut history = Self::new();
        for op in operations.iter().filter(|op| op.is_write() && op.is_success()) {
            history.record(op.key.clone(), op.value.clone(), op.version);
        }
        history
    }

    pub fn record(&mut self, key: Bytes, value: Bytes, version: Option<u64>) {
        self.writes.entry(key).or_default().push((value, version));
    }

    /// Whether any write to `key` has been recorded.
    #[must_use]
    pub fn is_written(&self, key: &Bytes) -> bool {
        self.writes.contains_key(key)
    }

    #[must_use]
    pub fn contains(&self, key: &Bytes, value: &Bytes) -> bool {
        self.entries(key).iter().any(|(v, _)| v == value)
    }

    /// Exact match on both the value and the version.
    #[must_use]
    pub fn contains_version(&self, key: &Bytes, value: &Bytes, version: Option<u64>) -> bool {
        self.entries(key)
            .iter()
            .any(|(v, ver)| v == value && *ver == version)
    }

    /// The most recently acknowledged value for `key`.
    #[must_use]
    pub fn latest(&self, key: &Bytes) -> Option<&Bytes> {
        self.entries(key).last().map(|(value, _)| value)
    }

    #[must_use]
    pub fn entries(&self, key: &Bytes) -> &[(Bytes, Option<u64>)] {
        self.writes.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct keys written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::{OpKind, Outcome};

    fn write(key: u64, value: u64, version: u64, outcome: Outcome) -> Operation {
        Operation {
            id: version,
            kind: OpKind::Write,
            key: Bytes::from([key]),
            value: Bytes::from([value]),
            start: 0,
            end: 1,
            version: Some(version),
            outcome,
        }
    }

    #[test]
    fn test_record_keeps_call_order_and_duplicates() {
        let mut history = WriteHistory::new();
        let key = Bytes::from([1]);
        history.record(key.clone(), Bytes::from([10]), Some(1));
        history.record(key.clone(), Bytes::from([20]), Some(2));
        history.record(key.clone(), Bytes::from([10]), Some(3));

        assert_eq!(history.entries(&key).len(), 3);
        assert_eq!(history.latest(&key), Some(&Bytes::from([10])));
        assert!(history.contains(&key, &Bytes::from([20])));
        assert!(!history.contains(&key, &Bytes::from([30])));
    }

    #[test]
    fn test_contains_version_matches_both_fields() {
        let mut history = WriteHistory::new();
        let key = Bytes::from([1]);
        history.record(key.clone(), Bytes::from([10]), Some(5));

        assert!(history.contains_version(&key, &Bytes::from([10]), Some(5)));
        assert!(!history.contains_version(&key, &Bytes::from([10]), Some(4)));
        assert!(!history.contains_version(&key, &Bytes::from([11]), Some(5)));
    }

    #[test]
    fn test_unwritten_key() {
        let history = WriteHistory::new();
        let key = Bytes::from([9]);
        assert!(!history.is_written(&key));
        assert!(history.entries(&key).is_empty());
        assert_eq!(history.latest(&key), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_operations_skips_unsuccessful_writes() {
        let ops = vec![
            write(1, 10, 1, Outcome::Success),
            write(1, 20, 2, Outcome::Failure),
            write(1, 30, 3, Outcome::Unknown),
            write(2, 40, 4, Outcome::Success),
        ];
        let history = WriteHistory::from_operations(&ops);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries(&Bytes::from([1])), &[(Bytes::from([10]), Some(1))]);
        assert!(!history.contains(&Bytes::from([1]), &Bytes::from([20])));
    }
}
