//! Same version, same value.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::consistency::error::Violation;
use crate::history::types::{Bytes, Operation};

/// Finds every unordered pair of operations on `key` that share a version
/// but disagree on the value.
///
/// `operations` must already be restricted to the successful, versioned
/// operations on `key`. Pairs are compared regardless of real-time overlap:
/// one logical version can never hold two values.
#[must_use]
pub fn check_write_conflicts(key: &Bytes, operations: &[&Operation]) -> Vec<Violation> {
    let mut by_version: HashMap<u64, Vec<&Operation>> = HashMap::new();
    for op in operations {
        if let Some(version) = op.version {
            by_version.entry(version).or_default().push(*op);
        }
    }

    let mut versions: Vec<_> = by_version.into_iter().collect();
    versions.sort_unstable_by_key(|(version, _)| *version);

    let mut violations = Vec::new();
    for (version, ops) in versions {
        for (i, first) in ops.iter().enumerate() {
            for second in &ops[i + 1..] {
                if first.value != second.value {
                    tracing::debug!(%key, version, "write conflict");
                    violations.push(Violation::WriteConflict {
                        key: key.clone(),
                        version,
                        first: (*first).clone(),
                        second: (*second).clone(),
                    });
                }
            }
        }
    }
    violations
}
