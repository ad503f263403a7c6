//! Real-time ordering of versions.

use alloc::vec::Vec;

use crate::consistency::error::Violation;
use crate::history::types::{Bytes, Operation};

/// Finds every pair of operations on `key` where one completed before the
/// other started, yet the later one carries an older version.
///
/// `operations` must be the successful, versioned operations on `key`,
/// sorted by start time. Overlapping operations have no real-time order and
/// are never compared.
///
/// ```text
///   t: |----v5----|
///   u:               |----v3----|    t.end < u.start, 5 > 3: stale
///   w:         |----v3----|          overlaps t: not compared
/// ```
#[must_use]
pub fn check_real_time_order(key: &Bytes, operations: &[&Operation]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, earlier) in operations.iter().enumerate() {
        let Some(earlier_version) = earlier.version else {
            continue;
        };
        // sorted by start, so every later index has start >= earlier.start
        for later in &operations[i + 1..] {
            let Some(later_version) = later.version else {
                continue;
            };
            if earlier.happens_before(later) && earlier_version > later_version {
                violations.push(Violation::StaleOrder {
                    key: key.clone(),
                    earlier: (*earlier).clone(),
                    later: (*later).clone(),
                });
            }
        }
    }
    if !violations.is_empty() {
        tracing::debug!(%key, count = violations.len(), "real-time order violations");
    }
    violations
}
