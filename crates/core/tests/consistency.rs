mod common;

use common::{failed, run, run_strict, unknown};
use kvcheck_core::consistency::error::Violation;
use kvcheck_core::history::types::{Bytes, Operation};
use kvcheck_core::Verdict;

// -- Scenarios ------------------------------------------------------------

/// Write [10] at version 5, then a strictly later read sees it.
#[test]
fn read_after_write_is_strong() {
    let ops = [op!(0: w(1, 10, 5) @ 0..10), op!(1: r(1, 10, 5) @ 11..20)];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Strong);
    assert!(report.violations.is_empty());
}

/// A later, non-overlapping read returns a value that was never written.
#[test]
fn stale_read_of_unwritten_value_is_neither() {
    let ops = [op!(0: w(1, 10, 5) @ 0..10), op!(1: r(1, 7, 3) @ 11..20)];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Neither);
    assert_eq!(report.missing_values().count(), 1);
    assert!(matches!(
        report.missing_values().next(),
        Some(Violation::UnknownValue { read }) if read.id == 1
    ));
}

/// The same stale read is only an ordering violation when [7] was an
/// earlier write.
#[test]
fn stale_read_of_earlier_write_is_eventual() {
    let ops = [
        op!(0: w(1, 7, 3) @ 0..5),
        op!(1: w(1, 10, 5) @ 6..10),
        op!(2: r(1, 7, 3) @ 11..20),
    ];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Eventual);
    assert_eq!(report.stale_orders().count(), 1);
    assert!(matches!(
        report.stale_orders().next(),
        Some(Violation::StaleOrder { earlier, later, .. }) if earlier.id == 1 && later.id == 2
    ));
}

/// Two overlapping writes acknowledged at the same version with different
/// values.
#[test]
fn concurrent_conflicting_writes_are_neither() {
    let ops = [op!(0: w(1, 10, 9) @ 0..10), op!(1: w(1, 20, 9) @ 5..15)];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Neither);
    assert_eq!(report.conflicts().count(), 1);
}

/// Reads always return the most recently completed write, across keys.
#[test]
fn latest_value_reads_across_keys_are_strong() {
    let ops = [
        op!(0: w(1, 10, 1) @ 0..10),
        op!(1: w(2, 30, 1) @ 2..8),
        op!(2: r(1, 10, 1) @ 11..15),
        op!(3: r(2, 30, 1) @ 12..14),
        op!(4: w(1, 11, 2) @ 16..20),
        op!(5: r(1, 11, 2) @ 21..25),
        op!(6: w(2, 31, 2) @ 21..30),
        op!(7: r(2, 31, 2) @ 31..33),
    ];
    assert_eq!(run(&ops).verdict, Verdict::Strong);
}

// -- Properties -----------------------------------------------------------

#[test]
fn conflict_is_symmetric_in_operation_order() {
    let a = op!(0: w(1, 10, 9) @ 0..10);
    let b = op!(1: r(1, 11, 9) @ 20..30);
    let forward = run(&[a.clone(), b.clone()]);
    let backward = run(&[b, a]);
    assert_eq!(forward.verdict, Verdict::Neither);
    assert_eq!(backward.verdict, Verdict::Neither);
    assert_eq!(forward.conflicts().count(), backward.conflicts().count());
}

#[test]
fn conflict_wins_over_ordering_only() {
    let ops = [
        op!(0: w(1, 10, 9) @ 0..10),
        op!(1: w(1, 20, 9) @ 0..10),
        op!(2: w(2, 5, 4) @ 0..10),
        op!(3: r(2, 5, 4) @ 20..30),
    ];
    assert_eq!(run(&ops).verdict, Verdict::Neither);
}

#[test]
fn membership_without_conflicts_is_never_neither() {
    // every read returns some value written to its key, some of them stale
    let ops = [
        op!(0: w(1, 1, 1) @ 0..10),
        op!(1: w(1, 2, 2) @ 11..20),
        op!(2: w(1, 3, 3) @ 21..30),
        op!(3: r(1, 1, 1) @ 31..40),
        op!(4: r(1, 3, 3) @ 41..50),
        op!(5: r(1, 2, 2) @ 51..60),
    ];
    let verdict = run(&ops).verdict;
    assert_ne!(verdict, Verdict::Neither);
    assert_eq!(verdict, Verdict::Eventual);
}

#[test]
fn strong_verdict_implies_monotone_versions() {
    let ops = [
        op!(0: w(1, 1, 1) @ 0..10),
        op!(1: r(1, 1, 1) @ 5..12),
        op!(2: w(1, 2, 2) @ 11..20),
        op!(3: r(1, 1, 1) @ 13..22),
        op!(4: r(1, 2, 2) @ 21..25),
    ];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Strong);
    for t in &ops {
        for u in &ops {
            if t.key == u.key && t.happens_before(u) {
                assert!(t.version <= u.version, "{t} before {u}");
            }
        }
    }
}

#[test]
fn oracle_is_idempotent() {
    let ops = [
        op!(0: w(1, 10, 9) @ 0..10),
        op!(1: w(1, 20, 9) @ 5..15),
        op!(2: w(2, 1, 1) @ 0..5),
        op!(3: w(2, 2, 2) @ 6..9),
        op!(4: r(2, 1, 1) @ 10..12),
        op!(5: r(3, 1, 1) @ 10..12),
    ];
    let first = run(&ops);
    let second = run(&ops);
    assert_eq!(first, second);
    assert_eq!(first.violations.len(), 3);
}

#[test]
fn violations_are_ordered_by_key() {
    let ops = [
        op!(0: r(9, 1, 1) @ 0..1),
        op!(1: r(2, 1, 1) @ 0..1),
        op!(2: r(5, 1, 1) @ 0..1),
    ];
    let keys: Vec<Bytes> = run(&ops)
        .violations
        .iter()
        .map(|v| v.key().clone())
        .collect();
    assert_eq!(
        keys,
        vec![Bytes::from([2]), Bytes::from([5]), Bytes::from([9])]
    );
}

// -- Edge cases -----------------------------------------------------------

#[test]
fn read_of_key_never_written_is_unwritten_read() {
    let ops = [op!(0: w(1, 10, 1) @ 0..10), op!(1: r(2, 10, 1) @ 11..20)];
    let report = run(&ops);
    assert_eq!(report.verdict, Verdict::Neither);
    assert!(matches!(
        report.violations[..],
        [Violation::UnwrittenRead { .. }]
    ));
}

#[test]
fn failed_and_unknown_operations_are_ignored() {
    let ops = [
        op!(0: w(1, 10, 5) @ 0..10),
        failed(op!(1: w(1, 99, 5) @ 0..10)),
        unknown(op!(2: w(1, 98, 6) @ 0..10)),
        failed(op!(3: r(1, 97, 1) @ 20..30)),
        op!(4: r(1, 10, 5) @ 20..30),
    ];
    assert_eq!(run(&ops).verdict, Verdict::Strong);
}

#[test]
fn read_of_unknown_write_fails_membership() {
    // the write's acknowledgement was lost, so its value is not in the history
    let ops = [
        unknown(op!(0: w(1, 10, 5) @ 0..10)),
        op!(1: r(1, 10, 5) @ 20..30),
    ];
    assert_eq!(run(&ops).verdict, Verdict::Neither);
}

#[test]
fn strict_membership_checks_versions() {
    let ops = [op!(0: w(1, 10, 5) @ 0..10), op!(1: r(1, 10, 4) @ 2..8)];
    // concurrent, so no ordering violation; the value matches
    assert_eq!(run(&ops).verdict, Verdict::Strong);
    assert_eq!(run_strict(&ops).verdict, Verdict::Neither);
}

#[test]
fn touching_intervals_are_concurrent() {
    let ops = [
        op!(0: w(1, 1, 1) @ 0..10),
        op!(1: w(1, 2, 2) @ 3..9),
        op!(2: r(1, 1, 1) @ 10..20),
    ];
    // w2 ended at 9 < 10, so the read is ordered after it and stale
    assert_eq!(run(&ops).verdict, Verdict::Eventual);

    let ops: Vec<Operation> = vec![
        op!(0: w(1, 1, 1) @ 0..10),
        op!(1: w(1, 2, 2) @ 3..10),
        op!(2: r(1, 1, 1) @ 10..20),
    ];
    assert_eq!(run(&ops).verdict, Verdict::Strong);
}
