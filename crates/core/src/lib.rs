//! Consistency checking for replicated key-value store logs.
//!
//! `kvcheck_core` decides whether a recorded history of client reads and
//! writes against a replicated key-value store is consistent with one of two
//! guarantees, ordered from weakest to strongest:
//!
//! 1. **Eventual consistency** -- every read returns a value that was written
//!    to that key at some point. The checker can only falsify this property;
//!    passing means the history *might* be eventually consistent.
//! 2. **Strong consistency** -- every read observes the most recently
//!    completed write. Ordering is judged only between operations that do not
//!    overlap in real time.
//!
//! A *write conflict* (two operations on one key sharing a logical timestamp
//! but disagreeing on the value) falsifies both.
//!
//! # Entry points
//!
//! - [`check()`] runs the batch oracle over a fully materialised set of
//!   [`Operation`](history::types::Operation)s and returns a
//!   [`ConsistencyReport`](consistency::report::ConsistencyReport).
//! - [`StreamingChecker`](consistency::streaming::StreamingChecker) consumes
//!   client events one at a time for the single-pass pass-through checker.
//! - [`Correlator`](history::correlate::Correlator) pairs request and response
//!   events into operations.
//! - [`stats`] derives the load-test summaries printed next to the verdict.
//!
//! ```rust,ignore
//! use kvcheck_core::{check, CheckOptions};
//! use kvcheck_core::history::write_history::WriteHistory;
//!
//! let history = WriteHistory::from_operations(&operations);
//! let report = check(&operations, &history, CheckOptions::default());
//! println!("{}", report.verdict.checker_line());
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on the history,
//!   report and statistics types.
//! - **`schemars`** -- additionally derives `JsonSchema` for the report types.
//!
//! This crate is `no_std` compatible (requires `alloc`). The log grammars
//! live in the separate `kvcheck_parser` crate.

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod consistency;
pub mod history;
pub mod stats;

pub use consistency::{check, CheckOptions, Verdict};
