//! Recorded client histories: operation types, request/response
//! correlation and the per-key write history.

pub mod correlate;
pub mod display;
pub mod types;
pub mod write_history;

pub use types::{Annotation, Bytes, ClientEvent, MessageKind, OpKind, Operation, Outcome};
pub use write_history::WriteHistory;
