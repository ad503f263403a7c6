use alloc::string::String;
use core::fmt::{Display, Formatter, Result, Write};

use crate::history::types::{OpKind, Operation, Outcome};

impl Display for OpKind {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Formats the operation as a transaction-record line (without the
/// newline): `<start> <end> <kind> <key> <value> <version> <result>`.
///
/// Reads report `true`/`false` and writes `success`/`error`/`unknown`, which
/// is how the load generator spells them. A missing version prints as `0`.
impl Display for Operation {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let result = match (self.kind, self.outcome) {
            (OpKind::Read, Outcome::Success) => "true",
            (OpKind::Read, Outcome::Failure) => "false",
            (OpKind::Write, Outcome::Success) => "success",
            (OpKind::Write, Outcome::Failure) => "error",
            (_, Outcome::Unknown) => "unknown",
        };
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.start,
            self.end,
            self.kind,
            self.key,
            self.value,
            self.version.unwrap_or_default(),
            result
        )
    }
}

/// Format a history as transaction-record lines, one per operation.
///
/// The output always ends with a trailing newline so that it reads back
/// through the record parser unchanged.
#[must_use]
pub fn format_records(operations: &[Operation]) -> String {
    let mut output = String::new();
    for operation in operations {
        let _ = writeln!(output, "{operation}");
    }
    output
}
