/// What kind of line failed to parse.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A line that was expected to be a client message.
    Message,
    /// A line starting with two integers that is not a valid transaction record.
    Record,
    /// A message line in a dialect other than the one the input locked to.
    DialectMismatch,
}

/// A parse error with human-readable location information.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(kind: ParseErrorKind, message: String, input: &str, offset: usize) -> Self {
        let column = input
            .get(..offset.min(input.len()))
            .map_or(1, |prefix| prefix.chars().count() + 1);
        Self {
            kind,
            message,
            line: 1,
            column,
        }
    }

    /// Set the 1-based line number this error was found on.
    #[must_use]
    pub const fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_location() {
        let err = ParseError::at(
            ParseErrorKind::Record,
            "expected `]`".to_string(),
            "0 10 read [1",
            12,
        )
        .with_line(4);
        assert_eq!(err.column, 13);
        assert_eq!(
            err.to_string(),
            "parse error at line 4, column 13: expected `]`"
        );
    }
}
