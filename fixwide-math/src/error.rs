use std::fmt;

use thiserror::Error;

/// What went wrong while parsing fixed-point text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No digit where one was required
    NoDigits,
    /// A digit outside `[0, radix)`
    InvalidDigit,
    /// Input left over after a complete number
    TrailingCharacters,
    /// Magnitude outside the representable range
    Overflow,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseErrorKind::NoDigits => "expected a digit",
            ParseErrorKind::InvalidDigit => "invalid digit for the radix",
            ParseErrorKind::TrailingCharacters => "unexpected trailing characters",
            ParseErrorKind::Overflow => "value out of range",
        })
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset of the offending character
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Division by zero")]
    DivideByZero,

    #[error("Square root of a negative value")]
    Domain,

    #[error("Value does not fit in a {bits}-bit fixed-point layout")]
    OutOfRange { bits: u32 },
}

pub type Result<T> = std::result::Result<T, FixedError>;
