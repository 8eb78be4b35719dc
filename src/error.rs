use std::io;

/// Errors that abort a validation run.
///
/// Malformed lines and an unusable window size are not errors: the former are
/// skipped by the reader and the latter turns the run into a no-op.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A consumed record carried a time or value field that is not a number.
    #[error("invalid {field} '{value}' at line {line}")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    /// The absolute errors of a time unit or window do not fit a `Decimal`.
    #[error(transparent)]
    Overflow(#[from] SumOverflow),

    /// Reading an input or writing the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Summing absolute errors left the range of an exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("absolute error overflows at time unit {time}")]
pub struct SumOverflow {
    pub time: i64,
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
