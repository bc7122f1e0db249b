use thiserror::Error;

/// Failure kinds shared by the attack engines and their supporting
/// primitives. Attacks never return partial results; the first violated
/// precondition or exhausted search surfaces as one of these.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Two inputs that must be the same length were not.
    #[error("mismatched lengths")]
    MismatchedLengths,

    /// A required input was empty.
    #[error("empty input")]
    Empty,

    /// A bounded search ended without a match, or an oracle answered
    /// inconsistently with an earlier probe.
    #[error("not found")]
    NotFound,

    /// PKCS#7 validation failed.
    #[error("invalid padding")]
    InvalidPadding,
}

pub type Result<T> = std::result::Result<T, Error>;
