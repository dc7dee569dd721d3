//! Error type

use core::fmt::{self, Display};

/// The specific parse-boundary failure that occurred.
///
/// These are the only recoverable errors this crate produces: every
/// cryptographic operation (keygen, encapsulate, decapsulate) is total and
/// never fails mid-execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The requested parameter-set name does not match a known variant.
    InvalidVariant,
    /// A byte string did not have the length the variant expects.
    InvalidLength,
    /// A deserialized field element was not in the canonical range `[0, p)`.
    InvalidFieldElement,
}

/// SIKE errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Error(pub ErrorKind);

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ErrorKind::InvalidVariant => f.write_str("unknown SIKE parameter variant"),
            ErrorKind::InvalidLength => f.write_str("wrong-length SIKE byte string"),
            ErrorKind::InvalidFieldElement => f.write_str("field element out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
