//! Basic types of wirebuf.
use std::fmt;

pub(crate) const U16_SIZE: usize = 2;
pub(crate) const U32_SIZE: usize = 4;
pub(crate) const U64_SIZE: usize = 8;

/// Most groups a 64 bit varint can occupy.
pub const MAX_VARINT64_LEN: usize = 10;
/// Most groups a 32 bit varint can occupy.
pub const MAX_VARINT32_LEN: usize = 5;

/// Specific type of [EncodingError]
#[derive(fmt::Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingErrorKind {
    /// A read, peek, seek or skip went past the end of the buffer, or a varint did not
    /// terminate within the buffer or its group cap.
    OutOfBounds,
    /// An argument (usually configuration) was not acceptable.
    InvalidArgument,
    /// A value did not fit the requested integer width and signedness.
    OutOfRange,
    /// Strict UTF-8 decoding hit a malformed sequence, or strict encoding hit a lone surrogate.
    InvalidEncoding,
    /// A sink was released to a pool it was not checked out of.
    PoolContractViolation,
}

impl fmt::Display for EncodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            EncodingErrorKind::OutOfBounds => "Encoding failed, out of bounds",
            EncodingErrorKind::InvalidArgument => "Encoding failed, invalid argument",
            EncodingErrorKind::OutOfRange => "Encoding failed, out of range",
            EncodingErrorKind::InvalidEncoding => "Encoding failed, invalid encoding",
            EncodingErrorKind::PoolContractViolation => "Sink pool contract violated",
        };
        f.write_str(prefix)
    }
}

/// Encoding/decoding error.
#[derive(fmt::Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EncodingError {
    /// Specific type of error
    pub kind: EncodingErrorKind,
    /// Message for the error
    pub message: String,
}

impl EncodingError {
    /// Create EncodingError
    pub fn new(kind: EncodingErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
    /// Helper function for making an out of bounds error
    pub fn out_of_bounds(message: &str) -> Self {
        Self::new(EncodingErrorKind::OutOfBounds, message)
    }
    /// Helper function for making an invalid argument error
    pub fn invalid_argument(message: &str) -> Self {
        Self::new(EncodingErrorKind::InvalidArgument, message)
    }
    /// Helper function for making an out of range error
    pub fn out_of_range(message: &str) -> Self {
        Self::new(EncodingErrorKind::OutOfRange, message)
    }
    /// Helper function for making an invalid encoding error
    pub fn invalid_encoding(message: &str) -> Self {
        Self::new(EncodingErrorKind::InvalidEncoding, message)
    }
    /// Helper function for making a pool contract violation error
    pub fn pool_contract_violation(message: &str) -> Self {
        Self::new(EncodingErrorKind::PoolContractViolation, message)
    }
}

impl From<EncodingError> for std::io::Error {
    fn from(e: EncodingError) -> Self {
        match e.kind {
            EncodingErrorKind::InvalidEncoding => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{e}"))
            }
            _ => std::io::Error::new(std::io::ErrorKind::Other, format!("{e}")),
        }
    }
}

/// Byte order of a fixed width scalar. Defaults to [`Endian::Big`].
#[derive(fmt::Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Most significant byte first (network order).
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Width of an integer chosen at runtime, used by [`ByteCursor::read_int`] and
/// [`ByteSink::write_int`].
///
/// [`ByteCursor::read_int`]: crate::ByteCursor::read_int
/// [`ByteSink::write_int`]: crate::ByteSink::write_int
#[derive(fmt::Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// 1 byte
    W8,
    /// 2 bytes
    W16,
    /// 4 bytes
    W32,
    /// 8 bytes
    W64,
}

impl IntWidth {
    /// Number of bytes taken by this width.
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => U16_SIZE,
            IntWidth::W32 => U32_SIZE,
            IntWidth::W64 => U64_SIZE,
        }
    }

    /// Number of bits taken by this width.
    pub const fn bits(self) -> u32 {
        (self.bytes() * 8) as u32
    }

    /// Inclusive range of values representable at this width.
    pub const fn range(self, signed: bool) -> (i128, i128) {
        let bits = self.bits();
        if signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }
}
