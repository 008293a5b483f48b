//! Error types for tuple packing and unpacking.

/// Errors that can occur while encoding or decoding tuples.
///
/// All errors surface to the caller; the codec never retries and never
/// produces partial output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TupleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("integer magnitude exceeds 255 bytes")]
    IntegerTooLarge,

    #[error("tuple contains more than one unbound versionstamp")]
    DuplicateVersionstamp,

    #[error("tuple contains an unbound versionstamp; use pack_with_versionstamp")]
    IncompleteVersionstamp,

    #[error("tuple contains no unbound versionstamp")]
    UnexpectedVersionstamp,

    #[error("input ended in the middle of an element")]
    Truncated,

    #[error("unknown type code: 0x{0:02X}")]
    InvalidTypeCode(u8),

    #[error("text payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("unbound versionstamp has no user code to bind")]
    MissingCode,
}
