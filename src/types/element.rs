//! Tuple element types.

use std::fmt;

use num_bigint::BigInt;
use uuid::Uuid;

/// A single element of a tuple, corresponding to the wire-format variants.
///
/// Elements are value types: the caller constructs them, pack/unpack
/// consume or produce them, and nothing mutates them except the
/// versionstamp-binding pass, which rewrites `UnboundVersionstamp`
/// entries to `Versionstamp` after a transaction commits.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleElement {
    /// Sorts before every other element.
    Nil,
    Bool(bool),
    Bytes(Vec<u8>),
    /// UTF-8 text; a distinct type code makes all text sort after all bytes.
    Text(String),
    /// Nested tuple; may be empty.
    Nested(Vec<TupleElement>),
    Int(i64),
    /// Arbitrary-precision integer, magnitude up to 255 bytes.
    ///
    /// `Int` and `BigInt` share one encoding family: a `BigInt` whose
    /// magnitude fits 8 bytes encodes identically to the equivalent
    /// `Int`, and the decoder returns `Int` for any magnitude that fits
    /// `i64`.
    BigInt(BigInt),
    Float32(Float32),
    Float64(Float64),
    Uuid(Uuid),
    /// Fully resolved 12-byte versionstamp.
    Versionstamp(Versionstamp),
    /// Placeholder resolved after commit, with an optional user code.
    UnboundVersionstamp(Option<u16>),
}

impl TupleElement {
    /// Returns an unbound versionstamp placeholder with no user code.
    pub fn unbound_versionstamp() -> Self {
        Self::UnboundVersionstamp(None)
    }

    /// Returns an unbound versionstamp placeholder carrying a user code.
    pub fn unbound_versionstamp_with_code(user_code: u16) -> Self {
        Self::UnboundVersionstamp(Some(user_code))
    }

    /// Returns the value as an i64, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a string reference, if it is a `Text` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A 32-bit IEEE float together with its optionally preserved wire bytes.
///
/// Strict-mode decoding attaches the exact big-endian IEEE bytes so that
/// re-encoding reproduces the input byte-for-byte even when the platform
/// would canonicalize a NaN payload on the float/bits conversion.
#[derive(Debug, Clone, Copy)]
pub struct Float32 {
    pub value: f32,
    pub raw: Option<[u8; 4]>,
}

impl Float32 {
    pub fn new(value: f32) -> Self {
        Self { value, raw: None }
    }

    /// Constructs from exact IEEE big-endian bytes, preserving them.
    pub fn from_raw(raw: [u8; 4]) -> Self {
        Self {
            value: f32::from_be_bytes(raw),
            raw: Some(raw),
        }
    }

    /// IEEE big-endian bytes; the preserved form wins over the value.
    pub fn to_be_bytes(&self) -> [u8; 4] {
        self.raw.unwrap_or_else(|| self.value.to_be_bytes())
    }
}

// Equality is on the byte form, so NaN payloads and the sign of zero
// compare the way the encoding sorts them.
impl PartialEq for Float32 {
    fn eq(&self, other: &Self) -> bool {
        self.to_be_bytes() == other.to_be_bytes()
    }
}

/// A 64-bit IEEE float together with its optionally preserved wire bytes.
#[derive(Debug, Clone, Copy)]
pub struct Float64 {
    pub value: f64,
    pub raw: Option<[u8; 8]>,
}

impl Float64 {
    pub fn new(value: f64) -> Self {
        Self { value, raw: None }
    }

    /// Constructs from exact IEEE big-endian bytes, preserving them.
    pub fn from_raw(raw: [u8; 8]) -> Self {
        Self {
            value: f64::from_be_bytes(raw),
            raw: Some(raw),
        }
    }

    /// IEEE big-endian bytes; the preserved form wins over the value.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.raw.unwrap_or_else(|| self.value.to_be_bytes())
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.to_be_bytes() == other.to_be_bytes()
    }
}

/// A resolved versionstamp: 10-byte commit version plus 2-byte user code.
///
/// The database assigns the commit version at transaction commit; the
/// user code distinguishes multiple versionstamped keys written by one
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versionstamp {
    pub transaction_version: [u8; 10],
    pub user_code: u16,
}

impl Versionstamp {
    pub fn new(transaction_version: [u8; 10], user_code: u16) -> Self {
        Self {
            transaction_version,
            user_code,
        }
    }

    /// Reassembles from the 12-byte wire form.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        let mut transaction_version = [0u8; 10];
        transaction_version.copy_from_slice(&bytes[..10]);
        Self {
            transaction_version,
            user_code: u16::from_be_bytes([bytes[10], bytes[11]]),
        }
    }

    /// The 12-byte wire form: version bytes followed by the big-endian code.
    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[..10].copy_from_slice(&self.transaction_version);
        bytes[10..].copy_from_slice(&self.user_code.to_be_bytes());
        bytes
    }
}

// -- Convenience conversions --

impl From<bool> for TupleElement {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TupleElement {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for TupleElement {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<BigInt> for TupleElement {
    fn from(i: BigInt) -> Self {
        Self::BigInt(i)
    }
}

impl From<f32> for TupleElement {
    fn from(f: f32) -> Self {
        Self::Float32(Float32::new(f))
    }
}

impl From<f64> for TupleElement {
    fn from(f: f64) -> Self {
        Self::Float64(Float64::new(f))
    }
}

impl From<String> for TupleElement {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for TupleElement {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for TupleElement {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<TupleElement>> for TupleElement {
    fn from(items: Vec<TupleElement>) -> Self {
        Self::Nested(items)
    }
}

impl From<Uuid> for TupleElement {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Versionstamp> for TupleElement {
    fn from(v: Versionstamp) -> Self {
        Self::Versionstamp(v)
    }
}

impl fmt::Display for TupleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Nested(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Int(i) => write!(f, "{i}"),
            Self::BigInt(i) => write!(f, "{i}"),
            Self::Float32(v) => write!(f, "{}", v.value),
            Self::Float64(v) => write!(f, "{}", v.value),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Versionstamp(v) => {
                write!(f, "versionstamp({:02x?}, {})", v.transaction_version, v.user_code)
            }
            Self::UnboundVersionstamp(Some(code)) => write!(f, "versionstamp(unbound, {code})"),
            Self::UnboundVersionstamp(None) => write!(f, "versionstamp(unbound)"),
        }
    }
}
