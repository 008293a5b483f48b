//! Tuple element encoding: `TupleElement` → bytes.

use bytes::{BufMut, BytesMut};
use num_bigint::{BigInt, Sign};
use uuid::Uuid;

use super::code;
use super::transform;
use crate::error::TupleError;
use crate::types::{Float32, Float64, TupleElement, Versionstamp};

/// Largest arbitrary-precision magnitude, in bytes. The extended integer
/// frames carry the length in a single byte.
pub const MAX_INT_MAGNITUDE: usize = 255;

/// Records where an unbound versionstamp landed in the output buffer.
///
/// At most one unbound versionstamp may appear per packed tuple. The
/// offsets let a transaction layer stamp the committed version (and,
/// when the element supplied no user code, the code) into the buffer
/// after commit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VersionstampState {
    /// Offset of the reserved 10-byte commit-version slot.
    pub stamp_offset: Option<usize>,
    /// Offset of the zero-filled 2-byte user-code slot, set only when
    /// the element did not carry a code of its own.
    pub code_offset: Option<usize>,
}

/// Encodes one element into the buffer.
///
/// Fails with `DuplicateVersionstamp` on a second unbound versionstamp
/// and `IntegerTooLarge` when a big-integer magnitude exceeds
/// [`MAX_INT_MAGNITUDE`] bytes.
pub fn encode_element(
    buf: &mut BytesMut,
    element: &TupleElement,
    vs: &mut VersionstampState,
) -> Result<(), TupleError> {
    match element {
        TupleElement::Nil => buf.put_u8(code::NIL),
        TupleElement::Bool(b) => buf.put_u8(if *b { code::TRUE } else { code::FALSE }),
        TupleElement::Bytes(b) => encode_byte_string(buf, code::BYTES, b),
        TupleElement::Text(s) => encode_byte_string(buf, code::TEXT, s.as_bytes()),
        TupleElement::Nested(items) => return encode_nested(buf, items, vs),
        TupleElement::Int(i) => encode_int(buf, *i),
        TupleElement::BigInt(i) => return encode_bigint(buf, i),
        TupleElement::Float32(f) => encode_float32(buf, f),
        TupleElement::Float64(f) => encode_float64(buf, f),
        TupleElement::Uuid(u) => encode_uuid(buf, u),
        TupleElement::Versionstamp(v) => encode_versionstamp(buf, v),
        TupleElement::UnboundVersionstamp(user_code) => {
            return encode_unbound_versionstamp(buf, *user_code, vs);
        }
    }
    Ok(())
}

/// Emits the type code, the payload with every 0x00 doubled to
/// `0x00 0xFF`, and the 0x00 terminator. Shared by `Bytes` and `Text`.
fn encode_byte_string(buf: &mut BytesMut, type_code: u8, payload: &[u8]) {
    buf.put_u8(type_code);
    for &b in payload {
        if b == 0x00 {
            buf.put_u8(0x00);
            buf.put_u8(code::ESCAPE);
        } else {
            buf.put_u8(b);
        }
    }
    buf.put_u8(0x00);
}

fn encode_nested(
    buf: &mut BytesMut,
    items: &[TupleElement],
    vs: &mut VersionstampState,
) -> Result<(), TupleError> {
    buf.put_u8(code::NESTED);
    for item in items {
        match item {
            // A Nil child gets an escape byte so it stays distinct from
            // the tuple terminator while still sorting first.
            TupleElement::Nil => {
                buf.put_u8(code::NIL);
                buf.put_u8(code::ESCAPE);
            }
            other => encode_element(buf, other, vs)?,
        }
    }
    buf.put_u8(0x00);
    Ok(())
}

/// Encodes an integer in the smallest magnitude frame: the type code is
/// `INT_ZERO` offset by the byte width, and negative magnitudes are
/// stored one's-complemented so larger negatives sort earlier.
fn encode_int(buf: &mut BytesMut, value: i64) {
    if value == 0 {
        buf.put_u8(code::INT_ZERO);
        return;
    }
    let magnitude = value.unsigned_abs();
    let width = transform::byte_width(magnitude);
    let be = magnitude.to_be_bytes();
    if value > 0 {
        buf.put_u8(code::INT_ZERO + width as u8);
        buf.put_slice(&be[8 - width..]);
    } else {
        buf.put_u8(code::INT_ZERO - width as u8);
        transform::put_inverted(buf, &be[8 - width..]);
    }
}

/// Encodes an arbitrary-precision integer. Magnitudes of up to 8 bytes
/// use the same frames as `encode_int`; larger ones use the extended
/// frames with an explicit length byte (inverted for negatives, keeping
/// longer negative magnitudes sorted before shorter ones).
fn encode_bigint(buf: &mut BytesMut, value: &BigInt) -> Result<(), TupleError> {
    let (sign, magnitude) = value.to_bytes_be();
    if sign == Sign::NoSign {
        buf.put_u8(code::INT_ZERO);
        return Ok(());
    }
    let width = magnitude.len();
    if width > MAX_INT_MAGNITUDE {
        return Err(TupleError::IntegerTooLarge);
    }
    let negative = sign == Sign::Minus;
    if width <= 8 {
        if negative {
            buf.put_u8(code::INT_ZERO - width as u8);
            transform::put_inverted(buf, &magnitude);
        } else {
            buf.put_u8(code::INT_ZERO + width as u8);
            buf.put_slice(&magnitude);
        }
    } else if negative {
        buf.put_u8(code::NEG_INT_EXTENDED);
        buf.put_u8(!(width as u8));
        transform::put_inverted(buf, &magnitude);
    } else {
        buf.put_u8(code::POS_INT_EXTENDED);
        buf.put_u8(width as u8);
        buf.put_slice(&magnitude);
    }
    Ok(())
}

fn encode_float32(buf: &mut BytesMut, f: &Float32) {
    buf.put_u8(code::FLOAT_32);
    let mut be = f.to_be_bytes();
    transform::float_to_wire(&mut be);
    buf.put_slice(&be);
}

fn encode_float64(buf: &mut BytesMut, f: &Float64) {
    buf.put_u8(code::FLOAT_64);
    let mut be = f.to_be_bytes();
    transform::float_to_wire(&mut be);
    buf.put_slice(&be);
}

fn encode_uuid(buf: &mut BytesMut, u: &Uuid) {
    buf.put_u8(code::UUID);
    buf.put_slice(u.as_bytes());
}

fn encode_versionstamp(buf: &mut BytesMut, v: &Versionstamp) {
    buf.put_u8(code::VERSIONSTAMP);
    buf.put_slice(&v.transaction_version);
    buf.put_u16(v.user_code);
}

/// Emits the versionstamp frame with a 0xFF-filled version slot and
/// records the slot offsets for post-commit stamping.
fn encode_unbound_versionstamp(
    buf: &mut BytesMut,
    user_code: Option<u16>,
    vs: &mut VersionstampState,
) -> Result<(), TupleError> {
    if vs.stamp_offset.is_some() {
        return Err(TupleError::DuplicateVersionstamp);
    }
    buf.put_u8(code::VERSIONSTAMP);
    vs.stamp_offset = Some(buf.len());
    buf.put_bytes(0xFF, 10);
    match user_code {
        Some(c) => buf.put_u16(c),
        None => {
            vs.code_offset = Some(buf.len());
            buf.put_u16(0);
        }
    }
    Ok(())
}
