//! Tuple element decoding: bytes → `TupleElement`.

use num_bigint::{BigInt, Sign};
use uuid::Uuid;

use super::code;
use super::transform;
use crate::error::TupleError;
use crate::types::{Float32, Float64, TupleElement, Versionstamp};

/// Per-call decoding options.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Attach the exact IEEE bytes to decoded floats so that re-encoding
    /// reproduces the input byte-for-byte (NaN payloads, -0.0).
    pub strict: bool,
    /// Offset of versionstamp payload bytes known to be unbound. A
    /// transaction layer that wrote a versionstamped key knows this
    /// offset even after the placeholder bytes were overwritten.
    pub versionstamp_hint: Option<usize>,
}

/// Decodes one element starting at `*pos`, advancing the cursor past it.
pub fn decode_element(
    buf: &[u8],
    pos: &mut usize,
    options: DecodeOptions,
) -> Result<TupleElement, TupleError> {
    let type_code = take_byte(buf, pos)?;
    match type_code {
        code::NIL => Ok(TupleElement::Nil),
        code::FALSE => Ok(TupleElement::Bool(false)),
        code::TRUE => Ok(TupleElement::Bool(true)),
        code::BYTES => Ok(TupleElement::Bytes(decode_byte_string(buf, pos)?)),
        code::TEXT => {
            let raw = decode_byte_string(buf, pos)?;
            let text = String::from_utf8(raw).map_err(|_| TupleError::InvalidUtf8)?;
            Ok(TupleElement::Text(text))
        }
        code::NESTED => decode_nested(buf, pos, options),
        code::INT_ZERO => Ok(TupleElement::Int(0)),
        0x0C..=0x13 => decode_fixed_int(buf, pos, (code::INT_ZERO - type_code) as usize, true),
        0x15..=0x1C => decode_fixed_int(buf, pos, (type_code - code::INT_ZERO) as usize, false),
        code::NEG_INT_EXTENDED => {
            let width = !take_byte(buf, pos)? as usize;
            decode_extended_int(buf, pos, width, true)
        }
        code::POS_INT_EXTENDED => {
            let width = take_byte(buf, pos)? as usize;
            decode_extended_int(buf, pos, width, false)
        }
        code::FLOAT_32 => decode_float32(buf, pos, options.strict),
        code::FLOAT_64 => decode_float64(buf, pos, options.strict),
        code::UUID => decode_uuid(buf, pos),
        code::VERSIONSTAMP => decode_versionstamp(buf, pos, options.versionstamp_hint),
        other => Err(TupleError::InvalidTypeCode(other)),
    }
}

fn take_byte(buf: &[u8], pos: &mut usize) -> Result<u8, TupleError> {
    let b = *buf.get(*pos).ok_or(TupleError::Truncated)?;
    *pos += 1;
    Ok(b)
}

fn take_slice<'a>(buf: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], TupleError> {
    let end = pos.checked_add(len).ok_or(TupleError::Truncated)?;
    let slice = buf.get(*pos..end).ok_or(TupleError::Truncated)?;
    *pos = end;
    Ok(slice)
}

/// Scans to the terminating 0x00, rewriting each `0x00 0xFF` escape pair
/// back to a single 0x00 payload byte.
fn decode_byte_string(buf: &[u8], pos: &mut usize) -> Result<Vec<u8>, TupleError> {
    let mut out = Vec::new();
    loop {
        match buf.get(*pos) {
            None => return Err(TupleError::Truncated),
            Some(0x00) => {
                if buf.get(*pos + 1) == Some(&code::ESCAPE) {
                    out.push(0x00);
                    *pos += 2;
                } else {
                    *pos += 1;
                    return Ok(out);
                }
            }
            Some(&b) => {
                out.push(b);
                *pos += 1;
            }
        }
    }
}

fn decode_nested(
    buf: &[u8],
    pos: &mut usize,
    options: DecodeOptions,
) -> Result<TupleElement, TupleError> {
    let mut items = Vec::new();
    loop {
        match buf.get(*pos) {
            None => return Err(TupleError::Truncated),
            Some(0x00) => {
                // 0x00 0xFF is an escaped Nil child; a lone 0x00 ends
                // the tuple.
                if buf.get(*pos + 1) == Some(&code::ESCAPE) {
                    items.push(TupleElement::Nil);
                    *pos += 2;
                } else {
                    *pos += 1;
                    return Ok(TupleElement::Nested(items));
                }
            }
            Some(_) => items.push(decode_element(buf, pos, options)?),
        }
    }
}

/// Decodes a fixed-width integer frame (magnitude of 1..=8 bytes),
/// promoting to `Int` whenever the value fits `i64`.
fn decode_fixed_int(
    buf: &[u8],
    pos: &mut usize,
    width: usize,
    negative: bool,
) -> Result<TupleElement, TupleError> {
    let raw = take_slice(buf, pos, width)?;
    let mut be = [0u8; 8];
    for (dst, &src) in be[8 - width..].iter_mut().zip(raw) {
        *dst = if negative { !src } else { src };
    }
    let magnitude = u64::from_be_bytes(be);
    if negative {
        if magnitude <= 1 << 63 {
            // wrapping_neg maps 2^63 to i64::MIN.
            Ok(TupleElement::Int(magnitude.wrapping_neg() as i64))
        } else {
            Ok(TupleElement::BigInt(-BigInt::from(magnitude)))
        }
    } else if magnitude <= i64::MAX as u64 {
        Ok(TupleElement::Int(magnitude as i64))
    } else {
        Ok(TupleElement::BigInt(BigInt::from(magnitude)))
    }
}

/// Decodes an extended integer frame. These always yield `BigInt`; the
/// encoder only emits them for magnitudes wider than 8 bytes.
fn decode_extended_int(
    buf: &[u8],
    pos: &mut usize,
    width: usize,
    negative: bool,
) -> Result<TupleElement, TupleError> {
    let raw = take_slice(buf, pos, width)?;
    let value = if negative {
        // Stored bytes are the one's complement of the magnitude; an
        // all-zero store therefore means -(2^(8*width) - 1), not zero.
        let inverted: Vec<u8> = raw.iter().map(|b| !b).collect();
        -BigInt::from_bytes_be(Sign::Plus, &inverted)
    } else {
        BigInt::from_bytes_be(Sign::Plus, raw)
    };
    Ok(TupleElement::BigInt(value))
}

fn decode_float32(buf: &[u8], pos: &mut usize, strict: bool) -> Result<TupleElement, TupleError> {
    let raw = take_slice(buf, pos, 4)?;
    let mut be = [0u8; 4];
    be.copy_from_slice(raw);
    transform::float_from_wire(&mut be);
    let f = if strict {
        Float32::from_raw(be)
    } else {
        Float32::new(f32::from_be_bytes(be))
    };
    Ok(TupleElement::Float32(f))
}

fn decode_float64(buf: &[u8], pos: &mut usize, strict: bool) -> Result<TupleElement, TupleError> {
    let raw = take_slice(buf, pos, 8)?;
    let mut be = [0u8; 8];
    be.copy_from_slice(raw);
    transform::float_from_wire(&mut be);
    let f = if strict {
        Float64::from_raw(be)
    } else {
        Float64::new(f64::from_be_bytes(be))
    };
    Ok(TupleElement::Float64(f))
}

fn decode_uuid(buf: &[u8], pos: &mut usize) -> Result<TupleElement, TupleError> {
    let raw = take_slice(buf, pos, 16)?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(raw);
    Ok(TupleElement::Uuid(Uuid::from_bytes(bytes)))
}

/// Decodes a versionstamp frame. The frame is unbound when the hint
/// names this payload offset or the version bytes are still the 0xFF
/// placeholder fill.
fn decode_versionstamp(
    buf: &[u8],
    pos: &mut usize,
    hint: Option<usize>,
) -> Result<TupleElement, TupleError> {
    let payload_offset = *pos;
    let raw = take_slice(buf, pos, 12)?;
    let user_code = u16::from_be_bytes([raw[10], raw[11]]);
    if hint == Some(payload_offset) || raw[..10].iter().all(|&b| b == 0xFF) {
        Ok(TupleElement::UnboundVersionstamp(Some(user_code)))
    } else {
        let mut version = [0u8; 10];
        version.copy_from_slice(&raw[..10]);
        Ok(TupleElement::Versionstamp(Versionstamp::new(version, user_code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::{encode_element, VersionstampState};
    use bytes::BytesMut;

    /// Encode then decode a single element and verify the round trip.
    fn round_trip(element: &TupleElement) -> TupleElement {
        let mut buf = BytesMut::new();
        let mut vs = VersionstampState::default();
        encode_element(&mut buf, element, &mut vs).expect("encode failed");
        let mut pos = 0;
        let decoded =
            decode_element(&buf, &mut pos, DecodeOptions::default()).expect("decode failed");
        assert_eq!(pos, buf.len(), "decoder left trailing bytes");
        decoded
    }

    fn decode_one(bytes: &[u8]) -> Result<TupleElement, TupleError> {
        let mut pos = 0;
        decode_element(bytes, &mut pos, DecodeOptions::default())
    }

    #[test]
    fn round_trip_nil_and_bools() {
        assert_eq!(round_trip(&TupleElement::Nil), TupleElement::Nil);
        for b in [false, true] {
            assert_eq!(round_trip(&TupleElement::Bool(b)), TupleElement::Bool(b));
        }
    }

    #[test]
    fn round_trip_byte_strings() {
        for payload in [
            &b""[..],
            b"foo",
            b"foo\x00bar",
            b"\x00",
            b"\x00\x00\x00\x04",
            b"\x00\xFF",
        ] {
            let element = TupleElement::Bytes(payload.to_vec());
            assert_eq!(round_trip(&element), element, "failed for {payload:02X?}");
        }
    }

    #[test]
    fn round_trip_text() {
        for s in ["", "hello", "F\u{00d4}O\u{0000}bar", "中文", "👾"] {
            let element = TupleElement::Text(s.into());
            assert_eq!(round_trip(&element), element, "failed for {s:?}");
        }
    }

    #[test]
    fn round_trip_nested() {
        let element = TupleElement::Nested(vec![
            TupleElement::Bytes(b"foo\x00bar".to_vec()),
            TupleElement::Nil,
            TupleElement::Nested(vec![TupleElement::Nil, TupleElement::Int(-3)]),
            TupleElement::Text("z".into()),
        ]);
        assert_eq!(round_trip(&element), element);
        assert_eq!(
            round_trip(&TupleElement::Nested(vec![])),
            TupleElement::Nested(vec![])
        );
    }

    #[test]
    fn round_trip_integers() {
        for i in [
            0,
            1,
            -1,
            255,
            256,
            -255,
            -256,
            5551212,
            -5551212,
            i64::MAX,
            i64::MIN,
            i64::MIN + 1,
        ] {
            assert_eq!(round_trip(&TupleElement::Int(i)), TupleElement::Int(i), "failed for {i}");
        }
    }

    #[test]
    fn round_trip_bigints() {
        for value in [
            BigInt::from(1u128 << 64),
            -BigInt::from(1u128 << 64),
            BigInt::from_bytes_be(Sign::Plus, &[0xFF; 255]),
            BigInt::from_bytes_be(Sign::Minus, &[0xFF; 255]),
            BigInt::from(1u128) << (8 * 254),
        ] {
            let element = TupleElement::BigInt(value);
            assert_eq!(round_trip(&element), element);
        }
    }

    #[test]
    fn small_bigint_magnitudes_decode_as_int() {
        assert_eq!(
            round_trip(&TupleElement::BigInt(BigInt::from(42))),
            TupleElement::Int(42)
        );
        assert_eq!(
            round_trip(&TupleElement::BigInt(BigInt::from(-42))),
            TupleElement::Int(-42)
        );
    }

    #[test]
    fn eight_byte_magnitudes_beyond_i64_decode_as_bigint() {
        assert_eq!(
            round_trip(&TupleElement::BigInt(BigInt::from(u64::MAX))),
            TupleElement::BigInt(BigInt::from(u64::MAX))
        );
        // |i64::MIN| still fits Int; one more does not.
        let below_min = -BigInt::from(1u128 << 63) - 1i32;
        assert_eq!(
            round_trip(&TupleElement::BigInt(below_min.clone())),
            TupleElement::BigInt(below_min)
        );
    }

    #[test]
    fn all_zero_negative_store_is_not_zero() {
        // 0x10 with four zero bytes stores -(2^32 - 1).
        assert_eq!(
            decode_one(&[0x10, 0x00, 0x00, 0x00, 0x00]).unwrap(),
            TupleElement::Int(-0xFFFFFFFF)
        );
    }

    #[test]
    fn round_trip_floats() {
        for v in [0.0f32, -0.0, 3.5, -3.5, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let element = TupleElement::Float32(Float32::new(v));
            assert_eq!(round_trip(&element), element, "failed for {v}");
        }
        for v in [0.0f64, -0.0, 3.5, -3.5, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let element = TupleElement::Float64(Float64::new(v));
            assert_eq!(round_trip(&element), element, "failed for {v}");
        }
    }

    #[test]
    fn strict_mode_preserves_float_bytes() {
        // Wire form of a negative NaN: sign bit clear on the wire.
        let wire = [0x21, 0x00, 0x07, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut pos = 0;
        let decoded = decode_element(
            &wire,
            &mut pos,
            DecodeOptions { strict: true, ..Default::default() },
        )
        .unwrap();
        match &decoded {
            TupleElement::Float64(f) => {
                assert!(f.value.is_nan());
                assert_eq!(f.raw, Some(0xFFF8000000000000u64.to_be_bytes()));
            }
            other => panic!("expected Float64, got {other}"),
        }

        let mut buf = BytesMut::new();
        let mut vs = VersionstampState::default();
        encode_element(&mut buf, &decoded, &mut vs).unwrap();
        assert_eq!(&buf[..], wire);
    }

    #[test]
    fn default_mode_drops_raw_bytes() {
        let wire = [0x20, 0xC0, 0x48, 0xF5, 0xC3];
        match decode_one(&wire).unwrap() {
            TupleElement::Float32(f) => assert_eq!(f.raw, None),
            other => panic!("expected Float32, got {other}"),
        }
    }

    #[test]
    fn round_trip_uuid() {
        let u = Uuid::parse_str("ffffffff-ba5e-ba11-0000-00005ca1ab1e").unwrap();
        assert_eq!(round_trip(&TupleElement::Uuid(u)), TupleElement::Uuid(u));
    }

    #[test]
    fn round_trip_versionstamp() {
        let v = Versionstamp::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x01, 0x02, 0x03], 657);
        assert_eq!(
            round_trip(&TupleElement::Versionstamp(v)),
            TupleElement::Versionstamp(v)
        );
    }

    #[test]
    fn placeholder_version_bytes_decode_as_unbound() {
        let mut wire = vec![0x33];
        wire.extend_from_slice(&[0xFF; 10]);
        wire.extend_from_slice(&[0x02, 0x91]);
        assert_eq!(
            decode_one(&wire).unwrap(),
            TupleElement::UnboundVersionstamp(Some(657))
        );
    }

    #[test]
    fn versionstamp_hint_marks_frame_unbound() {
        // A committed version that happens not to be all 0xFF.
        let v = Versionstamp::new([0x01; 10], 7);
        let mut wire = vec![0x33];
        wire.extend_from_slice(&v.to_bytes());

        assert_eq!(decode_one(&wire).unwrap(), TupleElement::Versionstamp(v));

        let mut pos = 0;
        let hinted = decode_element(
            &wire,
            &mut pos,
            DecodeOptions { versionstamp_hint: Some(1), ..Default::default() },
        )
        .unwrap();
        assert_eq!(hinted, TupleElement::UnboundVersionstamp(Some(7)));
    }

    #[test]
    fn unknown_type_code() {
        assert_eq!(decode_one(&[0x03]), Err(TupleError::InvalidTypeCode(0x03)));
        assert_eq!(decode_one(&[0x34]), Err(TupleError::InvalidTypeCode(0x34)));
    }

    #[test]
    fn truncated_inputs() {
        // String without terminator.
        assert_eq!(decode_one(b"\x01foo"), Err(TupleError::Truncated));
        // Escape pair cut short counts the 0x00 as terminator, leaving
        // the 0xFF unread; here the 0x00 is simply missing.
        assert_eq!(decode_one(b"\x02hi"), Err(TupleError::Truncated));
        // Integer frame missing magnitude bytes.
        assert_eq!(decode_one(&[0x16, 0x01]), Err(TupleError::Truncated));
        // Float frame cut short.
        assert_eq!(decode_one(&[0x21, 0x80, 0x00]), Err(TupleError::Truncated));
        // Nested tuple without terminator.
        assert_eq!(decode_one(&[0x05, 0x14]), Err(TupleError::Truncated));
        // Versionstamp frame cut short.
        assert_eq!(decode_one(&[0x33, 0xFF, 0xFF]), Err(TupleError::Truncated));
        // Empty input.
        assert_eq!(decode_one(&[]), Err(TupleError::Truncated));
    }

    #[test]
    fn invalid_utf8_in_text() {
        assert_eq!(decode_one(b"\x02\xC3\x28\x00"), Err(TupleError::InvalidUtf8));
    }
}
