//! Whole-tuple packing and unpacking, key ranges, and versionstamp
//! binding.
//!
//! This layer drives the element codec over entire tuples. Packing is
//! prefix-composable: packing a concatenation of sequences equals the
//! concatenation of their packings.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{decode_element, encode_element, DecodeOptions, VersionstampState};
use crate::error::TupleError;
use crate::types::{TupleElement, Versionstamp};

const INITIAL_CAPACITY: usize = 64;

/// Packs a sequence of elements into an order-preserving key.
///
/// An empty sequence packs to an empty buffer. Fails with
/// `IncompleteVersionstamp` if the tuple contains an unbound
/// versionstamp; use [`pack_with_versionstamp`] for those.
pub fn pack(elements: &[TupleElement]) -> Result<Bytes, TupleError> {
    let (buf, vs) = pack_inner(elements)?;
    if vs.stamp_offset.is_some() {
        return Err(TupleError::IncompleteVersionstamp);
    }
    tracing::trace!(elements = elements.len(), bytes = buf.len(), "packed tuple");
    Ok(buf.freeze())
}

/// A packed tuple whose versionstamp slot is still unresolved.
///
/// Produced by [`pack_with_versionstamp`]; the offsets name the
/// placeholder bytes a transaction layer overwrites once the commit
/// version is known. Distinct from the plain packed buffer so the two
/// cannot be mixed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedWithVersionstamp {
    /// Encoded tuple with 0xFF placeholder bytes in the version slot.
    pub data: BytesMut,
    /// Offset of the 10-byte commit-version slot.
    pub stamp_offset: usize,
    /// Offset of the zero-filled 2-byte user-code slot, present only
    /// when the element did not carry its own code.
    pub code_offset: Option<usize>,
}

impl PackedWithVersionstamp {
    /// Writes the committed version into the placeholder bytes, along
    /// with the user code when the slot was left open.
    ///
    /// Fails with `MissingCode` if the code slot is open and no code is
    /// supplied.
    pub fn bake(
        &mut self,
        transaction_version: &[u8; 10],
        user_code: Option<u16>,
    ) -> Result<(), TupleError> {
        let code_slot = match self.code_offset {
            Some(offset) => Some((offset, user_code.ok_or(TupleError::MissingCode)?)),
            None => None,
        };
        self.data[self.stamp_offset..self.stamp_offset + 10]
            .copy_from_slice(transaction_version);
        if let Some((offset, code)) = code_slot {
            self.data[offset..offset + 2].copy_from_slice(&code.to_be_bytes());
        }
        tracing::trace!(offset = self.stamp_offset, "baked versionstamp into key");
        Ok(())
    }

    /// Hands off the (baked) key.
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

/// Packs a tuple containing exactly one unbound versionstamp, reporting
/// the placeholder offsets alongside the buffer.
///
/// Fails with `UnexpectedVersionstamp` when the tuple has no unbound
/// versionstamp and `DuplicateVersionstamp` when it has more than one.
pub fn pack_with_versionstamp(
    elements: &[TupleElement],
) -> Result<PackedWithVersionstamp, TupleError> {
    let (data, vs) = pack_inner(elements)?;
    let stamp_offset = vs.stamp_offset.ok_or(TupleError::UnexpectedVersionstamp)?;
    tracing::trace!(
        elements = elements.len(),
        bytes = data.len(),
        stamp_offset,
        "packed tuple with versionstamp placeholder"
    );
    Ok(PackedWithVersionstamp {
        data,
        stamp_offset,
        code_offset: vs.code_offset,
    })
}

fn pack_inner(
    elements: &[TupleElement],
) -> Result<(BytesMut, VersionstampState), TupleError> {
    let mut buf = BytesMut::with_capacity(INITIAL_CAPACITY);
    let mut vs = VersionstampState::default();
    for element in elements {
        encode_element(&mut buf, element, &mut vs)?;
    }
    Ok((buf, vs))
}

/// Unpacks a key into its element sequence.
pub fn unpack(buf: &[u8]) -> Result<Vec<TupleElement>, TupleError> {
    unpack_with(buf, DecodeOptions::default())
}

/// Unpacks preserving exact IEEE float bytes, so that re-packing the
/// result reproduces `buf` byte-for-byte.
pub fn unpack_strict(buf: &[u8]) -> Result<Vec<TupleElement>, TupleError> {
    unpack_with(buf, DecodeOptions { strict: true, ..Default::default() })
}

/// Unpacks with explicit [`DecodeOptions`].
pub fn unpack_with(buf: &[u8], options: DecodeOptions) -> Result<Vec<TupleElement>, TupleError> {
    let mut elements = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        elements.push(decode_element(buf, &mut pos, options)?);
    }
    tracing::trace!(bytes = buf.len(), elements = elements.len(), "unpacked tuple");
    Ok(elements)
}

/// The inclusive-exclusive byte range of every key extending a tuple
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub begin: Bytes,
    pub end: Bytes,
}

/// Computes the key range covering every tuple that starts with
/// `prefix`: the packed prefix followed by 0x00 and 0xFF respectively.
pub fn range(prefix: &[TupleElement]) -> Result<KeyRange, TupleError> {
    let packed = pack(prefix)?;
    let mut begin = BytesMut::with_capacity(packed.len() + 1);
    begin.put_slice(&packed);
    begin.put_u8(0x00);
    let mut end = BytesMut::with_capacity(packed.len() + 1);
    end.put_slice(&packed);
    end.put_u8(0xFF);
    Ok(KeyRange {
        begin: begin.freeze(),
        end: end.freeze(),
    })
}

/// Resolves unbound versionstamps in place once the enclosing
/// transaction has committed, recursing into nested tuples.
///
/// Each placeholder becomes a bound [`Versionstamp`] carrying the
/// committed version and the element's own user code, falling back to
/// `user_code`. Fails with `MissingCode` when neither is present.
pub fn bake_versionstamp(
    elements: &mut [TupleElement],
    transaction_version: &[u8; 10],
    user_code: Option<u16>,
) -> Result<(), TupleError> {
    for element in elements.iter_mut() {
        match element {
            TupleElement::UnboundVersionstamp(code) => {
                let code = code.or(user_code).ok_or(TupleError::MissingCode)?;
                *element =
                    TupleElement::Versionstamp(Versionstamp::new(*transaction_version, code));
            }
            TupleElement::Nested(items) => {
                bake_versionstamp(items, transaction_version, user_code)?;
            }
            _ => {}
        }
    }
    Ok(())
}
