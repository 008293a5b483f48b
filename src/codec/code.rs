//! Tuple type code constants.

// Nil sorts before every other element.
pub const NIL: u8 = 0x00;

// Byte and text strings: payload with embedded 0x00 escaped, then a
// 0x00 terminator. Text uses a higher code so all text sorts after all
// byte strings.
pub const BYTES: u8 = 0x01;
pub const TEXT: u8 = 0x02;

// Nested tuple: encoded children, then a 0x00 terminator. A Nil child
// is followed by an escape byte to keep it distinct from the terminator.
pub const NESTED: u8 = 0x05;

// Integers. INT_ZERO ± n encodes an n-byte magnitude (n in 1..=8);
// negative magnitudes are stored one's-complemented so they sort
// below zero in the right order. The extended frames carry an explicit
// length byte for magnitudes of up to 255 bytes (inverted for the
// negative frame).
pub const NEG_INT_EXTENDED: u8 = 0x0B;
pub const INT_ZERO: u8 = 0x14;
pub const POS_INT_EXTENDED: u8 = 0x1D;

// IEEE 754 floats, big-endian, sign-adjusted for unsigned comparison.
pub const FLOAT_32: u8 = 0x20;
pub const FLOAT_64: u8 = 0x21;

// Boolean: false sorts before true.
pub const FALSE: u8 = 0x26;
pub const TRUE: u8 = 0x27;

// RFC 4122 UUID, 16 bytes.
pub const UUID: u8 = 0x30;

// Versionstamp: 10-byte commit version + 2-byte user code.
pub const VERSIONSTAMP: u8 = 0x33;

// Follows a 0x00 that is payload rather than terminator.
pub const ESCAPE: u8 = 0xFF;
