//! Element-level binary encoding for the tuple format.
//!
//! Each element is a one-byte type code followed by a payload laid out
//! so that unsigned byte comparison of whole encodings matches the
//! logical order of the elements. Big-endian byte ordering throughout.

pub mod code;
pub mod decode;
pub mod encode;
mod transform;

pub use decode::{decode_element, DecodeOptions};
pub use encode::{encode_element, VersionstampState};
