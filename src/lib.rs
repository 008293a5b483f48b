//! OrdPack — an order-preserving binary tuple encoding.
//!
//! This crate implements a self-describing serialization format for
//! heterogeneous tuples of typed values. Packing a tuple yields a byte
//! string whose unsigned lexicographic order equals the logical order of
//! the tuples it encodes, which makes the format suitable as a key
//! encoding for ordered key-value stores.
//!
//! # Architecture
//!
//! - **`codec`** — Element-level binary encoding/decoding
//! - **`pack`** — Whole-tuple pack/unpack, key ranges, versionstamp binding
//! - **`types`** — Tuple element types
//! - **`error`** — Error taxonomy
//!
//! # Example
//!
//! ```
//! use ordpack::{pack, unpack, TupleElement};
//!
//! let tuple = vec![
//!     TupleElement::Text("users".into()),
//!     TupleElement::Int(42),
//! ];
//! let key = pack(&tuple).unwrap();
//! assert_eq!(unpack(&key).unwrap(), tuple);
//! ```

pub mod codec;
pub mod error;
pub mod pack;
pub mod types;

pub use codec::DecodeOptions;
pub use error::TupleError;
pub use pack::{
    bake_versionstamp, pack, pack_with_versionstamp, range, unpack, unpack_strict, unpack_with,
    KeyRange, PackedWithVersionstamp,
};
pub use types::{Float32, Float64, TupleElement, Versionstamp};
