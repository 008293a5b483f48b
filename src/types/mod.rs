//! Tuple element types.

mod element;

pub use element::{Float32, Float64, TupleElement, Versionstamp};
