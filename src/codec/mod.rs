//! Canonical text form of splines.
//!
//! Every real is written as the shortest decimal that reads back to the same value,
//! without trailing zeros, so `0.5` is written `"0.5"` and `2.0` is written `"2"`.
//! Degrees and counts are written as integers.

pub mod real_format;
pub mod spline_text;

pub use real_format::*;
pub use spline_text::*;
