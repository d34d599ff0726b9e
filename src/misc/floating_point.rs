use std::{fmt::LowerExp, str::FromStr};

use nalgebra::RealField;
use num_traits::ToPrimitive;

/// Trait for floating point types (f32, f64)
/// Mainly used to identify the type of the field in nalgebra,
/// and to read and write reals in the canonical text form
pub trait FloatingPoint: RealField + ToPrimitive + Copy + LowerExp + FromStr {}

impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
