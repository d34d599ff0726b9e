#![allow(clippy::needless_range_loop)]
//! Tensor-product B-splines and NURBS of any parametric and physical dimension.
//!
//! Splines are evaluated and differentiated at parametric points, sampled on regular
//! grids, and restructured in place by knot insertion, knot removal, degree elevation
//! and degree reduction, one parametric dimension at a time.
//!
//! ```
//! use tenspline::prelude::*;
//!
//! let mut spline = BSpline::try_new(
//!     vec![vec![0., 0., 0.5, 1., 1.]],
//!     vec![1],
//!     vec![vec![0.], vec![0.75], vec![1.]],
//! )
//! .unwrap();
//! spline.elevate_degree(0).unwrap();
//! assert_eq!(spline.degree(0).unwrap(), 2);
//! assert!(spline.reduce_degree(0, DEFAULT_TOLERANCE).unwrap());
//! assert_eq!(spline.degree(0).unwrap(), 1);
//! ```

mod codec;
mod error;
mod grid;
mod knot;
mod misc;
mod refinement;
mod spline;

/// Tolerance suggested for knot removal and degree reduction that should only undo exact refinements
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

pub mod prelude {
    pub use crate::codec::*;
    pub use crate::error::*;
    pub use crate::grid::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
    pub use crate::refinement::{Acceptance, Slabs};
    pub use crate::refinement::bezier::{elevate_segment, reduce_segment};
    pub use crate::spline::*;
    pub use crate::DEFAULT_TOLERANCE;
}
