pub mod b_spline;
pub mod nurbs;
pub mod projected_spline;
pub mod projection;
pub mod tensor_spline;

pub use b_spline::*;
pub use nurbs::*;
pub use projected_spline::*;
pub use projection::*;
pub use tensor_spline::*;
