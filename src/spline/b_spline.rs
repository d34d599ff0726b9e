use super::{Euclidean, Spline, TensorSpline};
use crate::{
    error::Result,
    grid::ControlGrid,
    knot::KnotVector,
    misc::FloatingPoint,
};

/// Non-rational tensor-product B-spline
pub type BSpline<T> = Spline<T, Euclidean>;

impl<T: FloatingPoint> BSpline<T> {
    /// Create a B-spline from one knot vector and one degree per parametric dimension
    /// and the control points in grid order, first parametric dimension varying fastest.
    /// # Example
    /// ```
    /// use tenspline::prelude::*;
    /// let spline = BSpline::try_new(
    ///     vec![vec![0., 0., 0.5, 1., 1.]],
    ///     vec![1],
    ///     vec![vec![0.], vec![0.75], vec![1.]],
    /// )
    /// .unwrap();
    /// assert_eq!(spline.point_at(&[0.25]).unwrap()[0], 0.375);
    /// assert_eq!(spline.derivative_at(&[0.25], &[1]).unwrap()[0], 1.5);
    /// assert_eq!(spline.to_string(), "<BSpline>");
    /// ```
    pub fn try_new(
        knot_vectors: Vec<Vec<T>>,
        degrees: Vec<usize>,
        control_points: Vec<Vec<T>>,
    ) -> Result<Self> {
        let knot_vectors = knot_vectors
            .into_iter()
            .map(KnotVector::try_new)
            .collect::<Result<Vec<_>>>()?;
        let shape = knot_vectors
            .iter()
            .zip(degrees.iter())
            .map(|(knots, degree)| knots.number_of_basis_functions(*degree))
            .collect();
        let grid = ControlGrid::try_from_points(shape, &control_points)?;
        let spline = TensorSpline::try_new(knot_vectors, degrees, grid)?;
        Ok(Self::from_tensor(spline))
    }
}
