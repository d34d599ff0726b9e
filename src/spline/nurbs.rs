use nalgebra::DVector;

use super::{Homogeneous, Projection, Spline, TensorSpline};
use crate::{
    error::{ensure_valid, Result},
    grid::ControlGrid,
    knot::KnotVector,
    misc::FloatingPoint,
};

/// Tensor-product NURBS.
/// Control points are stored in homogeneous coordinates `(x·w, w)`.
pub type Nurbs<T> = Spline<T, Homogeneous>;

impl<T: FloatingPoint> Nurbs<T> {
    /// Create a NURBS from one knot vector and one degree per parametric dimension,
    /// the Euclidean control points in grid order and one positive weight per control point.
    /// # Example
    /// ```
    /// use tenspline::prelude::*;
    /// let spline = Nurbs::try_new(
    ///     vec![vec![0., 0., 0.5, 1., 1.]],
    ///     vec![1],
    ///     vec![vec![0.], vec![0.75], vec![1.]],
    ///     vec![2., 2., 2.],
    /// )
    /// .unwrap();
    /// assert_eq!(spline.homogeneous_control_points()[1].as_slice(), &[1.5, 2.]);
    /// assert_eq!(spline.control_points()[1].as_slice(), &[0.75]);
    /// assert_eq!(spline.to_string(), "<Nurbs>");
    /// ```
    pub fn try_new(
        knot_vectors: Vec<Vec<T>>,
        degrees: Vec<usize>,
        control_points: Vec<Vec<T>>,
        weights: Vec<T>,
    ) -> Result<Self> {
        ensure_valid!(
            weights.len() == control_points.len(),
            "got {} weights for {} control points",
            weights.len(),
            control_points.len()
        );
        ensure_valid!(
            weights.iter().all(|w| w.is_finite() && *w > T::zero()),
            "weights must be finite and positive"
        );
        let homogeneous: Vec<Vec<T>> = control_points
            .iter()
            .zip(weights.iter())
            .map(|(point, weight)| {
                point
                    .iter()
                    .map(|c| *c * *weight)
                    .chain(std::iter::once(*weight))
                    .collect()
            })
            .collect();
        Self::try_from_homogeneous(knot_vectors, degrees, homogeneous)
    }

    /// Create a NURBS from control points already in homogeneous coordinates, weight last
    pub fn try_from_homogeneous(
        knot_vectors: Vec<Vec<T>>,
        degrees: Vec<usize>,
        homogeneous_control_points: Vec<Vec<T>>,
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
        let grid = ControlGrid::try_from_points(shape, &homogeneous_control_points)?;
        let spline = TensorSpline::try_new(knot_vectors, degrees, grid)?;
        Self::try_from_tensor(spline)
    }

    /// Control points as stored, `(x·w, w)`, in grid order
    pub fn homogeneous_control_points(&self) -> Vec<DVector<T>> {
        self.tensor()
            .grid()
            .points()
            .map(DVector::from_column_slice)
            .collect()
    }

    /// Weight of every control point in grid order
    pub fn weights(&self) -> Vec<T> {
        Homogeneous::weights(self.tensor().grid()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::Nurbs;
    use crate::error::SplineError;

    fn quarter_circle() -> Nurbs<f64> {
        Nurbs::try_new(
            vec![vec![0., 0., 0., 1., 1., 1.]],
            vec![2],
            vec![vec![1., 0.], vec![1., 1.], vec![0., 1.]],
            vec![1., std::f64::consts::FRAC_1_SQRT_2, 1.],
        )
        .unwrap()
    }

    #[test]
    fn weights_must_be_positive() {
        let knots = vec![vec![0., 0., 0.5, 1., 1.]];
        let points = vec![vec![0.], vec![0.75], vec![1.]];
        assert!(matches!(
            Nurbs::try_new(knots.clone(), vec![1], points.clone(), vec![1., 0., 1.]),
            Err(SplineError::Construction(_))
        ));
        assert!(Nurbs::try_new(knots.clone(), vec![1], points.clone(), vec![1., -1., 1.]).is_err());
        assert!(Nurbs::try_new(knots, vec![1], points, vec![1., 1.]).is_err());
    }

    #[test]
    fn weights_view() {
        let circle = quarter_circle();
        assert!(circle.is_rational());
        assert_eq!(circle.dimension(), 2);
        assert_relative_eq!(circle.weights()[1], std::f64::consts::FRAC_1_SQRT_2);
        let homogeneous = circle.homogeneous_control_points();
        assert_relative_eq!(homogeneous[1][0], std::f64::consts::FRAC_1_SQRT_2);
        assert_relative_eq!(homogeneous[1][2], std::f64::consts::FRAC_1_SQRT_2);
        assert_relative_eq!(circle.control_points()[1][1], 1., epsilon = 1e-15);
    }

    #[test]
    fn quarter_circle_is_exact() {
        let circle = quarter_circle();
        for point in circle.sample(&[20]).unwrap() {
            assert_relative_eq!(point.norm(), 1., epsilon = 1e-14);
        }
        let start = circle.point_at(&[0.]).unwrap();
        assert_relative_eq!(start[0], 1.);
        assert_relative_eq!(start[1], 0.);
    }

    #[test]
    fn rational_derivatives() {
        let circle = quarter_circle();
        let first = circle.derivative_at(&[0.], &[1]).unwrap();
        assert_relative_eq!(first[0], 0., epsilon = 1e-14);
        assert_relative_eq!(first[1], 2f64.sqrt(), epsilon = 1e-14);

        let second = circle.derivative_at(&[0.], &[2]).unwrap();
        assert_relative_eq!(second[0], -2., epsilon = 1e-12);
        assert_relative_eq!(second[1], 0.828427124746, epsilon = 1e-10);

        let first = circle.derivative_at(&[0.3], &[1]).unwrap();
        assert_relative_eq!(first[0], -0.71158171, epsilon = 1e-7);
        assert_relative_eq!(first[1], 1.44709549, epsilon = 1e-7);

        // tangent of a circle is perpendicular to the radius
        let point = circle.point_at(&[0.3]).unwrap();
        assert_relative_eq!(point.dot(&first), 0., epsilon = 1e-12);
    }

    #[test]
    fn rational_derivative_beyond_degree() {
        // a rational curve keeps nonzero derivatives above its polynomial degree
        let circle = quarter_circle();
        let third = circle.derivative_at(&[0.5], &[3]).unwrap();
        assert!(third.norm() > 0.);
    }

    #[test]
    fn uniform_weights_match_the_polynomial_spline() {
        let nurbs = Nurbs::try_new(
            vec![vec![0., 0., 0.5, 1., 1.]],
            vec![1],
            vec![vec![0.], vec![0.75], vec![1.]],
            vec![2., 2., 2.],
        )
        .unwrap();
        assert_relative_eq!(nurbs.point_at(&[0.25]).unwrap()[0], 0.375, epsilon = 1e-15);
        assert_relative_eq!(
            nurbs.derivative_at(&[0.25], &[1]).unwrap()[0],
            1.5,
            epsilon = 1e-14
        );
        assert_eq!(nurbs.weights(), vec![2., 2., 2.]);
    }
}
