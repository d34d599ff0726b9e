use std::{fmt, marker::PhantomData};

use nalgebra::DVector;
use simba::scalar::SupersetOf;

use super::{Projection, TensorSpline};
use crate::{error::Result, knot::KnotVector, misc::FloatingPoint};

/// Tensor-product spline whose stored coordinates are mapped to Euclidean space by `P`.
///
/// [`BSpline`](super::BSpline) and [`Nurbs`](super::Nurbs) are the two instances.
/// Parametric points are given as one coordinate per parametric dimension,
/// and results are Euclidean vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct Spline<T, P> {
    spline: TensorSpline<T>,
    projection: PhantomData<P>,
}

impl<T: FloatingPoint, P: Projection> Spline<T, P> {
    pub(crate) fn from_tensor(spline: TensorSpline<T>) -> Self {
        Self {
            spline,
            projection: PhantomData,
        }
    }

    /// Wrap a spline whose stored coordinates `P` accepts
    pub(crate) fn try_from_tensor(spline: TensorSpline<T>) -> Result<Self> {
        P::check(spline.grid())?;
        Ok(Self::from_tensor(spline))
    }

    /// The underlying spline over stored (for NURBS, homogeneous) coordinates
    pub fn tensor(&self) -> &TensorSpline<T> {
        &self.spline
    }

    pub fn parametric_dimension(&self) -> usize {
        self.spline.parametric_dimension()
    }

    /// Dimension of the Euclidean space the spline maps into
    pub fn dimension(&self) -> usize {
        P::dimension(self.spline.grid().coordinate_dimension())
    }

    pub fn is_rational(&self) -> bool {
        P::RATIONAL
    }

    pub fn knot_vectors(&self) -> &[KnotVector<T>] {
        self.spline.knot_vectors()
    }

    pub fn knot_vector(&self, dimension: usize) -> Result<&KnotVector<T>> {
        self.spline.knot_vector(dimension)
    }

    pub fn degrees(&self) -> &[usize] {
        self.spline.degrees()
    }

    pub fn degree(&self, dimension: usize) -> Result<usize> {
        self.spline.degree(dimension)
    }

    /// Number of control points along each parametric dimension
    pub fn number_of_control_points(&self) -> &[usize] {
        self.spline.number_of_control_points()
    }

    /// Closed parametric domain of one dimension
    pub fn domain(&self, dimension: usize) -> Result<(T, T)> {
        self.spline.domain(dimension)
    }

    /// Euclidean control points in grid order, first parametric dimension varying fastest
    pub fn control_points(&self) -> Vec<DVector<T>> {
        self.spline.grid().points().map(P::project).collect()
    }

    /// Evaluate the spline at one parametric point
    pub fn point_at(&self, u: &[T]) -> Result<DVector<T>> {
        P::differentiate(&self.spline, u, &vec![0; u.len()])
    }

    /// Partial derivative of the given order in each parametric dimension at one parametric point
    pub fn derivative_at(&self, u: &[T], orders: &[usize]) -> Result<DVector<T>> {
        P::differentiate(&self.spline, u, orders)
    }

    /// Evaluate the spline at every parametric point
    pub fn evaluate(&self, points: &[Vec<T>]) -> Result<Vec<DVector<T>>> {
        evaluate_all(points, |u| self.point_at(u))
    }

    /// Partial derivative of the same orders at every parametric point
    pub fn derivative(&self, points: &[Vec<T>], orders: &[usize]) -> Result<Vec<DVector<T>>> {
        evaluate_all(points, |u| self.derivative_at(u, orders))
    }

    /// Evaluate on a regular grid with `resolutions[d] + 1` values per dimension spanning
    /// each closed domain. Results are ordered with the first dimension varying fastest.
    pub fn sample(&self, resolutions: &[usize]) -> Result<Vec<DVector<T>>> {
        let points = self.spline.parameter_grid(resolutions)?;
        self.evaluate(&points)
    }

    /// Insert each knot once into one dimension, in order.
    /// The shape is unchanged. If any insertion fails, none is kept.
    ///
    /// # Example
    /// ```
    /// use tenspline::prelude::*;
    /// let mut spline = BSpline::try_new(
    ///     vec![vec![0., 0., 0.5, 1., 1.]],
    ///     vec![1],
    ///     vec![vec![0.], vec![0.75], vec![1.]],
    /// )
    /// .unwrap();
    /// spline.insert_knots(0, &[0.25]).unwrap();
    /// assert_eq!(spline.knot_vector(0).unwrap().to_vec(), vec![0., 0., 0.25, 0.5, 1., 1.]);
    /// assert!(spline.insert_knots(0, &[0.25, 0.25]).is_err());
    /// assert_eq!(spline.number_of_control_points(), &[4]);
    /// ```
    pub fn insert_knots(&mut self, dimension: usize, knots: &[T]) -> Result<()> {
        self.spline.insert_knots(dimension, knots)
    }

    /// Try to remove each knot once from one dimension, in order, keeping every removal
    /// that moves the spline by at most `tolerance`.
    /// Returns the number of removals kept, zero when none passes.
    pub fn remove_knots(&mut self, dimension: usize, knots: &[T], tolerance: T) -> Result<usize> {
        let tolerance = P::coordinate_tolerance(self.spline.grid(), tolerance);
        self.spline.remove_knots(dimension, knots, tolerance)
    }

    /// Raise the degree of one dimension by one without changing the shape
    pub fn elevate_degree(&mut self, dimension: usize) -> Result<()> {
        self.spline.elevate_degree(dimension)
    }

    /// Try to lower the degree of one dimension by one, moving the spline by at most `tolerance`.
    /// Returns `false` and leaves the spline unchanged when that is not possible.
    pub fn reduce_degree(&mut self, dimension: usize, tolerance: T) -> Result<bool> {
        let tolerance = P::coordinate_tolerance(self.spline.grid(), tolerance);
        self.spline.reduce_degree(dimension, tolerance)
    }

    /// Number of Bézier elements along one dimension and the knots to insert for
    /// Bézier extraction
    pub fn bezier_extraction_knots(&self, dimension: usize) -> Result<(usize, Vec<T>)> {
        self.spline.bezier_extraction_knots(dimension)
    }

    /// Largest distance of a control point from the origin.
    /// The spline lies in the convex hull of its control points, so no point of it is farther away.
    pub fn maximum_distance_from_origin_bound(&self) -> T {
        self.spline
            .grid()
            .points()
            .map(|p| P::project(p).norm())
            .fold(T::zero(), |acc, n| acc.max(n))
    }

    /// Compare with another spline, allowing knots and stored coordinates to differ by `tolerance`
    pub fn is_equal(&self, other: &Self, tolerance: T) -> bool {
        self.spline.is_equal(&other.spline, tolerance)
    }

    /// Cast the spline to another floating point type
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> Spline<F, P> {
        Spline::from_tensor(self.spline.cast())
    }
}

impl<T, P: Projection> fmt::Display for Spline<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", P::NAME)
    }
}

/// Serialized as the underlying [`TensorSpline`]
#[cfg(feature = "serde")]
impl<T, P> serde::Serialize for Spline<T, P>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.spline.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, P> serde::Deserialize<'de> for Spline<T, P>
where
    T: FloatingPoint + serde::Deserialize<'de>,
    P: Projection,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let spline = TensorSpline::<T>::deserialize(deserializer)?;
        Self::try_from_tensor(spline).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "parallel")]
fn evaluate_all<T, F>(points: &[Vec<T>], f: F) -> Result<Vec<DVector<T>>>
where
    T: FloatingPoint,
    F: Fn(&[T]) -> Result<DVector<T>> + Sync + Send,
{
    use rayon::prelude::*;
    points.par_iter().map(|u| f(u)).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all<T, F>(points: &[Vec<T>], f: F) -> Result<Vec<DVector<T>>>
where
    T: FloatingPoint,
    F: Fn(&[T]) -> Result<DVector<T>>,
{
    points.iter().map(|u| f(u)).collect()
}
