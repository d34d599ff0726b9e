use std::fmt::Debug;

use nalgebra::DVector;

use super::TensorSpline;
use crate::{
    error::{ensure_valid, Result, SplineError},
    grid::{ControlGrid, GridIndex},
    misc::{Binomial, FloatingPoint},
};

/// Maps the coordinates stored in a [`TensorSpline`] to Euclidean space.
pub trait Projection: Clone + Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Type tag shown by `Display`
    const NAME: &'static str;
    /// Whether control points carry weights
    const RATIONAL: bool;

    /// Euclidean dimension for a given number of stored coordinates
    fn dimension(coordinate_dimension: usize) -> usize;

    /// Euclidean coordinates of one stored control point
    fn project<T: FloatingPoint>(coordinates: &[T]) -> DVector<T>;

    /// Euclidean partial derivative of the given orders at `u`; all-zero orders evaluate the spline
    fn differentiate<T: FloatingPoint>(
        spline: &TensorSpline<T>,
        u: &[T],
        orders: &[usize],
    ) -> Result<DVector<T>>;

    /// Checks that the stored coordinates describe control points of this kind
    fn check<T: FloatingPoint>(grid: &ControlGrid<T>) -> Result<()>;

    /// Weight of every control point, if any
    fn weights<T: FloatingPoint>(grid: &ControlGrid<T>) -> Option<Vec<T>>;

    /// Converts a Euclidean tolerance to one on the stored coordinates
    fn coordinate_tolerance<T: FloatingPoint>(grid: &ControlGrid<T>, tolerance: T) -> T;
}

/// Identity projection of non-rational B-splines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Euclidean;

/// Projection of homogeneous coordinates `(x·w, w)` to `x`, used by NURBS
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Homogeneous;

impl Projection for Euclidean {
    const NAME: &'static str = "BSpline";
    const RATIONAL: bool = false;

    fn dimension(coordinate_dimension: usize) -> usize {
        coordinate_dimension
    }

    fn project<T: FloatingPoint>(coordinates: &[T]) -> DVector<T> {
        DVector::from_column_slice(coordinates)
    }

    fn differentiate<T: FloatingPoint>(
        spline: &TensorSpline<T>,
        u: &[T],
        orders: &[usize],
    ) -> Result<DVector<T>> {
        spline.evaluate_coordinates(u, orders)
    }

    fn check<T: FloatingPoint>(_grid: &ControlGrid<T>) -> Result<()> {
        Ok(())
    }

    fn weights<T: FloatingPoint>(_grid: &ControlGrid<T>) -> Option<Vec<T>> {
        None
    }

    fn coordinate_tolerance<T: FloatingPoint>(_grid: &ControlGrid<T>, tolerance: T) -> T {
        tolerance
    }
}

impl Projection for Homogeneous {
    const NAME: &'static str = "Nurbs";
    const RATIONAL: bool = true;

    fn dimension(coordinate_dimension: usize) -> usize {
        coordinate_dimension - 1
    }

    fn project<T: FloatingPoint>(coordinates: &[T]) -> DVector<T> {
        let (weight, point) = match coordinates.split_last() {
            Some(split) => split,
            None => return DVector::zeros(0),
        };
        DVector::from_iterator(point.len(), point.iter().map(|c| *c / *weight))
    }

    /// Quotient rule over every multi-index `j <= orders`:
    /// `C(k) = (A(k) - Σ_{0 != j <= k} Π_d binom(k_d, j_d) · w(j) · C(k - j)) / w`,
    /// where `A` are the leading coordinates and `w` the weight of the homogeneous derivatives.
    fn differentiate<T: FloatingPoint>(
        spline: &TensorSpline<T>,
        u: &[T],
        orders: &[usize],
    ) -> Result<DVector<T>> {
        let local = spline.local_basis(u, orders)?;
        let dimension = Self::dimension(spline.grid().coordinate_dimension());

        let lengths = orders
            .iter()
            .map(|k| k.checked_add(1))
            .collect::<Option<Vec<usize>>>()
            .filter(|lengths| {
                lengths
                    .iter()
                    .try_fold(1usize, |count, n| count.checked_mul(*n))
                    .is_some()
            })
            .ok_or_else(|| SplineError::DerivativeOrderOverflow {
                orders: orders.to_vec(),
            })?;
        let strides: Vec<usize> = lengths
            .iter()
            .scan(1, |stride, n| {
                let current = *stride;
                *stride *= n;
                Some(current)
            })
            .collect();
        let linear = |index: &[usize]| -> usize {
            index.iter().zip(strides.iter()).map(|(i, s)| i * s).sum()
        };

        let homogeneous: Vec<DVector<T>> = GridIndex::new(&lengths)
            .map(|j| spline.contract(&local, &j))
            .collect();
        let weight = homogeneous[0][dimension];

        let mut binomial = Binomial::<T>::new();
        let mut derivatives: Vec<DVector<T>> = Vec::with_capacity(homogeneous.len());
        for k in GridIndex::new(&lengths) {
            let mut numerator = homogeneous[linear(&k)].rows(0, dimension).into_owned();
            let lower: Vec<usize> = k.iter().map(|k| k + 1).collect();
            for j in GridIndex::new(&lower).skip(1) {
                let rest: Vec<usize> = k.iter().zip(j.iter()).map(|(k, j)| k - j).collect();
                let coefficient = binomial.product(&k, &j) * homogeneous[linear(&j)][dimension];
                numerator -= &derivatives[linear(&rest)] * coefficient;
            }
            derivatives.push(numerator / weight);
        }

        Ok(derivatives
            .pop()
            .unwrap_or_else(|| DVector::zeros(dimension)))
    }

    fn check<T: FloatingPoint>(grid: &ControlGrid<T>) -> Result<()> {
        ensure_valid!(
            grid.coordinate_dimension() >= 2,
            "homogeneous control points need a coordinate and a weight"
        );
        let last = grid.coordinate_dimension() - 1;
        ensure_valid!(
            grid.points().all(|p| p[last] > T::zero()),
            "weights must be finite and positive"
        );
        Ok(())
    }

    fn weights<T: FloatingPoint>(grid: &ControlGrid<T>) -> Option<Vec<T>> {
        let last = grid.coordinate_dimension() - 1;
        Some(grid.points().map(|p| p[last]).collect())
    }

    /// Deviation of homogeneous control points bounds the Euclidean one after scaling by
    /// `w_min / (1 + max |P|)` (NURBS book, eq. 5.30)
    fn coordinate_tolerance<T: FloatingPoint>(grid: &ControlGrid<T>, tolerance: T) -> T {
        let last = grid.coordinate_dimension() - 1;
        let minimum_weight = grid
            .points()
            .map(|p| p[last])
            .reduce(|acc, w| acc.min(w))
            .unwrap_or(T::one());
        let maximum_norm = grid
            .points()
            .map(|p| Self::project(p).norm())
            .fold(T::zero(), |acc, n| acc.max(n));
        tolerance * minimum_weight / (T::one() + maximum_norm)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    use super::{Euclidean, Homogeneous, Projection};
    use crate::grid::ControlGrid;

    #[test]
    fn project() {
        assert_eq!(
            Homogeneous::project(&[1.5, 3., 2.]),
            DVector::from_vec(vec![0.75, 1.5])
        );
        assert_eq!(Euclidean::project(&[1.5, 3.]), DVector::from_vec(vec![1.5, 3.]));
        assert_eq!(Homogeneous::dimension(3), 2);
        assert_eq!(Euclidean::dimension(3), 3);
    }

    #[test]
    fn tolerance_scaling() {
        let grid = ControlGrid::try_from_points(vec![2], &[vec![0., 0.5], vec![6., 2.]]).unwrap();
        assert_eq!(Homogeneous::weights(&grid), Some(vec![0.5, 2.]));
        assert_eq!(Euclidean::weights(&grid), None);
        assert_relative_eq!(Homogeneous::coordinate_tolerance(&grid, 1e-3), 1e-3 * 0.5 / 4.);
        assert_eq!(Euclidean::coordinate_tolerance(&grid, 1e-3), 1e-3);
    }
}
