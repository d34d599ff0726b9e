//! Knot insertion, knot removal, Bézier decomposition, degree elevation and degree reduction
//! along one parametric dimension.
//!
//! The algorithms are the univariate ones of the NURBS book, applied to [`Slabs`]:
//! each slab concatenates every control point that shares one index along the
//! dimension, so one affine combination of slabs updates the whole tensor grid.

pub mod bezier;
pub mod degree_elevation;
pub mod degree_reduction;
pub mod knot_insertion;
pub mod knot_removal;

use nalgebra::DVector;

use crate::{
    error::{ensure_valid, Result},
    knot::KnotVector,
    misc::FloatingPoint,
};

/// Decides whether an approximate structural change is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Acceptance<T> {
    /// Every change is kept, used by exact operations
    Always,
    /// Changes whose control points move at most this far are kept
    Within(T),
}

impl<T: FloatingPoint> Acceptance<T> {
    pub fn accepts(&self, deviation: T) -> bool {
        match self {
            Acceptance::Always => true,
            Acceptance::Within(tolerance) => deviation <= *tolerance,
        }
    }
}

/// The knot vector, degree and control slabs of one parametric dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Slabs<T: FloatingPoint> {
    dimension: usize,
    knots: KnotVector<T>,
    degree: usize,
    points: Vec<DVector<T>>,
    coordinate_dimension: usize,
}

impl<T: FloatingPoint> Slabs<T> {
    /// Gather slabs along `dimension` of a curve or grid.
    ///
    /// The knots must be clamped for `degree` with one slab per basis function,
    /// and every slab must hold the same whole number of `coordinate_dimension`-sized points.
    /// # Example
    /// ```
    /// use nalgebra::DVector;
    /// use tenspline::prelude::*;
    /// let mut slabs = Slabs::try_new(
    ///     0,
    ///     KnotVector::new(vec![0., 0., 1., 1.]),
    ///     1,
    ///     vec![DVector::from_vec(vec![0., 0.]), DVector::from_vec(vec![2., 1.])],
    ///     2,
    /// )
    /// .unwrap();
    /// slabs.insert_knot(0.5).unwrap();
    /// assert_eq!(slabs.points()[1].as_slice(), &[1., 0.5]);
    /// ```
    pub fn try_new(
        dimension: usize,
        knots: KnotVector<T>,
        degree: usize,
        points: Vec<DVector<T>>,
        coordinate_dimension: usize,
    ) -> Result<Self> {
        knots.check_clamped(degree, points.len())?;
        ensure_valid!(
            coordinate_dimension > 0,
            "control points need at least one coordinate"
        );
        let width = points.first().map_or(0, |p| p.len());
        ensure_valid!(
            width > 0
                && width % coordinate_dimension == 0
                && points.iter().all(|p| p.len() == width),
            "every slab must hold the same number of points of dimension {}",
            coordinate_dimension
        );
        ensure_valid!(
            points.iter().all(|p| p.iter().all(|c| c.is_finite())),
            "slabs contain a non-finite coordinate"
        );
        Ok(Self::new(dimension, knots, degree, points, coordinate_dimension))
    }

    /// Gather slabs whose consistency the caller guarantees
    pub(crate) fn new(
        dimension: usize,
        knots: KnotVector<T>,
        degree: usize,
        points: Vec<DVector<T>>,
        coordinate_dimension: usize,
    ) -> Self {
        Self {
            dimension,
            knots,
            degree,
            points,
            coordinate_dimension,
        }
    }

    /// Parametric dimension these slabs were gathered along
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn points(&self) -> &[DVector<T>] {
        &self.points
    }

    pub fn into_parts(self) -> (KnotVector<T>, usize, Vec<DVector<T>>) {
        (self.knots, self.degree, self.points)
    }

    /// Largest Euclidean distance between corresponding control points of two slabs
    pub fn deviation(&self, a: &DVector<T>, b: &DVector<T>) -> T {
        a.as_slice()
            .chunks_exact(self.coordinate_dimension)
            .zip(b.as_slice().chunks_exact(self.coordinate_dimension))
            .map(|(p, q)| {
                p.iter()
                    .zip(q.iter())
                    .fold(T::zero(), |acc, (x, y)| acc + (*x - *y) * (*x - *y))
                    .sqrt()
            })
            .fold(T::zero(), |acc, d| acc.max(d))
    }

    /// Distinct interior knots paired with their multiplicities
    fn interior_multiplicities(&self) -> Vec<(T, usize)> {
        let multiplicity = self.knots.multiplicity();
        let count = multiplicity.len();
        multiplicity
            .into_iter()
            .skip(1)
            .take(count.saturating_sub(2))
            .map(|m| (*m.knot(), m.multiplicity()))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use nalgebra::DVector;

    use super::Slabs;
    use crate::knot::KnotVector;

    /// Build slabs holding one control point each, i.e. a plain curve
    pub fn curve(knots: Vec<f64>, degree: usize, points: Vec<Vec<f64>>) -> Slabs<f64> {
        let c = points[0].len();
        Slabs::new(
            0,
            KnotVector::new(knots),
            degree,
            points.into_iter().map(DVector::from_vec).collect(),
            c,
        )
    }

    /// Evaluate slabs as a curve by Cox-de Boor
    pub fn evaluate(slabs: &Slabs<f64>, u: f64) -> DVector<f64> {
        let span = slabs.knots().find_span(slabs.degree(), u);
        let basis = slabs.knots().basis_functions(span, u, slabs.degree());
        basis
            .iter()
            .enumerate()
            .fold(DVector::zeros(slabs.points()[0].len()), |acc, (j, b)| {
                acc + &slabs.points()[span - slabs.degree() + j] * *b
            })
    }

    /// A cubic with a double interior knot and a simple one on each side
    pub fn cubic() -> Slabs<f64> {
        curve(
            vec![0., 0., 0., 0., 0.2, 0.5, 0.5, 0.7, 1., 1., 1., 1.],
            3,
            vec![
                vec![0., 0.],
                vec![0.3, 1.2],
                vec![1.1, 1.9],
                vec![2.0, 1.1],
                vec![2.4, -0.3],
                vec![3.1, -0.8],
                vec![3.9, 0.4],
                vec![4.6, 1.3],
            ],
        )
    }
}
