use nalgebra::{convert, DVector};
use simba::scalar::SupersetOf;

use crate::{
    error::{ensure_valid, Result, SplineError},
    grid::{ControlGrid, GridIndex},
    knot::KnotVector,
    misc::FloatingPoint,
    refinement::{Acceptance, Slabs},
};

/// Tensor-product B-spline over stored control coordinates.
///
/// This is the representation shared by B-splines and NURBS: the grid holds
/// whatever coordinates are blended (Euclidean, or homogeneous with the weight last),
/// and the structural transforms act on them directly.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorSpline<T> {
    knot_vectors: Vec<KnotVector<T>>,
    degrees: Vec<usize>,
    grid: ControlGrid<T>,
}

/// Knot spans and basis function derivatives of every parametric dimension at one parametric point.
#[derive(Clone, Debug)]
pub struct LocalBasis<T> {
    spans: Vec<usize>,
    /// `derivatives[d][k][j]`: kth derivative of the jth nonzero basis function of dimension `d`
    derivatives: Vec<Vec<Vec<T>>>,
}

impl<T: FloatingPoint> TensorSpline<T> {
    /// Create a spline from validated parts.
    /// Each knot vector must be clamped with endpoint multiplicity exactly `degree + 1`,
    /// no interior knot may repeat more than `degree + 1` times,
    /// and the grid must have `knots - degree - 1` control points along each dimension.
    pub fn try_new(
        knot_vectors: Vec<KnotVector<T>>,
        degrees: Vec<usize>,
        grid: ControlGrid<T>,
    ) -> Result<Self> {
        ensure_valid!(
            !degrees.is_empty(),
            "a spline needs at least one parametric dimension"
        );
        ensure_valid!(
            knot_vectors.len() == degrees.len(),
            "got {} knot vectors for {} degrees",
            knot_vectors.len(),
            degrees.len()
        );
        ensure_valid!(
            grid.shape().len() == degrees.len(),
            "control grid has {} dimensions, expected {}",
            grid.shape().len(),
            degrees.len()
        );

        for (dimension, (knots, degree)) in knot_vectors.iter().zip(degrees.iter()).enumerate() {
            knots
                .check_clamped(*degree, grid.shape()[dimension])
                .map_err(|error| match error {
                    SplineError::Construction(message) => SplineError::Construction(format!(
                        "dimension {}: {}",
                        dimension, message
                    )),
                    other => other,
                })?;
        }

        Ok(Self {
            knot_vectors,
            degrees,
            grid,
        })
    }

    pub fn parametric_dimension(&self) -> usize {
        self.degrees.len()
    }

    pub fn knot_vectors(&self) -> &[KnotVector<T>] {
        &self.knot_vectors
    }

    pub fn knot_vector(&self, dimension: usize) -> Result<&KnotVector<T>> {
        self.check_dimension(dimension)?;
        Ok(&self.knot_vectors[dimension])
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    pub fn degree(&self, dimension: usize) -> Result<usize> {
        self.check_dimension(dimension)?;
        Ok(self.degrees[dimension])
    }

    pub fn grid(&self) -> &ControlGrid<T> {
        &self.grid
    }

    /// Number of control points along each parametric dimension
    pub fn number_of_control_points(&self) -> &[usize] {
        self.grid.shape()
    }

    /// Closed parametric domain of one dimension
    pub fn domain(&self, dimension: usize) -> Result<(T, T)> {
        self.check_dimension(dimension)?;
        Ok(self.knot_vectors[dimension].domain(self.degrees[dimension]))
    }

    fn check_dimension(&self, dimension: usize) -> Result<()> {
        if dimension < self.parametric_dimension() {
            Ok(())
        } else {
            Err(SplineError::InvalidDimensionIndex {
                dimension,
                parametric_dimension: self.parametric_dimension(),
            })
        }
    }

    fn check_arity(&self, actual: usize) -> Result<()> {
        if actual == self.parametric_dimension() {
            Ok(())
        } else {
            Err(SplineError::ArityMismatch {
                expected: self.parametric_dimension(),
                actual,
            })
        }
    }

    /// Locate `u` and evaluate basis derivatives up to `orders` in every dimension.
    /// Orders above a degree are capped at it, since those derivatives vanish.
    pub fn local_basis(&self, u: &[T], orders: &[usize]) -> Result<LocalBasis<T>> {
        self.check_arity(u.len())?;
        self.check_arity(orders.len())?;

        let mut spans = Vec::with_capacity(u.len());
        let mut derivatives = Vec::with_capacity(u.len());
        for (dimension, (knots, degree)) in
            self.knot_vectors.iter().zip(self.degrees.iter()).enumerate()
        {
            let value = u[dimension];
            if !knots.contains(*degree, value) {
                let (start, end) = knots.domain(*degree);
                return Err(SplineError::ParameterOutOfDomain {
                    dimension,
                    value: value.to_f64().unwrap_or(f64::NAN),
                    start: start.to_f64().unwrap_or(f64::NAN),
                    end: end.to_f64().unwrap_or(f64::NAN),
                });
            }
            let span = knots.find_span(*degree, value);
            derivatives.push(knots.derivative_basis_functions(
                span,
                value,
                *degree,
                orders[dimension].min(*degree),
            ));
            spans.push(span);
        }

        Ok(LocalBasis { spans, derivatives })
    }

    /// Blend the stored coordinates of the local control block with the product of
    /// per-dimension basis derivatives of the given orders.
    /// `orders` must not exceed those `local` was computed for.
    pub fn contract(&self, local: &LocalBasis<T>, orders: &[usize]) -> DVector<T> {
        let mut result = DVector::zeros(self.grid.coordinate_dimension());
        if orders.iter().zip(self.degrees.iter()).any(|(k, p)| k > p) {
            return result;
        }

        let block: Vec<usize> = self.degrees.iter().map(|p| p + 1).collect();
        let strides = self.grid.strides();
        for index in GridIndex::new(&block) {
            let mut weight = T::one();
            let mut linear = 0;
            for (d, i) in index.iter().enumerate() {
                weight *= local.derivatives[d][orders[d]][*i];
                linear += (local.spans[d] - self.degrees[d] + i) * strides[d];
            }
            result
                .iter_mut()
                .zip(self.grid.point_at(linear))
                .for_each(|(r, c)| *r += *c * weight);
        }
        result
    }

    /// Evaluate the stored coordinates (or a partial derivative of them) at `u`
    pub fn evaluate_coordinates(&self, u: &[T], orders: &[usize]) -> Result<DVector<T>> {
        let local = self.local_basis(u, orders)?;
        Ok(self.contract(&local, orders))
    }

    /// Regular grid of parametric points with `resolutions[d] + 1` values per dimension
    /// spanning each closed domain, first dimension varying fastest
    pub fn parameter_grid(&self, resolutions: &[usize]) -> Result<Vec<Vec<T>>> {
        self.check_arity(resolutions.len())?;
        let axes: Vec<Vec<T>> = self
            .knot_vectors
            .iter()
            .zip(self.degrees.iter())
            .zip(resolutions.iter())
            .map(|((knots, degree), resolution)| {
                let (start, end) = knots.domain(*degree);
                let divisions: T = convert(*resolution as f64);
                (0..=*resolution)
                    .map(|i| {
                        if i == 0 {
                            start
                        } else if i == *resolution {
                            end
                        } else {
                            start + (end - start) * convert::<f64, T>(i as f64) / divisions
                        }
                    })
                    .collect()
            })
            .collect();
        let lengths: Vec<usize> = axes.iter().map(|a| a.len()).collect();
        Ok(GridIndex::new(&lengths)
            .map(|index| index.iter().enumerate().map(|(d, i)| axes[d][*i]).collect())
            .collect())
    }

    fn slabs(&self, dimension: usize) -> Slabs<T> {
        Slabs::new(
            dimension,
            self.knot_vectors[dimension].clone(),
            self.degrees[dimension],
            self.grid.slabs(dimension),
            self.grid.coordinate_dimension(),
        )
    }

    fn commit(&mut self, slabs: Slabs<T>) {
        let dimension = slabs.dimension();
        let (knots, degree, points) = slabs.into_parts();
        self.grid.replace_slabs(dimension, &points);
        self.knot_vectors[dimension] = knots;
        self.degrees[dimension] = degree;
    }

    /// Insert each knot once, in order. Either every insertion is kept or, on the
    /// first failure, none is.
    pub fn insert_knots(&mut self, dimension: usize, knots: &[T]) -> Result<()> {
        self.check_dimension(dimension)?;
        if knots.is_empty() {
            return Ok(());
        }
        let mut slabs = self.slabs(dimension);
        for knot in knots {
            slabs.insert_knot(*knot)?;
        }
        self.commit(slabs);
        log::debug!(
            "inserted {} knot(s) in dimension {}: {} control points",
            knots.len(),
            dimension,
            self.grid.shape()[dimension]
        );
        Ok(())
    }

    /// Try to remove each knot once, in order, keeping every removal whose
    /// control points move at most `tolerance`. Returns the number of removals kept.
    pub fn remove_knots(&mut self, dimension: usize, knots: &[T], tolerance: T) -> Result<usize> {
        self.check_dimension(dimension)?;
        let acceptance = Acceptance::Within(tolerance);
        let mut slabs = self.slabs(dimension);
        let mut removed = 0;
        for knot in knots {
            if slabs.remove_knot(*knot, acceptance) {
                removed += 1;
            }
        }
        if removed > 0 {
            self.commit(slabs);
            log::debug!(
                "removed {} of {} knot(s) in dimension {}",
                removed,
                knots.len(),
                dimension
            );
        }
        Ok(removed)
    }

    /// Raise the degree of one dimension by one, keeping the shape
    pub fn elevate_degree(&mut self, dimension: usize) -> Result<()> {
        self.check_dimension(dimension)?;
        let mut slabs = self.slabs(dimension);
        slabs.elevate_degree()?;
        self.commit(slabs);
        log::debug!(
            "elevated dimension {} to degree {}",
            dimension,
            self.degrees[dimension]
        );
        Ok(())
    }

    /// Try to lower the degree of one dimension by one within `tolerance`
    pub fn reduce_degree(&mut self, dimension: usize, tolerance: T) -> Result<bool> {
        self.check_dimension(dimension)?;
        let mut slabs = self.slabs(dimension);
        if !slabs.reduce_degree(Acceptance::Within(tolerance))? {
            return Ok(false);
        }
        self.commit(slabs);
        log::debug!(
            "reduced dimension {} to degree {}",
            dimension,
            self.degrees[dimension]
        );
        Ok(true)
    }

    /// Number of Bézier elements along one dimension and the knots that would have to be
    /// inserted to give every interior knot multiplicity `degree`
    pub fn bezier_extraction_knots(&self, dimension: usize) -> Result<(usize, Vec<T>)> {
        self.check_dimension(dimension)?;
        let degree = self.degrees[dimension];
        let multiplicity = self.knot_vectors[dimension].multiplicity();
        let interior = &multiplicity[1..multiplicity.len() - 1];
        let knots = interior
            .iter()
            .flat_map(|m| std::iter::repeat_n(*m.knot(), m.deficit(degree)))
            .collect();
        Ok((multiplicity.len() - 1, knots))
    }

    /// Compare with another spline, allowing knots and coordinates to differ by `tolerance`
    pub fn is_equal(&self, other: &Self, tolerance: T) -> bool {
        self.degrees == other.degrees
            && self.knot_vectors.len() == other.knot_vectors.len()
            && self
                .knot_vectors
                .iter()
                .zip(other.knot_vectors.iter())
                .all(|(a, b)| a.is_equal(b, tolerance))
            && self.grid.is_equal(&other.grid, tolerance)
    }

    /// Cast the spline to another floating point type
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> TensorSpline<F> {
        TensorSpline {
            knot_vectors: self.knot_vectors.iter().map(|k| k.cast()).collect(),
            degrees: self.degrees.clone(),
            grid: self.grid.cast(),
        }
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for TensorSpline<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("TensorSpline", 3)?;
        state.serialize_field("knot_vectors", &self.knot_vectors)?;
        state.serialize_field("degrees", &self.degrees)?;
        state.serialize_field("grid", &self.grid)?;
        state.end()
    }
}

/// Deserialized splines are validated like [`TensorSpline::try_new`]
#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for TensorSpline<T>
where
    T: FloatingPoint + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(
            rename = "TensorSpline",
            deny_unknown_fields,
            bound(deserialize = "T: FloatingPoint + serde::Deserialize<'de>")
        )]
        struct Fields<T> {
            knot_vectors: Vec<KnotVector<T>>,
            degrees: Vec<usize>,
            grid: ControlGrid<T>,
        }

        let fields = Fields::<T>::deserialize(deserializer)?;
        Self::try_new(fields.knot_vectors, fields.degrees, fields.grid)
            .map_err(serde::de::Error::custom)
    }
}
