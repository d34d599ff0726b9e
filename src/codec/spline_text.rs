use nalgebra::DVector;

use super::{read_count, read_real, write_real};
use crate::{
    error::{Result, SplineError},
    misc::FloatingPoint,
    spline::{BSpline, Nurbs, Projection, Spline},
};

/// Textual form of the parametric side of a spline
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSpaceText {
    /// One list of knot tokens per parametric dimension
    pub knot_vectors: Vec<Vec<String>>,
    pub degrees: Vec<String>,
    /// Number of basis functions (control points) per parametric dimension
    pub basis_function_counts: Vec<String>,
}

/// Textual form of the control points of a spline
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorSpaceText {
    /// Euclidean coordinates of every control point in grid order
    pub coordinates: Vec<Vec<String>>,
    /// Weight of every control point, present for NURBS only
    pub weights: Option<Vec<String>>,
}

/// Canonical textual form of a B-spline or NURBS
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineText {
    pub parameter_space: ParameterSpaceText,
    pub vector_space: VectorSpaceText,
}

fn write_all<T: FloatingPoint>(values: &[T], precision: Option<usize>) -> Vec<String> {
    values.iter().map(|v| write_real(*v, precision)).collect()
}

fn read_all<T: FloatingPoint>(tokens: &[String]) -> Result<Vec<T>> {
    tokens.iter().map(|t| read_real(t)).collect()
}

/// Parts of a spline read back from text
struct Parts<T> {
    knot_vectors: Vec<Vec<T>>,
    degrees: Vec<usize>,
    coordinates: Vec<Vec<T>>,
}

impl SplineText {
    fn read_parts<T: FloatingPoint>(&self) -> Result<Parts<T>> {
        let parameter_space = &self.parameter_space;
        let knot_vectors = parameter_space
            .knot_vectors
            .iter()
            .map(|knots| read_all(knots))
            .collect::<Result<Vec<_>>>()?;
        let degrees = parameter_space
            .degrees
            .iter()
            .map(|d| read_count(d))
            .collect::<Result<Vec<_>>>()?;
        let counts = parameter_space
            .basis_function_counts
            .iter()
            .map(|n| read_count(n))
            .collect::<Result<Vec<_>>>()?;

        if counts.len() != degrees.len() {
            return Err(SplineError::MalformedInput(format!(
                "{} basis function counts for {} degrees",
                counts.len(),
                degrees.len()
            )));
        }
        for (dimension, ((knots, degree), count)) in knot_vectors
            .iter()
            .zip(degrees.iter())
            .zip(counts.iter())
            .enumerate()
        {
            if knots.len() != count + degree + 1 {
                return Err(SplineError::MalformedInput(format!(
                    "dimension {} has {} knots, but {} basis functions of degree {} need {}",
                    dimension,
                    knots.len(),
                    count,
                    degree,
                    count + degree + 1
                )));
            }
        }

        let coordinates = self
            .vector_space
            .coordinates
            .iter()
            .map(|point| read_all(point))
            .collect::<Result<Vec<_>>>()?;
        Ok(Parts {
            knot_vectors,
            degrees,
            coordinates,
        })
    }
}

/// Construction failures of text that parsed are reported as malformed input
fn malformed(error: SplineError) -> SplineError {
    match error {
        SplineError::Construction(message) => SplineError::MalformedInput(message),
        other => other,
    }
}

impl<T: FloatingPoint, P: Projection> Spline<T, P> {
    /// Write the spline in canonical text form with the shortest exact reals
    /// # Example
    /// ```
    /// use tenspline::prelude::*;
    /// let spline = BSpline::try_new(
    ///     vec![vec![0., 0., 0.5, 1., 1.]],
    ///     vec![1],
    ///     vec![vec![0.], vec![0.75], vec![2.]],
    /// )
    /// .unwrap();
    /// let text = spline.write();
    /// assert_eq!(text.parameter_space.knot_vectors[0], vec!["0", "0", "0.5", "1", "1"]);
    /// assert_eq!(text.parameter_space.degrees, vec!["1"]);
    /// assert_eq!(text.vector_space.coordinates[2], vec!["2"]);
    /// assert!(BSpline::<f64>::read(&text).unwrap().is_equal(&spline, 0.));
    /// ```
    pub fn write(&self) -> SplineText {
        self.write_text(None)
    }

    /// Write the spline with every real rounded to `precision` significant digits
    pub fn write_with_precision(&self, precision: usize) -> SplineText {
        self.write_text(Some(precision))
    }

    fn write_text(&self, precision: Option<usize>) -> SplineText {
        let parameter_space = ParameterSpaceText {
            knot_vectors: self
                .knot_vectors()
                .iter()
                .map(|knots| write_all(knots.as_slice(), precision))
                .collect(),
            degrees: self.degrees().iter().map(|d| d.to_string()).collect(),
            basis_function_counts: self
                .number_of_control_points()
                .iter()
                .map(|n| n.to_string())
                .collect(),
        };
        let vector_space = VectorSpaceText {
            coordinates: self
                .control_points()
                .iter()
                .map(|point: &DVector<T>| write_all(point.as_slice(), precision))
                .collect(),
            weights: P::weights(self.tensor().grid()).map(|w| write_all(&w, precision)),
        };
        SplineText {
            parameter_space,
            vector_space,
        }
    }
}

impl<T: FloatingPoint> BSpline<T> {
    /// Read a B-spline written by [`Spline::write`]
    pub fn read(text: &SplineText) -> Result<Self> {
        if text.vector_space.weights.is_some() {
            return Err(SplineError::MalformedInput(
                "a B-spline has no weights".to_string(),
            ));
        }
        let parts = text.read_parts()?;
        Self::try_new(parts.knot_vectors, parts.degrees, parts.coordinates).map_err(malformed)
    }
}

impl<T: FloatingPoint> Nurbs<T> {
    /// Read a NURBS written by [`Spline::write`]
    pub fn read(text: &SplineText) -> Result<Self> {
        let weights = text
            .vector_space
            .weights
            .as_ref()
            .ok_or_else(|| SplineError::MalformedInput("a NURBS needs weights".to_string()))?;
        let weights = read_all(weights)?;
        let parts = text.read_parts()?;
        Self::try_new(parts.knot_vectors, parts.degrees, parts.coordinates, weights)
            .map_err(malformed)
    }
}
