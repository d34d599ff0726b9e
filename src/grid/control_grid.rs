use nalgebra::{convert, DVector};
use simba::scalar::SupersetOf;

use crate::{
    error::{ensure_valid, Result},
    misc::FloatingPoint,
};

/// Dense multi-dimensional array of control points stored in one flat buffer.
///
/// A cell with multi-index `(i_0, …, i_{D-1})` lives at `Σ i_d · stride_d`,
/// where `stride_0 = 1` so the first index varies fastest.
/// Every cell holds `coordinate_dimension` reals.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlGrid<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    coordinate_dimension: usize,
    coordinates: Vec<T>,
}

fn strides_of(shape: &[usize]) -> Vec<usize> {
    shape
        .iter()
        .scan(1, |stride, n| {
            let current = *stride;
            *stride *= n;
            Some(current)
        })
        .collect()
}

/// Splits a linear index into the index along one dimension and the position
/// among the cells sharing that index, which is independent of the length of that dimension.
fn split_index(linear: usize, stride: usize, length: usize) -> (usize, usize) {
    let index = (linear / stride) % length;
    let rest = linear % stride + (linear / (stride * length)) * stride;
    (index, rest)
}

impl<T: FloatingPoint> ControlGrid<T> {
    /// Create a grid from its flat coordinate buffer
    pub fn try_new(shape: Vec<usize>, coordinate_dimension: usize, coordinates: Vec<T>) -> Result<Self> {
        ensure_valid!(!shape.is_empty(), "a control grid needs at least one dimension");
        ensure_valid!(
            shape.iter().all(|n| *n > 0),
            "control grid shape {:?} has an empty dimension",
            shape
        );
        ensure_valid!(
            coordinate_dimension > 0,
            "control points need at least one coordinate"
        );
        let count: usize = shape.iter().product();
        ensure_valid!(
            coordinates.len() == count * coordinate_dimension,
            "expected {} control points of dimension {}, got {} coordinates",
            count,
            coordinate_dimension,
            coordinates.len()
        );
        ensure_valid!(
            coordinates.iter().all(|c| c.is_finite()),
            "control points contain a non-finite coordinate"
        );
        Ok(Self {
            strides: strides_of(&shape),
            shape,
            coordinate_dimension,
            coordinates,
        })
    }

    /// Create a grid from one coordinate sequence per control point, in grid order
    /// # Example
    /// ```
    /// use tenspline::prelude::ControlGrid;
    /// let grid = ControlGrid::try_from_points(
    ///     vec![2, 2],
    ///     &[vec![0., 0.], vec![1., 0.], vec![0., 1.], vec![1., 1.]],
    /// )
    /// .unwrap();
    /// assert_eq!(grid.point(&[1, 0]), &[1., 0.]);
    /// assert_eq!(grid.point(&[0, 1]), &[0., 1.]);
    /// ```
    pub fn try_from_points(shape: Vec<usize>, points: &[Vec<T>]) -> Result<Self> {
        let coordinate_dimension = points.first().map(|p| p.len()).unwrap_or(0);
        ensure_valid!(
            points.iter().all(|p| p.len() == coordinate_dimension),
            "control points have differing numbers of coordinates"
        );
        let count: usize = shape.iter().product();
        ensure_valid!(
            points.len() == count,
            "expected {} control points for shape {:?}, got {}",
            count,
            shape,
            points.len()
        );
        Self::try_new(shape, coordinate_dimension, points.concat())
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn coordinate_dimension(&self) -> usize {
        self.coordinate_dimension
    }

    /// Number of control points
    pub fn len(&self) -> usize {
        self.coordinates.len() / self.coordinate_dimension
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn coordinates(&self) -> &[T] {
        &self.coordinates
    }

    pub fn linear_index(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, stride)| i * stride)
            .sum()
    }

    pub fn point(&self, index: &[usize]) -> &[T] {
        self.point_at(self.linear_index(index))
    }

    pub fn point_at(&self, linear: usize) -> &[T] {
        let start = linear * self.coordinate_dimension;
        &self.coordinates[start..start + self.coordinate_dimension]
    }

    pub fn points(&self) -> impl Iterator<Item = &[T]> {
        self.coordinates.chunks_exact(self.coordinate_dimension)
    }

    /// Gather the control points along `dimension`.
    /// Slab `i` concatenates every control point whose index in `dimension` is `i`, in grid order.
    pub fn slabs(&self, dimension: usize) -> Vec<DVector<T>> {
        let length = self.shape[dimension];
        let stride = self.strides[dimension];
        let width = self.len() / length * self.coordinate_dimension;
        let mut slabs = vec![DVector::zeros(width); length];
        self.points().enumerate().for_each(|(linear, point)| {
            let (index, rest) = split_index(linear, stride, length);
            let start = rest * self.coordinate_dimension;
            slabs[index]
                .rows_mut(start, self.coordinate_dimension)
                .copy_from_slice(point);
        });
        slabs
    }

    /// Replace the control points along `dimension` by `slabs`, resizing that dimension to `slabs.len()`.
    /// Every slab must have the width produced by [`ControlGrid::slabs`].
    pub(crate) fn replace_slabs(&mut self, dimension: usize, slabs: &[DVector<T>]) {
        let length = slabs.len();
        self.shape[dimension] = length;
        self.strides = strides_of(&self.shape);
        let stride = self.strides[dimension];
        let count: usize = self.shape.iter().product();
        let c = self.coordinate_dimension;
        let mut coordinates = Vec::with_capacity(count * c);
        for linear in 0..count {
            let (index, rest) = split_index(linear, stride, length);
            coordinates.extend(slabs[index].rows(rest * c, c).iter().copied());
        }
        self.coordinates = coordinates;
    }

    /// Compare with another grid, allowing each coordinate to differ by `tolerance`
    pub fn is_equal(&self, other: &Self, tolerance: T) -> bool {
        self.shape == other.shape
            && self.coordinate_dimension == other.coordinate_dimension
            && self
                .coordinates
                .iter()
                .zip(other.coordinates.iter())
                .all(|(a, b)| (*a - *b).abs() <= tolerance)
    }

    /// Cast the grid to another floating point type
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> ControlGrid<F> {
        ControlGrid {
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            coordinate_dimension: self.coordinate_dimension,
            coordinates: self.coordinates.iter().map(|c| convert(*c)).collect(),
        }
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for ControlGrid<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ControlGrid", 3)?;
        state.serialize_field("shape", &self.shape)?;
        state.serialize_field("coordinate_dimension", &self.coordinate_dimension)?;
        state.serialize_field("coordinates", &self.coordinates)?;
        state.end()
    }
}

/// Deserialized grids are validated like [`ControlGrid::try_new`], and their strides recomputed
#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for ControlGrid<T>
where
    T: FloatingPoint + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(rename = "ControlGrid", deny_unknown_fields)]
        struct Fields<T> {
            shape: Vec<usize>,
            coordinate_dimension: usize,
            coordinates: Vec<T>,
        }

        let fields = Fields::<T>::deserialize(deserializer)?;
        Self::try_new(fields.shape, fields.coordinate_dimension, fields.coordinates)
            .map_err(serde::de::Error::custom)
    }
}
