use nalgebra::{convert, DVector};

use super::Slabs;
use crate::{
    error::{ensure_valid, Result},
    misc::FloatingPoint,
};

impl<T: FloatingPoint> Slabs<T> {
    /// Raise every interior knot to multiplicity `degree + 1`,
    /// so each knot span carries its own Bézier segment of `degree + 1` slabs.
    pub fn decompose(&mut self) -> Result<()> {
        let required = self.degree + 1;
        for (knot, multiplicity) in self.interior_multiplicities() {
            for _ in multiplicity..required {
                self.insert_knot(knot)?;
            }
        }
        Ok(())
    }

    /// Bézier segments of a decomposed representation
    pub fn segments(&self) -> std::slice::Chunks<'_, DVector<T>> {
        self.points.chunks(self.degree + 1)
    }
}

/// Raise the degree of one Bézier segment by one.
/// `Q_i = i/(p+1) · P_{i-1} + (1 - i/(p+1)) · P_i`
pub fn elevate_segment<T: FloatingPoint>(segment: &[DVector<T>]) -> Result<Vec<DVector<T>>> {
    ensure_valid!(
        !segment.is_empty(),
        "a Bézier segment needs at least one control point"
    );
    let p = segment.len() - 1;
    let denominator: T = convert((p + 1) as f64);
    let mut elevated = Vec::with_capacity(p + 2);
    elevated.push(segment[0].clone());
    for i in 1..=p {
        let alpha = convert::<f64, T>(i as f64) / denominator;
        elevated.push(&segment[i - 1] * alpha + &segment[i] * (T::one() - alpha));
    }
    elevated.push(segment[p].clone());
    Ok(elevated)
}

/// Lower the degree of one Bézier segment by one, solving the elevation
/// relation from the first and from the last slab towards the middle.
/// The result reproduces the segment exactly only when it was elevated from a lower degree,
/// which callers check by elevating it again.
pub fn reduce_segment<T: FloatingPoint>(segment: &[DVector<T>]) -> Result<Vec<DVector<T>>> {
    ensure_valid!(
        segment.len() >= 2,
        "a Bézier segment of degree {} cannot be reduced",
        segment.len().saturating_sub(1)
    );
    let p = segment.len() - 1;
    let degree: T = convert(p as f64);
    let ratio = |i: usize| convert::<f64, T>(i as f64) / degree;

    let mut reduced = vec![segment[0].clone(); p];
    let half = (p - 1) / 2;
    for i in 1..=half {
        let alpha = ratio(i);
        reduced[i] = (&segment[i] - &reduced[i - 1] * alpha) / (T::one() - alpha);
    }
    reduced[p - 1] = segment[p].clone();
    for i in ((half + 2)..p).rev() {
        let alpha = ratio(i);
        reduced[i - 1] = (&segment[i] - &reduced[i] * (T::one() - alpha)) / alpha;
    }
    Ok(reduced)
}
