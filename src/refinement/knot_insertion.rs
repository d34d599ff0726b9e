use super::Slabs;
use crate::{
    error::{Result, SplineError},
    misc::FloatingPoint,
};

impl<T: FloatingPoint> Slabs<T> {
    /// Insert a knot once by Boehm's algorithm.
    ///
    /// The `degree - multiplicity` slabs over the affected span are replaced by affine
    /// combinations of their neighbours, one slab is added, and the rest are copied.
    /// The shape is unchanged.
    pub fn insert_knot(&mut self, knot: T) -> Result<()> {
        let p = self.degree;
        let (start, end) = self.knots.domain(p);
        if !(start <= knot && knot <= end) {
            return Err(SplineError::ParameterOutOfDomain {
                dimension: self.dimension,
                value: knot.to_f64().unwrap_or(f64::NAN),
                start: start.to_f64().unwrap_or(f64::NAN),
                end: end.to_f64().unwrap_or(f64::NAN),
            });
        }

        let s = self.knots.multiplicity_of(knot);
        if s > p {
            return Err(SplineError::MultiplicityOverflow {
                knot: knot.to_f64().unwrap_or(f64::NAN),
                multiplicity: s,
                degree: p,
            });
        }

        // index of the span [t_k, t_{k+1}) holding the new knot
        let k = self.knots.floor(knot).unwrap_or(p);

        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.extend_from_slice(&self.points[..=k - p]);
        for i in (k - p + 1)..=(k - s) {
            let alpha = (knot - self.knots[i]) / (self.knots[i + p] - self.knots[i]);
            points.push(&self.points[i] * alpha + &self.points[i - 1] * (T::one() - alpha));
        }
        points.extend_from_slice(&self.points[k - s..]);

        self.knots.add(knot);
        self.points = points;
        Ok(())
    }
}
