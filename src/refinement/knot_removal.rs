use nalgebra::DVector;

use super::{Acceptance, Slabs};
use crate::misc::FloatingPoint;

impl<T: FloatingPoint> Slabs<T> {
    /// Try to lower the multiplicity of an interior knot by one.
    ///
    /// The slabs of the coarser representation are solved from both ends of the
    /// affected span towards the middle; the mismatch where the two solutions meet
    /// is the deviation handed to `acceptance`. Nothing changes when the knot is
    /// absent, is an endpoint of the knot vector, or the removal is rejected.
    pub fn remove_knot(&mut self, knot: T, acceptance: Acceptance<T>) -> bool {
        let p = self.degree;
        if knot == self.knots.first() || knot == self.knots.last() {
            return false;
        }
        let s = self.knots.multiplicity_of(knot);
        let Some(r) = self.knots.iter().rposition(|t| *t == knot) else {
            return false;
        };

        let (deviation, points) = if s == p + 1 {
            // the spline may be discontinuous here, so the two slabs meeting at the knot merge
            let deviation = self.deviation(&self.points[r - p - 1], &self.points[r - p]);
            let mut points = self.points.clone();
            points.remove(r - p);
            (deviation, points)
        } else {
            self.eliminate(knot, r, s)
        };

        if !acceptance.accepts(deviation) {
            log::trace!(
                "rejected removal of knot {} in dimension {}: deviation {}",
                knot,
                self.dimension,
                deviation
            );
            return false;
        }

        self.knots.remove(knot);
        self.points = points;
        true
    }

    /// Knot removal for multiplicity `s <= degree` (NURBS book A5.8, single removal)
    fn eliminate(&self, knot: T, r: usize, s: usize) -> (T, Vec<DVector<T>>) {
        let p = self.degree;
        let first = r - p;
        let last = r - s;
        let off = first - 1;
        let alpha = |i: usize| (knot - self.knots[i]) / (self.knots[i + p + 1] - self.knots[i]);

        let mut temp = vec![DVector::zeros(self.points[0].len()); last + 2 - off];
        temp[0] = self.points[off].clone();
        temp[last + 1 - off] = self.points[last + 1].clone();

        let (mut i, mut j) = (first, last);
        let (mut ii, mut jj) = (1, last - off);
        while j > i {
            let alpha_i = alpha(i);
            let alpha_j = alpha(j);
            temp[ii] = (&self.points[i] - &temp[ii - 1] * (T::one() - alpha_i)) / alpha_i;
            temp[jj] = (&self.points[j] - &temp[jj + 1] * alpha_j) / (T::one() - alpha_j);
            i += 1;
            ii += 1;
            j -= 1;
            jj -= 1;
        }

        let deviation = if j < i {
            self.deviation(&temp[ii - 1], &temp[jj + 1])
        } else {
            let alpha_i = alpha(i);
            let blended = &temp[ii + 1] * alpha_i + &temp[ii - 1] * (T::one() - alpha_i);
            self.deviation(&self.points[i], &blended)
        };

        let mut points = Vec::with_capacity(self.points.len() - 1);
        points.extend_from_slice(&self.points[..first]);
        points.extend((first..i).map(|k| temp[k - off].clone()));
        points.extend((i..last).map(|k| temp[k + 1 - off].clone()));
        points.extend_from_slice(&self.points[last + 1..]);

        (deviation, points)
    }
}
