use super::{
    bezier::{elevate_segment, reduce_segment},
    Acceptance, Slabs,
};
use crate::{error::Result, knot::KnotVector, misc::FloatingPoint};

impl<T: FloatingPoint> Slabs<T> {
    /// Try to lower the degree by one.
    ///
    /// Each Bézier segment is reduced and elevated back; the reduction is kept
    /// only if every segment and every following knot removal passes `acceptance`,
    /// and every distinct interior knot loses exactly one multiplicity.
    /// Degree zero is never reduced.
    pub fn reduce_degree(&mut self, acceptance: Acceptance<T>) -> Result<bool> {
        let p = self.degree;
        if p == 0 {
            return Ok(false);
        }
        let multiplicity = self.knots.multiplicity();
        let interior = self.interior_multiplicities();

        let mut bezier = self.clone();
        bezier.decompose()?;
        let mut points = Vec::with_capacity(bezier.points.len());
        for segment in bezier.segments() {
            let reduced = reduce_segment(segment)?;
            let deviation = elevate_segment(&reduced)?
                .iter()
                .zip(segment.iter())
                .map(|(a, b)| self.deviation(a, b))
                .fold(T::zero(), |acc, d| acc.max(d));
            if !acceptance.accepts(deviation) {
                log::trace!(
                    "rejected degree reduction in dimension {}: segment deviation {}",
                    self.dimension,
                    deviation
                );
                return Ok(false);
            }
            points.extend(reduced);
        }

        let knots: KnotVector<T> = multiplicity
            .iter()
            .flat_map(|m| std::iter::repeat_n(*m.knot(), p))
            .collect();
        let mut reduced = Slabs::new(self.dimension, knots, p - 1, points, self.coordinate_dimension);
        for (knot, m) in interior {
            for _ in m..=p {
                if !reduced.remove_knot(knot, acceptance) {
                    return Ok(false);
                }
            }
        }

        *self = reduced;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::refinement::{
        fixtures::{cubic, curve},
        Acceptance,
    };

    #[test]
    fn quadratic_to_linear() {
        let original = curve(vec![0., 0., 0.5, 1., 1.], 1, vec![vec![0.], vec![0.75], vec![1.]]);
        let mut slabs = original.clone();
        slabs.elevate_degree().unwrap();
        assert!(slabs.reduce_degree(Acceptance::Within(1e-8)).unwrap());
        assert_eq!(slabs.degree(), 1);
        assert!(slabs.knots().is_equal(original.knots(), 0.));
        for (a, b) in slabs.points().iter().zip(original.points()) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    fn elevation_is_undone() {
        let original = cubic();
        let mut slabs = original.clone();
        slabs.elevate_degree().unwrap();
        assert!(slabs.reduce_degree(Acceptance::Within(1e-9)).unwrap());
        assert_eq!(slabs.degree(), 3);
        assert_eq!(slabs.knots().to_vec(), original.knots().to_vec());
        for (a, b) in slabs.points().iter().zip(original.points()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn genuine_cubic_is_not_reduced() {
        let original = cubic();
        let mut slabs = original.clone();
        assert!(!slabs.reduce_degree(Acceptance::Within(1e-3)).unwrap());
        assert_eq!(slabs, original);
    }

    #[test]
    fn degree_zero_is_rejected() {
        let original = curve(vec![0., 1.], 0, vec![vec![1.]]);
        let mut slabs = original.clone();
        assert!(!slabs.reduce_degree(Acceptance::Always).unwrap());
        assert_eq!(slabs, original);
    }

    #[test]
    fn constant_linear_reduces_to_constant() {
        let mut slabs = curve(vec![0., 0., 0.5, 1., 1.], 1, vec![vec![2.], vec![2.], vec![2.]]);
        assert!(slabs.reduce_degree(Acceptance::Within(1e-12)).unwrap());
        assert_eq!(slabs.degree(), 0);
        assert_eq!(slabs.knots().to_vec(), vec![0., 1.]);
        assert_eq!(slabs.points().len(), 1);
    }
}
