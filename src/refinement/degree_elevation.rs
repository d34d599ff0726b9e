use super::{bezier::elevate_segment, Acceptance, Slabs};
use crate::{error::Result, knot::KnotVector, misc::FloatingPoint};

impl<T: FloatingPoint> Slabs<T> {
    /// Raise the degree by one without changing the shape.
    ///
    /// Every Bézier segment is elevated on its own, then the knots added by the
    /// decomposition are removed again so each distinct knot ends with its
    /// original multiplicity plus one.
    pub fn elevate_degree(&mut self) -> Result<()> {
        let p = self.degree;
        let multiplicity = self.knots.multiplicity();
        let interior = self.interior_multiplicities();

        let mut bezier = self.clone();
        bezier.decompose()?;
        let points = bezier
            .segments()
            .map(elevate_segment)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        let knots: KnotVector<T> = multiplicity
            .iter()
            .flat_map(|m| std::iter::repeat_n(*m.knot(), p + 2))
            .collect();

        let mut elevated = Slabs::new(
            self.dimension,
            knots,
            p + 1,
            points,
            self.coordinate_dimension,
        );
        for (knot, m) in interior {
            for _ in m..=p {
                let removed = elevated.remove_knot(knot, Acceptance::Always);
                debug_assert!(removed, "knot {} added by decomposition was not removable", knot);
            }
        }

        *self = elevated;
        Ok(())
    }
}
