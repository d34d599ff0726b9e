/// A distinct knot value together with the number of times it repeats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnotMultiplicity<T> {
    knot: T,
    multiplicity: usize,
}

impl<T> KnotMultiplicity<T> {
    pub fn new(knot: T, multiplicity: usize) -> Self {
        Self { knot, multiplicity }
    }

    pub fn knot(&self) -> &T {
        &self.knot
    }

    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    /// Number of insertions needed to raise the multiplicity to `target`
    pub fn deficit(&self, target: usize) -> usize {
        target.saturating_sub(self.multiplicity)
    }
}
