/// Iterator over every multi-index of a box `[0, lengths[0]) × … × [0, lengths[D-1])`,
/// with the first index varying fastest.
///
/// # Example
/// ```
/// use tenspline::prelude::GridIndex;
/// let indices: Vec<_> = GridIndex::new(&[2, 2]).collect();
/// assert_eq!(indices, vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]);
/// ```
#[derive(Clone, Debug)]
pub struct GridIndex {
    lengths: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl GridIndex {
    pub fn new(lengths: &[usize]) -> Self {
        let current = if lengths.contains(&0) {
            None
        } else {
            Some(vec![0; lengths.len()])
        };
        Self {
            lengths: lengths.to_vec(),
            current,
        }
    }
}

impl Iterator for GridIndex {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut next = current.clone();
        for (digit, length) in next.iter_mut().zip(self.lengths.iter()) {
            *digit += 1;
            if *digit < *length {
                self.current = Some(next);
                return Some(current);
            }
            *digit = 0;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::GridIndex;

    #[test]
    fn counts_every_cell() {
        assert_eq!(GridIndex::new(&[3, 2, 4]).count(), 24);
        assert_eq!(GridIndex::new(&[3, 0, 4]).count(), 0);
        assert_eq!(GridIndex::new(&[1]).collect::<Vec<_>>(), vec![vec![0]]);
    }

    #[test]
    fn first_index_fastest() {
        let indices: Vec<_> = GridIndex::new(&[3, 2]).collect();
        assert_eq!(indices[1], vec![1, 0]);
        assert_eq!(indices[3], vec![0, 1]);
        assert_eq!(indices[5], vec![2, 1]);
    }
}
