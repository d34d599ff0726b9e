use nalgebra::RealField;

/// Binomial coefficients cached as rows of Pascal's triangle.
/// Rows are grown on demand, so repeated queries for small `n` cost a lookup.
#[derive(Clone, Debug, Default)]
pub struct Binomial<T> {
    rows: Vec<Vec<T>>,
}

impl<T: RealField + Copy> Binomial<T> {
    pub fn new() -> Self {
        Self { rows: vec![] }
    }

    /// Returns the binomial coefficient of `n` and `k`, growing the cache up to row `n`.
    pub fn get(&mut self, n: usize, k: usize) -> T {
        if k > n {
            return T::zero();
        }

        while self.rows.len() <= n {
            let row = match self.rows.last() {
                None => vec![T::one()],
                Some(previous) => {
                    let mut row = Vec::with_capacity(previous.len() + 1);
                    row.push(T::one());
                    row.extend(previous.windows(2).map(|w| w[0] + w[1]));
                    row.push(T::one());
                    row
                }
            };
            self.rows.push(row);
        }

        self.rows[n][k]
    }

    /// Product of per-dimension coefficients `Π_d C(n_d, k_d)`.
    pub fn product(&mut self, n: &[usize], k: &[usize]) -> T {
        n.iter()
            .zip(k.iter())
            .fold(T::one(), |acc, (n, k)| acc * self.get(*n, *k))
    }
}
