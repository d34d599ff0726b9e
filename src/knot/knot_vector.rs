use std::ops::Index;

use itertools::Itertools;
use nalgebra::convert;
use simba::scalar::SupersetOf;

use crate::{
    error::{ensure_valid, Result},
    prelude::{FloatingPoint, KnotMultiplicity},
};

/// Knot vector representation
///
/// A non-decreasing sequence of parametric breakpoints for one parametric dimension.
/// The degree is owned by the spline, so every query that depends on it takes it as an argument.
#[derive(Clone, Debug, PartialEq)]
pub struct KnotVector<T>(Vec<T>);

impl<T: FloatingPoint> KnotVector<T> {
    /// Create a knot vector without validation
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create a knot vector, checking that the values are finite, non-decreasing
    /// and span a non-empty interval
    /// # Example
    /// ```
    /// use tenspline::prelude::KnotVector;
    /// assert!(KnotVector::try_new(vec![0., 0., 0.5, 1., 1.]).is_ok());
    /// assert!(KnotVector::try_new(vec![0., 1., 0.5]).is_err());
    /// assert!(KnotVector::try_new(vec![1., 1.]).is_err());
    /// ```
    pub fn try_new(knots: Vec<T>) -> Result<Self> {
        check_values(&knots)?;
        Ok(Self(knots))
    }

    /// Check that this is a valid knot vector clamped for `degree`, with endpoint
    /// multiplicity exactly `degree + 1`, no interior knot repeated more often,
    /// and `count` basis functions.
    pub fn check_clamped(&self, degree: usize, count: usize) -> Result<()> {
        check_values(&self.0)?;
        let clamped = degree.saturating_add(1);
        let multiplicity = self.multiplicity();
        let (first, last) = match (multiplicity.first(), multiplicity.last()) {
            (Some(first), Some(last)) => (first.multiplicity(), last.multiplicity()),
            _ => (0, 0),
        };
        ensure_valid!(
            first == clamped && last == clamped,
            "knot vector is not clamped: endpoint multiplicities {} and {} for degree {}",
            first,
            last,
            degree
        );
        ensure_valid!(
            multiplicity.iter().all(|m| m.multiplicity() <= clamped),
            "knot vector has a knot repeated more than {} times",
            clamped
        );
        let expected = self.number_of_basis_functions(degree);
        ensure_valid!(
            count == expected,
            "got {} control points, but {} knots of degree {} need {}",
            count,
            self.len(),
            degree,
            expected
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn first(&self) -> T {
        self.0[0]
    }

    pub fn last(&self) -> T {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Number of basis functions of the given degree defined over this knot vector
    pub fn number_of_basis_functions(&self, degree: usize) -> usize {
        self.0.len().saturating_sub(degree.saturating_add(1))
    }

    /// Get the domain of the knot vector by degree
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Returns the index of the last knot less than or equal to knot
    pub fn floor(&self, knot: T) -> Option<usize> {
        self.iter().rposition(|t| *t <= knot)
    }

    /// Add a knot after any equal knots and return the index of added knot
    pub fn add(&mut self, knot: T) -> usize {
        match self.floor(knot) {
            Some(idx) => {
                self.0.insert(idx + 1, knot);
                idx + 1
            }
            None => {
                self.0.insert(0, knot);
                0
            }
        }
    }

    /// Remove the last occurrence of a knot and return its former index
    pub fn remove(&mut self, knot: T) -> Option<usize> {
        let idx = self.0.iter().rposition(|t| *t == knot)?;
        self.0.remove(idx);
        Some(idx)
    }

    /// Get the multiplicity of each distinct knot, comparing values exactly
    /// # Example
    /// ```
    /// use tenspline::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let knot_multiplicity = knots.multiplicity();
    /// assert_eq!(knot_multiplicity[0].multiplicity(), 3);
    /// assert_eq!(knot_multiplicity[1].multiplicity(), 1);
    /// assert_eq!(knot_multiplicity[2].multiplicity(), 1);
    /// assert_eq!(knot_multiplicity[3].multiplicity(), 3);
    /// ```
    pub fn multiplicity(&self) -> Vec<KnotMultiplicity<T>> {
        self.0
            .iter()
            .dedup_with_count()
            .map(|(count, knot)| KnotMultiplicity::new(*knot, count))
            .collect()
    }

    /// Number of times `knot` occurs, zero when absent
    pub fn multiplicity_of(&self, knot: T) -> usize {
        self.0.iter().filter(|t| **t == knot).count()
    }

    /// Distinct knot values in increasing order
    pub fn unique_knots(&self) -> Vec<T> {
        self.0.iter().dedup().copied().collect()
    }

    /// Check if the knot vector is clamped
    /// `clamped` means the first and last knots have a multiplicity greater than the degree
    /// e.g. [0, 0, 0, 1, 2, 3, 3, 3] with degree 2 is clamped
    pub fn is_clamped(&self, degree: usize) -> bool {
        let multiplicity = self.multiplicity();
        match (multiplicity.first(), multiplicity.last()) {
            (Some(start), Some(end)) => {
                start.multiplicity() > degree && end.multiplicity() > degree
            }
            _ => false,
        }
    }

    /// Check whether `u` lies in the closed domain of the given degree
    pub fn contains(&self, degree: usize, u: T) -> bool {
        let (start, end) = self.domain(degree);
        start <= u && u <= end
    }

    /// Find the index `i` of the knot span `[t_i, t_{i+1})` containing `u`
    ///
    /// Knots are compared exactly. Values at or beyond the end of the domain
    /// map to the last nonempty span, so the basis stays defined at the closed upper boundary.
    ///
    /// # Example
    /// ```
    /// use tenspline::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// assert_eq!(knots.find_span(2, 2.5), 4);
    /// assert_eq!(knots.find_span(2, 1.), 3);
    /// assert_eq!(knots.find_span(2, 3.), 4);
    /// ```
    pub fn find_span(&self, degree: usize, u: T) -> usize {
        let n = self.number_of_basis_functions(degree);
        if u >= self[n] {
            return (degree..n)
                .rev()
                .find(|i| self[*i] < self[*i + 1])
                .unwrap_or(degree);
        }
        if u <= self[degree] {
            return (degree..n)
                .find(|i| self[*i] < self[*i + 1])
                .unwrap_or(degree);
        }
        self.0[..n].partition_point(|t| *t <= u) - 1
    }

    /// Compute the non-vanishing basis functions
    ///
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let mut basis_functions = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis_functions[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let temp = basis_functions[r] / (right[r + 1] + left[j - r]);
                basis_functions[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis_functions[j] = saved;
        }

        basis_functions
    }

    /// Compute the non-vanishing basis functions and their derivatives
    /// 2d array of basis and derivative values of size (order+1, degree+1).
    /// The kth row is the kth derivative and the first row is made up of the basis function values.
    /// Rows above the degree are zero.
    pub fn derivative_basis_functions(
        &self,
        knot_index: usize,
        u: T,
        degree: usize,
        order: usize,
    ) -> Vec<Vec<T>> {
        let mut ndu = vec![vec![T::zero(); degree + 1]; degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        ndu[0][0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_index + 1 - j];
            right[j] = self[knot_index + j] - u;

            let mut saved = T::zero();
            for r in 0..j {
                // lower triangle
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];

                // upper triangle
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![T::zero(); degree + 1]; order + 1];
        let mut a = vec![vec![T::zero(); degree + 1]; 2];

        // load the basis functions
        for j in 0..=degree {
            ders[0][j] = ndu[j][degree];
        }

        let idegree = degree as isize;
        let n = order.min(degree) as isize;

        // compute the derivatives
        for r in 0..=idegree {
            // alternate rows in array a
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = T::one();

            // loop to compute the kth derivative
            for k in 1..=n {
                let mut d = T::zero();
                let rk = r - k;
                let pk = idegree - k;

                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[(pk + 1) as usize][rk as usize];
                    d = a[s2][0] * ndu[rk as usize][pk as usize];
                }

                let j1 = if rk >= -1 { 1 } else { -rk };
                let j2 = if r - 1 <= pk { k - 1 } else { idegree - r };

                for j in j1..=j2 {
                    a[s2][j as usize] = (a[s1][j as usize] - a[s1][j as usize - 1])
                        / ndu[(pk + 1) as usize][(rk + j) as usize];
                    d += a[s2][j as usize] * ndu[(rk + j) as usize][pk as usize];
                }

                let uk = k as usize;
                let ur = r as usize;
                if r <= pk {
                    a[s2][uk] = -a[s1][(k - 1) as usize] / ndu[(pk + 1) as usize][ur];
                    d += a[s2][uk] * ndu[ur][pk as usize];
                }

                ders[uk][ur] = d;

                // switch rows
                std::mem::swap(&mut s1, &mut s2);
            }
        }

        let mut acc = idegree;
        for k in 1..=n {
            let factor: T = convert(acc as f64);
            for j in 0..=idegree {
                ders[k as usize][j as usize] *= factor;
            }
            acc *= idegree - k;
        }
        ders
    }

    /// Compare with another knot vector, allowing each knot to differ by `tolerance`
    pub fn is_equal(&self, other: &Self, tolerance: T) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| (*a - *b).abs() <= tolerance)
    }

    /// Cast the knot vector to another floating point type
    /// # Example
    /// ```
    /// use tenspline::prelude::*;
    /// let knots: KnotVector<f64> = KnotVector::new(vec![1., 2., 3., 4., 5., 6.]);
    /// let knots2 = knots.cast::<f32>();
    /// assert_eq!(knots2.first(), 1.0);
    /// ```
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> KnotVector<F> {
        KnotVector::new(self.0.iter().map(|v| convert(*v)).collect())
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for KnotVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Finite, non-decreasing and spanning a non-empty interval
fn check_values<T: FloatingPoint>(knots: &[T]) -> Result<()> {
    ensure_valid!(
        knots.len() >= 2,
        "a knot vector needs at least 2 knots, got {}",
        knots.len()
    );
    ensure_valid!(
        knots.iter().all(|k| k.is_finite()),
        "knot vector contains a non-finite value"
    );
    ensure_valid!(
        knots.windows(2).all(|w| w[0] <= w[1]),
        "knot vector is not non-decreasing"
    );
    ensure_valid!(
        knots[0] < knots[knots.len() - 1],
        "knot vector spans an empty interval"
    );
    Ok(())
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for KnotVector<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Deserialized knots are validated like [`KnotVector::try_new`]
#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for KnotVector<T>
where
    T: FloatingPoint + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let knots = Vec::<T>::deserialize(deserializer)?;
        Self::try_new(knots).map_err(serde::de::Error::custom)
    }
}
