/// Errors reported by spline construction, queries, structural transforms and the text codec.
///
/// A rejected knot removal or degree reduction is not an error: those calls
/// report the achieved multiplicity (`Ok(0)`) or `Ok(false)` instead.
/// Every `Err` leaves the spline it was raised on untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("invalid spline: {0}")]
    Construction(String),
    #[error("dimension {dimension} is out of range for a spline with {parametric_dimension} parametric dimension(s)")]
    InvalidDimensionIndex {
        dimension: usize,
        parametric_dimension: usize,
    },
    #[error("knot {knot} already has multiplicity {multiplicity}, the maximum for degree {degree}")]
    MultiplicityOverflow {
        knot: f64,
        multiplicity: usize,
        degree: usize,
    },
    #[error("parametric coordinate {value} is outside [{start}, {end}] in dimension {dimension}")]
    ParameterOutOfDomain {
        dimension: usize,
        value: f64,
        start: f64,
        end: f64,
    },
    #[error("expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("the derivative of orders {orders:?} of a rational spline has too many terms")]
    DerivativeOrderOverflow { orders: Vec<usize> },
    #[error("malformed serialized input: {0}")]
    MalformedInput(String),
}

pub type Result<T, E = SplineError> = std::result::Result<T, E>;

/// Returns early with [`SplineError::Construction`] unless the condition holds.
macro_rules! ensure_valid {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SplineError::Construction(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_valid;
