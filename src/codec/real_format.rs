use crate::{
    error::{Result, SplineError},
    misc::FloatingPoint,
};

/// Magnitudes in `[EXPONENT_BELOW, EXPONENT_FROM)` are written positionally, others in exponent form
const EXPONENT_BELOW: f64 = 1e-5;
const EXPONENT_FROM: f64 = 1e16;

/// Write a real in its canonical text form.
///
/// Without a precision the shortest text that reads back to the same value is written.
/// With `Some(n)` the value is first rounded to `n` significant digits.
/// Trailing zeros and a trailing decimal point are never written.
/// # Example
/// ```
/// use tenspline::prelude::write_real;
/// assert_eq!(write_real(0.5, None), "0.5");
/// assert_eq!(write_real(2.0, None), "2");
/// assert_eq!(write_real(-0.0, None), "0");
/// assert_eq!(write_real(8.765432101234567, Some(4)), "8.765");
/// assert_eq!(write_real(1.5e-7, None), "1.5e-7");
/// assert_eq!(write_real(2e20, None), "2e20");
/// ```
pub fn write_real<T: FloatingPoint>(value: T, precision: Option<usize>) -> String {
    let value = match precision {
        Some(digits) => round_to_significant_digits(value, digits),
        None => value,
    };
    if value == T::zero() {
        return "0".to_string();
    }
    let magnitude = value.abs().to_f64().unwrap_or(f64::INFINITY);
    if (EXPONENT_BELOW..EXPONENT_FROM).contains(&magnitude) {
        format!("{}", value)
    } else {
        format!("{:e}", value)
    }
}

fn round_to_significant_digits<T: FloatingPoint>(value: T, digits: usize) -> T {
    let text = format!("{:.*e}", digits.max(1) - 1, value);
    text.parse::<T>().unwrap_or(value)
}

/// Read a real written by [`write_real`] or any other decimal notation.
/// Non-finite values are rejected.
pub fn read_real<T: FloatingPoint>(token: &str) -> Result<T> {
    let value = token
        .trim()
        .parse::<T>()
        .map_err(|_| SplineError::MalformedInput(format!("{:?} is not a real number", token)))?;
    if !value.is_finite() {
        return Err(SplineError::MalformedInput(format!(
            "{:?} is not a finite real number",
            token
        )));
    }
    Ok(value)
}

/// Read a non-negative integer such as a degree or a count
pub fn read_count(token: &str) -> Result<usize> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| SplineError::MalformedInput(format!("{:?} is not a count", token)))
}
