//! Shared types for the detection engine.

use serde::{Deserialize, Serialize};

use crate::evaluation::EvalError;

/// A percentile window over a latency distribution.
///
/// Bounds are fractions in `[0.0, 1.0]` with `lower < upper`. The window
/// `(0.0, 1.0)` spans the whole distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    lower: f64,
    upper: f64,
}

impl Window {
    /// Create a window from user-supplied fractions.
    ///
    /// Returns [`EvalError::InvalidWindow`] unless
    /// `0.0 <= lower < upper <= 1.0`.
    pub fn new(lower: f64, upper: f64) -> Result<Self, EvalError> {
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(EvalError::InvalidWindow { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Create a window from percentile points `0..=100` found by the
    /// optimal-window search. Callers guarantee `lower < upper`.
    pub(crate) fn from_points(lower: usize, upper: usize) -> Self {
        debug_assert!(lower < upper && upper <= 100);
        Self {
            lower: lower as f64 / 100.0,
            upper: upper as f64 / 100.0,
        }
    }

    /// Lower bound as a fraction.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound as a fraction.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// The window bounds truncated to integer percentile points `0..=100`.
    pub fn points(&self) -> (usize, usize) {
        ((self.lower * 100.0) as usize, (self.upper * 100.0) as usize)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // {:?} keeps the decimal point on whole fractions (0.0-1.0)
        write!(f, "{:?}-{:?}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_bounds() {
        let w = Window::new(0.0, 1.0).unwrap();
        assert_eq!(w.lower(), 0.0);
        assert_eq!(w.upper(), 1.0);
        assert!(Window::new(0.25, 0.75).is_ok());
    }

    #[test]
    fn new_rejects_inverted_and_out_of_range_bounds() {
        assert!(Window::new(0.5, 0.5).is_err());
        assert!(Window::new(0.9, 0.1).is_err());
        assert!(Window::new(-0.1, 0.5).is_err());
        assert!(Window::new(0.0, 1.1).is_err());
        assert!(Window::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn points_truncate_fractions() {
        assert_eq!(Window::new(0.0, 1.0).unwrap().points(), (0, 100));
        assert_eq!(Window::new(0.25, 0.75).unwrap().points(), (25, 75));
        // truncation, not rounding
        assert_eq!(Window::new(0.259, 0.999).unwrap().points(), (25, 99));
    }

    #[test]
    fn from_points_round_trips_through_fractions() {
        // dyadic points survive the fraction round trip exactly
        for (lo, hi) in [(0, 100), (0, 50), (25, 75), (50, 100), (75, 100)] {
            assert_eq!(Window::from_points(lo, hi).points(), (lo, hi));
        }
    }

    #[test]
    fn display_keeps_decimal_point() {
        let w = Window::new(0.0, 1.0).unwrap();
        assert_eq!(w.to_string(), "0.0-1.0");
    }
}
