//! Triangular membership functions.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::universe::Universe;

/// Triangular membership shape with breakpoints `a <= b <= c`.
///
/// Membership is zero outside `(a, c)`, rises linearly to one at `b` and
/// falls linearly back to zero at `c`. When `a == b` (or `b == c`) the shape
/// is a shoulder: the peak sits on the edge and evaluates to exactly one
/// there instead of dividing by a zero-width ramp.
///
/// # Examples
///
/// ```
/// use fuzzy_satisfaction::Triangular;
///
/// let normal = Triangular::new(2.0, 5.0, 8.0).unwrap();
/// assert_eq!(normal.evaluate(5.0), 1.0);
/// assert_eq!(normal.evaluate(3.5), 0.5);
///
/// let fast = Triangular::new(5.0, 10.0, 10.0).unwrap();
/// assert_eq!(fast.evaluate(10.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Triangular {
    a: f64,
    b: f64,
    c: f64,
}

impl Triangular {
    /// Creates a validated triangular shape.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidBreakpoints` if any breakpoint is not
    /// finite or the breakpoints are not non-decreasing.
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self, ValidationError> {
        let finite = a.is_finite() && b.is_finite() && c.is_finite();
        if !finite || a > b || b > c {
            return Err(ValidationError::InvalidBreakpoints { a, b, c });
        }
        Ok(Self { a, b, c })
    }

    /// Returns the breakpoints as `(a, b, c)`.
    #[must_use]
    pub const fn breakpoints(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    /// Degree of membership of `x`, always within `[0, 1]`.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let Self { a, b, c } = *self;
        if x.is_nan() {
            return 0.0;
        }
        // Covers both shoulders (a == b, b == c) before the edge checks.
        if x == b {
            return 1.0;
        }
        let mu = if x <= a || x >= c {
            0.0
        } else if x < b {
            (x - a) / (b - a)
        } else {
            (c - x) / (c - b)
        };
        mu.clamp(0.0, 1.0)
    }

    /// Samples the shape at every point of `universe`.
    #[must_use]
    pub fn sample(&self, universe: &Universe) -> Vec<f64> {
        universe.points().iter().map(|&x| self.evaluate(x)).collect()
    }
}

impl TryFrom<[f64; 3]> for Triangular {
    type Error = ValidationError;

    fn try_from([a, b, c]: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(a, b, c)
    }
}

impl From<Triangular> for [f64; 3] {
    fn from(t: Triangular) -> Self {
        [t.a, t.b, t.c]
    }
}
