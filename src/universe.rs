//! Discretized universes of discourse.
//!
//! A universe is the ordered set of sample points over which output
//! membership curves are evaluated, clipped, aggregated and defuzzified.
//! The spacing of those samples governs defuzzification resolution.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// Absorbs float error when the step divides the width evenly (e.g. 10 / 0.1).
const STEP_TOLERANCE: f64 = 1e-9;

/// Largest number of sample points [`Universe::range`] will build.
pub const MAX_POINTS: usize = 1_000_000;

/// A non-empty, strictly increasing sequence of finite sample points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Universe(Vec<f64>);

impl Universe {
    /// Builds an evenly spaced universe from `min` to `max`, both included.
    ///
    /// When `step` does not divide the width evenly the last interval is
    /// shorter so that `max` is always the final point.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidUniverseBounds` if `min >= max` or either
    /// bound is not finite, and `ValidationError::InvalidStep` if `step` is not
    /// positive, not finite, wider than the universe, or so small that the
    /// universe would exceed [`MAX_POINTS`].
    #[allow(clippy::cast_precision_loss)]
    pub fn range(min: f64, max: f64, step: f64) -> Result<Self, ValidationError> {
        let intervals = Self::point_count(min, max, step)? - 1;
        let mut points = Vec::with_capacity(intervals + 1);
        points.extend((0..intervals).map(|i| min + i as f64 * step));
        points.push(max);

        Ok(Self(points))
    }

    /// Number of points [`Universe::range`] would produce, without building them.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Universe::range`].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn point_count(min: f64, max: f64, step: f64) -> Result<usize, ValidationError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ValidationError::InvalidUniverseBounds { min, max });
        }
        let width = max - min;
        if !step.is_finite() || step <= 0.0 || step > width {
            return Err(ValidationError::InvalidStep { step });
        }

        let intervals = (width / step - STEP_TOLERANCE).ceil();
        if !intervals.is_finite() || intervals >= MAX_POINTS as f64 {
            return Err(ValidationError::InvalidStep { step });
        }
        Ok(intervals as usize + 1)
    }

    /// Builds a universe from arbitrary points.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyUniverse` for an empty sequence and
    /// `ValidationError::UniverseNotIncreasing` if any point is not finite or
    /// not strictly greater than its predecessor.
    pub fn from_points(points: Vec<f64>) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptyUniverse);
        }
        if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
            return Err(ValidationError::UniverseNotIncreasing {
                index: bad,
                previous: if bad == 0 { f64::NEG_INFINITY } else { points[bad - 1] },
                current: points[bad],
            });
        }
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ValidationError::UniverseNotIncreasing {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self(points))
    }

    /// Returns the sample points.
    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.0
    }

    /// Number of sample points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest point.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.0[0]
    }

    /// Largest point.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Returns true if `x` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.min() && x <= self.max()
    }
}

impl<'de> Deserialize<'de> for Universe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        Universe::from_points(raw).map_err(serde::de::Error::custom)
    }
}
