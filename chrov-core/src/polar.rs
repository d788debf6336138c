//! Polar coordinate mapping for circular chromosome layouts.
//!
//! Genomic intervals are densified into evenly spaced samples so that an arc
//! drawn through them looks smooth, then rescaled into an angular range.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{ChrovError, Result};
use crate::rescale::{min_max, rescale};

/// Evenly spaced samples from `start` to `end`.
///
/// The step is either `interval` or `(end - start) / intervals` (the latter
/// wins when both are given). When the span exceeds the step the samples are
/// `start, start + step, ...` strictly below `end`, followed by `end`;
/// otherwise exactly `[start, end]`. `end` is always present exactly once.
pub fn interpolate(start: f64, end: f64, interval: Option<f64>, intervals: Option<usize>) -> Result<Vec<f64>> {
    let step = match (interval, intervals) {
        (_, Some(0)) => return Err(ChrovError::config("intervals must be at least 1")),
        (_, Some(n)) => (end - start) / n as f64,
        (Some(step), None) => step,
        (None, None) => {
            return Err(ChrovError::config("either interval or intervals should be provided"))
        }
    };
    if step.is_nan() {
        return Err(ChrovError::config(format!("invalid interval {} for [{}, {}]", step, start, end)));
    }
    if end - start > step {
        if step <= 0.0 || !step.is_finite() {
            return Err(ChrovError::config(format!("interval must be positive, got {}", step)));
        }
        let n = ((end - start) / step).ceil() as usize;
        let mut samples: Vec<f64> = (0..n)
            .map(|i| start + step * i as f64)
            .filter(|&v| v < end)
            .collect();
        samples.push(end);
        Ok(samples)
    } else {
        Ok(vec![start, end])
    }
}

/// Map linear coordinates to angles.
///
/// With `interval`, the first and last of the sorted values are densified
/// with [`interpolate`] before mapping. `source` defaults to the min/max of
/// the (densified) values, `target` to `[0, 2π]`.
pub fn to_polar(
    values: &[f64],
    source: Option<(f64, f64)>,
    target: Option<(f64, f64)>,
    interval: Option<f64>,
) -> Result<Vec<f64>> {
    let densified;
    let values = match interval {
        Some(step) => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            if sorted.len() < 2 {
                return Err(ChrovError::invalid_data(format!(
                    "at least two coordinates are needed to interpolate, got {:?}",
                    values
                )));
            }
            densified = interpolate(sorted[0], sorted[sorted.len() - 1], Some(step), None)?;
            densified.as_slice()
        }
        None => values,
    };
    let source = source.or_else(|| min_max(values));
    Ok(rescale(values, source, target))
}

/// Angular range of a circular layout, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularRange {
    pub start: f64,
    pub end: f64,
}

impl Default for AngularRange {
    fn default() -> Self {
        Self { start: 0.0, end: 2.0 * PI }
    }
}

impl AngularRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Range from multiples of π: `[start·π, (start + span)·π]`, or
    /// `[start·π, end·π]` when `end` is given. `span` must be in `(0, 2]`.
    pub fn from_pi(span: f64, start: f64, end: Option<f64>) -> Result<Self> {
        if !(span > 0.0 && span <= 2.0) {
            return Err(ChrovError::config(format!("pi span must be in (0, 2], got {}", span)));
        }
        let end = match end {
            Some(end) => end * PI,
            None => (start + span) * PI,
        };
        Ok(Self { start: start * PI, end })
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// True when the span is an exact multiple of a full turn
    pub fn is_full_circle(&self) -> bool {
        self.span() % (2.0 * PI) == 0.0
    }

    /// Midpoint angle
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Angular sub-range of `local` within `global`, proportional to its share
/// of `parent`.
pub fn sub_range(local: (f64, f64), global: (f64, f64), parent: AngularRange) -> AngularRange {
    let mapped = rescale(&[local.0, local.1], Some(global), Some(parent.as_tuple()));
    AngularRange::new(mapped[0], mapped[1])
}
