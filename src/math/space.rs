//! Evenly spaced axes for the scenario grid.

use crate::config::AxisSpec;
use crate::error::AppError;

/// Generate `spec.points` evenly spaced values from `spec.min` to `spec.max` (inclusive).
///
/// Values are `min + i * step` with `step = (max - min) / (points - 1)`; the last
/// value is pinned to `max` so the endpoint is exact. A single-point axis is `[min]`.
pub fn lin_space(spec: &AxisSpec, name: &str) -> Result<Vec<f64>, AppError> {
    spec.validate(name)?;

    let n = spec.points;
    if n == 1 {
        return Ok(vec![spec.min]);
    }

    let step = (spec.max - spec.min) / (n as f64 - 1.0);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        out.push(spec.min + i as f64 * step);
    }
    out[n - 1] = spec.max;
    Ok(out)
}
