//! Linear model fitting.
//!
//! Given a training feature set we solve, with an intercept column prepended:
//!
//! ```text
//! minimize Σ (y_i - β0 - x_i^T β)^2
//! ```
//!
//! The fit is closed-form (SVD) and has no internal randomness, so identical
//! inputs always give identical coefficients.

use tracing::debug;

use crate::domain::{FEATURE_COUNT, FittedModel};
use crate::error::{AppError, Stage};
use crate::fit::features::FeatureSet;
use crate::math::{SolveError, solve_least_squares, with_intercept};

/// Fit OLS coefficients and intercept on `train`.
///
/// Fails with `DegenerateInput` when `[1 | X]` is not of full column rank
/// (constant or duplicate columns, fewer rows than parameters).
pub fn fit_linear_model(train: &FeatureSet) -> Result<FittedModel, AppError> {
    if train.x.ncols() != FEATURE_COUNT {
        return Err(AppError::input_shape(
            Stage::Fit,
            format!("training matrix has {} columns, expected {FEATURE_COUNT}", train.x.ncols()),
        ));
    }
    if train.is_empty() {
        return Err(AppError::input_shape(Stage::Fit, "training set is empty"));
    }

    let design = with_intercept(&train.x);
    let beta = solve_least_squares(&design, &train.y).map_err(|e| match e {
        SolveError::ShapeMismatch { .. } => AppError::input_shape(Stage::Fit, e.to_string()),
        SolveError::RankDeficient { .. } => AppError::degenerate(
            Stage::Fit,
            format!(
                "{e} (n={} rows, intercept + {FEATURE_COUNT} features); check for constant or duplicate columns",
                train.len()
            ),
        ),
        SolveError::NonFinite => AppError::degenerate(Stage::Fit, e.to_string()),
    })?;

    let model = FittedModel::from_solution(beta.as_slice())?;
    debug!(
        rows = train.len(),
        intercept = model.intercept,
        coefficients = ?model.coefficients,
        "fitted linear model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use nalgebra::{DMatrix, DVector};
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn synthetic(n: usize, noise_sd: f64, seed: u64) -> FeatureSet {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, noise_sd).unwrap();
        let mut x = DMatrix::<f64>::zeros(n, FEATURE_COUNT);
        let mut y = DVector::<f64>::zeros(n);
        for i in 0..n {
            let q = rng.gen_range(1..=50) as f64;
            let p = rng.gen_range(100.0..3000.0);
            let c = if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
            x[(i, 0)] = q;
            x[(i, 1)] = p;
            x[(i, 2)] = c;
            y[i] = 10.0 + 50.0 * q + 0.8 * p + 120.0 * c + noise.sample(&mut rng);
        }
        FeatureSet::new(x, y).unwrap()
    }

    fn within_pct(actual: f64, expected: f64, pct: f64) -> bool {
        (actual - expected).abs() <= expected.abs() * pct
    }

    #[test]
    fn recovers_generating_coefficients() {
        let data = synthetic(2000, 5.0, 11);
        let model = fit_linear_model(&data).unwrap();

        assert!(within_pct(model.coefficients[0], 50.0, 0.05), "{:?}", model);
        assert!(within_pct(model.coefficients[1], 0.8, 0.05), "{:?}", model);
        assert!(within_pct(model.coefficients[2], 120.0, 0.05), "{:?}", model);
    }

    #[test]
    fn noiseless_fit_is_exact() {
        let data = synthetic(50, 1e-12, 3);
        let model = fit_linear_model(&data).unwrap();
        assert!((model.intercept - 10.0).abs() < 1e-6);
        assert!((model.coefficients[0] - 50.0).abs() < 1e-8);
        assert!((model.coefficients[1] - 0.8).abs() < 1e-8);
        assert!((model.coefficients[2] - 120.0).abs() < 1e-6);
    }

    #[test]
    fn fitting_is_deterministic() {
        let data = synthetic(300, 20.0, 5);
        let a = fit_linear_model(&data).unwrap();
        let b = fit_linear_model(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identical_columns_are_degenerate() {
        let mut data = synthetic(100, 1.0, 9);
        for i in 0..data.len() {
            data.x[(i, 1)] = data.x[(i, 0)];
        }
        let err = fit_linear_model(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
        assert_eq!(err.stage(), Stage::Fit);
    }

    #[test]
    fn constant_column_is_degenerate() {
        let mut data = synthetic(100, 1.0, 9);
        for i in 0..data.len() {
            data.x[(i, 2)] = 1.0;
        }
        let err = fit_linear_model(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
    }
}
