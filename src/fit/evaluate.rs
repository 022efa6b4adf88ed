//! Out-of-sample evaluation of a fitted model.

use crate::domain::{EvaluationReport, FEATURE_COUNT, FittedModel, RSquared};
use crate::error::{AppError, Stage};
use crate::fit::features::FeatureSet;

/// Score `model` on `test`: R², MAE, RMSE and residuals (`y - ŷ`, in row order).
///
/// R² is reported as `RSquared::Undefined` when every test target is identical
/// (`SS_tot = 0`).
pub fn evaluate(model: &FittedModel, test: &FeatureSet) -> Result<EvaluationReport, AppError> {
    if test.x.ncols() != FEATURE_COUNT {
        return Err(AppError::input_shape(
            Stage::Evaluate,
            format!("test matrix has {} columns, expected {FEATURE_COUNT}", test.x.ncols()),
        ));
    }
    if test.x.nrows() != test.y.len() {
        return Err(AppError::input_shape(
            Stage::Evaluate,
            format!("test matrix has {} rows but target has {}", test.x.nrows(), test.y.len()),
        ));
    }
    if test.is_empty() {
        return Err(AppError::input_shape(Stage::Evaluate, "test set is empty"));
    }

    let n = test.len();
    let mut predictions = Vec::with_capacity(n);
    let mut residuals = Vec::with_capacity(n);
    for i in 0..n {
        let y_hat = model.predict(&test.row(i));
        predictions.push(y_hat);
        residuals.push(test.y[i] - y_hat);
    }

    let n_f = n as f64;
    let mean_y = test.y.iter().sum::<f64>() / n_f;
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = test.y.iter().map(|y| (y - mean_y).powi(2)).sum();
    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n_f;
    let rmse = (ss_res / n_f).sqrt();

    let r2 = if ss_tot == 0.0 {
        RSquared::Undefined
    } else {
        RSquared::Defined(1.0 - ss_res / ss_tot)
    };

    Ok(EvaluationReport {
        r2,
        mae,
        rmse,
        residuals,
        predictions,
    })
}
