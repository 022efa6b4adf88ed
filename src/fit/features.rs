//! Projection of adapted records into the regression inputs.

use nalgebra::{DMatrix, DVector};

use crate::domain::{FEATURE_COUNT, TransactionRecord};
use crate::error::{AppError, Stage};

/// Feature matrix (`N × 3`: quantity, unit price, campaign flag) and revenue target.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl FeatureSet {
    /// Wrap an existing matrix/vector pair, checking the shape contract.
    pub fn new(x: DMatrix<f64>, y: DVector<f64>) -> Result<Self, AppError> {
        if x.ncols() != FEATURE_COUNT {
            return Err(AppError::input_shape(
                Stage::BuildFeatures,
                format!("feature matrix has {} columns, expected {FEATURE_COUNT}", x.ncols()),
            ));
        }
        if x.nrows() != y.len() {
            return Err(AppError::input_shape(
                Stage::BuildFeatures,
                format!("feature matrix has {} rows but target has {}", x.nrows(), y.len()),
            ));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn row(&self, i: usize) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (j, v) in out.iter_mut().enumerate() {
            *v = self.x[(i, j)];
        }
        out
    }

    /// Copy the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> FeatureSet {
        FeatureSet {
            x: self.x.select_rows(rows),
            y: self.y.select_rows(rows),
        }
    }
}

/// Build `X` and `y` from the records.
///
/// Records are expected to be repaired by the adapter already; anything still
/// unusable here is an input error, not something to skip.
pub fn build_features(records: &[TransactionRecord]) -> Result<FeatureSet, AppError> {
    if records.is_empty() {
        return Err(AppError::input_shape(Stage::BuildFeatures, "no records to build features from"));
    }

    let n = records.len();
    let mut x = DMatrix::<f64>::zeros(n, FEATURE_COUNT);
    let mut y = DVector::<f64>::zeros(n);

    for (i, r) in records.iter().enumerate() {
        check_record(i, r)?;
        x[(i, 0)] = f64::from(r.quantity);
        x[(i, 1)] = r.unit_price;
        x[(i, 2)] = r.campaign_flag().as_f64();
        y[i] = r.total_value;
    }

    FeatureSet::new(x, y)
}

fn check_record(i: usize, r: &TransactionRecord) -> Result<(), AppError> {
    if r.quantity == 0 {
        return Err(AppError::input_shape(
            Stage::BuildFeatures,
            format!("record {i}: quantity must be a positive integer"),
        ));
    }
    if !(r.unit_price.is_finite() && r.unit_price > 0.0) {
        return Err(AppError::input_shape(
            Stage::BuildFeatures,
            format!("record {i}: unit price must be finite and > 0, got {}", r.unit_price),
        ));
    }
    if !r.total_value.is_finite() {
        return Err(AppError::input_shape(
            Stage::BuildFeatures,
            format!("record {i}: total value is not finite"),
        ));
    }
    if r.campaign.trim().is_empty() {
        return Err(AppError::input_shape(
            Stage::BuildFeatures,
            format!("record {i}: campaign label is missing"),
        ));
    }
    Ok(())
}
