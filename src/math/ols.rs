//! Ordinary least squares solver.
//!
//! We solve:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD, so tall design matrices (many more rows than columns) are handled
//!   directly. Nalgebra's `QR::solve` is intended for square systems.
//! - The design matrix must have full column rank. Rank is counted against the
//!   relative tolerance `σ_max · max(n, p) · ε`; anything below is treated as
//!   zero and the problem is rejected instead of returning one of infinitely
//!   many minimizers.

use nalgebra::{DMatrix, DVector};

/// Why a least-squares problem could not be solved.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// `x` and `y` disagree on the number of rows.
    ShapeMismatch { rows_x: usize, rows_y: usize },
    /// Fewer independent columns than parameters.
    RankDeficient { rank: usize, cols: usize },
    /// The SVD solve produced non-finite coefficients.
    NonFinite,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::ShapeMismatch { rows_x, rows_y } => {
                write!(f, "design matrix has {rows_x} rows but target has {rows_y}")
            }
            SolveError::RankDeficient { rank, cols } => {
                write!(f, "design matrix has rank {rank} < {cols} columns")
            }
            SolveError::NonFinite => write!(f, "least squares solution is not finite"),
        }
    }
}

/// Numerical rank tolerance for a matrix with the given singular values.
fn rank_tolerance(singular_values: &DVector<f64>, rows: usize, cols: usize) -> f64 {
    let sigma_max = singular_values.iter().copied().fold(0.0, f64::max);
    sigma_max * rows.max(cols) as f64 * f64::EPSILON
}

/// Solve a full-rank least squares problem using SVD.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    if x.nrows() != y.len() {
        return Err(SolveError::ShapeMismatch {
            rows_x: x.nrows(),
            rows_y: y.len(),
        });
    }

    let cols = x.ncols();
    if x.nrows() < cols {
        return Err(SolveError::RankDeficient {
            rank: x.nrows(),
            cols,
        });
    }

    let svd = x.clone().svd(true, true);
    let tol = rank_tolerance(&svd.singular_values, x.nrows(), cols);
    let rank = svd.rank(tol);
    if rank < cols {
        return Err(SolveError::RankDeficient { rank, cols });
    }

    let beta = svd.solve(y, tol).map_err(|_| SolveError::NonFinite)?;
    if beta.iter().all(|v| v.is_finite()) {
        Ok(beta)
    } else {
        Err(SolveError::NonFinite)
    }
}

/// Prepend a column of ones to `x`.
pub fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
    x.clone().insert_column(0, 1.0)
}
