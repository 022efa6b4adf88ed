//! Deterministic train/test partition.
//!
//! The seed is part of the reproducibility contract: the same seed and the same
//! number of rows always produce the same partition.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{AppError, Stage};
use crate::fit::features::FeatureSet;

/// Row indices of each subset, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Materialized subsets plus the indices they came from.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub indices: SplitIndices,
    pub train: FeatureSet,
    pub test: FeatureSet,
}

/// `(train_size, test_size)` for `n` rows with held-out fraction `test_fraction`.
///
/// `train_size` is `n · (1 - test_fraction)` rounded to the nearest integer,
/// with exact halves rounded down.
pub fn split_sizes(n: usize, test_fraction: f64) -> Result<(usize, usize), AppError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AppError::config(
            Stage::Split,
            format!("test_fraction must be in (0, 1), got {test_fraction}"),
        ));
    }
    // Halves round down so the tie goes to the held-out side.
    let train = ((n as f64) * (1.0 - test_fraction) - 0.5).ceil().max(0.0) as usize;
    let train = train.min(n);
    let test = n - train;
    if train == 0 || test == 0 {
        return Err(AppError::input_shape(
            Stage::Split,
            format!("{n} rows with test_fraction={test_fraction} leave train={train}, test={test}; both must be non-empty"),
        ));
    }
    Ok((train, test))
}

/// Partition `0..n` into train/test index sets.
///
/// The first `test_size` indices of a seeded shuffle are held out; the rest train.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices, AppError> {
    let (_, test_size) = split_sizes(n, test_fraction)?;

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(test_size);
    Ok(SplitIndices { train, test: order })
}

pub fn train_test_split(data: &FeatureSet, test_fraction: f64, seed: u64) -> Result<TrainTestSplit, AppError> {
    if data.x.nrows() != data.y.len() {
        return Err(AppError::input_shape(
            Stage::Split,
            format!("feature matrix has {} rows but target has {}", data.x.nrows(), data.y.len()),
        ));
    }

    let indices = split_indices(data.len(), test_fraction, seed)?;
    let train = data.select(&indices.train);
    let test = data.select(&indices.test);

    Ok(TrainTestSplit { indices, train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn sizes_follow_rounding_rule() {
        assert_eq!(split_sizes(100, 0.2).unwrap(), (80, 20));
        assert_eq!(split_sizes(7, 0.2).unwrap(), (6, 1));
        assert_eq!(split_sizes(13, 0.25).unwrap(), (10, 3));
    }

    #[test]
    fn half_way_sizes_hold_out_a_row() {
        assert_eq!(split_sizes(10, 0.05).unwrap(), (9, 1));
        assert_eq!(split_sizes(2, 0.25).unwrap(), (1, 1));
        assert_eq!(split_sizes(10, 0.25).unwrap(), (7, 3));
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        for n in [5usize, 10, 37, 101] {
            let s = split_indices(n, 0.2, 42).unwrap();
            assert_eq!(s.train.len() + s.test.len(), n);

            let mut all: Vec<usize> = s.train.iter().chain(s.test.iter()).copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn same_seed_same_partition() {
        let a = split_indices(50, 0.2, 42).unwrap();
        let b = split_indices(50, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = split_indices(50, 0.2, 7).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn empty_subset_is_rejected() {
        let err = split_indices(1, 0.2, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputShape);

        let err = split_indices(10, 0.0, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
