//! Quantity × price profit grid and its optimum.
//!
//! For each cell `(price_i, quantity_j)`:
//!
//! ```text
//! revenue = model(quantity_j, price_i, campaign_flag)
//! cost    = quantity_j * price_i * cost_ratio
//! profit  = revenue - cost
//! ```
//!
//! Rows (one per price) are filled in parallel; every task owns a disjoint row
//! slice of one preallocated buffer and only reads the model. The optimum is
//! chosen afterwards by a sequential row-major scan, so the result does not
//! depend on scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::domain::{CampaignFlag, FittedModel, OptimalScenario};
use crate::error::{AppError, Stage};
use crate::math::lin_space;

/// Simulated profits indexed by `(price_index, quantity_index)`, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitGrid {
    pub quantity_axis: Vec<f64>,
    pub price_axis: Vec<f64>,
    cells: Vec<f64>,
}

impl ProfitGrid {
    /// `(rows, cols)` = `(price points, quantity points)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.price_axis.len(), self.quantity_axis.len())
    }

    pub fn get(&self, price_index: usize, quantity_index: usize) -> f64 {
        self.cells[price_index * self.quantity_axis.len() + quantity_index]
    }

    pub fn row(&self, price_index: usize) -> &[f64] {
        let k = self.quantity_axis.len();
        &self.cells[price_index * k..(price_index + 1) * k]
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Smallest and largest finite profit.
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in self.cells.iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if lo.is_finite() { Some((lo, hi)) } else { None }
    }
}

/// Grid plus the selected operating point and the assumptions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub grid: ProfitGrid,
    pub optimum: OptimalScenario,
    pub cost_ratio: f64,
    pub campaign_flag: CampaignFlag,
}

/// Profit of a single candidate point.
pub fn cell_profit(model: &FittedModel, quantity: f64, price: f64, cost_ratio: f64, flag: CampaignFlag) -> f64 {
    let revenue = model.predict_point(quantity, price, flag);
    let cost = quantity * price * cost_ratio;
    revenue - cost
}

/// Evaluate the profit grid for `model` and pick the best cell.
pub fn simulate(model: &FittedModel, config: &SimulationConfig) -> Result<SimulationResult, AppError> {
    config.validate()?;

    let quantity_axis = lin_space(&config.quantity_axis, "quantity")?;
    let price_axis = lin_space(&config.price_axis, "price")?;
    let grid = fill_grid(model, quantity_axis, price_axis, config.cost_ratio, config.campaign_flag);
    let optimum = find_optimum(&grid, model, config.campaign_flag)?;

    debug!(
        rows = grid.price_axis.len(),
        cols = grid.quantity_axis.len(),
        quantity = optimum.quantity,
        price = optimum.price,
        profit = optimum.predicted_profit,
        "profit grid evaluated"
    );

    Ok(SimulationResult {
        grid,
        optimum,
        cost_ratio: config.cost_ratio,
        campaign_flag: config.campaign_flag,
    })
}

fn fill_grid(
    model: &FittedModel,
    quantity_axis: Vec<f64>,
    price_axis: Vec<f64>,
    cost_ratio: f64,
    flag: CampaignFlag,
) -> ProfitGrid {
    let k = quantity_axis.len();
    let mut cells = vec![0.0; price_axis.len() * k];

    cells
        .par_chunks_mut(k)
        .zip(price_axis.par_iter())
        .for_each(|(row, &price)| {
            for (cell, &quantity) in row.iter_mut().zip(quantity_axis.iter()) {
                *cell = cell_profit(model, quantity, price, cost_ratio, flag);
            }
        });

    ProfitGrid {
        quantity_axis,
        price_axis,
        cells,
    }
}

/// First maximal cell in row-major (price outer, quantity inner) order.
///
/// Strict `>` keeps the earliest cell on ties. NaN and infinite cells are
/// skipped rather than selected, unlike an argmax that lets the first NaN win.
/// A finite model over finite axes only produces finite cells, so the skip
/// matters only for models whose coefficients overflow.
pub fn find_optimum(grid: &ProfitGrid, model: &FittedModel, flag: CampaignFlag) -> Result<OptimalScenario, AppError> {
    let (rows, cols) = grid.shape();
    let mut best: Option<(usize, usize, f64)> = None;

    for i in 0..rows {
        for j in 0..cols {
            let v = grid.get(i, j);
            if !v.is_finite() {
                continue;
            }
            match best {
                Some((_, _, b)) if v <= b => {}
                _ => best = Some((i, j, v)),
            }
        }
    }

    let Some((i, j, profit)) = best else {
        return Err(AppError::internal(
            Stage::Simulate,
            format!("no finite profit in a {rows}x{cols} grid"),
        ));
    };

    let quantity = grid.quantity_axis[j];
    let price = grid.price_axis[i];
    Ok(OptimalScenario {
        price_index: i,
        quantity_index: j,
        quantity,
        price,
        predicted_revenue: model.predict_point(quantity, price, flag),
        predicted_profit: profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AxisSpec;
    use crate::error::ErrorKind;

    fn sim_config(q: (f64, f64, usize), p: (f64, f64, usize), cost_ratio: f64) -> SimulationConfig {
        SimulationConfig {
            quantity_axis: AxisSpec::new(q.0, q.1, q.2),
            price_axis: AxisSpec::new(p.0, p.1, p.2),
            cost_ratio,
            campaign_flag: CampaignFlag::On,
        }
    }

    #[test]
    fn six_by_six_grid_matches_hand_computation() {
        let model = FittedModel::new([50.0, 0.5, 100.0], 10.0);
        let config = sim_config((5.0, 30.0, 6), (100.0, 600.0, 6), 0.6);
        let result = simulate(&model, &config).unwrap();

        assert_eq!(result.grid.shape(), (6, 6));
        assert_eq!(result.grid.quantity_axis, vec![5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        assert_eq!(result.grid.price_axis, vec![100.0, 200.0, 300.0, 400.0, 500.0, 600.0]);

        // profit = 10 + 50q + 0.5p + 100 - 0.6qp
        let expected = [
            [110.0, 60.0, 10.0, -40.0, -90.0, -140.0],
            [-140.0, -490.0, -840.0, -1190.0, -1540.0, -1890.0],
            [-390.0, -1040.0, -1690.0, -2340.0, -2990.0, -3640.0],
            [-640.0, -1590.0, -2540.0, -3490.0, -4440.0, -5390.0],
            [-890.0, -2140.0, -3390.0, -4640.0, -5890.0, -7140.0],
            [-1140.0, -2690.0, -4240.0, -5790.0, -7340.0, -8890.0],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &want) in row.iter().enumerate() {
                let got = result.grid.get(i, j);
                assert!((got - want).abs() < 1e-9, "cell ({i},{j}): got {got}, want {want}");
            }
        }

        let opt = result.optimum;
        assert_eq!((opt.price_index, opt.quantity_index), (0, 0));
        assert_eq!(opt.quantity, 5.0);
        assert_eq!(opt.price, 100.0);
        assert!((opt.predicted_profit - 110.0).abs() < 1e-9);
        assert!((opt.predicted_revenue - 410.0).abs() < 1e-9);
    }

    #[test]
    fn every_cell_follows_the_profit_formula() {
        let model = FittedModel::new([31.5, 1.2, 80.0], -25.0);
        let config = sim_config((1.0, 40.0, 7), (50.0, 900.0, 5), 0.35);
        let result = simulate(&model, &config).unwrap();

        assert_eq!(result.grid.shape(), (5, 7));
        for (i, &p) in result.grid.price_axis.iter().enumerate() {
            for (j, &q) in result.grid.quantity_axis.iter().enumerate() {
                let want = model.predict_point(q, p, CampaignFlag::On) - q * p * 0.35;
                assert_eq!(result.grid.get(i, j), want);
            }
        }
        assert_eq!(result.grid.row(2).len(), 7);
    }

    #[test]
    fn ties_resolve_to_first_cell_in_row_major_order() {
        // At price 100 the quantity term cancels (50q - 0.5*100q), so the whole
        // first row ties at the maximum; higher prices lose money per unit.
        let model = FittedModel::new([50.0, 0.0, 0.0], 0.0);
        let config = sim_config((1.0, 4.0, 4), (100.0, 200.0, 2), 0.5);
        let result = simulate(&model, &config).unwrap();

        assert!(result.grid.row(0).iter().all(|&v| v == 0.0));
        let opt = result.optimum;
        assert_eq!((opt.price_index, opt.quantity_index), (0, 0));
        assert_eq!(opt.quantity, 1.0);
        assert_eq!(opt.price, 100.0);
    }

    #[test]
    fn flat_large_grid_picks_origin_regardless_of_threads() {
        let model = FittedModel::new([0.0, 0.0, 0.0], 42.0);
        let config = sim_config((1.0, 100.0, 150), (1.0, 100.0, 150), 0.0);
        for _ in 0..5 {
            let result = simulate(&model, &config).unwrap();
            assert_eq!((result.optimum.price_index, result.optimum.quantity_index), (0, 0));
        }
    }

    #[test]
    fn simulation_is_deterministic() {
        let model = FittedModel::new([48.7, 0.93, 115.2], 12.3);
        let config = SimulationConfig::default();
        let a = simulate(&model, &config).unwrap();
        let b = simulate(&model, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn campaign_flag_shifts_every_cell_by_its_coefficient() {
        let model = FittedModel::new([50.0, 0.5, 100.0], 10.0);
        let mut config = sim_config((5.0, 30.0, 6), (100.0, 600.0, 6), 0.6);
        let on = simulate(&model, &config).unwrap();
        config.campaign_flag = CampaignFlag::Off;
        let off = simulate(&model, &config).unwrap();

        for (a, b) in on.grid.cells().iter().zip(off.grid.cells()) {
            assert!((a - b - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bad_axes_fail_before_grid_work() {
        let model = FittedModel::new([1.0, 1.0, 1.0], 0.0);

        let err = simulate(&model, &sim_config((1.0, 2.0, 0), (1.0, 2.0, 3), 0.6)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = simulate(&model, &sim_config((1.0, 2.0, 3), (5.0, 2.0, 3), 0.6)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = simulate(&model, &sim_config((1.0, 2.0, 3), (1.0, 2.0, 3), -0.1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn non_finite_cells_are_skipped_by_the_optimum() {
        let model = FittedModel::new([1.0, 0.0, 0.0], 0.0);
        let grid = ProfitGrid {
            quantity_axis: vec![1.0, 2.0, 3.0],
            price_axis: vec![10.0],
            cells: vec![f64::NAN, 5.0, f64::INFINITY],
        };
        let opt = find_optimum(&grid, &model, CampaignFlag::On).unwrap();
        assert_eq!(opt.quantity_index, 1);
        assert_eq!(opt.predicted_profit, 5.0);

        let all_nan = ProfitGrid {
            quantity_axis: vec![1.0],
            price_axis: vec![10.0],
            cells: vec![f64::NAN],
        };
        let err = find_optimum(&all_nan, &model, CampaignFlag::On).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
