//! ASCII charts: profit heatmap and residual histogram.
//!
//! This is intentionally "dumb" (one glyph per cell), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Layout:
//! - one text row per price point, highest price on top
//! - one column block per quantity point, smallest quantity on the left
//! - shade ramp from lowest to highest profit, optimum marked with `*`
//!
//! The residual histogram prints one bar per bin; the bin holding zero is
//! tagged `<- 0`.

use crate::simulate::{ProfitGrid, SimulationResult};

/// Shade ramp, lowest profit first.
pub const SHADES: [char; 9] = [' ', '.', ':', '-', '=', '+', '#', '%', '@'];

pub const OPTIMUM_MARK: char = '*';

/// Drawn for cells whose profit is not finite.
pub const MISSING_MARK: char = '?';

/// Render the grid of `simulation`, each cell `cell_width` characters wide.
pub fn render_profit_heatmap(simulation: &SimulationResult, cell_width: usize) -> String {
    let cell_width = cell_width.max(1);
    let grid = &simulation.grid;
    let optimum = &simulation.optimum;
    let (lo, hi) = grid.range().unwrap_or((0.0, 0.0));
    let (n_price, n_quantity) = grid.shape();

    let mut out = String::new();
    out.push_str(&format!(
        "Profit heatmap: campaign={} cost_ratio={:.2} | profit=[{lo:.2}, {hi:.2}]\n",
        simulation.campaign_flag.label(),
        simulation.cost_ratio,
    ));

    for i in (0..n_price).rev() {
        out.push_str(&format!("{:>10.2} |", grid.price_axis[i]));
        for j in 0..n_quantity {
            let ch = if i == optimum.price_index && j == optimum.quantity_index {
                OPTIMUM_MARK
            } else {
                shade(grid.get(i, j), lo, hi)
            };
            for _ in 0..cell_width {
                out.push(ch);
            }
        }
        out.push_str("|\n");
    }

    out.push_str(&format!("{:>10} +{}+\n", "", "-".repeat(n_quantity * cell_width)));
    let (q_min, q_max) = axis_bounds(grid);
    out.push_str(&format!("{:>10}  quantity {q_min:.2} .. {q_max:.2}\n", ""));

    out
}

fn shade(value: f64, lo: f64, hi: f64) -> char {
    if !value.is_finite() {
        return MISSING_MARK;
    }
    let span = hi - lo;
    if span <= 0.0 {
        return SHADES[SHADES.len() - 1];
    }
    let u = ((value - lo) / span).clamp(0.0, 1.0);
    let idx = (u * (SHADES.len() as f64 - 1.0)).round() as usize;
    SHADES[idx.min(SHADES.len() - 1)]
}

fn axis_bounds(grid: &ProfitGrid) -> (f64, f64) {
    let first = grid.quantity_axis.first().copied().unwrap_or(0.0);
    let last = grid.quantity_axis.last().copied().unwrap_or(first);
    (first, last)
}

/// Render a horizontal histogram of `residuals` with `bins` equal-width bins.
///
/// Non-finite residuals are ignored. Bars are scaled so the fullest bin spans
/// `width` characters.
pub fn render_residual_histogram(residuals: &[f64], bins: usize, width: usize) -> String {
    let bins = bins.max(1);
    let width = width.max(1);
    let values: Vec<f64> = residuals.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return "Residuals: none\n".to_string();
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo_edge, hi_edge) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let step = (hi_edge - lo_edge) / bins as f64;

    let bin_of = |v: f64| -> usize { (((v - lo_edge) / step).floor().max(0.0) as usize).min(bins - 1) };

    let mut counts = vec![0usize; bins];
    for &v in &values {
        counts[bin_of(v)] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    let zero_bin = (lo_edge <= 0.0 && 0.0 <= hi_edge).then(|| bin_of(0.0));

    let mut out = String::new();
    out.push_str(&format!(
        "Residuals: n={} | range=[{lo:.2}, {hi:.2}] | bins={bins}\n",
        values.len()
    ));
    for (k, &count) in counts.iter().enumerate() {
        let from = lo_edge + k as f64 * step;
        let to = lo_edge + (k + 1) as f64 * step;
        let len = ((count as f64 / max_count as f64) * width as f64).round() as usize;
        let bar = "#".repeat(len);
        let mark = if zero_bin == Some(k) { " <- 0" } else { "" };
        out.push_str(&format!("{from:>10.2} .. {to:>10.2} |{bar:<width$}| {count}{mark}\n"));
    }
    out
}
